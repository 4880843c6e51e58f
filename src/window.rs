//! SDL2-backed render surface.
//!
//! SDL is used strictly for window management, input, and blitting the CPU
//! framebuffer to the screen through a streaming texture; no rendering
//! happens on the other side of this module.

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::surface::{Framebuffer, KeyState, KeySymbol, Surface};

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Field order matters: texture must drop before the creator it
    // borrows from.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    framebuffer: Framebuffer,
    open: bool,
}

impl Window {
    pub fn new(title: &str, width: i32, height: i32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width as u32, height as u32)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as
        // Window; struct field order drops texture before texture_creator.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width as u32, height as u32)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            framebuffer: Framebuffer::new(width, height),
            open: true,
        })
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }
}

impl Surface for Window {
    fn width(&self) -> i32 {
        self.framebuffer.width()
    }

    fn height(&self) -> i32 {
        self.framebuffer.height()
    }

    fn handle_events(&mut self) -> bool {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => self.open = false,
                _ => {}
            }
        }
        self.open
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn clear(&mut self) {
        self.framebuffer.clear();
    }

    fn present(&mut self) -> Result<(), String> {
        let width = self.framebuffer.width();
        let height = self.framebuffer.height();

        self.texture
            .update(None, self.framebuffer.as_bytes(), (width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(
            &self.texture,
            None,
            Some(Rect::new(0, 0, width as u32, height as u32)),
        )?;
        self.canvas.present();
        Ok(())
    }

    fn draw_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        self.framebuffer.draw_pixel(x, y, r, g, b);
    }

    fn read_depth(&self, x: i32, y: i32) -> f32 {
        self.framebuffer.depth_at(x, y)
    }

    fn write_depth(&mut self, x: i32, y: i32, depth: f32) {
        self.framebuffer.set_depth(x, y, depth);
    }

    fn key_state(&self, key: KeySymbol) -> KeyState {
        let keyboard = self.event_pump.keyboard_state();
        if keyboard.is_scancode_pressed(scancode_for(key)) {
            KeyState::Down
        } else {
            KeyState::Up
        }
    }
}

fn scancode_for(key: KeySymbol) -> Scancode {
    match key {
        KeySymbol::Space => Scancode::Space,
        KeySymbol::ArrowLeft => Scancode::Left,
        KeySymbol::ArrowUp => Scancode::Up,
        KeySymbol::ArrowRight => Scancode::Right,
        KeySymbol::ArrowDown => Scancode::Down,
        KeySymbol::A => Scancode::A,
        KeySymbol::B => Scancode::B,
        KeySymbol::C => Scancode::C,
        KeySymbol::D => Scancode::D,
        KeySymbol::E => Scancode::E,
        KeySymbol::F => Scancode::F,
        KeySymbol::G => Scancode::G,
        KeySymbol::H => Scancode::H,
        KeySymbol::I => Scancode::I,
        KeySymbol::J => Scancode::J,
        KeySymbol::K => Scancode::K,
        KeySymbol::L => Scancode::L,
        KeySymbol::M => Scancode::M,
        KeySymbol::N => Scancode::N,
        KeySymbol::O => Scancode::O,
        KeySymbol::P => Scancode::P,
        KeySymbol::Q => Scancode::Q,
        KeySymbol::R => Scancode::R,
        KeySymbol::S => Scancode::S,
        KeySymbol::T => Scancode::T,
        KeySymbol::U => Scancode::U,
        KeySymbol::V => Scancode::V,
        KeySymbol::W => Scancode::W,
        KeySymbol::X => Scancode::X,
        KeySymbol::Y => Scancode::Y,
        KeySymbol::Z => Scancode::Z,
    }
}
