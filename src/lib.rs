//! A CPU-only software 3D rasterisation engine.
//!
//! The crate consumes triangle meshes, lights and a camera, and writes a
//! coloured pixel buffer plus a depth buffer through a small surface
//! contract. SDL2 is used only to put that buffer on screen; every stage
//! of the pipeline — transforms, culling, Gouraud lighting, clipping,
//! perspective projection and scanline rasterisation — runs on the CPU.
//!
//! # Quick start
//!
//! ```ignore
//! use softrast::prelude::*;
//!
//! let mesh = load_mesh_from_obj("assets/world.obj")?;
//! let model = Model {
//!     mesh: &mesh,
//!     position: vec4(0.0, 0.0, 10.0, 1.0),
//!     scale: vec4(1.0, 1.0, 1.0, 0.0),
//!     rotation: vec4(0.0, 0.0, 0.0, 0.0),
//! };
//!
//! let mut window = Window::new("Demo", 640, 480)?;
//! let renderer = Renderer::new(45.0_f64.to_radians(), 640.0 / 480.0, 1000.0);
//!
//! while window.is_open() && window.handle_events() {
//!     window.clear();
//!     renderer.render_scene(&mut window, &scene);
//!     window.present()?;
//! }
//! ```

pub mod clipper;
pub mod geometry;
pub mod math;
pub mod rasterizer;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod surface;
pub mod window;

pub use renderer::{RenderMode, Renderer};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::geometry::{Mesh, Model, Point, Triangle};
    pub use crate::math::{vec4, Mat4, Vec4};
    pub use crate::renderer::{RenderMode, Renderer};
    pub use crate::resources::{
        attach_texture, load_bitmap_from_file, load_mesh_from_obj, Bitmap,
    };
    pub use crate::scene::{Camera, Light, Scene};
    pub use crate::surface::{KeyState, KeySymbol, OffscreenSurface, Surface};
    pub use crate::window::Window;
}
