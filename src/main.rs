//! Worlds demo: fly a first-person camera over a (optionally textured)
//! mesh.
//!
//! Usage: `softrast <mesh.obj> [texture.bmp]`
//!
//! Arrow keys steer yaw and pitch, Space flies forward along the view
//! direction, Escape quits.

use std::env;
use std::time::Duration;

use tracing::info;

use softrast::math::transform;
use softrast::prelude::*;

const WINDOW_WIDTH: i32 = 640;
const WINDOW_HEIGHT: i32 = 480;

const TURN_RATE: f64 = 0.01;
const FLY_SPEED: f64 = 0.5;

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);
    let mesh_path = args.next().unwrap_or_else(|| "assets/world.obj".to_string());
    let texture_path = args.next();

    let bitmap = texture_path
        .map(load_bitmap_from_file)
        .transpose()
        .map_err(|e| e.to_string())?;

    let mut mesh = load_mesh_from_obj(&mesh_path).map_err(|e| e.to_string())?;
    if let Some(bitmap) = &bitmap {
        attach_texture(&mut mesh, bitmap);
    }
    info!(
        mesh = %mesh_path,
        triangles = mesh.triangles.len(),
        textured = bitmap.is_some(),
        "scene ready"
    );

    let model = Model {
        mesh: &mesh,
        position: vec4(0.0, -2.0, 10.0, 1.0),
        scale: vec4(1.0, 1.0, 1.0, 0.0),
        rotation: vec4(0.0, 0.0, 0.0, 0.0),
    };

    let lights = vec![
        Light::Ambient { intensity: 0.5 },
        Light::Directional {
            intensity: 0.5,
            direction: vec4(1.0, -2.0, -1.0, 0.0),
        },
    ];

    let mut window = Window::new("Worlds", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let renderer = Renderer::new(
        45.0_f64.to_radians(),
        WINDOW_WIDTH as f64 / WINDOW_HEIGHT as f64,
        1000.0,
    );

    let mut camera = Camera::default();

    while window.is_open() {
        if !window.handle_events() {
            break;
        }

        if window.key_state(KeySymbol::ArrowLeft) == KeyState::Down {
            camera.rotation[1] += TURN_RATE;
        }
        if window.key_state(KeySymbol::ArrowRight) == KeyState::Down {
            camera.rotation[1] -= TURN_RATE;
        }
        if window.key_state(KeySymbol::ArrowUp) == KeyState::Down {
            camera.rotation[0] += TURN_RATE;
        }
        if window.key_state(KeySymbol::ArrowDown) == KeyState::Down {
            camera.rotation[0] -= TURN_RATE;
        }
        if window.key_state(KeySymbol::Space) == KeyState::Down {
            // Fly along the camera's forward direction.
            let forward = transform::rotation_world(
                camera.rotation[0],
                camera.rotation[1],
                camera.rotation[2],
            ) * vec4(0.0, 0.0, 1.0, 0.0);
            camera.position = camera.position + forward * FLY_SPEED;
        }

        let scene = Scene {
            models: vec![&model],
            lights: lights.clone(),
            camera,
        };

        window.clear();
        renderer.render_scene(&mut window, &scene);
        window.present()?;

        std::thread::sleep(Duration::from_millis(16));
    }

    Ok(())
}
