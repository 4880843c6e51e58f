//! Scene description: camera, lights, and the models to draw.

use crate::geometry::Model;
use crate::math::{transform, Mat4, Vec4};

/// The viewpoint. `rotation` uses the same Euler-angle convention as
/// [`Model`](crate::geometry::Model).
#[derive(Clone, Copy, Debug, Default)]
pub struct Camera {
    pub position: Vec4,
    pub rotation: Vec4,
}

/// Transform from world space into camera space: the world is translated
/// by the reverse of the camera position, then rotated by the reverse of
/// the camera rotation using the world ordering.
pub fn camera_transform(camera: &Camera) -> Mat4 {
    transform::rotation_world(
        -camera.rotation[0],
        -camera.rotation[1],
        -camera.rotation[2],
    ) * transform::translation(
        -camera.position[0],
        -camera.position[1],
        -camera.position[2],
    )
}

/// A light source. The kind decides which geometry feeds the per-vertex
/// intensity computation, so each kind carries only the payload it uses.
#[derive(Clone, Copy, Debug)]
pub enum Light {
    Ambient {
        intensity: f64,
    },
    Directional {
        intensity: f64,
        direction: Vec4,
    },
    Point {
        intensity: f64,
        position: Vec4,
    },
}

/// Everything the renderer needs for one frame.
#[derive(Debug)]
pub struct Scene<'a> {
    pub models: Vec<&'a Model<'a>>,
    pub lights: Vec<Light>,
    pub camera: Camera,
}
