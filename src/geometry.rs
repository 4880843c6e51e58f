//! Geometry primitives flowing through the pipeline.
//!
//! A [`Point`] carries two parallel attribute sets: the camera-space set
//! (`i`, `r`, `g`, `b`, `tex_x`, `tex_y`), valid up to perspective
//! projection, and the divided-by-z companions, which the projection stage
//! populates and the rasteriser consumes. Unlike the camera-space
//! attributes, each companion is linear in screen coordinates, which is
//! what makes perspective-correct scanline interpolation possible.

use crate::math::{transform, Mat4, Vec4};
use crate::resources::Bitmap;

/// A triangle vertex: homogeneous position plus per-vertex attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub pos: Vec4,

    /// Camera-space attributes: light intensity, base colour (0-255) and
    /// texel coordinates (0..1).
    pub i: f64,
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub tex_x: f64,
    pub tex_y: f64,

    /// Screen-space companions, meaningful only after projection.
    pub inv_z: f64,
    pub i_div_z: f64,
    pub r_div_z: f64,
    pub g_div_z: f64,
    pub b_div_z: f64,
    pub tex_x_div_z: f64,
    pub tex_y_div_z: f64,
}

impl Point {
    /// A white, unlit, untextured vertex at `pos` — the loader default.
    pub fn new(pos: Vec4) -> Self {
        Self {
            pos,
            r: 255.0,
            g: 255.0,
            b: 255.0,
            ..Self::default()
        }
    }
}

/// Three points plus an optional texture; `None` means untextured.
#[derive(Clone, Copy, Debug)]
pub struct Triangle<'b> {
    pub points: [Point; 3],
    pub bitmap: Option<&'b Bitmap>,
}

impl<'b> Triangle<'b> {
    pub fn new(points: [Point; 3]) -> Self {
        Self {
            points,
            bitmap: None,
        }
    }
}

/// A loaded mesh. Immutable once built and shared across frames; models
/// borrow it rather than copying the triangle data.
#[derive(Debug, Default)]
pub struct Mesh<'b> {
    pub triangles: Vec<Triangle<'b>>,
}

/// An instance of a mesh placed in the world.
///
/// `rotation` holds Euler angles: x is the angle in the y-z plane, y in
/// the x-z plane, z in the x-y plane.
#[derive(Clone, Copy, Debug)]
pub struct Model<'a> {
    pub mesh: &'a Mesh<'a>,
    pub position: Vec4,
    pub scale: Vec4,
    pub rotation: Vec4,
}

/// World placement of a model: scale, then rotate, then translate.
pub fn model_transform(model: &Model<'_>) -> Mat4 {
    transform::translation(model.position[0], model.position[1], model.position[2])
        * transform::rotation_model(model.rotation[0], model.rotation[1], model.rotation[2])
        * transform::enlargement(model.scale[0], model.scale[1], model.scale[2])
}
