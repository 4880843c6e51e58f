//! Wavefront OBJ mesh loading.
//!
//! Only the line-oriented subset the renderer consumes is parsed:
//!
//! - `v x y z` — a position, stored homogeneous with w = 1.
//! - `vt u v` — a texture coordinate.
//! - `vn x y z` — a normal; read and tolerated but unused, since the
//!   lighting stage computes face normals itself.
//! - `f a b c` — a triangular face. Each corner is one of `p`, `p/t`,
//!   `p//n` or `p/t/n` with 1-based indices, and all three corners of a
//!   face must use the same form.
//!
//! Unknown mnemonics (object names, smoothing groups, material
//! references, comments) are skipped so that files using unsupported
//! features still load their geometry. A malformed directive or a face
//! index pointing past the data read so far aborts the load.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::geometry::{Mesh, Point, Triangle};
use crate::math::{vec4, Vec4};

#[derive(Debug)]
pub enum MeshLoadError {
    Io(std::io::Error),
    /// A `v` directive without three numeric fields.
    Vertex { line: usize },
    /// A `vt` directive without two numeric fields.
    Texcoord { line: usize },
    /// A `vn` directive without three numeric fields.
    Normal { line: usize },
    /// An `f` directive that is malformed, mixes corner forms, or indexes
    /// out of range.
    Face { line: usize },
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "mesh i/o error: {err}"),
            Self::Vertex { line } => write!(f, "malformed vertex on line {line}"),
            Self::Texcoord { line } => write!(f, "malformed texture coordinate on line {line}"),
            Self::Normal { line } => write!(f, "malformed normal on line {line}"),
            Self::Face { line } => write!(f, "malformed face on line {line}"),
        }
    }
}

impl std::error::Error for MeshLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MeshLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// The index form used by one face corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CornerForm {
    Position,
    PositionTexture,
    PositionNormal,
    PositionTextureNormal,
}

/// One parsed face corner: 1-based indices into the arrays read so far.
#[derive(Clone, Copy, Debug)]
struct Corner {
    form: CornerForm,
    position: usize,
    texcoord: usize,
}

/// Parse a face corner of the form `p`, `p/t`, `p//n` or `p/t/n`.
fn parse_corner(field: &str) -> Option<Corner> {
    let mut parts = field.split('/');

    let position: usize = parts.next()?.parse().ok()?;
    if position == 0 {
        return None;
    }

    let (form, texcoord) = match (parts.next(), parts.next()) {
        (None, _) => (CornerForm::Position, 0),
        (Some(tex), None) => (CornerForm::PositionTexture, tex.parse().ok()?),
        (Some(""), Some(normal)) => {
            let _: usize = normal.parse().ok()?;
            (CornerForm::PositionNormal, 0)
        }
        (Some(tex), Some(normal)) => {
            let _: usize = normal.parse().ok()?;
            (CornerForm::PositionTextureNormal, tex.parse().ok()?)
        }
    };

    if parts.next().is_some() {
        return None;
    }
    if matches!(
        form,
        CornerForm::PositionTexture | CornerForm::PositionTextureNormal
    ) && texcoord == 0
    {
        return None;
    }

    Some(Corner {
        form,
        position,
        texcoord,
    })
}

fn parse_floats<const N: usize>(fields: &mut std::str::SplitWhitespace<'_>) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for slot in &mut out {
        *slot = fields.next()?.parse().ok()?;
    }
    Some(out)
}

/// Parse OBJ text into a mesh. Points carry position and (where present)
/// texture coordinates; colour defaults to white and the lighting and
/// screen-space attributes start at zero.
pub fn parse_obj(reader: impl BufRead) -> Result<Mesh<'static>, MeshLoadError> {
    let mut positions: Vec<Vec4> = Vec::new();
    let mut texcoords: Vec<Vec4> = Vec::new();
    let mut normal_count = 0usize;
    let mut triangles: Vec<Triangle<'static>> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let mut fields = line.split_whitespace();

        match fields.next() {
            Some("v") => {
                let [x, y, z] =
                    parse_floats(&mut fields).ok_or(MeshLoadError::Vertex { line: number })?;
                positions.push(vec4(x, y, z, 1.0));
            }
            Some("vt") => {
                let [u, v] =
                    parse_floats(&mut fields).ok_or(MeshLoadError::Texcoord { line: number })?;
                texcoords.push(vec4(u, v, 1.0, 1.0));
            }
            Some("vn") => {
                let [_, _, _] =
                    parse_floats(&mut fields).ok_or(MeshLoadError::Normal { line: number })?;
                normal_count += 1;
            }
            Some("f") => {
                let face_err = || MeshLoadError::Face { line: number };

                let mut corners = [Corner {
                    form: CornerForm::Position,
                    position: 0,
                    texcoord: 0,
                }; 3];
                for corner in &mut corners {
                    let field = fields.next().ok_or_else(face_err)?;
                    *corner = parse_corner(field).ok_or_else(face_err)?;
                }

                if corners[1].form != corners[0].form || corners[2].form != corners[0].form {
                    return Err(face_err());
                }

                let mut points = [Point::default(); 3];
                for (point, corner) in points.iter_mut().zip(corners) {
                    let pos = *positions.get(corner.position - 1).ok_or_else(face_err)?;
                    *point = Point::new(pos);

                    if matches!(
                        corner.form,
                        CornerForm::PositionTexture | CornerForm::PositionTextureNormal
                    ) {
                        let tex = texcoords.get(corner.texcoord - 1).ok_or_else(face_err)?;
                        point.tex_x = tex[0];
                        point.tex_y = tex[1];
                    }
                }

                triangles.push(Triangle::new(points));
            }
            // Anything else (comments, groups, materials, ...) is skipped.
            _ => {}
        }
    }

    debug!(
        positions = positions.len(),
        texcoords = texcoords.len(),
        normals = normal_count,
        triangles = triangles.len(),
        "parsed obj mesh"
    );

    Ok(Mesh { triangles })
}

/// Load a mesh from an OBJ file on disk.
pub fn load_mesh_from_obj(path: impl AsRef<Path>) -> Result<Mesh<'static>, MeshLoadError> {
    parse_obj(BufReader::new(File::open(path)?))
}
