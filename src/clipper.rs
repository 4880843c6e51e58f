//! Generic polygon clipping against a half-space.
//!
//! One clip routine serves the near plane and all four screen edges; the
//! caller supplies what varies: a predicate deciding which side of the
//! boundary is kept, and an intersection functor producing the point where
//! an edge meets the boundary. The intersection functor also decides which
//! attribute set gets interpolated — camera-space attributes before
//! projection, divided-by-z companions after — so each stage closes over
//! the interpolation that is valid for its place in the pipeline.
//!
//! # Walking the perimeter
//!
//! For a triangle `v0, v1, v2`, each directed edge `(v_i, v_{i+1})` is
//! visited in order: an inside `v_i` is emitted, and whenever the edge
//! changes sides the boundary intersection is emitted. A triangle crosses
//! a half-space boundary an even number of times, so the emitted polygon
//! has 0, 3 or 4 vertices, and because emission follows the original
//! perimeter order, winding is preserved.
//!
//! A 4-vertex polygon is fan-triangulated as `(o0, o1, o2)` and
//! `(o0, o2, o3)`: consecutive perimeter vertices stay consecutive, which
//! again keeps the winding.

use crate::geometry::{Point, Triangle};

/// Clip every active triangle against one half-space.
///
/// The first output triangle reuses the source slot in `triangles`; a
/// second output is appended and its index joins the active set; a
/// clipped-away triangle leaves the active set. Slots of inactive
/// triangles are never touched, so indices held elsewhere stay valid for
/// the frame.
pub fn clip_triangles<'b, F, G>(
    triangles: &mut Vec<Triangle<'b>>,
    active: &mut Vec<usize>,
    in_region: F,
    intersect: G,
) where
    F: Fn(&Point) -> bool,
    G: Fn(&Point, &Point) -> Point,
{
    let mut retained = Vec::with_capacity(active.len());

    for &index in active.iter() {
        let source = triangles[index];

        let mut emitted = [Point::default(); 4];
        let mut count = 0;

        for edge in 0..3 {
            let from = source.points[edge];
            let to = source.points[(edge + 1) % 3];
            let from_inside = in_region(&from);

            if from_inside {
                emitted[count] = from;
                count += 1;
            }
            if from_inside != in_region(&to) {
                emitted[count] = intersect(&from, &to);
                count += 1;
            }
        }

        match count {
            3 => {
                triangles[index] = Triangle {
                    points: [emitted[0], emitted[1], emitted[2]],
                    bitmap: source.bitmap,
                };
                retained.push(index);
            }
            4 => {
                triangles[index] = Triangle {
                    points: [emitted[0], emitted[1], emitted[2]],
                    bitmap: source.bitmap,
                };
                retained.push(index);

                retained.push(triangles.len());
                triangles.push(Triangle {
                    points: [emitted[0], emitted[2], emitted[3]],
                    bitmap: source.bitmap,
                });
            }
            // 0: fully outside. 1 and 2 can only arise from degenerate
            // float behaviour on the boundary; such slivers have no area.
            _ => {}
        }
    }

    *active = retained;
}
