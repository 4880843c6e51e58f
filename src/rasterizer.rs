//! 2D primitive rasterisation: lines, wireframes and shaded triangle fill.
//!
//! Everything here works in pixel space and draws through the
//! [`Surface`] contract; no state is kept between calls.
//!
//! # Perspective-correct interpolation
//!
//! A camera-space attribute `A` is not linear across the screen once the
//! triangle has been perspective projected, but `A/z` and `1/z` both are.
//! The fill therefore interpolates the divided-by-z companions along edges
//! and scanlines and recovers `A = (A/z) / (1/z)` per pixel. The same
//! `1/z` doubles as the depth-test value: larger means closer.
//!
//! # Scanline fill
//!
//! Vertices are sorted by y. The edge from the topmost to the bottommost
//! vertex (the long edge) spans every scanline; the other two edges take
//! over from each other at the middle vertex. Each edge carries an
//! interpolant block advanced by a fixed per-scanline increment, and each
//! scanline fills between the long edge and whichever short edge is
//! active, ordering the pair by x so coincident edges and either winding
//! are handled the same way.

use crate::resources::Bitmap;
use crate::surface::Surface;

/// A vertex mapped to pixel space, carrying the divided-by-z attributes
/// the fill interpolates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
    pub inv_z: f64,
    pub i_div_z: f64,
    pub r_div_z: f64,
    pub g_div_z: f64,
    pub b_div_z: f64,
    pub tex_x_div_z: f64,
    pub tex_y_div_z: f64,
}

/// Interpolant block walked along an edge or a scanline.
#[derive(Clone, Copy, Debug, Default)]
struct Span {
    x: f64,
    inv_z: f64,
    i_div_z: f64,
    r_div_z: f64,
    g_div_z: f64,
    b_div_z: f64,
    tex_x_div_z: f64,
    tex_y_div_z: f64,
}

impl Span {
    fn from_pixel(p: PixelCoord) -> Self {
        Self {
            x: p.x as f64,
            inv_z: p.inv_z,
            i_div_z: p.i_div_z,
            r_div_z: p.r_div_z,
            g_div_z: p.g_div_z,
            b_div_z: p.b_div_z,
            tex_x_div_z: p.tex_x_div_z,
            tex_y_div_z: p.tex_y_div_z,
        }
    }

    /// Per-step increment covering `from -> to` in `steps` steps.
    fn delta(from: Span, to: Span, steps: f64) -> Self {
        Self {
            x: (to.x - from.x) / steps,
            inv_z: (to.inv_z - from.inv_z) / steps,
            i_div_z: (to.i_div_z - from.i_div_z) / steps,
            r_div_z: (to.r_div_z - from.r_div_z) / steps,
            g_div_z: (to.g_div_z - from.g_div_z) / steps,
            b_div_z: (to.b_div_z - from.b_div_z) / steps,
            tex_x_div_z: (to.tex_x_div_z - from.tex_x_div_z) / steps,
            tex_y_div_z: (to.tex_y_div_z - from.tex_y_div_z) / steps,
        }
    }

    fn advance(&mut self, d: Span) {
        self.x += d.x;
        self.inv_z += d.inv_z;
        self.i_div_z += d.i_div_z;
        self.r_div_z += d.r_div_z;
        self.g_div_z += d.g_div_z;
        self.b_div_z += d.b_div_z;
        self.tex_x_div_z += d.tex_x_div_z;
        self.tex_y_div_z += d.tex_y_div_z;
    }
}

/// Draws a line with Bresenham's algorithm, endpoints inclusive.
pub fn draw_line<S: Surface>(surface: &mut S, p1: PixelCoord, p2: PixelCoord, r: u8, g: u8, b: u8) {
    if (p2.y - p1.y).abs() < (p2.x - p1.x).abs() {
        if p1.x > p2.x {
            draw_line_low(surface, p2, p1, r, g, b);
        } else {
            draw_line_low(surface, p1, p2, r, g, b);
        }
    } else if p1.y > p2.y {
        draw_line_high(surface, p2, p1, r, g, b);
    } else {
        draw_line_high(surface, p1, p2, r, g, b);
    }
}

/// Shallow-gradient case: step along x, occasionally along y.
fn draw_line_low<S: Surface>(surface: &mut S, p1: PixelCoord, p2: PixelCoord, r: u8, g: u8, b: u8) {
    let dx = p2.x - p1.x;
    let mut dy = p2.y - p1.y;

    let mut y_inc = 1;
    if dy < 0 {
        y_inc = -1;
        dy = -dy;
    }

    let mut diff = 2 * dy - dx;
    let mut y = p1.y;

    for x in p1.x..=p2.x {
        surface.draw_pixel(x, y, r, g, b);

        if diff > 0 {
            y += y_inc;
            diff += 2 * (dy - dx);
        } else {
            diff += 2 * dy;
        }
    }
}

/// Steep-gradient case: step along y, occasionally along x.
fn draw_line_high<S: Surface>(
    surface: &mut S,
    p1: PixelCoord,
    p2: PixelCoord,
    r: u8,
    g: u8,
    b: u8,
) {
    let mut dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    let mut x_inc = 1;
    if dx < 0 {
        x_inc = -1;
        dx = -dx;
    }

    let mut diff = 2 * dx - dy;
    let mut x = p1.x;

    for y in p1.y..=p2.y {
        surface.draw_pixel(x, y, r, g, b);

        if diff > 0 {
            x += x_inc;
            diff += 2 * (dx - dy);
        } else {
            diff += 2 * dx;
        }
    }
}

pub fn draw_wireframe_triangle<S: Surface>(
    surface: &mut S,
    p1: PixelCoord,
    p2: PixelCoord,
    p3: PixelCoord,
    r: u8,
    g: u8,
    b: u8,
) {
    draw_line(surface, p1, p2, r, g, b);
    draw_line(surface, p2, p3, r, g, b);
    draw_line(surface, p3, p1, r, g, b);
}

/// Fills a triangle with perspective-correct shading, depth testing and
/// optional nearest-texel texture sampling.
///
/// Vertices may arrive in any order; winding does not matter here (the
/// pipeline has already culled back faces). Zero-height triangles draw
/// nothing.
pub fn draw_shaded_triangle<S: Surface>(
    surface: &mut S,
    p1: PixelCoord,
    p2: PixelCoord,
    p3: PixelCoord,
    bitmap: Option<&Bitmap>,
) {
    let mut v = [p1, p2, p3];
    if v[1].y < v[0].y {
        v.swap(0, 1);
    }
    if v[2].y < v[1].y {
        v.swap(1, 2);
    }
    if v[1].y < v[0].y {
        v.swap(0, 1);
    }
    let [top, mid, bottom] = v;

    if top.y == bottom.y {
        return;
    }

    let mut long = Span::from_pixel(top);
    let long_delta = Span::delta(long, Span::from_pixel(bottom), (bottom.y - top.y) as f64);

    // The short side is two segments; either may be flat and unused.
    let upper_height = mid.y - top.y;
    let lower_height = bottom.y - mid.y;

    let mut upper = Span::from_pixel(top);
    let upper_delta = if upper_height > 0 {
        Span::delta(upper, Span::from_pixel(mid), upper_height as f64)
    } else {
        Span::default()
    };

    let mut lower = Span::from_pixel(mid);
    let lower_delta = if lower_height > 0 {
        Span::delta(lower, Span::from_pixel(bottom), lower_height as f64)
    } else {
        Span::default()
    };

    for y in top.y..=bottom.y {
        let short = if y < mid.y { upper } else { lower };

        let (left, right) = if long.x <= short.x {
            (long, short)
        } else {
            (short, long)
        };
        draw_shaded_row(surface, y, left, right, bitmap);

        long.advance(long_delta);
        if y < mid.y {
            upper.advance(upper_delta);
        } else {
            lower.advance(lower_delta);
        }
    }
}

/// Fills one scanline between two endpoints with `left.x <= right.x`.
fn draw_shaded_row<S: Surface>(
    surface: &mut S,
    y: i32,
    left: Span,
    right: Span,
    bitmap: Option<&Bitmap>,
) {
    if y < 0 || y >= surface.height() {
        return;
    }
    let width = surface.width();

    let steps = right.x - left.x;
    let delta = if steps > 0.0 {
        Span::delta(left, right, steps)
    } else {
        Span::default()
    };

    let mut acc = left;

    for x in left.x.floor() as i32..=right.x.floor() as i32 {
        let inv_z = acc.inv_z;

        if x >= 0 && x < width && inv_z as f32 > surface.read_depth(x, y) {
            // Recover camera-space attributes from the companions.
            let intensity = acc.i_div_z / inv_z;
            let mut red = acc.r_div_z / inv_z;
            let mut green = acc.g_div_z / inv_z;
            let mut blue = acc.b_div_z / inv_z;

            if let Some(bmp) = bitmap {
                let tex_x = acc.tex_x_div_z / inv_z;
                let tex_y = acc.tex_y_div_z / inv_z;

                let max_x = (bmp.width - 1) as f64;
                let max_y = (bmp.height - 1) as f64;
                let tx = (tex_x * max_x).round().clamp(0.0, max_x) as i32;
                // Texel rows run top-down; texture coordinates run
                // bottom-up.
                let ty = bmp.height - 1 - (tex_y * max_y).round().clamp(0.0, max_y) as i32;

                let texel = bmp.texel(tx, ty);
                red *= texel.r as f64 / 255.0;
                green *= texel.g as f64 / 255.0;
                blue *= texel.b as f64 / 255.0;
            }

            surface.draw_pixel(
                x,
                y,
                (red * intensity).clamp(0.0, 255.0) as u8,
                (green * intensity).clamp(0.0, 255.0) as u8,
                (blue * intensity).clamp(0.0, 255.0) as u8,
            );
            surface.write_depth(x, y, inv_z as f32);
        }

        acc.advance(delta);
    }
}
