//! The 3D rendering pipeline.
//!
//! [`Renderer::render_scene`] pushes every model triangle through a fixed
//! sequence of stages: world transform, camera transform, back-face cull,
//! per-vertex lighting, near-plane clip, perspective projection, screen
//! bound clips, viewport mapping and finally rasterisation.
//!
//! The per-frame working set is a pair of containers: an append-only
//! buffer of every triangle seen this frame, and a list of indices naming
//! the triangles still in flight. Stages mutate triangles in place, drop
//! indices, or append split results; indices stay valid for the whole
//! frame and no stage depends on their order.

use tracing::trace;

use crate::clipper::clip_triangles;
use crate::geometry::{model_transform, Point, Triangle};
use crate::math::{vec4, Mat4};
use crate::rasterizer::{draw_shaded_triangle, draw_wireframe_triangle, PixelCoord};
use crate::scene::{camera_transform, Camera, Light, Scene};
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Filled,
    Wireframe,
}

pub struct Renderer {
    fov: f64,
    aspect_ratio: f64,
    view_plane_distance: f64,
    far_plane_distance: f64,
    screen_left_bound: f64,
    screen_right_bound: f64,
    screen_top_bound: f64,
    screen_bottom_bound: f64,
    render_mode: RenderMode,
}

impl Renderer {
    /// Creates a renderer for the given field of view (radians) and aspect
    /// ratio (width over height).
    pub fn new(fov: f64, aspect_ratio: f64, far_plane_distance: f64) -> Self {
        Self {
            fov,
            aspect_ratio,
            view_plane_distance: 1.0 / fov.tan(),
            far_plane_distance,
            screen_left_bound: -1.0,
            screen_right_bound: 1.0,
            screen_top_bound: 1.0 / aspect_ratio,
            screen_bottom_bound: -1.0 / aspect_ratio,
            render_mode: RenderMode::default(),
        }
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn far_plane_distance(&self) -> f64 {
        self.far_plane_distance
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    /// Renders one frame. Returns once every visible fragment has been
    /// written to the surface's colour and depth buffers.
    pub fn render_scene<'a, S: Surface>(&self, surface: &mut S, scene: &Scene<'a>) {
        let mut triangles: Vec<Triangle<'a>> = Vec::new();
        let mut active: Vec<usize> = Vec::new();

        self.collect_triangles(&mut triangles, &mut active, scene);
        let collected = active.len();

        self.to_camera_space(&mut triangles, &active, &scene.camera);
        self.cull_back_faces(&triangles, &mut active);
        self.light_vertices(&mut triangles, &active, &scene.lights);
        self.clip_near_plane(&mut triangles, &mut active);
        self.project_triangles(&mut triangles, &active);
        self.clip_screen_bounds(&mut triangles, &mut active);
        self.to_pixel_space(&mut triangles, &active, surface.width(), surface.height());

        trace!(collected, rasterized = active.len(), "frame pipeline");

        self.rasterize(surface, &triangles, &active);
    }

    /// Stage 1: copy every model triangle into the frame's working set,
    /// transformed into world space.
    fn collect_triangles<'a>(
        &self,
        triangles: &mut Vec<Triangle<'a>>,
        active: &mut Vec<usize>,
        scene: &Scene<'a>,
    ) {
        for model in &scene.models {
            let matrix = model_transform(model);

            for triangle in &model.mesh.triangles {
                let mut copy = *triangle;
                for point in &mut copy.points {
                    point.pos = matrix * point.pos;
                }
                active.push(triangles.len());
                triangles.push(copy);
            }
        }
    }

    /// Stage 2: move every vertex into camera space.
    fn to_camera_space(&self, triangles: &mut [Triangle<'_>], active: &[usize], camera: &Camera) {
        let matrix: Mat4 = camera_transform(camera);

        for &index in active {
            for point in &mut triangles[index].points {
                point.pos = matrix * point.pos;
            }
        }
    }

    /// Stage 3: drop triangles facing away from the camera. In camera
    /// space the view direction is +z, so a face whose normal has positive
    /// z points away and cannot be seen.
    fn cull_back_faces(&self, triangles: &[Triangle<'_>], active: &mut Vec<usize>) {
        let view_dir = vec4(0.0, 0.0, 1.0, 0.0);

        active.retain(|&index| {
            let [p0, p1, p2] = triangles[index].points;
            let normal = (p1.pos - p0.pos).cross(p2.pos - p1.pos);
            normal.dot(view_dir) <= 0.0
        });
    }

    /// Stage 4: Gouraud lighting. Each light accumulates into the
    /// per-vertex intensity, clamped to [0, 1] at the end.
    fn light_vertices(&self, triangles: &mut [Triangle<'_>], active: &[usize], lights: &[Light]) {
        for &index in active {
            let triangle = &mut triangles[index];

            for light in lights {
                match *light {
                    Light::Ambient { intensity } => {
                        for point in &mut triangle.points {
                            point.i += intensity;
                        }
                    }
                    Light::Directional {
                        intensity,
                        direction,
                    } => {
                        let [p0, p1, p2] = triangle.points;
                        let normal = (p1.pos - p0.pos).cross(p2.pos - p0.pos).normalized();
                        let angle_intensity = normal.dot(direction.normalized());

                        for point in &mut triangle.points {
                            point.i += angle_intensity * intensity;
                        }
                    }
                    Light::Point {
                        intensity,
                        position,
                    } => {
                        for point in &mut triangle.points {
                            let direction = (point.pos - position).normalized();
                            let scale = direction.dot(point.pos.normalized());
                            point.i += scale * intensity;
                        }
                    }
                }
            }

            for point in &mut triangle.points {
                point.i = point.i.clamp(0.0, 1.0);
            }
        }
    }

    /// Stage 5: clip against the viewing plane `z = view_plane_distance`
    /// in 3D, interpolating the camera-space attribute set. The
    /// divided-by-z companions of inserted vertices are left at zero;
    /// projection overwrites them before anything reads them.
    fn clip_near_plane(&self, triangles: &mut Vec<Triangle<'_>>, active: &mut Vec<usize>) {
        let boundary = self.view_plane_distance;

        clip_triangles(
            triangles,
            active,
            move |point| point.pos[2] >= boundary,
            move |a, b| {
                let t = (boundary - a.pos[2]) / (b.pos[2] - a.pos[2]);
                lerp_camera_attributes(a, b, t)
            },
        );
    }

    /// Stage 6: perspective projection toward the viewing plane. x and y
    /// scale by `z_near / z`; z itself is preserved as the depth source,
    /// and the divided-by-z companions are populated here.
    fn project_triangles(&self, triangles: &mut [Triangle<'_>], active: &[usize]) {
        for &index in active {
            for point in &mut triangles[index].points {
                let z = point.pos[2];
                let scale = self.view_plane_distance / z;

                point.pos[0] *= scale;
                point.pos[1] *= scale;

                point.inv_z = 1.0 / z;
                point.i_div_z = point.i * point.inv_z;
                point.r_div_z = point.r * point.inv_z;
                point.g_div_z = point.g * point.inv_z;
                point.b_div_z = point.b * point.inv_z;
                point.tex_x_div_z = point.tex_x * point.inv_z;
                point.tex_y_div_z = point.tex_y * point.inv_z;
            }
        }
    }

    /// Stage 7: clip in 2D against the four screen bounds, interpolating
    /// position and the divided-by-z companions.
    fn clip_screen_bounds(&self, triangles: &mut Vec<Triangle<'_>>, active: &mut Vec<usize>) {
        self.clip_screen_edge(triangles, active, 0, self.screen_left_bound, true);
        self.clip_screen_edge(triangles, active, 0, self.screen_right_bound, false);
        self.clip_screen_edge(triangles, active, 1, self.screen_top_bound, false);
        self.clip_screen_edge(triangles, active, 1, self.screen_bottom_bound, true);
    }

    /// One screen-edge pass: keep the half-plane at or above `bound` on
    /// `axis` when `keep_greater`, at or below it otherwise.
    fn clip_screen_edge(
        &self,
        triangles: &mut Vec<Triangle<'_>>,
        active: &mut Vec<usize>,
        axis: usize,
        bound: f64,
        keep_greater: bool,
    ) {
        clip_triangles(
            triangles,
            active,
            move |point| {
                if keep_greater {
                    point.pos[axis] >= bound
                } else {
                    point.pos[axis] <= bound
                }
            },
            move |a, b| {
                let t = (bound - a.pos[axis]) / (b.pos[axis] - a.pos[axis]);
                lerp_screen_attributes(a, b, t)
            },
        );
    }

    /// Stage 8: map normalised screen coordinates to pixel coordinates,
    /// flipping y so increasing world y moves up the screen. Values are
    /// rounded to pixel centres but stored back as floats; rasterisation
    /// floors them.
    fn to_pixel_space(
        &self,
        triangles: &mut [Triangle<'_>],
        active: &[usize],
        width: i32,
        height: i32,
    ) {
        let x_range = self.screen_right_bound - self.screen_left_bound;
        let y_range = self.screen_top_bound - self.screen_bottom_bound;

        for &index in active {
            for point in &mut triangles[index].points {
                point.pos[0] = ((point.pos[0] - self.screen_left_bound) / x_range
                    * (width - 1) as f64)
                    .round();
                point.pos[1] = (height - 1) as f64
                    - ((point.pos[1] - self.screen_bottom_bound) / y_range
                        * (height - 1) as f64)
                        .round();
            }
        }
    }

    /// Stage 9: hand every surviving triangle to the rasteriser.
    fn rasterize<S: Surface>(
        &self,
        surface: &mut S,
        triangles: &[Triangle<'_>],
        active: &[usize],
    ) {
        for &index in active {
            let triangle = &triangles[index];
            let [a, b, c] = triangle.points.map(to_pixel_coord);

            match self.render_mode {
                RenderMode::Filled => draw_shaded_triangle(surface, a, b, c, triangle.bitmap),
                RenderMode::Wireframe => draw_wireframe_triangle(surface, a, b, c, 255, 255, 255),
            }
        }
    }
}

/// Interpolate the camera-space attribute set at parameter `t` along
/// `a -> b`. Used before projection; the companions start at zero.
fn lerp_camera_attributes(a: &Point, b: &Point, t: f64) -> Point {
    Point {
        pos: a.pos.lerp(b.pos, t),
        i: a.i + (b.i - a.i) * t,
        r: a.r + (b.r - a.r) * t,
        g: a.g + (b.g - a.g) * t,
        b: a.b + (b.b - a.b) * t,
        tex_x: a.tex_x + (b.tex_x - a.tex_x) * t,
        tex_y: a.tex_y + (b.tex_y - a.tex_y) * t,
        ..Point::default()
    }
}

/// Interpolate position and the divided-by-z companion set at parameter
/// `t` along `a -> b`. Used after projection, where the camera-space
/// attributes are scratch.
fn lerp_screen_attributes(a: &Point, b: &Point, t: f64) -> Point {
    Point {
        pos: a.pos.lerp(b.pos, t),
        inv_z: a.inv_z + (b.inv_z - a.inv_z) * t,
        i_div_z: a.i_div_z + (b.i_div_z - a.i_div_z) * t,
        r_div_z: a.r_div_z + (b.r_div_z - a.r_div_z) * t,
        g_div_z: a.g_div_z + (b.g_div_z - a.g_div_z) * t,
        b_div_z: a.b_div_z + (b.b_div_z - a.b_div_z) * t,
        tex_x_div_z: a.tex_x_div_z + (b.tex_x_div_z - a.tex_x_div_z) * t,
        tex_y_div_z: a.tex_y_div_z + (b.tex_y_div_z - a.tex_y_div_z) * t,
        ..Point::default()
    }
}

fn to_pixel_coord(point: Point) -> PixelCoord {
    PixelCoord {
        x: point.pos[0].floor() as i32,
        y: point.pos[1].floor() as i32,
        inv_z: point.inv_z,
        i_div_z: point.i_div_z,
        r_div_z: point.r_div_z,
        g_div_z: point.g_div_z,
        b_div_z: point.b_div_z,
        tex_x_div_z: point.tex_x_div_z,
        tex_y_div_z: point.tex_y_div_z,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use approx::assert_relative_eq;

    use super::*;
    use crate::math::vec4;

    /// fov of pi/4 gives a viewing plane exactly one unit out.
    fn renderer() -> Renderer {
        Renderer::new(FRAC_PI_4, 1.0, 1000.0)
    }

    fn triangle(coords: [(f64, f64, f64); 3]) -> Triangle<'static> {
        Triangle::new(coords.map(|(x, y, z)| Point::new(vec4(x, y, z, 1.0))))
    }

    /// Winding that faces the camera (normal z is negative).
    fn facing_triangle(z: f64) -> Triangle<'static> {
        triangle([(0.0, 1.0, z), (1.0, 0.0, z), (-1.0, 0.0, z)])
    }

    #[test]
    fn view_plane_distance_comes_from_fov() {
        assert_relative_eq!(renderer().view_plane_distance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn screen_bounds_follow_aspect_ratio() {
        let r = Renderer::new(FRAC_PI_4, 640.0 / 480.0, 1000.0);
        assert_relative_eq!(r.screen_left_bound, -1.0);
        assert_relative_eq!(r.screen_right_bound, 1.0);
        assert_relative_eq!(r.screen_top_bound, 0.75);
        assert_relative_eq!(r.screen_bottom_bound, -0.75);
    }

    #[test]
    fn back_faces_are_culled_and_front_faces_kept() {
        let facing = facing_triangle(2.0);
        let away = triangle([(-1.0, 0.0, 2.0), (1.0, 0.0, 2.0), (0.0, 1.0, 2.0)]);

        let triangles = vec![facing, away];
        let mut active = vec![0, 1];
        renderer().cull_back_faces(&triangles, &mut active);

        assert_eq!(active, vec![0]);
    }

    #[test]
    fn cull_is_idempotent() {
        let triangles = vec![
            facing_triangle(2.0),
            triangle([(-1.0, 0.0, 2.0), (1.0, 0.0, 2.0), (0.0, 1.0, 2.0)]),
            facing_triangle(5.0),
        ];
        let mut active = vec![0, 1, 2];

        let r = renderer();
        r.cull_back_faces(&triangles, &mut active);
        let first_pass = active.clone();
        r.cull_back_faces(&triangles, &mut active);

        assert_eq!(active, first_pass);
    }

    #[test]
    fn ambient_light_raises_every_vertex() {
        let mut triangles = vec![facing_triangle(2.0)];
        let active = vec![0];

        renderer().light_vertices(
            &mut triangles,
            &active,
            &[Light::Ambient { intensity: 0.4 }],
        );

        for point in &triangles[0].points {
            assert_relative_eq!(point.i, 0.4);
        }
    }

    #[test]
    fn directional_light_antiparallel_to_normal_gives_full_intensity() {
        // facing_triangle's normal points along -z; a light shining along
        // -z hits it head on.
        let mut triangles = vec![facing_triangle(2.0)];
        let active = vec![0];

        renderer().light_vertices(
            &mut triangles,
            &active,
            &[Light::Directional {
                intensity: 0.8,
                direction: vec4(0.0, 0.0, -1.0, 0.0),
            }],
        );

        for point in &triangles[0].points {
            assert_relative_eq!(point.i, 0.8, epsilon = 1e-12);
        }
    }

    #[test]
    fn intensity_clamps_to_one() {
        let mut triangles = vec![facing_triangle(2.0)];
        let active = vec![0];

        renderer().light_vertices(
            &mut triangles,
            &active,
            &[
                Light::Ambient { intensity: 0.7 },
                Light::Ambient { intensity: 0.7 },
            ],
        );

        for point in &triangles[0].points {
            assert_relative_eq!(point.i, 1.0);
        }
    }

    #[test]
    fn point_light_matches_hand_computation() {
        let mut triangles = vec![triangle([(0.0, 0.0, 2.0), (1.0, 0.0, 2.0), (0.0, 1.0, 2.0)])];
        let active = vec![0];

        renderer().light_vertices(
            &mut triangles,
            &active,
            &[Light::Point {
                intensity: 0.5,
                position: vec4(0.0, 0.0, 0.0, 1.0),
            }],
        );

        // Vertex 0 sits at (0, 0, 2, 1): the direction from the light is
        // +z and the normalised position is (0, 0, 2, 1) / sqrt(5).
        let expected = (2.0 / 5.0_f64.sqrt()) * 0.5;
        assert_relative_eq!(triangles[0].points[0].i, expected, epsilon = 1e-12);
    }

    #[test]
    fn near_clip_splits_a_straddling_triangle() {
        // One vertex behind the viewing plane at z = 1, two in front.
        let mut triangles = vec![triangle([(0.0, 0.0, 0.5), (2.0, 0.0, 2.0), (0.0, 2.0, 2.0)])];
        let mut active = vec![0];

        let r = renderer();
        r.clip_near_plane(&mut triangles, &mut active);

        assert_eq!(active.len(), 2);
        for &index in &active {
            for point in &triangles[index].points {
                assert!(point.pos[2] >= r.view_plane_distance - 1e-12);
            }
        }

        // The split introduces an edge along the plane z = 1.
        let on_plane = active
            .iter()
            .flat_map(|&index| triangles[index].points)
            .filter(|p| (p.pos[2] - 1.0).abs() < 1e-12)
            .count();
        assert!(on_plane >= 2);
    }

    #[test]
    fn near_clip_leaves_companions_for_projection() {
        let mut triangles = vec![triangle([(0.0, 0.0, 0.5), (2.0, 0.0, 2.0), (0.0, 2.0, 2.0)])];
        let mut active = vec![0];

        let r = renderer();
        r.clip_near_plane(&mut triangles, &mut active);
        r.project_triangles(&mut triangles, &active);

        for &index in &active {
            for point in &triangles[index].points {
                assert!(point.inv_z > 0.0);
                assert_relative_eq!(point.inv_z, 1.0 / point.pos[2], epsilon = 1e-12);
                assert_relative_eq!(point.r_div_z, point.r * point.inv_z, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn projection_scales_toward_the_viewing_plane() {
        let mut triangles = vec![facing_triangle(2.0)];
        let active = vec![0];

        let mut expected = triangles[0];
        for point in &mut expected.points {
            point.pos[0] *= 0.5;
            point.pos[1] *= 0.5;
        }

        renderer().project_triangles(&mut triangles, &active);

        for (got, want) in triangles[0].points.iter().zip(expected.points) {
            assert_relative_eq!(got.pos[0], want.pos[0], epsilon = 1e-12);
            assert_relative_eq!(got.pos[1], want.pos[1], epsilon = 1e-12);
            // z is preserved as the depth source.
            assert_relative_eq!(got.pos[2], want.pos[2], epsilon = 1e-12);
            assert_relative_eq!(got.inv_z, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn screen_clip_bounds_every_vertex() {
        // Projected triangle poking past the left bound.
        let mut triangles = vec![triangle([(-3.0, 0.0, 1.0), (0.5, 0.6, 1.0), (0.5, -0.6, 1.0)])];
        let mut active = vec![0];
        for point in triangles[0].points.iter_mut() {
            point.inv_z = 1.0;
        }

        let r = renderer();
        r.clip_screen_bounds(&mut triangles, &mut active);

        assert!(!active.is_empty());
        for &index in &active {
            for point in &triangles[index].points {
                assert!(point.pos[0] >= r.screen_left_bound - 1e-12);
                assert!(point.pos[0] <= r.screen_right_bound + 1e-12);
                assert!(point.pos[1] >= r.screen_bottom_bound - 1e-12);
                assert!(point.pos[1] <= r.screen_top_bound + 1e-12);
            }
        }
    }

    #[test]
    fn viewport_maps_corners_to_pixel_corners() {
        let r = Renderer::new(FRAC_PI_4, 1.0, 1000.0);
        let mut triangles = vec![triangle([(-1.0, 1.0, 1.0), (1.0, -1.0, 1.0), (0.0, 0.0, 1.0)])];
        let active = vec![0];

        r.to_pixel_space(&mut triangles, &active, 640, 480);

        let points = &triangles[0].points;
        // Top-left of the screen region lands on pixel (0, 0).
        assert_relative_eq!(points[0].pos[0], 0.0);
        assert_relative_eq!(points[0].pos[1], 0.0);
        // Bottom-right lands on (width - 1, height - 1).
        assert_relative_eq!(points[1].pos[0], 639.0);
        assert_relative_eq!(points[1].pos[1], 479.0);
    }
}
