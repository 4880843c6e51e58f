//! Builders for 4x4 homogeneous transforms.
//!
//! All matrices here right-multiply column vectors. The rotation builders
//! are named for the plane they rotate: `rotation_yz` turns about the x
//! axis, `rotation_xz` about y, `rotation_xy` about z.
//!
//! Two compound rotation orderings exist on purpose. Models placed in the
//! world use `rotation_model` (y-plane, then z-plane, then x-plane);
//! the camera uses `rotation_world` (x, then y, then z). Keeping the
//! orderings separate stops the camera's forward direction from coupling
//! through the gimbal when yaw and pitch combine.

use num_traits::Float;

use super::Matrix;

pub fn translation<T: Float>(x: T, y: T, z: T) -> Matrix<T, 4, 4> {
    let o = T::one();
    let n = T::zero();
    Matrix::new([
        [o, n, n, x],
        [n, o, n, y],
        [n, n, o, z],
        [n, n, n, o],
    ])
}

/// Scale about the origin.
pub fn enlargement<T: Float>(x: T, y: T, z: T) -> Matrix<T, 4, 4> {
    let o = T::one();
    let n = T::zero();
    Matrix::new([
        [x, n, n, n],
        [n, y, n, n],
        [n, n, z, n],
        [n, n, n, o],
    ])
}

/// Rotation in the y-z plane (about the x axis).
pub fn rotation_yz<T: Float>(angle: T) -> Matrix<T, 4, 4> {
    let (sin, cos) = angle.sin_cos();
    let o = T::one();
    let n = T::zero();
    Matrix::new([
        [o, n, n, n],
        [n, cos, sin, n],
        [n, -sin, cos, n],
        [n, n, n, o],
    ])
}

/// Rotation in the x-z plane (about the y axis).
pub fn rotation_xz<T: Float>(angle: T) -> Matrix<T, 4, 4> {
    let (sin, cos) = angle.sin_cos();
    let o = T::one();
    let n = T::zero();
    Matrix::new([
        [cos, n, -sin, n],
        [n, o, n, n],
        [sin, n, cos, n],
        [n, n, n, o],
    ])
}

/// Rotation in the x-y plane (about the z axis).
pub fn rotation_xy<T: Float>(angle: T) -> Matrix<T, 4, 4> {
    let (sin, cos) = angle.sin_cos();
    let o = T::one();
    let n = T::zero();
    Matrix::new([
        [cos, -sin, n, n],
        [sin, cos, n, n],
        [n, n, o, n],
        [n, n, n, o],
    ])
}

/// Compound rotation for placing a model in the world.
pub fn rotation_model<T: Float>(x: T, y: T, z: T) -> Matrix<T, 4, 4> {
    rotation_xz(y) * rotation_xy(z) * rotation_yz(x)
}

/// Compound rotation for orienting the world around the camera.
pub fn rotation_world<T: Float>(x: T, y: T, z: T) -> Matrix<T, 4, 4> {
    rotation_yz(x) * rotation_xz(y) * rotation_xy(z)
}
