//! Transform math: pure functions composing local and projection matrices.
//!
//! All matrices are cgmath column-major `Matrix4<f32>` in a right-handed
//! coordinate system. Both [`compose_trs`] and [`compose_perspective`] follow
//! that convention so their products can be handed to the renderer as-is.

use std::f32::consts::PI;

use cgmath::{Matrix4, Quaternion, Rad, SquareMatrix, Vector3};

/// Matrix to convert from OpenGL clip-space depth [-1, 1] to WGPU depth [0, 1].
///
/// Remaps Z: `z' = 0.5 * z + 0.5`
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Clip-space depth convention expected by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DepthRange {
    /// OpenGL convention, near maps to -1 and far to 1.
    NegOneToOne,
    /// WGPU / Vulkan / Metal convention, near maps to 0 and far to 1.
    #[default]
    ZeroToOne,
}

impl DepthRange {
    /// The matrix that takes an OpenGL-style projection into this convention.
    pub fn correction(self) -> Matrix4<f32> {
        match self {
            DepthRange::NegOneToOne => Matrix4::identity(),
            DepthRange::ZeroToOne => OPENGL_TO_WGPU_MATRIX,
        }
    }
}

/// Compose a local transform as `T * R * S`.
///
/// Scale is applied first, then rotation, then translation.
pub fn compose_trs(
    position: Vector3<f32>,
    rotation: Quaternion<f32>,
    scale: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(position)
        * Matrix4::from(rotation)
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// Compose a right-handed perspective projection with OpenGL depth range.
///
/// `fov_radians` is the vertical field of view.
///
/// # Panics
///
/// Panics unless `aspect_ratio > 0`, `near > 0`, `far > near` and
/// `0 < fov_radians < π`. These values come from device-fixed optics, so a
/// violation is a bug in whoever supplied them.
pub fn compose_perspective(fov_radians: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    assert!(
        fov_radians > 0.0 && fov_radians < PI,
        "field of view must be in (0, π), got {fov_radians}"
    );
    assert!(aspect_ratio > 0.0, "aspect ratio must be positive, got {aspect_ratio}");
    assert!(near > 0.0, "near plane must be positive, got {near}");
    assert!(far > near, "far plane ({far}) must lie beyond near plane ({near})");
    cgmath::perspective(Rad(fov_radians), aspect_ratio, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, One, Rotation3, Vector4};

    fn assert_near(actual: Matrix4<f32>, expected: Matrix4<f32>) {
        let a: [[f32; 4]; 4] = actual.into();
        let e: [[f32; 4]; 4] = expected.into();
        for c in 0..4 {
            for r in 0..4 {
                assert!(
                    (a[c][r] - e[c][r]).abs() < 1e-5,
                    "mismatch at column {c}, row {r}: {actual:?} vs {expected:?}"
                );
            }
        }
    }

    #[test]
    fn identity_components_give_identity() {
        let m = compose_trs(
            Vector3::new(0.0, 0.0, 0.0),
            Quaternion::one(),
            Vector3::new(1.0, 1.0, 1.0),
        );
        assert_near(m, Matrix4::identity());
    }

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let m = compose_trs(
            Vector3::new(1.0, 2.0, 3.0),
            Quaternion::from_angle_z(Deg(90.0)),
            Vector3::new(2.0, 3.0, 4.0),
        );
        // x axis scaled by 2 turns into +y, y axis scaled by 3 turns into -x
        #[rustfmt::skip]
        let expected = Matrix4::new(
            0.0, 2.0, 0.0, 0.0,
            -3.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 4.0, 0.0,
            1.0, 2.0, 3.0, 1.0,
        );
        assert_near(m, expected);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let proj = compose_perspective(Rad::from(Deg(60.0)).0, 16.0 / 9.0, 0.1, 100.0);
        let near = proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn zero_to_one_depth_remaps_near_plane_to_zero() {
        let proj = DepthRange::ZeroToOne.correction()
            * compose_perspective(Rad::from(Deg(45.0)).0, 1.0, 0.5, 50.0);
        let near = proj * Vector4::new(0.0, 0.0, -0.5, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert_near(DepthRange::NegOneToOne.correction(), Matrix4::identity());
    }

    #[test]
    #[should_panic(expected = "aspect ratio must be positive")]
    fn rejects_non_positive_aspect() {
        compose_perspective(1.0, 0.0, 0.1, 10.0);
    }

    #[test]
    #[should_panic(expected = "must lie beyond near plane")]
    fn rejects_inverted_clip_planes() {
        compose_perspective(1.0, 1.0, 10.0, 10.0);
    }

    #[test]
    #[should_panic(expected = "field of view")]
    fn rejects_straight_angle_fov() {
        compose_perspective(PI, 1.0, 0.1, 10.0);
    }
}
