//! Local transformation data and its GPU-facing matrix layout.
//!
//! A node's placement relative to its parent is stored as position, rotation
//! (unit quaternion) and non-uniform scale. Pose collaborators send partial
//! updates through [`TransformUpdate`]; the renderer receives plain matrices
//! packed as [`MatrixRaw`].

use cgmath::{InnerSpace, Matrix4, One, Quaternion, Vector3};

use crate::math::compose_trs;

/// Position, rotation (as quaternion), and scale relative to the parent frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl LocalTransform {
    /// Create a new transform with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose_trs(self.position, self.rotation, self.scale)
    }

    /// Overwrite the supplied components, leaving the others untouched.
    pub(crate) fn apply(&mut self, update: &TransformUpdate) {
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(rotation) = update.rotation {
            self.rotation = normalized(rotation);
        }
        if let Some(scale) = update.scale {
            self.scale = scale;
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for LocalTransform {
    fn from(position: Vector3<f32>) -> Self {
        LocalTransform {
            position,
            ..Default::default()
        }
    }
}

fn normalized(rotation: Quaternion<f32>) -> Quaternion<f32> {
    let magnitude = rotation.magnitude();
    assert!(
        magnitude > f32::EPSILON && magnitude.is_finite(),
        "rotation quaternion must have non-zero finite length, got {rotation:?}"
    );
    rotation / magnitude
}

/// A partial pose update: only the `Some` components are written.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformUpdate {
    pub position: Option<Vector3<f32>>,
    pub rotation: Option<Quaternion<f32>>,
    pub scale: Option<Vector3<f32>>,
}

impl TransformUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: impl Into<Vector3<f32>>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale: impl Into<Vector3<f32>>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

impl From<LocalTransform> for TransformUpdate {
    fn from(transform: LocalTransform) -> Self {
        Self {
            position: Some(transform.position),
            rotation: Some(transform.rotation),
            scale: Some(transform.scale),
        }
    }
}

/**
 * The raw matrix is the actual data copied into GPU buffers.
 *
 * Column-major, matching cgmath and WGSL's `mat4x4<f32>`.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixRaw {
    pub model: [[f32; 4]; 4],
}

impl From<Matrix4<f32>> for MatrixRaw {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self {
            model: matrix.into(),
        }
    }
}
