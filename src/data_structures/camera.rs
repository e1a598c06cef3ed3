//! Camera optics and the cached projection matrix.
//!
//! The projection is cached independently of the camera node's world
//! transform: moving the camera never dirties the projection and changing
//! the optics never dirties the world matrix.

use std::{cell::Cell, f32::consts::PI};

use cgmath::{Deg, Matrix4, Rad, SquareMatrix};
use thiserror::Error;

use crate::math::{DepthRange, compose_perspective};

/// Reasons a set of optical parameters is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum OpticsError {
    #[error("field of view must be in (0, π) radians, got {0}")]
    FieldOfView(f32),

    #[error("aspect ratio must be positive, got {0}")]
    AspectRatio(f32),

    #[error("near plane must be positive, got {0}")]
    NearPlane(f32),

    #[error("far plane ({far}) must lie beyond near plane ({near})")]
    ClipRange { near: f32, far: f32 },
}

/// Camera intrinsics. Always valid once constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optics {
    fov: Rad<f32>,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Optics {
    pub fn new(fov: impl Into<Rad<f32>>, aspect: f32, near: f32, far: f32) -> Result<Self, OpticsError> {
        let fov = fov.into();
        // NaN fails every comparison below and is rejected with the rest
        if !(fov.0 > 0.0 && fov.0 < PI) {
            return Err(OpticsError::FieldOfView(fov.0));
        }
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(OpticsError::AspectRatio(aspect));
        }
        if !(near > 0.0) {
            return Err(OpticsError::NearPlane(near));
        }
        if !(far > near && far.is_finite()) {
            return Err(OpticsError::ClipRange { near, far });
        }
        Ok(Self {
            fov,
            aspect,
            near,
            far,
        })
    }

    /// Validate a copy of `self` with the supplied fields replaced.
    pub fn updated(&self, update: &OpticsUpdate) -> Result<Self, OpticsError> {
        Self::new(
            update.fov.unwrap_or(self.fov),
            update.aspect.unwrap_or(self.aspect),
            update.near.unwrap_or(self.near),
            update.far.unwrap_or(self.far),
        )
    }

    pub fn fov(&self) -> Rad<f32> {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose_perspective(self.fov.0, self.aspect, self.near, self.far)
    }
}

impl Default for Optics {
    /// 45° vertical fov, 16:9, clipping between 0.1 and 500.
    fn default() -> Self {
        Self {
            fov: Deg(45.0).into(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

/// A partial optics update: only the `Some` fields are written.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OpticsUpdate {
    pub fov: Option<Rad<f32>>,
    pub aspect: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
}

impl OpticsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fov(mut self, fov: impl Into<Rad<f32>>) -> Self {
        self.fov = Some(fov.into());
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = Some(aspect);
        self
    }

    /// Aspect ratio from a viewport size in pixels.
    pub fn with_viewport(self, width: u32, height: u32) -> Self {
        self.with_aspect(width as f32 / height as f32)
    }

    pub fn with_near(mut self, near: f32) -> Self {
        self.near = Some(near);
        self
    }

    pub fn with_far(mut self, far: f32) -> Self {
        self.far = Some(far);
        self
    }
}

/// The camera capability carried only by the camera node.
///
/// Holds the optics plus a lazily recomputed projection with its own dirty flag.
#[derive(Debug)]
pub struct Lens {
    optics: Optics,
    depth: DepthRange,
    projection: Cell<Matrix4<f32>>,
    projection_dirty: Cell<bool>,
}

impl Lens {
    pub(crate) fn new(optics: Optics, depth: DepthRange) -> Self {
        Self {
            optics,
            depth,
            projection: Cell::new(Matrix4::identity()),
            projection_dirty: Cell::new(true),
        }
    }

    pub fn optics(&self) -> &Optics {
        &self.optics
    }

    pub fn depth_range(&self) -> DepthRange {
        self.depth
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty.get()
    }

    pub(crate) fn set_optics(&mut self, optics: Optics) {
        self.optics = optics;
        self.projection_dirty.set(true);
    }

    /// Projection matrix in the configured depth convention, recomputed only when stale.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        if self.projection_dirty.get() {
            let projection = self.depth.correction() * self.optics.to_matrix();
            self.projection.set(projection);
            self.projection_dirty.set(false);
            log::trace!("recomputed projection for {:?}", self.optics);
        }
        self.projection.get()
    }
}
