//! Session configuration.
//!
//! A [`SceneConfig`] fixes the camera's starting optics and pose and the
//! clip-space depth convention shared with the renderer. It is consumed once
//! by [`SceneGraph::new`](crate::data_structures::scene_graph::SceneGraph::new).

use cgmath::{Quaternion, Vector3};

use crate::{
    data_structures::{camera::Optics, transform::LocalTransform},
    math::DepthRange,
};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub optics: Optics,
    pub camera_pose: LocalTransform,
    pub depth_range: DepthRange,
    /// Whether the camera hangs under the root or sits parallel to it.
    pub camera_under_root: bool,
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optics(mut self, optics: Optics) -> Self {
        self.optics = optics;
        self
    }

    pub fn with_camera_position(mut self, position: impl Into<Vector3<f32>>) -> Self {
        self.camera_pose.position = position.into();
        self
    }

    pub fn with_camera_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.camera_pose.rotation = rotation;
        self
    }

    pub fn with_depth_range(mut self, depth_range: DepthRange) -> Self {
        self.depth_range = depth_range;
        self
    }

    pub fn with_camera_detached(mut self) -> Self {
        self.camera_under_root = false;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            optics: Optics::default(),
            camera_pose: LocalTransform::new(),
            depth_range: DepthRange::default(),
            camera_under_root: true,
        }
    }
}
