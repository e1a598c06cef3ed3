//! overlay-graph
//!
//! A cached scene graph for placing augmented-reality overlays (a guidance
//! lane, camera frustum, markers) relative to a moving camera. Pose updates
//! from the localization pipeline are written into node-local transforms; once
//! per video frame [`SceneGraph::render_frame`] hands the renderer one world
//! matrix per visible node plus the camera's view-projection matrix. World and
//! projection matrices are cached and only recomputed after something in
//! their chain changed.
//!
//! High-level modules
//! - `math`: pure TRS and perspective matrix composition
//! - `config`: per-session configuration (initial optics, camera pose, depth convention)
//! - `data_structures`: transforms, nodes, camera lens and the scene graph itself
//! - `frame`: per-frame output and its GPU-ready raw layout
//!
//! The graph is single-threaded and does no I/O; callers that receive pose
//! updates on other threads must marshal them onto the render thread first.

pub mod config;
pub mod data_structures;
pub mod frame;
pub mod math;

pub use config::SceneConfig;
pub use data_structures::{
    camera::{Lens, Optics, OpticsError, OpticsUpdate},
    node::{Node, NodeId, NodeKind},
    scene_graph::SceneGraph,
    transform::{LocalTransform, MatrixRaw, TransformUpdate},
};
pub use frame::{Frame, FrameNode, FrameUniform};

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
