//! Engine data structures: transforms, nodes, the camera and the scene graph.
//!
//! This module contains the core data types for scene representation:
//!
//! - `transform` holds the local position/rotation/scale of a node and its raw GPU layout
//! - `node` defines node ids, type tags and the per-node world-matrix cache
//! - `camera` holds camera optics and the cached projection matrix
//! - `scene_graph` owns the node arena and implements hierarchy and cache invalidation

pub mod camera;
pub mod node;
pub mod scene_graph;
pub mod transform;
