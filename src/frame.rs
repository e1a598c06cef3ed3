//! Per-frame output handed to the rendering collaborator.
//!
//! A [`Frame`] is produced by
//! [`SceneGraph::render_frame`](crate::data_structures::scene_graph::SceneGraph::render_frame).
//! It carries one world matrix per attached, visible node in render order and
//! the camera's view-projection matrix. [`Frame::raw_world_matrices`] and
//! [`Frame::uniform`] pack the same data as `bytemuck::Pod` structs that can
//! be written to GPU buffers directly.

use std::collections::HashMap;

use cgmath::{Matrix4, Point3};

use crate::data_structures::{
    node::{NodeId, NodeKind},
    transform::MatrixRaw,
};

/// World matrix of one node in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub world: Matrix4<f32>,
}

#[derive(Clone, Debug)]
pub struct Frame {
    nodes: Vec<FrameNode>,
    index: HashMap<NodeId, usize>,
    view_projection: Matrix4<f32>,
    camera_position: Point3<f32>,
}

impl Frame {
    pub(crate) fn new(view_projection: Matrix4<f32>, camera_position: Point3<f32>) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            view_projection,
            camera_position,
        }
    }

    pub(crate) fn push(&mut self, node: FrameNode) {
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    /// Entries in render order (depth-first, children in insertion order).
    pub fn nodes(&self) -> &[FrameNode] {
        &self.nodes
    }

    pub fn world(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.index.get(&id).map(|&i| self.nodes[i].world)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.view_projection
    }

    pub fn camera_position(&self) -> Point3<f32> {
        self.camera_position
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn raw_world_matrices(&self) -> Vec<MatrixRaw> {
        self.nodes.iter().map(|node| node.world.into()).collect()
    }

    pub fn uniform(&self) -> FrameUniform {
        FrameUniform {
            view_position: self.camera_position.to_homogeneous().into(),
            view_proj: self.view_projection.into(),
        }
    }
}

/**
 * Camera data as laid out in the shader's uniform buffer.
 *
 * `view_position` is homogeneous (w = 1) to keep 16-byte alignment.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}
