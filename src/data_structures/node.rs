//! Scene nodes: identifiers, type tags and the per-node transform cache.

use std::cell::Cell;

use cgmath::{Matrix4, Point3, Quaternion, SquareMatrix, Vector3};

use crate::data_structures::{camera::Lens, transform::LocalTransform};

/// Identifier for a node in the [`SceneGraph`](crate::data_structures::scene_graph::SceneGraph).
///
/// A slot index plus a generation counter. The generation is bumped whenever
/// a freed slot is reused, so an id kept after [`remove`] never aliases a
/// different live node.
///
/// [`remove`]: crate::data_structures::scene_graph::SceneGraph::remove
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// Closed set of node roles.
///
/// Nodes differ only by this tag; the camera is the one kind carrying an
/// extra capability (its [`Lens`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Root,
    Camera,
    /// Guidance lane overlay, carries route geometry.
    Lane,
    /// Ground grid overlay.
    Grid,
    /// Markers, frustum gizmos and anything else.
    Generic,
}

/// A node in the scene tree.
///
/// The world matrix is cached in a `Cell` so it can be refreshed lazily
/// from `&self` reads. While `dirty` is false, `world` equals the parent's
/// world matrix times this node's local matrix.
#[derive(Debug)]
pub struct Node {
    pub(crate) generation: u32,
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    pub(crate) local: LocalTransform,
    pub(crate) visible: bool,

    // Hierarchy
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    // Cached computed values
    pub(crate) dirty: Cell<bool>,
    pub(crate) world: Cell<Matrix4<f32>>,

    // Kind-specific payload
    pub(crate) lens: Option<Lens>,
    pub(crate) route: Vec<Point3<f32>>,
}

impl Node {
    pub(crate) fn new(generation: u32, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            generation,
            label: label.into(),
            kind,
            local: LocalTransform::new(),
            visible: true,
            parent: None,
            children: Vec::new(),
            dirty: Cell::new(true),
            world: Cell::new(Matrix4::identity()),
            lens: None,
            route: Vec::new(),
        }
    }

    pub(crate) fn with_lens(mut self, lens: Lens) -> Self {
        self.lens = Some(lens);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_camera(&self) -> bool {
        self.kind == NodeKind::Camera
    }

    /// The camera capability; `None` on every other node.
    pub fn lens(&self) -> Option<&Lens> {
        self.lens.as_ref()
    }

    pub fn local_transform(&self) -> &LocalTransform {
        &self.local
    }

    pub fn position(&self) -> Vector3<f32> {
        self.local.position
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        self.local.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.local.scale
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order, which is also render order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// The cached world matrix, meaningful only while the node is clean.
    pub fn cached_world(&self) -> Matrix4<f32> {
        self.world.get()
    }

    /// Route polyline in node-local coordinates. Empty for non-lane nodes.
    pub fn route(&self) -> &[Point3<f32>] {
        &self.route
    }

    /// Marks this node dirty. Returns false if it already was.
    pub(crate) fn mark_dirty(&self) -> bool {
        !self.dirty.replace(true)
    }

    pub(crate) fn store_world(&self, world: Matrix4<f32>) {
        self.world.set(world);
        self.dirty.set(false);
    }
}
