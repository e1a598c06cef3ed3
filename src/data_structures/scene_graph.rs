//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]: a parent
//! owns its children through its ordered child list, and each child keeps a
//! non-owning back-reference to its parent. The graph owns exactly one root
//! and one camera for its whole lifetime.
//!
//! # Caching
//!
//! Every node caches its world matrix behind a dirty flag and recomputes it
//! lazily on read by walking up to its parent. Any change to a node's local
//! transform, and any re-parenting, marks the node *and its entire subtree*
//! dirty, so a descendant can never serve a world matrix computed against an
//! ancestor's old pose.
//!
//! The graph maintains one structural invariant that keeps that marking cheap:
//! a dirty node never has a clean descendant. Clearing only happens on the
//! path from a freshly computed parent down to the queried node, so marking
//! can stop at the first node that is already dirty.
//!
//! # Removal
//!
//! [`SceneGraph::detach`] and [`SceneGraph::remove_all_children`] unlink only
//! the immediate children: each detached node keeps its own subtree, loses its
//! parent reference and is dirtied together with that subtree. Detached nodes
//! stay alive and can be attached again. [`SceneGraph::remove`] destroys a
//! node with everything below it.

use cgmath::{EuclideanSpace, Matrix4, Point3, Quaternion, SquareMatrix, Transform, Vector3};
use log::{debug, trace, warn};

use crate::{
    config::SceneConfig,
    data_structures::{
        camera::{Lens, Optics, OpticsError, OpticsUpdate},
        node::{Node, NodeId, NodeKind},
        transform::TransformUpdate,
    },
    frame::{Frame, FrameNode},
};

pub struct SceneGraph {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: NodeId,
    camera: NodeId,
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let dirty = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| n.is_dirty())
            .count();
        f.debug_struct("SceneGraph")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("nodes_dirty", &dirty)
            .field("free_list", &self.free_list.len())
            .field("root", &self.root)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl SceneGraph {
    /// Create the graph for one AR session: a root at the origin and the camera.
    pub fn new(config: SceneConfig) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            camera: NodeId::new(0, 0),
        };
        graph.root = graph.alloc(Node::new(0, NodeKind::Root, "root"));
        let lens = Lens::new(config.optics, config.depth_range);
        let mut camera = Node::new(0, NodeKind::Camera, "camera").with_lens(lens);
        camera.local.apply(&TransformUpdate::from(config.camera_pose));
        graph.camera = graph.alloc(camera);
        if config.camera_under_root {
            graph.link_parent(graph.camera, graph.root);
        }
        debug!(
            "scene graph created with {:?}, depth range {:?}",
            config.optics, config.depth_range
        );
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    // --- structure ---

    /// Create a detached node with identity transform.
    ///
    /// # Panics
    ///
    /// Panics for [`NodeKind::Root`] and [`NodeKind::Camera`]: the graph owns
    /// exactly one of each.
    pub fn create_node(&mut self, kind: NodeKind, label: impl Into<String>) -> NodeId {
        assert!(
            !matches!(kind, NodeKind::Root | NodeKind::Camera),
            "a scene graph owns exactly one {kind:?} node"
        );
        self.alloc(Node::new(0, kind, label))
    }

    /// Create a node and attach it under `parent` in one step.
    pub fn spawn(&mut self, kind: NodeKind, label: impl Into<String>, parent: NodeId) -> NodeId {
        let id = self.create_node(kind, label);
        self.attach(id, parent);
        id
    }

    /// Append `node` as the last child of `parent`, dirtying `node`'s subtree.
    ///
    /// # Panics
    ///
    /// Panics if either id is stale, if `node` is the root, if `node` already
    /// has a parent (detach it first), or if `parent` lies inside `node`'s
    /// subtree.
    pub fn attach(&mut self, node: NodeId, parent: NodeId) {
        assert!(node != self.root, "the root node cannot be attached");
        if let Some(owner) = self.node(node).parent {
            panic!("{node:?} is already a child of {owner:?}; detach it first");
        }
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            assert!(
                ancestor != node,
                "attaching {node:?} under {parent:?} would create a cycle"
            );
            cursor = self.node(ancestor).parent;
        }
        self.link_parent(node, parent);
        self.mark_subtree_dirty(node);
        debug!(
            "attached {:?} '{}' under {:?}",
            node,
            self.node(node).label,
            parent
        );
    }

    /// Remove `node` from its parent's child list and clear its parent reference.
    ///
    /// The node and its subtree stay alive. Detaching a parentless node is a no-op.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            warn!("{node:?} has no parent to be detached from");
            return;
        };
        self.unlink_parent(node, parent);
        self.mark_subtree_dirty(node);
        debug!("detached {node:?} from {parent:?}");
    }

    /// Detach every child of `parent`. `parent`'s own transform and cache are untouched.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.node_mut(parent).children);
        for &child in &children {
            self.node_mut(child).parent = None;
            self.mark_subtree_dirty(child);
        }
        debug!("detached {} children from {parent:?}", children.len());
    }

    /// Destroy `node` and its whole subtree. Their ids become stale.
    ///
    /// # Panics
    ///
    /// Panics for the root and the camera, which live as long as the graph.
    pub fn remove(&mut self, node: NodeId) {
        assert!(
            node != self.root && node != self.camera,
            "the root and camera nodes cannot be removed"
        );
        if let Some(parent) = self.node(node).parent {
            self.unlink_parent(node, parent);
        }
        let mut stack = vec![node];
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            // the camera can only be reached here if it was attached below `node`
            if id == self.camera {
                self.node_mut(id).parent = None;
                self.mark_subtree_dirty(id);
                continue;
            }
            if let Some(n) = self.nodes[id.idx()].take() {
                stack.extend(n.children);
                // a slot whose generation is exhausted is retired
                if self.generations[id.idx()] < u32::MAX {
                    self.free_list.push(id.idx());
                }
                freed += 1;
            }
        }
        debug!("removed {node:?} and {} descendants", freed - 1);
    }

    // --- local state ---

    /// Write the supplied transform components and dirty the node's subtree.
    pub fn set_local_transform(&mut self, id: NodeId, update: impl Into<TransformUpdate>) {
        let update = update.into();
        self.node_mut(id).local.apply(&update);
        self.mark_subtree_dirty(id);
    }

    pub fn set_position(&mut self, id: NodeId, position: impl Into<Vector3<f32>>) {
        self.set_local_transform(id, TransformUpdate::new().with_position(position));
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quaternion<f32>) {
        self.set_local_transform(id, TransformUpdate::new().with_rotation(rotation));
    }

    pub fn set_scale(&mut self, id: NodeId, scale: impl Into<Vector3<f32>>) {
        self.set_local_transform(id, TransformUpdate::new().with_scale(scale));
    }

    /// Hidden nodes and their subtrees are left out of [`Self::render_frame`].
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.node_mut(id).visible = visible;
    }

    /// Replace a lane's route polyline, given in the lane's local frame.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a [`NodeKind::Lane`] node.
    pub fn set_route(&mut self, id: NodeId, route: impl IntoIterator<Item = Point3<f32>>) {
        let node = self.node_mut(id);
        assert!(
            node.kind == NodeKind::Lane,
            "route geometry only applies to lane nodes, {id:?} is {:?}",
            node.kind
        );
        node.route.clear();
        node.route.extend(route);
        if node.route.len() < 2 {
            warn!("lane {id:?} route has {} points", node.route.len());
        }
    }

    // --- camera ---

    pub fn lens(&self) -> &Lens {
        match self.node(self.camera).lens() {
            Some(lens) => lens,
            None => unreachable!("the camera node always carries a lens"),
        }
    }

    pub fn optics(&self) -> &Optics {
        self.lens().optics()
    }

    /// Validate and apply an optics update, dirtying only the projection cache.
    pub fn try_set_optics(&mut self, update: OpticsUpdate) -> Result<(), OpticsError> {
        let camera = self.camera;
        let Some(lens) = self.node_mut(camera).lens.as_mut() else {
            unreachable!("the camera node always carries a lens");
        };
        let optics = lens.optics().updated(&update)?;
        lens.set_optics(optics);
        debug!("camera optics set to {optics:?}");
        Ok(())
    }

    /// Like [`Self::try_set_optics`] but treats invalid optics as a contract violation.
    ///
    /// # Panics
    ///
    /// Panics if the update would produce invalid optics. Values are never clamped.
    pub fn set_optics(&mut self, update: OpticsUpdate) {
        if let Err(e) = self.try_set_optics(update) {
            panic!("invalid camera optics {update:?}: {e}");
        }
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.lens().projection_matrix()
    }

    /// Inverse of the camera's world transform.
    ///
    /// # Panics
    ///
    /// Panics if the camera's world transform is singular (e.g. a zero scale).
    pub fn view_matrix(&self) -> Matrix4<f32> {
        match self.world_transform(self.camera).invert() {
            Some(view) => view,
            None => panic!("camera world transform is not invertible; check its scale"),
        }
    }

    /// `projection * inverse(camera world)`, computed fresh on every call.
    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    // --- queries ---

    /// World matrix of `id`, recomputed along the dirty part of its ancestor chain.
    pub fn world_transform(&self, id: NodeId) -> Matrix4<f32> {
        let node = self.node(id);
        if !node.is_dirty() {
            return node.cached_world();
        }
        let local = node.local.to_matrix();
        let world = match node.parent {
            Some(parent) => self.world_transform(parent) * local,
            None => local,
        };
        node.store_world(world);
        world
    }

    pub fn world_position(&self, id: NodeId) -> Point3<f32> {
        self.world_transform(id).transform_point(Point3::origin())
    }

    /// First node in depth-first order below the root that matches, skipping
    /// the camera and its subtree.
    pub fn find_node(&self, predicate: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        self.search(false, predicate)
    }

    /// Like [`Self::find_node`] but also searches the camera's subtree.
    pub fn find_node_including_camera(&self, predicate: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        self.search(true, predicate)
    }

    pub fn find_kind(&self, kind: NodeKind) -> Option<NodeId> {
        self.find_node(|node| node.kind == kind)
    }

    /// The lane-visualization node, if one is attached.
    pub fn lane(&self) -> Option<NodeId> {
        self.find_kind(NodeKind::Lane)
    }

    pub fn grid(&self) -> Option<NodeId> {
        self.find_kind(NodeKind::Grid)
    }

    /// Access a node; panics if `id` is stale.
    pub fn node(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling NodeId {id:?}"),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.generation())
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.node(id).is_dirty()
    }

    /// Number of live nodes, attached or not, including root and camera.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    // --- frame ---

    /// Collect the world matrix of every attached, visible node plus the
    /// camera's view-projection.
    ///
    /// Nodes are visited depth-first from the root, children in insertion
    /// order; a camera kept parallel to the root is visited after the root's
    /// tree. Only caches are refreshed, the scene itself is not modified.
    pub fn render_frame(&self) -> Frame {
        let view_projection = self.view_projection_matrix();
        let mut frame = Frame::new(view_projection, self.world_position(self.camera));
        let mut recomputed = 0;

        let mut starts = vec![self.root];
        if self.node(self.camera).parent.is_none() {
            starts.push(self.camera);
        }
        for start in starts {
            let mut stack = vec![start];
            while let Some(id) = stack.pop() {
                let node = self.node(id);
                if !node.visible {
                    continue;
                }
                if node.is_dirty() {
                    recomputed += 1;
                }
                frame.push(FrameNode {
                    id,
                    kind: node.kind,
                    world: self.world_transform(id),
                });
                stack.extend(node.children.iter().rev());
            }
        }
        trace!(
            "frame with {} nodes, {} world matrices recomputed",
            frame.len(),
            recomputed
        );
        frame
    }

    // --- internals ---

    fn alloc(&mut self, mut node: Node) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx] + 1;
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.generations.push(1);
            self.nodes.push(None);
            (self.nodes.len() - 1, 1)
        };
        node.generation = generation;
        self.nodes[idx] = Some(node);
        let idx = match u32::try_from(idx) {
            Ok(idx) => idx,
            Err(_) => panic!("scene graph exceeded u32::MAX node slots"),
        };
        NodeId::new(idx, generation)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self
            .nodes
            .get_mut(id.idx())
            .and_then(|n| n.as_mut())
            .filter(|n| n.generation == id.generation())
        {
            Some(node) => node,
            None => panic!("dangling NodeId {id:?}"),
        }
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    /// Dirty `id` and everything below it, stopping at nodes already dirty.
    fn mark_subtree_dirty(&self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            // a node that was already dirty has no clean descendants
            if node.mark_dirty() {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    fn search(&self, include_camera: bool, mut predicate: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = Vec::new();
        let mut starts = vec![self.root];
        if include_camera && self.node(self.camera).parent.is_none() {
            starts.push(self.camera);
        }
        for start in starts {
            let node = self.node(start);
            if start != self.root && predicate(node) {
                return Some(start);
            }
            stack.extend(node.children.iter().rev());
            while let Some(id) = stack.pop() {
                if id == self.camera && !include_camera {
                    continue;
                }
                let node = self.node(id);
                if predicate(node) {
                    return Some(id);
                }
                stack.extend(node.children.iter().rev());
            }
        }
        None
    }
}
