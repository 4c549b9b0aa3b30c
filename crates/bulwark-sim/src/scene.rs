//! Renderer-facing collaborator interface.
//!
//! The simulation never touches meshes or materials. It asks the scene graph
//! to place a loaded template, to remove it, to resolve a hit node to its
//! parent, and to create or release beam visuals.

use std::collections::{HashMap, HashSet};

use glam::{DQuat, DVec3};

use bulwark_core::types::{BeamHandle, ModelTemplate, NodeId};

/// Beams shorter than this are not drawable.
const MIN_BEAM_LENGTH: f64 = 0.001;

pub trait SceneGraph {
    /// Instantiate a template at a world transform and return its root node.
    fn attach(&mut self, template: &ModelTemplate, position: DVec3, orientation: DQuat) -> NodeId;

    /// Remove a node and everything below it. Unknown nodes are ignored.
    fn remove(&mut self, node: NodeId);

    /// Parent of a node, `None` for roots and unknown nodes.
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Create a beam visual between two points. `None` if it cannot be drawn.
    fn request_beam(&mut self, from: DVec3, to: DVec3) -> Option<BeamHandle>;

    /// Release a beam visual. Must be idempotent.
    fn release_beam(&mut self, beam: BeamHandle);
}

/// Scene graph without a renderer: keeps node and beam bookkeeping only.
///
/// Each attached model gets a root node plus `parts_per_model` child nodes,
/// so hit tests against sub-parts can be exercised.
#[derive(Debug)]
pub struct HeadlessScene {
    parts_per_model: usize,
    next_node: u64,
    next_beam: u64,
    parents: HashMap<NodeId, Option<NodeId>>,
    children: HashMap<NodeId, Vec<NodeId>>,
    beams: HashSet<BeamHandle>,
    beams_requested: u64,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new(2)
    }
}

impl HeadlessScene {
    pub fn new(parts_per_model: usize) -> Self {
        Self {
            parts_per_model,
            next_node: 1,
            next_beam: 1,
            parents: HashMap::new(),
            children: HashMap::new(),
            beams: HashSet::new(),
            beams_requested: 0,
        }
    }

    /// Direct children of a node (empty for unknown nodes).
    pub fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.parents.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.parents.len()
    }

    pub fn active_beams(&self) -> usize {
        self.beams.len()
    }

    pub fn is_beam_active(&self, beam: BeamHandle) -> bool {
        self.beams.contains(&beam)
    }

    pub fn beams_requested(&self) -> u64 {
        self.beams_requested
    }

    fn allocate_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let node = NodeId(self.next_node);
        self.next_node += 1;
        self.parents.insert(node, parent);
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(node);
        }
        node
    }
}

impl SceneGraph for HeadlessScene {
    fn attach(&mut self, _template: &ModelTemplate, _position: DVec3, _orientation: DQuat) -> NodeId {
        let root = self.allocate_node(None);
        for _ in 0..self.parts_per_model {
            self.allocate_node(Some(root));
        }
        root
    }

    fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.parents.remove(&node) else {
            return;
        };
        if let Some(parent) = parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|n| *n != node);
            }
        }
        let mut stack = self.children.remove(&node).unwrap_or_default();
        while let Some(child) = stack.pop() {
            self.parents.remove(&child);
            if let Some(grandchildren) = self.children.remove(&child) {
                stack.extend(grandchildren);
            }
        }
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied().flatten()
    }

    fn request_beam(&mut self, from: DVec3, to: DVec3) -> Option<BeamHandle> {
        if from.distance(to) <= MIN_BEAM_LENGTH {
            return None;
        }
        let beam = BeamHandle(self.next_beam);
        self.next_beam += 1;
        self.beams_requested += 1;
        self.beams.insert(beam);
        Some(beam)
    }

    fn release_beam(&mut self, beam: BeamHandle) {
        self.beams.remove(&beam);
    }
}
