use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use stagecraft_common::{EntityId, NodeId, Transform};

/// Errors from structural scene operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("parent node {0:?} not found")]
    ParentNotFound(NodeId),
    #[error("the scene root cannot be detached or removed")]
    RootImmutable,
}

/// A node in the scene graph.
///
/// Name, transform and visibility are freely editable; structure (parent,
/// children, entity tag) only changes through [`Scene`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    entity: Option<EntityId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            entity: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Tag this node as the scene presence of an entity.
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed scene graph rooted at a single immutable root node.
///
/// Nodes live in a flat `BTreeMap` keyed by [`NodeId`]; the tree is encoded
/// through parent and child ids. A detached node stays in the arena until it
/// is re-attached or removed, but is unreachable from the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene containing only its root.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::new("Scene"));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, root and detached nodes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the scene holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Attach `node` as the last child of `parent`. Any parent/children the
    /// value carried are discarded.
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::ParentNotFound(parent));
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Unlink a node from its parent. The node and its subtree stay in the
    /// arena.
    pub fn detach(&mut self, id: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = self
            .nodes
            .get_mut(&id)
            .ok_or(SceneError::NodeNotFound(id))?
            .parent
            .take();
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        Ok(())
    }

    /// Detach a node if needed and drop it together with its whole subtree.
    /// Returns the removed nodes in pre-order.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<Node>, SceneError> {
        self.detach(id)?;
        let ids = self.descendants(id);
        let removed: Vec<Node> = ids.iter().filter_map(|n| self.nodes.remove(n)).collect();
        debug!(node = id.0, count = removed.len(), "removed scene subtree");
        Ok(removed)
    }

    /// `id` followed by every node beneath it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(&id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Entity tags found in the subtree rooted at `id`, in pre-order.
    pub fn entities_in_subtree(&self, id: NodeId) -> Vec<EntityId> {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.nodes.get(&n).and_then(|node| node.entity))
            .collect()
    }

    /// Number of ancestors between `id` and the root, or `None` if the node
    /// is missing or not reachable from the root.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = id;
        while current != self.root {
            current = self.nodes.get(&current)?.parent?;
            depth += 1;
        }
        Some(depth)
    }

    /// Every node reachable from the root, in pre-order, root first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.descendants(self.root)
            .into_iter()
            .filter_map(move |id| self.nodes.get(&id).map(|n| (id, n)))
    }

    /// First reachable node whose name matches. Linear scan.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    /// Every reachable node whose name matches. Linear scan.
    pub fn find_all_by_name(&self, name: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.name == name)
            .map(|(id, _)| id)
            .collect()
    }

    /// Drop every node except the root.
    pub fn clear(&mut self) {
        let root = self.root;
        self.nodes.retain(|id, _| *id == root);
        if let Some(r) = self.nodes.get_mut(&root) {
            r.children.clear();
        }
    }
}
