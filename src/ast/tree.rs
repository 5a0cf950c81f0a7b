use crate::ast::{Construct, Target};

/// Index of a node in a [`ParseTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub(crate) construct: Construct,
    pub(crate) target: Target,
    pub(crate) children: Vec<NodeId>,
}

/// A rooted parse tree stored as an arena of nodes addressed by index.
///
/// Ownership is strictly top-down: every node except the root is the
/// child of exactly one parent, and no node is shared or cyclic. The
/// builder restructures the tree through the crate-internal mutators;
/// once a compile call returns, the tree is read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ParseTree {
    pub(crate) fn new(root: Construct, target: Target) -> Self {
        ParseTree {
            nodes: vec![Node {
                construct: root,
                target,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn construct(&self, id: NodeId) -> &Construct {
        &self.nodes[id.0].construct
    }

    pub fn target(&self, id: NodeId) -> &Target {
        &self.nodes[id.0].target
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].children.len()
    }

    /// Child of `id` at position `index`.
    pub fn child_at(&self, id: NodeId, index: usize) -> NodeId {
        self.nodes[id.0].children[index]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a node without attaching it to a parent.
    pub(crate) fn alloc(&mut self, construct: Construct, target: Target) -> NodeId {
        self.nodes.push(Node {
            construct,
            target,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Allocate a node and append it to `parent`'s children.
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        construct: Construct,
        target: Target,
    ) -> NodeId {
        let id = self.alloc(construct, target);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Detach and return the children of `parent` from `from` onward.
    pub(crate) fn split_children(&mut self, parent: NodeId, from: usize) -> Vec<NodeId> {
        self.nodes[parent.0].children.split_off(from)
    }

    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.nodes[parent.0].children = children;
    }
}
