// Copyright (c) 2018 Fabian Schuiki

//! An arena of sentential forms explored by the derivation search.
//!
//! Nodes are addressed by index and point to their parent. A node whose
//! subtree has died is pruned: its form is dropped and the parent loses a
//! live child, which may in turn prune the parent.

use crate::grammar::Symbol;
use crate::search::Step;

/// A node in the search tree.
#[derive(Debug)]
pub struct Node {
    form: Vec<Symbol>,
    step: Option<Step>,
    parent: Option<NodeId>,
    live_children: usize,
    alive: bool,
}

/// A unique node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The search tree.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<Node>,
    live: usize,
}

impl SearchTree {
    /// Create a tree with a single root form.
    pub fn with_root(form: Vec<Symbol>) -> SearchTree {
        SearchTree {
            nodes: vec![Node {
                form,
                step: None,
                parent: None,
                live_children: 0,
                alive: true,
            }],
            live: 1,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add a form derived from `parent` by applying `step`.
    pub fn add_child(&mut self, parent: NodeId, form: Vec<Symbol>, step: Step) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            form,
            step: Some(step),
            parent: Some(parent),
            live_children: 0,
            alive: true,
        });
        self.nodes[parent.0].live_children += 1;
        self.live += 1;
        id
    }

    /// The form of a node. Empty once the node has been pruned.
    pub fn form(&self, id: NodeId) -> &[Symbol] {
        &self.nodes[id.0].form
    }

    /// Whether a node is still alive.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes[id.0].alive
    }

    /// Prune a node and every ancestor left without live children.
    pub fn prune(&mut self, id: NodeId) {
        let mut next = Some(id);
        while let Some(id) = next.take() {
            let node = &mut self.nodes[id.0];
            if !node.alive {
                break;
            }
            node.alive = false;
            node.form = Vec::new();
            self.live -= 1;
            if let Some(parent) = node.parent {
                let parent_node = &mut self.nodes[parent.0];
                parent_node.live_children -= 1;
                if parent_node.live_children == 0 {
                    next = Some(parent);
                }
            }
        }
    }

    /// The steps leading from the root to a node.
    pub fn path(&self, id: NodeId) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            steps.extend(node.step);
            current = node.parent;
        }
        steps.reverse();
        steps
    }

    /// The number of live nodes.
    pub fn live(&self) -> usize {
        self.live
    }

    /// The number of nodes ever created.
    pub fn total(&self) -> usize {
        self.nodes.len()
    }
}
