//! Nesting decisions made while building the tree.
use indextree::NodeId;

use crate::{
    registry::Registry,
    tree::{Node, Tree},
};

/// Answers "may this go here" questions against a [Registry].
#[derive(Clone, Copy)]
pub(crate) struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.is_registered(name)
    }

    /// Whether a tag called `child` may be placed directly inside `parent`. The root takes anything.
    pub fn admits(&self, tree: &Tree, parent: NodeId, child: &str) -> bool {
        match tree.node(parent) {
            Node::Root => true,
            Node::Tag(tag) => self
                .registry
                .containment(&tag.name)
                .is_some_and(|rule| rule.admits(child)),
            Node::Text(_) | Node::LineBreak => false,
        }
    }

    /// Whether `parent` can accept the tag at the top of `fragment`.
    pub fn admits_node(&self, tree: &Tree, parent: NodeId, fragment: NodeId) -> bool {
        tree.tag(fragment)
            .is_some_and(|tag| self.admits(tree, parent, &tag.name))
    }

    /// Whether a newline may be placed directly inside `node`. The root takes them.
    pub fn wraps(&self, tree: &Tree, node: NodeId) -> bool {
        match tree.node(node) {
            Node::Root => true,
            Node::Tag(tag) => self.registry.line_wrap(&tag.name),
            Node::Text(_) | Node::LineBreak => false,
        }
    }
}
