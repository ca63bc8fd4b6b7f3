//! HTML serialization of a parsed [Tree].
//!
//! Text in the tree is already escaped, so this is a plain post-order walk: render the children,
//! then hand their joined output to the tag's [HtmlTagWriter][crate::HtmlTagWriter]. The walk keeps
//! its own stack of buffers, so nesting depth is bounded by memory rather than the call stack.
use std::mem;

use indextree::{NodeEdge, NodeId};

use crate::{
    registry::{Registry, TagRef},
    settings::Settings,
    tree::{Node, Tree},
};

/// Serializes a [Tree] to HTML using the registered tags.
pub struct HtmlSerializer<'a> {
    registry: &'a Registry,
    settings: &'a Settings,
    /// Set after a block tag so the newline right after it does not become a blank line.
    suppress_break: bool,
}

impl<'a> HtmlSerializer<'a> {
    pub fn new(registry: &'a Registry, settings: &'a Settings) -> Self {
        Self {
            registry,
            settings,
            suppress_break: false,
        }
    }

    pub fn serialize(&mut self, tree: &Tree) -> String {
        self.suppress_break = false;
        let mut stack = vec![Frame::default()];

        for edge in tree.traverse(tree.root()) {
            match edge {
                NodeEdge::Start(id) => match tree.node(id) {
                    Node::Root => {}
                    Node::Tag(_) => stack.push(Frame::default()),
                    Node::Text(text) => {
                        self.suppress_break = false;
                        if let Some(top) = stack.last_mut() {
                            top.filled = true;
                            top.out.push_str(text);
                        }
                    }
                    Node::LineBreak => {
                        let suppressed = mem::take(&mut self.suppress_break);
                        if let Some(top) = stack.last_mut() {
                            top.filled = true;
                            if !suppressed {
                                top.out.push_str("<br/>");
                            }
                        }
                    }
                },
                NodeEdge::End(id) => {
                    let Some(tag) = tree.tag(id) else {
                        continue;
                    };
                    let Some(inner) = stack.pop() else {
                        continue;
                    };
                    // An implied shell with nothing beneath it is skipped outright.
                    if tag.implied && !inner.filled {
                        continue;
                    }
                    if let Some(top) = stack.last_mut() {
                        top.filled = true;
                        self.write_tag(tree, id, &inner.out, &mut top.out);
                    }
                }
            }
        }

        stack.pop().map(|frame| frame.out).unwrap_or_default()
    }

    fn write_tag(&mut self, tree: &Tree, id: NodeId, inner: &str, out: &mut String) {
        let Some(tag) = TagRef::new(tree, id) else {
            return;
        };
        let Some(spec) = self.registry.get(tag.name()) else {
            return;
        };
        let Some(writer) = spec.html_writer() else {
            return;
        };

        self.suppress_break = spec.is_block();
        writer.write_html(tag, inner, self.settings, out);
    }
}

/// Output of one open node, and whether anything beneath it counts as content.
#[derive(Default)]
struct Frame {
    out: String,
    filled: bool,
}
