//! Re-serializes a parsed [Tree] as canonical UBB.
//!
//! Because the tree only ever holds properly nested tags, the output is always well formed, and
//! parsing it again yields the same output.
use html_escape::decode_html_entities;
use indextree::NodeEdge;

use crate::{
    registry::{Registry, TagRef},
    tree::{Node, Tree},
};

/// Serializes a [Tree] back to UBB text.
pub struct FixSerializer<'a> {
    registry: &'a Registry,
}

impl<'a> FixSerializer<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn serialize(&self, tree: &Tree) -> String {
        // One buffer per open tag, paired with whether anything beneath it was written.
        let mut stack: Vec<(String, bool)> = vec![(String::new(), false)];

        for edge in tree.traverse(tree.root()) {
            match edge {
                NodeEdge::Start(id) => {
                    if tree.tag(id).is_some() {
                        stack.push((String::new(), false));
                        continue;
                    }
                    let Some((out, filled)) = stack.last_mut() else {
                        continue;
                    };
                    match tree.node(id) {
                        Node::Text(text) => {
                            *filled = true;
                            escape_into(text, out);
                        }
                        Node::LineBreak => {
                            *filled = true;
                            out.push('\n');
                        }
                        Node::Root | Node::Tag(_) => {}
                    }
                }
                NodeEdge::End(id) => {
                    let Some(tag) = TagRef::new(tree, id) else {
                        continue;
                    };
                    let Some((inner, filled)) = stack.pop() else {
                        continue;
                    };
                    if tree.tag(id).is_some_and(|node| node.implied) && !filled {
                        continue;
                    }
                    if let Some((out, filled)) = stack.last_mut() {
                        *filled = true;
                        self.write_tag(tag, &inner, out);
                    }
                }
            }
        }

        stack.pop().map(|(out, _)| out).unwrap_or_default()
    }

    fn write_tag(&self, tag: TagRef<'_>, inner: &str, out: &mut String) {
        match self.registry.get(tag.name()) {
            Some(spec) => match spec.fix_writer() {
                Some(writer) => writer.write_fix(tag, inner, out),
                None => write_canonical(tag, !spec.has_no_attribute(), inner, out),
            },
            None => write_canonical(tag, true, inner, out),
        }
    }
}

/// Write `[name attr]inner[/name]`, leaving the attribute out unless `with_attr`.
pub fn write_canonical(tag: TagRef<'_>, with_attr: bool, inner: &str, out: &mut String) {
    out.push('[');
    out.push_str(tag.name());
    if with_attr {
        escape_into(tag.attr(), out);
    }
    out.push(']');
    out.push_str(inner);
    out.push_str("[/");
    out.push_str(tag.name());
    out.push(']');
}

/// Undo the HTML escaping applied before parsing, then backslash escape `\`, `[` and `]`.
pub fn escape_into(text: &str, out: &mut String) {
    for c in decode_html_entities(text).chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
}

#[cfg(all(test, feature = "builtin_tags"))]
mod tests;
