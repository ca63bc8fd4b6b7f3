//! Single pass UBB scanner that builds a [Tree], repairing bad nesting as it goes.
//!
//! Whenever a token cannot go where the scanner currently is (an open tag the current tag may not
//! hold, a close tag for something further up, a newline inside a tag that does not wrap), the
//! ancestors standing in the way are closed. Each closed ancestor is cloned into an empty shell and
//! the shells are chained, innermost last, into a *carried fragment* which is reopened once the
//! token has been placed. `[bold][italic]x[/bold]y` thus reads as
//! `[bold][italic]x[/italic][/bold][italic]y[/italic]`.
use std::mem;

use html_escape::encode_double_quoted_attribute;
use indextree::NodeId;

use crate::{
    registry::Registry,
    tree::{Node, TagNode, Tree},
};

use self::rules::Resolver;

pub(crate) mod rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Normal,
    /// The previous character was an unescaped backslash.
    Escaped,
}

/// Result of walking up from the insertion point.
struct Walk {
    /// The first node that accepted, if any did.
    anchor: Option<NodeId>,
    /// Shells of every rejected node, outermost on top.
    carry: Option<NodeId>,
}

/// Builds a [Tree] out of UBB text. Each parser is good for one input.
pub struct UbbParser<'r> {
    rules: Resolver<'r>,
    tree: Tree,
    current: NodeId,
    /// A fragment the last open tag could not hold, offered to the next structural event.
    pending: Option<NodeId>,
    buf: String,
    /// Whether `buf` holds a `[` awaiting its `]`.
    in_bracket: bool,
    state: EscapeState,
}

impl<'r> UbbParser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        let tree = Tree::new();
        Self {
            rules: Resolver::new(registry),
            current: tree.root(),
            tree,
            pending: None,
            buf: String::new(),
            in_bracket: false,
            state: EscapeState::Normal,
        }
    }

    /// Parse `input` to completion. Never fails; malformed markup is repaired or kept as text.
    pub fn parse(mut self, input: &str) -> Tree {
        for c in preprocess(input).chars() {
            self.feed(c);
        }
        self.flush_text();

        if self.pending.take().is_some() {
            log::debug!(target: "ubb.parser", "input ended with a deferred fragment, dropping it");
        }

        self.tree
    }

    fn feed(&mut self, c: char) {
        match (self.state, c) {
            (_, '\n') => {
                self.state = EscapeState::Normal;
                self.flush_text();
                self.line_break();
            }
            (EscapeState::Escaped, c) => {
                self.state = EscapeState::Normal;
                self.buf.push(c);
            }
            (EscapeState::Normal, '\\') => self.state = EscapeState::Escaped,
            (EscapeState::Normal, '[') => {
                self.flush_text();
                self.buf.push('[');
                self.in_bracket = true;
            }
            (EscapeState::Normal, ']') => self.close_bracket(),
            (EscapeState::Normal, c) => self.buf.push(c),
        }
    }

    fn flush_text(&mut self) {
        if !self.buf.is_empty() {
            let text = self.tree.create(Node::Text(mem::take(&mut self.buf)));
            self.tree.append(self.current, text);
        }
        self.in_bracket = false;
    }

    fn close_bracket(&mut self) {
        if !self.in_bracket {
            self.buf.push(']');
            return;
        }
        self.in_bracket = false;

        let candidate = mem::take(&mut self.buf);
        let tag = split_tag(&candidate)
            .filter(|(_, name, _)| self.rules.is_registered(name))
            .map(|(closing, name, attr)| (closing, name, attr.to_owned()));

        match tag {
            Some((true, name, _)) => self.close_tag(&name),
            Some((false, name, attr)) => self.open_tag(name, attr),
            None => {
                // Not a tag we know, so it stays text.
                self.buf = candidate;
                self.buf.push(']');
            }
        }
    }

    fn open_tag(&mut self, name: String, attr: String) {
        log::trace!(target: "ubb.parser", "open [{name}{attr}]");
        let deferred = self.pending.take();
        let rules = self.rules;

        let walk = self.walk_up(|tree, node| rules.admits(tree, node, &name));
        let anchor = walk.anchor.unwrap_or(self.tree.root());

        let tag = self.tree.create(Node::Tag(TagNode {
            name,
            attr,
            implied: false,
        }));
        self.tree.append(anchor, tag);
        self.current = tag;

        if let Some(fragment) = walk.carry {
            if rules.admits_node(&self.tree, tag, fragment) {
                self.tree.append(tag, fragment);
                self.current = self.tree.deepest_child(fragment);
            } else {
                log::debug!(
                    target: "ubb.parser",
                    "deferring auto-closed tags until the next tag or line break"
                );
                self.pending = Some(fragment);
            }
        }

        self.settle(deferred);
    }

    fn close_tag(&mut self, name: &str) {
        log::trace!(target: "ubb.parser", "close [/{name}]");
        let deferred = self.pending.take();

        let walk = self.walk_up(|tree, node| tree.tag(node).is_some_and(|tag| tag.name == name));

        match walk.anchor.and_then(|matched| self.tree.parent(matched)) {
            Some(parent) => {
                self.current = parent;
                if let Some(fragment) = walk.carry {
                    self.tree.append(parent, fragment);
                    self.current = self.tree.deepest_child(fragment);
                }
            }
            None => {
                log::debug!(target: "ubb.parser", "dropping [/{name}] with no matching open tag");
            }
        }

        self.settle(deferred);
    }

    fn line_break(&mut self) {
        log::trace!(target: "ubb.parser", "line break");
        let deferred = self.pending.take();
        let rules = self.rules;

        let walk = self.walk_up(|tree, node| rules.wraps(tree, node));
        let anchor = walk.anchor.unwrap_or(self.tree.root());

        let br = self.tree.create(Node::LineBreak);
        self.tree.append(anchor, br);
        self.current = anchor;

        if let Some(fragment) = walk.carry {
            self.tree.append(anchor, fragment);
            self.current = self.tree.deepest_child(fragment);
        }

        self.settle(deferred);
    }

    /// Walk from the current node towards the root until `accept` holds, cloning every node passed
    /// on the way into a chain of shells.
    fn walk_up<F>(&mut self, accept: F) -> Walk
    where
        F: Fn(&Tree, NodeId) -> bool,
    {
        let mut node = self.current;
        let mut carry: Option<NodeId> = None;

        loop {
            if accept(&self.tree, node) {
                return Walk {
                    anchor: Some(node),
                    carry,
                };
            }
            let Some(parent) = self.tree.parent(node) else {
                return Walk { anchor: None, carry };
            };

            if let Some(tag) = self.tree.tag(node) {
                log::debug!(target: "ubb.parser", "auto-closing [{}]", tag.name);
            }
            let shell = self.tree.shell(node);
            if let Some(inner) = carry {
                self.tree.append(shell, inner);
            }
            carry = Some(shell);
            node = parent;
        }
    }

    /// Reopen a fragment deferred by the previous open tag, if the current node will hold it.
    fn settle(&mut self, deferred: Option<NodeId>) {
        let Some(fragment) = deferred else {
            return;
        };

        if self.rules.admits_node(&self.tree, self.current, fragment) {
            self.tree.append(self.current, fragment);
            self.current = self.tree.deepest_child(fragment);
        } else {
            log::debug!(
                target: "ubb.parser",
                "deferred fragment does not fit here, dropping it"
            );
        }
    }
}

/// Parse `input` against `registry`.
pub fn parse(registry: &Registry, input: &str) -> Tree {
    UbbParser::new(registry).parse(input)
}

/// HTML escape `&`, `<`, `>` and `"`, and turn CRLF into LF.
pub fn preprocess(input: &str) -> String {
    encode_double_quoted_attribute(input).replace("\r\n", "\n")
}

/// Split a bracket candidate (`[` up to, not including, `]`) into whether it closes, its lowercase
/// name, and whatever follows the name.
fn split_tag(candidate: &str) -> Option<(bool, String, &str)> {
    let body = candidate.strip_prefix('[')?;
    let (closing, body) = match body.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, body),
    };

    let name_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }

    let (name, rest) = body.split_at(name_len);
    Some((closing, name.to_ascii_lowercase(), rest))
}
