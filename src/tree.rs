//! Arena backed UBB document tree.
//!
//! Nodes only ever point *down* by ownership; the upward link that recovery needs is the arena's
//! parent index, so there are no reference cycles to worry about.
use std::fmt;

use indextree::{Arena, NodeEdge, NodeId};

/// A single node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The sentinel every parse hangs off of. Never rendered.
    Root,
    /// A run of text, already HTML escaped.
    Text(String),
    /// A literal newline from the source.
    LineBreak,
    /// A registered tag and its children.
    Tag(TagNode),
}

/// The data carried by a tag node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    /// Lowercase tag name.
    pub name: String,
    /// Everything between the tag name and the closing bracket, verbatim. Empty if none.
    pub attr: String,
    /// Whether this node is a shell cloned during auto-close recovery rather than written by the user.
    pub implied: bool,
}

/// A parsed UBB document.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Arena<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Node::Root);
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena[id].get()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Returns the tag data for `id`, if it is a tag node.
    pub fn tag(&self, id: NodeId) -> Option<&TagNode> {
        match self.node(id) {
            Node::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Every node of the subtree at `id` in document order, seen once on entry and once on exit.
    pub fn traverse(&self, id: NodeId) -> impl Iterator<Item = NodeEdge> + '_ {
        id.traverse(&self.arena)
    }

    /// Whether rendering `id` would produce nothing at all: an implied shell with only implied
    /// shells beneath it.
    pub fn is_vacant(&self, id: NodeId) -> bool {
        id.descendants(&self.arena).all(|node| {
            matches!(
                self.node(node),
                Node::Tag(TagNode { implied: true, .. })
            )
        })
    }

    pub(crate) fn create(&mut self, node: Node) -> NodeId {
        self.arena.new_node(node)
    }

    /// Attach a detached node as the last child of `parent`.
    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.arena[child].parent().is_none(),
            "node is already attached, clone it instead"
        );
        parent.append(child, &mut self.arena);
    }

    /// Create a childless, detached copy of the tag at `id`, marked as implied.
    pub(crate) fn shell(&mut self, id: NodeId) -> NodeId {
        let node = match self.node(id) {
            Node::Tag(tag) => Node::Tag(TagNode {
                implied: true,
                ..tag.clone()
            }),
            other => other.clone(),
        };
        self.create(node)
    }

    /// Follow last children down from `id` until reaching a node without any.
    pub(crate) fn deepest_child(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(last) = self.arena[node].last_child() {
            node = last;
        }
        node
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// A compact outline, mostly useful for tests: `bold("a", ~italic()), BR, "b"`.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in self.traverse(self.root) {
            match edge {
                NodeEdge::Start(id) => {
                    if self.arena[id].previous_sibling().is_some() {
                        f.write_str(", ")?;
                    }
                    match self.node(id) {
                        Node::Root => {}
                        Node::Text(text) => write!(f, "{text:?}")?,
                        Node::LineBreak => f.write_str("BR")?,
                        Node::Tag(tag) => {
                            if tag.implied {
                                f.write_str("~")?;
                            }
                            f.write_str(&tag.name)?;
                            if !tag.attr.is_empty() {
                                write!(f, "{{{}}}", tag.attr)?;
                            }
                            f.write_str("(")?;
                        }
                    }
                }
                NodeEdge::End(id) => {
                    if self.tag(id).is_some() {
                        f.write_str(")")?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, TagNode, Tree};

    fn tag(name: &str, attr: &str) -> Node {
        Node::Tag(TagNode {
            name: name.to_owned(),
            attr: attr.to_owned(),
            implied: false,
        })
    }

    #[test]
    pub fn outline() {
        let mut tree = Tree::new();
        let color = tree.create(tag("color", "=#f00"));
        let text = tree.create(Node::Text("hi".to_owned()));
        let br = tree.create(Node::LineBreak);
        tree.append(tree.root(), color);
        tree.append(color, text);
        tree.append(tree.root(), br);

        assert_eq!(tree.to_string(), r#"color{=#f00}("hi"), BR"#);
    }

    #[test]
    pub fn outline_of_a_deep_tree() {
        let mut tree = Tree::new();
        let mut parent = tree.root();
        for _ in 0..50_000 {
            let bold = tree.create(tag("bold", ""));
            tree.append(parent, bold);
            parent = bold;
        }

        let outline = tree.to_string();
        assert!(outline.starts_with("bold(bold("));
        assert_eq!(outline.len(), 50_000 * "bold()".len());
    }

    #[test]
    pub fn shell_drops_children_and_keeps_attr() {
        let mut tree = Tree::new();
        let url = tree.create(tag("url", " href=x"));
        let text = tree.create(Node::Text("x".to_owned()));
        tree.append(tree.root(), url);
        tree.append(url, text);

        let shell = tree.shell(url);
        assert!(tree.parent(shell).is_none());
        assert_eq!(tree.children(shell).count(), 0);
        assert_eq!(
            tree.tag(shell),
            Some(&TagNode {
                name: "url".to_owned(),
                attr: " href=x".to_owned(),
                implied: true,
            })
        );
    }

    #[test]
    pub fn deepest_child_and_vacancy() {
        let mut tree = Tree::new();
        let bold = tree.create(tag("bold", ""));
        let outer = tree.shell(bold);
        let inner = tree.shell(bold);
        tree.append(outer, inner);

        assert_eq!(tree.deepest_child(outer), inner);
        assert!(tree.is_vacant(outer));
        assert!(!tree.is_vacant(bold));

        let text = tree.create(Node::Text("x".to_owned()));
        tree.append(inner, text);
        assert!(!tree.is_vacant(outer));
    }
}
