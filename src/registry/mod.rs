//! Per-tag metadata and the render hooks attached to it.
use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use bitflags::bitflags;
use indextree::NodeId;
use static_assertions::assert_obj_safe;

use crate::{
    settings::Settings,
    tree::{Node, Tree},
};

bitflags! {
    /// Boolean properties of a tag.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TagFlags: u32 {
        /// A literal newline may appear inside the tag without closing it.
        const LINE_WRAP = 1 << 0;
        /// The tag renders as a block, so a line break right after it is swallowed.
        const BLOCK = 1 << 1;
        /// The tag takes no attribute; any given is dropped when normalizing.
        const NO_ATTRIBUTE = 1 << 2;
    }
}

/// Which tags may nest directly inside a tag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Containment {
    /// Text only.
    #[default]
    Nothing,
    /// Any tag.
    All,
    /// Only the listed (lowercase) tag names.
    Only(HashSet<String>),
}

impl Containment {
    /// Build an explicit allow list.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Whether a child tag called `name` may be placed directly inside.
    pub fn admits(&self, name: &str) -> bool {
        match self {
            Containment::Nothing => false,
            Containment::All => true,
            Containment::Only(names) => names.contains(name),
        }
    }

    fn normalized(&self) -> Self {
        match self {
            Containment::Only(names) => Self::only(names),
            other => other.clone(),
        }
    }
}

/// Parses the comma list form, `"*"` for everything and `""` for nothing.
impl From<&str> for Containment {
    fn from(list: &str) -> Self {
        match list.trim() {
            "*" => Containment::All,
            "" => Containment::Nothing,
            list => Containment::only(list.split(',')),
        }
    }
}

/// A read only view of a tag node handed to render hooks.
#[derive(Clone, Copy)]
pub struct TagRef<'a> {
    tree: &'a Tree,
    id: NodeId,
    name: &'a str,
    attr: &'a str,
}

impl<'a> TagRef<'a> {
    /// Returns `None` if `id` is not a tag node.
    pub fn new(tree: &'a Tree, id: NodeId) -> Option<Self> {
        let tag = tree.tag(id)?;
        Some(Self {
            tree,
            id,
            name: &tag.name,
            attr: &tag.attr,
        })
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The raw attribute text following the tag name, HTML escaped. Empty if none.
    pub fn attr(&self) -> &'a str {
        self.attr
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// The text of the direct text children, in order, ignoring nested tags and line breaks.
    pub fn own_text(&self) -> String {
        self.tree
            .children(self.id)
            .filter_map(|child| match self.tree.node(child) {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Converts a tag node to HTML.
pub trait HtmlTagWriter: Send + Sync {
    /// Write the HTML for `tag`, given the already rendered HTML of its children.
    /// # Remarks
    /// The `out` buffer provided may already have contents, an implementation must not overwrite prior contents.
    fn write_html(&self, tag: TagRef<'_>, inner: &str, settings: &Settings, out: &mut String);
}

assert_obj_safe!(HtmlTagWriter);

impl<F> HtmlTagWriter for F
where
    F: Fn(TagRef<'_>, &str, &Settings, &mut String) + Send + Sync,
{
    fn write_html(&self, tag: TagRef<'_>, inner: &str, settings: &Settings, out: &mut String) {
        self(tag, inner, settings, out)
    }
}

/// Converts a tag node back to UBB text when normalizing.
pub trait FixTagWriter: Send + Sync {
    /// Write the UBB for `tag`, given the already normalized UBB of its children.
    /// # Remarks
    /// The `out` buffer provided may already have contents, an implementation must not overwrite prior contents.
    fn write_fix(&self, tag: TagRef<'_>, inner: &str, out: &mut String);
}

assert_obj_safe!(FixTagWriter);

impl<F> FixTagWriter for F
where
    F: Fn(TagRef<'_>, &str, &mut String) + Send + Sync,
{
    fn write_fix(&self, tag: TagRef<'_>, inner: &str, out: &mut String) {
        self(tag, inner, out)
    }
}

/// Everything known about one tag.
#[derive(Clone, Default)]
pub struct TagSpec {
    contains: Containment,
    flags: TagFlags,
    html: Option<Arc<dyn HtmlTagWriter>>,
    fix: Option<Arc<dyn FixTagWriter>>,
}

impl TagSpec {
    pub fn new(contains: impl Into<Containment>) -> Self {
        Self {
            contains: contains.into(),
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: TagFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_html(mut self, writer: impl HtmlTagWriter + 'static) -> Self {
        self.html = Some(Arc::new(writer));
        self
    }

    pub fn with_fix(mut self, writer: impl FixTagWriter + 'static) -> Self {
        self.fix = Some(Arc::new(writer));
        self
    }

    pub fn contains(&self) -> &Containment {
        &self.contains
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    pub fn allows_line_breaks(&self) -> bool {
        self.flags.contains(TagFlags::LINE_WRAP)
    }

    pub fn is_block(&self) -> bool {
        self.flags.contains(TagFlags::BLOCK)
    }

    pub fn has_no_attribute(&self) -> bool {
        self.flags.contains(TagFlags::NO_ATTRIBUTE)
    }

    pub fn html_writer(&self) -> Option<&dyn HtmlTagWriter> {
        self.html.as_deref()
    }

    pub fn fix_writer(&self) -> Option<&dyn FixTagWriter> {
        self.fix.as_deref()
    }
}

impl fmt::Debug for TagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagSpec")
            .field("contains", &self.contains)
            .field("flags", &self.flags)
            .field("html", &self.html.is_some())
            .field("fix", &self.fix.is_some())
            .finish()
    }
}

/// The immutable set of known tags, plus the lookup tables derived from it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: HashMap<String, TagSpec>,
    containment: HashMap<String, Containment>,
    line_wrap: HashMap<String, bool>,
}

impl Registry {
    /// Construct a registry with no tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct a registry from the built-in tags with `overrides` layered on top.
    /// An override replaces the built-in entry of the same name entirely.
    pub fn with_overrides<I, S>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, TagSpec)>,
        S: AsRef<str>,
    {
        let builtins = builtins::all_tags()
            .into_iter()
            .map(|(name, spec)| (name.to_owned(), spec));
        let overrides = overrides
            .into_iter()
            .map(|(name, spec)| (name.as_ref().to_owned(), spec));

        Self::from_specs(builtins.chain(overrides))
    }

    /// Construct a registry from exactly the given tags.
    pub fn from_specs<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = (S, TagSpec)>,
        S: AsRef<str>,
    {
        let specs: HashMap<String, TagSpec> = specs
            .into_iter()
            .map(|(name, spec)| (name.as_ref().to_ascii_lowercase(), spec))
            .collect();

        let containment = specs
            .iter()
            .map(|(name, spec)| (name.clone(), spec.contains.normalized()))
            .collect();
        let line_wrap = specs
            .iter()
            .map(|(name, spec)| (name.clone(), spec.allows_line_breaks()))
            .collect();

        Self {
            specs,
            containment,
            line_wrap,
        }
    }

    pub fn get(&self, name: &str) -> Option<&TagSpec> {
        self.specs.get(name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// The derived containment rule for `name`.
    pub fn containment(&self, name: &str) -> Option<&Containment> {
        self.containment.get(name)
    }

    /// The derived line-wrap flag for `name`. Unknown tags never wrap.
    pub fn line_wrap(&self, name: &str) -> bool {
        self.line_wrap.get(name).copied().unwrap_or(false)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }
}

pub mod builtins;
