//! Forgiving UBB (`[bold]bracket tag[/bold]`) markup conversion.
//!
//! Input is parsed into a [Tree] with per-tag nesting rules; bad nesting, stray close tags and
//! unknown tags are repaired or kept as text instead of being rejected. The tree can then be
//! rendered to HTML or written back out as canonical UBB.
//!
//! ```
//! use ubb::Ubb;
//!
//! let ubb = Ubb::default();
//! assert_eq!(ubb.to_html("[bold]hi[/bold]"), "<b>hi</b>");
//! assert_eq!(ubb.normalize("[bold][italic]x[/bold][/italic]"), "[bold][italic]x[/italic][/bold]");
//! ```

mod fix;
mod html;
mod parser;
mod registry;
mod settings;
mod tree;

use static_assertions::assert_impl_all;

pub use fix::FixSerializer;
pub use html::HtmlSerializer;
pub use parser::UbbParser;
pub use registry::{
    builtins, Containment, FixTagWriter, HtmlTagWriter, Registry, TagFlags, TagRef, TagSpec,
};
pub use settings::{Settings, TextFeature};
pub use tree::{Node, TagNode, Tree};

pub use indextree::{NodeEdge, NodeId};

/// A configured converter. Cheap to share; every call works on its own tree.
#[derive(Debug, Clone)]
pub struct Ubb {
    settings: Settings,
    registry: Registry,
}

assert_impl_all!(Ubb: Send, Sync);

impl Ubb {
    /// Build a converter. Tags in `settings.tags` are merged over the built-in ones.
    pub fn new(settings: Settings) -> Self {
        let registry = Registry::with_overrides(
            settings
                .tags
                .iter()
                .map(|(name, spec)| (name, spec.clone())),
        );
        Self { settings, registry }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse UBB text into a tree.
    pub fn parse(&self, text: &str) -> Tree {
        parser::parse(&self.registry, text)
    }

    /// Convert UBB text to HTML.
    pub fn to_html(&self, text: &str) -> String {
        let tree = self.parse(text);
        HtmlSerializer::new(&self.registry, &self.settings).serialize(&tree)
    }

    /// Rewrite UBB text in canonical form, with every tag properly closed and nested.
    pub fn normalize(&self, text: &str) -> String {
        let tree = self.parse(text);
        FixSerializer::new(&self.registry).serialize(&tree)
    }
}

impl Default for Ubb {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(all(test, feature = "builtin_tags"))]
mod tests;
