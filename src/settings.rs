use std::collections::HashMap;

use bitflags::bitflags;

use crate::registry::TagSpec;

bitflags! {
    /// Text handling switches for readers that turn rendered documents back into UBB.
    /// The UBB to HTML direction does not consult these.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TextFeature: u32 {
        /// Keep runs of white space as they are instead of collapsing them.
        const KEEP_WHITE_SPACE = 1 << 0;
        /// Keep newlines found in text instead of removing them.
        const KEEP_NEW_LINE = 1 << 1;
    }
}

impl Default for TextFeature {
    fn default() -> Self {
        TextFeature::KEEP_WHITE_SPACE
    }
}

/// Converter configuration. Nothing here is validated.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Colour of plain text; also used by `[color]` when it carries no colour.
    pub default_color: String,
    /// Colour of plain links.
    pub link_default_color: String,
    pub text_features: TextFeature,
    /// Placeholder image shown for `[video]` and `[flash]` embeds.
    pub flash_image: String,
    /// Tags added to, or replacing, the built-in ones.
    pub tags: HashMap<String, TagSpec>,
}

impl Settings {
    /// Register (or replace) a tag.
    pub fn with_tag(mut self, name: impl Into<String>, spec: TagSpec) -> Self {
        self.tags.insert(name.into(), spec);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_color: "#000000".to_owned(),
            link_default_color: "#006699".to_owned(),
            text_features: TextFeature::default(),
            flash_image: "/skin/imgs/flash.png".to_owned(),
            tags: HashMap::new(),
        }
    }
}
