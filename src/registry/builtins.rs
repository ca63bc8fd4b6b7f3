//! Built-in implementations of the tags a UBB board supports out of the box.
use html_escape::encode_double_quoted_attribute;

use super::{HtmlTagWriter, TagRef, TagSpec};
#[cfg(feature = "builtin_tags")]
use super::{Containment, TagFlags};
use crate::settings::Settings;

/// Tags allowed inside inline formatting.
#[cfg(feature = "builtin_tags")]
const INLINE: &str = "bold,italic,color,url,image";

macro_rules! simple_tag {
    ($doc:expr, $name:ident, $open:expr, $close:expr) => {
        #[derive(Copy, Clone, Debug, Default)]
        #[doc = $doc]
        #[doc = "# Exact output"]
        #[doc = "This tag converts exactly to"]
        #[doc = "```html"]
        #[doc = $open]
        #[doc = " contents"]
        #[doc = $close]
        #[doc = "```"]
        pub struct $name;

        impl HtmlTagWriter for $name {
            fn write_html(&self, _: TagRef<'_>, inner: &str, _: &Settings, out: &mut String) {
                out.push_str($open);
                out.push_str(inner);
                out.push_str($close);
            }
        }
    };
}

simple_tag! {
    "Bold text, which converts directly to HTML5 `<b>`.",
    BoldTag, "<b>", "</b>"
}
simple_tag! {
    "Italic text, which converts directly to HTML5 `<i>`.",
    ItalicTag, "<i>", "</i>"
}
simple_tag! {
    "A block quote, which converts directly to HTML5 `<blockquote>`.",
    BlockQuoteTag, "<blockquote>", "</blockquote>"
}
simple_tag! {
    "A reference box, which converts to a classed `<div>`.",
    RefTag, "<div class=\"gui-ubb-ref\">", "</div>"
}

/// Coloured text, `[color=#ff0000]`. The first character of the attribute (usually `=`) is skipped;
/// with no attribute the configured default colour is used.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorTag;

impl HtmlTagWriter for ColorTag {
    fn write_html(&self, tag: TagRef<'_>, inner: &str, settings: &Settings, out: &mut String) {
        let mut chars = tag.attr().chars();
        chars.next();
        let color = match chars.as_str() {
            "" => encode_double_quoted_attribute(&settings.default_color),
            color => color.into(),
        };

        out.push_str("<span style=\"color:");
        out.push_str(&color);
        out.push_str(";\">");
        out.push_str(inner);
        out.push_str("</span>");
    }
}

/// A hyperlink, either `[url href=...]text[/url]`, `[url=...]text[/url]` or `[url]address[/url]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct UrlTag;

impl HtmlTagWriter for UrlTag {
    fn write_html(&self, tag: TagRef<'_>, inner: &str, _: &Settings, out: &mut String) {
        let attr = tag.attr();
        let href = if attr.is_empty() {
            // [url]http://example.com/[bold]123[/bold]/[/url] links to the text parts only.
            tag.own_text()
        } else {
            attr.strip_prefix(" href=")
                .or_else(|| attr.strip_prefix('='))
                .unwrap_or(attr)
                .to_owned()
        };

        out.push_str("<a href=\"");
        out.push_str(&href);
        out.push_str("\">");
        out.push_str(inner);
        out.push_str("</a>");
    }
}

/// An image whose contents are its source address. Renders nothing when empty.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageTag;

impl HtmlTagWriter for ImageTag {
    fn write_html(&self, _: TagRef<'_>, inner: &str, _: &Settings, out: &mut String) {
        if inner.is_empty() {
            return;
        }
        out.push_str("<img src=\"");
        out.push_str(inner);
        out.push_str("\"/>");
    }
}

/// An embedded video or flash movie, shown as a placeholder image carrying the real address.
#[derive(Copy, Clone, Debug, Default)]
pub struct FlashTag;

impl HtmlTagWriter for FlashTag {
    fn write_html(&self, _: TagRef<'_>, inner: &str, settings: &Settings, out: &mut String) {
        if inner.is_empty() {
            return;
        }
        out.push_str("<img class=\"gui-ubb-flash\" data-src=\"");
        out.push_str(inner);
        out.push_str("\" src=\"");
        out.push_str(&encode_double_quoted_attribute(&settings.flash_image));
        out.push_str("\" width=\"480\" height=\"400\"/>");
    }
}

/// A list. Every line inside becomes one item; a leading or trailing empty line is ignored.
#[derive(Copy, Clone, Debug)]
pub struct ListTag {
    element: &'static str,
}

impl ListTag {
    pub const UNORDERED: ListTag = ListTag { element: "ul" };
    pub const ORDERED: ListTag = ListTag { element: "ol" };
}

impl HtmlTagWriter for ListTag {
    fn write_html(&self, _: TagRef<'_>, inner: &str, _: &Settings, out: &mut String) {
        let mut items: Vec<&str> = inner.split("<br/>").collect();
        if items.last().is_some_and(|item| item.is_empty()) {
            items.pop();
        }
        if items.first().is_some_and(|item| item.is_empty()) {
            items.remove(0);
        }

        out.push('<');
        out.push_str(self.element);
        out.push_str("><li>");
        out.push_str(&items.join("</li><li>"));
        out.push_str("</li></");
        out.push_str(self.element);
        out.push('>');
    }
}

#[cfg(feature = "builtin_tags")]
fn inline(writer: impl HtmlTagWriter + 'static, flags: TagFlags) -> TagSpec {
    TagSpec::new(INLINE).with_flags(flags).with_html(writer)
}

#[cfg(feature = "builtin_tags")]
fn block(writer: impl HtmlTagWriter + 'static) -> TagSpec {
    TagSpec::new(Containment::All)
        .with_flags(TagFlags::LINE_WRAP | TagFlags::BLOCK | TagFlags::NO_ATTRIBUTE)
        .with_html(writer)
}

#[cfg(feature = "builtin_tags")]
fn embed(writer: impl HtmlTagWriter + 'static) -> TagSpec {
    TagSpec::new(Containment::Nothing)
        .with_flags(TagFlags::NO_ATTRIBUTE)
        .with_html(writer)
}

/// Returns every built-in tag, keyed by name.
/// # Included tags
/// - `bold`, `italic`: may hold other inline tags, no attribute.
/// - `color`, `url`: may hold other inline tags, take an attribute.
/// - `image`, `video`, `flash`: text only, the text being an address.
/// - `blockquote`, `ul`, `ol`: blocks that may hold anything, including line breaks.
/// - `ref`: a text only block.
#[cfg(feature = "builtin_tags")]
pub fn all_tags() -> Vec<(&'static str, TagSpec)> {
    vec![
        ("bold", inline(BoldTag, TagFlags::NO_ATTRIBUTE)),
        ("italic", inline(ItalicTag, TagFlags::NO_ATTRIBUTE)),
        ("color", inline(ColorTag, TagFlags::empty())),
        ("url", inline(UrlTag, TagFlags::empty())),
        ("image", embed(ImageTag)),
        ("video", embed(FlashTag)),
        ("flash", embed(FlashTag)),
        ("blockquote", block(BlockQuoteTag)),
        ("ul", block(ListTag::UNORDERED)),
        ("ol", block(ListTag::ORDERED)),
        (
            "ref",
            TagSpec::new(Containment::Nothing)
                .with_flags(TagFlags::BLOCK | TagFlags::NO_ATTRIBUTE)
                .with_html(RefTag),
        ),
    ]
}

/// Returns every built-in tag, keyed by name. Built-in tags are disabled, so this is empty.
#[cfg(not(feature = "builtin_tags"))]
pub fn all_tags() -> Vec<(&'static str, TagSpec)> {
    vec![]
}
