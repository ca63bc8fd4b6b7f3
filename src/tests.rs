use std::thread;

use pretty_assertions::assert_eq;

use crate::{Containment, Node, Settings, TagFlags, TagSpec, TextFeature, Ubb};

#[test]
pub fn default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.default_color, "#000000");
    assert_eq!(settings.link_default_color, "#006699");
    assert_eq!(settings.flash_image, "/skin/imgs/flash.png");
    assert!(settings.text_features.contains(TextFeature::KEEP_WHITE_SPACE));
    assert!(!settings.text_features.contains(TextFeature::KEEP_NEW_LINE));
    assert!(settings.tags.is_empty());
}

#[test]
pub fn settings_tags_merge_over_builtins() {
    let ubb = Ubb::new(
        Settings::default()
            .with_tag("Spoiler", TagSpec::new("*").with_flags(TagFlags::LINE_WRAP))
            .with_tag("ref", TagSpec::new(Containment::All)),
    );

    let registry = ubb.registry();
    assert!(registry.is_registered("spoiler"));
    assert!(registry.is_registered("bold"));
    assert!(registry.line_wrap("spoiler"));
    assert_eq!(registry.containment("ref"), Some(&Containment::All));
    assert!(!registry.get("ref").unwrap().is_block());
}

#[test]
pub fn parse_exposes_the_tree() {
    let tree = Ubb::default().parse("[bold]x[/bold]\n");
    let children: Vec<_> = tree.children(tree.root()).collect();
    assert_eq!(children.len(), 2);
    assert!(matches!(tree.node(children[0]), Node::Tag(tag) if tag.name == "bold"));
    assert_eq!(tree.node(children[1]), &Node::LineBreak);
}

#[test]
pub fn literal_brackets() {
    let ubb = Ubb::default();
    assert_eq!(ubb.to_html("a [ b ] c"), "a [ b ] c");
    assert_eq!(ubb.normalize("a [ b ] c"), r"a \[ b \] c");
}

#[test]
pub fn unknown_tags_pass_through() {
    assert_eq!(Ubb::default().to_html("[foo]hi[/foo]"), "[foo]hi[/foo]");
}

#[test]
pub fn overlapping_tags_are_auto_closed() {
    let ubb = Ubb::default();
    let input = "[bold][italic]x[/bold][/italic]";
    assert_eq!(ubb.normalize(input), "[bold][italic]x[/italic][/bold]");
    assert_eq!(
        ubb.to_html(input),
        ubb.to_html("[bold][italic]x[/italic][/bold]")
    );
}

#[test]
pub fn dangling_close() {
    assert_eq!(Ubb::default().to_html("hello[/bold]world"), "helloworld");
}

#[test]
pub fn containment_rejection() {
    let ubb = Ubb::default();
    assert_eq!(
        ubb.normalize("[italic]a[ul]b[/ul][/italic]"),
        "[italic]a[/italic][ul][italic]b[/italic][/ul]"
    );
    assert_eq!(
        ubb.to_html("[italic]a[ul]b[/ul][/italic]"),
        "<i>a</i><ul><li><i>b</i></li></ul>"
    );
}

#[test]
pub fn escaped_tags_are_text() {
    assert_eq!(Ubb::default().to_html("\\[bold\\]"), "[bold]");
}

#[test]
pub fn shared_between_threads() {
    let ubb = Ubb::default();
    thread::scope(|scope| {
        let bold = scope.spawn(|| ubb.to_html("[bold]a[/bold]"));
        let italic = scope.spawn(|| ubb.to_html("[italic]b[/italic]"));
        assert_eq!(bold.join().unwrap(), "<b>a</b>");
        assert_eq!(italic.join().unwrap(), "<i>b</i>");
    });
}
