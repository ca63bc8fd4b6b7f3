use std::thread;

use pretty_assertions::assert_eq;

use crate::{Settings, TagRef, TagSpec, Ubb};

fn normalize(input: &str) -> String {
    Ubb::default().normalize(input)
}

#[test]
pub fn auto_closed_tags_come_out_nested() {
    assert_eq!(
        normalize("[bold][italic]x[/bold][/italic]"),
        "[bold][italic]x[/italic][/bold]"
    );
    assert_eq!(
        normalize("[bold][italic]x[/bold]y"),
        "[bold][italic]x[/italic][/bold][italic]y[/italic]"
    );
    assert_eq!(normalize("[bold]a"), "[bold]a[/bold]");
    assert_eq!(
        normalize("[bold]a\nb[/bold]"),
        "[bold]a[/bold]\n[bold]b[/bold]"
    );
}

#[test]
pub fn brackets_are_escaped() {
    assert_eq!(normalize("a [foo] b"), r"a \[foo\] b");
    assert_eq!(normalize(r"\[bold\]"), r"\[bold\]");
    assert_eq!(normalize(r"a\\b"), r"a\\b");
    assert_eq!(normalize(r"a\b"), "ab");
}

#[test]
pub fn html_escaping_is_undone() {
    assert_eq!(
        normalize("Tom & <Jerry> \"x\""),
        "Tom & <Jerry> \"x\""
    );
    assert_eq!(normalize("&amp;"), "&amp;");
}

#[test]
pub fn attributes() {
    assert_eq!(normalize("[bold foo]x[/bold]"), "[bold]x[/bold]");
    assert_eq!(normalize("[color=#f00]x[/color]"), "[color=#f00]x[/color]");
    assert_eq!(
        normalize("[url href=http://a.com/?b=1&c=2]l[/url]"),
        "[url href=http://a.com/?b=1&c=2]l[/url]"
    );
    assert_eq!(normalize(r"[color=a\]b]x[/color]"), r"[color=a\]b]x[/color]");
}

#[test]
pub fn canonical_names_and_newlines() {
    assert_eq!(normalize("[BOLD]x[/BOLD]"), "[bold]x[/bold]");
    assert_eq!(normalize("[/bold x]"), "");
    assert_eq!(normalize("a\r\nb"), "a\nb");
    assert_eq!(normalize("hello[/bold]world"), "helloworld");
    assert_eq!(normalize("[bold][/bold]"), "[bold][/bold]");
}

const WELL_FORMED: &[&str] = &[
    "plain text",
    "[bold]a[italic]b[/italic]c[/bold]",
    "[color=#123456]x[url href=http://a.com]y[/url][/color]",
    "[blockquote]quote\n[ul]\none\ntwo\n[/ul][/blockquote]\nafter",
    "[ref]see [/ref][image]a.png[/image]",
    r"escaped \[ and \] and \\",
];

#[test]
pub fn well_formed_input_round_trips() {
    for input in WELL_FORMED {
        assert_eq!(normalize(input), *input);
    }
}

const MALFORMED: &[&str] = &[
    "[bold][italic]x[/bold][/italic]",
    "[bold]a[blockquote]b[/blockquote]c[/bold]",
    "[bold]a[ref]b\nc[/bold]",
    "[image]x[bold]y[/bold][/image]",
    "[url]a\nb[color=red]c\n[/url]d",
    "[ul][bold]a\nb[/ul]c[/bold]",
    "[[bold]]][/[/bold]",
    "\\",
    "[foo]<&>[/foo]\r\n\\\n",
];

#[test]
pub fn normalizing_is_idempotent() {
    for input in WELL_FORMED.iter().chain(MALFORMED) {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "input: {input:?}");
    }
}

fn unwrap_tag(_: TagRef<'_>, inner: &str, out: &mut String) {
    out.push_str(inner);
}

#[test]
pub fn custom_fix_writer() {
    let ubb = Ubb::new(
        Settings::default().with_tag("spoiler", TagSpec::new("").with_fix(unwrap_tag)),
    );
    assert_eq!(ubb.normalize("a[spoiler]x[/spoiler]b"), "axb");
}

const DEPTH: usize = 10_000;

#[test]
pub fn deep_nesting_on_a_small_stack() {
    let input = "[bold]".repeat(DEPTH) + "x";
    let output = thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(move || normalize(&input))
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(
        output,
        "[bold]".repeat(DEPTH) + "x" + &"[/bold]".repeat(DEPTH)
    );
}

#[test]
pub fn long_shell_chains() {
    let open = "[italic]".to_owned() + &"[bold]".repeat(DEPTH);
    let nested = "[bold]".repeat(DEPTH) + &"[/bold]".repeat(DEPTH);

    // The shells carried out of the italic hold nothing and are dropped.
    assert_eq!(
        normalize(&(open.clone() + "[/italic]")),
        "[italic]".to_owned() + &nested + "[/italic]"
    );
    assert_eq!(
        normalize(&(open + "[/italic]x")),
        "[italic]".to_owned()
            + &nested
            + "[/italic]"
            + &"[bold]".repeat(DEPTH)
            + "x"
            + &"[/bold]".repeat(DEPTH)
    );
}
