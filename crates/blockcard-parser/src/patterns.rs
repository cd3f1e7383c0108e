//! Compiled lexical patterns and their match builders.
//!
//! Each pattern is an independent global scan. The `regex` crate has no
//! lookaround, so patterns that need it carry a `guard` that inspects the
//! characters around a match instead.

use blockcard_core::{Segment, SegmentKind};
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ============================================================================
// Compiled regex patterns
// ============================================================================

/// Fenced code inside running text: ```lang\ncode``` (language optional)
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:([\w+#.\-]*)\n)?(.*?)```").unwrap());

/// Inline code: `code`
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// Bold italic: ***text***, rendered as bold
static BOLD_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*([^*\n][^\n]*?)\*\*\*").unwrap());

/// Bold: **text**
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").unwrap());

/// Italic: *text* (inner text must not start or end with whitespace)
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap());

/// Italic in host-native notation: __text__
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^\n]+?)__").unwrap());

/// Strikethrough: ~~text~~
static STRIKETHROUGH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~([^\n]+?)~~").unwrap());

/// Highlight: ^^text^^
static HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^\^([^\n]+?)\^\^").unwrap());

/// Page reference: [[Page]]
static PAGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+)\]\]").unwrap());

/// Tag: #tag, #parent/child or #[[multi word]]
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(?:\[\[([^\[\]\n]+)\]\]|([\w\-/]+))").unwrap());

/// Block reference: ((uid))
static BLOCK_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\(([A-Za-z0-9_\-]+)\)\)").unwrap());

/// Link: [text](url)
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]\n]+)\]\(([^()\s]+)\)").unwrap());

/// Image: ![alt](url)
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\[\]\n]*)\]\(([^()\s]+)\)").unwrap());

/// Blockquote: "> " at the start of a line, through end of line
static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^> ([^\n]+)").unwrap());

// ============================================================================
// Pattern table
// ============================================================================

/// One entry of the lexical battery.
pub(crate) struct Pattern {
    #[cfg_attr(not(test), allow(dead_code))]
    pub name: &'static str,
    /// Precedence slot for matches starting at the same offset; lower wins.
    pub slot: u8,
    pub regex: &'static LazyLock<Regex>,
    /// Fast pre-filter: skip the regex when this substring is absent.
    pub trigger: &'static str,
    /// Lookaround substitute, given the full text and the match span.
    pub guard: Option<fn(&str, usize, usize) -> bool>,
    /// Build the segment; `None` drops the match (empty capture).
    pub build: fn(&Captures) -> Option<Segment>,
}

/// The battery, in precedence order.
pub(crate) static BATTERY: &[Pattern] = &[
    Pattern {
        name: "fence",
        slot: 0,
        regex: &FENCE,
        trigger: "```",
        guard: None,
        build: build_fence,
    },
    Pattern {
        name: "inline_code",
        slot: 1,
        regex: &INLINE_CODE,
        trigger: "`",
        guard: None,
        build: build_code,
    },
    Pattern {
        name: "bold_italic",
        slot: 2,
        regex: &BOLD_ITALIC,
        trigger: "***",
        guard: None,
        build: build_bold,
    },
    Pattern {
        name: "bold",
        slot: 2,
        regex: &BOLD,
        trigger: "**",
        guard: None,
        build: build_bold,
    },
    Pattern {
        name: "italic_star",
        slot: 2,
        regex: &ITALIC_STAR,
        trigger: "*",
        guard: Some(not_inside_star_run),
        build: build_italic,
    },
    Pattern {
        name: "italic_underscore",
        slot: 2,
        regex: &ITALIC_UNDERSCORE,
        trigger: "__",
        guard: None,
        build: build_italic,
    },
    Pattern {
        name: "strikethrough",
        slot: 3,
        regex: &STRIKETHROUGH,
        trigger: "~~",
        guard: None,
        build: build_strikethrough,
    },
    Pattern {
        name: "highlight",
        slot: 4,
        regex: &HIGHLIGHT,
        trigger: "^^",
        guard: None,
        build: build_highlight,
    },
    Pattern {
        name: "page_ref",
        slot: 5,
        regex: &PAGE_REF,
        trigger: "[[",
        guard: None,
        build: build_page_ref,
    },
    Pattern {
        name: "tag",
        slot: 6,
        regex: &TAG,
        trigger: "#",
        guard: Some(tag_boundary),
        build: build_tag,
    },
    Pattern {
        name: "block_ref",
        slot: 7,
        regex: &BLOCK_REF,
        trigger: "((",
        guard: None,
        build: build_block_ref,
    },
    Pattern {
        name: "link",
        slot: 8,
        regex: &LINK,
        trigger: "](",
        guard: None,
        build: build_link,
    },
    Pattern {
        name: "image",
        slot: 9,
        regex: &IMAGE,
        trigger: "![",
        guard: None,
        build: build_image,
    },
    Pattern {
        name: "blockquote",
        slot: 10,
        regex: &BLOCKQUOTE,
        trigger: "> ",
        guard: None,
        build: build_blockquote,
    },
];

// ============================================================================
// Guards
// ============================================================================

fn char_before(text: &str, at: usize) -> Option<char> {
    text[..at].chars().next_back()
}

fn char_at(text: &str, at: usize) -> Option<char> {
    text[at..].chars().next()
}

/// Reject `*x*` when it is really part of a `**` delimiter pair.
fn not_inside_star_run(text: &str, start: usize, end: usize) -> bool {
    char_before(text, start) != Some('*') && char_at(text, end) != Some('*')
}

/// Reject `#` glued to a preceding word, e.g. `issue#12` or `a##b`.
fn tag_boundary(text: &str, start: usize, _end: usize) -> bool {
    match char_before(text, start) {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '#' || c == '_'),
    }
}

// ============================================================================
// Builders
// ============================================================================

fn capture<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map(|m| m.as_str()).unwrap_or("")
}

fn inner(caps: &Captures, kind: SegmentKind) -> Option<Segment> {
    let value = capture(caps, 1);
    (!value.is_empty()).then(|| Segment::new(kind, value))
}

fn build_code(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::Code)
}

fn build_bold(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::Bold)
}

fn build_italic(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::Italic)
}

fn build_strikethrough(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::Strikethrough)
}

fn build_highlight(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::Highlight)
}

fn build_page_ref(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::PageRef)
}

fn build_block_ref(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::BlockRef)
}

fn build_blockquote(caps: &Captures) -> Option<Segment> {
    inner(caps, SegmentKind::Blockquote)
}

fn build_fence(caps: &Captures) -> Option<Segment> {
    let language = capture(caps, 1);
    let code = capture(caps, 2).trim_end_matches(['\n', '\r']);
    (!code.is_empty()).then(|| Segment::code_block(language, code))
}

fn build_tag(caps: &Captures) -> Option<Segment> {
    let name = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or("");
    (!name.is_empty()).then(|| Segment::new(SegmentKind::Tag, format!("#{}", name)))
}

fn build_link(caps: &Captures) -> Option<Segment> {
    let text = capture(caps, 1);
    let href = capture(caps, 2);
    (!text.is_empty()).then(|| Segment::link(text, href))
}

fn build_image(caps: &Captures) -> Option<Segment> {
    let alt = capture(caps, 1);
    let src = capture(caps, 2);
    (!src.is_empty()).then(|| Segment::image(src, Some(alt.to_string())))
}
