//! DOM fallback extractor.
//!
//! When no structured data is available, segments are recovered from the
//! rendered HTML of the share root. Each element is classified by a table of
//! rules into a [`NodeAction`]; text nodes pass through verbatim. Chrome that
//! is not content (popovers, buttons, bullets, icons, editor widgets) is
//! matched by the configured strip selectors and skipped while walking, so
//! the snapshot is never mutated.

use blockcard_core::{
    ExtractionConfig, ExtractionResult, Segment, SegmentGroup, SegmentKind, push_image,
};
use scraper::{ElementRef, Html, Node, Selector};

use crate::root::{RootElement, block_texts, compile_block_text, root_element};

/// What to do with one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    /// Not content; ignore the element and its subtree.
    Skip,
    /// Emit one segment of this kind from the element's visible text.
    Emit(SegmentKind),
    /// Emit an image segment from `src`/`alt`.
    Image,
    /// Emit a link segment from `href` and the visible text.
    Link,
    /// Walk the children.
    Recurse,
}

type Rule = fn(&ElementRef<'_>) -> Option<NodeAction>;

/// Classification rules, first match wins.
static RULES: &[Rule] = &[
    rule_hidden,
    rule_icon,
    rule_image,
    rule_brackets,
    rule_tag,
    rule_page_ref,
    rule_bold,
    rule_italic,
    rule_highlight,
    rule_strikethrough,
    rule_code_block,
    rule_code,
    rule_blockquote,
    rule_link,
];

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn is_tag(el: &ElementRef<'_>, names: &[&str]) -> bool {
    names.contains(&el.value().name())
}

fn rule_hidden(el: &ElementRef<'_>) -> Option<NodeAction> {
    let hidden_attr = el.value().attr("hidden").is_some();
    let hidden_style = el.value().attr("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.to_ascii_lowercase().contains("display:none")
    });
    (hidden_attr || hidden_style).then_some(NodeAction::Skip)
}

fn rule_icon(el: &ElementRef<'_>) -> Option<NodeAction> {
    (is_tag(el, &["svg"]) || has_class(el, "bp3-icon")).then_some(NodeAction::Skip)
}

fn rule_image(el: &ElementRef<'_>) -> Option<NodeAction> {
    if !is_tag(el, &["img"]) {
        return None;
    }
    match el.value().attr("src") {
        Some(src) if !src.is_empty() && !src.starts_with("data:image/svg") => Some(NodeAction::Image),
        _ => Some(NodeAction::Skip),
    }
}

fn rule_brackets(el: &ElementRef<'_>) -> Option<NodeAction> {
    has_class(el, "rm-page-ref__brackets").then_some(NodeAction::Skip)
}

fn rule_tag(el: &ElementRef<'_>) -> Option<NodeAction> {
    (has_class(el, "rm-page-ref--tag") || has_class(el, "rm-tag"))
        .then_some(NodeAction::Emit(SegmentKind::Tag))
}

fn rule_page_ref(el: &ElementRef<'_>) -> Option<NodeAction> {
    has_class(el, "rm-page-ref--link").then_some(NodeAction::Emit(SegmentKind::PageRef))
}

fn rule_bold(el: &ElementRef<'_>) -> Option<NodeAction> {
    (has_class(el, "rm-bold") || is_tag(el, &["strong", "b"]))
        .then_some(NodeAction::Emit(SegmentKind::Bold))
}

fn rule_italic(el: &ElementRef<'_>) -> Option<NodeAction> {
    (has_class(el, "rm-italics") || is_tag(el, &["em", "i"]))
        .then_some(NodeAction::Emit(SegmentKind::Italic))
}

fn rule_highlight(el: &ElementRef<'_>) -> Option<NodeAction> {
    (has_class(el, "rm-highlight") || is_tag(el, &["mark"]))
        .then_some(NodeAction::Emit(SegmentKind::Highlight))
}

fn rule_strikethrough(el: &ElementRef<'_>) -> Option<NodeAction> {
    (has_class(el, "rm-strikethrough") || is_tag(el, &["del", "s", "strike"]))
        .then_some(NodeAction::Emit(SegmentKind::Strikethrough))
}

fn rule_code_block(el: &ElementRef<'_>) -> Option<NodeAction> {
    is_tag(el, &["pre"]).then_some(NodeAction::Emit(SegmentKind::CodeBlock))
}

fn rule_code(el: &ElementRef<'_>) -> Option<NodeAction> {
    (has_class(el, "rm-code") || is_tag(el, &["code"]))
        .then_some(NodeAction::Emit(SegmentKind::Code))
}

fn rule_blockquote(el: &ElementRef<'_>) -> Option<NodeAction> {
    is_tag(el, &["blockquote"]).then_some(NodeAction::Emit(SegmentKind::Blockquote))
}

fn rule_link(el: &ElementRef<'_>) -> Option<NodeAction> {
    let is_link = is_tag(el, &["a"])
        && !has_class(el, "rm-page-ref")
        && el.value().attr("href").is_some_and(|href| !href.is_empty());
    is_link.then_some(NodeAction::Link)
}

/// Compiled strip selectors.
#[derive(Debug, Default)]
pub struct Stripper {
    selectors: Vec<Selector>,
}

impl Stripper {
    /// Compile `selectors`, dropping (and logging) any that fail to parse.
    pub fn new<'a>(selectors: impl IntoIterator<Item = &'a str>) -> Self {
        let selectors = selectors
            .into_iter()
            .filter_map(|s| match Selector::parse(s) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    log::warn!("Ignoring invalid strip selector {:?}: {}", s, e);
                    None
                }
            })
            .collect();
        Self { selectors }
    }

    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        self.selectors.iter().any(|s| s.matches(el))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Classify one element.
pub fn classify(el: &ElementRef<'_>, stripper: &Stripper) -> NodeAction {
    if stripper.matches(el) {
        return NodeAction::Skip;
    }
    RULES
        .iter()
        .find_map(|rule| rule(el))
        .unwrap_or(NodeAction::Recurse)
}

/// Text of `el` as a reader sees it: descendants classified as
/// [`NodeAction::Skip`] contribute nothing.
pub fn visible_text(el: &ElementRef<'_>, stripper: &Stripper) -> String {
    let mut out = String::new();
    push_visible_text(el, stripper, &mut out);
    out
}

fn push_visible_text(el: &ElementRef<'_>, stripper: &Stripper, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child)
                    && classify(&child_el, stripper) != NodeAction::Skip
                {
                    push_visible_text(&child_el, stripper, out);
                }
            }
            _ => {}
        }
    }
}

/// Language named by a `language-*` class on `el` or its first `code` child.
fn code_language(el: &ElementRef<'_>) -> Option<String> {
    let from_classes = |e: &ElementRef<'_>| {
        e.value()
            .classes()
            .find_map(|c| c.strip_prefix("language-"))
            .map(str::to_string)
    };
    from_classes(el).or_else(|| {
        el.children()
            .filter_map(ElementRef::wrap)
            .find(|c| c.value().name() == "code")
            .and_then(|c| from_classes(&c))
    })
}

/// Recovers segments from rendered HTML.
#[derive(Debug)]
pub struct DomExtractor {
    stripper: Stripper,
    block_text: Option<Selector>,
}

/// Per-group accumulator.
struct GroupBuilder<'s> {
    segments: Vec<Segment>,
    images: &'s mut Vec<String>,
}

impl DomExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            stripper: Stripper::new(config.strip_selectors.iter().map(String::as_str)),
            block_text: compile_block_text(config),
        }
    }

    /// Extract all block-text groups under the share root.
    ///
    /// The first block-text element is the `main` group, later ones are
    /// `child` groups at depth 0. A root without block-text elements is
    /// read as a single block.
    pub fn extract(&self, root: &RootElement) -> ExtractionResult {
        let html = Html::parse_fragment(&root.html);
        let Some(root_el) = root_element(&html) else {
            log::debug!("Share root snapshot has no element");
            return ExtractionResult::empty();
        };

        let blocks = match &self.block_text {
            Some(selector) => block_texts(root_el, selector),
            None => Vec::new(),
        };
        let blocks = if blocks.is_empty() { vec![root_el] } else { blocks };

        let mut images = Vec::new();
        let mut groups = Vec::new();
        for block in blocks {
            let mut builder = GroupBuilder {
                segments: Vec::new(),
                images: &mut images,
            };
            self.walk(&block, &mut builder);
            if builder.segments.is_empty() {
                continue;
            }
            let group = if groups.is_empty() {
                SegmentGroup::main(builder.segments)
            } else {
                SegmentGroup::child(0, builder.segments)
            };
            groups.push(group);
        }

        log::debug!("DOM fallback produced {} groups", groups.len());
        ExtractionResult {
            segments: groups,
            images,
        }
    }

    fn is_nested_block(&self, el: &ElementRef<'_>) -> bool {
        self.block_text.as_ref().is_some_and(|s| s.matches(el))
    }

    fn walk(&self, el: &ElementRef<'_>, out: &mut GroupBuilder<'_>) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => {
                    let text: &str = text;
                    let keep = !text.trim().is_empty()
                        || (!out.segments.is_empty() && text.contains(' '));
                    if keep {
                        out.segments.push(Segment::text(text));
                    }
                }
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        // Nested block texts form their own groups.
                        if self.is_nested_block(&child_el) {
                            continue;
                        }
                        self.visit(&child_el, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit(&self, el: &ElementRef<'_>, out: &mut GroupBuilder<'_>) {
        match classify(el, &self.stripper) {
            NodeAction::Skip => {}
            NodeAction::Recurse => self.walk(el, out),
            NodeAction::Image => {
                let Some(src) = el.value().attr("src") else {
                    return;
                };
                let alt = el.value().attr("alt").map(str::to_string);
                push_image(out.images, src);
                out.segments.push(Segment::image(src, alt));
            }
            NodeAction::Link => {
                let href = el.value().attr("href").unwrap_or_default();
                let text = visible_text(el, &self.stripper);
                let text = if text.trim().is_empty() {
                    href.to_string()
                } else {
                    text
                };
                out.segments.push(Segment::link(text, href));
            }
            NodeAction::Emit(SegmentKind::CodeBlock) => {
                let code = visible_text(el, &self.stripper);
                let code = code.trim_end_matches('\n');
                if !code.trim().is_empty() {
                    let language = code_language(el).unwrap_or_default();
                    out.segments.push(Segment::code_block(language, code));
                }
            }
            NodeAction::Emit(SegmentKind::Tag) => {
                let name = visible_text(el, &self.stripper);
                let name = name.trim();
                if !name.is_empty() {
                    let value = if name.starts_with('#') {
                        name.to_string()
                    } else {
                        format!("#{}", name)
                    };
                    out.segments.push(Segment::new(SegmentKind::Tag, value));
                }
            }
            NodeAction::Emit(kind) => {
                let text = visible_text(el, &self.stripper);
                if !text.trim().is_empty() {
                    out.segments.push(Segment::new(kind, text));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> ExtractionResult {
        DomExtractor::new(&ExtractionConfig::default()).extract(&RootElement::from_html(html))
    }

    fn first_element(html: &Html) -> ElementRef<'_> {
        root_element(html).unwrap()
    }

    #[test]
    fn test_classify_rules() {
        let stripper = Stripper::default();
        let cases = [
            (r#"<span hidden>x</span>"#, NodeAction::Skip),
            (r#"<span style="display: none">x</span>"#, NodeAction::Skip),
            (r#"<span class="bp3-icon"></span>"#, NodeAction::Skip),
            (r#"<img src="a.png">"#, NodeAction::Image),
            (r#"<img src="data:image/svg+xml;base64,AAA">"#, NodeAction::Skip),
            (r#"<span class="rm-page-ref__brackets">[[</span>"#, NodeAction::Skip),
            (r#"<span class="rm-page-ref rm-page-ref--tag">#x</span>"#, NodeAction::Emit(SegmentKind::Tag)),
            (r#"<span class="rm-page-ref rm-page-ref--link">X</span>"#, NodeAction::Emit(SegmentKind::PageRef)),
            (r#"<strong>x</strong>"#, NodeAction::Emit(SegmentKind::Bold)),
            (r#"<em>x</em>"#, NodeAction::Emit(SegmentKind::Italic)),
            (r#"<span class="rm-highlight">x</span>"#, NodeAction::Emit(SegmentKind::Highlight)),
            (r#"<del>x</del>"#, NodeAction::Emit(SegmentKind::Strikethrough)),
            (r#"<pre>x</pre>"#, NodeAction::Emit(SegmentKind::CodeBlock)),
            (r#"<code>x</code>"#, NodeAction::Emit(SegmentKind::Code)),
            (r#"<blockquote>x</blockquote>"#, NodeAction::Emit(SegmentKind::Blockquote)),
            (r#"<a href="https://x.io">x</a>"#, NodeAction::Link),
            (r##"<a class="rm-page-ref" href="#">x</a>"##, NodeAction::Recurse),
            (r#"<div>x</div>"#, NodeAction::Recurse),
        ];
        for (html, expected) in cases {
            let doc = Html::parse_fragment(html);
            assert_eq!(classify(&first_element(&doc), &stripper), expected, "{}", html);
        }
    }

    #[test]
    fn test_strip_selectors_skip() {
        let stripper = Stripper::new([".rm-caret", "not a [valid selector"]);
        assert_eq!(stripper.len(), 1);
        let doc = Html::parse_fragment(r#"<span class="rm-caret">v</span>"#);
        assert_eq!(classify(&first_element(&doc), &stripper), NodeAction::Skip);
    }

    #[test]
    fn test_visible_text_excludes_skipped() {
        let doc = Html::parse_fragment(
            r#"<span>Go <span class="rm-page-ref__brackets">[[</span>home<svg><text>i</text></svg></span>"#,
        );
        let text = visible_text(&first_element(&doc), &Stripper::default());
        assert_eq!(text, "Go home");
    }

    #[test]
    fn test_extract_formatted_block() {
        let result = extract(
            r#"<div class="rm-block-text">Read <strong>this</strong> <span class="rm-page-ref--tag">#now</span></div>"#,
        );
        assert_eq!(result.segments.len(), 1);
        let content = &result.segments[0].content;
        assert_eq!(content[0], Segment::text("Read "));
        assert_eq!(content[1], Segment::new(SegmentKind::Bold, "this"));
        assert_eq!(content[2], Segment::text(" "));
        assert_eq!(content[3], Segment::new(SegmentKind::Tag, "#now"));
    }

    #[test]
    fn test_leading_whitespace_dropped() {
        let result = extract(r#"<div class="rm-block-text">   <em>x</em></div>"#);
        assert_eq!(result.segments[0].content, vec![Segment::new(SegmentKind::Italic, "x")]);
    }

    #[test]
    fn test_page_ref_without_brackets() {
        let result = extract(
            r#"<div class="rm-block-text"><span class="rm-page-ref__brackets">[[</span><span class="rm-page-ref rm-page-ref--link">Alice</span><span class="rm-page-ref__brackets">]]</span></div>"#,
        );
        assert_eq!(
            result.segments[0].content,
            vec![Segment::new(SegmentKind::PageRef, "Alice")]
        );
    }

    #[test]
    fn test_groups_and_images() {
        let html = r#"<div class="roam-block-container">
            <div class="rm-block-text">Parent <img src="https://x.io/a.png" alt="a"></div>
            <div class="rm-block-children">
                <div class="rm-block-text"><a href="https://docs.rs">docs</a></div>
                <div class="rm-block-text"><button class="copy-button">copy</button></div>
            </div>
        </div>"#;
        let result = extract(html);
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0], SegmentGroup::main(vec![
            Segment::text("Parent "),
            Segment::image("https://x.io/a.png", Some("a".into())),
        ]));
        assert_eq!(
            result.segments[1],
            SegmentGroup::child(0, vec![Segment::link("docs", "https://docs.rs")])
        );
        assert_eq!(result.images, vec!["https://x.io/a.png"]);
    }

    #[test]
    fn test_code_block_language() {
        let result = extract(
            r#"<div class="rm-block-text"><pre><code class="language-rust">fn main() {}
</code></pre></div>"#,
        );
        assert_eq!(
            result.segments[0].content,
            vec![Segment::code_block("rust", "fn main() {}")]
        );
    }

    #[test]
    fn test_root_without_block_text_is_one_block() {
        let result = extract("<p>just <b>one</b></p>");
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].visible_text(), "just one");
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(extract("").is_empty());
        assert!(extract(r#"<div class="rm-block-text">  </div>"#).is_empty());
    }
}
