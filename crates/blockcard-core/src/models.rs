//! Core data models for block extraction.
//!
//! These types are designed to be:
//! - **Serializable**: the card renderer consumes them as JSON
//! - **Immutable once produced**: constructors build complete values
//! - **Type-Safe**: enums replace the host's string tags

use serde::{Deserialize, Serialize};

/// Kind of an inline segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Text,
    Bold,
    Italic,
    Strikethrough,
    Highlight,
    Code,
    CodeBlock,
    PageRef,
    Tag,
    BlockRef,
    Link,
    Image,
    Blockquote,
}

impl SegmentKind {
    /// Bold and italic share one precedence slot in the lexer.
    pub fn is_emphasis(self) -> bool {
        matches!(self, SegmentKind::Bold | SegmentKind::Italic)
    }

    /// Name used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Text => "text",
            SegmentKind::Bold => "bold",
            SegmentKind::Italic => "italic",
            SegmentKind::Strikethrough => "strikethrough",
            SegmentKind::Highlight => "highlight",
            SegmentKind::Code => "code",
            SegmentKind::CodeBlock => "codeBlock",
            SegmentKind::PageRef => "pageRef",
            SegmentKind::Tag => "tag",
            SegmentKind::BlockRef => "blockRef",
            SegmentKind::Link => "link",
            SegmentKind::Image => "image",
            SegmentKind::Blockquote => "blockquote",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smallest renderable unit of block content.
///
/// `value` holds the display text, except for images (the locator) and
/// block references (the referenced uid). A resolved block reference is
/// flagged `resolved` and keeps the referenced block's own segments in
/// `children`, which is empty when that block has no text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Segment>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub resolved: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Segment {
    /// Segment of the given kind with no auxiliary fields.
    pub fn new(kind: SegmentKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            href: None,
            language: None,
            alt: None,
            children: Vec::new(),
            resolved: false,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(SegmentKind::Text, value)
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::new(SegmentKind::Link, text)
        }
    }

    /// Image segment; an empty alt text is stored as `None`.
    pub fn image(src: impl Into<String>, alt: Option<String>) -> Self {
        Self {
            alt: alt.filter(|a| !a.is_empty()),
            ..Self::new(SegmentKind::Image, src)
        }
    }

    /// Code block segment; an empty language is stored as `None`.
    pub fn code_block(language: impl Into<String>, code: impl Into<String>) -> Self {
        let language = language.into();
        Self {
            language: (!language.is_empty()).then_some(language),
            ..Self::new(SegmentKind::CodeBlock, code)
        }
    }

    /// Block reference carrying the referenced block's resolved content.
    pub fn block_ref(uid: impl Into<String>, children: Vec<Segment>) -> Self {
        Self {
            children,
            resolved: true,
            ..Self::new(SegmentKind::BlockRef, uid)
        }
    }

    /// Literal rendering of an unresolved reference, e.g. `((abc123def))`.
    pub fn unresolved_ref(uid: &str) -> Self {
        Self::text(format!("(({}))", uid))
    }

    pub fn is_image(&self) -> bool {
        self.kind == SegmentKind::Image
    }

    /// Append every image locator in this segment and its children to `out`.
    pub fn collect_images(&self, out: &mut Vec<String>) {
        if self.is_image() {
            push_image(out, &self.value);
        }
        for child in &self.children {
            child.collect_images(out);
        }
    }

    /// Text a reader would see, with resolved references expanded.
    pub fn visible_text(&self) -> String {
        match self.kind {
            SegmentKind::Image => String::new(),
            SegmentKind::BlockRef if self.resolved => {
                self.children.iter().map(Segment::visible_text).collect()
            }
            _ => self.value.clone(),
        }
    }
}

/// Push a locator unless it repeats the one just pushed.
pub fn push_image(images: &mut Vec<String>, src: &str) {
    if images.last().map(String::as_str) != Some(src) {
        images.push(src.to_string());
    }
}

/// Position of a group relative to the requested root.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GroupRole {
    Main,
    Child,
}

/// Parsed content of one source block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentGroup {
    pub role: GroupRole,
    pub depth: usize,
    pub content: Vec<Segment>,
}

impl SegmentGroup {
    pub fn new(role: GroupRole, depth: usize, content: Vec<Segment>) -> Self {
        Self {
            role,
            depth,
            content,
        }
    }

    pub fn main(content: Vec<Segment>) -> Self {
        Self::new(GroupRole::Main, 0, content)
    }

    pub fn child(depth: usize, content: Vec<Segment>) -> Self {
        Self::new(GroupRole::Child, depth, content)
    }

    pub fn visible_text(&self) -> String {
        self.content.iter().map(Segment::visible_text).collect()
    }
}

/// Top-level output of one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionResult {
    pub segments: Vec<SegmentGroup>,
    pub images: Vec<String>,
}

impl ExtractionResult {
    /// The result of a total extraction failure.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from groups, collecting every image locator they hold.
    pub fn from_groups(segments: Vec<SegmentGroup>) -> Self {
        let mut images = Vec::new();
        for group in &segments {
            for segment in &group.content {
                segment.collect_images(&mut images);
            }
        }
        Self { segments, images }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// One block as returned by the host's tree query.
///
/// Field names accept both plain keys and the host's namespaced pull keys
/// (`:block/string`, `:block/children`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockNode {
    #[serde(default, alias = ":block/uid")]
    pub uid: String,
    #[serde(default, alias = ":block/string")]
    pub string: String,
    #[serde(default, alias = ":block/order")]
    pub order: i64,
    /// Display state only; never consulted during extraction.
    #[serde(default = "default_open", alias = ":block/open")]
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = ":block/heading")]
    pub heading: Option<u8>,
    #[serde(default, alias = ":block/children")]
    pub children: Vec<BlockNode>,
}

fn default_open() -> bool {
    true
}

impl BlockNode {
    pub fn new(uid: impl Into<String>, string: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            string: string.into(),
            order: 0,
            open: true,
            heading: None,
            children: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn collapsed(mut self) -> Self {
        self.open = false;
        self
    }

    pub fn with_child(mut self, child: BlockNode) -> Self {
        self.children.push(child);
        self
    }

    /// Children sorted ascending by order; equal orders keep received order.
    pub fn sorted_children(&self) -> Vec<&BlockNode> {
        let mut children: Vec<&BlockNode> = self.children.iter().collect();
        children.sort_by_key(|c| c.order);
        children
    }

    /// Number of nodes in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(BlockNode::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_serialization_skips_empty_fields() {
        let json = serde_json::to_value(Segment::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "value": "hi"}));

        let json = serde_json::to_value(Segment::link("site", "https://x.io")).unwrap();
        assert_eq!(json["kind"], "link");
        assert_eq!(json["href"], "https://x.io");
    }

    #[test]
    fn test_code_block_kind_name() {
        let json = serde_json::to_value(Segment::code_block("go", "x")).unwrap();
        assert_eq!(json["kind"], "codeBlock");
        assert_eq!(json["language"], "go");
        assert!(Segment::code_block("", "x").language.is_none());
    }

    #[test]
    fn test_unresolved_ref_notation() {
        let seg = Segment::unresolved_ref("abc123def");
        assert_eq!(seg.kind, SegmentKind::Text);
        assert_eq!(seg.value, "((abc123def))");
    }

    #[test]
    fn test_from_groups_collects_nested_images() {
        let nested = Segment::block_ref("r1", vec![Segment::image("b.png", None)]);
        let groups = vec![
            SegmentGroup::main(vec![Segment::image("a.png", Some("A".into()))]),
            SegmentGroup::child(1, vec![Segment::text("x"), nested]),
        ];
        let result = ExtractionResult::from_groups(groups);
        assert_eq!(result.images, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_images_skip_immediate_repeats_only() {
        let groups = vec![SegmentGroup::main(vec![
            Segment::image("a.png", None),
            Segment::image("a.png", None),
            Segment::image("b.png", None),
            Segment::image("a.png", None),
        ])];
        let result = ExtractionResult::from_groups(groups);
        assert_eq!(result.images, vec!["a.png", "b.png", "a.png"]);
    }

    #[test]
    fn test_block_node_from_pull_keys() {
        let json = r#"{
            ":block/uid": "root00001",
            ":block/string": "A",
            ":block/children": [
                {":block/uid": "c2", ":block/string": "second", ":block/order": 1},
                {":block/uid": "c1", ":block/string": "first", ":block/order": 0, ":block/open": false}
            ]
        }"#;
        let node: BlockNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.uid, "root00001");
        let sorted = node.sorted_children();
        assert_eq!(sorted[0].string, "first");
        assert!(!sorted[0].open);
        assert_eq!(sorted[1].string, "second");
        assert_eq!(node.subtree_len(), 3);
    }

    #[test]
    fn test_sorted_children_stable_on_ties() {
        let node = BlockNode::new("r", "root")
            .with_child(BlockNode::new("a", "a").with_order(1))
            .with_child(BlockNode::new("b", "b").with_order(1))
            .with_child(BlockNode::new("c", "c").with_order(0));
        let uids: Vec<_> = node.sorted_children().iter().map(|c| c.uid.as_str()).collect();
        assert_eq!(uids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_visible_text_expands_refs() {
        let seg = Segment::block_ref("r1", vec![Segment::text("hello "), Segment::new(SegmentKind::Bold, "world")]);
        assert_eq!(seg.visible_text(), "hello world");
        assert_eq!(Segment::new(SegmentKind::BlockRef, "r2").visible_text(), "r2");
    }

    #[test]
    fn test_empty_resolved_ref_has_no_text() {
        let seg = Segment::block_ref("r3", vec![]);
        assert!(seg.resolved);
        assert_eq!(seg.visible_text(), "");

        let json = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["resolved"], true);
        assert!(serde_json::to_value(Segment::text("x")).unwrap().get("resolved").is_none());
    }
}
