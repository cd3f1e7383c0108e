//! Block reference resolution.
//!
//! A `((uid))` reference is replaced by the referenced block's own content,
//! lexed the same way as any block. Nested references are expanded up to
//! `max_ref_depth` levels; cycles and failures degrade to the literal
//! `((uid))` notation for that one reference.

use blockcard_core::{ExtractionConfig, Segment, SegmentKind};
use blockcard_parser::parse_block;
use futures::future::{BoxFuture, FutureExt, join_all};

use crate::source::BlockSource;

/// Outcome of looking up one reference.
enum Resolution {
    Resolved(Vec<Segment>),
    Unresolved,
}

/// Resolves block references against a [`BlockSource`].
pub struct RefResolver<'a, S: BlockSource + ?Sized> {
    source: &'a S,
    max_depth: usize,
    enabled: bool,
}

impl<'a, S: BlockSource + ?Sized> RefResolver<'a, S> {
    pub fn new(source: &'a S, max_depth: usize) -> Self {
        Self {
            source,
            max_depth,
            enabled: true,
        }
    }

    /// Resolver honoring `max_ref_depth` and `resolve_block_refs`.
    pub fn from_config(source: &'a S, config: &ExtractionConfig) -> Self {
        Self {
            source,
            max_depth: config.max_ref_depth,
            enabled: config.resolve_block_refs,
        }
    }

    /// Content of the referenced block, or the literal `((uid))` segment
    /// when it cannot be fetched.
    pub async fn resolve(&self, uid: &str) -> Vec<Segment> {
        match self.lookup(uid.to_string(), 0, Vec::new()).await {
            Resolution::Resolved(content) => content,
            Resolution::Unresolved => vec![Segment::unresolved_ref(uid)],
        }
    }

    /// Replace every `blockRef` segment with its resolved form.
    ///
    /// References in one list are looked up concurrently. A disabled
    /// resolver returns the segments unchanged.
    pub async fn expand(&self, segments: Vec<Segment>) -> Vec<Segment> {
        if !self.enabled {
            return segments;
        }
        self.expand_at(segments, 0, Vec::new()).await
    }

    fn expand_at(
        &self,
        segments: Vec<Segment>,
        depth: usize,
        chain: Vec<String>,
    ) -> BoxFuture<'_, Vec<Segment>> {
        async move {
            if !segments.iter().any(|s| s.kind == SegmentKind::BlockRef) {
                return segments;
            }

            let lookups = segments.into_iter().map(|segment| {
                let chain = chain.clone();
                async move {
                    if segment.kind != SegmentKind::BlockRef {
                        return segment;
                    }
                    let uid = segment.value;
                    match self.lookup(uid.clone(), depth, chain).await {
                        Resolution::Resolved(content) => Segment::block_ref(uid, content),
                        Resolution::Unresolved => Segment::unresolved_ref(&uid),
                    }
                }
            });

            join_all(lookups).await
        }
        .boxed()
    }

    fn lookup(&self, uid: String, depth: usize, mut chain: Vec<String>) -> BoxFuture<'_, Resolution> {
        async move {
            if depth >= self.max_depth {
                log::debug!("Block reference (({})) exceeds depth {}", uid, self.max_depth);
                return Resolution::Unresolved;
            }
            if chain.contains(&uid) {
                log::debug!("Block reference cycle through (({}))", uid);
                return Resolution::Unresolved;
            }

            let text = match self.source.fetch_block_text(&uid).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    log::debug!("Block reference (({})) not found", uid);
                    return Resolution::Unresolved;
                }
                Err(e) => {
                    log::warn!("Failed to fetch referenced block (({})): {}", uid, e);
                    return Resolution::Unresolved;
                }
            };

            chain.push(uid);
            let content = parse_block(&text);
            Resolution::Resolved(self.expand_at(content, depth + 1, chain).await)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryBlockSource;
    use async_trait::async_trait;
    use blockcard_core::{BlockNode, Error, Result};

    struct FailingSource;

    #[async_trait]
    impl BlockSource for FailingSource {
        async fn fetch_block_tree(&self, _uid: &str) -> Result<Option<BlockNode>> {
            Err(Error::source_unavailable("offline"))
        }

        async fn fetch_block_text(&self, _uid: &str) -> Result<Option<String>> {
            Err(Error::source_unavailable("offline"))
        }
    }

    fn source(blocks: &[(&str, &str)]) -> MemoryBlockSource {
        MemoryBlockSource::from_trees(blocks.iter().map(|(uid, text)| BlockNode::new(*uid, *text)))
    }

    #[tokio::test]
    async fn test_resolve_lexes_referenced_text() {
        let source = source(&[("abc123def", "a **bold** idea")]);
        let resolver = RefResolver::new(&source, 3);
        let content = resolver.resolve("abc123def").await;
        assert_eq!(
            content,
            vec![
                Segment::text("a "),
                Segment::new(SegmentKind::Bold, "bold"),
                Segment::text(" idea"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_ref_is_literal() {
        let source = MemoryBlockSource::new();
        let resolver = RefResolver::new(&source, 3);
        assert_eq!(
            resolver.resolve("abc123def").await,
            vec![Segment::text("((abc123def))")]
        );
    }

    #[tokio::test]
    async fn test_failing_source_is_literal() {
        let resolver = RefResolver::new(&FailingSource, 3);
        let expanded = resolver
            .expand(vec![
                Segment::text("see "),
                Segment::new(SegmentKind::BlockRef, "abc123def"),
            ])
            .await;
        assert_eq!(expanded[1], Segment::text("((abc123def))"));
        assert_eq!(expanded[0], Segment::text("see "));
    }

    #[tokio::test]
    async fn test_expand_nests_content() {
        let source = source(&[("outer0001", "outer ((inner0001))"), ("inner0001", "#deep")]);
        let resolver = RefResolver::new(&source, 3);
        let expanded = resolver
            .expand(vec![Segment::new(SegmentKind::BlockRef, "outer0001")])
            .await;

        let outer = &expanded[0];
        assert_eq!(outer.kind, SegmentKind::BlockRef);
        assert_eq!(outer.value, "outer0001");
        let inner = &outer.children[1];
        assert_eq!(inner.kind, SegmentKind::BlockRef);
        assert_eq!(inner.children, vec![Segment::new(SegmentKind::Tag, "#deep")]);
    }

    #[tokio::test]
    async fn test_empty_referenced_block_renders_nothing() {
        let source = source(&[("emptyref1", "")]);
        let resolver = RefResolver::new(&source, 3);
        let expanded = resolver
            .expand(vec![
                Segment::text("see "),
                Segment::new(SegmentKind::BlockRef, "emptyref1"),
            ])
            .await;

        assert!(expanded[1].resolved);
        assert!(expanded[1].children.is_empty());
        let text: String = expanded.iter().map(Segment::visible_text).collect();
        assert_eq!(text, "see ");
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let source = source(&[("level0001", "((level0002))"), ("level0002", "bottom")]);
        let resolver = RefResolver::new(&source, 1);
        let expanded = resolver
            .expand(vec![Segment::new(SegmentKind::BlockRef, "level0001")])
            .await;
        assert_eq!(expanded[0].children, vec![Segment::text("((level0002))")]);
    }

    #[tokio::test]
    async fn test_cycle_is_cut() {
        let source = source(&[("aaaaaaaaa", "A ((bbbbbbbbb))"), ("bbbbbbbbb", "B ((aaaaaaaaa))")]);
        let resolver = RefResolver::new(&source, 10);
        let content = resolver.resolve("aaaaaaaaa").await;

        let b = &content[1];
        assert_eq!(b.value, "bbbbbbbbb");
        assert_eq!(b.children[1], Segment::text("((aaaaaaaaa))"));
    }

    #[tokio::test]
    async fn test_referenced_code_block_is_not_lexed() {
        let source = source(&[("code00001", "```sh\necho **x**\n```")]);
        let resolver = RefResolver::new(&source, 3);
        let content = resolver.resolve("code00001").await;
        assert_eq!(content, vec![Segment::code_block("sh", "echo **x**")]);
    }

    #[tokio::test]
    async fn test_disabled_resolver_passes_through() {
        let source = source(&[("abc123def", "text")]);
        let config = ExtractionConfig::builder()
            .resolve_block_refs(false)
            .build()
            .unwrap();
        let resolver = RefResolver::from_config(&source, &config);
        let segments = vec![Segment::new(SegmentKind::BlockRef, "abc123def")];
        assert_eq!(resolver.expand(segments.clone()).await, segments);
    }

    #[tokio::test]
    async fn test_zero_depth_never_fetches() {
        let source = source(&[("abc123def", "text")]);
        let resolver = RefResolver::new(&source, 0);
        assert_eq!(resolver.resolve("abc123def").await, vec![Segment::text("((abc123def))")]);
    }
}
