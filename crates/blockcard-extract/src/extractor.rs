//! Content extraction orchestrator.

use blockcard_core::{ExtractionConfig, ExtractionResult};

use crate::path::{DomPath, ExtractionPath, StructuredPath};
use crate::root::RootElement;
use crate::source::BlockSource;

/// Runs extraction paths in order and returns the first non-empty result.
///
/// Results from different paths are never merged. Every failure degrades to
/// the next path and finally to an empty result, so extraction itself never
/// returns an error.
pub struct ContentExtractor {
    paths: Vec<Box<dyn ExtractionPath>>,
}

impl ContentExtractor {
    /// Structured data from `source` first, rendered HTML second.
    pub fn new<S>(source: S, config: ExtractionConfig) -> Self
    where
        S: BlockSource + 'static,
    {
        Self::with_paths(vec![
            Box::new(StructuredPath::new(source, config.clone())),
            Box::new(DomPath::new(config)),
        ])
    }

    /// Rendered HTML only, for hosts without a query facility.
    pub fn dom_only(config: ExtractionConfig) -> Self {
        Self::with_paths(vec![Box::new(DomPath::new(config))])
    }

    pub fn with_paths(paths: Vec<Box<dyn ExtractionPath>>) -> Self {
        Self { paths }
    }

    pub fn path_names(&self) -> Vec<&'static str> {
        self.paths.iter().map(|p| p.name()).collect()
    }

    /// Extract the content of the block behind `root`.
    pub async fn extract_block_content(&self, root: &RootElement) -> ExtractionResult {
        for path in &self.paths {
            let result = path.extract(root).await;
            if !result.is_empty() {
                log::debug!(
                    "Extracted {} groups via {} path",
                    result.segments.len(),
                    path.name()
                );
                return result;
            }
            log::debug!("{} path produced nothing", path.name());
        }

        log::debug!("No extraction path produced content");
        ExtractionResult::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryBlockSource;
    use async_trait::async_trait;
    use blockcard_core::{BlockNode, Segment, SegmentGroup};

    struct FixedPath(&'static str, ExtractionResult);

    #[async_trait]
    impl ExtractionPath for FixedPath {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn extract(&self, _root: &RootElement) -> ExtractionResult {
            self.1.clone()
        }
    }

    fn single(text: &str) -> ExtractionResult {
        ExtractionResult::from_groups(vec![SegmentGroup::main(vec![Segment::text(text)])])
    }

    #[test]
    fn test_default_path_order() {
        let extractor = ContentExtractor::new(MemoryBlockSource::new(), ExtractionConfig::default());
        assert_eq!(extractor.path_names(), vec!["structured", "dom"]);
        let dom = ContentExtractor::dom_only(ExtractionConfig::default());
        assert_eq!(dom.path_names(), vec!["dom"]);
    }

    #[tokio::test]
    async fn test_first_non_empty_wins() {
        let extractor = ContentExtractor::with_paths(vec![
            Box::new(FixedPath("none", ExtractionResult::empty())),
            Box::new(FixedPath("a", single("a"))),
            Box::new(FixedPath("b", single("b"))),
        ]);
        let result = extractor.extract_block_content(&RootElement::default()).await;
        assert_eq!(result, single("a"));
    }

    #[tokio::test]
    async fn test_no_paths_is_empty() {
        let extractor = ContentExtractor::with_paths(Vec::new());
        assert!(extractor.extract_block_content(&RootElement::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_structured_results_are_not_mixed_with_dom() {
        let source = MemoryBlockSource::from_trees([BlockNode::new("abc123def", "From tree")]);
        let extractor = ContentExtractor::new(source, ExtractionConfig::default());
        let root = RootElement::from_html(r#"<div class="rm-block-text">From DOM</div>"#).with_uid("abc123def");

        let result = extractor.extract_block_content(&root).await;
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].visible_text(), "From tree");
    }
}
