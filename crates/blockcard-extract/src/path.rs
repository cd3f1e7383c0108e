//! Extraction paths.
//!
//! A path turns a share root into an [`ExtractionResult`]. An empty result
//! means "this path has nothing", which lets the orchestrator move on to the
//! next one.

use async_trait::async_trait;
use blockcard_core::{ExtractionConfig, ExtractionResult};

use crate::dom::DomExtractor;
use crate::root::RootElement;
use crate::source::BlockSource;
use crate::walker::TreeWalker;

/// One way of extracting card content.
#[async_trait]
pub trait ExtractionPath: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn extract(&self, root: &RootElement) -> ExtractionResult;
}

/// Reads the block tree from a [`BlockSource`].
pub struct StructuredPath<S> {
    source: S,
    config: ExtractionConfig,
}

impl<S: BlockSource> StructuredPath<S> {
    pub fn new(source: S, config: ExtractionConfig) -> Self {
        Self { source, config }
    }
}

#[async_trait]
impl<S: BlockSource> ExtractionPath for StructuredPath<S> {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn extract(&self, root: &RootElement) -> ExtractionResult {
        let Some(uid) = root.resolve_uid(&self.config) else {
            log::debug!("Structured path skipped: no block uid");
            return ExtractionResult::empty();
        };

        let groups = TreeWalker::new(&self.source, &self.config)
            .collect(&uid)
            .await;
        ExtractionResult::from_groups(groups)
    }
}

/// Reads the rendered HTML of the share root.
pub struct DomPath {
    config: ExtractionConfig,
}

impl DomPath {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ExtractionPath for DomPath {
    fn name(&self) -> &'static str {
        "dom"
    }

    async fn extract(&self, root: &RootElement) -> ExtractionResult {
        DomExtractor::new(&self.config).extract(root)
    }
}
