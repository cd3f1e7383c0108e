//! Structured block tree walker.

use blockcard_core::{BlockNode, ExtractionConfig, SegmentGroup};
use blockcard_parser::parse_block;
use futures::future::join_all;

use crate::resolver::RefResolver;
use crate::source::BlockSource;

/// Walks a block and its descendants into segment groups.
pub struct TreeWalker<'a, S: BlockSource + ?Sized> {
    source: &'a S,
    config: &'a ExtractionConfig,
}

impl<'a, S: BlockSource + ?Sized> TreeWalker<'a, S> {
    pub fn new(source: &'a S, config: &'a ExtractionConfig) -> Self {
        Self { source, config }
    }

    /// Collect one group per non-empty block, in pre-order: the root first
    /// (`main`, depth 0), then each child subtree in `order` sequence.
    ///
    /// Collapsed blocks are walked like open ones. A missing root or a
    /// failing source yields no groups.
    pub async fn collect(&self, uid: &str) -> Vec<SegmentGroup> {
        let tree = match self.source.fetch_block_tree(uid).await {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                log::debug!("Block {} not found in source", uid);
                return Vec::new();
            }
            Err(e) if e.is_unavailable() => {
                log::debug!("Block source unavailable for {}: {}", uid, e);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Failed to fetch block tree for {}: {}", uid, e);
                return Vec::new();
            }
        };

        let visits = self.flatten(&tree);
        let resolver = RefResolver::from_config(self.source, self.config);
        let groups = visits.into_iter().map(|(depth, text)| {
            let resolver = &resolver;
            async move {
                let content = resolver.expand(parse_block(text)).await;
                if depth == 0 {
                    SegmentGroup::main(content)
                } else {
                    SegmentGroup::child(depth, content)
                }
            }
        });

        join_all(groups).await
    }

    /// Pre-order list of `(depth, text)` for every non-empty block within
    /// the depth bound.
    fn flatten<'t>(&self, tree: &'t BlockNode) -> Vec<(usize, &'t str)> {
        let mut visits = Vec::new();
        let mut stack = vec![(0usize, tree)];

        while let Some((depth, node)) = stack.pop() {
            if !node.string.trim().is_empty() {
                visits.push((depth, node.string.as_str()));
            }
            if node.children.is_empty() {
                continue;
            }
            if depth >= self.config.max_tree_depth {
                log::debug!(
                    "Not descending below block {} at depth {}",
                    node.uid,
                    depth
                );
                continue;
            }
            // Reverse so the lowest order is popped first.
            for child in node.sorted_children().into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }

        visits
    }
}
