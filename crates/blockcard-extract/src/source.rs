//! Block data sources.
//!
//! The host's query facility is an external collaborator; this module only
//! defines the seam ([`BlockSource`]) and an in-memory implementation used by
//! the CLI and tests.

use async_trait::async_trait;
use blockcard_core::{BlockNode, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Asynchronous access to the host's block data.
///
/// `Err` means the source could not answer (API missing, request failed);
/// `Ok(None)` means the source answered and the uid does not exist.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Fetch a block with its full descendant tree.
    async fn fetch_block_tree(&self, uid: &str) -> Result<Option<BlockNode>>;

    /// Fetch a single block's raw text.
    async fn fetch_block_text(&self, uid: &str) -> Result<Option<String>>;
}

#[async_trait]
impl<S: BlockSource + ?Sized> BlockSource for Arc<S> {
    async fn fetch_block_tree(&self, uid: &str) -> Result<Option<BlockNode>> {
        (**self).fetch_block_tree(uid).await
    }

    async fn fetch_block_text(&self, uid: &str) -> Result<Option<String>> {
        (**self).fetch_block_text(uid).await
    }
}

/// Block source backed by trees held in memory.
///
/// Every node of every inserted tree is indexed by uid, so any descendant
/// can be fetched as the root of its own subtree.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlockSource {
    blocks: HashMap<String, BlockNode>,
}

impl MemoryBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from root trees.
    pub fn from_trees(trees: impl IntoIterator<Item = BlockNode>) -> Self {
        let mut source = Self::new();
        for tree in trees {
            source.insert(tree);
        }
        source
    }

    /// Load trees from JSON: either one block object or an array of them.
    /// Both plain keys and the host's `:block/...` pull keys are accepted.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let trees: Vec<BlockNode> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            serde_json::Value::Object(_) => vec![serde_json::from_value(value)?],
            other => {
                return Err(Error::parse_error(format!(
                    "expected a block object or array, found {}",
                    json_kind(&other)
                )));
            }
        };
        Ok(Self::from_trees(trees))
    }

    /// Index a tree and all of its descendants.
    pub fn insert(&mut self, tree: BlockNode) {
        for child in &tree.children {
            self.insert(child.clone());
        }
        if !tree.uid.is_empty() {
            self.blocks.insert(tree.uid.clone(), tree);
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[async_trait]
impl BlockSource for MemoryBlockSource {
    async fn fetch_block_tree(&self, uid: &str) -> Result<Option<BlockNode>> {
        Ok(self.blocks.get(uid).cloned())
    }

    async fn fetch_block_text(&self, uid: &str) -> Result<Option<String>> {
        Ok(self.blocks.get(uid).map(|b| b.string.clone()))
    }
}
