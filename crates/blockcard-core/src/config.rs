//! Extraction configuration.
//!
//! Follows a builder pattern with validation. Every field has a default so a
//! partial YAML file only overrides what it names.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Selectors for non-content subtrees the DOM fallback never descends into.
pub const DEFAULT_STRIP_SELECTORS: &[&str] = &[
    ".bp3-popover-wrapper",
    ".bp3-popover-target",
    ".bp3-tooltip-indicator",
    "[class*='copy']",
    "button",
    ".roam-toolkit-copy-icon",
    ".rm-block-ref__copy",
    "[data-tooltip]",
    ".rm-caret",
    ".rm-bullet",
    ".rm-multibar",
    "svg",
    ".bp3-icon",
    ".rm-block-ref__delete",
    ".rm-code-block__settings-bar",
    ".CodeMirror-gutters",
];

/// Configuration for one extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Deepest descendant level the tree walker visits (root = 0)
    pub max_tree_depth: usize,
    /// How many levels of nested block references are expanded
    pub max_ref_depth: usize,
    /// Replace `((uid))` references with the referenced content
    pub resolve_block_refs: bool,
    /// Attributes consulted, in order, for the root block uid
    pub uid_attributes: Vec<String>,
    /// Length of the uid suffix carried by rendered element ids
    pub uid_suffix_len: usize,
    /// Selector for elements holding one block's rendered text
    pub block_text_selector: String,
    /// Selectors for subtrees skipped by the DOM fallback
    pub strip_selectors: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: 32,
            max_ref_depth: 3,
            resolve_block_refs: true,
            uid_attributes: vec!["data-uid".to_string(), "data-block-uid".to_string()],
            uid_suffix_len: 9,
            block_text_selector: ".rm-block-text".to_string(),
            strip_selectors: DEFAULT_STRIP_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExtractionConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder starting from defaults
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_tree_depth == 0 {
            return Err(Error::config_error("max_tree_depth must be at least 1"));
        }
        if self.uid_suffix_len == 0 {
            return Err(Error::config_error("uid_suffix_len must be at least 1"));
        }
        if self.block_text_selector.trim().is_empty() {
            return Err(Error::config_error("block_text_selector cannot be empty"));
        }
        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config_error(format!("Invalid extraction config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Builder for ExtractionConfig
#[derive(Debug, Default)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn max_tree_depth(mut self, depth: usize) -> Self {
        self.config.max_tree_depth = depth;
        self
    }

    pub fn max_ref_depth(mut self, depth: usize) -> Self {
        self.config.max_ref_depth = depth;
        self
    }

    pub fn resolve_block_refs(mut self, resolve: bool) -> Self {
        self.config.resolve_block_refs = resolve;
        self
    }

    pub fn uid_attributes<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.uid_attributes = attrs.into_iter().map(Into::into).collect();
        self
    }

    pub fn uid_suffix_len(mut self, len: usize) -> Self {
        self.config.uid_suffix_len = len;
        self
    }

    pub fn block_text_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.block_text_selector = selector.into();
        self
    }

    /// Add one selector to the strip list
    pub fn strip_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.strip_selectors.push(selector.into());
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<ExtractionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
