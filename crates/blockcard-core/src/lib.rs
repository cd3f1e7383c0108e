//! # Blockcard Core
//!
//! Core data model, error types and configuration for extracting outliner
//! blocks into render-agnostic segments. Every other blockcard crate depends
//! on the types defined here.
//!
//! ## Core Modules
//!
//! - [`models`] - Segments, segment groups, extraction results, block trees
//! - [`error`] - Error type and Result alias
//! - [`config`] - Extraction configuration with builder and YAML loading
//! - [`utils`] - Card statistics and serialization helpers
//!
//! ## Usage Examples
//!
//! ```
//! use blockcard_core::prelude::*;
//!
//! let group = SegmentGroup::main(vec![
//!     Segment::text("Ship "),
//!     Segment::new(SegmentKind::Bold, "today"),
//! ]);
//! let result = ExtractionResult::from_groups(vec![group]);
//! assert_eq!(result.segments[0].visible_text(), "Ship today");
//! assert!(result.images.is_empty());
//! ```
//!
//! ```
//! use blockcard_core::prelude::*;
//!
//! let config = ExtractionConfig::builder().max_ref_depth(2).build().unwrap();
//! assert!(config.resolve_block_refs);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use config::{DEFAULT_STRIP_SELECTORS, ExtractionConfig, ExtractionConfigBuilder};
pub use error::{Error, Result};
pub use models::*;
pub use utils::{count_content_blocks, days_between, is_content_block, to_json_string, usage_days};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ExtractionConfig;
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        BlockNode, ExtractionResult, GroupRole, Segment, SegmentGroup, SegmentKind,
    };
}
