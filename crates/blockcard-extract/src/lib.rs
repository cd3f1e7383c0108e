//! # Blockcard Extract
//!
//! Turns a share root (the rendered element a user wants to share) into an
//! [`ExtractionResult`](blockcard_core::ExtractionResult): ordered segment
//! groups plus every image locator they contain.
//!
//! ## Paths
//!
//! - **Structured**: resolve the root's block uid, fetch the block tree from
//!   a [`BlockSource`], walk it in pre-order and lex every block, expanding
//!   `((uid))` references concurrently
//! - **DOM fallback**: classify the rendered HTML element by element when no
//!   structured data is available
//!
//! [`ContentExtractor`] tries the paths in order and returns the first
//! non-empty result. Failures are logged and degrade; nothing is raised.
//!
//! ## Quick Start
//!
//! ```
//! use blockcard_extract::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let tree = BlockNode::new("abc123def", "Ship **today**")
//!     .collapsed()
//!     .with_child(BlockNode::new("child0001", "then rest"));
//! let source = MemoryBlockSource::from_trees([tree]);
//! let extractor = ContentExtractor::new(source, ExtractionConfig::default());
//!
//! let root = RootElement::from_html(r#"<div data-uid="abc123def"></div>"#);
//! let result = extractor.extract_block_content(&root).await;
//! assert_eq!(result.segments.len(), 2);
//! assert_eq!(result.segments[1].visible_text(), "then rest");
//! # });
//! ```

pub mod dom;
pub mod extractor;
pub mod meta;
pub mod path;
pub mod resolver;
pub mod root;
pub mod source;
pub mod walker;

pub use dom::{DomExtractor, NodeAction, Stripper, classify};
pub use extractor::ContentExtractor;
pub use meta::CardMeta;
pub use path::{DomPath, ExtractionPath, StructuredPath};
pub use resolver::RefResolver;
pub use root::{RootElement, UidStrategy};
pub use source::{BlockSource, MemoryBlockSource};
pub use walker::TreeWalker;

/// Convenient prelude for common imports.
pub mod prelude {
    pub use blockcard_core::prelude::*;

    pub use crate::{
        BlockSource, CardMeta, ContentExtractor, ExtractionPath, MemoryBlockSource, RootElement,
    };
}
