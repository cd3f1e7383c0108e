//! # Blockcard
//!
//! Rich-text extraction for sharing outliner blocks as image cards.
//!
//! Re-exports the workspace crates and provides the `blockcard` command-line
//! front end:
//!
//! - [`blockcard_core`]: segment data model, configuration, errors
//! - [`blockcard_parser`]: markdown segment lexer and code block recognizer
//! - [`blockcard_extract`]: tree walker, reference resolver, DOM fallback
//!   and the extraction orchestrator

pub mod cli;

pub use blockcard_core::prelude::*;
pub use blockcard_extract::*;
pub use blockcard_parser::{parse, parse_block};

/// Convenient prelude for common imports.
pub mod prelude {
    pub use blockcard_extract::prelude::*;
    pub use blockcard_parser::{parse, parse_block};
}
