//! # Blockcard Parser
//!
//! Turns one outliner block's raw text into typed, render-agnostic
//! segments.
//!
//! This crate provides:
//! - A **segment lexer** for the host's inline markup: bold, italics,
//!   strikethrough, highlights, inline code, page references, tags, block
//!   references, links, images and line-start blockquotes
//! - A **code block recognizer** that keeps fenced blocks away from the
//!   inline lexer
//!
//! ## Architecture
//!
//! Each lexical pattern is an independent regex scan over the whole text.
//! All matches are merged by start offset and resolved with a single linear
//! sweep: the earliest match wins, equal starts fall back to pattern
//! precedence, and only bold-vs-italic ties prefer the longer span. The
//! lexer is total: malformed markup degrades to literal text.
//!
//! ## Quick Start
//!
//! ```
//! use blockcard_parser::{parse, parse_block};
//! use blockcard_core::SegmentKind;
//!
//! let segments = parse("Met [[Alice]] about ((abc123def))");
//! assert_eq!(segments[1].kind, SegmentKind::PageRef);
//! assert_eq!(segments[3].kind, SegmentKind::BlockRef);
//!
//! let code = parse_block("```sh\necho **hi**\n```");
//! assert_eq!(code.len(), 1);
//! assert_eq!(code[0].kind, SegmentKind::CodeBlock);
//! ```

mod code_block;
mod lexer;
mod patterns;

pub use code_block::{CodeBlock, is_code_block, parse_block, split_code_block};
pub use lexer::{Spanned, block_refs, lex, parse};

/// Convenient prelude for common imports.
pub mod prelude {
    pub use blockcard_core::{Segment, SegmentKind};

    pub use crate::{CodeBlock, is_code_block, parse, parse_block, split_code_block};
}
