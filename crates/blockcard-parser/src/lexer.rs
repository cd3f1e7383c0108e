//! Markdown segment lexer.
//!
//! Runs every pattern of the battery over the whole text, merges the matches
//! by start offset and keeps them with one linear sweep:
//! - a match is accepted only if it starts at or after the end of the last
//!   accepted match (earliest start wins)
//! - matches starting at the same offset are ordered by precedence slot;
//!   inside the emphasis slot (bold/italic) the longer span wins
//! - everything between accepted matches is emitted verbatim as text
//!
//! The lexer never fails: unterminated markers are simply left as text.

use blockcard_core::{Segment, SegmentKind};
use std::cmp::Reverse;
use std::ops::Range;

use crate::patterns::BATTERY;

/// A segment together with the byte span it was lexed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub range: Range<usize>,
    pub segment: Segment,
}

/// A match before overlap resolution.
struct Candidate {
    range: Range<usize>,
    slot: u8,
    segment: Segment,
}

impl Candidate {
    /// Sort key: start offset, then precedence slot, then (emphasis only)
    /// longest span first. Candidates are collected in battery order and the
    /// sort is stable, so remaining ties keep battery order.
    fn sort_key(&self) -> (usize, u8, Reverse<usize>) {
        let len = if self.segment.kind.is_emphasis() {
            self.range.len()
        } else {
            0
        };
        (self.range.start, self.slot, Reverse(len))
    }
}

/// Collect every guarded, non-empty match of every pattern.
fn candidates(text: &str) -> Vec<Candidate> {
    let mut found = Vec::new();

    for pattern in BATTERY {
        if !text.contains(pattern.trigger) {
            continue;
        }

        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.is_empty() {
                continue;
            }
            if let Some(guard) = pattern.guard
                && !guard(text, whole.start(), whole.end())
            {
                continue;
            }
            if let Some(segment) = (pattern.build)(&caps) {
                found.push(Candidate {
                    range: whole.range(),
                    slot: pattern.slot,
                    segment,
                });
            }
        }
    }

    found
}

/// Lex `text` into accepted matches with their spans, in source order.
///
/// Gaps between matches are not included; see [`parse`] for the full
/// segment sequence.
pub fn lex(text: &str) -> Vec<Spanned> {
    let mut found = candidates(text);
    found.sort_by_key(Candidate::sort_key);

    let mut accepted = Vec::with_capacity(found.len());
    let mut cursor = 0;
    for candidate in found {
        if candidate.range.start >= cursor {
            cursor = candidate.range.end;
            accepted.push(Spanned {
                range: candidate.range,
                segment: candidate.segment,
            });
        }
    }
    accepted
}

/// Parse one block's raw text into an ordered segment sequence.
///
/// # Example
/// ```
/// use blockcard_parser::parse;
/// use blockcard_core::SegmentKind;
///
/// let segments = parse("Read **this** with #focus");
/// assert_eq!(segments.len(), 4);
/// assert_eq!(segments[1].kind, SegmentKind::Bold);
/// assert_eq!(segments[3].value, "#focus");
/// ```
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for spanned in lex(text) {
        if spanned.range.start > cursor {
            segments.push(Segment::text(&text[cursor..spanned.range.start]));
        }
        cursor = spanned.range.end;
        segments.push(spanned.segment);
    }

    if cursor < text.len() {
        segments.push(Segment::text(&text[cursor..]));
    }

    segments
}

/// Block references found in `segments`, in order.
pub fn block_refs(segments: &[Segment]) -> impl Iterator<Item = &str> {
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::BlockRef)
        .map(|s| s.value.as_str())
}
