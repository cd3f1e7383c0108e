//! Code block recognizer.
//!
//! A block whose raw text starts with a triple-backtick fence is a code
//! sample as a whole. It bypasses the inline lexer so that code is never
//! re-read as bold, italic or tag markup.

use blockcard_core::Segment;

const FENCE: &str = "```";

/// Language tag and body of a fenced block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

impl CodeBlock {
    pub fn into_segment(self) -> Segment {
        Segment::code_block(self.language, self.code)
    }
}

/// Whether the block text is a fenced code block.
pub fn is_code_block(text: &str) -> bool {
    text.starts_with(FENCE)
}

/// Split a fenced block into language and code.
///
/// - the language is the first token after the opening fence
/// - anything else on the opening line is kept as the first code line
/// - a closing fence on its own line, or fused onto the last code line,
///   is removed; a missing closing fence is tolerated
///
/// # Example
/// ```
/// use blockcard_parser::split_code_block;
///
/// let block = split_code_block("```go\nfmt.Println(1)\n```");
/// assert_eq!(block.language, "go");
/// assert_eq!(block.code, "fmt.Println(1)");
/// ```
pub fn split_code_block(text: &str) -> CodeBlock {
    let after_fence = text.strip_prefix(FENCE).unwrap_or(text);

    let Some((first_line, rest)) = after_fence.split_once('\n') else {
        // Single line: ```code``` or an unterminated ```code
        let code = strip_closing_fence(after_fence).trim();
        return CodeBlock {
            language: String::new(),
            code: code.to_string(),
        };
    };

    let first_line = first_line.trim_end_matches('\r');
    let (language, remainder) = match first_line.trim_start().split_once(char::is_whitespace) {
        Some((lang, remainder)) => (lang, remainder.trim()),
        None => (first_line.trim(), ""),
    };

    let body = strip_closing_fence(rest);
    let code = if remainder.is_empty() {
        body.to_string()
    } else if body.is_empty() {
        remainder.to_string()
    } else {
        format!("{}\n{}", remainder, body)
    };

    CodeBlock {
        language: language.to_string(),
        code,
    }
}

/// Remove a trailing closing fence and the line breaks before it.
fn strip_closing_fence(body: &str) -> &str {
    let trimmed = body.trim_end();
    match trimmed.strip_suffix(FENCE) {
        Some(code) => code.trim_end_matches(['\n', '\r']),
        None => body.trim_end_matches(['\n', '\r']),
    }
}

/// Parse one block's text: code blocks become a single `codeBlock`
/// segment, everything else goes through the lexer.
pub fn parse_block(text: &str) -> Vec<Segment> {
    if is_code_block(text) {
        vec![split_code_block(text).into_segment()]
    } else {
        crate::lexer::parse(text)
    }
}
