//! A lexical analyzer for Python source text.
//!
//! Zero-copy: every identifier, string, and number token borrows its text
//! directly from the input `&str`. The tokenizer is total — it never panics
//! or returns an error for malformed input; anomalies are encoded as token
//! flags (`Invalid`, `Unterminated`) instead.
//!
//! ```
//! use pytokenizer::tokenize;
//!
//! let output = pytokenizer::tokenize("x = 1\n");
//! assert!(output.tokens.count() > 0);
//! ```

pub mod classifier;
pub mod keywords;
pub mod numeric;
pub mod output;
pub mod range;
pub mod scanner;
pub mod string_scan;
pub mod token;
pub mod unescape;

pub use output::TokenizerOutput;
pub use range::{RangeCollection, RangeEntry};
pub use scanner::Scanner;
pub use token::{
    CommentRange, KeywordType, NewLineKind, NumberValue, OperatorType, StringFlags, StringToken,
    Token, TokenKind, TokenRange,
};
pub use unescape::{
    split_format_segments, unescape, FormatSegment, UnescapeError, UnescapeErrorKind,
    UnescapedString,
};

/// Tokenize `source` in full, returning every token alongside the derived
/// line index and the source's predominant end-of-line and indent
/// conventions.
pub fn tokenize(source: &str) -> TokenizerOutput<'_> {
    let mut scanner = Scanner::new(source);
    let mut tokens = RangeCollection::new();

    loop {
        let token = scanner.next_token();
        let is_end = matches!(token.kind, TokenKind::EndOfStream);
        tokens.push(token.range.start, token.range.length, token);
        if is_end {
            break;
        }
    }

    let (lines, predominant_end_of_line) = output::compute_lines(source);
    let predominant_indent = output::compute_predominant_indent(source);

    TokenizerOutput {
        tokens,
        lines,
        predominant_end_of_line,
        predominant_indent,
    }
}
