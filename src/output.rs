//! Tokenizer output aggregation (§4.2, §3): the token range collection, a
//! parallel line-span range collection, and the predominant end-of-line and
//! indentation conventions observed in the source.

use crate::range::RangeCollection;
use crate::token::{NewLineKind, Token};
use std::collections::HashMap;

pub struct TokenizerOutput<'src> {
    pub tokens: RangeCollection<Token<'src>>,
    /// One entry per physical line, including its terminator bytes (so the
    /// union of all line lengths equals the source length).
    pub lines: RangeCollection<()>,
    /// The most frequently occurring line terminator, or `None` for a
    /// single-line (or empty) source with nothing to tally.
    pub predominant_end_of_line: Option<NewLineKind>,
    /// The most frequently occurring single-level leading-whitespace run
    /// among indented lines, or `None` if the source has no indented lines.
    pub predominant_indent: Option<String>,
}

/// Splits `source` into physical lines, each spanning from its first byte to
/// (and including) its line terminator. Tallies terminator kinds as it goes.
pub fn compute_lines(source: &str) -> (RangeCollection<()>, Option<NewLineKind>) {
    let bytes = source.as_bytes();
    let mut lines = RangeCollection::new();
    let mut counts: HashMap<&'static str, u32> = HashMap::new();
    let mut line_start = 0usize;
    let mut pos = 0usize;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\n' => {
                lines.push(line_start as u32, (pos + 1 - line_start) as u32, ());
                *counts.entry("lf").or_insert(0) += 1;
                pos += 1;
                line_start = pos;
            }
            b'\r' => {
                let crlf = bytes.get(pos + 1) == Some(&b'\n');
                let len = if crlf { 2 } else { 1 };
                lines.push(line_start as u32, (pos + len - line_start) as u32, ());
                *counts.entry(if crlf { "crlf" } else { "cr" }).or_insert(0) += 1;
                pos += len;
                line_start = pos;
            }
            _ => pos += 1,
        }
    }
    if line_start < bytes.len() || lines.is_empty() {
        lines.push(line_start as u32, (bytes.len() - line_start) as u32, ());
    }

    let predominant = counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(kind, _)| match kind {
            "lf" => NewLineKind::Lf,
            "crlf" => NewLineKind::CrLf,
            "cr" => NewLineKind::Cr,
            _ => unreachable!(),
        });
    (lines, predominant)
}

/// Samples the leading whitespace run of every indented line (a line whose
/// first byte is a space or tab and is followed by non-whitespace content)
/// and returns the most frequently occurring one.
pub fn compute_predominant_indent(source: &str) -> Option<String> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        let whitespace_len = trimmed
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .count();
        if whitespace_len == 0 || whitespace_len == trimmed.len() {
            continue;
        }
        *counts.entry(&trimmed[..whitespace_len]).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(s, _)| s.to_string())
}
