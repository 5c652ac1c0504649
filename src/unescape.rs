//! Escape-sequence decoding and f-string segment splitting (§4.5).
//!
//! Decoding is a lazy second pass over a [`StringToken`]'s `escaped_value` —
//! the scanner never decodes eagerly, keeping scanning itself allocation-free
//! and letting the parser request f-string segments only when needed.

use crate::token::{StringFlags, StringToken};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeErrorKind {
    /// A backslash escape that isn't recognized, including a `\N{NAME}` whose
    /// name doesn't resolve to a character — both fold into this one kind
    /// (see DESIGN.md Open Question #2).
    InvalidEscapeSequence,
    /// A lone `}` inside an f-string literal segment, not paired with a
    /// matching `{` and not escaped as `}}`.
    SingleCloseBraceWithinFormatLiteral,
    /// A `\` anywhere inside an f-string expression segment.
    EscapeWithinFormatExpression,
    /// An expression segment's `{` has no matching `}` before the string ends.
    UnterminatedFormatExpression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnescapeError {
    pub kind: UnescapeErrorKind,
    /// Byte offset into `escaped_value` where the faulty sequence begins.
    pub offset: usize,
    /// Byte length of the faulty sequence.
    pub length: usize,
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UnescapeErrorKind::InvalidEscapeSequence => {
                write!(f, "invalid escape sequence at offset {}", self.offset)
            }
            UnescapeErrorKind::SingleCloseBraceWithinFormatLiteral => {
                write!(f, "single '}}' not allowed in format literal at offset {}", self.offset)
            }
            UnescapeErrorKind::EscapeWithinFormatExpression => {
                write!(f, "'\\' not allowed in format expression at offset {}", self.offset)
            }
            UnescapeErrorKind::UnterminatedFormatExpression => {
                write!(f, "unterminated format expression starting at offset {}", self.offset)
            }
        }
    }
}

impl std::error::Error for UnescapeError {}

/// The decoded form of a [`StringToken`]: its cooked value, any decode
/// errors, and (for f-strings) the literal/expression split of its body.
#[derive(Debug, Clone, Default)]
pub struct UnescapedString<'src> {
    pub value: String,
    pub errors: Vec<UnescapeError>,
    /// Populated only when the source token has [`StringFlags::FORMAT`] set.
    pub format_segments: Vec<FormatSegment<'src>>,
    /// Set when the source token is a `b"..."` literal containing a code
    /// point ≥ 0x80 anywhere in the cooked value.
    pub non_ascii_in_bytes: bool,
}

/// One piece of an f-string body: either literal text or a `{...}` expression
/// (still raw, unparsed source text — the parser recurses into it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment<'src> {
    Literal(&'src str),
    Expression(&'src str),
}

/// Decode a [`StringToken`] into its cooked value, escape errors, and (for
/// f-strings) literal/expression segments — the single computed result
/// described for `UnescapedString` (§3).
///
/// Raw strings (flagged [`StringFlags::RAW`]) pass the body through
/// verbatim with no decode errors; a raw f-string still gets its body split
/// into segments, since raw-ness only disables escape decoding, not the
/// `{...}` expression grammar.
pub fn unescape<'src>(token: &StringToken<'src>) -> UnescapedString<'src> {
    let bytes_literal = token.flags.contains(StringFlags::BYTES);
    let format = token.flags.contains(StringFlags::FORMAT);
    let src = token.escaped_value;

    let (value, mut errors, non_ascii_in_bytes) = if token.flags.contains(StringFlags::RAW) {
        let non_ascii = bytes_literal && src.chars().any(|c| !c.is_ascii());
        (src.to_string(), Vec::new(), non_ascii)
    } else {
        decode_escapes(src, bytes_literal)
    };

    let format_segments = if format {
        let (segments, segment_errors) = split_format_segments(src);
        errors.extend(segment_errors);
        segments
    } else {
        Vec::new()
    };

    UnescapedString {
        value,
        errors,
        format_segments,
        non_ascii_in_bytes,
    }
}

/// Decodes backslash escapes in a non-raw string body, returning the cooked
/// value, any `InvalidEscapeSequence` errors, and whether a non-ASCII code
/// point was seen (meaningful only when the caller is a bytes literal).
fn decode_escapes(src: &str, bytes_literal: bool) -> (String, Vec<UnescapeError>, bool) {
    let mut out = String::with_capacity(src.len());
    let mut errors = Vec::new();
    let mut non_ascii_in_bytes = false;

    let mut chars = src.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if bytes_literal && !c.is_ascii() {
            non_ascii_in_bytes = true;
            out.push(c);
            continue;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => {
                out.push('\\');
            }
            Some((_, next)) => match next {
                '\n' => {}
                '\r' => {
                    if chars.peek().is_some_and(|&(_, c)| c == '\n') {
                        chars.next();
                    }
                }
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0C}'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'v' => out.push('\u{0B}'),
                '0'..='7' => {
                    let mut value = next.to_digit(8).unwrap();
                    for _ in 0..2 {
                        match chars.peek() {
                            Some(&(_, d)) if d.is_digit(8) => {
                                value = value * 8 + d.to_digit(8).unwrap();
                                chars.next();
                            }
                            _ => break,
                        }
                    }
                    let end = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
                    match char::from_u32(value) {
                        Some(c) => out.push(c),
                        None => errors.push(UnescapeError {
                            kind: UnescapeErrorKind::InvalidEscapeSequence,
                            offset: idx,
                            length: end - idx,
                        }),
                    }
                }
                'x' => {
                    let decoded = read_hex_digits(&mut chars, 2);
                    let end = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
                    match decoded.and_then(char::from_u32) {
                        Some(c) => out.push(c),
                        None => errors.push(UnescapeError {
                            kind: UnescapeErrorKind::InvalidEscapeSequence,
                            offset: idx,
                            length: end - idx,
                        }),
                    }
                }
                'u' if !bytes_literal => {
                    let decoded = read_hex_digits(&mut chars, 4);
                    let end = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
                    match decoded.and_then(char::from_u32) {
                        Some(c) => out.push(c),
                        None => errors.push(UnescapeError {
                            kind: UnescapeErrorKind::InvalidEscapeSequence,
                            offset: idx,
                            length: end - idx,
                        }),
                    }
                }
                'U' if !bytes_literal => {
                    let decoded = read_hex_digits(&mut chars, 8);
                    let end = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
                    match decoded.and_then(char::from_u32) {
                        Some(c) => out.push(c),
                        None => errors.push(UnescapeError {
                            kind: UnescapeErrorKind::InvalidEscapeSequence,
                            offset: idx,
                            length: end - idx,
                        }),
                    }
                }
                'N' if !bytes_literal => {
                    let decoded = read_named_escape(&mut chars);
                    let end = chars.peek().map(|&(i, _)| i).unwrap_or(src.len());
                    match decoded {
                        Some(c) => out.push(c),
                        None => errors.push(UnescapeError {
                            kind: UnescapeErrorKind::InvalidEscapeSequence,
                            offset: idx,
                            length: end - idx,
                        }),
                    }
                }
                other => {
                    // Unrecognized escapes pass through verbatim (matching
                    // CPython's lenient DeprecationWarning-only behavior)
                    // but are still flagged.
                    out.push('\\');
                    out.push(other);
                    errors.push(UnescapeError {
                        kind: UnescapeErrorKind::InvalidEscapeSequence,
                        offset: idx,
                        length: 1 + other.len_utf8(),
                    });
                }
            },
        }
    }

    (out, errors, non_ascii_in_bytes)
}

fn read_hex_digits(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    count: usize,
) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        let (_, c) = chars.next()?;
        let digit = c.to_digit(16)?;
        value = value * 16 + digit;
    }
    Some(value)
}

/// Reads `{NAME}` following a `\N` escape and resolves it via the Unicode
/// character-name database.
fn read_named_escape(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Option<char> {
    match chars.next() {
        Some((_, '{')) => {}
        _ => return None,
    }
    let mut name = String::new();
    loop {
        match chars.next() {
            Some((_, '}')) => break,
            Some((_, c)) => name.push(c),
            None => return None,
        }
    }
    unicode_names2::character(&name)
}

/// Splits an f-string body into literal and expression segments. `{{` and
/// `}}` are literal-escaped braces; a single `{...}` opens an expression that
/// runs to its matching `}`, tracking brace/paren/bracket nesting and
/// single/double-quote state so a `}` inside a nested string or collection
/// literal doesn't prematurely close it. Format-spec/conversion suffixes
/// (`!r`, `:spec`) are left inside the expression segment — this tokenizer
/// does not recurse into them, leaving the structure to the parser.
///
/// Errors are reported in the returned list rather than raised:
/// - a `}` with no matching `{` (and not doubled as `}}`) ends the literal
///   segment just before it and is reported as
///   [`UnescapeErrorKind::SingleCloseBraceWithinFormatLiteral`];
/// - a `\` anywhere inside an expression segment is reported as
///   [`UnescapeErrorKind::EscapeWithinFormatExpression`] at the backslash,
///   and the character it precedes is still consumed;
/// - an expression segment whose `{` has no matching `}` before the body
///   ends is reported as [`UnescapeErrorKind::UnterminatedFormatExpression`]
///   at the opening `{`.
pub fn split_format_segments(body: &str) -> (Vec<FormatSegment<'_>>, Vec<UnescapeError>) {
    let mut segments = Vec::new();
    let mut errors = Vec::new();
    let bytes = body.as_bytes();
    let mut literal_start = 0usize;
    let mut pos = 0usize;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' if bytes.get(pos + 1) == Some(&b'{') => {
                if pos > literal_start {
                    segments.push(FormatSegment::Literal(&body[literal_start..pos]));
                }
                segments.push(FormatSegment::Literal("{"));
                pos += 2;
                literal_start = pos;
            }
            b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                if pos > literal_start {
                    segments.push(FormatSegment::Literal(&body[literal_start..pos]));
                }
                segments.push(FormatSegment::Literal("}"));
                pos += 2;
                literal_start = pos;
            }
            b'{' => {
                if pos > literal_start {
                    segments.push(FormatSegment::Literal(&body[literal_start..pos]));
                }
                let brace_offset = pos;
                let expr_start = pos + 1;
                let mut depth = 1usize;
                let mut paren_depth = 0usize;
                let mut bracket_depth = 0usize;
                let mut quote: Option<u8> = None;
                let mut end = expr_start;
                while end < bytes.len() {
                    let b = bytes[end];
                    if let Some(q) = quote {
                        if b == b'\\' {
                            errors.push(UnescapeError {
                                kind: UnescapeErrorKind::EscapeWithinFormatExpression,
                                offset: end,
                                length: if end + 1 < bytes.len() { 2 } else { 1 },
                            });
                            end = (end + 2).min(bytes.len());
                            continue;
                        }
                        if b == q {
                            quote = None;
                        }
                        end += 1;
                        continue;
                    }
                    match b {
                        b'\\' => {
                            errors.push(UnescapeError {
                                kind: UnescapeErrorKind::EscapeWithinFormatExpression,
                                offset: end,
                                length: if end + 1 < bytes.len() { 2 } else { 1 },
                            });
                            end = (end + 2).min(bytes.len());
                        }
                        b'\'' | b'"' => {
                            quote = Some(b);
                            end += 1;
                        }
                        b'(' => {
                            paren_depth += 1;
                            end += 1;
                        }
                        b')' => {
                            paren_depth = paren_depth.saturating_sub(1);
                            end += 1;
                        }
                        b'[' => {
                            bracket_depth += 1;
                            end += 1;
                        }
                        b']' => {
                            bracket_depth = bracket_depth.saturating_sub(1);
                            end += 1;
                        }
                        b'{' => {
                            depth += 1;
                            end += 1;
                        }
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            end += 1;
                        }
                        _ => end += 1,
                    }
                }
                segments.push(FormatSegment::Expression(&body[expr_start..end]));
                if depth > 0 {
                    errors.push(UnescapeError {
                        kind: UnescapeErrorKind::UnterminatedFormatExpression,
                        offset: brace_offset,
                        length: 1,
                    });
                    pos = bytes.len();
                } else {
                    pos = (end + 1).min(bytes.len());
                }
                literal_start = pos;
            }
            b'}' => {
                if pos > literal_start {
                    segments.push(FormatSegment::Literal(&body[literal_start..pos]));
                }
                errors.push(UnescapeError {
                    kind: UnescapeErrorKind::SingleCloseBraceWithinFormatLiteral,
                    offset: pos,
                    length: 1,
                });
                pos += 1;
                literal_start = pos;
            }
            _ => pos += 1,
        }
    }
    if literal_start < body.len() {
        segments.push(FormatSegment::Literal(&body[literal_start..]));
    }
    (segments, errors)
}
