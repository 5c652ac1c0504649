//! Integration tests for the public `tokenize()` entry point: full-source
//! scans exercising indentation, f-strings, decorators, multi-line calls,
//! and the concrete scenarios pinned in the tokenizer's design notes.

use pytokenizer::{
    split_format_segments, tokenize, unescape, FormatSegment, KeywordType, NewLineKind,
    NumberValue, OperatorType, StringFlags, TokenKind, UnescapeErrorKind,
};

fn kinds(source: &str) -> Vec<TokenKind<'_>> {
    tokenize(source)
        .tokens
        .iter()
        .map(|e| e.value.kind.clone())
        .collect()
}

// ── scenario 1: empty input ──────────────────────────────────────────────────

#[test]
fn scenario_1_empty_input() {
    let out = tokenize("");
    assert_eq!(out.tokens.count(), 2);
    assert!(matches!(
        out.tokens.get_item_at(0).unwrap().value.kind,
        TokenKind::NewLine(NewLineKind::Implied)
    ));
    assert_eq!(out.tokens.get_item_at(0).unwrap().length, 0);
    assert!(matches!(
        out.tokens.get_item_at(1).unwrap().value.kind,
        TokenKind::EndOfStream
    ));
    assert_eq!(out.lines.count(), 1);
}

// ── scenario 2: mixed line terminators ───────────────────────────────────────

#[test]
fn scenario_2_mixed_terminators() {
    let ks = kinds("\na\r\nb\r");
    assert!(matches!(ks[0], TokenKind::NewLine(NewLineKind::Lf)));
    assert!(matches!(ks[1], TokenKind::Identifier("a")));
    assert!(matches!(ks[2], TokenKind::NewLine(NewLineKind::CrLf)));
    assert!(matches!(ks[3], TokenKind::Identifier("b")));
    assert!(matches!(ks[4], TokenKind::NewLine(NewLineKind::Cr)));
    assert!(matches!(ks.last().unwrap(), TokenKind::EndOfStream));
}

// ── scenario 3: dot/ellipsis maximal munch ───────────────────────────────────

#[test]
fn scenario_3_dot_and_ellipsis() {
    let ks = kinds(". .. ... ....");
    let non_trivia: Vec<_> = ks
        .iter()
        .filter(|k| !matches!(k, TokenKind::NewLine(_) | TokenKind::EndOfStream))
        .collect();
    assert!(matches!(non_trivia[0], TokenKind::Dot));
    assert!(matches!(non_trivia[1], TokenKind::Dot));
    assert!(matches!(non_trivia[2], TokenKind::Dot));
    assert!(matches!(non_trivia[3], TokenKind::Ellipsis));
    assert!(matches!(non_trivia[4], TokenKind::Ellipsis));
    assert!(matches!(non_trivia[5], TokenKind::Dot));
}

// ── scenario 4: indentation with tabs ────────────────────────────────────────

#[test]
fn scenario_4_tab_indentation_ambiguity() {
    let src = "test\n  i1\n  i2  # \n       # \n  \ti3\n\ti4\n i1";
    let ks = kinds(src);

    let indents: Vec<usize> = ks
        .iter()
        .filter_map(|k| match k {
            TokenKind::Indent { indent_amount, .. } => Some(*indent_amount),
            _ => None,
        })
        .collect();
    // First indent opens the level-2 block; the `\ti3` line (2 spaces then a
    // tab expanding to the next multiple of 8) opens a further level-8 block.
    assert_eq!(indents, vec![2, 8]);

    let dedents: Vec<(usize, bool)> = ks
        .iter()
        .filter_map(|k| match k {
            TokenKind::Dedent {
                indent_amount,
                matches_indent,
            } => Some((*indent_amount, *matches_indent)),
            _ => None,
        })
        .collect();
    assert!(dedents.contains(&(2, true)));
    assert!(dedents.contains(&(1, false)));
}

// ── scenario 5: numeric literal grammar ──────────────────────────────────────

#[test]
fn scenario_5_numeric_literals() {
    let ks = kinds("1 0X2 0xFe_Ab 0x");
    let numbers: Vec<String> = ks
        .iter()
        .filter_map(|k| match k {
            TokenKind::Number(NumberValue::Int(v)) => Some(v.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(numbers, vec!["1", "2", "65195", "0"]);

    assert!(ks
        .iter()
        .any(|k| matches!(k, TokenKind::Identifier("x"))));
}

// ── scenario 6: numeric escape decoding ──────────────────────────────────────

#[test]
fn scenario_6_numeric_escapes_decode() {
    let source = "\"\\x4d\" \"\\u006b\" \"\\U0000006F\"";
    let out = tokenize(source);
    let strings: Vec<_> = out
        .tokens
        .iter()
        .filter_map(|e| match &e.value.kind {
            TokenKind::String(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(strings.len(), 3);
    assert_eq!(unescape(strings[0]).value, "M");
    assert_eq!(unescape(strings[1]).value, "k");
    assert_eq!(unescape(strings[2]).value, "o");
}

// ── scenario 7: lone close-brace in an f-string literal ──────────────────────

#[test]
fn scenario_7_fstring_lone_close_brace() {
    let out = tokenize("f'hello}'");
    let string_tokens: Vec<_> = out
        .tokens
        .iter()
        .filter_map(|e| match &e.value.kind {
            TokenKind::String(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(string_tokens.len(), 1);
    let s = string_tokens[0];
    assert!(s.flags.contains(StringFlags::SINGLE_QUOTE));
    assert!(s.flags.contains(StringFlags::FORMAT));

    let (segments, errors) = split_format_segments(s.escaped_value);
    assert_eq!(segments, vec![FormatSegment::Literal("hello")]);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        UnescapeErrorKind::SingleCloseBraceWithinFormatLiteral
    );
    assert_eq!(errors[0].offset, 5);
    assert_eq!(errors[0].length, 1);

    // The same segments/errors are reachable through `unescape()`, the
    // single computed result documented for a string token.
    let cooked = unescape(s);
    assert_eq!(cooked.format_segments, vec![FormatSegment::Literal("hello")]);
    assert_eq!(cooked.errors.len(), 1);
    assert_eq!(
        cooked.errors[0].kind,
        UnescapeErrorKind::SingleCloseBraceWithinFormatLiteral
    );
}

// ── scenario 8: brackets suppress indent/dedent ──────────────────────────────

#[test]
fn scenario_8_bracket_suppresses_indentation() {
    let ks = kinds("test (\n  i1\n       )\n  foo");
    let indent_count = ks
        .iter()
        .filter(|k| matches!(k, TokenKind::Indent { .. }))
        .count();
    assert_eq!(indent_count, 1, "no Indent/Dedent between the parens");
    assert!(matches!(ks.last().unwrap(), TokenKind::EndOfStream));
    assert!(matches!(
        ks[ks.len() - 2],
        TokenKind::Dedent { .. } | TokenKind::NewLine(_)
    ));
}

// ── scenario 9: realistic multi-construct module ─────────────────────────────

const REALISTIC_MODULE: &str = r#"import os
from functools import wraps


def trace(func):
    @wraps(func)
    def wrapper(*args, **kwargs):
        print(f"calling {func.__name__} with {len(args)} args")
        return func(*args, **kwargs)

    return wrapper


class Greeter:
    """Greets people, keeping a running count."""

    def __init__(self, name):
        self.name = name
        self.count = 0

    @trace
    def greet(self, target):
        self.count += 1
        try:
            message = f"hello {target} from {self.name}, greeting #{self.count}"
        except Exception as exc:
            message = f"error: {exc}"
        return message


def main():
    g = Greeter("bot")
    result = g.greet(
        "world",
    )
    print(result)
    print(os.getcwd())


if __name__ == "__main__":
    main()
"#;

#[test]
fn scenario_9_realistic_module_gross_shape() {
    let out = tokenize(REALISTIC_MODULE);
    let kinds: Vec<_> = out.tokens.iter().map(|e| &e.value.kind).collect();

    assert!(
        matches!(kinds.last().unwrap(), TokenKind::EndOfStream),
        "stream must end with EndOfStream"
    );
    assert!(
        out.tokens.count() > 150,
        "expected a substantial token count, got {}",
        out.tokens.count()
    );

    let invalid_count = kinds
        .iter()
        .filter(|k| matches!(k, TokenKind::Invalid))
        .count();
    assert_eq!(invalid_count, 0, "no Invalid tokens in well-formed source");

    let indent_count = kinds
        .iter()
        .filter(|k| matches!(k, TokenKind::Indent { .. }))
        .count();
    let dedent_count = kinds
        .iter()
        .filter(|k| matches!(k, TokenKind::Dedent { .. }))
        .count();
    assert_eq!(indent_count, dedent_count, "Indent/Dedent must balance");

    assert!(kinds
        .iter()
        .any(|k| matches!(k, TokenKind::Keyword(KeywordType::Class))));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, TokenKind::Keyword(KeywordType::Def))));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, TokenKind::Keyword(KeywordType::Try))));
    assert!(kinds
        .iter()
        .any(|k| matches!(k, TokenKind::Keyword(KeywordType::Except))));
    assert!(kinds.iter().any(|k| matches!(
        k,
        TokenKind::Operator(OperatorType::MatrixMultiply)
    )));

    let format_strings = kinds
        .iter()
        .filter(|k| matches!(k, TokenKind::String(s) if s.flags.contains(StringFlags::FORMAT)))
        .count();
    assert!(format_strings >= 3, "expected multiple f-strings");
}

// ── byte-offset vs UTF-16: non-ASCII identifiers use byte offsets ───────────

#[test]
fn non_ascii_identifier_uses_byte_offsets() {
    let out = tokenize("café = 1\n");
    let first = out.tokens.get_item_at(0).unwrap();
    assert!(matches!(first.value.kind, TokenKind::Identifier("café")));
    // "café" is 5 bytes (the é is 2 bytes in UTF-8), not 4 UTF-16 code units.
    assert_eq!(first.length, 5);
}

// ── invariant: token ranges never overlap and are non-decreasing ───────────

#[test]
fn token_ranges_are_non_overlapping_and_ordered() {
    let out = tokenize(REALISTIC_MODULE);
    let mut prev_end = 0u32;
    for entry in out.tokens.iter() {
        assert!(entry.start >= prev_end, "token ranges must not overlap");
        prev_end = entry.end();
    }
}

// ── invariant: lines cover the whole source exactly ─────────────────────────

#[test]
fn lines_cover_entire_source() {
    let out = tokenize(REALISTIC_MODULE);
    assert_eq!(out.lines.length(), REALISTIC_MODULE.len() as u32);
}
