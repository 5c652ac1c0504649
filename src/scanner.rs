//! Main scanner state machine (§4, §4.3).
//!
//! A single byte cursor, an indentation stack, a bracket-depth counter, and a
//! character-dispatch loop, emitting the richer [`Token`]/[`TokenKind`]
//! vocabulary and tracking comments so they attach to the token that follows
//! them instead of being dropped.

use crate::classifier;
use crate::keywords;
use crate::numeric;
use crate::string_scan;
use crate::token::{
    CommentRange, KeywordType, NewLineKind, OperatorType, Token, TokenKind, TokenRange,
};

pub struct Scanner<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
    indent_stack: Vec<usize>,
    /// Queued Dedent events for a multi-level dedent: each entry is
    /// `(indent_amount, matches_indent)`, one per popped level beyond the
    /// first (which is returned immediately). Drained front-to-back.
    pending_dedents: Vec<(usize, bool)>,
    at_line_start: bool,
    bracket_depth: i32,
    pending_comments: Vec<CommentRange>,
    /// Tracks whether the most recently emitted token was a NewLine, so a
    /// zero-length Implied NewLine can be synthesized before EndOfStream
    /// when the source doesn't end with one of its own.
    last_was_newline: bool,
    /// Set once the Implied NewLine (if any) has been emitted, so the
    /// following call produces EndOfStream instead of looping forever.
    pending_implied_newline: bool,
    /// True once an EndOfStream token has been returned — the caller should
    /// stop calling `next_token` after this.
    done: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            indent_stack: vec![0],
            pending_dedents: Vec::new(),
            at_line_start: true,
            bracket_depth: 0,
            pending_comments: Vec::new(),
            last_was_newline: false,
            pending_implied_newline: false,
            done: false,
        }
    }

    fn take_comments(&mut self) -> Vec<CommentRange> {
        std::mem::take(&mut self.pending_comments)
    }

    fn make(&mut self, start: usize, length: usize, kind: TokenKind<'src>) -> Token<'src> {
        self.last_was_newline = matches!(kind, TokenKind::NewLine(_));
        let comments = self.take_comments();
        Token::new(TokenRange::new(start as u32, length as u32), comments, kind)
    }

    pub fn next_token(&mut self) -> Token<'src> {
        if !self.pending_dedents.is_empty() {
            let (indent_amount, matches_indent) = self.pending_dedents.remove(0);
            return self.make(
                self.pos,
                0,
                TokenKind::Dedent {
                    indent_amount,
                    matches_indent,
                },
            );
        }

        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                self.at_line_start = false;
                if let Some(tok) = self.handle_indent() {
                    return tok;
                }
            }

            if self.pos >= self.bytes.len() {
                if self.indent_stack.len() > 1 {
                    let dedents = self.dedent_to(0);
                    let (indent_amount, matches_indent) = dedents[0];
                    if dedents.len() > 1 {
                        self.pending_dedents = dedents[1..].to_vec();
                    }
                    return self.make(
                        self.pos,
                        0,
                        TokenKind::Dedent {
                            indent_amount,
                            matches_indent,
                        },
                    );
                }
                if !self.last_was_newline && !self.pending_implied_newline {
                    self.pending_implied_newline = true;
                    return self.make(self.pos, 0, TokenKind::NewLine(NewLineKind::Implied));
                }
                self.done = true;
                return self.make(self.pos, 0, TokenKind::EndOfStream);
            }

            let start = self.pos;
            let b = self.bytes[self.pos];

            if b == b' ' || b == b'\t' || b == 0x0C {
                self.pos += 1;
                continue;
            }

            if b == b'\n' {
                self.pos += 1;
                if self.bracket_depth > 0 {
                    continue;
                }
                self.at_line_start = true;
                return self.make(start, self.pos - start, TokenKind::NewLine(NewLineKind::Lf));
            }

            if b == b'\r' {
                let crlf = self.bytes.get(self.pos + 1) == Some(&b'\n');
                self.pos += if crlf { 2 } else { 1 };
                if self.bracket_depth > 0 {
                    continue;
                }
                self.at_line_start = true;
                let kind = if crlf { NewLineKind::CrLf } else { NewLineKind::Cr };
                return self.make(start, self.pos - start, TokenKind::NewLine(kind));
            }

            if b == b'\\' {
                if self.bytes.get(self.pos + 1) == Some(&b'\n') {
                    self.pos += 2;
                    continue;
                }
                if self.bytes.get(self.pos + 1) == Some(&b'\r') {
                    self.pos += if self.bytes.get(self.pos + 2) == Some(&b'\n') { 3 } else { 2 };
                    continue;
                }
                // Not followed by any line terminator: a stray backslash,
                // which the grammar has no other use for.
                self.pos += 1;
                return self.make(start, 1, TokenKind::Invalid);
            }

            if b == b'#' {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                self.pending_comments.push(CommentRange {
                    start: start as u32,
                    length: (self.pos - start) as u32,
                });
                continue;
            }

            if string_scan::is_string_start(self.bytes, self.pos) {
                let result = string_scan::scan(self.src, self.pos);
                self.pos += result.length;
                return self.make(start, result.length, TokenKind::String(result.token));
            }

            if classifier::is_decimal_digit(b as char)
                || (b == b'.'
                    && self
                        .bytes
                        .get(self.pos + 1)
                        .is_some_and(|&c| classifier::is_decimal_digit(c as char)))
            {
                let result = numeric::scan(self.bytes, self.pos);
                self.pos += result.length;
                return self.make(start, result.length, TokenKind::Number(result.value));
            }

            if classifier::is_identifier_start(self.char_at(self.pos)) {
                return self.lex_name(start);
            }

            return self.lex_operator_or_punctuation(start, b);
        }
    }

    /// Decode the `char` starting at byte offset `pos` (may be multi-byte).
    fn char_at(&self, pos: usize) -> char {
        self.src[pos..].chars().next().unwrap_or('\0')
    }

    /// Scans the leading whitespace of the current line and decides whether
    /// it opens an indented block, closes one, or is unchanged.
    ///
    /// A blank line, a comment-only line, or EOF reached while scanning
    /// leading whitespace is not "content" for indentation purposes: this
    /// returns `None` having consumed only the whitespace, leaving the
    /// terminator (or `#`, or end of input) at `self.pos` for the normal
    /// per-character dispatch to tokenize — so a blank line's own NewLine is
    /// still emitted, just never triggers an Indent/Dedent decision.
    fn handle_indent(&mut self) -> Option<Token<'src>> {
        let mut col = 0usize;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b' ' => {
                    col += 1;
                    self.pos += 1;
                }
                b'\t' => {
                    col = (col / 8 + 1) * 8;
                    self.pos += 1;
                }
                0x0C => {
                    self.pos += 1;
                }
                _ => break,
            }
        }

        if self.pos >= self.bytes.len() {
            return None;
        }
        match self.bytes[self.pos] {
            b'\n' | b'\r' | b'#' => return None,
            _ => {}
        }

        let top = *self.indent_stack.last().unwrap_or(&0);
        if col > top {
            self.indent_stack.push(col);
            Some(self.make(
                self.pos,
                0,
                TokenKind::Indent {
                    indent_amount: col,
                    is_indent_ambiguous: false,
                },
            ))
        } else if col < top {
            let dedents = self.dedent_to(col);
            let (indent_amount, matches_indent) = dedents[0];
            if dedents.len() > 1 {
                self.pending_dedents = dedents[1..].to_vec();
            }
            Some(self.make(
                self.pos,
                0,
                TokenKind::Dedent {
                    indent_amount,
                    matches_indent,
                },
            ))
        } else {
            None
        }
    }

    /// Pops `indent_stack` down to (at most) `col`, one level at a time, and
    /// returns one `(indent_amount, matches_indent)` pair per popped level —
    /// the Dedent tokens that must be emitted for this transition, in order.
    ///
    /// All but the last pair land exactly on a level that was genuinely
    /// pushed earlier (`matches_indent = true`). The last pair reports the
    /// observed `col` itself; `matches_indent` is true only if some stack
    /// level happened to equal it exactly — a false value means the source's
    /// indentation is ambiguous (dedented to a column with no enclosing
    /// block at that depth).
    fn dedent_to(&mut self, col: usize) -> Vec<(usize, bool)> {
        let mut out = Vec::new();
        loop {
            self.indent_stack.pop();
            let new_top = *self.indent_stack.last().unwrap_or(&0);
            if new_top > col {
                out.push((new_top, true));
            } else {
                out.push((col, new_top == col));
                break;
            }
        }
        out
    }

    fn lex_name(&mut self, start: usize) -> Token<'src> {
        self.pos += self.char_at(self.pos).len_utf8();
        while self.pos < self.bytes.len() && classifier::is_identifier_continue(self.char_at(self.pos)) {
            self.pos += self.char_at(self.pos).len_utf8();
        }
        let s = &self.src[start..self.pos];
        let kind = match keywords::lookup(s) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(s),
        };
        self.make(start, self.pos - start, kind)
    }

    fn lex_operator_or_punctuation(&mut self, start: usize, b: u8) -> Token<'src> {
        self.pos += 1;
        let kind = match b {
            b'(' => {
                self.bracket_depth += 1;
                TokenKind::OpenParenthesis
            }
            b')' => {
                self.bracket_depth = (self.bracket_depth - 1).max(0);
                TokenKind::CloseParenthesis
            }
            b'[' => {
                self.bracket_depth += 1;
                TokenKind::OpenBracket
            }
            b']' => {
                self.bracket_depth = (self.bracket_depth - 1).max(0);
                TokenKind::CloseBracket
            }
            b'{' => {
                self.bracket_depth += 1;
                TokenKind::OpenCurlyBrace
            }
            b'}' => {
                self.bracket_depth = (self.bracket_depth - 1).max(0);
                TokenKind::CloseCurlyBrace
            }
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'~' => TokenKind::Operator(OperatorType::BitwiseInvert),
            b'@' => self.maybe_assign(OperatorType::MatrixMultiply, OperatorType::MatrixMultiplyAssign),
            b'=' => {
                if self.bytes.get(self.pos) == Some(&b'=') {
                    self.pos += 1;
                    TokenKind::Operator(OperatorType::Equal)
                } else {
                    TokenKind::Operator(OperatorType::Assign)
                }
            }
            b'!' => {
                if self.bytes.get(self.pos) == Some(&b'=') {
                    self.pos += 1;
                    TokenKind::Operator(OperatorType::NotEqual)
                } else {
                    TokenKind::Invalid
                }
            }
            b':' => {
                if self.bytes.get(self.pos) == Some(&b'=') {
                    self.pos += 1;
                    TokenKind::Operator(OperatorType::Walrus)
                } else {
                    TokenKind::Colon
                }
            }
            b'.' => {
                if self.bytes.get(self.pos) == Some(&b'.') && self.bytes.get(self.pos + 1) == Some(&b'.') {
                    self.pos += 2;
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            b'*' => {
                if self.bytes.get(self.pos) == Some(&b'*') {
                    self.pos += 1;
                    self.maybe_assign(OperatorType::Power, OperatorType::PowerAssign)
                } else {
                    self.maybe_assign(OperatorType::Multiply, OperatorType::MultiplyAssign)
                }
            }
            b'+' => self.maybe_assign(OperatorType::Add, OperatorType::AddAssign),
            b'%' => self.maybe_assign(OperatorType::Mod, OperatorType::ModAssign),
            b'^' => self.maybe_assign(OperatorType::BitwiseXor, OperatorType::BitwiseXorAssign),
            b'&' => self.maybe_assign(OperatorType::BitwiseAnd, OperatorType::BitwiseAndAssign),
            b'|' => self.maybe_assign(OperatorType::BitwiseOr, OperatorType::BitwiseOrAssign),
            b'-' => {
                if self.bytes.get(self.pos) == Some(&b'>') {
                    self.pos += 1;
                    TokenKind::Arrow
                } else {
                    self.maybe_assign(OperatorType::Subtract, OperatorType::SubtractAssign)
                }
            }
            b'/' => {
                if self.bytes.get(self.pos) == Some(&b'/') {
                    self.pos += 1;
                    self.maybe_assign(OperatorType::FloorDivide, OperatorType::FloorDivideAssign)
                } else {
                    self.maybe_assign(OperatorType::Divide, OperatorType::DivideAssign)
                }
            }
            b'<' => {
                if self.bytes.get(self.pos) == Some(&b'<') {
                    self.pos += 1;
                    self.maybe_assign(OperatorType::LeftShift, OperatorType::LeftShiftAssign)
                } else if self.bytes.get(self.pos) == Some(&b'=') {
                    self.pos += 1;
                    TokenKind::Operator(OperatorType::LessEqual)
                } else {
                    TokenKind::Operator(OperatorType::Less)
                }
            }
            b'>' => {
                if self.bytes.get(self.pos) == Some(&b'>') {
                    self.pos += 1;
                    self.maybe_assign(OperatorType::RightShift, OperatorType::RightShiftAssign)
                } else if self.bytes.get(self.pos) == Some(&b'=') {
                    self.pos += 1;
                    TokenKind::Operator(OperatorType::GreaterEqual)
                } else {
                    TokenKind::Operator(OperatorType::Greater)
                }
            }
            _ => TokenKind::Invalid,
        };
        self.make(start, self.pos - start, kind)
    }

    fn maybe_assign(&mut self, plain: OperatorType, assign: OperatorType) -> TokenKind<'src> {
        if self.bytes.get(self.pos) == Some(&b'=') {
            self.pos += 1;
            TokenKind::Operator(assign)
        } else {
            TokenKind::Operator(plain)
        }
    }

    pub fn bracket_depth(&self) -> i32 {
        self.bracket_depth
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
