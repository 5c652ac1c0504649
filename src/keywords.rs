//! Keyword table: maps a recognized identifier string to its keyword
//! classification.
//!
//! Implemented as a `match` over `&str` — the set is small and fixed, so a
//! match compiles to efficient length-then-byte comparisons without the
//! overhead of building a runtime hash map.

use crate::token::KeywordType;

pub fn lookup(s: &str) -> Option<KeywordType> {
    Some(match s {
        "False" => KeywordType::False,
        "None" => KeywordType::None,
        "True" => KeywordType::True,
        "and" => KeywordType::And,
        "as" => KeywordType::As,
        "assert" => KeywordType::Assert,
        "async" => KeywordType::Async,
        "await" => KeywordType::Await,
        "break" => KeywordType::Break,
        "class" => KeywordType::Class,
        "continue" => KeywordType::Continue,
        "def" => KeywordType::Def,
        "del" => KeywordType::Del,
        "elif" => KeywordType::Elif,
        "else" => KeywordType::Else,
        "except" => KeywordType::Except,
        "finally" => KeywordType::Finally,
        "for" => KeywordType::For,
        "from" => KeywordType::From,
        "global" => KeywordType::Global,
        "if" => KeywordType::If,
        "import" => KeywordType::Import,
        "in" => KeywordType::In,
        "is" => KeywordType::Is,
        "lambda" => KeywordType::Lambda,
        "nonlocal" => KeywordType::Nonlocal,
        "not" => KeywordType::Not,
        "or" => KeywordType::Or,
        "pass" => KeywordType::Pass,
        "raise" => KeywordType::Raise,
        "return" => KeywordType::Return,
        "try" => KeywordType::Try,
        "while" => KeywordType::While,
        "with" => KeywordType::With,
        "yield" => KeywordType::Yield,
        "__debug__" => KeywordType::Debug,
        _ => return None,
    })
}
