//! Token types for the UIX lexer.

use serde::Serialize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
///
/// Keywords are not distinguished here: the parser dispatches on the text of
/// a [`TokenKind::Word`], so a keyword may still be used as a table or field
/// name where a name is expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    /// A bare whitespace-delimited lexeme.
    Word(String),
    /// A double-quoted literal, quotes removed.
    Str(String),
    LBrace,
    RBrace,
    Eof,
}

impl TokenKind {
    /// The lexeme as it would read in source, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Word(w) => format!("'{w}'"),
            TokenKind::Str(s) => format!("\"{s}\""),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}
