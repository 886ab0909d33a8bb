//! Lexer for the UIX language.
//!
//! Converts source text into a stream of [`Token`]s. Line comments (`//`)
//! are dropped, braces always stand alone, and everything else splits on
//! whitespace. Double-quoted literals are scanned as a single token so that
//! braces, comment markers and spaces inside them survive.

use super::error::CompileError;
use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    depth: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            depth: 0,
        }
    }

    /// Scan the whole input. The returned sequence always ends with
    /// [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line: self.line,
                    col: self.col,
                });
                break;
            }

            let token = match self.peek() {
                '{' => {
                    self.depth += 1;
                    self.single_char(TokenKind::LBrace)
                }
                '}' => {
                    if self.depth == 0 {
                        return Err(CompileError::lex(
                            "unmatched '}'",
                            self.line,
                            self.col,
                        ));
                    }
                    self.depth -= 1;
                    self.single_char(TokenKind::RBrace)
                }
                '"' => self.lex_string()?,
                _ => self.lex_word(),
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn at_comment(&self) -> bool {
        !self.is_at_end() && self.peek() == '/' && self.peek_next() == Some('/')
    }

    /// Skip whitespace and comments until the next significant character.
    fn skip_trivia(&mut self) {
        loop {
            while !self.is_at_end() && self.peek().is_whitespace() {
                self.advance();
            }
            if self.at_comment() {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance();
        Token { kind, line, col }
    }

    fn lex_word(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut word = String::new();
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_whitespace() || matches!(ch, '{' | '}' | '"') || self.at_comment() {
                break;
            }
            word.push(self.advance());
        }
        Token {
            kind: TokenKind::Word(word),
            line,
            col,
        }
    }

    fn lex_string(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening quote
        let mut s = String::new();
        loop {
            if self.is_at_end() || self.peek() == '\n' {
                return Err(CompileError::lex("unclosed string literal", line, col));
            }
            match self.advance() {
                '"' => break,
                '\\' if !self.is_at_end() && matches!(self.peek(), '"' | '\\') => {
                    s.push(self.advance());
                }
                ch => s.push(ch),
            }
        }
        Ok(Token {
            kind: TokenKind::Str(s),
            line,
            col,
        })
    }
}
