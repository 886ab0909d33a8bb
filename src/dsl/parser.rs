//! Parser for the UIX language.
//!
//! Recursive descent with a single token of lookahead and no backtracking.
//! Each keyword consumes a fixed shape of following tokens; blocks repeat
//! until their closing brace. Running out of input or meeting a brace where
//! a value belongs is a [`CompileError`] of kind `ParseError`.

use super::ast::*;
use super::error::CompileError;
use super::token::{Token, TokenKind};

/// How the parser treats a leading token that is not a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Unknown words become [`NodeKind::Raw`] and parsing continues.
    #[default]
    Permissive,
    /// Unknown words are a parse error.
    Strict,
}

/// What a block may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Top level, `ui`, `column`, `row` and `item` bodies.
    General,
    List,
    Db,
    Fn,
}

impl Context {
    fn accepts(self, kind: &NodeKind) -> bool {
        if matches!(kind, NodeKind::Raw { .. }) {
            return true;
        }
        match self {
            Context::General => !kind.is_statement() && !matches!(kind, NodeKind::Item { .. }),
            Context::List => matches!(kind, NodeKind::Item { .. }),
            Context::Db => matches!(kind, NodeKind::Table { .. }),
            Context::Fn => kind.is_statement(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Context::General => "a renderable or declaration",
            Context::List => "'item'",
            Context::Db => "'table'",
            Context::Fn => "a statement (insert, refresh, delete, update, where)",
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    strictness: Strictness,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let (line, col) = tokens.last().map(|t| (t.line, t.col + 1)).unwrap_or((1, 1));
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                col,
            });
        }
        Self {
            tokens,
            pos: 0,
            strictness: Strictness::default(),
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Parse the whole token sequence into top-level nodes.
    pub fn parse(&mut self) -> Result<Vec<Node>, CompileError> {
        let mut nodes = Vec::new();
        while !self.is_at_end() {
            nodes.push(self.node_in(Context::General, "program")?);
        }
        Ok(nodes)
    }

    fn node_in(&mut self, context: Context, owner: &str) -> Result<Node, CompileError> {
        let node = self.node()?;
        if !context.accepts(&node.kind) {
            return Err(CompileError::parse(
                format!(
                    "expected {} inside {owner}, found '{}'",
                    context.expected(),
                    node.kind.keyword()
                ),
                node.line,
                node.col,
            )
            .expecting(context.expected()));
        }
        Ok(node)
    }

    fn node(&mut self) -> Result<Node, CompileError> {
        let t = self.peek().clone();
        let word = match &t.kind {
            TokenKind::Word(w) => w.clone(),
            TokenKind::Str(_) => {
                self.advance();
                return self.fallback(&t);
            }
            other => {
                return Err(CompileError::parse(
                    format!("expected a keyword, found {}", other.describe()),
                    t.line,
                    t.col,
                )
                .expecting("a keyword"));
            }
        };
        self.advance();

        let kind = match word.as_str() {
            "app" => NodeKind::App {
                name: self.expect_value("application name")?,
            },
            "ui" => NodeKind::Ui {
                body: self.block(Context::General, "ui")?,
            },
            "column" => NodeKind::Column {
                body: self.block(Context::General, "column")?,
            },
            "row" => NodeKind::Row {
                body: self.block(Context::General, "row")?,
            },
            "text" => NodeKind::Text {
                value: self.expect_value("text value")?,
            },
            "input" => {
                let kind = self.expect_name("input kind")?;
                let id = self.expect_name("input id")?;
                NodeKind::Input { kind, id }
            }
            "button" => {
                let label = self.expect_value("button label")?;
                let handler = self.expect_name("handler name")?;
                NodeKind::Button { label, handler }
            }
            "list" => {
                let table = self.expect_name("table name")?;
                let body = if self.check(&TokenKind::LBrace) {
                    self.block(Context::List, "list")?
                } else {
                    Vec::new()
                };
                NodeKind::List { table, body }
            }
            "item" => NodeKind::Item {
                body: self.block(Context::General, "item")?,
            },
            "db" => NodeKind::Db {
                body: self.block(Context::Db, "db")?,
            },
            "table" => {
                let name = self.expect_name("table name")?;
                let fields = self.fields_block()?;
                NodeKind::Table { name, fields }
            }
            "fn" => {
                let name = self.expect_name("function name")?;
                let body = self.block(Context::Fn, "fn")?;
                NodeKind::Fn { name, body }
            }
            "insert" => {
                let table = self.expect_name("table name")?;
                let value = self.expect_name("value source id")?;
                NodeKind::Insert { table, value }
            }
            "refresh" => NodeKind::Refresh {
                table: self.expect_name("table name")?,
            },
            "delete" => NodeKind::Delete {
                table: self.expect_name("table name")?,
            },
            "update" => {
                let table = self.expect_name("table name")?;
                let value = if self.check_word("from") {
                    self.advance();
                    Some(self.expect_name("value source id")?)
                } else {
                    None
                };
                NodeKind::Update { table, value }
            }
            "where" => NodeKind::Where {
                condition: self.expect_value("condition")?,
            },
            _ => return self.fallback(&t),
        };

        Ok(Node {
            kind,
            line: t.line,
            col: t.col,
        })
    }

    /// An unknown leading token. In permissive mode it becomes a `Raw` node,
    /// swallowing a brace group that directly follows it (`colum { ... }`).
    fn fallback(&mut self, t: &Token) -> Result<Node, CompileError> {
        let token = match &t.kind {
            TokenKind::Str(s) => format!("\"{s}\""),
            TokenKind::Word(w) => w.clone(),
            other => other.describe(),
        };
        if self.strictness == Strictness::Strict {
            return Err(CompileError::parse(
                format!("expected a keyword, found unknown '{token}'"),
                t.line,
                t.col,
            )
            .expecting("a keyword"));
        }
        if self.check(&TokenKind::LBrace) {
            self.skip_group(&token)?;
        }
        Ok(Node {
            kind: NodeKind::Raw { token },
            line: t.line,
            col: t.col,
        })
    }

    /// `{ node* }`
    fn block(&mut self, context: Context, owner: &str) -> Result<Vec<Node>, CompileError> {
        self.expect_open(owner)?;
        let mut body = Vec::new();
        loop {
            if self.check(&TokenKind::RBrace) {
                self.advance();
                return Ok(body);
            }
            if self.is_at_end() {
                return Err(self.unclosed(owner));
            }
            body.push(self.node_in(context, owner)?);
        }
    }

    /// Skip a balanced `{ ... }` without interpreting it.
    fn skip_group(&mut self, owner: &str) -> Result<(), CompileError> {
        self.expect_open(owner)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => return Err(self.unclosed(&format!("'{owner}'"))),
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    /// `{ name* }`
    fn fields_block(&mut self) -> Result<Vec<Field>, CompileError> {
        self.expect_open("table")?;
        let mut fields = Vec::new();
        loop {
            let t = self.peek().clone();
            match &t.kind {
                TokenKind::RBrace => {
                    self.advance();
                    return Ok(fields);
                }
                TokenKind::Eof => return Err(self.unclosed("table")),
                TokenKind::Word(name) => {
                    fields.push(Field {
                        name: name.clone(),
                        line: t.line,
                        col: t.col,
                    });
                    self.advance();
                }
                other => {
                    return Err(CompileError::parse(
                        format!("expected field name, found {}", other.describe()),
                        t.line,
                        t.col,
                    )
                    .expecting("field name"));
                }
            }
        }
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Word(w) if w == word)
    }

    fn unclosed(&self, owner: &str) -> CompileError {
        let t = self.peek();
        CompileError::parse(
            format!("expected '}}' to close {owner}, found {}", t.kind.describe()),
            t.line,
            t.col,
        )
        .expecting("'}'")
    }

    fn expect_open(&mut self, owner: &str) -> Result<(), CompileError> {
        if self.check(&TokenKind::LBrace) {
            self.advance();
            return Ok(());
        }
        let t = self.peek();
        Err(CompileError::parse(
            format!("expected '{{' after {owner}, found {}", t.kind.describe()),
            t.line,
            t.col,
        )
        .expecting("'{'"))
    }

    /// A bare word: table, field, control and handler names.
    fn expect_name(&mut self, construct: &str) -> Result<String, CompileError> {
        let t = self.peek();
        match &t.kind {
            TokenKind::Word(s) => {
                let val = s.clone();
                self.advance();
                Ok(val)
            }
            other => Err(CompileError::parse(
                format!("expected {construct}, found {}", other.describe()),
                t.line,
                t.col,
            )
            .expecting(construct)),
        }
    }

    /// A quoted literal or a bare word.
    fn expect_value(&mut self, construct: &str) -> Result<String, CompileError> {
        let t = self.peek();
        match &t.kind {
            TokenKind::Str(s) | TokenKind::Word(s) => {
                let val = s.clone();
                self.advance();
                Ok(val)
            }
            other => Err(CompileError::parse(
                format!("expected {construct}, found {}", other.describe()),
                t.line,
                t.col,
            )
            .expecting(construct)),
        }
    }
}
