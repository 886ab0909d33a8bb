//! Abstract Syntax Tree for the UIX language.
//!
//! A program is an ordered list of top-level [`Node`]s. Every node records
//! the position of the token that introduced it.

use serde::Serialize;

/// A parsed node and where it started in source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub col: usize,
}

/// Every construct the grammar produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    App { name: String },
    Ui { body: Vec<Node> },
    Column { body: Vec<Node> },
    Row { body: Vec<Node> },
    Text { value: String },
    Input { kind: String, id: String },
    Button { label: String, handler: String },
    List { table: String, body: Vec<Node> },
    Item { body: Vec<Node> },
    Db { body: Vec<Node> },
    Table { name: String, fields: Vec<Field> },
    Fn { name: String, body: Vec<Node> },
    Insert { table: String, value: String },
    Refresh { table: String },
    Delete { table: String },
    Update { table: String, value: Option<String> },
    Where { condition: String },
    Raw { token: String },
}

/// A declared column of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub line: usize,
    pub col: usize,
}

impl NodeKind {
    /// The keyword that introduces this node, for diagnostics.
    pub fn keyword(&self) -> &str {
        match self {
            NodeKind::App { .. } => "app",
            NodeKind::Ui { .. } => "ui",
            NodeKind::Column { .. } => "column",
            NodeKind::Row { .. } => "row",
            NodeKind::Text { .. } => "text",
            NodeKind::Input { .. } => "input",
            NodeKind::Button { .. } => "button",
            NodeKind::List { .. } => "list",
            NodeKind::Item { .. } => "item",
            NodeKind::Db { .. } => "db",
            NodeKind::Table { .. } => "table",
            NodeKind::Fn { .. } => "fn",
            NodeKind::Insert { .. } => "insert",
            NodeKind::Refresh { .. } => "refresh",
            NodeKind::Delete { .. } => "delete",
            NodeKind::Update { .. } => "update",
            NodeKind::Where { .. } => "where",
            NodeKind::Raw { token } => token,
        }
    }

    /// Statements may only appear inside a `fn` body.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Insert { .. }
                | NodeKind::Refresh { .. }
                | NodeKind::Delete { .. }
                | NodeKind::Update { .. }
                | NodeKind::Where { .. }
        )
    }
}
