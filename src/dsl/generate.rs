//! Code generator — walks the AST once and builds an [`Artifact`].
//!
//! Structure is produced directly by the walk. Tables go into a registry,
//! list templates and handlers are collected, and table references are
//! recorded. Once the walk is complete the references are validated against
//! the registry and one schema, one render function and one start-up render
//! call are synthesized per registered table.

use std::collections::HashSet;

use crate::config::Config;
use crate::output::script::{
    self, Behavior, Bootstrap, Effect, Handler, RenderFn, Slot, TableSchema, Template,
    UpdateValue, ID_COLUMN,
};
use crate::output::{style, Artifact, Direction, Element, Markup};

use super::ast::*;
use super::error::CompileError;

const DEFAULT_TITLE: &str = "UIX";

/// Words that cannot name a generated global function: reserved words, and
/// globals that a function declaration cannot replace.
const JS_RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
    "undefined", "NaN", "Infinity", "eval", "arguments", "globalThis", "window", "document",
    "location", "top",
];

/// Generate the artifact for a parsed program.
pub fn generate(nodes: &[Node], config: &Config) -> Result<Artifact, CompileError> {
    let mut gen = Generator::new(config);
    let mut markup = Vec::new();
    for node in nodes {
        markup.extend(gen.walk(node)?);
    }
    gen.finish(markup)
}

/// A `table` declaration as registered during the walk.
#[derive(Debug, Clone)]
struct TableDecl {
    name: String,
    fields: Vec<Field>,
    line: usize,
    col: usize,
}

/// Where a table or function name is declared or used.
#[derive(Debug, Clone)]
struct Site {
    name: String,
    line: usize,
    col: usize,
}

/// A list with a template, before field names are resolved.
#[derive(Debug, Clone)]
struct ListTemplate {
    table: String,
    slot: usize,
    items: Vec<Vec<Template>>,
}

/// Per-invocation generation state.
struct Generator<'a> {
    config: &'a Config,
    title: Option<String>,
    tables: Vec<TableDecl>,
    references: Vec<Site>,
    functions: Vec<Site>,
    lists: Vec<ListTemplate>,
    slot_count: usize,
    handlers: Vec<Handler>,
}

impl<'a> Generator<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            title: None,
            tables: Vec::new(),
            references: Vec::new(),
            functions: Vec::new(),
            lists: Vec::new(),
            slot_count: 0,
            handlers: Vec::new(),
        }
    }

    fn walk_all(&mut self, nodes: &[Node]) -> Result<Vec<Markup>, CompileError> {
        let mut out = Vec::new();
        for node in nodes {
            out.extend(self.walk(node)?);
        }
        Ok(out)
    }

    /// Structure produced by one node; declarations are collected on the side.
    fn walk(&mut self, node: &Node) -> Result<Vec<Markup>, CompileError> {
        match &node.kind {
            NodeKind::App { name } => {
                self.title = Some(name.clone());
                Ok(Vec::new())
            }
            NodeKind::Ui { body } => self.walk_all(body),
            NodeKind::Column { body } => self.container(Direction::Column, body),
            NodeKind::Row { body } => self.container(Direction::Row, body),
            NodeKind::Text { value } => Ok(vec![Element::new("p").text(value.clone()).into()]),
            NodeKind::Input { kind, id } => Ok(vec![Element::new("input")
                .attr("id", id.clone())
                .attr("type", kind.clone())
                .attr("placeholder", id.clone())
                .attr("aria-label", id.clone())
                .into()]),
            NodeKind::Button { label, handler } => {
                check_callable(handler, "handler name", node)?;
                Ok(vec![Element::new("button")
                    .attr("onclick", script::global_call(handler, ""))
                    .text(label.clone())
                    .into()])
            }
            NodeKind::List { table, body } => self.list(node, table, body),
            NodeKind::Item { .. } => Err(misplaced(node, "inside a list")),
            NodeKind::Db { body } => {
                for table in body {
                    self.walk(table)?;
                }
                Ok(Vec::new())
            }
            NodeKind::Table { name, fields } => {
                check_identifier(name, "table name", node)?;
                self.tables.push(TableDecl {
                    name: name.clone(),
                    fields: fields.clone(),
                    line: node.line,
                    col: node.col,
                });
                Ok(Vec::new())
            }
            NodeKind::Fn { name, body } => {
                self.handler(node, name, body)?;
                Ok(Vec::new())
            }
            NodeKind::Insert { .. }
            | NodeKind::Refresh { .. }
            | NodeKind::Delete { .. }
            | NodeKind::Update { .. }
            | NodeKind::Where { .. } => Err(misplaced(node, "inside a fn")),
            NodeKind::Raw { .. } => Ok(Vec::new()),
        }
    }

    fn container(&mut self, direction: Direction, body: &[Node]) -> Result<Vec<Markup>, CompileError> {
        let children = self.walk_all(body)?;
        Ok(vec![Element::new("div")
            .attr("class", direction.class())
            .children(children)
            .into()])
    }

    fn list(&mut self, node: &Node, table: &str, body: &[Node]) -> Result<Vec<Markup>, CompileError> {
        self.reference(table, node)?;
        let slot = self.slot_count;
        self.slot_count += 1;

        let mut items = Vec::new();
        for child in body {
            if let NodeKind::Item { body } = &child.kind {
                items.push(self.template(body)?);
            }
        }
        if !items.is_empty() {
            self.lists.push(ListTemplate {
                table: table.to_string(),
                slot,
                items,
            });
        }

        Ok(vec![Element::new("div")
            .attr("data-list", table)
            .attr("data-slot", slot.to_string())
            .into()])
    }

    /// Item body → per-row template. Text nodes keep their literal until
    /// [`resolve_fields`] maps it to a column.
    fn template(&mut self, body: &[Node]) -> Result<Vec<Template>, CompileError> {
        let mut out = Vec::new();
        for node in body {
            match &node.kind {
                NodeKind::Text { value } => out.push(Template::Field(value.clone())),
                NodeKind::Button { label, handler } => {
                    check_callable(handler, "handler name", node)?;
                    out.push(Template::Button {
                        label: label.clone(),
                        handler: handler.clone(),
                    });
                }
                NodeKind::Column { body } => out.push(Template::Container {
                    direction: Direction::Column,
                    children: self.template(body)?,
                }),
                NodeKind::Row { body } => out.push(Template::Container {
                    direction: Direction::Row,
                    children: self.template(body)?,
                }),
                NodeKind::Raw { .. } => {}
                other => {
                    return Err(CompileError::generation(
                        format!("'{}' is not supported inside an item", other.keyword()),
                        node.line,
                        node.col,
                    ));
                }
            }
        }
        Ok(out)
    }

    fn handler(&mut self, node: &Node, name: &str, body: &[Node]) -> Result<(), CompileError> {
        check_callable(name, "function name", node)?;
        if script::RUNTIME_NAMES.contains(&name) || name.starts_with("render_") {
            return Err(CompileError::generation(
                format!("function name '{name}' is reserved by the runtime"),
                node.line,
                node.col,
            ));
        }

        let mut effects = Vec::new();
        for stmt in body {
            let effect = match &stmt.kind {
                NodeKind::Insert { table, value } => Effect::Insert {
                    table: table.clone(),
                    input: value.clone(),
                },
                NodeKind::Refresh { table } => Effect::Render {
                    table: table.clone(),
                },
                NodeKind::Delete { table } => Effect::Delete {
                    table: table.clone(),
                },
                NodeKind::Update { table, value } => Effect::Update {
                    table: table.clone(),
                    value: match value {
                        Some(id) => UpdateValue::Input(id.clone()),
                        None => UpdateValue::Literal(self.config.update_placeholder.clone()),
                    },
                },
                // Conditions are accepted by the grammar but have no effect.
                NodeKind::Where { .. } | NodeKind::Raw { .. } => continue,
                _ => return Err(misplaced(stmt, "outside a fn")),
            };
            let table = match &effect {
                Effect::Insert { table, .. }
                | Effect::Render { table }
                | Effect::Delete { table }
                | Effect::Update { table, .. } => table.clone(),
            };
            self.reference(&table, stmt)?;
            effects.push(effect);
        }

        self.functions.push(Site {
            name: name.to_string(),
            line: node.line,
            col: node.col,
        });
        self.handlers.push(Handler {
            name: name.to_string(),
            effects,
        });
        Ok(())
    }

    fn reference(&mut self, table: &str, node: &Node) -> Result<(), CompileError> {
        check_identifier(table, "table name", node)?;
        self.references.push(Site {
            name: table.to_string(),
            line: node.line,
            col: node.col,
        });
        Ok(())
    }

    /// Validate, then synthesize the registry-driven parts of the artifact.
    fn finish(self, markup: Vec<Markup>) -> Result<Artifact, CompileError> {
        if self.config.check_tables {
            self.validate()?;
        }

        let schemas: Vec<TableSchema> = self
            .tables
            .iter()
            .map(|t| TableSchema::new(&t.name, t.fields.iter().map(|f| f.name.clone()).collect()))
            .collect();

        let render_fns = schemas
            .iter()
            .map(|schema| RenderFn {
                table: schema.clone(),
                slots: self
                    .lists
                    .iter()
                    .filter(|list| list.table == schema.name)
                    .map(|list| Slot {
                        index: list.slot,
                        items: list
                            .items
                            .iter()
                            .map(|item| resolve_fields(item, &schema.fields))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Artifact {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            style: style::stylesheet(&self.config.style),
            markup,
            bootstrap: Bootstrap {
                store: self.config.store.clone(),
                tables: schemas,
            },
            behavior: Behavior {
                render_fns,
                handlers: self.handlers,
            },
        })
    }

    fn validate(&self) -> Result<(), CompileError> {
        let mut declared = HashSet::new();
        for table in &self.tables {
            if !declared.insert(table.name.as_str()) {
                return Err(CompileError::generation(
                    format!("table '{}' is declared more than once", table.name),
                    table.line,
                    table.col,
                ));
            }
            let mut seen = HashSet::new();
            for field in &table.fields {
                if field.name == ID_COLUMN {
                    return Err(CompileError::generation(
                        format!("field '{ID_COLUMN}' of table '{}' is reserved", table.name),
                        field.line,
                        field.col,
                    ));
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(CompileError::generation(
                        format!(
                            "field '{}' of table '{}' is declared more than once",
                            field.name, table.name
                        ),
                        field.line,
                        field.col,
                    ));
                }
            }
        }

        let mut defined = HashSet::new();
        for function in &self.functions {
            if !defined.insert(function.name.as_str()) {
                return Err(CompileError::generation(
                    format!("fn '{}' is defined more than once", function.name),
                    function.line,
                    function.col,
                ));
            }
        }

        for reference in &self.references {
            if !declared.contains(reference.name.as_str()) {
                return Err(CompileError::generation(
                    format!("unknown table '{}'", reference.name),
                    reference.line,
                    reference.col,
                ));
            }
        }
        Ok(())
    }
}

/// Bind each text template to a column: its literal if that names a
/// declared field, otherwise the table's first field.
fn resolve_fields(item: &[Template], fields: &[String]) -> Vec<Template> {
    item.iter()
        .map(|node| match node {
            Template::Field(literal) => {
                let field = fields
                    .iter()
                    .find(|f| *f == literal)
                    .or_else(|| fields.first())
                    .cloned()
                    .unwrap_or_else(|| script::DEFAULT_FIELD.to_string());
                Template::Field(field)
            }
            Template::Button { .. } => node.clone(),
            Template::Container {
                direction,
                children,
            } => Template::Container {
                direction: *direction,
                children: resolve_fields(children, fields),
            },
        })
        .collect()
}

fn misplaced(node: &Node, place: &str) -> CompileError {
    CompileError::generation(
        format!("'{}' is only allowed {place}", node.kind.keyword()),
        node.line,
        node.col,
    )
}

/// Names that end up inside script identifiers must be plain identifiers.
fn check_identifier(name: &str, what: &str, node: &Node) -> Result<(), CompileError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid_start || !valid_rest {
        return Err(CompileError::generation(
            format!("{what} '{name}' is not a valid identifier"),
            node.line,
            node.col,
        ));
    }
    Ok(())
}

/// Fn and handler names become global function declarations on their own.
fn check_callable(name: &str, what: &str, node: &Node) -> Result<(), CompileError> {
    check_identifier(name, what, node)?;
    if JS_RESERVED.contains(&name) {
        return Err(CompileError::generation(
            format!("{what} '{name}' is not a valid identifier"),
            node.line,
            node.col,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;
    use crate::dsl::Compiler;

    fn artifact(src: &str) -> Artifact {
        artifact_with(src, &Config::default()).unwrap()
    }

    fn artifact_with(src: &str, config: &Config) -> Result<Artifact, CompileError> {
        let nodes = Compiler::parse(src)?;
        generate(&nodes, config)
    }

    fn element(markup: &Markup) -> &Element {
        match markup {
            Markup::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn structure_for_layout_nodes() {
        let art = artifact(
            "ui { column { text \"hi\" row { input text newVal button \"Add\" addFn } } }",
        );
        assert_eq!(art.markup.len(), 1);
        let col = element(&art.markup[0]);
        assert_eq!(col.get_attr("class"), Some("col"));
        assert_eq!(col.children[0], Markup::from(Element::new("p").text("hi")));
        let row = element(&col.children[1]);
        assert_eq!(row.get_attr("class"), Some("row"));
        let input = element(&row.children[0]);
        assert_eq!(input.get_attr("id"), Some("newVal"));
        assert_eq!(input.get_attr("type"), Some("text"));
        let button = element(&row.children[1]);
        assert_eq!(button.get_attr("onclick"), Some("window.addFn()"));
        assert_eq!(button.children, vec![Markup::Text("Add".to_string())]);
    }

    #[test]
    fn app_sets_title() {
        assert_eq!(artifact("app \"Todo\"").title, "Todo");
        assert_eq!(artifact("").title, "UIX");
    }

    #[test]
    fn tables_and_db_emit_no_structure() {
        let art = artifact("db { table todos { } } table notes { title }");
        assert!(art.markup.is_empty());
        let names: Vec<&str> = art.bootstrap.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["todos", "notes"]);
        assert_eq!(art.bootstrap.tables[1].fields, vec!["title".to_string()]);
    }

    #[test]
    fn list_emits_placeholder_and_template() {
        let art = artifact(
            "db { table todos { } } ui { list todos { item { text \"x\" button \"Del\" delFn } } }",
        );
        let placeholder = element(&art.markup[0]);
        assert_eq!(placeholder.get_attr("data-list"), Some("todos"));
        assert_eq!(placeholder.get_attr("data-slot"), Some("0"));
        assert!(placeholder.children.is_empty());

        let render = &art.behavior.render_fns[0];
        assert_eq!(render.table.name, "todos");
        assert_eq!(
            render.slots,
            vec![Slot {
                index: 0,
                items: vec![vec![
                    Template::Field("text".to_string()),
                    Template::Button {
                        label: "Del".to_string(),
                        handler: "delFn".to_string()
                    },
                ]],
            }]
        );
    }

    #[test]
    fn text_binds_to_named_field_or_first_field() {
        let art = artifact(
            "table notes { title body } list notes { item { text body text \"x\" row { text title } } }",
        );
        let items = &art.behavior.render_fns[0].slots[0].items;
        assert_eq!(
            items[0],
            vec![
                Template::Field("body".to_string()),
                Template::Field("title".to_string()),
                Template::Container {
                    direction: Direction::Row,
                    children: vec![Template::Field("title".to_string())],
                },
            ]
        );
    }

    #[test]
    fn list_without_body_has_no_slot_in_render_fn() {
        let art = artifact("table todos { } list todos");
        assert_eq!(art.markup.len(), 1);
        assert!(art.behavior.render_fns[0].slots.is_empty());
    }

    #[test]
    fn every_table_gets_a_render_fn_in_registry_order() {
        let art = artifact("table b { } table a { } list a { item { text x } } list a { item { text y } }");
        let tables: Vec<&str> = art
            .behavior
            .render_fns
            .iter()
            .map(|r| r.table.name.as_str())
            .collect();
        assert_eq!(tables, vec!["b", "a"]);
        let slots: Vec<usize> = art.behavior.render_fns[1].slots.iter().map(|s| s.index).collect();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn handler_effects_follow_statements() {
        let art = artifact(
            "table todos { } fn f { insert todos newVal where x refresh todos delete todos update todos update todos from editVal }",
        );
        let handler = &art.behavior.handlers[0];
        assert_eq!(handler.name, "f");
        assert_eq!(
            handler.effects,
            vec![
                Effect::Insert {
                    table: "todos".to_string(),
                    input: "newVal".to_string()
                },
                Effect::Render {
                    table: "todos".to_string()
                },
                Effect::Delete {
                    table: "todos".to_string()
                },
                Effect::Update {
                    table: "todos".to_string(),
                    value: UpdateValue::Literal("new text".to_string())
                },
                Effect::Update {
                    table: "todos".to_string(),
                    value: UpdateValue::Input("editVal".to_string())
                },
            ]
        );
    }

    #[test]
    fn update_placeholder_comes_from_config() {
        let config = Config {
            update_placeholder: "edited".to_string(),
            ..Config::default()
        };
        let art = artifact_with("table t { } fn f { update t }", &config).unwrap();
        assert_eq!(
            art.behavior.handlers[0].effects[0],
            Effect::Update {
                table: "t".to_string(),
                value: UpdateValue::Literal("edited".to_string())
            }
        );
    }

    #[test]
    fn unknown_table_reference_is_rejected() {
        let err = artifact_with("table todos { }\nui {\n  list todo\n}", &Config::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::GenerationError);
        assert_eq!(err.message, "unknown table 'todo'");
        assert_eq!((err.line, err.col), (3, 3));

        let err = artifact_with("fn f { refresh nope }", &Config::default()).unwrap_err();
        assert_eq!(err.message, "unknown table 'nope'");
    }

    #[test]
    fn table_declared_later_is_still_known() {
        assert!(artifact_with("ui { list todos } db { table todos { } }", &Config::default()).is_ok());
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let err = artifact_with("table t { } table t { }", &Config::default()).unwrap_err();
        assert_eq!(err.message, "table 't' is declared more than once");
        assert_eq!(err.col, 13);
    }

    #[test]
    fn reserved_and_duplicate_fields_are_rejected() {
        let err = artifact_with("table t { id }", &Config::default()).unwrap_err();
        assert!(err.message.contains("reserved"), "{}", err.message);
        let err = artifact_with("table t { a a }", &Config::default()).unwrap_err();
        assert!(err.message.contains("more than once"), "{}", err.message);
    }

    #[test]
    fn unchecked_mode_keeps_dangling_references() {
        let config = Config {
            check_tables: false,
            ..Config::default()
        };
        let art = artifact_with("table t { } table t { } list ghost { item { text x } }", &config)
            .unwrap();
        assert_eq!(art.bootstrap.tables.len(), 2);
        assert_eq!(art.behavior.render_fns.len(), 2);
        assert!(art.behavior.render_fns.iter().all(|r| r.slots.is_empty()));
    }

    #[test]
    fn names_must_be_identifiers() {
        let err = artifact_with("ui { button \"x\" alert(1) }", &Config::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::GenerationError);
        assert!(err.message.contains("handler name 'alert(1)'"), "{}", err.message);

        let err = artifact_with("table my-table { }", &Config::default()).unwrap_err();
        assert!(err.message.contains("table name"), "{}", err.message);

        let err = artifact_with("fn class { }", &Config::default()).unwrap_err();
        assert!(err.message.contains("not a valid identifier"), "{}", err.message);
    }

    #[test]
    fn runtime_names_are_reserved() {
        let err = artifact_with("fn insert { }", &Config::default()).unwrap_err();
        assert!(err.message.contains("reserved by the runtime"), "{}", err.message);
        let err = artifact_with("fn render_todos { }", &Config::default()).unwrap_err();
        assert!(err.message.contains("reserved by the runtime"), "{}", err.message);
    }

    #[test]
    fn static_button_calls_global_handler() {
        // `open` would otherwise resolve to document.open in an inline handler
        let art = artifact("fn open { } ui { button \"Go\" open }");
        let button = element(&art.markup[0]);
        assert_eq!(button.get_attr("onclick"), Some("window.open()"));
    }

    #[test]
    fn handlers_named_like_render_locals_are_accepted() {
        let art = artifact("table t { } list t { item { button \"A\" row button \"B\" el } } fn row { } fn el { }");
        let names: Vec<&str> = art.behavior.handlers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["row", "el"]);
        let js = art.behavior.render();
        assert!(js.contains(r#"onclick=()=>window.row(row["id"]);"#), "{js}");
        assert!(js.contains(r#"onclick=()=>window.el(row["id"]);"#), "{js}");
    }

    #[test]
    fn table_names_may_be_script_keywords() {
        let art = artifact("table new { } table for { } list new { item { text x } } fn f { refresh for }");
        let names: Vec<&str> = art.bootstrap.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["new", "for"]);
        assert_eq!(art.behavior.render_fns[0].table.render_fn_name(), "render_new");
    }

    #[test]
    fn fn_names_may_not_shadow_fixed_globals() {
        for name in ["undefined", "NaN", "Infinity", "eval", "arguments", "location"] {
            let err = artifact_with(&format!("fn {name} {{ }}"), &Config::default()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::GenerationError);
            assert!(err.message.contains("not a valid identifier"), "{}", err.message);
        }
        let err = artifact_with("ui { button \"x\" undefined }", &Config::default()).unwrap_err();
        assert!(err.message.contains("handler name 'undefined'"), "{}", err.message);
    }

    #[test]
    fn duplicate_fn_is_rejected() {
        let err = artifact_with("fn f { }\nfn f { }", &Config::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::GenerationError);
        assert_eq!(err.message, "fn 'f' is defined more than once");
        assert_eq!((err.line, err.col), (2, 1));

        let config = Config {
            check_tables: false,
            ..Config::default()
        };
        let art = artifact_with("fn f { }\nfn f { }", &config).unwrap();
        assert_eq!(art.behavior.handlers.len(), 2);
    }

    #[test]
    fn unsupported_node_inside_item() {
        let err = artifact_with("table t { } list t { item { input text x } }", &Config::default())
            .unwrap_err();
        assert_eq!(err.message, "'input' is not supported inside an item");
    }

    #[test]
    fn raw_nodes_are_ignored() {
        let art = artifact("ui { txet text \"a\" }");
        // "txet" is raw; "text" then consumes "a"
        assert_eq!(art.markup, vec![Markup::from(Element::new("p").text("a"))]);
    }
}
