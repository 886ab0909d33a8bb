//! Behavior and runtime-bridge representation, and the script serializer.
//!
//! Every string taken from source reaches the script through [`js_string`]
//! (a JSON literal with `<` escaped) or, for names, only after the generator
//! has checked it is a plain identifier.

use crate::config::StoreConfig;

use super::Direction;

/// Name of the surrogate key column every table carries.
pub const ID_COLUMN: &str = "id";
/// Field used when a table declares none.
pub const DEFAULT_FIELD: &str = "text";

/// Globals defined by the bootstrap block. User functions may not reuse them.
pub const RUNTIME_NAMES: &[&str] = &[
    "DB",
    "FIELDS",
    "initDB",
    "initSqlJs",
    "requireDB",
    "quoteIdent",
    "queryRows",
    "insert",
    "deleteById",
    "updateById",
];

/// A registered table's storage shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    /// Data columns in declaration order, never empty.
    pub fields: Vec<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, declared: Vec<String>) -> Self {
        let fields = if declared.is_empty() {
            vec![DEFAULT_FIELD.to_string()]
        } else {
            declared
        };
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn create_sql(&self) -> String {
        let mut columns = vec![format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            quote_ident(ID_COLUMN)
        )];
        columns.extend(self.fields.iter().map(|f| format!("{} TEXT", quote_ident(f))));
        format!(
            "CREATE TABLE IF NOT EXISTS {}({})",
            quote_ident(&self.name),
            columns.join(", ")
        )
    }

    pub fn select_sql(&self) -> String {
        let mut columns = vec![quote_ident(ID_COLUMN)];
        columns.extend(self.fields.iter().map(|f| quote_ident(f)));
        format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            quote_ident(&self.name)
        )
    }

    pub fn render_fn_name(&self) -> String {
        render_fn_name(&self.name)
    }
}

pub fn render_fn_name(table: &str) -> String {
    format!("render_{table}")
}

/// One node of an item template, instantiated once per row.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Shows the named column of the row.
    Field(String),
    /// Calls `handler(row.id)` when activated.
    Button { label: String, handler: String },
    Container {
        direction: Direction,
        children: Vec<Template>,
    },
}

/// A list placeholder and the item templates expanded into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub items: Vec<Vec<Template>>,
}

/// Repopulates every placeholder bound to one table.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFn {
    pub table: TableSchema,
    pub slots: Vec<Slot>,
}

/// The value an `update` statement writes.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateValue {
    Literal(String),
    Input(String),
}

/// One statement of a handler, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Insert { table: String, input: String },
    Render { table: String },
    Delete { table: String },
    Update { table: String, value: UpdateValue },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    pub name: String,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Behavior {
    pub render_fns: Vec<RenderFn>,
    pub handlers: Vec<Handler>,
}

/// Store initialization, bridge operations and the start-up sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Bootstrap {
    pub store: StoreConfig,
    /// Registry order.
    pub tables: Vec<TableSchema>,
}

/// Encode a string as a script literal that cannot close a `<script>`.
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned())
        .to_string()
        .replace('<', "\\u003c")
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Accumulates script lines and hands out unique local names.
#[derive(Default)]
struct ScriptWriter {
    out: String,
    next_var: usize,
}

impl ScriptWriter {
    fn line(&mut self, line: impl AsRef<str>) {
        self.out.push_str(line.as_ref());
        self.out.push('\n');
    }

    fn fresh(&mut self) -> String {
        let name = format!("n{}", self.next_var);
        self.next_var += 1;
        name
    }

    fn finish(self) -> String {
        self.out
    }
}

impl Bootstrap {
    /// The inline bootstrap script body (without the surrounding tags).
    pub fn render(&self) -> String {
        let mut w = ScriptWriter::default();
        w.line("let DB=null;");

        let fields: Vec<String> = self
            .tables
            .iter()
            .map(|t| {
                let cols: Vec<String> = t.fields.iter().map(|f| js_string(f)).collect();
                format!("{}:[{}]", js_string(&t.name), cols.join(","))
            })
            .collect();
        w.line(format!("const FIELDS={{{}}};", fields.join(",")));

        w.line("async function initDB(){");
        w.line(format!(
            "const SQL=await initSqlJs({{locateFile:f=>{}+f}});",
            js_string(&self.store.wasm_base)
        ));
        w.line("DB=new SQL.Database();");
        for table in &self.tables {
            w.line(format!("DB.run({});", js_string(&table.create_sql())));
        }
        w.line("}");

        w.line("function requireDB(){if(!DB)throw new Error(\"store not initialized\");return DB;}");
        w.line("function quoteIdent(name){return \"\\\"\"+String(name).replace(/\"/g,\"\\\"\\\"\")+\"\\\"\";}");
        w.line("function queryRows(sql){const res=requireDB().exec(sql);if(!res.length)return [];const cols=res[0].columns;return res[0].values.map(v=>{const row={};cols.forEach((c,i)=>{row[c]=v[i];});return row;});}");
        w.line("function insert(table,value){requireDB().run(\"INSERT INTO \"+quoteIdent(table)+\"(\"+quoteIdent(FIELDS[table][0])+\") VALUES(?)\",[value]);}");
        w.line("function deleteById(table,id){requireDB().run(\"DELETE FROM \"+quoteIdent(table)+\" WHERE \\\"id\\\"=?\",[id]);}");
        w.line("function updateById(table,id,value){requireDB().run(\"UPDATE \"+quoteIdent(table)+\" SET \"+quoteIdent(FIELDS[table][0])+\"=? WHERE \\\"id\\\"=?\",[value,id]);}");

        let calls: String = self
            .tables
            .iter()
            .map(|t| format!("{}();", t.render_fn_name()))
            .collect();
        w.line(format!(
            "window.addEventListener(\"DOMContentLoaded\",async()=>{{await initDB();{calls}}});"
        ));
        w.finish()
    }
}

impl Behavior {
    /// The behavior script body (without the surrounding tags).
    pub fn render(&self) -> String {
        let mut w = ScriptWriter::default();
        for render_fn in &self.render_fns {
            write_render_fn(&mut w, render_fn);
        }
        for handler in &self.handlers {
            write_handler(&mut w, handler);
        }
        w.finish()
    }
}

/// Call a user function through the global object, so neither render-fn
/// locals nor the element and document scopes of inline handlers shadow it.
pub fn global_call(handler: &str, args: &str) -> String {
    format!("window.{handler}({args})")
}

fn slot_selector(table: &str, index: usize) -> String {
    format!("[data-list=\"{table}\"][data-slot=\"{index}\"]")
}

fn write_render_fn(w: &mut ScriptWriter, render_fn: &RenderFn) {
    let table = &render_fn.table;
    w.line(format!("function {}(){{", table.render_fn_name()));
    if render_fn.slots.is_empty() {
        w.line("}");
        return;
    }

    let lookups: Vec<String> = render_fn
        .slots
        .iter()
        .map(|slot| {
            format!(
                "document.querySelector({})",
                js_string(&slot_selector(&table.name, slot.index))
            )
        })
        .collect();
    w.line(format!("const slots=[{}];", lookups.join(",")));
    w.line("slots.forEach(el=>{if(el)el.innerHTML=\"\";});");
    w.line(format!("const rows=queryRows({});", js_string(&table.select_sql())));
    w.line("if(!rows.length)return;");
    w.line("rows.forEach(row=>{");
    for (i, slot) in render_fn.slots.iter().enumerate() {
        w.line(format!("{{const el=slots[{i}];if(el){{"));
        for item in &slot.items {
            let item_var = w.fresh();
            w.line(format!(
                "const {item_var}=document.createElement(\"div\");{item_var}.className=\"item\";el.appendChild({item_var});"
            ));
            for node in item {
                write_template(w, node, &item_var);
            }
        }
        w.line("}}");
    }
    w.line("});");
    w.line("}");
}

fn write_template(w: &mut ScriptWriter, node: &Template, parent: &str) {
    let var = w.fresh();
    match node {
        Template::Field(field) => w.line(format!(
            "const {var}=document.createElement(\"div\");{var}.textContent=row[{}];{parent}.appendChild({var});",
            js_string(field)
        )),
        Template::Button { label, handler } => w.line(format!(
            "const {var}=document.createElement(\"button\");{var}.textContent={};{var}.onclick=()=>{};{parent}.appendChild({var});",
            js_string(label),
            global_call(handler, &format!("row[{}]", js_string(ID_COLUMN)))
        )),
        Template::Container {
            direction,
            children,
        } => {
            w.line(format!(
                "const {var}=document.createElement(\"div\");{var}.className={};{parent}.appendChild({var});",
                js_string(direction.class())
            ));
            for child in children {
                write_template(w, child, &var);
            }
        }
    }
}

fn input_value(id: &str) -> String {
    format!("document.getElementById({}).value", js_string(id))
}

fn write_handler(w: &mut ScriptWriter, handler: &Handler) {
    w.line(format!("function {}(arg){{", handler.name));
    for effect in &handler.effects {
        match effect {
            Effect::Insert { table, input } => w.line(format!(
                "insert({},{});",
                js_string(table),
                input_value(input)
            )),
            Effect::Render { table } => w.line(format!("{}();", render_fn_name(table))),
            Effect::Delete { table } => {
                w.line(format!("deleteById({},arg);", js_string(table)));
                w.line(format!("{}();", render_fn_name(table)));
            }
            Effect::Update { table, value } => {
                let value = match value {
                    UpdateValue::Literal(text) => js_string(text),
                    UpdateValue::Input(id) => input_value(id),
                };
                w.line(format!("updateById({},arg,{value});", js_string(table)));
                w.line(format!("{}();", render_fn_name(table)));
            }
        }
    }
    w.line("}");
}
