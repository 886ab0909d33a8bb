//! Typed output representation and the artifact serializer.
//!
//! The generator builds an [`Artifact`]; nothing is turned into text until
//! [`Artifact::render`], which is also where every escape is applied.

pub mod markup;
pub mod script;
pub mod style;

pub use markup::{Element, Markup};
pub use script::{Behavior, Bootstrap};

/// Flex direction of a `column` / `row` container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Column,
    Row,
}

impl Direction {
    pub fn class(self) -> &'static str {
        match self {
            Direction::Column => "col",
            Direction::Row => "row",
        }
    }
}

/// One compiled document: presentation, structure, bootstrap, behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub title: String,
    pub style: Vec<style::Rule>,
    pub markup: Vec<Markup>,
    pub bootstrap: Bootstrap,
    pub behavior: Behavior,
}

impl Artifact {
    pub fn render(&self) -> String {
        let mut out = String::from("<!doctype html><html><head><meta charset=\"utf-8\">");
        out.push_str(&markup::render(&[Markup::from(
            Element::new("title").text(self.title.clone()),
        )]));
        out.push_str("<style>\n");
        out.push_str(&style::render(&self.style));
        out.push_str("</style></head><body>");
        out.push_str(&markup::render(&self.markup));
        out.push('\n');
        out.push_str(&markup::render(&[Markup::from(
            Element::new("script").attr("src", self.bootstrap.store.script_url.clone()),
        )]));
        out.push_str("\n<script>\n");
        out.push_str(&self.bootstrap.render());
        out.push_str("</script>\n<script>\n");
        out.push_str(&self.behavior.render());
        out.push_str("</script></body></html>\n");
        out
    }
}
