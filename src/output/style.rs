//! Presentation block.

use crate::config::StyleConfig;

/// One CSS rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: &'static str,
    pub declarations: Vec<(&'static str, String)>,
}

impl Rule {
    fn new(selector: &'static str) -> Self {
        Self {
            selector,
            declarations: Vec::new(),
        }
    }

    fn decl(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.declarations.push((property, value.into()));
        self
    }
}

/// The fixed stylesheet, parameterized by config.
pub fn stylesheet(style: &StyleConfig) -> Vec<Rule> {
    let gap = format!("{}px", style.gap_px);
    vec![
        Rule::new("body")
            .decl("font-family", style.font_family.clone())
            .decl("padding", format!("{}px", style.padding_px)),
        Rule::new(".col")
            .decl("display", "flex")
            .decl("flex-direction", "column")
            .decl("gap", gap.clone()),
        Rule::new(".row")
            .decl("display", "flex")
            .decl("flex-direction", "row")
            .decl("gap", gap.clone()),
        Rule::new(".item")
            .decl("display", "flex")
            .decl("align-items", "center")
            .decl("gap", gap),
        Rule::new("button").decl("padding", "6px 12px"),
    ]
}

pub fn render(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(rule.selector);
        out.push('{');
        let decls: Vec<String> = rule
            .declarations
            .iter()
            .map(|(prop, value)| format!("{prop}:{}", sanitize_value(value)))
            .collect();
        out.push_str(&decls.join(";"));
        out.push_str("}\n");
    }
    out
}

/// Drop characters that could end a declaration, a rule or the style element.
fn sanitize_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | ';' | '<' | '>'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stylesheet() {
        let css = render(&stylesheet(&StyleConfig::default()));
        assert!(css.starts_with("body{font-family:sans-serif;padding:20px}\n"));
        assert!(css.contains(".col{display:flex;flex-direction:column;gap:10px}"));
        assert!(css.contains(".row{display:flex;flex-direction:row;gap:10px}"));
    }

    #[test]
    fn config_values_cannot_escape_the_rule() {
        let style = StyleConfig {
            font_family: "x}</style><script>".to_string(),
            ..StyleConfig::default()
        };
        let css = render(&stylesheet(&style));
        assert!(css.starts_with("body{font-family:x/stylescript;padding:20px}"));
    }
}
