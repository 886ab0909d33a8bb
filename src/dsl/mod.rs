//! UIX compiler — source text → tokens → AST → web document.

pub mod ast;
pub mod error;
pub mod generate;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use error::{CompileError, ErrorKind};
pub use parser::Strictness;

use crate::config::Config;
use crate::output::Artifact;
use generate::generate;
use lexer::Lexer;
use parser::Parser;
use token::Token;

/// Every stage of one compile, for callers that report on the pipeline.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub nodes: Vec<Node>,
    pub artifact: Artifact,
}

/// The UIX compiler.
///
/// Each call is an independent, single synchronous pass; no state is kept
/// between calls, so independent sources can be compiled concurrently.
pub struct Compiler;

impl Compiler {
    /// Scan source into tokens (ending with `Eof`).
    pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
        Lexer::new(source).tokenize()
    }

    /// Parse source permissively: unknown words become raw nodes.
    pub fn parse(source: &str) -> Result<Vec<Node>, CompileError> {
        Self::parse_with(source, Strictness::Permissive)
    }

    pub fn parse_with(source: &str, strictness: Strictness) -> Result<Vec<Node>, CompileError> {
        let tokens = Self::tokenize(source)?;
        Parser::new(tokens).with_strictness(strictness).parse()
    }

    /// Compile source with the default configuration into document text.
    pub fn compile(source: &str) -> Result<String, CompileError> {
        Ok(Self::compile_with(source, &Config::default())?.render())
    }

    /// Compile source into the typed artifact.
    pub fn compile_with(source: &str, config: &Config) -> Result<Artifact, CompileError> {
        let nodes = Self::parse_with(source, config.strictness())?;
        generate(&nodes, config)
    }

    /// Compile source once, keeping the tokens and nodes alongside the artifact.
    pub fn compile_full(source: &str, config: &Config) -> Result<Compilation, CompileError> {
        let tokens = Self::tokenize(source)?;
        let nodes = Parser::new(tokens.clone())
            .with_strictness(config.strictness())
            .parse()?;
        let artifact = generate(&nodes, config)?;
        Ok(Compilation {
            tokens,
            nodes,
            artifact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_full_matches_compile_with() {
        let src = "table t { } ui { list t { item { text x } } }";
        let config = Config::default();
        let full = Compiler::compile_full(src, &config).unwrap();
        assert_eq!(full.tokens, Compiler::tokenize(src).unwrap());
        assert_eq!(full.nodes.len(), 2);
        assert_eq!(
            full.artifact.render(),
            Compiler::compile_with(src, &config).unwrap().render()
        );
    }
}
