//! File glue: read a source file, compile it, write the document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::dsl::{Compilation, Compiler};
use crate::error::Error;

/// A finished build: where the document went and what produced it.
#[derive(Debug)]
pub struct Build {
    pub output: PathBuf,
    pub compilation: Compilation,
}

/// Compile `input` and write the document to `config.output`, creating its
/// parent directories. Nothing is written if compilation fails.
pub fn build(input: &Path, config: &Config) -> Result<Build, Error> {
    let source = fs::read_to_string(input)?;
    let compilation = Compiler::compile_full(&source, config)?;
    let html = compilation.artifact.render();

    let output = config.output.clone();
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output, html)?;
    Ok(Build {
        output,
        compilation,
    })
}
