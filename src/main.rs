//! `uix` — compile a UIX source file into a single web document.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use uixc::build::build;
use uixc::config::{load_config, Config};
use uixc::dsl::{Compilation, Compiler};
use uixc::Error;

#[derive(Debug, Parser)]
#[command(name = "uix", version)]
#[command(about = "Compile a UIX source file into a self-contained web page", long_about = None)]
struct Cli {
    /// UIX source file.
    source: PathBuf,
    /// Output path (default: dist/index.html).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Treat unknown keywords as errors.
    #[arg(long)]
    strict: bool,
    /// Config file (default: ./uix.yaml, then ~/.uix/config.yaml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// What to produce.
    #[arg(long, value_enum, default_value_t = Emit::Html)]
    emit: Emit,
    /// Print progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Html,
    Tokens,
    Ast,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref(), Path::new("."))?;
    apply_overrides(&mut config, &cli);
    if cli.verbose {
        eprintln!(
            "config: strict={} check_tables={} output={}",
            config.strict,
            config.check_tables,
            config.output.display()
        );
    }

    match cli.emit {
        Emit::Html => {
            let built = build(&cli.source, &config)?;
            if cli.verbose {
                report(&built.compilation);
            }
            println!("✔ UIX build complete → {}", built.output.display());
        }
        Emit::Tokens => {
            let source = std::fs::read_to_string(&cli.source)?;
            let tokens = Compiler::tokenize(&source)?;
            println!("{}", to_json(&tokens));
        }
        Emit::Ast => {
            let source = std::fs::read_to_string(&cli.source)?;
            let nodes = Compiler::parse_with(&source, config.strictness())?;
            println!("{}", to_json(&nodes));
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.strict {
        config.strict = true;
    }
    if let Some(out) = &cli.out {
        config.output = out.clone();
    }
}

/// Verbose summary of what the source contained.
fn report(compilation: &Compilation) {
    eprintln!("tokens: {}", compilation.tokens.len().saturating_sub(1));
    eprintln!("nodes: {}", compilation.nodes.len());
    let tables: Vec<&str> = compilation
        .artifact
        .bootstrap
        .tables
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    eprintln!("tables: {}", tables.join(", "));
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}
