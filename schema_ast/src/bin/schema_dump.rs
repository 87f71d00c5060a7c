//! # schema_dump
//!
//! Generates the flattened schema tables for every root listed in an input file and prints
//! them as JSON.
//!
//! ```text
//! schema_dump <input.json> [config.json]
//! ```
//!
//! The input holds the reflection dump, the replication layouts and the roots to generate:
//! `{ "types": [...], "layouts": { "<class path>": [...] }, "roots": ["<class path>", ...] }`.
//! Set `SCHEMA_AST_LOG` to filter directives (`debug`, `schema_ast=trace`) to override the
//! configured log level.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use error_stack::{Report, ResultExt};
use schema_ast::reflection::{ReflectionRegistry, TypePath};
use schema_ast::replication::RepLayoutRegistry;
use schema_ast::support::init_tracing;
use schema_ast::{Error, Generator, GeneratorConfig, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

const USAGE: &str = "usage: schema_dump <input.json> [config.json]";

#[derive(Deserialize)]
struct DumpInput {
    types:   Value,
    #[serde(default)]
    layouts: Value,
    roots:   Vec<TypePath>,
}

struct Args {
    input:  PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args_os().skip(1);
    let input = PathBuf::from(args.next()?);
    let config = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return None;
    }
    Some(Args { input, config })
}

fn load_input(path: &Path) -> Result<DumpInput> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| Report::new(Error::io_failed("read", path, e)))?;
    serde_json::from_str(&contents).change_context(Error::invalid("input file", path.display()))
}

fn run(args: &Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };
    init_tracing(config.log_level);

    let input = load_input(&args.input)?;
    let reflection = ReflectionRegistry::from_json(input.types)?;
    let layouts = if input.layouts.is_null() {
        RepLayoutRegistry::new()
    } else {
        RepLayoutRegistry::from_json(input.layouts)?
    };
    info!(types = reflection.len(), roots = input.roots.len(), "Loaded input");

    let report = Generator::new(&reflection, &layouts, &config).generate_all(&input.roots);
    for (root, err) in &report.failed {
        warn!(root = %root, "Skipped in output: {}", err.current_context());
    }

    let output = serde_json::to_string_pretty(&report.summaries())
        .change_context(Error::invalid("output", "failed to serialize summaries"))?;
    println!("{output}");
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:?}");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        }
    }
}
