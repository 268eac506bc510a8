//! The compile command: read one source file, emit one file per generator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use genmachine::codegen::dump_ir;
use genmachine::parser::{find_generators, parse_source};
use genmachine::{CompileError, CompileOptions};

use crate::report;

/// What to print for each generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Emit {
    /// The state-machine class as TypeScript
    Ts,
    /// A readable dump of the intermediate representation
    Ir,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Invocation {
    pub src: PathBuf,
    pub out_dir: PathBuf,
    pub to_stdout: bool,
    pub emit: Emit,
    pub quiet: bool,
    pub options: CompileOptions,
}

/// Outcome of a run; any failure means a non-zero exit
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub emitted: usize,
    pub failed: usize,
}

pub fn run(invocation: &Invocation) -> Result<Summary> {
    let source = std::fs::read_to_string(&invocation.src)
        .with_context(|| format!("failed to read {}", invocation.src.display()))?;
    let file = invocation.src.display().to_string();
    match invocation.emit {
        Emit::Ts => compile_file(invocation, &file, &source),
        Emit::Ir => dump_file(&file, &source),
    }
}

fn compile_file(invocation: &Invocation, file: &str, source: &str) -> Result<Summary> {
    let units = match genmachine::compile_with_options(source, &invocation.options) {
        Ok(units) => units,
        Err(error) => {
            report_file_error(file, source, &error);
            return Ok(Summary {
                emitted: 0,
                failed: 1,
            });
        }
    };
    if units.is_empty() {
        warn_no_generators(file);
        return Ok(Summary::default());
    }

    let mut summary = Summary::default();
    for unit in units {
        let unit = match unit {
            Ok(unit) => unit,
            Err(failure) => {
                report::report_error(file, source, failure.error.offset(), &failure.to_string());
                summary.failed += 1;
                continue;
            }
        };
        for warning in &unit.warnings {
            report::report_warning(file, source, &unit.name, warning);
        }
        if invocation.to_stdout {
            print!("{}", unit.source);
        } else {
            let path = write_unit(&invocation.out_dir, &unit.name, &unit.source)?;
            if !invocation.quiet {
                eprintln!(
                    "{} {} -> {}",
                    "Compiled".green().bold(),
                    unit.class_name,
                    path.display()
                );
            }
        }
        summary.emitted += 1;
    }
    tracing::debug!(emitted = summary.emitted, failed = summary.failed, "file compiled");
    Ok(summary)
}

fn dump_file(file: &str, source: &str) -> Result<Summary> {
    let parsed = match parse_source(source) {
        Ok(parsed) => parsed,
        Err(error) => {
            report_file_error(file, source, &CompileError::from(error));
            return Ok(Summary {
                emitted: 0,
                failed: 1,
            });
        }
    };
    let decls = find_generators(&parsed);
    if decls.is_empty() {
        warn_no_generators(file);
        return Ok(Summary::default());
    }

    let mut summary = Summary::default();
    for (position, decl) in decls.into_iter().enumerate() {
        let name = match &decl {
            Ok(decl) => decl.name.clone(),
            Err(_) => format!("<anonymous #{}>", position),
        };
        let dumped = decl
            .map_err(CompileError::from)
            .and_then(|decl| genmachine::parse_ir(&decl))
            .and_then(|ir| dump_ir(&ir).map_err(CompileError::from));
        match dumped {
            Ok(text) => {
                print!("{}", text);
                summary.emitted += 1;
            }
            Err(error) => {
                let message = format!("generator '{}': {}", name, error);
                report::report_error(file, source, error.offset(), &message);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn report_file_error(file: &str, source: &str, error: &CompileError) {
    report::report_error(file, source, error.offset(), &error.to_string());
}

fn warn_no_generators(file: &str) {
    eprintln!(
        "{}: no generator functions found in {}",
        "warning".yellow().bold(),
        file
    );
}

/// Write `<out_dir>/<name>.ts`, creating the directory when missing
fn write_unit(out_dir: &Path, name: &str, source: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.ts", name));
    std::fs::write(&path, source).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "unit written");
    Ok(path)
}
