use std::path::PathBuf;

use anyhow::Result;
use atty::Stream as AtStream;
use clap::Parser;
use colored::Colorize;

mod cli;
mod config;
mod env;
mod logging;
mod report;

use cli::{Emit, Invocation};
use config::Config;

const DEFAULT_OUT_DIR: &str = "output";

#[derive(Parser)]
#[command(
    name = "genmachinec",
    about = "Compile TypeScript generator functions into serializable state machines"
)]
struct Cli {
    /// Path to the TypeScript source holding the generator functions
    src: PathBuf,

    /// Output directory for generated classes (defaults to `output` or GENMACHINE_OUT_DIR)
    #[arg(short, long)]
    out_dir: Option<String>,

    /// Print generated code to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// What to emit: ts (the classes) or ir (a debug dump of each generator)
    #[arg(long, value_enum, default_value_t = Emit::Ts)]
    emit: Emit,

    /// Suffix appended to each class name (also GENMACHINE_CLASS_SUFFIX)
    #[arg(long = "class-suffix")]
    class_suffix: Option<String>,

    /// Print debug logging (GENMACHINE_LOG takes precedence)
    #[arg(long = "verbose")]
    verbose: bool,

    /// Suppress progress output
    #[arg(long = "quiet")]
    quiet: bool,

    /// Force color output: auto, always, never
    #[arg(long = "color")]
    color: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // auto enables color when stderr is a TTY
    let enable_color = match cli.color.as_deref() {
        Some("always") => true,
        Some("never") => false,
        Some("auto") | None => atty::is(AtStream::Stderr),
        _ => atty::is(AtStream::Stderr),
    };
    colored::control::set_override(enable_color);

    let config = Config::load()?;
    let mut options = config.compile_options();
    if let Some(suffix) = cli.class_suffix {
        options.class_suffix = suffix;
    }
    let out_dir = cli
        .out_dir
        .or(config.out_dir)
        .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());

    let invocation = Invocation {
        src: cli.src,
        out_dir: PathBuf::from(out_dir),
        to_stdout: cli.stdout,
        emit: cli.emit,
        quiet: cli.quiet,
        options,
    };
    let summary = cli::run(&invocation)?;
    if summary.failed > 0 {
        if !invocation.quiet {
            eprintln!(
                "{}",
                format!(
                    "{} generator(s) failed, {} emitted",
                    summary.failed, summary.emitted
                )
                .red()
            );
        }
        std::process::exit(1);
    }
    Ok(())
}
