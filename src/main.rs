//! `docdts`: generate a TypeScript declaration file from YUIDoc data.
//!
//! # Enabling Debug Logging
//!
//! Set the `DOCDTS_LOG` environment variable (or pass `--debug`):
//!
//! ```bash
//! DOCDTS_LOG=debug docdts data.json -o ember.d.ts
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use docdts_core::{DocFile, GenerateConfig, Generated, generate};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_CONFIG: &str = "docdts.toml";

#[derive(Parser, Debug)]
#[command(
    name = "docdts",
    version,
    about = "Generate TypeScript declarations from YUIDoc documentation data"
)]
struct Cli {
    /// Documentation data file (`data.json`), or `-` to read stdin
    input: String,

    /// Output path for the declaration file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (default: ./docdts.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name used in the trailing `export default` statement
    #[arg(long, value_name = "NAME")]
    export_name: Option<String>,

    /// Write a markdown diagnostics report to this path
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Append warnings to the generated file as comments
    #[arg(long)]
    verbose: bool,

    /// Enable debug logging (or set DOCDTS_LOG=debug)
    #[arg(short, long)]
    debug: bool,

    /// Exit with an error status when any warning was recorded
    #[arg(long)]
    deny_warnings: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DOCDTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .with_level(true),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when `--deny-warnings` rejected the run.
fn run(cli: &Cli) -> Result<bool> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(name) = &cli.export_name {
        config.export_name = name.clone();
    }
    config.verbose |= cli.verbose;

    let src = read_input(&cli.input)?;
    let doc = DocFile::from_json(&src).with_context(|| format!("failed to parse {}", cli.input))?;
    tracing::debug!(
        classes = doc.classes.len(),
        items = doc.classitems.len(),
        "loaded documentation data"
    );

    let generated = generate(&doc, &config)?;

    match &cli.output {
        Some(path) => fs::write(path, &generated.code)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout()
            .write_all(generated.code.as_bytes())
            .context("failed to write to stdout")?,
    }

    if let Some(path) = &cli.report {
        let report = generated.diagnostics.generate_report("docdts report");
        fs::write(path, report).with_context(|| format!("failed to write {}", path.display()))?;
    }

    print_summary(&generated).context("failed to write to stderr")?;

    let warnings = warning_total(&generated);
    if cli.deny_warnings && warnings > 0 {
        eprintln!("error: {} warning(s) recorded and --deny-warnings is set", warnings);
        return Ok(false);
    }
    Ok(true)
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<GenerateConfig> {
    match path {
        Some(path) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            GenerateConfig::from_toml(&src)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        None => Ok(GenerateConfig::load_or_default(Path::new(DEFAULT_CONFIG))?),
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut src = String::new();
        io::stdin()
            .read_to_string(&mut src)
            .context("failed to read stdin")?;
        return Ok(src);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
}

fn warning_total(generated: &Generated) -> usize {
    generated.diagnostics.warning_count() + generated.warnings.len()
}

fn print_summary(generated: &Generated) -> io::Result<()> {
    let stats = generated.diagnostics.stats();
    let warnings = warning_total(generated);
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);

    let color = if warnings == 0 {
        Color::Green
    } else {
        Color::Yellow
    };
    stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stderr, "docdts")?;
    stderr.reset()?;
    writeln!(
        stderr,
        ": {} classes, {} members, {} namespaces, {} warning(s)",
        stats.classes, stats.members, stats.namespaces, warnings
    )?;
    Ok(())
}
