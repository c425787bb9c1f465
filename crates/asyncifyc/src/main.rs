//! The asyncify command line.
//!
//! `asyncifyc <FILE>` rewrites a shell script so that every deferred call
//! it consumes is awaited, and prints the result to stdout.
//!
//! Options:
//! - `--registry` - Load the shape catalogue from a JSON or TOML file
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `--dump-symbols` - Print the final symbol table to stderr
//! - `-v` - Raise the log level (`-v` debug, `-vv` trace)

mod logger;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;

use asyncify_rewrite::{compile_with_symbols, Registry, RewriteError};
use asyncify_typeck::diagnostics::{render_diagnostic, render_json, DiagnosticOptions};

#[derive(Parser)]
#[command(name = "asyncifyc", version, about = "Await the deferred calls of a shell script")]
struct Cli {
    /// Script to rewrite, or `-` for stdin
    file: PathBuf,

    /// Shape catalogue (.json or .toml) replacing the bundled one
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Output diagnostics as JSON (one object per line) instead of human-readable format
    #[arg(long)]
    json: bool,

    /// Disable colorized output
    #[arg(long = "no-color")]
    no_color: bool,

    /// Print the final symbol table to stderr
    #[arg(long = "dump-symbols")]
    dump_symbols: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Why a run failed.
enum Failure {
    /// The script did not compile.
    Rewrite {
        err: RewriteError,
        source: String,
        filename: String,
    },
    Other(anyhow::Error),
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Other(err)
    }
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let diag_opts = DiagnosticOptions {
        color: !cli.no_color && !cli.json,
        json: cli.json,
    };

    match run(&cli) {
        Ok(()) => {}
        Err(Failure::Rewrite {
            err,
            source,
            filename,
        }) => {
            if diag_opts.json {
                eprintln!("{}", render_json(&err, &source, &filename));
            } else {
                eprint!("{}", render_diagnostic(&err, &source, &filename, &diag_opts));
            }
            process::exit(1);
        }
        Err(Failure::Other(e)) => {
            if diag_opts.json {
                let msg = serde_json::json!({
                    "code": "C0001",
                    "severity": "error",
                    "message": format!("{e:#}"),
                    "file": display_name(&cli.file),
                    "spans": [],
                });
                eprintln!("{msg}");
            } else {
                eprintln!("error: {e:#}");
            }
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    let registry = match &cli.registry {
        Some(path) => Registry::from_file(path)
            .with_context(|| format!("failed to load registry '{}'", path.display()))?,
        None => Registry::builtin(),
    };
    let source = read_source(&cli.file)?;
    let filename = display_name(&cli.file);
    tracing::debug!(file = %filename, bytes = source.len(), "compiling");

    match compile_with_symbols(&source, &registry) {
        Ok(compiled) => {
            if cli.dump_symbols {
                eprint!("{}", compiled.symbols);
            }
            print!("{}", compiled.output);
            Ok(())
        }
        Err(err) => Err(Failure::Rewrite {
            err,
            source,
            filename,
        }),
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))
    }
}

fn display_name(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
