//! Command-line interface for snipe.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::Engine;
use crate::report;
use crate::rules::Severity;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Local real-time cross-file static analyzer for C and Python.
///
/// Snipe builds a repository-wide symbol graph and checks editor buffers
/// against it: type mismatches, static out-of-bounds indexing, signature
/// drift, undefined and shadowed symbols, format-string mismatches, struct
/// member access, dead imports, and unsafe C library functions.
#[derive(Parser)]
#[command(name = "snipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the loopback analysis server
    Serve(ServeArgs),
    /// Scan a repository and print its symbol table
    Scan(ScanArgs),
    /// Analyze one file against its repository
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Port to bind on 127.0.0.1
    #[arg(short, long, default_value_t = 7171)]
    pub port: u16,
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Repository root
    pub repo: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Repository root
    pub repo: PathBuf,

    /// File to analyze (read from disk)
    pub file: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

pub fn run_serve(args: &ServeArgs) -> anyhow::Result<i32> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::server::serve(args.port))?;
    Ok(EXIT_SUCCESS)
}

pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Ok(EXIT_ERROR);
    }

    let start = Instant::now();
    let spinner = if args.format == "pretty" {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
        pb.set_message(format!("scanning {}", args.repo.display()));
        Some(pb)
    } else {
        None
    };

    let engine = Engine::new();
    let count = engine.refresh(&args.repo)?;
    let symbols = engine.symbols(&args.repo)?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&symbols)?);
    } else {
        let files: std::collections::BTreeSet<&str> =
            symbols.iter().map(|s| s.file.as_str()).collect();
        println!(
            "{} {} symbols in {} files ({:.1?})",
            "✓".green().bold(),
            count,
            files.len(),
            start.elapsed()
        );
        for file in files {
            let in_file: Vec<&crate::analysis::Symbol> =
                symbols.iter().filter(|s| s.file == file).collect();
            println!("{}", file.bold());
            for sym in in_file {
                let ty = sym.declared_type.as_deref().unwrap_or("-");
                println!(
                    "  {:4} {:10} {} {}",
                    sym.line,
                    sym.kind.to_string().dimmed(),
                    sym.name,
                    format!("({})", ty).dimmed()
                );
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Ok(EXIT_ERROR);
    }

    let content = std::fs::read_to_string(&args.file)?;
    let file = args.file.to_string_lossy();

    let engine = Engine::new();
    let diagnostics = engine.analyze(&content, &file, &args.repo, &[])?;

    if args.format == "json" {
        report::write_json(&file, &diagnostics)?;
    } else {
        report::write_pretty(&file, &diagnostics);
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    Ok(if has_errors { EXIT_FINDINGS } else { EXIT_SUCCESS })
}
