//! # stackerr CLI
//!
//! Inspect error records pulled out of logs, message payloads or database
//! columns.
//!
//! Usage:
//!   stackerr inspect [FILE] [--trace] [--json]
//!   stackerr status <CODE>
//!   stackerr codes
//!
//! Examples:
//!   stackerr inspect failed_job.json
//!   psql -Atc "select error from jobs where id = 7" | stackerr inspect --trace
//!   stackerr status not_found

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use stackerr::{http_status, Code, Error};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "stackerr")]
#[command(author, version, about = "stackerr - inspect structured error records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one JSON error record and report on it
    Inspect {
        /// File holding the record (stdin when omitted)
        file: Option<PathBuf>,

        /// Print the verbose block with captured frames
        #[arg(long)]
        trace: bool,

        /// Re-emit the normalized record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the HTTP status for a code
    Status {
        /// Code string, e.g. not_found
        code: String,
    },
    /// List every code with its HTTP status
    Codes,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Read and decode a record from `path`, or stdin.
fn read_record(path: Option<&Path>) -> anyhow::Result<Error> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    debug!(bytes = raw.len(), "decoding error record");

    Error::from_json(raw.trim()).context("decoding error record")
}

/// Human-readable report for one record.
fn render_report(err: &Error, trace: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", err));
    out.push_str(&format!(
        "  code:      {}\n",
        err.code().map(|code| code.as_str()).unwrap_or("(unset)")
    ));
    out.push_str(&format!("  effective: {}\n", err.effective_code()));
    out.push_str(&format!("  status:    {}\n", err.http_status()));
    out.push_str(&format!("  message:   {}\n", err.effective_message()));
    out.push_str(&format!("  internal:  {}\n", err.is_internal()));
    if !err.file_line().is_empty() {
        out.push_str(&format!("  origin:    {}\n", err.file_line()));
    }

    if trace {
        out.push_str("\n--- Trace ---\n");
        out.push_str(&err.to_string_with_trace());
    } else if !err.frames().is_empty() {
        out.push_str("\n--- Frames ---\n");
        for line in err.frames().lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out
}

/// Status line for a code string. Unknown strings are reported as unset.
fn status_line(code: &str) -> String {
    match code.parse::<Code>() {
        Ok(code) => format!("{} {}", code, code.http_status()),
        Err(e) => {
            debug!(error = %e, "treating code as unset");
            format!("{} (unset) {}", code, http_status(None))
        }
    }
}

fn codes_table() -> String {
    Code::ALL
        .iter()
        .map(|code| format!("{:<18} {}\n", code.as_str(), code.http_status().as_u16()))
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect { file, trace, json } => {
            let err = read_record(file.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&err)?);
            } else {
                print!("{}", render_report(&err, trace));
            }
        }
        Commands::Status { code } => println!("{}", status_line(&code)),
        Commands::Codes => print!("{}", codes_table()),
    }

    Ok(())
}
