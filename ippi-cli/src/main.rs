//! ippi: IPPcode19 interpreter.
//!
//! Exit codes:
//! - 0: Success (or the program's own EXIT code, 0-49)
//! - 10: Missing or invalid arguments
//! - 11: Input file cannot be opened
//! - 31: Missing header or malformed XML
//! - 32: Bad instruction or unexpected XML structure
//! - 52-58: Runtime errors

mod commands;

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::process;

/// Exit code for bad command-line arguments.
pub const EXIT_BAD_ARGUMENTS: i32 = 10;

#[derive(Parser, Debug)]
#[command(name = "ippi", version)]
#[command(about = "Interpret an IPPcode19 program.")]
#[command(group(ArgGroup::new("files").required(true).multiple(true).args(["source", "input"])))]
pub struct Cli {
    /// Program source, as text or XML. Read from stdin when omitted.
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Lines for READ. Read from stdin when omitted.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_BAD_ARGUMENTS } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let log_level = std::env::var("IPPI_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let code = match commands::interpret(&cli) {
        Ok(code) | Err(code) => code,
    };
    process::exit(code);
}
