//! Wiring between the command line, the front-end and the engine.

use crate::Cli;
use ippi_vm::{BufLineReader, Io, LineReader, OutputWriter, StderrWriter, StdoutWriter};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Exit code for a source or input file that cannot be opened or read.
pub const EXIT_UNREADABLE_FILE: i32 = 11;

/// Load and run the program named on the command line. The source may be
/// IPPcode19 text or its XML representation.
///
/// `Ok` carries the program's exit code; `Err` carries the code of the
/// failure, after its message has been written to stderr.
pub fn interpret(cli: &Cli) -> Result<i32, i32> {
    let text = match &cli.source {
        Some(path) => fs::read_to_string(path).map_err(|e| unreadable(path, &e))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| unreadable(Path::new("<stdin>"), &e))?;
            text
        }
    };

    let mut input: Box<dyn LineReader> = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| unreadable(path, &e))?;
            Box::new(BufLineReader::new(BufReader::new(file)))
        }
        None => Box::new(BufLineReader::new(io::stdin().lock())),
    };

    let program = ippi_assembler::load(&text).map_err(|e| {
        eprintln!("error: {e}");
        e.exit_code()
    })?;
    info!(instructions = program.len(), "program loaded");

    let mut stdout = StdoutWriter;
    let mut stderr = StderrWriter;
    let result = ippi_vm::run(&program, Io::new(input.as_mut(), &mut stdout, &mut stderr));
    stdout.flush();

    match result {
        Ok(code) => {
            debug!(code, "program finished");
            Ok(code)
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(e.exit_code())
        }
    }
}

fn unreadable(path: &Path, err: &io::Error) -> i32 {
    eprintln!("error: cannot read '{}': {err}", path.display());
    EXIT_UNREADABLE_FILE
}
