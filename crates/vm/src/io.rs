//! Input and output collaborators used by READ, WRITE, DPRINT and BREAK.

use std::io::{BufRead, Write};

/// Source of input lines for `READ`.
pub trait LineReader {
    /// Returns the next line without its terminator, or `None` once the
    /// input is exhausted. Blocks until a whole line is available.
    fn read_line(&mut self) -> Option<String>;
}

/// Sink for program output or diagnostics.
///
/// Writers add nothing of their own: no separators and no trailing
/// newline beyond what the caller passes in.
pub trait OutputWriter {
    fn write_text(&mut self, text: &str);

    /// Push buffered output to its destination.
    fn flush(&mut self) {}
}

/// Reads lines from any buffered reader: stdin, a file, or a byte slice.
#[derive(Debug)]
pub struct BufLineReader<R> {
    reader: R,
}

impl<R: BufRead> BufLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineReader for BufLineReader<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

/// A reader that is always at end of input.
#[derive(Debug, Default)]
pub struct NoInput;

impl LineReader for NoInput {
    fn read_line(&mut self) -> Option<String> {
        None
    }
}

/// Writes to standard output. Write errors, such as a closed pipe, are
/// dropped.
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_text(&mut self, text: &str) {
        let _ = std::io::stdout().lock().write_all(text.as_bytes());
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

/// Writes to standard error. Write errors are dropped.
#[derive(Debug, Default)]
pub struct StderrWriter;

impl OutputWriter for StderrWriter {
    fn write_text(&mut self, text: &str) {
        let _ = std::io::stderr().lock().write_all(text.as_bytes());
    }
}

/// Collects all output into a string.
///
/// Useful for testing or capturing output programmatically.
#[derive(Debug, Default)]
pub struct CollectString(String);

impl CollectString {
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output as a string slice.
    pub fn output(&self) -> &str {
        &self.0
    }

    /// Consumes the writer and returns the collected output.
    pub fn into_output(self) -> String {
        self.0
    }
}

impl OutputWriter for CollectString {
    fn write_text(&mut self, text: &str) {
        self.0.push_str(text);
    }
}

/// Discards all output.
#[derive(Debug, Default)]
pub struct NoOutput;

impl OutputWriter for NoOutput {
    fn write_text(&mut self, _text: &str) {}
}

/// The three collaborators a run talks to.
pub struct Io<'a> {
    /// Lines for `READ`.
    pub input: &'a mut dyn LineReader,
    /// Target of `WRITE`.
    pub output: &'a mut dyn OutputWriter,
    /// Target of `DPRINT` and `BREAK`.
    pub diagnostics: &'a mut dyn OutputWriter,
}

impl<'a> Io<'a> {
    pub fn new(
        input: &'a mut dyn LineReader,
        output: &'a mut dyn OutputWriter,
        diagnostics: &'a mut dyn OutputWriter,
    ) -> Self {
        Self {
            input,
            output,
            diagnostics,
        }
    }
}
