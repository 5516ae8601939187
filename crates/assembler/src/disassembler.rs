//! Disassembler: program → canonical IPPcode19 text.
//!
//! Output is the header line followed by one instruction per line. No
//! indentation, no comments, no blank lines.

use crate::lexer::HEADER;
use ippi_common::Program;
use std::fmt::Write as _;

/// Disassemble a program into canonical source text.
///
/// The output is guaranteed to reassemble to an identical program
/// (`assemble(disassemble(program)) == program`).
pub fn disassemble(program: &Program) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for instr in &program.instructions {
        let _ = writeln!(text, "{instr}");
    }
    text
}
