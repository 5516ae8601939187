//! IPPcode19 front-end: source text ↔ [`Program`] translation, plus a
//! reader for the XML representation ([`load_xml`]).
//!
//! Reading is a mechanical 1:1 translation. Each instruction line becomes
//! one [`ippi_common::Instruction`] whose operands already match the
//! opcode's signature, so the engine never sees a malformed program built
//! from text.
//!
//! # Usage
//!
//! ```
//! use ippi_assembler::{assemble, disassemble};
//!
//! let text = ".IPPcode19\nDEFVAR GF@x\nMOVE GF@x string@hi\\032there\nWRITE GF@x\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Source format
//!
//! - The first non-blank, non-comment line is `.IPPcode19` (any case).
//! - `#` starts a comment that runs to end of line.
//! - Opcodes are case-insensitive; everything else is case-sensitive.
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for every program
//! whose instructions are well formed. The disassembler outputs canonical
//! text; the assembler also accepts non-canonical spacing, case and
//! comments.
//!
//! # XML
//!
//! [`load`] accepts either form and picks the XML reader when the first
//! non-blank character is `<`.

pub mod error;

mod disassembler;
mod lexer;
mod parser;
mod xml;

pub use error::AsmError;
pub use xml::load_xml;

use ippi_common::Program;
use lexer::{is_header, strip_comment, tokenize_line};
use parser::parse_line;
use tracing::debug;

/// Assemble source text into a program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut lines = text.lines().enumerate().map(|(idx, line)| (idx + 1, line));

    let header = lines.by_ref().find(|(_, line)| !strip_comment(line).is_empty());
    match header {
        Some((_, line)) if is_header(line) => {}
        Some((line_num, _)) => return Err(AsmError::MissingHeader { line: line_num }),
        None => return Err(AsmError::MissingHeader { line: 1 }),
    }

    let mut instructions = Vec::new();
    for (line_num, line) in lines {
        let tokens = tokenize_line(line, line_num)?;
        if let Some(instr) = parse_line(&tokens, line_num)? {
            instructions.push(instr);
        }
    }

    debug!(instructions = instructions.len(), "assembled");
    Ok(Program::new(instructions))
}

/// Read a program given either as source text or as XML.
pub fn load(text: &str) -> Result<Program, AsmError> {
    if text.trim_start().starts_with('<') {
        load_xml(text)
    } else {
        assemble(text)
    }
}

/// Disassemble a program into canonical source text.
///
/// The output is the header followed by one instruction per line, with
/// string constants re-escaped.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
