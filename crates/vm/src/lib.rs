//! IPPcode19 execution engine.
//!
//! The engine runs a decoded [`Program`] against three frames of named
//! variables:
//! - a global frame (`GF`) that always exists
//! - an optional temporary frame (`TF`) built by CREATEFRAME
//! - a stack of local frames (`LF` is the top) fed by PUSHFRAME
//!
//! plus an operand stack for PUSHS / POPS and a call stack for CALL / RETURN.
//! All I/O goes through the [`Io`] collaborators, so a run can be driven by
//! stdin/stdout or entirely in memory.
//!
//! # Usage
//!
//! ```
//! use ippi_common::{FrameKind, Instruction, Opcode, Operand, Program, Value, VarRef};
//! use ippi_vm::{run, CollectString, Io, NoInput, NoOutput};
//!
//! let x = VarRef::new(FrameKind::Global, "x");
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::DefVar, vec![Operand::Var(x.clone())]),
//!     Instruction::new(
//!         Opcode::Add,
//!         vec![
//!             Operand::Var(x.clone()),
//!             Operand::Const(Value::Int(5)),
//!             Operand::Const(Value::Int(3)),
//!         ],
//!     ),
//!     Instruction::new(Opcode::Write, vec![Operand::Var(x)]),
//! ]);
//!
//! let mut input = NoInput;
//! let mut output = CollectString::new();
//! let mut diagnostics = NoOutput;
//! let code = run(&program, Io::new(&mut input, &mut output, &mut diagnostics)).unwrap();
//! assert_eq!(code, 0);
//! assert_eq!(output.output(), "8");
//! ```

pub mod error;
pub mod execute;
pub mod frame;
pub mod io;
pub mod machine;

pub use error::RuntimeError;
pub use execute::{parse_input, MAX_EXIT_CODE};
pub use frame::{Frame, FrameError, FrameSet, Slot};
pub use io::{
    BufLineReader, CollectString, Io, LineReader, NoInput, NoOutput, OutputWriter, StderrWriter,
    StdoutWriter,
};
pub use machine::VM;

use ippi_common::Program;

/// Execute a program and return its exit code.
///
/// Labels are collected first, so a duplicate label fails before any
/// instruction runs. Execution then starts at the first instruction and
/// ends after the last one (code 0) or at EXIT (its operand).
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first fatal condition. Output written
/// before the failure stays written; [`RuntimeError::exit_code`] gives the
/// process exit code.
pub fn run<'a>(program: &'a Program, io: Io<'a>) -> Result<i32, RuntimeError> {
    let mut vm = VM::new(program, io);
    vm.execute()
}
