//! Main execution loop and opcode dispatch for the IPPcode19 engine.

use crate::error::RuntimeError;
use crate::machine::VM;
use ippi_common::{DataType, Instruction, Opcode, Operand, Value};
use std::cmp::Ordering;
use tracing::debug;

/// Highest code EXIT accepts.
pub const MAX_EXIT_CODE: i64 = 49;

impl<'a> VM<'a> {
    /// Execute the program until it runs off the end, hits EXIT, or fails.
    ///
    /// Returns the process exit code: 0 after the last instruction, or the
    /// EXIT operand.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        self.scan_labels()?;
        self.pc = 0;

        let program = self.program;
        while let Some(instr) = program.get(self.pc) {
            debug!(pc = self.pc, "{instr}");
            self.executed += 1;

            match instr.opcode {
                // Frames and calls
                Opcode::Move => self.exec_move(instr)?,
                Opcode::CreateFrame => self.frames.create_temporary(),
                Opcode::PushFrame => self
                    .frames
                    .push_temporary()
                    .map_err(|e| RuntimeError::from_frame(e, self.pc))?,
                Opcode::PopFrame => self
                    .frames
                    .pop_local()
                    .map_err(|e| RuntimeError::from_frame(e, self.pc))?,
                Opcode::DefVar => self.exec_defvar(instr)?,
                Opcode::Call => self.exec_call(instr)?,
                Opcode::Return => self.exec_return()?,

                // Operand stack
                Opcode::Pushs => {
                    let value = self.symbol(instr, 0)?;
                    self.push(value);
                }
                Opcode::Pops => {
                    let dest = self.target(instr, 0)?;
                    let value = self.pop()?;
                    self.assign(dest, value)?;
                }

                // Arithmetic
                Opcode::Add => self.exec_arith(instr, i64::wrapping_add)?,
                Opcode::Sub => self.exec_arith(instr, i64::wrapping_sub)?,
                Opcode::Mul => self.exec_arith(instr, i64::wrapping_mul)?,
                Opcode::Idiv => self.exec_idiv(instr)?,

                // Relational and boolean
                Opcode::Lt => self.exec_relational(instr, Ordering::Less)?,
                Opcode::Gt => self.exec_relational(instr, Ordering::Greater)?,
                Opcode::Eq => self.exec_eq(instr)?,
                Opcode::And => self.exec_logic(instr, |a, b| a && b)?,
                Opcode::Or => self.exec_logic(instr, |a, b| a || b)?,
                Opcode::Not => self.exec_not(instr)?,

                // Conversions
                Opcode::Int2Char => self.exec_int2char(instr)?,
                Opcode::Stri2Int => self.exec_stri2int(instr)?,

                // Input and output
                Opcode::Read => self.exec_read(instr)?,
                Opcode::Write => {
                    let value = self.symbol(instr, 0)?;
                    self.io.output.write_text(&value.to_string());
                }

                // Strings
                Opcode::Concat => self.exec_concat(instr)?,
                Opcode::Strlen => self.exec_strlen(instr)?,
                Opcode::GetChar => self.exec_getchar(instr)?,
                Opcode::SetChar => self.exec_setchar(instr)?,

                // Types
                Opcode::Type => {
                    let dest = self.target(instr, 0)?;
                    let value = self.resolve(instr, 1)?;
                    self.assign(dest, Value::Str(value.type_name().to_string()))?;
                }

                // Program flow
                Opcode::Label => {} // Resolved by the label scan
                Opcode::Jump => self.pc = self.label_target(instr, 0)?,
                Opcode::JumpIfEq => self.exec_conditional_jump(instr, true)?,
                Opcode::JumpIfNeq => self.exec_conditional_jump(instr, false)?,
                Opcode::Exit => return self.exec_exit(instr),

                // Debugging
                Opcode::Dprint => {
                    let value = self.symbol(instr, 0)?;
                    self.io.diagnostics.write_text(&format!("{value}\n"));
                }
                Opcode::Break => {
                    let report = self.state_report();
                    self.io.diagnostics.write_text(&report);
                }
            }

            self.pc += 1;
        }

        debug!(executed = self.executed, "end of program");
        Ok(0)
    }

    // ---- Frames and calls ----

    /// MOVE copies the source slot as is, so an unset source leaves the
    /// destination unset.
    fn exec_move(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let value = self.resolve(instr, 1)?;
        self.assign(dest, value)
    }

    fn exec_defvar(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        match instr.operand(0) {
            Some(Operand::Var(var)) => self
                .frames
                .declare(var)
                .map_err(|e| RuntimeError::from_frame(e, self.pc)),
            _ => Err(self.malformed(instr)),
        }
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.label_target(instr, 0)?;
        self.call_stack.push(self.pc);
        debug!(from = self.pc, to = target, depth = self.call_stack.len(), "call");
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        let call_site = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::EmptyCallStack { at: self.pc })?;
        debug!(to = call_site + 1, depth = self.call_stack.len(), "return");
        // The loop advances past the CALL.
        self.pc = call_site;
        Ok(())
    }

    // ---- Arithmetic ----

    fn exec_arith(
        &mut self,
        instr: &'a Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let (a, b) = self.int_pair(instr)?;
        self.assign(dest, Value::Int(op(a, b)))
    }

    fn exec_idiv(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let (a, b) = self.int_pair(instr)?;
        if b == 0 {
            return Err(RuntimeError::DivisionByZero { at: self.pc });
        }
        self.assign(dest, Value::Int(a.wrapping_div(b)))
    }

    fn int_pair(&self, instr: &Instruction) -> Result<(i64, i64), RuntimeError> {
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        Ok((self.expect_int(&a)?, self.expect_int(&b)?))
    }

    // ---- Relational and boolean ----

    fn exec_relational(
        &mut self,
        instr: &'a Instruction,
        wanted: Ordering,
    ) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        let ordering = self.compare(&a, &b)?;
        self.assign(dest, Value::Bool(ordering == wanted))
    }

    fn exec_eq(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        let equal = self.equal(&a, &b)?;
        self.assign(dest, Value::Bool(equal))
    }

    /// Order two values of the same non-nil type.
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, RuntimeError> {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
            (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
            // UTF-8 byte order is scalar value order.
            (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
            (Value::Nil, _) | (_, Value::Nil) => Err(RuntimeError::TypeMismatch {
                at: self.pc,
                expected: "int, bool or string",
                found: "nil",
            }),
            _ => Err(self.mismatch(a, b)),
        }
    }

    /// Equality of two values of the same type. `nil` only equals `nil`;
    /// comparing it with anything else is a type error.
    fn equal(&self, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        if a.data_type() != b.data_type() {
            return Err(self.mismatch(a, b));
        }
        Ok(a == b)
    }

    fn exec_logic(
        &mut self,
        instr: &'a Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        let (a, b) = (self.expect_bool(&a)?, self.expect_bool(&b)?);
        self.assign(dest, Value::Bool(op(a, b)))
    }

    fn exec_not(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let a = self.expect_bool(&a)?;
        self.assign(dest, Value::Bool(!a))
    }

    // ---- Conversions ----

    fn exec_int2char(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let code = self.symbol(instr, 1)?;
        let code = self.expect_int(&code)?;
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodePoint { at: self.pc, code })?;
        self.assign(dest, Value::Str(ch.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let (text, index) = self.string_and_index(instr)?;
        let ch = self.char_at(&text, index)?;
        self.assign(dest, Value::Int(i64::from(u32::from(ch))))
    }

    // ---- Input and output ----

    fn exec_read(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let data_type = self.type_operand(instr, 1)?;
        let line = self.io.input.read_line();
        let value = parse_input(data_type, line.as_deref());
        debug!(requested = data_type.name(), value = ?value, "read");
        self.assign(dest, value)
    }

    // ---- Strings ----

    fn exec_concat(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        let mut joined = self.expect_str(a)?;
        joined.push_str(&self.expect_str(b)?);
        self.assign(dest, Value::Str(joined))
    }

    fn exec_strlen(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let text = self.symbol(instr, 1)?;
        let text = self.expect_str(text)?;
        let length = text.chars().count() as i64;
        self.assign(dest, Value::Int(length))
    }

    fn exec_getchar(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let (text, index) = self.string_and_index(instr)?;
        let ch = self.char_at(&text, index)?;
        self.assign(dest, Value::Str(ch.to_string()))
    }

    /// SETCHAR: replace one character of the destination string in place.
    fn exec_setchar(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 0)?;
        let current = self.symbol(instr, 0)?;
        let index = self.symbol(instr, 1)?;
        let replacement = self.symbol(instr, 2)?;

        let current = self.expect_str(current)?;
        let index = self.expect_int(&index)?;
        let replacement = self.expect_str(replacement)?;

        let length = current.chars().count();
        let position = usize::try_from(index)
            .ok()
            .filter(|&i| i < length)
            .ok_or(RuntimeError::IndexOutOfRange {
                at: self.pc,
                index,
                length,
            })?;
        let new_char = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { at: self.pc })?;

        let updated: String = current
            .chars()
            .enumerate()
            .map(|(i, c)| if i == position { new_char } else { c })
            .collect();
        self.assign(dest, Value::Str(updated))
    }

    fn string_and_index(&self, instr: &Instruction) -> Result<(String, i64), RuntimeError> {
        let text = self.symbol(instr, 1)?;
        let index = self.symbol(instr, 2)?;
        Ok((self.expect_str(text)?, self.expect_int(&index)?))
    }

    fn char_at(&self, text: &str, index: i64) -> Result<char, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| text.chars().nth(i))
            .ok_or_else(|| RuntimeError::IndexOutOfRange {
                at: self.pc,
                index,
                length: text.chars().count(),
            })
    }

    // ---- Program flow ----

    fn exec_conditional_jump(
        &mut self,
        instr: &Instruction,
        jump_if_equal: bool,
    ) -> Result<(), RuntimeError> {
        let target = self.label_target(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        if self.equal(&a, &b)? == jump_if_equal {
            self.pc = target;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<i32, RuntimeError> {
        let code = self.symbol(instr, 0)?;
        let code = self.expect_int(&code)?;
        if !(0..=MAX_EXIT_CODE).contains(&code) {
            return Err(RuntimeError::InvalidExitCode { at: self.pc, code });
        }
        debug!(code, executed = self.executed, "exit");
        Ok(code as i32)
    }

    // ---- Type checks ----

    fn expect_int(&self, value: &Value) -> Result<i64, RuntimeError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(self.wrong_type(DataType::Int, other)),
        }
    }

    fn expect_bool(&self, value: &Value) -> Result<bool, RuntimeError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(self.wrong_type(DataType::Bool, other)),
        }
    }

    fn expect_str(&self, value: Value) -> Result<String, RuntimeError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(self.wrong_type(DataType::String, &other)),
        }
    }

    fn wrong_type(&self, expected: DataType, found: &Value) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.pc,
            expected: expected.name(),
            found: found.type_name(),
        }
    }

    fn mismatch(&self, a: &Value, b: &Value) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.pc,
            expected: a.type_name(),
            found: b.type_name(),
        }
    }
}

/// Convert one input line for READ.
///
/// Never fails: unparsable input, or no input at all, yields the type's
/// default (`0`, `false`, empty string).
pub fn parse_input(data_type: DataType, line: Option<&str>) -> Value {
    let line = line.unwrap_or_default();
    match data_type {
        DataType::Int => Value::Int(line.trim().parse().unwrap_or(0)),
        DataType::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        DataType::String => Value::Str(line.to_string()),
        DataType::Nil => Value::Nil,
    }
}
