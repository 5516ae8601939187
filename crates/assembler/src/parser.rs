//! Parser for IPPcode19 tokens → instructions.
//!
//! Looks the opcode up, checks the operand count against its signature,
//! then converts each token according to the kind its position expects.

use crate::error::AsmError;
use crate::lexer::Token;
use ippi_common::{DataType, Instruction, Opcode, Operand, OperandKind};

/// Parse the tokens of one line into an instruction.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Instruction>, AsmError> {
    let Some((first, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let opcode = match first {
        Token::Word(mnemonic) => Opcode::from_mnemonic(mnemonic),
        _ => None,
    }
    .ok_or_else(|| AsmError::UnknownOpcode {
        line: line_num,
        token: first.to_string(),
    })?;

    let signature = opcode.signature();
    if args.len() != signature.len() {
        return Err(AsmError::WrongOperandCount {
            line: line_num,
            opcode: opcode.mnemonic(),
            expected: signature.len(),
            found: args.len(),
        });
    }

    let operands = args
        .iter()
        .zip(signature)
        .enumerate()
        .map(|(i, (token, &kind))| operand(token, kind, opcode, i + 1, line_num))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Instruction::new(opcode, operands)))
}

/// Convert the token at 1-based `position` into an operand of `kind`.
fn operand(
    token: &Token,
    kind: OperandKind,
    opcode: Opcode,
    position: usize,
    line: usize,
) -> Result<Operand, AsmError> {
    let opcode_name = opcode.mnemonic();
    let token_text = || token.to_string();

    match (kind, token) {
        (OperandKind::Var | OperandKind::Symb, Token::Var(var)) => Ok(Operand::Var(var.clone())),
        (OperandKind::Symb, Token::Const(value)) => Ok(Operand::Const(value.clone())),
        (OperandKind::Label, Token::Word(name)) => Ok(Operand::Label(name.clone())),
        (OperandKind::Type, Token::Word(name)) => DataType::from_name(name)
            .filter(DataType::is_readable)
            .map(Operand::Type)
            .ok_or_else(|| AsmError::ExpectedType {
                line,
                opcode: opcode_name,
                position,
                token: token_text(),
            }),
        (OperandKind::Var, _) => Err(AsmError::ExpectedVariable {
            line,
            opcode: opcode_name,
            position,
            token: token_text(),
        }),
        (OperandKind::Symb, _) => Err(AsmError::ExpectedSymbol {
            line,
            opcode: opcode_name,
            position,
            token: token_text(),
        }),
        (OperandKind::Label, _) => Err(AsmError::ExpectedLabel {
            line,
            opcode: opcode_name,
            position,
            token: token_text(),
        }),
        (OperandKind::Type, _) => Err(AsmError::ExpectedType {
            line,
            opcode: opcode_name,
            position,
            token: token_text(),
        }),
    }
}
