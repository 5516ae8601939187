//! Reader for the XML program representation.
//!
//! ```xml
//! <program language="IPPcode19">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hi</arg1>
//!   </instruction>
//! </program>
//! ```
//!
//! Instructions run in ascending `order`, and arguments are taken by their
//! `argN` index whatever their document order. Every argument is turned
//! into the token the text lexer would have produced, so operand checks
//! and their errors are shared with [`crate::assemble`].

use crate::error::AsmError;
use crate::lexer::{is_identifier, Token};
use crate::parser::parse_line;
use ippi_common::{DataType, FrameKind, Program, Value, VarRef};
use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use tracing::debug;

const LANGUAGE: &str = "IPPcode19";
const PROGRAM_ATTRIBUTES: &[&str] = &["language", "name", "description"];
const MAX_ARGUMENTS: u64 = 3;

/// Read an XML document into a program.
///
/// A document that is not well formed is reported as
/// [`AsmError::MalformedXml`] (31). A well-formed document that is not a
/// program is [`AsmError::UnexpectedXml`] (32), as are the operand errors
/// the text front-end reports.
pub fn load_xml(text: &str) -> Result<Program, AsmError> {
    let doc = Document::parse(text).map_err(|e| AsmError::MalformedXml {
        line: e.pos().row as usize,
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "program" {
        return Err(unexpected(root, format!("root element is <{}>, not <program>", root.tag_name().name())));
    }
    match root.attribute("language") {
        Some(LANGUAGE) => {}
        Some(other) => return Err(unexpected(root, format!("unsupported language '{other}'"))),
        None => return Err(unexpected(root, "missing language attribute")),
    }
    only_attributes(root, PROGRAM_ATTRIBUTES)?;

    let mut ordered = BTreeMap::new();
    for node in content(root)? {
        if node.tag_name().name() != "instruction" {
            return Err(unexpected(node, format!("unexpected element <{}>", node.tag_name().name())));
        }
        only_attributes(node, &["order", "opcode"])?;
        let order = node
            .attribute("order")
            .and_then(index)
            .filter(|&order| order > 0)
            .ok_or_else(|| unexpected(node, "instruction order must be a positive integer"))?;
        if ordered.insert(order, node).is_some() {
            return Err(unexpected(node, format!("duplicate instruction order {order}")));
        }
    }

    let mut instructions = Vec::with_capacity(ordered.len());
    for node in ordered.into_values() {
        let line = line_of(node);
        let opcode = node
            .attribute("opcode")
            .ok_or_else(|| unexpected(node, "missing opcode attribute"))?;

        let mut tokens = vec![Token::Word(opcode.to_string())];
        for arg in arguments(node)? {
            tokens.push(argument(arg)?);
        }
        if let Some(instr) = parse_line(&tokens, line)? {
            instructions.push(instr);
        }
    }

    debug!(instructions = instructions.len(), "loaded XML program");
    Ok(Program::new(instructions))
}

/// The `argN` children of an instruction, in index order.
fn arguments<'a, 'input>(instr: Node<'a, 'input>) -> Result<Vec<Node<'a, 'input>>, AsmError> {
    let mut args = BTreeMap::new();
    for node in content(instr)? {
        let position = node
            .tag_name()
            .name()
            .strip_prefix("arg")
            .and_then(index)
            .filter(|n| (1..=MAX_ARGUMENTS).contains(n))
            .ok_or_else(|| unexpected(node, format!("unexpected element <{}>", node.tag_name().name())))?;
        if args.insert(position, node).is_some() {
            return Err(unexpected(node, format!("duplicate <arg{position}>")));
        }
    }
    if !args.keys().copied().eq(1..=args.len() as u64) {
        return Err(unexpected(instr, "arguments must be numbered from arg1 without gaps"));
    }
    Ok(args.into_values().collect())
}

/// Convert one `<argN type="..">text</argN>` into a token.
fn argument(arg: Node) -> Result<Token, AsmError> {
    only_attributes(arg, &["type"])?;
    if let Some(child) = arg.children().find(|n| n.is_element()) {
        return Err(unexpected(child, "arguments hold text only"));
    }
    let line = line_of(arg);
    let kind = arg
        .attribute("type")
        .ok_or_else(|| unexpected(arg, "missing type attribute"))?;
    let raw = arg.text().unwrap_or("");
    let invalid = |token: &str| AsmError::InvalidIdentifier {
        line,
        token: token.to_string(),
    };

    match kind {
        "var" => {
            let text = raw.trim();
            let (prefix, name) = text.split_once('@').ok_or_else(|| invalid(text))?;
            match FrameKind::from_prefix(prefix) {
                Some(frame) if is_identifier(name) => Ok(Token::Var(VarRef::new(frame, name))),
                _ => Err(invalid(text)),
            }
        }
        "label" | "type" => {
            let text = raw.trim();
            if is_identifier(text) {
                Ok(Token::Word(text.to_string()))
            } else {
                Err(invalid(text))
            }
        }
        _ => {
            let data_type =
                DataType::from_name(kind).ok_or_else(|| unexpected(arg, format!("unknown argument type '{kind}'")))?;
            let text = if data_type == DataType::String { raw } else { raw.trim() };
            Value::parse_literal(data_type, text)
                .map(Token::Const)
                .map_err(|source| AsmError::InvalidLiteral {
                    line,
                    token: format!("{kind}@{text}"),
                    source,
                })
        }
    }
}

/// Element children of `node`. Comments are skipped; stray text is an error.
fn content<'a, 'input>(node: Node<'a, 'input>) -> Result<Vec<Node<'a, 'input>>, AsmError> {
    let mut elements = Vec::new();
    for child in node.children() {
        if child.is_element() {
            elements.push(child);
        } else if child.is_text() && !child.text().unwrap_or("").trim().is_empty() {
            return Err(unexpected(child, "unexpected text"));
        }
    }
    Ok(elements)
}

fn only_attributes(node: Node, allowed: &[&str]) -> Result<(), AsmError> {
    match node.attributes().find(|a| !allowed.contains(&a.name())) {
        Some(attr) => Err(unexpected(
            node,
            format!("unexpected attribute '{}' on <{}>", attr.name(), node.tag_name().name()),
        )),
        None => Ok(()),
    }
}

/// Unsigned decimal without sign or spaces.
fn index(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn line_of(node: Node) -> usize {
    node.document().text_pos_at(node.range().start).row as usize
}

fn unexpected(node: Node, message: impl Into<String>) -> AsmError {
    AsmError::UnexpectedXml {
        line: line_of(node),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippi_common::{Instruction, Opcode, Operand};

    fn program(body: &str) -> String {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<program language=\"IPPcode19\">\n{body}</program>\n")
    }

    fn gf(name: &str) -> Operand {
        Operand::Var(VarRef::new(FrameKind::Global, name))
    }

    #[test]
    fn instructions_follow_order_attribute() {
        let text = program(
            r#"<instruction order="10" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
<instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
<instruction order="5" opcode="MOVE"><arg1 type="var">GF@x</arg1><arg2 type="int">7</arg2></instruction>
"#,
        );
        let program = load_xml(&text).unwrap();
        let opcodes: Vec<Opcode> = program.instructions.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::DefVar, Opcode::Move, Opcode::Write]);
        assert_eq!(program.instructions[1].operands, vec![gf("x"), Operand::Const(Value::Int(7))]);
    }

    #[test]
    fn arguments_follow_their_index() {
        let text = program(
            r#"<instruction order="1" opcode="add">
  <arg3 type="int">3</arg3>
  <arg1 type="var">LF@sum</arg1>
  <arg2 type="var">TF@a</arg2>
</instruction>
"#,
        );
        let program = load_xml(&text).unwrap();
        assert_eq!(
            program.instructions,
            vec![Instruction::new(
                Opcode::Add,
                vec![
                    Operand::Var(VarRef::new(FrameKind::Local, "sum")),
                    Operand::Var(VarRef::new(FrameKind::Temporary, "a")),
                    Operand::Const(Value::Int(3)),
                ]
            )]
        );
    }

    #[test]
    fn string_text_decodes_entities_and_escapes() {
        let text = program(
            r#"<instruction order="1" opcode="WRITE"><arg1 type="string">a&lt;b\032c&amp;</arg1></instruction>
<instruction order="2" opcode="WRITE"><arg1 type="string"/></instruction>
"#,
        );
        let program = load_xml(&text).unwrap();
        assert_eq!(program.instructions[0].operands, vec![Operand::Const(Value::Str("a<b c&".to_string()))]);
        assert_eq!(program.instructions[1].operands, vec![Operand::Const(Value::Str(String::new()))]);
    }

    #[test]
    fn label_type_nil_and_bool_arguments() {
        let text = program(
            r#"<instruction order="1" opcode="JUMPIFEQ">
  <arg1 type="label">end</arg1><arg2 type="nil">nil</arg2><arg3 type="bool">true</arg3>
</instruction>
<instruction order="2" opcode="READ"><arg1 type="var">GF@n</arg1><arg2 type="type">int</arg2></instruction>
"#,
        );
        let program = load_xml(&text).unwrap();
        assert_eq!(
            program.instructions[0].operands,
            vec![
                Operand::Label("end".to_string()),
                Operand::Const(Value::Nil),
                Operand::Const(Value::Bool(true)),
            ]
        );
        assert_eq!(program.instructions[1].operands, vec![gf("n"), Operand::Type(DataType::Int)]);
    }

    #[test]
    fn empty_program() {
        assert!(load_xml("<program language=\"IPPcode19\"/>").unwrap().is_empty());
    }

    #[test]
    fn broken_document_exits_31() {
        let err = load_xml("<program language=\"IPPcode19\">\n<instruction order=\"1\" opcode=\"BREAK\">\n</program>").unwrap_err();
        assert!(matches!(err, AsmError::MalformedXml { .. }), "{err}");
        assert_eq!(err.exit_code(), 31);
    }

    #[test]
    fn wrong_root_exits_32() {
        let err = load_xml("<code language=\"IPPcode19\"/>").unwrap_err();
        assert!(matches!(err, AsmError::UnexpectedXml { line: 1, .. }), "{err}");
        assert_eq!(err.exit_code(), 32);
    }

    #[test]
    fn language_is_checked() {
        assert!(matches!(load_xml("<program/>"), Err(AsmError::UnexpectedXml { .. })));
        assert!(matches!(load_xml("<program language=\"IPPcode18\"/>"), Err(AsmError::UnexpectedXml { .. })));
        assert!(matches!(
            load_xml("<program language=\"IPPcode19\" version=\"2\"/>"),
            Err(AsmError::UnexpectedXml { .. })
        ));
        assert!(load_xml("<program language=\"IPPcode19\" name=\"demo\" description=\"d\"/>").is_ok());
    }

    #[test]
    fn bad_order_is_rejected() {
        for order in ["0", "-1", "x", "", "+1"] {
            let text = program(&format!("<instruction order=\"{order}\" opcode=\"BREAK\"/>\n"));
            assert!(matches!(load_xml(&text), Err(AsmError::UnexpectedXml { .. })), "order {order:?}");
        }
        let text = program("<instruction opcode=\"BREAK\"/>\n");
        assert!(matches!(load_xml(&text), Err(AsmError::UnexpectedXml { .. })));
    }

    #[test]
    fn duplicate_order_reports_its_line() {
        let text = program("<instruction order=\"1\" opcode=\"BREAK\"/>\n<instruction order=\"1\" opcode=\"RETURN\"/>\n");
        assert!(matches!(load_xml(&text), Err(AsmError::UnexpectedXml { line: 4, .. })));
    }

    #[test]
    fn unexpected_elements_and_text() {
        let cases = [
            "<label order=\"1\" opcode=\"BREAK\"/>\n",
            "<instruction order=\"1\"/>\n",
            "<instruction order=\"1\" opcode=\"BREAK\" extra=\"x\"/>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><arg4 type=\"int\">1</arg4></instruction>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><argument type=\"int\">1</argument></instruction>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><arg2 type=\"int\">1</arg2></instruction>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><arg1 type=\"int\">1</arg1><arg1 type=\"int\">2</arg1></instruction>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><arg1>1</arg1></instruction>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><arg1 type=\"float\">1</arg1></instruction>\n",
            "<instruction order=\"1\" opcode=\"WRITE\"><arg1 type=\"int\"><b>1</b></arg1></instruction>\n",
            "stray text\n",
        ];
        for body in cases {
            let err = load_xml(&program(body)).unwrap_err();
            assert!(matches!(err, AsmError::UnexpectedXml { .. }), "{body}: {err}");
            assert_eq!(err.exit_code(), 32);
        }
    }

    #[test]
    fn operand_errors_match_text_front_end() {
        let unknown = program("<instruction order=\"1\" opcode=\"FOO\"/>\n");
        assert!(matches!(load_xml(&unknown), Err(AsmError::UnknownOpcode { line: 3, .. })));

        let count = program("<instruction order=\"1\" opcode=\"MOVE\"><arg1 type=\"var\">GF@x</arg1></instruction>\n");
        assert!(matches!(
            load_xml(&count),
            Err(AsmError::WrongOperandCount { expected: 2, found: 1, .. })
        ));

        let kind = program("<instruction order=\"1\" opcode=\"WRITE\"><arg1 type=\"label\">x</arg1></instruction>\n");
        assert!(matches!(load_xml(&kind), Err(AsmError::ExpectedSymbol { position: 1, .. })));

        let frame = program("<instruction order=\"1\" opcode=\"DEFVAR\"><arg1 type=\"var\">XF@x</arg1></instruction>\n");
        assert!(matches!(load_xml(&frame), Err(AsmError::InvalidIdentifier { .. })));

        let literal = program("<instruction order=\"1\" opcode=\"WRITE\"><arg1 type=\"int\">1.5</arg1></instruction>\n");
        let err = load_xml(&literal).unwrap_err();
        assert!(matches!(err, AsmError::InvalidLiteral { .. }));
        assert_eq!(err.exit_code(), 32);
    }
}
