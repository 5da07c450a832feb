//! Reference frontend: a small LLVM-IR-like textual grammar.
//!
//! This is **not** a bitcode or `.ll` parser. It is a deliberately small,
//! line-oriented stand-in for the real compiler frontend (an external
//! collaborator — see the crate root docs), just complete enough to
//! exercise every opcode class the analyzer models. It plays the same role
//! here that a simplified JSON-IR parser plays for a MIR-based analyzer:
//! a swappable adapter behind [`super::IrSource`].
//!
//! Grammar (one statement per line, tokens whitespace-separated, commas are
//! their own tokens):
//!
//! ```text
//! fn @name {
//! entry:
//!   %1 = alloca i32
//!   store i32 %x , ptr %1
//!   %2 = load i32 , ptr %1
//!   %3 = trunc i32 %2 to i8
//!   %4 = icmp eq i32 %2 , %3
//!   %5 = getelementptr i8 , ptr %1 , i32 0
//!   %6 = call i32 @foo ( i32 %3 , i32 %5 )
//!   call void asm ( i32 %x )
//!   br i1 %4 , label %true_blk , label %false_blk
//!   br label %exit
//!   switch i32 %2 , label %default [ i32 0 , label %case0 i32 1 , label %case1 ]
//!   ret
//! }
//! ```
//!
//! Lines starting with `;` (after trimming) are comments.

use super::{compute_predecessors, BlockId, Instruction, IrBlock, IrFunction, IrModule, IrSource, Operand};
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::Path;

/// Reference [`IrSource`] backed by an in-memory textual module.
pub struct TextualIrSource {
    source: String,
}

impl TextualIrSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading IR source file {}", path.display()))?;
        Ok(Self::new(source))
    }
}

impl IrSource for TextualIrSource {
    fn load(&self) -> Result<IrModule> {
        parse_module(&self.source)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn strip_pct(tok: &str) -> BlockId {
    tok.trim_start_matches('%').to_string()
}

/// Parses a whole module: a sequence of `fn @name { ... }` blocks.
pub fn parse_module(text: &str) -> Result<IrModule> {
    let mut functions = Vec::new();
    let mut lines = text.lines();

    while let Some(raw) = lines.next() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix("fn ") else {
            bail!("expected a `fn @name {{` header, found: {line:?}");
        };
        let name = rest
            .trim_end_matches('{')
            .trim()
            .trim_start_matches('@')
            .trim()
            .to_string();
        if name.is_empty() {
            bail!("function header missing a name: {line:?}");
        }

        let mut function = IrFunction { name, blocks: Vec::new() };
        loop {
            let raw = lines
                .next()
                .ok_or_else(|| anyhow!("unexpected end of input inside function body"))?;
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            if line == "}" {
                break;
            }
            if let Some(label) = line.strip_suffix(':') {
                function.blocks.push(IrBlock::new(label.trim()));
                continue;
            }
            let instruction = parse_instruction(line)
                .with_context(|| format!("parsing instruction: {line:?}"))?;
            let block = function
                .blocks
                .last_mut()
                .ok_or_else(|| anyhow!("instruction before any block label: {line:?}"))?;
            block.instructions.push(instruction);
        }

        compute_predecessors(&mut function);
        functions.push(function);
    }

    Ok(IrModule { functions })
}

/// Groups `<type> <value> , <type> <value> ...` tokens into operands.
fn parse_typed_pairs(tokens: &[&str]) -> Vec<Operand> {
    let filtered: Vec<&str> = tokens.iter().filter(|t| **t != ",").copied().collect();
    filtered
        .chunks(2)
        .filter(|c| c.len() == 2)
        .map(|c| Operand::new(c[1], c[0]))
        .collect()
}

/// Parses the bracketed switch case list: `[ <type> <val> label %tgt ... ]`.
fn parse_switch_cases(tokens: &[&str]) -> Vec<(Operand, BlockId)> {
    let filtered: Vec<&str> = tokens.iter().filter(|t| **t != ",").copied().collect();
    filtered
        .chunks(4)
        .filter(|c| c.len() == 4 && c[2] == "label")
        .map(|c| (Operand::new(c[1], c[0]), strip_pct(c[3])))
        .collect()
}

/// Slices tokens between the first `(`/`[` and its matching `)`/`]`.
fn between<'a>(tokens: &'a [&'a str], open: &str, close: &str) -> Option<&'a [&'a str]> {
    let start = tokens.iter().position(|t| *t == open)?;
    let end = tokens.iter().position(|t| *t == close)?;
    if end < start {
        return None;
    }
    Some(&tokens[start + 1..end])
}

fn parse_instruction(line: &str) -> Result<Instruction> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        bail!("empty instruction");
    }

    if let Some(eq_idx) = tokens.iter().position(|t| *t == "=") {
        let result_id = tokens[0];
        let mnemonic = *tokens.get(eq_idx + 1).ok_or_else(|| anyhow!("missing opcode after `=`"))?;
        let rest = &tokens[eq_idx + 2..];
        return parse_assigning_instruction(result_id, mnemonic, rest);
    }

    parse_void_instruction(tokens[0], &tokens[1..])
}

fn parse_assigning_instruction(result_id: &str, mnemonic: &str, rest: &[&str]) -> Result<Instruction> {
    match mnemonic {
        "alloca" => {
            let ty = rest.first().ok_or_else(|| anyhow!("alloca missing type"))?;
            Ok(Instruction::Alloca { result: Operand::new(result_id, *ty) })
        }
        "load" => {
            // load <type> , ptr <ptr>
            let ty = *rest.first().ok_or_else(|| anyhow!("load missing type"))?;
            let ptr_ty = *rest.get(2).ok_or_else(|| anyhow!("load missing pointer type"))?;
            let ptr_val = *rest.get(3).ok_or_else(|| anyhow!("load missing pointer value"))?;
            Ok(Instruction::Load {
                ptr: Operand::new(ptr_val, ptr_ty),
                result: Operand::new(result_id, ty),
            })
        }
        "trunc" => {
            // trunc <type> <src> to <totype>
            let ty = *rest.first().ok_or_else(|| anyhow!("trunc missing source type"))?;
            let src = *rest.get(1).ok_or_else(|| anyhow!("trunc missing source value"))?;
            let to_ty = *rest.get(3).ok_or_else(|| anyhow!("trunc missing target type"))?;
            Ok(Instruction::Trunc {
                src: Operand::new(src, ty),
                result: Operand::new(result_id, to_ty),
            })
        }
        "icmp" => {
            // icmp <pred> <type> <a> , <b>
            let pred = *rest.first().ok_or_else(|| anyhow!("icmp missing predicate"))?;
            let ty = *rest.get(1).ok_or_else(|| anyhow!("icmp missing type"))?;
            let a = *rest.get(2).ok_or_else(|| anyhow!("icmp missing lhs"))?;
            let b = *rest.get(4).ok_or_else(|| anyhow!("icmp missing rhs"))?;
            Ok(Instruction::ICmp {
                predicate: pred.to_string(),
                a: Operand::new(a, ty),
                b: Operand::new(b, ty),
                result: Operand::new(result_id, "i1"),
            })
        }
        "getelementptr" => {
            let operands = parse_typed_pairs(rest);
            if operands.is_empty() {
                bail!("getelementptr with no operands");
            }
            Ok(Instruction::GetElementPtr { operands, result: Operand::new(result_id, "ptr") })
        }
        "call" => parse_call(result_id, rest, true),
        other => {
            let ty = rest.first().copied().unwrap_or("unknown");
            let values: Vec<&str> = rest.iter().skip(1).filter(|t| **t != ",").copied().collect();
            let operands = values.into_iter().map(|v| Operand::new(v, ty)).collect();
            Ok(Instruction::Other {
                mnemonic: other.to_string(),
                operands,
                result: Some(Operand::new(result_id, ty)),
            })
        }
    }
}

fn parse_call(result_id: &str, rest: &[&str], has_result: bool) -> Result<Instruction> {
    if rest.first().copied() == Some("asm") {
        let args = between(rest, "(", ")").map(parse_typed_pairs).unwrap_or_default();
        let result = if has_result {
            let ty = rest.get(1).copied().unwrap_or("void");
            Operand::new(result_id, ty)
        } else {
            Operand::badref()
        };
        return Ok(Instruction::Call { callee: None, args, result, inline_asm: true });
    }

    let ty = *rest.first().ok_or_else(|| anyhow!("call missing return type"))?;
    let callee_tok = rest.get(1).ok_or_else(|| anyhow!("call missing callee"))?;
    let callee = if *callee_tok == "*" {
        // `*` marks an indirect call whose target could not be resolved.
        None
    } else {
        Some(callee_tok.trim_start_matches('@').to_string())
    };
    let args = between(rest, "(", ")").map(parse_typed_pairs).unwrap_or_default();
    let result = if has_result { Operand::new(result_id, ty) } else { Operand::badref() };
    Ok(Instruction::Call { callee, args, result, inline_asm: false })
}

fn parse_void_instruction(mnemonic: &str, rest: &[&str]) -> Result<Instruction> {
    match mnemonic {
        "store" => {
            // store <type> <val> , <ptrtype> <ptr>
            let ty = *rest.first().ok_or_else(|| anyhow!("store missing type"))?;
            let val = *rest.get(1).ok_or_else(|| anyhow!("store missing value"))?;
            let ptr_ty = *rest.get(3).ok_or_else(|| anyhow!("store missing pointer type"))?;
            let ptr_val = *rest.get(4).ok_or_else(|| anyhow!("store missing pointer value"))?;
            Ok(Instruction::Store {
                val: Operand::new(val, ty),
                ptr: Operand::new(ptr_val, ptr_ty),
            })
        }
        "ret" | "return" => Ok(Instruction::Return),
        "br" => {
            if rest.first().copied() == Some("label") {
                let target = rest.get(1).ok_or_else(|| anyhow!("br missing target"))?;
                Ok(Instruction::Branch { conditional: false, targets: vec![strip_pct(target)] })
            } else {
                // br <type> <cond> , label <true> , label <false>
                let true_label = rest.get(4).ok_or_else(|| anyhow!("br missing true label"))?;
                let false_label = rest.get(7).ok_or_else(|| anyhow!("br missing false label"))?;
                Ok(Instruction::Branch {
                    conditional: true,
                    targets: vec![strip_pct(true_label), strip_pct(false_label)],
                })
            }
        }
        "switch" => {
            // switch <type> <val> , label <default> [ cases ]
            let ty = *rest.first().ok_or_else(|| anyhow!("switch missing type"))?;
            let val = *rest.get(1).ok_or_else(|| anyhow!("switch missing value"))?;
            let default_tok = rest.get(4).ok_or_else(|| anyhow!("switch missing default label"))?;
            let cases = between(rest, "[", "]").map(parse_switch_cases).unwrap_or_default();
            Ok(Instruction::Switch {
                operand: Operand::new(val, ty),
                cases,
                default: strip_pct(default_tok),
            })
        }
        "call" => parse_call("", rest, false),
        other => {
            let ty = rest.first().copied().unwrap_or("unknown");
            let operand_tokens: Vec<&str> = rest.iter().skip(1).copied().collect();
            let operands = parse_typed_pairs(
                &operand_tokens
                    .iter()
                    .flat_map(|v| [ty, *v])
                    .collect::<Vec<_>>(),
            );
            Ok(Instruction::Other { mnemonic: other.to_string(), operands, result: None })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_straight_line_ddg_chain() {
        let src = r#"
            fn @f {
            entry:
              %1 = alloca i32
              store i32 %x , ptr %1
              %2 = load i32 , ptr %1
              %3 = trunc i32 %2 to i8
              ret
            }
        "#;
        let module = parse_module(src).unwrap();
        assert_eq!(module.functions.len(), 1);
        let f = &module.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.blocks.len(), 1);
        assert_eq!(f.blocks[0].instructions.len(), 5);
        assert!(matches!(f.blocks[0].instructions[0], Instruction::Alloca { .. }));
        assert!(matches!(f.blocks[0].instructions[4], Instruction::Return));
    }

    #[test]
    fn parses_conditional_branch_and_loop_back_edge() {
        let src = r#"
            fn @loopfn {
            A:
              br label %B
            B:
              switch i32 %i , label %D [ i32 0 , label %C ]
            C:
              br label %B
            D:
              ret
            }
        "#;
        let module = parse_module(src).unwrap();
        let f = &module.functions[0];
        assert_eq!(f.blocks.len(), 4);
        let b = f.block("B").unwrap();
        assert_eq!(b.predecessors, vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn parses_call_and_inline_asm() {
        let src = r#"
            fn @g {
            entry:
              %1 = call i32 @foo ( i32 %x )
              call void asm ( i32 %1 )
              ret
            }
        "#;
        let module = parse_module(src).unwrap();
        let f = &module.functions[0];
        match &f.blocks[0].instructions[0] {
            Instruction::Call { callee, args, inline_asm, .. } => {
                assert_eq!(callee.as_deref(), Some("foo"));
                assert_eq!(args.len(), 1);
                assert!(!inline_asm);
            }
            other => panic!("expected Call, got {other:?}"),
        }
        match &f.blocks[0].instructions[1] {
            Instruction::Call { callee, inline_asm, .. } => {
                assert!(callee.is_none());
                assert!(inline_asm);
            }
            other => panic!("expected inline asm Call, got {other:?}"),
        }
    }

    #[test]
    fn declaration_with_no_blocks_is_allowed() {
        let src = "fn @decl {\n}\n";
        let module = parse_module(src).unwrap();
        assert_eq!(module.functions.len(), 1);
        assert!(module.functions[0].is_declaration());
    }

    #[test]
    fn rejects_instruction_before_any_block() {
        let src = "fn @f {\n  ret\n}\n";
        assert!(parse_module(src).is_err());
    }
}
