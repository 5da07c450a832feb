//! Abstract IR adapter surface.
//!
//! This module defines the shape the analyzer needs from a typed, SSA-form
//! IR: functions, their blocks in program order, and per-block instructions
//! carrying a closed set of opcode tags plus typed operands. A real compiler
//! frontend is an external collaborator (see crate root docs) — this module
//! is the seam it plugs into, not the frontend itself.

pub mod textual;

use std::collections::HashMap;

/// Canonical textual rendering of an SSA operand or result.
///
/// Stable within a function; the sole key of the [`crate::ddg::Ddg`].
pub type ValueId = String;

/// Canonical textual rendering of an IR type.
pub type TypeId = String;

/// Canonical rendering of a block's identity: its name, or the adapter's
/// rendering of the operand naming it when unnamed.
pub type BlockId = String;

/// Sentinel meaning "no identity". Edges touching it are dropped.
pub const BADREF: &str = "<badref>";

/// A typed SSA value: its identity plus its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operand {
    pub id: ValueId,
    pub ty: TypeId,
}

impl Operand {
    pub fn new(id: impl Into<ValueId>, ty: impl Into<TypeId>) -> Self {
        Self { id: id.into(), ty: ty.into() }
    }

    /// The sentinel "no identity" operand, used when an adapter cannot
    /// resolve a reference (e.g. an indirect call's callee).
    pub fn badref() -> Self {
        Self { id: BADREF.to_string(), ty: BADREF.to_string() }
    }

    pub fn is_badref(&self) -> bool {
        self.id == BADREF
    }
}

/// One instruction, tagged by its opcode class.
///
/// This is the closed set from the adapter contract: `Alloca`, `Store`,
/// `Load`, `Call`, `GetElementPtr`, `Return`, `Trunc`, `Branch`, `ICmp`,
/// `Switch`, `Other`. `Other` is the catch-all fall-through for opcodes the
/// analyzer doesn't specifically model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Alloca {
        result: Operand,
    },
    Store {
        val: Operand,
        ptr: Operand,
    },
    Load {
        ptr: Operand,
        result: Operand,
    },
    Call {
        /// `None` for an indirect call (missing callee — §7).
        callee: Option<String>,
        args: Vec<Operand>,
        result: Operand,
        inline_asm: bool,
    },
    GetElementPtr {
        operands: Vec<Operand>,
        result: Operand,
    },
    Return,
    Trunc {
        src: Operand,
        result: Operand,
    },
    Branch {
        conditional: bool,
        /// `[true_block, false_block]` when conditional, `[next_block]`
        /// when not.
        targets: Vec<BlockId>,
    },
    ICmp {
        predicate: String,
        a: Operand,
        b: Operand,
        result: Operand,
    },
    Switch {
        operand: Operand,
        /// `(case value, target block)` pairs, in source order.
        cases: Vec<(Operand, BlockId)>,
        default: BlockId,
    },
    /// Unmodeled opcode: operand→result edges labeled with the mnemonic.
    Other {
        mnemonic: String,
        operands: Vec<Operand>,
        result: Option<Operand>,
    },
}

/// A basic block: its identity and instructions in program order.
///
/// `predecessors` is populated by the adapter when the module is assembled
/// (mirroring how an LLVM-style frontend maintains use-list-backed
/// predecessor iteration for free) so the CFG extractor stays a single
/// forward pass over instructions, as §4.3 of the design requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrBlock {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    pub predecessors: Vec<BlockId>,
}

impl IrBlock {
    pub fn new(id: impl Into<BlockId>) -> Self {
        Self { id: id.into(), instructions: Vec::new(), predecessors: Vec::new() }
    }
}

/// A function: its name and blocks in program order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrFunction {
    pub name: String,
    pub blocks: Vec<IrBlock>,
}

impl IrFunction {
    /// Declarations (no body) are skipped by the pipeline, not the parser.
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &str) -> Option<&IrBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}

/// A module: an ordered set of functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrModule {
    pub functions: Vec<IrFunction>,
}

impl IrModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Functions with a body, in program order — declarations are skipped
    /// per §4.1.
    pub fn defined_functions(&self) -> impl Iterator<Item = &IrFunction> {
        self.functions.iter().filter(|f| !f.is_declaration())
    }
}

/// Derives each block's predecessor list from the terminators that target
/// it (`Branch`/`Switch`), the way a real frontend's use-list bookkeeping
/// would already have done. Adapters that build an [`IrModule`] by hand
/// (like [`textual::TextualIrSource`]) call this once after all blocks and
/// terminators are known.
pub fn compute_predecessors(function: &mut IrFunction) {
    let mut preds: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
    for block in &function.blocks {
        for target in successors_of(block) {
            preds.entry(target).or_default().push(block.id.clone());
        }
    }
    for block in &mut function.blocks {
        block.predecessors = preds.remove(&block.id).unwrap_or_default();
    }
}

/// The block-terminator successors of a block, in the order the terminator
/// names them. Empty for blocks with no terminator recognized as a
/// control-transfer (a malformed input — see §7, "assumes the IR is
/// well-formed").
pub fn successors_of(block: &IrBlock) -> Vec<BlockId> {
    match block.instructions.last() {
        Some(Instruction::Branch { targets, .. }) => targets.clone(),
        Some(Instruction::Switch { cases, default, .. }) => {
            let mut targets: Vec<BlockId> = cases.iter().map(|(_, t)| t.clone()).collect();
            targets.push(default.clone());
            targets
        }
        _ => Vec::new(),
    }
}

/// A source of IR modules. The real compiler frontend that emits IR is an
/// external collaborator; this trait is the seam a production integration
/// implements. [`textual::TextualIrSource`] is the reference/test
/// implementation shipped with this crate.
pub trait IrSource {
    fn load(&self) -> anyhow::Result<IrModule>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badref_operand_is_recognized() {
        assert!(Operand::badref().is_badref());
        assert!(!Operand::new("%1", "i32").is_badref());
    }

    #[test]
    fn declarations_are_skipped() {
        let module = IrModule {
            functions: vec![
                IrFunction { name: "decl".into(), blocks: vec![] },
                IrFunction { name: "defined".into(), blocks: vec![IrBlock::new("entry")] },
            ],
        };
        let names: Vec<_> = module.defined_functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["defined"]);
    }

    #[test]
    fn compute_predecessors_from_branches() {
        let mut f = IrFunction {
            name: "f".into(),
            blocks: vec![
                IrBlock {
                    id: "A".into(),
                    instructions: vec![Instruction::Branch {
                        conditional: false,
                        targets: vec!["B".into()],
                    }],
                    predecessors: vec![],
                },
                IrBlock {
                    id: "B".into(),
                    instructions: vec![Instruction::Return],
                    predecessors: vec![],
                },
            ],
        };
        compute_predecessors(&mut f);
        assert_eq!(f.block("B").unwrap().predecessors, vec!["A".to_string()]);
        assert!(f.block("A").unwrap().predecessors.is_empty());
    }

    #[test]
    fn compute_predecessors_from_switch_records_all_cases() {
        let mut f = IrFunction {
            name: "f".into(),
            blocks: vec![
                IrBlock {
                    id: "A".into(),
                    instructions: vec![Instruction::Switch {
                        operand: Operand::new("%x", "i32"),
                        cases: vec![
                            (Operand::new("0", "i32"), "B".into()),
                            (Operand::new("1", "i32"), "C".into()),
                        ],
                        default: "D".into(),
                    }],
                    predecessors: vec![],
                },
                IrBlock { id: "B".into(), instructions: vec![Instruction::Return], predecessors: vec![] },
                IrBlock { id: "C".into(), instructions: vec![Instruction::Return], predecessors: vec![] },
                IrBlock { id: "D".into(), instructions: vec![Instruction::Return], predecessors: vec![] },
            ],
        };
        compute_predecessors(&mut f);
        assert_eq!(f.block("B").unwrap().predecessors, vec!["A".to_string()]);
        assert_eq!(f.block("C").unwrap().predecessors, vec!["A".to_string()]);
        assert_eq!(f.block("D").unwrap().predecessors, vec!["A".to_string()]);
    }
}
