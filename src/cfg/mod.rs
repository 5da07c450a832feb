//! CFG extraction (C2a): turns a function's blocks into Augmented Basic
//! Blocks (ABBs) plus the flat block adjacency the loop analyzer and path
//! engine operate on.

pub mod loops;
pub mod paths;

use crate::ir::{BlockId, Instruction, IrFunction};
use std::collections::HashMap;

/// `BlockId -> ordered successor list`, flattened from predecessor
/// relations. Every block the extractor visits appears as a key, even leaf
/// blocks with an empty adjacency.
pub type Adjacency = HashMap<BlockId, Vec<BlockId>>;

/// Augmented Basic Block: a block plus its cached branch shape, inline-asm
/// and call bookkeeping, and predecessor list.
///
/// Invariant: exactly one of `is_conditional` (both `true_block`/
/// `false_block` set), plain fallthrough (`next_block` set), a switch
/// (`switch_targets` non-empty), or terminal (none of the above) holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abb {
    pub block_id: BlockId,
    pub is_root: bool,
    pub is_conditional: bool,
    pub has_inline_asm: bool,
    pub true_block: Option<BlockId>,
    pub false_block: Option<BlockId>,
    pub next_block: Option<BlockId>,
    pub switch_targets: Vec<BlockId>,
    /// Call instructions, preserved verbatim and in order — including
    /// inline-asm calls, which contribute no DDG edges but must still be
    /// visible to later inspection.
    pub instructions: Vec<Instruction>,
    /// Names of directly-called functions (indirect and inline-asm calls
    /// are excluded).
    pub functions: Vec<String>,
    pub parents: Vec<BlockId>,
}

impl Abb {
    fn new(block_id: BlockId) -> Self {
        Self {
            block_id,
            is_root: false,
            is_conditional: false,
            has_inline_asm: false,
            true_block: None,
            false_block: None,
            next_block: None,
            switch_targets: Vec::new(),
            instructions: Vec::new(),
            functions: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_conditional && self.next_block.is_none() && self.switch_targets.is_empty()
    }
}

/// The CFG extractor's output for one function.
pub struct CfgExtraction {
    pub abbs: HashMap<BlockId, Abb>,
    pub adjacency: Adjacency,
    pub root_block_id: Option<BlockId>,
}

/// Builds the ABB map and flat adjacency for `function` in a single forward
/// pass over its blocks.
pub fn build_abbs(function: &IrFunction) -> CfgExtraction {
    let mut abbs: HashMap<BlockId, Abb> = HashMap::new();
    let mut adjacency: Adjacency = HashMap::new();
    let mut root_block_id = None;

    for block in &function.blocks {
        let mut abb = Abb::new(block.id.clone());

        match block.predecessors.len() {
            1 => {
                abb.parents.push(block.predecessors[0].clone());
            }
            0 => {
                abb.is_root = true;
                if root_block_id.is_none() {
                    root_block_id = Some(block.id.clone());
                }
            }
            _ => {
                abb.parents.extend(block.predecessors.iter().cloned());
            }
        }
        for parent in &block.predecessors {
            adjacency.entry(parent.clone()).or_default().push(block.id.clone());
        }
        adjacency.entry(block.id.clone()).or_default();

        for instruction in &block.instructions {
            match instruction {
                Instruction::Call { callee, inline_asm, .. } => {
                    abb.instructions.push(instruction.clone());
                    if *inline_asm {
                        abb.has_inline_asm = true;
                    } else if let Some(name) = callee {
                        abb.functions.push(name.clone());
                    }
                }
                Instruction::Branch { conditional, targets } => {
                    if *conditional {
                        abb.is_conditional = true;
                        abb.true_block = targets.first().cloned();
                        abb.false_block = targets.get(1).cloned();
                    } else {
                        abb.next_block = targets.first().cloned();
                    }
                }
                Instruction::Switch { cases, default, .. } => {
                    let mut targets: Vec<BlockId> = cases.iter().map(|(_, t)| t.clone()).collect();
                    targets.push(default.clone());
                    abb.switch_targets = targets;
                }
                _ => {}
            }
        }

        abbs.insert(block.id.clone(), abb);
    }

    CfgExtraction { abbs, adjacency, root_block_id }
}
