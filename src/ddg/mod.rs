//! Data-Dependency Graph builder (C1).
//!
//! One DDG per function: `ValueId -> ordered sequence of (ValueId, EdgeLabel)`
//! edges, plus a sibling type map populated from every value the builder
//! observes. Built in lock-step with the CFG extractor over the same
//! instruction stream (a single forward pass per block).

use crate::ir::{Instruction, IrFunction, Operand, TypeId, ValueId, BADREF};
use std::collections::HashMap;
use tracing::warn;

/// A DDG edge label. Kept as an owned `String` rather than a closed enum:
/// several variants (`icmp:<idx> <pred>`, `call:<name>`, unmodeled
/// mnemonics) are parameterized by data the opcode carries, so a fixed enum
/// would need its own escape hatch anyway. Construct via the helpers below
/// rather than formatting ad hoc, so the label grammar stays centralized.
pub type EdgeLabel = String;

pub mod labels {
    use super::EdgeLabel;

    pub fn store() -> EdgeLabel {
        "store".to_string()
    }

    pub fn load() -> EdgeLabel {
        "load".to_string()
    }

    pub fn truncate() -> EdgeLabel {
        "truncate".to_string()
    }

    pub fn getelementptr() -> EdgeLabel {
        "getelementptr".to_string()
    }

    pub fn icmp(operand_index: usize, predicate: &str) -> EdgeLabel {
        format!("icmp:{operand_index} {predicate}")
    }

    pub fn call(callee: &str) -> EdgeLabel {
        format!("call:{callee}")
    }

    pub fn mnemonic(raw: &str) -> EdgeLabel {
        raw.to_string()
    }
}

/// The data-dependency graph for one function (or, once merged by the
/// pipeline, a whole module).
#[derive(Debug, Clone, Default)]
pub struct Ddg {
    edges: HashMap<ValueId, Vec<(ValueId, EdgeLabel)>>,
    type_map: HashMap<ValueId, TypeId>,
}

impl Ddg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or overwrites) the type of a value. Called for every
    /// operand the builder observes, not just results, so the type map
    /// stays complete even for values that never appear as an edge source.
    pub fn record_type(&mut self, operand: &Operand) {
        if operand.is_badref() {
            return;
        }
        self.type_map.insert(operand.id.clone(), operand.ty.clone());
    }

    /// Adds a directed edge `src --label--> dst`. Rejected (and logged) if
    /// either endpoint is the `<badref>` sentinel. Duplicate edges are
    /// preserved — this is a multigraph, not a set.
    pub fn add_edge(&mut self, src: &Operand, dst: &Operand, label: EdgeLabel) {
        if src.is_badref() || dst.is_badref() {
            warn!(label = %label, "dropping DDG edge touching <badref>");
            return;
        }
        self.edges.entry(src.id.clone()).or_default().push((dst.id.clone(), label));
    }

    pub fn edges_from(&self, value: &str) -> &[(ValueId, EdgeLabel)] {
        self.edges.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn type_of(&self, value: &str) -> Option<&TypeId> {
        self.type_map.get(value)
    }

    /// All `(src, dst, label)` triples, in insertion order within each
    /// source's adjacency list but with sources visited in arbitrary
    /// (HashMap) order — callers that need a stable order should sort.
    pub fn iter_edges(&self) -> impl Iterator<Item = (&ValueId, &ValueId, &EdgeLabel)> {
        self.edges.iter().flat_map(|(src, outs)| outs.iter().map(move |(dst, label)| (src, dst, label)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Folds `other`'s edges and types into `self`. Used by the pipeline to
    /// merge per-function fragments into a module-level DDG.
    pub fn merge(&mut self, other: Ddg) {
        for (value, ty) in other.type_map {
            self.type_map.entry(value).or_insert(ty);
        }
        for (src, outs) in other.edges {
            self.edges.entry(src).or_default().extend(outs);
        }
    }
}

/// Runs the per-instruction DDG policy over every block of `function`,
/// recording edges and types into `ddg`.
pub fn build_function_ddg(function: &IrFunction, ddg: &mut Ddg) {
    for block in &function.blocks {
        for instruction in &block.instructions {
            build_instruction_ddg(instruction, ddg);
        }
    }
}

fn build_instruction_ddg(instruction: &Instruction, ddg: &mut Ddg) {
    match instruction {
        Instruction::Alloca { result } => {
            ddg.record_type(result);
        }
        Instruction::Store { val, ptr } => {
            ddg.record_type(val);
            ddg.record_type(ptr);
            ddg.add_edge(val, ptr, labels::store());
        }
        Instruction::Load { ptr, result } => {
            ddg.record_type(ptr);
            ddg.record_type(result);
            ddg.add_edge(ptr, result, labels::load());
        }
        Instruction::Call { callee, args, result, inline_asm } => {
            ddg.record_type(result);
            for arg in args {
                ddg.record_type(arg);
            }
            if *inline_asm {
                return;
            }
            let label = labels::call(callee.as_deref().unwrap_or(BADREF));
            for arg in args {
                ddg.add_edge(arg, result, label.clone());
            }
        }
        Instruction::GetElementPtr { operands, result } => {
            ddg.record_type(result);
            for operand in operands {
                ddg.record_type(operand);
                ddg.add_edge(operand, result, labels::getelementptr());
            }
        }
        Instruction::Trunc { src, result } => {
            ddg.record_type(src);
            ddg.record_type(result);
            ddg.add_edge(src, result, labels::truncate());
        }
        Instruction::Return => {}
        Instruction::Branch { .. } => {}
        Instruction::ICmp { predicate, a, b, result } => {
            ddg.record_type(a);
            ddg.record_type(b);
            ddg.record_type(result);
            ddg.add_edge(a, result, labels::icmp(0, predicate));
            ddg.add_edge(b, result, labels::icmp(1, predicate));
        }
        Instruction::Switch { operand, .. } => {
            // Unmodeled in the DDG: a switch's control-transfer is entirely
            // a CFG concern (see the loop/path engine), and it has no
            // single result value to wire a data edge to.
            ddg.record_type(operand);
        }
        Instruction::Other { operands, result, .. } => {
            for operand in operands {
                ddg.record_type(operand);
            }
            let Some(result) = result else { return };
            ddg.record_type(result);
            let label = match instruction {
                Instruction::Other { mnemonic, .. } => labels::mnemonic(mnemonic),
                _ => unreachable!(),
            };
            for operand in operands {
                ddg.add_edge(operand, result, label.clone());
            }
        }
    }
}
