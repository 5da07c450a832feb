//! Provenance reducer (C3): maps calls along a path to provenance events
//! and unifies object identities using load/store/truncate reachability in
//! the DDG.

use crate::cfg::paths::{InstantiatedPath, Path, PathToken};
use crate::cfg::Abb;
use crate::ddg::Ddg;
use crate::ir::{BlockId, Instruction};
use std::collections::{HashMap, HashSet};

/// One entry of the relevant-function table: which artifact class a call
/// produces an event for, and which argument carries the object identity
/// (`-1` meaning "use the call's result").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantFunction {
    pub artifact: String,
    pub arg_index: i64,
}

impl RelevantFunction {
    pub fn result(artifact: impl Into<String>) -> Self {
        Self { artifact: artifact.into(), arg_index: -1 }
    }

    pub fn argument(artifact: impl Into<String>, index: i64) -> Self {
        Self { artifact: artifact.into(), arg_index: index }
    }
}

/// `function name -> RelevantFunction`, seeded per deployment.
#[derive(Debug, Clone, Default)]
pub struct RelevantFunctionTable(HashMap<String, RelevantFunction>);

impl RelevantFunctionTable {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: RelevantFunction) {
        self.0.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&RelevantFunction> {
        self.0.get(name)
    }
}

/// The built-in default table from §4.6: `open`/`read`/`write`/`close` and
/// their `f`-prefixed stdio equivalents, all on the `FILE` artifact class.
pub fn default_table() -> RelevantFunctionTable {
    let mut table = RelevantFunctionTable::new();
    table.insert("open", RelevantFunction::result("FILE"));
    table.insert("read", RelevantFunction::argument("FILE", 0));
    table.insert("write", RelevantFunction::argument("FILE", 0));
    table.insert("close", RelevantFunction::argument("FILE", 0));
    table.insert("fopen", RelevantFunction::result("FILE"));
    table.insert("fread", RelevantFunction::argument("FILE", 0));
    table.insert("fwrite", RelevantFunction::argument("FILE", 0));
    table.insert("fclose", RelevantFunction::argument("FILE", 0));
    table
}

/// One provenance event: `(action, artifact, id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceNode {
    pub action: String,
    pub artifact: String,
    pub id: String,
}

impl ProvenanceNode {
    fn new(action: impl Into<String>, artifact: impl Into<String>, id: impl Into<String>) -> Self {
        Self { action: action.into(), artifact: artifact.into(), id: id.into() }
    }
}

fn seed_node(process_name: &str) -> ProvenanceNode {
    ProvenanceNode::new("load", "PROCESS", format!("{process_name}_start"))
}

fn exit_node(process_name: &str) -> ProvenanceNode {
    ProvenanceNode::new("exit", "PROCESS", format!("{process_name}_exit"))
}

/// Walks `path`'s non-marker blocks in order, collecting every relevant
/// call as a (pre-unification) provenance node.
fn collect_events(
    blocks: impl Iterator<Item = BlockId>,
    abbs: &HashMap<BlockId, Abb>,
    table: &RelevantFunctionTable,
    process_name: &str,
) -> Vec<ProvenanceNode> {
    let mut stream = vec![seed_node(process_name)];

    for block_id in blocks {
        let Some(abb) = abbs.get(&block_id) else { continue };
        for instruction in &abb.instructions {
            let Instruction::Call { callee: Some(name), args, result, .. } = instruction else {
                continue;
            };
            let Some(entry) = table.get(name) else { continue };
            let id = if entry.arg_index < 0 {
                result.id.clone()
            } else {
                match args.get(entry.arg_index as usize) {
                    Some(arg) => arg.id.clone(),
                    None => continue,
                }
            };
            stream.push(ProvenanceNode::new(name.clone(), entry.artifact.clone(), id));
        }
    }

    stream.push(exit_node(process_name));
    stream
}

/// `checkLoadStoreReachable(src, dst)`: true iff `src == dst`, or a
/// directed path exists in `ddg` from `src` to `dst` using only
/// `load`/`store`/`truncate` edges. Reflexive and transitive by
/// construction (§8 property 7).
pub fn check_load_store_reachable(ddg: &Ddg, src: &str, dst: &str) -> bool {
    if src == dst {
        return true;
    }
    const RELEVANT: [&str; 3] = ["load", "store", "truncate"];
    let mut stack = vec![src.to_string()];
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(src.to_string());

    while let Some(node) = stack.pop() {
        for (next, label) in ddg.edges_from(&node) {
            if !RELEVANT.contains(&label.as_str()) {
                continue;
            }
            if next == dst {
                return true;
            }
            if visited.insert(next.clone()) {
                stack.push(next.clone());
            }
        }
    }
    false
}

/// Rewrites each node's id to the first identity in `unique` it is
/// load/store/truncate-reachable from, adding it to `unique` on first
/// sight otherwise. Stable across re-runs on the same inputs (§8 property
/// 8): no non-determinism is introduced (plain sequential scan, iteration
/// order of `unique` is insertion order via a `Vec`).
pub fn unify_identities(ddg: &Ddg, process_name: &str, mut stream: Vec<ProvenanceNode>) -> Vec<ProvenanceNode> {
    let mut unique: Vec<String> = vec![process_name.to_string()];

    for node in &mut stream {
        if let Some(existing) = unique.iter().find(|u| check_load_store_reachable(ddg, u, &node.id)) {
            node.id = existing.clone();
        } else {
            unique.push(node.id.clone());
        }
    }
    stream
}

/// Reduces one canonical path (a plain `Vec<BlockId>`) into its provenance
/// stream, with identity unification applied.
pub fn reduce_path(
    path: &Path,
    abbs: &HashMap<BlockId, Abb>,
    table: &RelevantFunctionTable,
    ddg: &Ddg,
    process_name: &str,
) -> Vec<ProvenanceNode> {
    let stream = collect_events(path.iter().cloned(), abbs, table, process_name);
    unify_identities(ddg, process_name, stream)
}

/// Reduces one instantiated path, treating `LOOP_START`/`LOOP_END` markers
/// as transparent to event collection (every block, including those
/// inside a loop body, is still walked in order).
pub fn reduce_instantiated_path(
    path: &InstantiatedPath,
    abbs: &HashMap<BlockId, Abb>,
    table: &RelevantFunctionTable,
    ddg: &Ddg,
    process_name: &str,
) -> Vec<ProvenanceNode> {
    let blocks = path.iter().filter_map(|token| match token {
        PathToken::Block(id) => Some(id.clone()),
        PathToken::LoopStart | PathToken::LoopEnd => None,
    });
    let stream = collect_events(blocks, abbs, table, process_name);
    unify_identities(ddg, process_name, stream)
}

/// Reduces only the first canonical path, preserved as an explicit opt-in
/// rather than the default — callers that want every path should use
/// [`reduce_all_paths`].
pub fn reduce_first_path(
    paths: &[Path],
    abbs: &HashMap<BlockId, Abb>,
    table: &RelevantFunctionTable,
    ddg: &Ddg,
    process_name: &str,
) -> Vec<ProvenanceNode> {
    match paths.first() {
        Some(path) => reduce_path(path, abbs, table, ddg, process_name),
        None => vec![seed_node(process_name), exit_node(process_name)],
    }
}

/// Reduces every canonical path, returning one stream per path.
pub fn reduce_all_paths(
    paths: &[Path],
    abbs: &HashMap<BlockId, Abb>,
    table: &RelevantFunctionTable,
    ddg: &Ddg,
    process_name: &str,
) -> Vec<Vec<ProvenanceNode>> {
    paths.iter().map(|path| reduce_path(path, abbs, table, ddg, process_name)).collect()
}
