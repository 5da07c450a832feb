//! Human-readable diagnostics: colored status lines plus the adjacency/
//! path/back-edge dumps. Not part of the stable interface (§6) — useful
//! for eyeballing a run, never parsed downstream.

use crate::cfg::loops::LoopAnalysis;
use crate::cfg::paths::{InstantiatedPath, Path, PathToken};
use crate::cfg::Adjacency;
use crate::ir::BlockId;
use std::collections::HashMap;
use std::io::IsTerminal;

pub const RED: &str = "\x1b[0;31m";
pub const GREEN: &str = "\x1b[0;32m";
pub const YELLOW: &str = "\x1b[1;33m";
pub const BOLD: &str = "\x1b[1m";
pub const NC: &str = "\x1b[0m";

#[inline]
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

pub fn info(msg: &str) {
    let (c, r) = if is_terminal() { (GREEN, NC) } else { ("", "") };
    println!("{c}[INFO]{r} {msg}");
}

pub fn warn(msg: &str) {
    let (c, r) = if is_terminal() { (YELLOW, NC) } else { ("", "") };
    eprintln!("{c}[WARN]{r} {msg}");
}

pub fn error(msg: &str) {
    let (c, r) = if is_terminal() { (RED, NC) } else { ("", "") };
    eprintln!("{c}[ERROR]{r} {msg}");
}

pub fn header(msg: &str) {
    let (c, r) = if is_terminal() { (BOLD, NC) } else { ("", "") };
    println!("{c}===>{r} {msg}");
}

/// Dumps `BlockId -> [successors]` to stderr, one line per block.
pub fn dump_adjacency(adjacency: &Adjacency) {
    let mut blocks: Vec<&BlockId> = adjacency.keys().collect();
    blocks.sort();
    for block in blocks {
        eprintln!("  {} -> {:?}", block, adjacency[block]);
    }
}

/// Dumps the back-edge table, one `latch -> header` pair per line.
pub fn dump_back_edges(analysis: &LoopAnalysis) {
    let mut pairs: Vec<&(BlockId, BlockId)> = analysis.back_edge_pairs().collect();
    pairs.sort();
    for (latch, header) in pairs {
        eprintln!("  {latch} -> {header} (back-edge)");
    }
}

/// Dumps the discovered loop headers.
pub fn dump_looping_blocks(analysis: &LoopAnalysis) {
    let mut headers = analysis.headers.clone();
    headers.sort();
    for header in headers {
        eprintln!("  {header} (loop header)");
    }
}

/// Dumps canonical paths, one per line, blocks joined with `->`.
pub fn dump_paths(paths: &[Path]) {
    for path in paths {
        eprintln!("  {}", path.join(" -> "));
    }
}

/// Dumps instantiated paths, rendering `LOOP_START`/`LOOP_END` markers
/// literally alongside block ids.
pub fn dump_instantiated_paths(paths: &[InstantiatedPath]) {
    for path in paths {
        let rendered: Vec<String> = path
            .iter()
            .map(|token| match token {
                PathToken::Block(id) => id.clone(),
                PathToken::LoopStart => "LOOP_START".to_string(),
                PathToken::LoopEnd => "LOOP_END".to_string(),
            })
            .collect();
        eprintln!("  {}", rendered.join(" -> "));
    }
}

/// Dumps `header -> [sub-paths]` for the loop sub-path table.
pub fn dump_loop_subpaths(subpaths: &HashMap<BlockId, Vec<Path>>) {
    let mut headers: Vec<&BlockId> = subpaths.keys().collect();
    headers.sort();
    for header in headers {
        for sub_path in &subpaths[header] {
            eprintln!("  {header}: {}", sub_path.join(" -> "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_adjacency_does_not_panic_on_empty_graph() {
        dump_adjacency(&Adjacency::new());
    }

    #[test]
    fn dump_back_edges_does_not_panic_on_empty_analysis() {
        dump_back_edges(&LoopAnalysis::default());
    }
}
