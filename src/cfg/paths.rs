//! Path engine (C2c): canonical root-to-leaf enumeration, per-loop
//! sub-path enumeration, and Cartesian-product expansion into instantiated
//! paths bracketed with `LOOP_START`/`LOOP_END`.

use super::{Abb, Adjacency};
use super::loops::LoopAnalysis;
use crate::ir::BlockId;
use std::collections::HashMap;
use tracing::warn;

/// A root-to-leaf (or header-to-latch) sequence of block ids.
pub type Path = Vec<BlockId>;

/// One token of an instantiated path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Block(BlockId),
    LoopStart,
    LoopEnd,
}

pub type InstantiatedPath = Vec<PathToken>;

/// Caps on path enumeration and expansion, so a pathological loop nest
/// can't grow the result set without bound (§5, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLimits {
    pub max_paths: usize,
    pub max_depth: usize,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self { max_paths: 10_000, max_depth: 1_000 }
    }
}

impl PathLimits {
    pub fn new(max_paths: usize, max_depth: usize) -> Self {
        Self { max_paths, max_depth }
    }

    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Tight bounds for interactive/CLI use.
    pub fn quick_analysis() -> Self {
        Self { max_paths: 1_000, max_depth: 100 }
    }

    /// Loose bounds for offline batch analysis.
    pub fn thorough() -> Self {
        Self { max_paths: 100_000, max_depth: 10_000 }
    }
}

/// Enumerates canonical root-to-leaf paths. Dispatches to the monolithic
/// traversal when `loop_analysis.has_loop` is false and the loop-aware
/// traversal otherwise — callers cannot select the wrong one (§9 (d)).
///
/// Returns the paths found and whether enumeration stopped early due to
/// `limits`.
pub fn enumerate_canonical_paths(
    adjacency: &Adjacency,
    abbs: &HashMap<BlockId, Abb>,
    loop_analysis: &LoopAnalysis,
    root: &BlockId,
    limits: &PathLimits,
) -> (Vec<Path>, bool) {
    let mut out = Vec::new();
    let mut truncated = false;
    let mut path = Vec::new();

    if loop_analysis.has_loop {
        let mut visited_headers = std::collections::HashSet::new();
        dfs_loop_aware(root, adjacency, abbs, loop_analysis, &mut visited_headers, &mut path, limits, &mut out, &mut truncated);
    } else {
        dfs_monolithic(root, adjacency, &mut path, limits, &mut out, &mut truncated);
    }

    if truncated {
        warn!(found = out.len(), "canonical path enumeration truncated by limits");
    }
    (out, truncated)
}

fn dfs_monolithic(
    current: &BlockId,
    adjacency: &Adjacency,
    path: &mut Path,
    limits: &PathLimits,
    out: &mut Vec<Path>,
    truncated: &mut bool,
) {
    if *truncated || out.len() >= limits.max_paths {
        *truncated = true;
        return;
    }
    if path.len() >= limits.max_depth {
        *truncated = true;
        return;
    }

    path.push(current.clone());
    let children = adjacency.get(current).cloned().unwrap_or_default();
    if children.is_empty() {
        out.push(path.clone());
    } else {
        for child in children {
            dfs_monolithic(&child, adjacency, path, limits, out, truncated);
            if *truncated {
                break;
            }
        }
    }
    path.pop();
}

fn dfs_loop_aware(
    current: &BlockId,
    adjacency: &Adjacency,
    abbs: &HashMap<BlockId, Abb>,
    loop_analysis: &LoopAnalysis,
    visited_headers: &mut std::collections::HashSet<BlockId>,
    path: &mut Path,
    limits: &PathLimits,
    out: &mut Vec<Path>,
    truncated: &mut bool,
) {
    if *truncated || out.len() >= limits.max_paths {
        *truncated = true;
        return;
    }
    if path.len() >= limits.max_depth {
        *truncated = true;
        return;
    }

    let is_header = loop_analysis.is_header(current);
    if is_header && visited_headers.contains(current) {
        // Already entered this header on this path: stop without extending
        // and without recording anything — this branch is a dead end, not a
        // completed canonical path.
        return;
    }

    path.push(current.clone());
    if is_header {
        visited_headers.insert(current.clone());
    }

    let children: Vec<BlockId> = if is_header {
        match abbs.get(current) {
            Some(abb) if abb.is_conditional => abb.false_block.iter().cloned().collect(),
            Some(abb) if abb.next_block.is_some() => vec![abb.next_block.clone().unwrap()],
            // Switch-headers (or anything else) fall through to "continue
            // along all children" per the header rule's third case — the
            // already-entered check above is what keeps the looping arm
            // from producing a spurious path, not filtering children here.
            _ => adjacency.get(current).cloned().unwrap_or_default(),
        }
    } else {
        adjacency.get(current).cloned().unwrap_or_default()
    };

    if children.is_empty() {
        out.push(path.clone());
    } else {
        for child in children {
            dfs_loop_aware(&child, adjacency, abbs, loop_analysis, visited_headers, path, limits, out, truncated);
            if *truncated {
                break;
            }
        }
    }

    if is_header {
        visited_headers.remove(current);
    }
    path.pop();
}

/// For every back-edge `(latch, header)`, DFS the DAG from `header` to
/// `latch`, accumulating `loopingPaths[header]`.
pub fn enumerate_loop_subpaths(
    dag: &Adjacency,
    loop_analysis: &LoopAnalysis,
    limits: &PathLimits,
) -> (HashMap<BlockId, Vec<Path>>, bool) {
    let mut result: HashMap<BlockId, Vec<Path>> = HashMap::new();
    let mut truncated = false;

    for (latch, header) in loop_analysis.back_edge_pairs() {
        let mut out = Vec::new();
        let mut path = Vec::new();
        dfs_to_target(header, latch, dag, &mut path, limits, &mut out, &mut truncated);
        result.entry(header.clone()).or_default().extend(out);
        if truncated {
            break;
        }
    }

    (result, truncated)
}

fn dfs_to_target(
    current: &BlockId,
    target: &BlockId,
    dag: &Adjacency,
    path: &mut Path,
    limits: &PathLimits,
    out: &mut Vec<Path>,
    truncated: &mut bool,
) {
    if *truncated || out.len() >= limits.max_paths {
        *truncated = true;
        return;
    }
    if path.len() >= limits.max_depth {
        *truncated = true;
        return;
    }

    path.push(current.clone());
    if current == target {
        out.push(path.clone());
    } else {
        let children = dag.get(current).cloned().unwrap_or_default();
        for child in children {
            dfs_to_target(&child, target, dag, path, limits, out, truncated);
            if *truncated {
                break;
            }
        }
    }
    path.pop();
}

fn cap(expanded: &mut Vec<InstantiatedPath>, limits: &PathLimits, truncated: &mut bool) {
    if expanded.len() > limits.max_paths {
        expanded.truncate(limits.max_paths);
        *truncated = true;
    }
}

/// Expands a block sequence (a canonical path, or a sub-path body with its
/// header already stripped) into instantiated paths, recursing into nested
/// loop bodies.
fn expand_blocks(
    blocks: &[BlockId],
    loop_analysis: &LoopAnalysis,
    looping_paths: &HashMap<BlockId, Vec<Path>>,
    limits: &PathLimits,
    truncated: &mut bool,
) -> Vec<InstantiatedPath> {
    let mut expanded: Vec<InstantiatedPath> = vec![Vec::new()];

    for block in blocks {
        if *truncated {
            break;
        }
        if !loop_analysis.is_header(block) {
            for path in &mut expanded {
                path.push(PathToken::Block(block.clone()));
            }
            continue;
        }

        let sub_paths = looping_paths.get(block).cloned().unwrap_or_default();
        let body_options: Vec<InstantiatedPath> = if sub_paths.is_empty() {
            vec![Vec::new()]
        } else {
            let mut options = Vec::new();
            for sub_path in &sub_paths {
                let rest = if sub_path.is_empty() { &sub_path[..] } else { &sub_path[1..] };
                let sub_expansions = expand_blocks(rest, loop_analysis, looping_paths, limits, truncated);
                options.extend(sub_expansions);
                if *truncated {
                    break;
                }
            }
            options
        };

        let mut new_expanded = Vec::with_capacity(expanded.len() * body_options.len().max(1));
        for prefix in &expanded {
            for body in &body_options {
                let mut candidate = prefix.clone();
                candidate.push(PathToken::LoopStart);
                candidate.push(PathToken::Block(block.clone()));
                candidate.extend(body.iter().cloned());
                candidate.push(PathToken::LoopEnd);
                new_expanded.push(candidate);
            }
        }
        expanded = new_expanded;
        cap(&mut expanded, limits, truncated);
    }

    expanded
}

/// Expands every canonical path in `canonical` into its instantiated
/// paths, concatenating the results and capping the total at
/// `limits.max_paths`.
pub fn expand_canonical_paths(
    canonical: &[Path],
    loop_analysis: &LoopAnalysis,
    looping_paths: &HashMap<BlockId, Vec<Path>>,
    limits: &PathLimits,
) -> (Vec<InstantiatedPath>, bool) {
    let mut all = Vec::new();
    let mut truncated = false;

    for path in canonical {
        let expansions = expand_blocks(path, loop_analysis, looping_paths, limits, &mut truncated);
        all.extend(expansions);
        cap(&mut all, limits, &mut truncated);
        if truncated {
            break;
        }
    }

    if truncated {
        warn!(found = all.len(), "path expansion truncated by limits");
    }
    (all, truncated)
}
