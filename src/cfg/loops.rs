//! Loop analysis (C2b): three-color DFS over the block adjacency to find
//! back-edges and loop headers, and derivation of the back-edge-free DAG.

use super::Adjacency;
use crate::ir::BlockId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Result of the three-color DFS: whether any loop exists, the unique
/// headers in discovery order, and the back-edge multimap keyed by latch.
#[derive(Debug, Clone, Default)]
pub struct LoopAnalysis {
    pub has_loop: bool,
    pub headers: Vec<BlockId>,
    /// Keyed by the latch (`from`): a latch block that closes two distinct
    /// loop headers gets both entries rather than colliding (§9 (a)).
    pub back_edges: HashMap<BlockId, Vec<(BlockId, BlockId)>>,
}

impl LoopAnalysis {
    pub fn is_header(&self, block: &str) -> bool {
        self.headers.iter().any(|h| h == block)
    }

    pub fn back_edge_pairs(&self) -> impl Iterator<Item = &(BlockId, BlockId)> {
        self.back_edges.values().flatten()
    }
}

/// Runs the three-color DFS from `root` over `adjacency`, using an explicit
/// stack rather than native recursion (required by the recursion-bounding
/// policy for this subsystem).
pub fn analyze_loops(adjacency: &Adjacency, root: &BlockId) -> LoopAnalysis {
    let mut analysis = LoopAnalysis::default();
    if !adjacency.contains_key(root) {
        return analysis;
    }

    let mut color: HashMap<BlockId, Color> = HashMap::new();
    let mut header_seen: HashSet<BlockId> = HashSet::new();
    let mut stack: Vec<(BlockId, usize)> = vec![(root.clone(), 0)];
    color.insert(root.clone(), Color::Gray);

    while !stack.is_empty() {
        let (node, idx) = {
            let frame = stack.last().unwrap();
            (frame.0.clone(), frame.1)
        };
        let neighbors = adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[]);

        if idx < neighbors.len() {
            let next = neighbors[idx].clone();
            stack.last_mut().unwrap().1 += 1;

            match color.get(&next).copied().unwrap_or(Color::White) {
                Color::White => {
                    color.insert(next.clone(), Color::Gray);
                    stack.push((next, 0));
                }
                Color::Gray => {
                    if header_seen.insert(next.clone()) {
                        analysis.headers.push(next.clone());
                    }
                    analysis.back_edges.entry(node.clone()).or_default().push((node, next));
                }
                Color::Black => {}
            }
        } else {
            color.insert(node, Color::Black);
            stack.pop();
        }
    }

    analysis.has_loop = !analysis.headers.is_empty();
    analysis
}

/// Derives the DAG adjacency: `adjacency` with one occurrence of each
/// recorded back-edge's target removed from its source's successor list.
pub fn remove_back_edges(adjacency: &Adjacency, back_edges: &HashMap<BlockId, Vec<(BlockId, BlockId)>>) -> Adjacency {
    let mut dag = adjacency.clone();
    for edges in back_edges.values() {
        for (from, to) in edges {
            if let Some(successors) = dag.get_mut(from) {
                if let Some(pos) = successors.iter().position(|b| b == to) {
                    successors.remove(pos);
                }
            }
        }
    }
    dag
}
