//! Orchestration: ties the IR adapter, DDG builder, CFG extractor, loop
//! analyzer, and path engine together per function, then merges per-
//! function DDG fragments into a module-level DDG. Each function gets its
//! own context rather than sharing mutable maps across the whole module.

use crate::cfg::loops::{analyze_loops, remove_back_edges, LoopAnalysis};
use crate::cfg::paths::{enumerate_canonical_paths, enumerate_loop_subpaths, expand_canonical_paths, InstantiatedPath, Path, PathLimits};
use crate::cfg::{build_abbs, Abb, Adjacency};
use crate::config::Config;
use crate::ddg::{build_function_ddg, Ddg};
use crate::ir::{BlockId, IrModule, IrSource};
use std::collections::HashMap;
use tracing::{info, warn};

/// Everything derived from one function: its ABBs, loop analysis, and
/// both path representations. Disjoint from every other function's state
/// (§5), so an implementation MAY process functions in parallel and merge
/// only the DDG fragment at the end.
pub struct FunctionAnalysis {
    pub name: String,
    pub abbs: HashMap<BlockId, Abb>,
    pub adjacency: Adjacency,
    pub loop_analysis: LoopAnalysis,
    pub canonical_paths: Vec<Path>,
    pub loop_subpaths: HashMap<BlockId, Vec<Path>>,
    pub instantiated_paths: Vec<InstantiatedPath>,
    pub truncated: bool,
}

/// The whole-module result: the merged DDG plus every function's
/// analysis, in module order.
pub struct ModuleAnalysis {
    pub ddg: Ddg,
    pub functions: Vec<FunctionAnalysis>,
}

/// Runs the full pipeline (U -> C1 ‖ C2a -> C2b -> C2c) over every defined
/// function in `source`, merging per-function DDG fragments into one
/// module-level graph.
pub fn analyze_module(source: &dyn IrSource, config: &Config) -> anyhow::Result<ModuleAnalysis> {
    let module: IrModule = source.load()?;
    let mut ddg = Ddg::new();
    let mut functions = Vec::new();

    for function in module.defined_functions() {
        info!(function = %function.name, "analyzing function");
        functions.push(analyze_function(function, &config.path_limits, &mut ddg));
    }

    Ok(ModuleAnalysis { ddg, functions })
}

fn analyze_function(
    function: &crate::ir::IrFunction,
    limits: &PathLimits,
    module_ddg: &mut Ddg,
) -> FunctionAnalysis {
    let mut function_ddg = Ddg::new();
    build_function_ddg(function, &mut function_ddg);
    module_ddg.merge(function_ddg);

    let extraction = build_abbs(function);
    let Some(root) = extraction.root_block_id.clone() else {
        warn!(function = %function.name, "function has no root block, skipping path enumeration");
        return FunctionAnalysis {
            name: function.name.clone(),
            abbs: extraction.abbs,
            adjacency: extraction.adjacency,
            loop_analysis: LoopAnalysis::default(),
            canonical_paths: Vec::new(),
            loop_subpaths: HashMap::new(),
            instantiated_paths: Vec::new(),
            truncated: false,
        };
    };

    let loop_analysis = analyze_loops(&extraction.adjacency, &root);
    let (canonical_paths, canonical_truncated) =
        enumerate_canonical_paths(&extraction.adjacency, &extraction.abbs, &loop_analysis, &root, limits);

    let dag = remove_back_edges(&extraction.adjacency, &loop_analysis.back_edges);
    let (loop_subpaths, subpaths_truncated) = enumerate_loop_subpaths(&dag, &loop_analysis, limits);
    let (instantiated_paths, expansion_truncated) =
        expand_canonical_paths(&canonical_paths, &loop_analysis, &loop_subpaths, limits);

    FunctionAnalysis {
        name: function.name.clone(),
        abbs: extraction.abbs,
        adjacency: extraction.adjacency,
        loop_analysis,
        canonical_paths,
        loop_subpaths,
        instantiated_paths,
        truncated: canonical_truncated || subpaths_truncated || expansion_truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::textual::TextualIrSource;

    #[test]
    fn analyzes_straight_line_module_end_to_end() {
        let src = TextualIrSource::new(
            r#"
            fn @main {
            entry:
              %1 = alloca i32
              store i32 %x , ptr %1
              %2 = load i32 , ptr %1
              ret
            }
            "#,
        );
        let config = Config::default();
        let result = analyze_module(&src, &config).unwrap();
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].canonical_paths, vec![vec!["entry".to_string()]]);
        assert!(result.ddg.edge_count() >= 2);
    }

    #[test]
    fn declarations_are_not_analyzed() {
        let src = TextualIrSource::new("fn @decl {\n}\n");
        let config = Config::default();
        let result = analyze_module(&src, &config).unwrap();
        assert!(result.functions.is_empty());
    }
}
