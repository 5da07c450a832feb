use anyhow::{Context, Result};
use clap::Parser;
use irtrace_analyzer::cli::{AnalyzeArgs, Cli, Commands};
use irtrace_analyzer::config::Config;
use irtrace_analyzer::error::AnalyzerError;
use irtrace_analyzer::ir::textual::TextualIrSource;
use irtrace_analyzer::pipeline::analyze_module;
use irtrace_analyzer::provenance::{reduce_all_paths, ProvenanceNode};
use irtrace_analyzer::{output, serialize};
use std::fs::File;
use std::path::Path;

fn create_output_file(path: &Path) -> Result<File, AnalyzerError> {
    File::create(path).map_err(|source| AnalyzerError::OutputIo { path: path.display().to_string(), source })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .init();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(process_name) = args.process_name {
        config.process_name = process_name;
    }

    let source = TextualIrSource::from_path(&args.input)
        .with_context(|| format!("reading IR source {}", args.input.display()))?;

    output::header(&format!("analyzing {}", args.input.display()));
    let analysis = analyze_module(&source, &config).context("running analysis pipeline")?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let ddg_path = args.out_dir.join("ddgedges.txt");
    let ddg_file = create_output_file(&ddg_path)?;
    serialize::write_ddg_csv(&analysis.ddg, ddg_file)
        .map_err(|source| AnalyzerError::OutputIo { path: ddg_path.display().to_string(), source })?;

    let mut all_provenance: Vec<ProvenanceNode> = Vec::new();
    for function in &analysis.functions {
        if function.truncated {
            output::warn(&format!("{}: path enumeration truncated by limits", function.name));
        }
        eprintln!("-- {} --", function.name);
        output::dump_adjacency(&function.adjacency);
        output::dump_back_edges(&function.loop_analysis);
        output::dump_looping_blocks(&function.loop_analysis);
        output::dump_paths(&function.canonical_paths);
        output::dump_instantiated_paths(&function.instantiated_paths);

        let streams = reduce_all_paths(
            &function.canonical_paths,
            &function.abbs,
            &config.relevant_functions,
            &analysis.ddg,
            &config.process_name,
        );
        for stream in streams {
            all_provenance.extend(stream);
        }
    }

    let prov_path = args.out_dir.join("prov_edges.txt");
    let prov_file = create_output_file(&prov_path)?;
    serialize::write_provenance_csv(&all_provenance, prov_file)
        .map_err(|source| AnalyzerError::OutputIo { path: prov_path.display().to_string(), source })?;

    output::info(&format!("wrote {} and {}", ddg_path.display(), prov_path.display()));
    Ok(())
}
