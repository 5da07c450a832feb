//! End-to-end scenarios driving the whole pipeline from a textual IR
//! source through to provenance streams, the way a real deployment would
//! call `analyze_module` directly rather than through the CLI.

use irtrace_analyzer::config::Config;
use irtrace_analyzer::ir::textual::TextualIrSource;
use irtrace_analyzer::pipeline::analyze_module;
use irtrace_analyzer::provenance::reduce_all_paths;

fn analyze(src: &str) -> irtrace_analyzer::pipeline::ModuleAnalysis {
    let source = TextualIrSource::new(src);
    let config = Config::default();
    analyze_module(&source, &config).expect("pipeline should succeed on well-formed IR")
}

#[test]
fn s1_straight_line_function_yields_one_path_and_a_chained_ddg() {
    let module = analyze(
        r#"
        fn @main {
        entry:
          %1 = alloca i32
          store i32 %x , ptr %1
          %2 = load i32 , ptr %1
          %3 = trunc i32 %2 to i8
          ret
        }
        "#,
    );
    assert_eq!(module.functions.len(), 1);
    let f = &module.functions[0];
    assert_eq!(f.canonical_paths, vec![vec!["entry".to_string()]]);
    assert!(!f.loop_analysis.has_loop);

    assert!(module.ddg.edges_from("%x").iter().any(|(dst, label)| dst == "%1" && label == "store"));
    assert!(module.ddg.edges_from("%1").iter().any(|(dst, label)| dst == "%2" && label == "load"));
    assert!(module.ddg.edges_from("%2").iter().any(|(dst, label)| dst == "%3" && label == "truncate"));
}

#[test]
fn s2_diamond_branch_yields_two_canonical_paths() {
    let module = analyze(
        r#"
        fn @branchy {
        A:
          %c = icmp eq i32 %x , %y
          br i1 %c , label %B , label %C
        B:
          br label %D
        C:
          br label %D
        D:
          ret
        }
        "#,
    );
    let f = &module.functions[0];
    assert_eq!(
        f.canonical_paths,
        vec![
            vec!["A".to_string(), "B".to_string(), "D".to_string()],
            vec!["A".to_string(), "C".to_string(), "D".to_string()],
        ]
    );
}

#[test]
fn s3_single_loop_canonical_path_exits_without_reentering_header() {
    let module = analyze(
        r#"
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
        "#,
    );
    let f = &module.functions[0];
    assert!(f.loop_analysis.has_loop);
    assert!(f.loop_analysis.is_header(&"B".to_string()));
    assert_eq!(
        f.canonical_paths,
        vec![vec!["A".to_string(), "B".to_string(), "D".to_string()]]
    );
    assert!(!f.truncated);
}

#[test]
fn s6_inline_asm_block_contributes_no_ddg_edge_but_stays_visible() {
    let module = analyze(
        r#"
        fn @g {
        entry:
          %1 = call i32 @foo ( i32 %x )
          call void asm ( i32 %1 )
          ret
        }
        "#,
    );
    let f = &module.functions[0];
    let entry = &f.abbs["entry"];
    assert!(entry.has_inline_asm);
    assert_eq!(entry.instructions.len(), 2);
    assert!(module.ddg.edges_from("%x").iter().any(|(dst, _)| dst == "%1"));
}

#[test]
fn provenance_unifies_file_handle_through_a_full_module_run() {
    let module = analyze(
        r#"
        fn @main {
        entry:
          %f = call ptr @fopen ( ptr %path )
          store ptr %f , ptr %slot
          %g = load ptr , ptr %slot
          %n = call i32 @fread ( ptr %g )
          call i32 @fclose ( ptr %f )
          ret
        }
        "#,
    );
    let f = &module.functions[0];
    let config = Config::default();
    let streams = reduce_all_paths(
        &f.canonical_paths,
        &f.abbs,
        &config.relevant_functions,
        &module.ddg,
        &config.process_name,
    );
    assert_eq!(streams.len(), 1);
    let stream = &streams[0];
    assert_eq!(stream.first().unwrap().id, "process_name_start");
    assert_eq!(stream.last().unwrap().id, "process_name_exit");

    let fopen_id = &stream[1].id;
    let fread_id = &stream[2].id;
    let fclose_id = &stream[3].id;
    assert_eq!(fopen_id, fclose_id);
    assert_eq!(fopen_id, fread_id);
}

#[test]
fn declarations_are_skipped_and_contribute_nothing() {
    let module = analyze("fn @decl {\n}\n");
    assert!(module.functions.is_empty());
    assert_eq!(module.ddg.edge_count(), 0);
}

#[test]
fn config_process_name_override_flows_into_the_seed_node() {
    let module = analyze(
        r#"
        fn @main {
        entry:
          ret
        }
        "#,
    );
    let f = &module.functions[0];
    let mut config = Config::default();
    config.process_name = "myproc".to_string();
    let streams = reduce_all_paths(
        &f.canonical_paths,
        &f.abbs,
        &config.relevant_functions,
        &module.ddg,
        &config.process_name,
    );
    assert_eq!(streams[0].first().unwrap().id, "myproc_start");
    assert_eq!(streams[0].last().unwrap().id, "myproc_exit");
}
