//! irtrace-analyzer: a data-dependency graph and provenance-path analyzer
//! for typed, SSA-form IR.
//!
//! Pipeline: [`ir`] (adapter) feeds [`ddg`] (C1) and [`cfg`] (C2a/b/c) in
//! lock-step, [`provenance`] (C3) reduces the resulting paths against a
//! [`config::Config`]'s relevant-function table, and [`serialize`] writes
//! the CSV artifacts. [`pipeline`] ties the whole thing together per
//! module.

pub mod cfg;
pub mod cli;
pub mod config;
pub mod ddg;
pub mod error;
pub mod ir;
pub mod output;
pub mod pipeline;
pub mod provenance;
pub mod serialize;
