//! The structs
//!
use std::collections::BTreeMap;

/// How the result is reported, as set on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputOptions {
    /// exit with status 1 when the brain is split
    pub strict: bool,
    /// print the masters and their nodes, also when the brain is not split
    pub print: bool,
    pub json: bool,
}
/// The outcome of a single check, which is serialized for `--json`.
#[derive(Serialize, Debug, Default)]
pub struct Report {
    pub split_brain: bool,
    pub masters: BTreeMap<String, Vec<ReportedNode>>,
    pub failures: Vec<String>,
}
#[derive(Serialize, Debug, Default, PartialEq)]
pub struct ReportedNode {
    pub address: String,
    pub name: String,
    pub status: i64,
    pub cluster_size: usize,
}
