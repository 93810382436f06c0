//! The structs
//!
use std::collections::BTreeMap;
use chrono::{DateTime, Local};

/// The result of probing a single address.
///
/// When `failed` is set, only `address` and `timestamp` carry meaning.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct NodeObservation {
    /// The address as it was given, which is not necessarily the name of the node.
    pub address: String,
    /// brain_surgeon added to allow understanding when the probe was performed
    pub timestamp: Option<DateTime<Local>>,
    pub name: String,
    pub status: i64,
    pub reported_master: String,
    pub cluster_size: usize,
    pub failed: bool,
}
/// All observations of a single check, split into nodes that could be read and nodes that could not.
#[derive(Debug, Default)]
pub struct ObservationSet {
    pub successes: Vec<NodeObservation>,
    pub failures: Vec<NodeObservation>,
}
/// The successful observations grouped by the master they report.
pub type MasterGroups = BTreeMap<String, Vec<NodeObservation>>;
