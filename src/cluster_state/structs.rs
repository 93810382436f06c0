//! The structs
//!
use std::collections::HashMap;

/// The struct that is used to parse the JSON returned from `/` using serde.
///
/// ```json
/// {
///   "status" : 200,
///   "name" : "es-node-1",
///   "cluster_name" : "logging",
///   "version" : { "number" : "1.7.5" },
///   "tagline" : "You Know, for Search"
/// }
/// ```
/// Only status and name are used. Newer versions do not report status, which then reads as 0;
/// name must be present.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct NodeStatus {
    #[serde(default)]
    pub status: i64,
    pub name: String,
}
/// The root struct for deserializing `/_cluster/state/nodes,master_node`.
///
/// ```json
/// {
///   "cluster_name": "logging",
///   "master_node": "7YS7mB1MQ3e5ZRsSoBNVCw",
///   "nodes": {
///     "7YS7mB1MQ3e5ZRsSoBNVCw": {
///       "name": "es-node-1",
///       "transport_address": "inet[/10.0.0.11:9300]",
///       "attributes": { "aws_zone": "eu-west-1a" }
///     }
///   }
/// }
/// ```
/// A node that has lost its master does not report `master_node`, which is why all fields default.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ClusterState {
    pub master_node: String,
    pub cluster_name: String,
    pub nodes: HashMap<String, ClusterNode>,
}
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ClusterNode {
    pub name: String,
    pub transport_address: String,
    pub attributes: NodeAttributes,
}
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct NodeAttributes {
    pub aws_zone: String,
}
