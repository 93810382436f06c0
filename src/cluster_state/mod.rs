//! Module for reading `/` and `/_cluster/state/nodes,master_node` on the nodes.
//!
//! The `/` endpoint reports the identity of the node itself:
//! - status: the numeric status of the node, 200 for a node that is up.
//! - name: the name the node uses in the cluster.
//!
//! The `/_cluster/state/nodes,master_node` endpoint reports the cluster as the node sees it:
//! - master_node: the node id of the node it considers the master.
//! - cluster_name
//! - nodes: a map of node id to name, transport address and attributes.
//!
//! Both endpoints are available on every node. Every node answers with its own local view, which
//! is what makes it possible to detect nodes that disagree about the master.
//!
mod structs;
mod functions;

pub use structs::*;
