//! The impls and functions
//!
use std::time::Duration;
use log::*;
use anyhow::{Result, Context};
use crate::utility;
use crate::cluster_state::{NodeStatus, ClusterState};

const NODE_STATUS_ENDPOINT: &str = "/";
const CLUSTER_STATE_ENDPOINT: &str = "/_cluster/state/nodes,master_node";

impl NodeStatus {
    pub fn read_http(
        address: &str,
        timeout: Duration,
    ) -> Result<NodeStatus>
    {
        let data_from_http = utility::http_get(address, NODE_STATUS_ENDPOINT, timeout)?;
        NodeStatus::parse_node_status(data_from_http, address)
    }
    // This is a separate function in order to allow the tests to use it.
    fn parse_node_status(
        http_data: String,
        address: &str,
    ) -> Result<NodeStatus>
    {
        serde_json::from_str(&http_data)
            .with_context(|| format!("({}) could not parse {} json data for node status", address, NODE_STATUS_ENDPOINT))
    }
}

impl ClusterState {
    pub fn read_http(
        address: &str,
        timeout: Duration,
    ) -> Result<ClusterState>
    {
        let data_from_http = utility::http_get(address, CLUSTER_STATE_ENDPOINT, timeout)?;
        ClusterState::parse_cluster_state(data_from_http, address)
    }
    fn parse_cluster_state(
        http_data: String,
        address: &str,
    ) -> Result<ClusterState>
    {
        serde_json::from_str(&http_data)
            .with_context(|| format!("({}) could not parse {} json data for cluster state", address, CLUSTER_STATE_ENDPOINT))
    }
    /// The name of the node this cluster state considers the master.
    ///
    /// `master_node` is a node id, which is resolved via the nodes map.
    /// If the id is not in the map, the master name is an empty string.
    pub fn master_name(&self) -> String
    {
        match self.nodes.get(&self.master_node) {
            Some(node) => node.name.clone(),
            None => {
                debug!("master_node '{}' not found in nodes of cluster '{}'", self.master_node, self.cluster_name);
                String::new()
            }
        }
    }
    pub fn node_count(&self) -> usize
    {
        self.nodes.len()
    }
}
