//! The impls and functions
//!
use chrono::{DateTime, Local};
use std::{sync::mpsc::{channel, Sender}, time::{Duration, Instant}};
use log::*;
use anyhow::Result;
use crate::cluster_state::{NodeStatus, ClusterState};
use crate::observation::{NodeObservation, ObservationSet};

impl NodeObservation {
    pub fn new() -> Self {
        Default::default()
    }
    /// An observation for an address that could not be read.
    pub fn failed(
        address: &str,
        timestamp: DateTime<Local>,
    ) -> Self
    {
        NodeObservation {
            address: address.to_string(),
            timestamp: Some(timestamp),
            failed: true,
            ..NodeObservation::new()
        }
    }
    fn from_responses(
        address: &str,
        timestamp: DateTime<Local>,
        node_status: NodeStatus,
        cluster_state: ClusterState,
    ) -> Self
    {
        NodeObservation {
            address: address.to_string(),
            timestamp: Some(timestamp),
            name: node_status.name,
            status: node_status.status,
            reported_master: cluster_state.master_name(),
            cluster_size: cluster_state.node_count(),
            failed: false,
        }
    }
    /// Read the node status and the cluster state of a single node.
    ///
    /// The timeout applies to each of the two requests separately.
    fn read_http(
        address: &str,
        timeout: Duration,
    ) -> Result<(NodeStatus, ClusterState)>
    {
        let node_status = NodeStatus::read_http(address, timeout)?;
        let cluster_state = ClusterState::read_http(address, timeout)?;
        Ok((node_status, cluster_state))
    }
    /// Probe a single node.
    ///
    /// This never fails: a node that cannot be read or parsed yields an observation with `failed` set.
    pub fn probe(
        address: &str,
        timeout: Duration,
    ) -> NodeObservation
    {
        let probe_time = Local::now();
        match NodeObservation::read_http(address, timeout) {
            Ok((node_status, cluster_state)) => {
                let observation = NodeObservation::from_responses(address, probe_time, node_status, cluster_state);
                debug!("({}) node: {}, master: '{}', nodes: {}", address, observation.name, observation.reported_master, observation.cluster_size);
                observation
            }
            Err(e) => {
                warn!("({}) failed to probe node: {:#}", address, e);
                NodeObservation::failed(address, probe_time)
            }
        }
    }
}

/// Is the node at `address` the master according to its own cluster state?
///
/// Unlike [NodeObservation::probe] this returns an error when the node cannot be read,
/// because there is no answer to give.
pub fn am_i_master(
    address: &str,
    timeout: Duration,
) -> Result<bool>
{
    let (node_status, cluster_state) = NodeObservation::read_http(address, timeout)?;
    let master_name = cluster_state.master_name();
    debug!("({}) node: {}, master: '{}'", address, node_status.name, master_name);
    Ok(master_name == node_status.name)
}

fn spawn_probes<'scope, F>(
    scope: &rayon::Scope<'scope>,
    addresses: &'scope [String],
    probe: &'scope F,
    tx: Sender<NodeObservation>,
)
where
    F: Fn(&str) -> NodeObservation + Sync,
{
    for address in addresses {
        let tx = tx.clone();
        scope.spawn(move |_| {
            let observation = probe(address.as_str());
            if tx.send(observation).is_err() {
                warn!("({}) error sending observation via tx", address);
            }
        });
    }
}

impl ObservationSet {
    pub fn new() -> Self {
        Default::default()
    }
    /// Probe all addresses in parallel, with a timeout per http request.
    pub fn fetch_all(
        addresses: &[String],
        timeout: Duration,
    ) -> ObservationSet
    {
        ObservationSet::fetch_all_with(addresses, |address| NodeObservation::probe(address, timeout))
    }
    /// Run `probe` for every address at the same time, and collect the observations.
    ///
    /// The pool has a thread per address, so no probe waits for another one to finish, and the
    /// total time is that of the slowest probe.
    /// Every address is probed exactly once, and produces exactly one observation in either
    /// `successes` or `failures`. Both are ordered by address.
    pub fn fetch_all_with<F>(
        addresses: &[String],
        probe: F,
    ) -> ObservationSet
    where
        F: Fn(&str) -> NodeObservation + Sync,
    {
        let mut observationset = ObservationSet::new();
        if addresses.is_empty() {
            debug!("no addresses to probe");
            return observationset;
        }

        info!("begin parallel http read");
        let timer = Instant::now();

        let (tx, rx) = channel();
        match rayon::ThreadPoolBuilder::new().num_threads(addresses.len()).build() {
            Ok(pool) => pool.scope(|s| spawn_probes(s, addresses, &probe, tx)),
            Err(e) => {
                warn!("unable to create thread pool of {} threads, using the global pool: {}", addresses.len(), e);
                rayon::scope(|s| spawn_probes(s, addresses, &probe, tx))
            }
        }

        info!("end parallel http read {:?}", timer.elapsed());

        for observation in rx.iter().take(addresses.len()) {
            if observation.failed {
                observationset.failures.push(observation);
            } else {
                observationset.successes.push(observation);
            }
        }
        // completion order is arbitrary.
        observationset.successes.sort_by(|a, b| a.address.cmp(&b.address));
        observationset.failures.sort_by(|a, b| a.address.cmp(&b.address));

        debug!("successes: {}, failures: {}", observationset.successes.len(), observationset.failures.len());
        observationset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use axum::http::StatusCode;
    use crate::utility::{start_test_node, start_slow_test_node, test_node_status, test_cluster_state};
    use crate::split_brain::check_split_brain;

    const TIMEOUT: Duration = Duration::from_secs(2);
    // port 1 on the loopback interface is not expected to be listening.
    const UNREACHABLE: &str = "127.0.0.1:1";

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(|address| address.to_string()).collect()
    }

    fn fake_probe(address: &str) -> NodeObservation {
        if address.starts_with("down") {
            NodeObservation::failed(address, Local::now())
        } else {
            NodeObservation {
                address: address.to_string(),
                timestamp: Some(Local::now()),
                name: address.to_uppercase(),
                status: 200,
                reported_master: "Node1".to_string(),
                cluster_size: 3,
                failed: false,
            }
        }
    }

    fn three_node_cluster(master_id: &str) -> String {
        test_cluster_state(master_id, &[("id1", "Node1"), ("id2", "Node2"), ("id3", "Node3")])
    }

    #[test]
    fn unit_failed_observation_only_has_address() {
        let observation = NodeObservation::failed("es1:9200", Local::now());
        assert!(observation.failed);
        assert_eq!(observation.address, "es1:9200");
        assert_eq!(observation.name, "");
        assert_eq!(observation.reported_master, "");
        assert_eq!(observation.cluster_size, 0);
    }

    #[test]
    fn unit_fetch_all_empty_spawns_nothing() {
        let calls = AtomicUsize::new(0);
        let observationset = ObservationSet::fetch_all_with(&[], |address| {
            calls.fetch_add(1, Ordering::SeqCst);
            fake_probe(address)
        });
        assert!(observationset.successes.is_empty());
        assert!(observationset.failures.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unit_fetch_all_probes_every_address_once() {
        let addresses = addresses(&["es3", "down1", "es1", "es2", "down2", "es4", "es5"]);
        let calls = AtomicUsize::new(0);
        let observationset = ObservationSet::fetch_all_with(&addresses, |address| {
            calls.fetch_add(1, Ordering::SeqCst);
            fake_probe(address)
        });
        assert_eq!(calls.load(Ordering::SeqCst), addresses.len());
        assert_eq!(observationset.successes.len() + observationset.failures.len(), addresses.len());

        let mut seen: Vec<String> = observationset.successes.iter()
            .chain(observationset.failures.iter())
            .map(|r| r.address.clone())
            .collect();
        seen.sort();
        let mut expected = addresses.clone();
        expected.sort();
        assert_eq!(seen, expected);

        assert!(observationset.successes.iter().all(|r| !r.failed));
        assert!(observationset.failures.iter().all(|r| r.failed));
        assert_eq!(observationset.failures.iter().map(|r| r.address.as_str()).collect::<Vec<_>>(), vec!["down1", "down2"]);
        assert_eq!(observationset.successes.iter().map(|r| r.address.as_str()).collect::<Vec<_>>(), vec!["es1", "es2", "es3", "es4", "es5"]);
    }

    #[test]
    fn unit_fetch_all_duplicate_addresses_are_probed_each() {
        let addresses = addresses(&["es1", "es1"]);
        let observationset = ObservationSet::fetch_all_with(&addresses, fake_probe);
        assert_eq!(observationset.successes.len(), 2);
    }

    #[test]
    fn unit_probe_healthy_node() {
        let address = start_test_node(StatusCode::OK, &test_node_status("Node2"), &three_node_cluster("id1"));
        let observation = NodeObservation::probe(&address, TIMEOUT);
        assert!(!observation.failed);
        assert_eq!(observation.address, address);
        assert_eq!(observation.name, "Node2");
        assert_eq!(observation.status, 200);
        assert_eq!(observation.reported_master, "Node1");
        assert_eq!(observation.cluster_size, 3);
        assert!(observation.timestamp.is_some());
    }

    #[test]
    fn unit_probe_address_with_scheme() {
        let address = start_test_node(StatusCode::OK, &test_node_status("Node2"), &three_node_cluster("id1"));
        let address = format!("http://{}", address);
        let observation = NodeObservation::probe(&address, TIMEOUT);
        assert!(!observation.failed);
        assert_eq!(observation.address, address);
    }

    #[test]
    fn unit_probe_node_without_master() {
        let address = start_test_node(StatusCode::OK, &test_node_status("Node2"), &three_node_cluster("unknown"));
        let observation = NodeObservation::probe(&address, TIMEOUT);
        assert!(!observation.failed);
        assert_eq!(observation.reported_master, "");
    }

    #[test]
    fn unit_probe_server_error() {
        let address = start_test_node(StatusCode::INTERNAL_SERVER_ERROR, &test_node_status("Node2"), &three_node_cluster("id1"));
        let observation = NodeObservation::probe(&address, TIMEOUT);
        assert!(observation.failed);
        assert_eq!(observation.address, address);
        assert_eq!(observation.name, "");
    }

    #[test]
    fn unit_probe_invalid_json() {
        let address = start_test_node(StatusCode::OK, &test_node_status("Node2"), "{ this is not json");
        let observation = NodeObservation::probe(&address, TIMEOUT);
        assert!(observation.failed);
    }

    #[test]
    fn unit_probe_unreachable() {
        let observation = NodeObservation::probe(UNREACHABLE, TIMEOUT);
        assert!(observation.failed);
        assert_eq!(observation.address, UNREACHABLE);
    }

    #[test]
    fn unit_fetch_all_one_node_unreachable() {
        let node1 = start_test_node(StatusCode::OK, &test_node_status("Node1"), &three_node_cluster("id1"));
        let node2 = start_test_node(StatusCode::OK, &test_node_status("Node2"), &three_node_cluster("id1"));
        let addresses = vec![node1, node2, UNREACHABLE.to_string()];

        let observationset = ObservationSet::fetch_all(&addresses, TIMEOUT);
        assert_eq!(observationset.successes.len(), 2);
        assert_eq!(observationset.failures.len(), 1);
        assert_eq!(observationset.failures[0].address, UNREACHABLE);
        assert!(!check_split_brain(&observationset.successes));
    }

    #[test]
    fn unit_fetch_all_all_unreachable() {
        let addresses = addresses(&["127.0.0.1:1", "127.0.0.1:2", "127.0.0.1:3"]);
        let observationset = ObservationSet::fetch_all(&addresses, TIMEOUT);
        assert!(observationset.successes.is_empty());
        assert_eq!(observationset.failures.len(), 3);
        assert!(!check_split_brain(&observationset.successes));
    }

    #[test]
    fn unit_am_i_master() {
        let master = start_test_node(StatusCode::OK, &test_node_status("Node1"), &three_node_cluster("id1"));
        let follower = start_test_node(StatusCode::OK, &test_node_status("Node2"), &three_node_cluster("id1"));
        assert!(am_i_master(&master, TIMEOUT).unwrap());
        assert!(!am_i_master(&follower, TIMEOUT).unwrap());
        assert!(am_i_master(UNREACHABLE, TIMEOUT).is_err());
    }

    #[test]
    fn unit_fetch_all_reads_every_address_at_the_same_time() {
        let probe_time = Duration::from_millis(300);
        let list: Vec<String> = (0..20).map(|number| format!("down{}", number)).collect();
        let timer = Instant::now();
        let observationset = ObservationSet::fetch_all_with(&list, |address| {
            std::thread::sleep(probe_time);
            fake_probe(address)
        });
        let elapsed = timer.elapsed();
        assert_eq!(observationset.failures.len(), 20);
        // one round of reads, not one per address.
        assert!(elapsed < probe_time * 3, "elapsed: {:?}", elapsed);
    }

    #[test]
    fn unit_node_observation_times_out_on_hanging_node() {
        let timeout = Duration::from_millis(300);
        let address = start_slow_test_node(Duration::from_secs(5), &test_node_status("Node2"), &three_node_cluster("id1"));
        let timer = Instant::now();
        let observation = NodeObservation::probe(&address, timeout);
        let elapsed = timer.elapsed();
        assert!(observation.failed);
        assert_eq!(observation.address, address);
        assert!(elapsed < timeout * 3, "elapsed: {:?}", elapsed);
    }

    #[test]
    fn unit_fetch_all_hanging_nodes_take_one_timeout() {
        let timeout = Duration::from_millis(300);
        let hanging: Vec<String> = (0..5)
            .map(|_| start_slow_test_node(Duration::from_secs(5), &test_node_status("Node2"), &three_node_cluster("id1")))
            .collect();
        let healthy = start_test_node(StatusCode::OK, &test_node_status("Node1"), &three_node_cluster("id1"));
        let mut addresses = hanging.clone();
        addresses.push(healthy.clone());

        let timer = Instant::now();
        let observationset = ObservationSet::fetch_all(&addresses, timeout);
        let elapsed = timer.elapsed();
        assert_eq!(observationset.failures.len(), 5);
        assert_eq!(observationset.successes.len(), 1);
        assert_eq!(observationset.successes[0].address, healthy);
        // the hanging nodes time out together, not one after the other.
        assert!(elapsed < timeout * 4, "elapsed: {:?}", elapsed);
    }
}
