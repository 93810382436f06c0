//! Module for probing the nodes of a cluster.
//!
//! A probe reads `/` and `/_cluster/state/nodes,master_node` from a single node and turns the two
//! documents into a [NodeObservation]: the name of the node, and the name of the node it considers
//! the master. A node that cannot be read yields an observation marked as failed.
//!
//! [ObservationSet::fetch_all] probes all addresses in parallel and splits the observations into
//! successes and failures. The failures never stop the check: the split brain verdict is taken over
//! the successes.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
