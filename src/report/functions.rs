//! The impls and functions
//!
use std::time::{Duration, Instant};
use log::*;
use colored::*;
use anyhow::{Result, Context};
use crate::observation::{self, NodeObservation, ObservationSet};
use crate::report::{OutputOptions, Report, ReportedNode};

impl ReportedNode {
    fn from_observation(observation: &NodeObservation) -> Self {
        ReportedNode {
            address: observation.address.clone(),
            name: observation.name.clone(),
            status: observation.status,
            cluster_size: observation.cluster_size,
        }
    }
}

impl Report {
    pub fn new(
        observationset: &ObservationSet,
    ) -> Self
    {
        Report {
            split_brain: observationset.is_split_brain(),
            masters: observationset.master_groups()
                .into_iter()
                .map(|(master, nodes)| (master, nodes.iter().map(ReportedNode::from_observation).collect::<Vec<ReportedNode>>()))
                .collect(),
            failures: observationset.failures
                .iter()
                .map(|r| r.address.clone())
                .collect(),
        }
    }
    /// 1 when the brain is split and strict is set, otherwise 0.
    pub fn exit_status(
        &self,
        options: &OutputOptions,
    ) -> i32
    {
        if self.split_brain && options.strict {
            1
        } else {
            0
        }
    }
    pub fn render_text(
        &self,
        print_masters: bool,
    ) -> String
    {
        let mut output = String::new();
        if self.split_brain {
            output.push_str(&format!("{}\n", "The brain is split!".red()));
        } else {
            output.push_str(&format!("{}\n", "Everything is ok".green()));
        }
        // a split brain always shows who thinks who is master.
        if self.split_brain || print_masters {
            for (master, nodes) in &self.masters {
                output.push_str(&format!("master: {}\n", master));
                for (number, node) in nodes.iter().enumerate() {
                    output.push_str(&format!("  node {}: {}\n", number, node.name));
                }
            }
        }
        if !self.failures.is_empty() {
            output.push_str("Failed connecting to:\n");
            for address in &self.failures {
                output.push_str(&format!("  {}\n", address));
            }
        }
        output
    }
    pub fn render_json(&self) -> Result<String>
    {
        serde_json::to_string_pretty(&self)
            .with_context(|| "Unable to serialize report to json")
    }
    pub fn print(
        &self,
        options: &OutputOptions,
    ) -> Result<()>
    {
        if options.json {
            println!("{}", self.render_json()?);
        } else {
            print!("{}", self.render_text(options.print));
        }
        Ok(())
    }
}

/// Probe all addresses, report the outcome, and return the exit status.
pub fn check_cluster(
    addresses: &[String],
    timeout: Duration,
    options: &OutputOptions,
) -> Result<i32>
{
    info!("begin check");
    let timer = Instant::now();

    let observationset = ObservationSet::fetch_all(addresses, timeout);
    let report = Report::new(&observationset);
    if report.split_brain {
        warn!("split brain detected: {} different masters reported", report.masters.len());
    }
    report.print(options)?;

    info!("end check: {:?}", timer.elapsed());
    Ok(report.exit_status(options))
}

/// Report if the node at `address` is the master, and return the exit status: 0 if it is, 1 if not.
pub fn check_master(
    address: &str,
    timeout: Duration,
) -> Result<i32>
{
    if observation::am_i_master(address, timeout)? {
        println!("{} is the master", address);
        Ok(0)
    } else {
        println!("{} is not the master", address);
        Ok(1)
    }
}
