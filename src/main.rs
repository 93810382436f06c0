//! brain_surgeon: a point-in-time split brain check for elasticsearch clusters.
//!
//! Every node in the address list is asked who it is (`/`) and which node it considers the master
//! (`/_cluster/state/nodes,master_node`). When the nodes that could be read do not all report the
//! same master, the brain is split.
//!
//! Configuration is taken from the command line, then from the environment (which can be set via
//! a `.env` file), then from the defaults below.
#[macro_use]
extern crate serde_derive;

use std::{collections::HashMap, process};
use clap::Parser;
use dotenv::dotenv;
use log::*;
use anyhow::Result;

mod utility;
mod cluster_state;
mod observation;
mod split_brain;
mod report;

use report::OutputOptions;

/// Timeout in seconds for every single http request to a node.
const DEFAULT_HTTP_TIMEOUT: &str = "1";
/// Nodes behind TLS frequently use self-signed certificates.
const ACCEPT_INVALID_CERTS: bool = true;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Opts {
    /// node addresses, comma separated
    #[arg(short, long, alias = "elasticsearch-list", value_name = "hostname:port,hostname:port")]
    addresses: Option<String>,
    /// exit with status 1 when split brain is detected
    #[arg(long)]
    strict: bool,
    /// print the masters and their nodes, also when the cluster is ok
    #[arg(long)]
    print: bool,
    /// output in JSON
    #[arg(long)]
    json: bool,
    /// timeout in seconds for every http request
    #[arg(long, value_name = "seconds")]
    timeout: Option<String>,
    /// only report if the node at this address is the master
    #[arg(long, value_name = "hostname:port")]
    am_i_master: Option<String>,
    /// write addresses and timeout settings to .env
    #[arg(long)]
    write_dotenv: bool,
}

fn main() -> Result<()>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    dotenv().ok();
    let options = Opts::parse();

    let mut changed_options = HashMap::new();
    let timeout = utility::set_timeout(&options.timeout, &mut changed_options)?;

    if let Some(address) = &options.am_i_master {
        let exit_status = report::check_master(address, timeout)?;
        process::exit(exit_status);
    }

    let addresses = utility::set_addresses(&options.addresses, &mut changed_options)?;
    utility::dotenv_writer(options.write_dotenv, changed_options)?;

    let output = OutputOptions {
        strict: options.strict,
        print: options.print,
        json: options.json,
    };
    info!("checking {} addresses, timeout: {:?}", addresses.len(), timeout);

    let exit_status = report::check_cluster(&addresses, timeout, &output)?;
    process::exit(exit_status);
}
