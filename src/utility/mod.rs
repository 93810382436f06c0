//! Utilities
use log::*;
use std::{env, fs, io::Write, collections::HashMap, path::Path, time::Duration};
use anyhow::{Result, Context, bail};

// This reads the constant set in main.rs.
use crate::ACCEPT_INVALID_CERTS;

use crate::DEFAULT_HTTP_TIMEOUT;

/// The scheme that is put in front of an address that does not specify one.
const DEFAULT_SCHEME: &str = "http://";

/// Turn `hostname:port` into an absolute url, leaving addresses that carry a scheme alone.
pub fn normalize_address(
    address: &str,
) -> String
{
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, address)
    }
}

/// Perform a single GET request to `address` followed by `endpoint`.
///
/// The timeout applies to this request only.
/// A connection error, a timeout, a server error status or an unreadable body is an error.
/// Other statuses are returned as text, so the parser decides whether it can use the body.
pub fn http_get(
    address: &str,
    endpoint: &str,
    timeout: Duration,
) -> Result<String>
{
    let url = format!("{}{}", normalize_address(address), endpoint);
    let response = reqwest::blocking::Client::builder()
        .danger_accept_invalid_certs(ACCEPT_INVALID_CERTS)
        .timeout(timeout)
        .build()
        .with_context(|| "Unable to create http client")?
        .get(&url)
        .send()
        .with_context(|| format!("Unable to read from {}", url))?;

    if response.status().is_server_error() {
        bail!("Server error response: {} = {}", url, response.status());
    }
    if ! response.status().is_success() {
        debug!("Non success response: {} = {}", url, response.status());
    } else {
        debug!("Success response: {} = {}", url, response.status());
    }

    response.text()
        .with_context(|| format!("Unable to read response body from {}", url))
}

/// Pick the option, or the environment variable, or the default, in that order.
///
/// When the value came from the option or the environment, it is recorded in `changed_options`,
/// so it can be written to `.env` later on.
fn resolve_setting(
    option: &Option<String>,
    env_name: &'static str,
    default: Option<&str>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Option<String>
{
    if let Some(value) = option {
        info!("{} argument set: using: {}", env_name, value);
        changed_options.insert(env_name, value.to_string());
        return Some(value.to_string());
    }
    // is the environment variable set (via dotenv().ok())?
    match env::var(env_name) {
        Ok(set_var) => {
            info!("{} not set: set via .env: {}", env_name, set_var);
            changed_options.insert(env_name, set_var.to_owned());
            Some(set_var)
        }
        Err(_e) => {
            info!("{} not set: and not set via .env: using default: {:?}", env_name, default);
            default.map(|value| value.to_string())
        }
    }
}

pub fn set_addresses(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Result<Vec<String>>
{
    let addresses: Vec<String> = resolve_setting(option, "BRAIN_SURGEON_ADDRESSES", None, changed_options)
        .unwrap_or_default()
        .split(',')
        .map(|address| address.trim())
        .filter(|address| !address.is_empty())
        .map(|address| address.to_string())
        .collect();

    if addresses.is_empty() {
        bail!("No addresses set: use --addresses or set BRAIN_SURGEON_ADDRESSES");
    }
    Ok(addresses)
}

pub fn set_timeout(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Result<Duration>
{
    let timeout_string = resolve_setting(option, "BRAIN_SURGEON_TIMEOUT", Some(DEFAULT_HTTP_TIMEOUT), changed_options)
        .unwrap_or_else(|| DEFAULT_HTTP_TIMEOUT.to_string());
    let seconds: f64 = timeout_string.trim().parse()
        .with_context(|| format!("Invalid timeout setting: {}", timeout_string))?;
    if seconds <= 0_f64 {
        bail!("Invalid timeout setting: {}, must be larger than 0", timeout_string);
    }
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("Invalid timeout setting: {}", timeout_string))
}

pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        write_settings(Path::new(".env"), &changed_options)?;
    }
    Ok(())
}

/// Write the settings as `KEY=value` lines, sorted by key so the file is the same on every run.
fn write_settings(
    path: &Path,
    settings: &HashMap<&str, String>,
) -> Result<()>
{
    info!("Writing {}", path.display());
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Error writing settings file: {}", path.display()))?;

    let mut keys: Vec<&&str> = settings.keys().collect();
    keys.sort();
    for key in keys {
        file.write_all(format!("{}={}\n", key, settings[*key]).as_bytes())
            .with_context(|| format!("Error writing settings file: {}", path.display()))?;
        info!("{}={}", key, settings[*key]);
    }
    Ok(())
}

/// Start a node on a free port of the loopback interface, which answers `/` and
/// `/_cluster/state/nodes,master_node` with the given status code and bodies.
/// Returns the `hostname:port` of the node.
#[cfg(test)]
pub fn start_test_node(
    status: axum::http::StatusCode,
    node_status: &str,
    cluster_state: &str,
) -> String
{
    serve_test_node(status, Duration::ZERO, node_status, cluster_state)
}
/// Start a node that waits `delay` before it answers, to simulate a hanging node.
#[cfg(test)]
pub fn start_slow_test_node(
    delay: Duration,
    node_status: &str,
    cluster_state: &str,
) -> String
{
    serve_test_node(axum::http::StatusCode::OK, delay, node_status, cluster_state)
}
#[cfg(test)]
fn serve_test_node(
    status: axum::http::StatusCode,
    delay: Duration,
    node_status: &str,
    cluster_state: &str,
) -> String
{
    use axum::{Router, routing::get};

    let node_status = node_status.to_string();
    let cluster_state = cluster_state.to_string();
    let app = Router::new()
        .route("/", get(move || {
            let body = node_status.clone();
            async move {
                tokio::time::sleep(delay).await;
                (status, body)
            }
        }))
        .route("/_cluster/state/nodes,master_node", get(move || {
            let body = cluster_state.clone();
            async move {
                tokio::time::sleep(delay).await;
                (status, body)
            }
        }));

    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("error creating tokio runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("error binding test node");
            tx.send(listener.local_addr().expect("error reading local address")).expect("error sending address via tx");
            axum::serve(listener, app).await.expect("error serving test node");
        });
    });
    rx.recv().expect("error receiving address via rx").to_string()
}
/// A `/` document for a node with the given name.
#[cfg(test)]
pub fn test_node_status(name: &str) -> String {
    format!(r#"{{ "status": 200, "name": "{}", "tagline": "You Know, for Search" }}"#, name)
}
/// A `/_cluster/state/nodes,master_node` document, the nodes are (node id, name) pairs.
#[cfg(test)]
pub fn test_cluster_state(master_node: &str, nodes: &[(&str, &str)]) -> String {
    let nodes = nodes.iter()
        .map(|(id, name)| format!(r#""{}": {{ "name": "{}", "transport_address": "inet[/10.0.0.1:9300]", "attributes": {{ "aws_zone": "eu-west-1a" }} }}"#, id, name))
        .collect::<Vec<String>>()
        .join(",");
    format!(r#"{{ "cluster_name": "logging", "master_node": "{}", "nodes": {{ {} }} }}"#, master_node, nodes)
}
