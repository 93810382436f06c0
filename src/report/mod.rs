//! Reporting the result of a check.
//!
//! The report is printed as text (default) or as JSON (`--json`), and determines the exit status:
//! 1 when the brain is split and `--strict` is set, 0 otherwise. Nodes that could not be read are
//! reported, but never change the exit status.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
