//! Split brain detection over the observations of a single check.
//!
//! The brain is split when the nodes that could be read do not all report the same master.
//! With fewer than two nodes there is nothing to disagree with, so the brain is never split,
//! also not when every node failed.
//!
mod functions;

pub use functions::*;
