//! Structural validation of a concept map and the matching auto-repairs.

pub mod bundling;
mod problems;
pub mod repair;

pub use problems::{Problem, ProblemKind, Severity, detect, parallel_buckets};
pub use repair::{MergeReport, bridge_components, drop_self_loops, merge_parallel};
