//! Reconciliation engine for pod requests vs. VPA recommendations
//!
//! This crate provides the cluster-independent core of the tool:
//! - Workload identity normalization (owner references to workload keys)
//! - Joining pods with recommendations by normalized identity
//! - Percentage-deviation calculation
//! - Mode-based row filtering
//! - Row assembly, sorting, truncation and brief-mode output
//!
//! Fetching from the cluster and drawing tables are left to the binary.

pub mod diff;
pub mod error;
pub mod filter;
pub mod identity;
pub mod join;
pub mod models;
pub mod quantity;
pub mod report;

pub use error::Error;
pub use filter::{ModeGate, RowFilter};
pub use identity::WorkloadKey;
pub use models::*;
pub use report::{Row, SortSpec};
