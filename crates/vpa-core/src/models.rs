//! Core data models for the reconciliation pass
//!
//! Everything here is built fresh from the two live listings on each
//! invocation; nothing persists between runs.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A VPA update mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Off,
    Initial,
    Auto,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Off => write!(f, "Off"),
            Mode::Initial => write!(f, "Initial"),
            Mode::Auto => write!(f, "Auto"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Mode::Off),
            "initial" | "init" => Ok(Mode::Initial),
            "auto" => Ok(Mode::Auto),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

/// A reference to an owning workload, as found on a pod's owner chain
/// or a recommendation's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

/// Requested resources of one container in a running pod.
#[derive(Debug, Clone)]
pub struct ContainerRequest {
    pub name: String,
    pub cpu_milli: i64,
    pub memory_bytes: i64,
}

/// One pod as fetched from the cluster, reduced to what the join needs.
#[derive(Debug, Clone)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub owner: Option<OwnerRef>,
    pub containers: Vec<ContainerRequest>,
}

/// Recommended resources for one container of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerTarget {
    pub cpu_milli: i64,
    pub memory_bytes: i64,
}

/// One recommendation object, reduced to what the join needs.
#[derive(Debug, Clone)]
pub struct RecommendationRecord {
    pub namespace: String,
    pub target: OwnerRef,
    pub mode: Option<Mode>,
    pub containers: HashMap<String, ContainerTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("off".parse::<Mode>().unwrap(), Mode::Off);
        assert_eq!("Initial".parse::<Mode>().unwrap(), Mode::Initial);
        assert_eq!("AUTO".parse::<Mode>().unwrap(), Mode::Auto);
        assert_eq!("init".parse::<Mode>().unwrap(), Mode::Initial);
    }

    #[test]
    fn mode_rejects_unknown_values() {
        let err = "sometimes".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("unknown mode"));
    }

    #[test]
    fn mode_displays_canonical_names() {
        assert_eq!(Mode::Off.to_string(), "Off");
        assert_eq!(Mode::Initial.to_string(), "Initial");
        assert_eq!(Mode::Auto.to_string(), "Auto");
    }
}
