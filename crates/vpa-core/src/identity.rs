//! Workload identity normalization
//!
//! Pods carry owner references to the controller that created them
//! (ReplicaSet, Job, ...), while recommendations target the workload
//! itself (Deployment, CronJob, ...). Both sides reduce to the same
//! [`WorkloadKey`] so they can be matched.

use crate::models::OwnerRef;

/// Canonical identity of one workload.
///
/// A struct with derived equality and hashing rather than a formatted
/// string, so names containing delimiter characters cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadKey {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl WorkloadKey {
    /// Build a key from a normalized owner reference. The kind is
    /// lowercased here; apiVersion and name are taken as-is.
    pub fn new(owner: &OwnerRef, namespace: &str) -> Self {
        WorkloadKey {
            api_version: owner.api_version.clone(),
            kind: owner.kind.to_ascii_lowercase(),
            namespace: namespace.to_string(),
            name: owner.name.clone(),
        }
    }
}

/// Canonicalize an owner reference taken from a pod's owner chain.
///
/// Pods created by a Job belong to a CronJob and pods created by a
/// ReplicaSet belong to a Deployment; in both cases the intermediate
/// controller's name carries a generated suffix that is stripped by
/// truncating at the last `-`. Any other kind passes through unchanged.
pub fn normalize_owner(owner: &OwnerRef) -> OwnerRef {
    let (kind, truncate) = match owner.kind.to_ascii_lowercase().as_str() {
        "job" => ("CronJob", true),
        "replicaset" => ("Deployment", true),
        _ => (owner.kind.as_str(), false),
    };

    let name = if truncate {
        strip_suffix(&owner.name)
    } else {
        owner.name.clone()
    };

    OwnerRef {
        api_version: owner.api_version.clone(),
        kind: kind.to_string(),
        name,
    }
}

/// Remove the trailing generated `-<suffix>` segment. A name without a
/// hyphen (or starting with one) is returned unchanged.
fn strip_suffix(name: &str) -> String {
    match name.rfind('-') {
        Some(i) if i > 0 => name[..i].to_string(),
        _ => name.to_string(),
    }
}
