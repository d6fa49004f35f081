//! Join engine: attach recommendations to running pods
//!
//! Recommendations are indexed by [`WorkloadKey`] first; each running
//! pod's owner chain is then normalized into the same key space and
//! looked up. A missing recommendation is a normal outcome, not an
//! error.

use std::collections::HashMap;

use tracing::debug;

use crate::identity::{normalize_owner, WorkloadKey};
use crate::models::{ContainerTarget, Mode, PodRecord, RecommendationRecord};

/// A pod's resolved recommendation match.
#[derive(Debug, Clone)]
pub struct WorkloadMatch {
    /// Name of the workload the recommendation targets.
    pub name: String,
    pub mode: Option<Mode>,
}

/// One container with its request and, when matched, its per-container
/// recommendation.
#[derive(Debug, Clone)]
pub struct JoinedContainer {
    pub name: String,
    pub cpu_milli: i64,
    pub memory_bytes: i64,
    pub target: Option<ContainerTarget>,
}

/// One running pod after the join.
#[derive(Debug, Clone)]
pub struct JoinedPod {
    pub name: String,
    pub namespace: String,
    /// Normalized owner name, when the pod has an owner reference.
    pub owner_name: Option<String>,
    pub recommendation: Option<WorkloadMatch>,
    pub containers: Vec<JoinedContainer>,
}

impl JoinedPod {
    /// True when the pod matched a recommendation and the given
    /// container matched one of its container entries.
    pub fn full_match(&self, container: &JoinedContainer) -> bool {
        self.recommendation.is_some() && container.target.is_some()
    }
}

/// Index recommendations by workload key. Targets already name the
/// workload, so they get no owner-chain rewriting, only the key's kind
/// lowercasing. Later entries for a duplicate key overwrite earlier
/// ones, matching listing order.
pub fn index_recommendations(
    recommendations: Vec<RecommendationRecord>,
) -> HashMap<WorkloadKey, RecommendationRecord> {
    let mut by_key = HashMap::with_capacity(recommendations.len());
    for rec in recommendations {
        let key = WorkloadKey::new(&rec.target, &rec.namespace);
        debug!(
            namespace = %rec.namespace,
            workload = %rec.target.name,
            containers = rec.containers.len(),
            "indexing recommendation"
        );
        by_key.insert(key, rec);
    }
    by_key
}

/// Join running pods against the recommendation index. Pods not in the
/// `Running` phase are excluded entirely.
pub fn join_pods(
    pods: Vec<PodRecord>,
    by_key: &HashMap<WorkloadKey, RecommendationRecord>,
) -> Vec<JoinedPod> {
    let mut joined = Vec::new();

    for pod in pods {
        if pod.phase != "Running" {
            continue;
        }

        let owner = pod.owner.as_ref().map(normalize_owner);
        let matched = owner
            .as_ref()
            .and_then(|o| by_key.get(&WorkloadKey::new(o, &pod.namespace)));

        debug!(
            namespace = %pod.namespace,
            pod = %pod.name,
            matched = matched.is_some(),
            "joining pod"
        );

        let containers = pod
            .containers
            .iter()
            .map(|c| JoinedContainer {
                name: c.name.clone(),
                cpu_milli: c.cpu_milli,
                memory_bytes: c.memory_bytes,
                target: matched.and_then(|rec| rec.containers.get(&c.name).copied()),
            })
            .collect();

        joined.push(JoinedPod {
            name: pod.name,
            namespace: pod.namespace,
            owner_name: owner.map(|o| o.name),
            recommendation: matched.map(|rec| WorkloadMatch {
                name: rec.target.name.clone(),
                mode: rec.mode,
            }),
            containers,
        });
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerRequest, OwnerRef};
    use std::collections::HashMap as Map;

    fn rec(namespace: &str, kind: &str, name: &str, mode: Option<Mode>) -> RecommendationRecord {
        let mut containers = Map::new();
        containers.insert(
            "app".to_string(),
            ContainerTarget {
                cpu_milli: 100,
                memory_bytes: 128 * 1024 * 1024,
            },
        );
        RecommendationRecord {
            namespace: namespace.to_string(),
            target: OwnerRef {
                api_version: "apps/v1".to_string(),
                kind: kind.to_string(),
                name: name.to_string(),
            },
            mode,
            containers,
        }
    }

    fn pod(name: &str, phase: &str, owner_kind: &str, owner_name: &str) -> PodRecord {
        PodRecord {
            name: name.to_string(),
            namespace: "ns".to_string(),
            phase: phase.to_string(),
            owner: Some(OwnerRef {
                api_version: "apps/v1".to_string(),
                kind: owner_kind.to_string(),
                name: owner_name.to_string(),
            }),
            containers: vec![ContainerRequest {
                name: "app".to_string(),
                cpu_milli: 150,
                memory_bytes: 256 * 1024 * 1024,
            }],
        }
    }

    #[test]
    fn running_pod_matches_via_replicaset_owner() {
        let by_key = index_recommendations(vec![rec("ns", "Deployment", "web", Some(Mode::Auto))]);
        let joined = join_pods(vec![pod("web-7d8f9c6b5-abcde", "Running", "ReplicaSet", "web-7d8f9c6b5")], &by_key);

        assert_eq!(joined.len(), 1);
        let p = &joined[0];
        assert_eq!(p.recommendation.as_ref().unwrap().name, "web");
        assert_eq!(p.recommendation.as_ref().unwrap().mode, Some(Mode::Auto));
        assert!(p.full_match(&p.containers[0]));
    }

    #[test]
    fn non_running_pods_are_excluded() {
        let by_key = index_recommendations(vec![]);
        let joined = join_pods(vec![pod("web-1", "Pending", "ReplicaSet", "web-abc")], &by_key);
        assert!(joined.is_empty());
    }

    #[test]
    fn missing_recommendation_is_not_an_error() {
        let by_key = index_recommendations(vec![]);
        let joined = join_pods(vec![pod("web-1", "Running", "ReplicaSet", "web-abc")], &by_key);
        assert_eq!(joined.len(), 1);
        assert!(joined[0].recommendation.is_none());
        assert!(joined[0].containers[0].target.is_none());
    }

    #[test]
    fn unmatched_container_keeps_no_recommendation_marker() {
        let by_key = index_recommendations(vec![rec("ns", "Deployment", "web", None)]);
        let mut p = pod("web-7d8f9c6b5-abcde", "Running", "ReplicaSet", "web-7d8f9c6b5");
        p.containers.push(ContainerRequest {
            name: "sidecar".to_string(),
            cpu_milli: 50,
            memory_bytes: 1024,
        });

        let joined = join_pods(vec![p], &by_key);
        let pod = &joined[0];
        assert!(pod.recommendation.is_some());
        assert!(pod.containers[0].target.is_some());
        assert!(pod.containers[1].target.is_none());
        assert!(!pod.full_match(&pod.containers[1]));
    }

    #[test]
    fn duplicate_keys_are_last_write_wins() {
        let mut first = rec("ns", "Deployment", "web", Some(Mode::Off));
        first.containers.get_mut("app").unwrap().cpu_milli = 1;
        let second = rec("ns", "Deployment", "web", Some(Mode::Auto));

        let by_key = index_recommendations(vec![first, second]);
        assert_eq!(by_key.len(), 1);
        let kept = by_key.values().next().unwrap();
        assert_eq!(kept.mode, Some(Mode::Auto));
        assert_eq!(kept.containers["app"].cpu_milli, 100);
    }

    #[test]
    fn cronjob_pods_match_via_job_owner() {
        let mut r = rec("ns", "CronJob", "mycron", Some(Mode::Initial));
        r.target.api_version = "batch/v1".to_string();
        let by_key = index_recommendations(vec![r]);

        let mut p = pod("mycron-1699999999-xyz", "Running", "Job", "mycron-1699999999");
        p.owner.as_mut().unwrap().api_version = "batch/v1".to_string();

        let joined = join_pods(vec![p], &by_key);
        assert!(joined[0].recommendation.is_some());
        assert_eq!(joined[0].owner_name.as_deref(), Some("mycron"));
    }
}
