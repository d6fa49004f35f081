//! The `compare` subcommand: reconcile pod resource requests against
//! VPA recommendations

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use tracing::debug;
use vpa_core::filter::RowFilter;
use vpa_core::join::{index_recommendations, join_pods};
use vpa_core::models::{ContainerRequest, OwnerRef, PodRecord};
use vpa_core::quantity;
use vpa_core::report::{assemble_rows, brief_lines, column_sums, order_rows, SortSpec};

use crate::client::ClusterClient;
use crate::output::{print_warning, render_table};
use crate::CompareArgs;

pub async fn run(client: &ClusterClient, args: &CompareArgs) -> Result<()> {
    // Both listings are all-or-nothing; either failure aborts the run.
    let pods = client.list_pods().await.context("listing pods failed")?;
    let vpas = client
        .list_vpas()
        .await
        .context("listing VPA objects failed")?;
    debug!(pods = pods.len(), vpas = vpas.len(), "fetched cluster state");

    let by_key = index_recommendations(vpas.iter().filter_map(|v| v.to_record()).collect());
    let joined = join_pods(pods.iter().map(pod_record).collect(), &by_key);

    let filter = RowFilter::new(&args.modes, args.invert, args.all_pods);

    if args.brief {
        for line in brief_lines(&joined, &filter) {
            println!("{line}");
        }
        return Ok(());
    }

    let spec = SortSpec {
        columns: args.sort.clone(),
        head: args.head,
        tail: args.tail,
    };
    let rows = order_rows(assemble_rows(&joined, &filter), &spec);

    if rows.is_empty() {
        print_warning("No matching pods");
        return Ok(());
    }

    let sums = args.sum.then(|| column_sums(&rows));
    println!("{}", render_table(&rows, sums));
    Ok(())
}

/// Reduce a fetched pod to the record the join engine consumes.
fn pod_record(pod: &Pod) -> PodRecord {
    // As in the owner-reference walk this replaces, the last reference
    // wins when a pod carries more than one.
    let owner = pod
        .metadata
        .owner_references
        .as_ref()
        .and_then(|refs| refs.last())
        .map(|o| OwnerRef {
            api_version: o.api_version.clone(),
            kind: o.kind.clone(),
            name: o.name.clone(),
        });

    let containers = pod
        .spec
        .as_ref()
        .map(|spec| {
            spec.containers
                .iter()
                .map(|c| {
                    let requests = c.resources.as_ref().and_then(|r| r.requests.as_ref());
                    ContainerRequest {
                        name: c.name.clone(),
                        cpu_milli: requests
                            .and_then(|r| r.get("cpu"))
                            .and_then(|q| quantity::cpu_millis(&q.0))
                            .unwrap_or(0),
                        memory_bytes: requests
                            .and_then(|r| r.get("memory"))
                            .and_then(|q| quantity::memory_bytes(&q.0))
                            .unwrap_or(0),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    PodRecord {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase: pod
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
        owner,
        containers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{Container, PodSpec, PodStatus, ResourceRequirements};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    #[test]
    fn pod_record_extracts_requests_and_owner() {
        let mut requests = BTreeMap::new();
        requests.insert("cpu".to_string(), Quantity("150m".to_string()));
        requests.insert("memory".to_string(), Quantity("2Mi".to_string()));

        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("web-7d8f9c6b5-abcde".to_string()),
                namespace: Some("prod".to_string()),
                owner_references: Some(vec![OwnerReference {
                    api_version: "apps/v1".to_string(),
                    kind: "ReplicaSet".to_string(),
                    name: "web-7d8f9c6b5".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "app".to_string(),
                    resources: Some(ResourceRequirements {
                        requests: Some(requests),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                ..Default::default()
            }),
        };

        let record = pod_record(&pod);
        assert_eq!(record.phase, "Running");
        assert_eq!(record.owner.as_ref().unwrap().kind, "ReplicaSet");
        assert_eq!(record.containers[0].cpu_milli, 150);
        assert_eq!(record.containers[0].memory_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn missing_requests_default_to_zero() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("bare".to_string()),
                namespace: Some("ns".to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "app".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            status: None,
        };

        let record = pod_record(&pod);
        assert!(record.owner.is_none());
        assert_eq!(record.containers[0].cpu_milli, 0);
        assert_eq!(record.containers[0].memory_bytes, 0);
    }
}
