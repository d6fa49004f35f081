//! The `create` subcommand: emit a VPA manifest for existing workloads
//!
//! Each name is resolved against the workload kinds in order
//! Pod, DaemonSet, StatefulSet, Deployment, CronJob, legacy CronJob;
//! the first hit wins. A name that matches nothing is reported and
//! processing continues with the next one.

use std::collections::BTreeMap;

use anyhow::Result;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::core::DynamicObject;
use tracing::debug;
use vpa_core::identity::normalize_owner;
use vpa_core::models::{Mode, OwnerRef};

use crate::client::ClusterClient;
use crate::commands::split_target;
use crate::output::{encode, print_error, OutputFormat};
use crate::vpa::{
    ContainerResourcePolicy, CrossVersionObjectReference, PodResourcePolicy, PodUpdatePolicy,
    VerticalPodAutoscaler, VerticalPodAutoscalerSpec,
};

/// A workload a VPA can target, with its container names.
#[derive(Debug)]
struct ResolvedTarget {
    api_version: &'static str,
    kind: String,
    name: String,
    containers: Vec<String>,
}

/// Outcome of the kind-resolution chain for one name.
enum Resolution {
    Found(ResolvedTarget),
    /// A pod exists under the name but its owner chain leads to a kind
    /// a VPA cannot target (or it has no owner at all).
    Untargetable { kind: String },
    NotFound,
}

pub async fn run(
    client: &ClusterClient,
    default_namespace: &str,
    names: &[String],
    mode: Mode,
    format: OutputFormat,
) -> Result<()> {
    for input in names {
        let (namespace, name) = split_target(input, default_namespace);
        match resolve(client, namespace, name).await? {
            Resolution::Found(target) => {
                let vpa = manifest(namespace, &target, mode);
                println!("---");
                print!("{}", encode(&vpa, format)?);
            }
            Resolution::Untargetable { kind } => print_error(&format!(
                "unsupported kind {kind} for pod {namespace}/{name}"
            )),
            Resolution::NotFound => {
                print_error(&format!("unable to locate resource {namespace}/{name}"))
            }
        }
    }
    Ok(())
}

async fn resolve(client: &ClusterClient, namespace: &str, name: &str) -> Result<Resolution> {
    if let Some(pod) = client.pod(namespace, name).await? {
        return Ok(match from_pod(&pod) {
            Ok(target) => Resolution::Found(target),
            Err(kind) => Resolution::Untargetable { kind },
        });
    }
    if let Some(ds) = client.daemon_set(namespace, name).await? {
        let containers = template_containers(
            ds.spec.as_ref().map(|s| &s.template),
        );
        return Ok(Resolution::Found(target("apps/v1", "DaemonSet", name, containers)));
    }
    if let Some(ss) = client.stateful_set(namespace, name).await? {
        let containers = template_containers(
            ss.spec.as_ref().map(|s| &s.template),
        );
        return Ok(Resolution::Found(target("apps/v1", "StatefulSet", name, containers)));
    }
    if let Some(dep) = client.deployment(namespace, name).await? {
        let containers = template_containers(
            dep.spec.as_ref().map(|s| &s.template),
        );
        return Ok(Resolution::Found(target("apps/v1", "Deployment", name, containers)));
    }
    if let Some(cj) = client.cron_job(namespace, name).await? {
        let containers = template_containers(
            cj.spec
                .as_ref()
                .and_then(|s| s.job_template.spec.as_ref())
                .map(|js| &js.template),
        );
        return Ok(Resolution::Found(target("batch/v1", "CronJob", name, containers)));
    }
    if let Some(legacy) = client.legacy_cron_job(namespace, name).await? {
        let containers = dynamic_containers(&legacy);
        return Ok(Resolution::Found(target("batch/v1beta1", "CronJob", name, containers)));
    }
    Ok(Resolution::NotFound)
}

fn target(
    api_version: &'static str,
    kind: &str,
    name: &str,
    containers: Vec<String>,
) -> ResolvedTarget {
    ResolvedTarget {
        api_version,
        kind: kind.to_string(),
        name: name.to_string(),
        containers,
    }
}

/// Resolve a pod to its owning workload via the normalized owner chain.
/// Returns the kind that blocked resolution on failure, "Pod" itself
/// when the pod has no owner at all.
fn from_pod(pod: &Pod) -> Result<ResolvedTarget, String> {
    let Some(owner) = pod
        .metadata
        .owner_references
        .as_ref()
        .and_then(|refs| refs.last())
    else {
        return Err("Pod".to_string());
    };

    let normalized = normalize_owner(&OwnerRef {
        api_version: owner.api_version.clone(),
        kind: owner.kind.clone(),
        name: owner.name.clone(),
    });

    let api_version = match normalized.kind.as_str() {
        "Deployment" | "StatefulSet" | "DaemonSet" => "apps/v1",
        "CronJob" => "batch/v1",
        other => {
            debug!(kind = other, "unsupported owner kind for a VPA target");
            return Err(other.to_string());
        }
    };

    let containers = pod
        .spec
        .as_ref()
        .map(|s| s.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();

    Ok(ResolvedTarget {
        api_version,
        kind: normalized.kind,
        name: normalized.name,
        containers,
    })
}

fn template_containers(
    template: Option<&k8s_openapi::api::core::v1::PodTemplateSpec>,
) -> Vec<String> {
    template
        .and_then(|t| t.spec.as_ref())
        .map(|s| s.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}

/// Container names of a dynamic (legacy CronJob) object.
fn dynamic_containers(obj: &DynamicObject) -> Vec<String> {
    obj.data
        .pointer("/spec/jobTemplate/spec/template/spec/containers")
        .and_then(|v| v.as_array())
        .map(|containers| {
            containers
                .iter()
                .filter_map(|c| c.get("name").and_then(|n| n.as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn min_allowed() -> BTreeMap<String, Quantity> {
    let mut m = BTreeMap::new();
    m.insert("cpu".to_string(), Quantity("10m".to_string()));
    m.insert("memory".to_string(), Quantity("10Mi".to_string()));
    m
}

fn container_policy(name: &str) -> ContainerResourcePolicy {
    ContainerResourcePolicy {
        container_name: Some(name.to_string()),
        mode: Some("Auto".to_string()),
        min_allowed: min_allowed(),
        max_allowed: BTreeMap::new(),
    }
}

fn manifest(namespace: &str, target: &ResolvedTarget, mode: Mode) -> VerticalPodAutoscaler {
    // Wildcard policy first, then one entry per container.
    let mut policies = vec![container_policy("*")];
    policies.extend(target.containers.iter().map(|c| container_policy(c)));

    let mut vpa = VerticalPodAutoscaler::new(
        &target.name,
        VerticalPodAutoscalerSpec {
            target_ref: Some(CrossVersionObjectReference {
                api_version: Some(target.api_version.to_string()),
                kind: target.kind.clone(),
                name: target.name.clone(),
            }),
            update_policy: Some(PodUpdatePolicy {
                update_mode: Some(mode.to_string()),
            }),
            resource_policy: Some(PodResourcePolicy {
                container_policies: policies,
            }),
        },
    );
    vpa.metadata.namespace = Some(namespace.to_string());
    vpa
}
