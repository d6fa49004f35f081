//! Typed binding for the VerticalPodAutoscaler custom resource
//!
//! Only the fields the tool reads or writes are modeled; everything
//! else in the CRD is ignored on deserialization.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vpa_core::models::{ContainerTarget, OwnerRef, RecommendationRecord};
use vpa_core::quantity;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "autoscaling.k8s.io",
    version = "v1",
    kind = "VerticalPodAutoscaler",
    plural = "verticalpodautoscalers",
    shortname = "vpa",
    namespaced,
    status = "VerticalPodAutoscalerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct VerticalPodAutoscalerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ref: Option<CrossVersionObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<PodUpdatePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_policy: Option<PodResourcePolicy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrossVersionObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub kind: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodUpdatePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_mode: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodResourcePolicy {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_policies: Vec<ContainerResourcePolicy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourcePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub min_allowed: BTreeMap<String, Quantity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub max_allowed: BTreeMap<String, Quantity>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerticalPodAutoscalerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendedPodResources>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedPodResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_recommendations: Vec<RecommendedContainerResources>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedContainerResources {
    #[serde(default)]
    pub container_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub target: BTreeMap<String, Quantity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lower_bound: BTreeMap<String, Quantity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub upper_bound: BTreeMap<String, Quantity>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub uncapped_target: BTreeMap<String, Quantity>,
}

/// Millicores from a quantity map, zero when absent or unparseable.
fn cpu_of(values: &BTreeMap<String, Quantity>) -> i64 {
    values
        .get("cpu")
        .and_then(|q| quantity::cpu_millis(&q.0))
        .unwrap_or(0)
}

/// Bytes from a quantity map, zero when absent or unparseable.
fn memory_of(values: &BTreeMap<String, Quantity>) -> i64 {
    values
        .get("memory")
        .and_then(|q| quantity::memory_bytes(&q.0))
        .unwrap_or(0)
}

impl VerticalPodAutoscaler {
    /// Reduce the object to the record the join engine consumes.
    /// Objects without a target reference match nothing and are
    /// skipped.
    pub fn to_record(&self) -> Option<RecommendationRecord> {
        let namespace = self.metadata.namespace.clone().unwrap_or_default();

        let Some(target_ref) = self.spec.target_ref.as_ref() else {
            debug!(
                namespace = %namespace,
                name = self.metadata.name.as_deref().unwrap_or_default(),
                "VPA has no target reference"
            );
            return None;
        };

        let mode = self
            .spec
            .update_policy
            .as_ref()
            .and_then(|p| p.update_mode.as_deref())
            .and_then(|m| match m.parse() {
                Ok(mode) => Some(mode),
                Err(_) => {
                    debug!(namespace = %namespace, mode = m, "unrecognized update mode on VPA");
                    None
                }
            });

        let containers = self
            .status
            .as_ref()
            .and_then(|s| s.recommendation.as_ref())
            .map(|rec| {
                rec.container_recommendations
                    .iter()
                    .map(|c| {
                        (
                            c.container_name.clone(),
                            ContainerTarget {
                                cpu_milli: cpu_of(&c.target),
                                memory_bytes: memory_of(&c.target),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(RecommendationRecord {
            namespace,
            target: OwnerRef {
                api_version: target_ref.api_version.clone().unwrap_or_default(),
                kind: target_ref.kind.clone(),
                name: target_ref.name.clone(),
            },
            mode,
            containers,
        })
    }
}
