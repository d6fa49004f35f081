//! The `suggest` subcommand: render a resources snippet from a VPA's
//! recommendation
//!
//! Requests come from the recommendation target, limits from the upper
//! bound with a 1.5 headroom factor.

use anyhow::Result;
use serde::Serialize;
use vpa_core::quantity;

use crate::client::ClusterClient;
use crate::commands::split_target;
use crate::output::{encode, print_warning, OutputFormat};
use crate::vpa::RecommendedContainerResources;

#[derive(Serialize)]
struct Snippet {
    resources: ResourceSection,
}

#[derive(Serialize)]
struct ResourceSection {
    requests: ResourceValues,
    limits: ResourceValues,
}

#[derive(Serialize)]
struct ResourceValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<String>,
}

const LIMIT_HEADROOM: f64 = 1.5;

fn scaled(
    values: &std::collections::BTreeMap<String, k8s_openapi::apimachinery::pkg::api::resource::Quantity>,
    key: &str,
    scale: f64,
) -> Option<String> {
    values.get(key).and_then(|q| quantity::scaled(&q.0, scale))
}

fn snippet(rec: &RecommendedContainerResources) -> Snippet {
    Snippet {
        resources: ResourceSection {
            requests: ResourceValues {
                cpu: scaled(&rec.target, "cpu", 1.0),
                memory: scaled(&rec.target, "memory", 1.0),
            },
            limits: ResourceValues {
                cpu: scaled(&rec.upper_bound, "cpu", LIMIT_HEADROOM),
                memory: scaled(&rec.upper_bound, "memory", LIMIT_HEADROOM),
            },
        },
    }
}

pub async fn run(
    client: &ClusterClient,
    default_namespace: &str,
    target: &str,
    format: OutputFormat,
) -> Result<()> {
    let (namespace, name) = split_target(target, default_namespace);
    let vpa = client.get_vpa(namespace, name).await?;

    let Some(recommendation) = vpa.status.as_ref().and_then(|s| s.recommendation.as_ref())
    else {
        print_warning(&format!(
            "VPA {namespace}/{name} has no recommendations (yet)"
        ));
        return Ok(());
    };

    for container in &recommendation.container_recommendations {
        println!("\n# container {}", container.container_name);
        print!("{}", encode(&snippet(container), format)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;

    fn rec() -> RecommendedContainerResources {
        let mut target = BTreeMap::new();
        target.insert("cpu".to_string(), Quantity("550m".to_string()));
        target.insert("memory".to_string(), Quantity("262144Ki".to_string()));
        let mut upper = BTreeMap::new();
        upper.insert("cpu".to_string(), Quantity("1".to_string()));
        upper.insert("memory".to_string(), Quantity("512Mi".to_string()));
        RecommendedContainerResources {
            container_name: "app".to_string(),
            target,
            upper_bound: upper,
            ..Default::default()
        }
    }

    #[test]
    fn requests_use_target_and_limits_use_scaled_upper_bound() {
        let s = snippet(&rec());
        assert_eq!(s.resources.requests.cpu.as_deref(), Some("550m"));
        assert_eq!(s.resources.requests.memory.as_deref(), Some("256Mi"));
        assert_eq!(s.resources.limits.cpu.as_deref(), Some("1500m"));
        assert_eq!(s.resources.limits.memory.as_deref(), Some("768Mi"));
    }

    #[test]
    fn missing_dimensions_are_omitted() {
        let mut r = rec();
        r.upper_bound.clear();
        let s = snippet(&r);
        assert!(s.resources.limits.cpu.is_none());
        assert!(s.resources.limits.memory.is_none());
    }

    #[test]
    fn snippet_encodes_as_yaml() {
        let text = encode(&snippet(&rec()), OutputFormat::Yaml).unwrap();
        assert!(text.contains("requests:"));
        assert!(text.contains("cpu: 550m"));
    }
}
