//! Cluster access
//!
//! A thin wrapper over one `kube::Client` holding the namespace scope.
//! Listing failures on the two primary listings are fatal for the whole
//! run; only the per-name getters distinguish "not found" so the
//! callers can keep going with the next name.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Client, Config};
use serde_json::json;
use thiserror::Error;
use vpa_core::models::Mode;

use crate::vpa::VerticalPodAutoscaler;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("kubernetes error: {0}")]
    Connection(#[from] kube::Error),

    #[error("unable to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("unable to infer cluster configuration: {0}")]
    Config(#[from] kube::config::InferConfigError),

    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },
}

pub struct ClusterClient {
    client: Client,
    /// `None` means all namespaces.
    namespace: Option<String>,
}

impl ClusterClient {
    /// Connect using an explicit kubeconfig path or the ambient
    /// configuration (KUBECONFIG, in-cluster, default path).
    pub async fn connect(
        kubeconfig: Option<&str>,
        namespace: Option<String>,
    ) -> Result<Self, ClientError> {
        let config = match kubeconfig {
            Some(path) => {
                let kc = kube::config::Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kc, &kube::config::KubeConfigOptions::default())
                    .await?
            }
            None => Config::infer().await?,
        };
        let client = Client::try_from(config)?;
        Ok(ClusterClient { client, namespace })
    }

    fn scoped<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    pub async fn list_pods(&self) -> Result<Vec<Pod>, ClientError> {
        let api: Api<Pod> = self.scoped();
        Ok(api.list(&ListParams::default()).await?.items)
    }

    pub async fn list_vpas(&self) -> Result<Vec<VerticalPodAutoscaler>, ClientError> {
        let api: Api<VerticalPodAutoscaler> = self.scoped();
        Ok(api.list(&ListParams::default()).await?.items)
    }

    pub async fn get_vpa(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<VerticalPodAutoscaler, ClientError> {
        let api: Api<VerticalPodAutoscaler> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(vpa) => Ok(vpa),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Err(ClientError::NotFound {
                kind: "VerticalPodAutoscaler",
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a single JSON-patch `replace` on a VPA's update mode.
    pub async fn set_update_mode(
        &self,
        namespace: &str,
        name: &str,
        mode: Mode,
    ) -> Result<(), ClientError> {
        let api: Api<VerticalPodAutoscaler> = Api::namespaced(self.client.clone(), namespace);
        match api
            .patch(
                name,
                &PatchParams::default(),
                &Patch::Json::<()>(update_mode_patch(mode)),
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Err(ClientError::NotFound {
                kind: "VerticalPodAutoscaler",
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, ClientError> {
        maybe(Api::namespaced(self.client.clone(), namespace).get(name).await)
    }

    pub async fn daemon_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DaemonSet>, ClientError> {
        maybe(Api::namespaced(self.client.clone(), namespace).get(name).await)
    }

    pub async fn stateful_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<StatefulSet>, ClientError> {
        maybe(Api::namespaced(self.client.clone(), namespace).get(name).await)
    }

    pub async fn deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, ClientError> {
        maybe(Api::namespaced(self.client.clone(), namespace).get(name).await)
    }

    pub async fn cron_job(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<CronJob>, ClientError> {
        maybe(Api::namespaced(self.client.clone(), namespace).get(name).await)
    }

    /// batch/v1beta1 CronJob, kept for clusters that still serve the
    /// deprecated group. k8s-openapi no longer ships these types, so
    /// the probe goes through a dynamic object.
    pub async fn legacy_cron_job(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DynamicObject>, ClientError> {
        let gvk = GroupVersionKind::gvk("batch", "v1beta1", "CronJob");
        let resource = ApiResource::from_gvk(&gvk);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &resource);
        maybe(api.get(name).await)
    }
}

/// The single `replace` operation carried by the update-mode patch.
fn update_mode_patch(mode: Mode) -> json_patch::Patch {
    json_patch::Patch(vec![json_patch::PatchOperation::Replace(
        json_patch::ReplaceOperation {
            path: "/spec/updatePolicy/updateMode".to_string(),
            value: json!(mode.to_string()),
        },
    )])
}

/// Turn a 404 into `None`; anything else stays an error.
fn maybe<T>(result: Result<T, kube::Error>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
        Err(e) => Err(e.into()),
    }
}
