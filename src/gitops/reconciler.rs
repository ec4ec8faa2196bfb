// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Drive the root Flux OCIRepository and Kustomization to a converged state.

use crate::constants::{flux, polling};
use crate::error::{ConvergeError, Result};
use crate::gitops::conditions::{
    classify_kustomization, classify_oci_repository, classify_oci_repository_fetch_error,
};
use crate::gitops::poll::{poll_until_classified, Progress, Unconverged, Verdict};
use crate::gitops::trigger::trigger_reconciliation_with_retry;
use crate::kubernetes::classify::classify;
use crate::retry::RetryPolicy;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Bound on the Kustomization wait. The OCIRepository wait has its own fixed bound.
    pub timeout: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
        }
    }
}

/// Triggers and waits on one OCIRepository/Kustomization pair.
///
/// Holds no state between calls; concurrent calls share only the client.
#[derive(Clone)]
pub struct Reconciler {
    client: Client,
    namespace: String,
    name: String,
    retry: RetryPolicy,
    poll_interval: Duration,
    oci_repository_timeout: Duration,
}

impl Reconciler {
    /// Target the root `flux-system` resources
    pub fn new(client: Client) -> Self {
        Self {
            client,
            namespace: flux::NAMESPACE.to_string(),
            name: flux::ROOT_NAME.to_string(),
            retry: RetryPolicy::default(),
            poll_interval: polling::POLL_INTERVAL,
            oci_repository_timeout: polling::OCI_REPOSITORY_TIMEOUT,
        }
    }

    pub fn with_target(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self.name = name.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Trigger and wait for the OCIRepository, then the Kustomization.
    ///
    /// The OCIRepository wait is bounded by its own two minutes on top of `options.timeout`,
    /// so the call as a whole can take longer than `options.timeout`.
    #[instrument(skip(self), fields(namespace = %self.namespace, name = %self.name))]
    pub async fn reconcile(&self, options: &ReconcileOptions) -> Result<()> {
        self.trigger_oci_repository_reconciliation().await?;
        self.wait_for_oci_repository_ready().await?;

        self.trigger_kustomization_reconciliation().await?;
        self.wait_for_kustomization_ready(options.timeout).await?;

        info!("GitOps reconciliation complete");
        Ok(())
    }

    pub async fn trigger_oci_repository_reconciliation(&self) -> Result<()> {
        trigger_reconciliation_with_retry(
            &self.oci_repositories(),
            &self.name,
            flux::OCI_REPOSITORY_KIND,
            &self.retry,
        )
        .await
    }

    pub async fn trigger_kustomization_reconciliation(&self) -> Result<()> {
        trigger_reconciliation_with_retry(
            &self.kustomizations(),
            &self.name,
            flux::KUSTOMIZATION_KIND,
            &self.retry,
        )
        .await
    }

    /// Wait up to two minutes for the OCIRepository to report `Ready=True`.
    ///
    /// A pull failure aborts at once with [`ConvergeError::OciRepositoryNotReady`]. On timeout
    /// the last fetch error is reported if there was one, otherwise the same sentinel.
    #[instrument(skip(self), fields(namespace = %self.namespace, name = %self.name))]
    pub async fn wait_for_oci_repository_ready(&self) -> Result<()> {
        let api = self.oci_repositories();
        let target = self.describe(flux::OCI_REPOSITORY_KIND);
        let timeout = self.oci_repository_timeout;

        let outcome = poll_until_classified(
            &target,
            timeout,
            self.poll_interval,
            || api.get(&self.name),
            |fetched| match fetched {
                Ok(obj) => classify_oci_repository(&obj),
                Err(e) => classify_oci_repository_fetch_error(e),
            },
        )
        .await;

        match outcome {
            Ok(()) => {
                info!("{} is ready", target);
                Ok(())
            }
            Err(Unconverged::Failed(err)) => Err(err),
            Err(Unconverged::TimedOut(Progress {
                last_error: Some(err),
                ..
            })) => Err(ConvergeError::Timeout {
                target,
                timeout,
                detail: Some(err.to_string()),
            }),
            Err(Unconverged::TimedOut(Progress { last_status, .. })) => {
                Err(ConvergeError::OciRepositoryNotReady(format!(
                    "not ready after {:?} ({})",
                    timeout,
                    last_status.unwrap_or_else(|| "no status".to_string())
                )))
            }
        }
    }

    /// Wait for the Kustomization to report a current `Ready=True`.
    ///
    /// Fails early when the Kustomization is stalled or failed for a terminal reason; on timeout
    /// the error carries the last observed status.
    #[instrument(skip(self), fields(namespace = %self.namespace, name = %self.name))]
    pub async fn wait_for_kustomization_ready(&self, timeout: Duration) -> Result<()> {
        let api = self.kustomizations();
        let target = self.describe(flux::KUSTOMIZATION_KIND);

        let outcome = poll_until_classified(
            &target,
            timeout,
            self.poll_interval,
            || api.get(&self.name),
            |fetched| match fetched {
                Ok(obj) => classify_kustomization(&obj),
                Err(e) if classify(&e).is_transient() => Verdict::Retry(e),
                Err(source) => Verdict::Failed(ConvergeError::GetResource {
                    kind: flux::KUSTOMIZATION_KIND,
                    namespace: self.namespace.clone(),
                    name: self.name.clone(),
                    source,
                }),
            },
        )
        .await;

        match outcome {
            Ok(()) => {
                info!("{} is ready", target);
                Ok(())
            }
            Err(Unconverged::Failed(err)) => Err(err),
            Err(Unconverged::TimedOut(progress)) => Err(ConvergeError::Timeout {
                target,
                timeout,
                detail: progress
                    .last_status
                    .or_else(|| progress.last_error.map(|e| e.to_string())),
            }),
        }
    }

    fn describe(&self, kind: &str) -> String {
        format!("{} {}/{}", kind, self.namespace, self.name)
    }

    fn oci_repositories(&self) -> Api<DynamicObject> {
        self.dynamic_api(
            flux::SOURCE_GROUP,
            flux::OCI_REPOSITORY_KIND,
            flux::OCI_REPOSITORY_PLURAL,
        )
    }

    fn kustomizations(&self) -> Api<DynamicObject> {
        self.dynamic_api(
            flux::KUSTOMIZE_GROUP,
            flux::KUSTOMIZATION_KIND,
            flux::KUSTOMIZATION_PLURAL,
        )
    }

    fn dynamic_api(&self, group: &str, kind: &str, plural: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(group, flux::VERSION, kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, plural);
        Api::namespaced_with(self.client.clone(), &self.namespace, &resource)
    }
}
