// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;

/// Kubernetes annotation keys written by kconverge
pub mod annotations {
    /// Flux reads this annotation and reconciles immediately when its value changes
    pub const RECONCILE_REQUESTED_AT: &str = "reconcile.fluxcd.io/requestedAt";
}

/// Readiness polling configuration
pub mod polling {
    use super::Duration;

    /// Fixed interval between readiness checks
    pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
    /// Internal bound on the OCIRepository wait, independent of the caller's timeout
    pub const OCI_REPOSITORY_TIMEOUT: Duration = Duration::from_secs(120);
}

/// Flux resources driven by the GitOps reconciler
pub mod flux {
    pub const NAMESPACE: &str = "flux-system";
    /// Name of the root OCIRepository and Kustomization
    pub const ROOT_NAME: &str = "flux-system";

    pub const SOURCE_GROUP: &str = "source.toolkit.fluxcd.io";
    pub const KUSTOMIZE_GROUP: &str = "kustomize.toolkit.fluxcd.io";
    pub const VERSION: &str = "v1";

    pub const OCI_REPOSITORY_KIND: &str = "OCIRepository";
    pub const OCI_REPOSITORY_PLURAL: &str = "ocirepositories";
    pub const KUSTOMIZATION_KIND: &str = "Kustomization";
    pub const KUSTOMIZATION_PLURAL: &str = "kustomizations";
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRDs
    pub const POLL_INTERVAL_SECS: u64 = 2;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 30;
}
