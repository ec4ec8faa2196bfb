// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which half of a reconcile trigger failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerStage {
    Get,
    Update,
}

#[derive(Error, Debug)]
pub enum ConvergeError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("failed to get {kind} {namespace}/{name}: {}", ApiMessage(.source))]
    GetResource {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("unknown resource type: {0}")]
    UnknownResourceKind(String),

    #[error("invalid readiness check '{0}', expected kind:namespace/name")]
    InvalidCheck(String),

    #[error("failed waiting for {kind} {namespace}/{name}: {source}")]
    ResourceWait {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: Box<ConvergeError>,
    },

    #[error("timed out after {timeout:?} waiting for {target}{}", Detail(.detail))]
    Timeout {
        target: String,
        timeout: Duration,
        detail: Option<String>,
    },

    #[error("{}", TriggerMessage(.stage, .description, .source))]
    Trigger {
        stage: TriggerStage,
        description: String,
        #[source]
        source: kube::Error,
    },

    #[error("OCIRepository is not ready, push an artifact to the registry first: {0}")]
    OciRepositoryNotReady(String),

    #[error("kustomization reconciliation failed: {0}")]
    KustomizationFailed(String),
}

impl ConvergeError {
    /// True when this error, or the error it wraps, is the OCIRepository not-ready sentinel
    pub fn is_oci_repository_not_ready(&self) -> bool {
        match self {
            ConvergeError::OciRepositoryNotReady(_) => true,
            ConvergeError::ResourceWait { source, .. } => source.is_oci_repository_not_ready(),
            _ => false,
        }
    }

    /// True when this error, or the error it wraps, is the Kustomization failure sentinel
    pub fn is_kustomization_failed(&self) -> bool {
        match self {
            ConvergeError::KustomizationFailed(_) => true,
            ConvergeError::ResourceWait { source, .. } => source.is_kustomization_failed(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            ConvergeError::Timeout { .. } => true,
            ConvergeError::ResourceWait { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

struct Detail<'a>(&'a Option<String>);

impl fmt::Display for Detail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(detail) => write!(f, " (last status: {})", detail),
            None => Ok(()),
        }
    }
}

struct TriggerMessage<'a>(&'a TriggerStage, &'a String, &'a kube::Error);

impl fmt::Display for TriggerMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            TriggerStage::Get => write!(f, "get {}: {}", self.1, ApiMessage(self.2)),
            TriggerStage::Update => {
                write!(f, "trigger {} reconciliation: {}", self.1, ApiMessage(self.2))
            }
        }
    }
}

/// The server's message for API errors; the full error stays reachable through `source()`
struct ApiMessage<'a>(&'a kube::Error);

impl fmt::Display for ApiMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            kube::Error::Api(response) => f.write_str(&response.message),
            other => write!(f, "{}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvergeError>;
