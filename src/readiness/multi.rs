// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequential readiness waits over a heterogeneous list of workloads.

use crate::error::{ConvergeError, Result};
use crate::readiness::workloads::{wait_for_daemonset_ready, wait_for_deployment_ready};
use kube::Client;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Deployment,
    DaemonSet,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployment",
            ResourceKind::DaemonSet => "daemonset",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ConvergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deployment" => Ok(ResourceKind::Deployment),
            "daemonset" => Ok(ResourceKind::DaemonSet),
            other => Err(ConvergeError::UnknownResourceKind(other.to_string())),
        }
    }
}

/// One workload to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessCheck {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ReadinessCheck {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build a check from a kind string, e.g. one read from configuration.
    pub fn from_parts(kind: &str, namespace: &str, name: &str) -> Result<Self> {
        Ok(Self::new(kind.parse()?, namespace, name))
    }
}

/// Parses `kind:namespace/name`
impl FromStr for ReadinessCheck {
    type Err = ConvergeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ConvergeError::InvalidCheck(s.to_string());
        let (kind, rest) = s.split_once(':').ok_or_else(invalid)?;
        let (namespace, name) = rest.split_once('/').ok_or_else(invalid)?;
        if namespace.is_empty() || name.is_empty() {
            return Err(invalid());
        }
        Self::from_parts(kind, namespace, name)
    }
}

impl fmt::Display for ReadinessCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Wait for every check in order, each bounded by its own `timeout`.
///
/// Checks run one after another, so the worst case is `checks.len() * timeout`. The first
/// failure aborts the call and later checks are never attempted.
pub async fn wait_for_multiple_resources(
    client: &Client,
    checks: &[ReadinessCheck],
    timeout: Duration,
) -> Result<()> {
    for check in checks {
        info!("Waiting for {} {}/{}", check.kind, check.namespace, check.name);

        let result = match check.kind {
            ResourceKind::Deployment => {
                wait_for_deployment_ready(client, &check.namespace, &check.name, timeout).await
            }
            ResourceKind::DaemonSet => {
                wait_for_daemonset_ready(client, &check.namespace, &check.name, timeout).await
            }
        };

        result.map_err(|source| ConvergeError::ResourceWait {
            kind: check.kind.as_str(),
            namespace: check.namespace.clone(),
            name: check.name.clone(),
            source: Box::new(source),
        })?;
    }

    Ok(())
}

/// Parse `(kind, namespace, name)` triples, then wait for them.
///
/// An unknown kind anywhere in the list fails before any API request is made.
pub async fn wait_for_named_resources(
    client: &Client,
    checks: &[(&str, &str, &str)],
    timeout: Duration,
) -> Result<()> {
    let checks = checks
        .iter()
        .map(|(kind, namespace, name)| ReadinessCheck::from_parts(kind, namespace, name))
        .collect::<Result<Vec<_>>>()?;

    wait_for_multiple_resources(client, &checks, timeout).await
}
