// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::flux;
use crate::readiness::ReadinessCheck;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_API_STABLE_PROBES: u32 = 3;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Kubeconfig file to use instead of the inferred default
    pub kubeconfig: Option<PathBuf>,
    /// Context inside the kubeconfig
    pub context: Option<String>,
    /// Timeout applied to every readiness check and to the Kustomization wait
    pub timeout: Duration,
    pub wait_for: Vec<ReadinessCheck>,
    /// Consecutive successful probes before the API server counts as stable
    pub api_stable_probes: u32,
    pub reconcile_flux: bool,
    pub flux_namespace: String,
    pub flux_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = parse_or(&lookup, "KCONVERGE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let api_stable_probes =
            parse_or(&lookup, "KCONVERGE_API_STABLE_PROBES", DEFAULT_API_STABLE_PROBES)?;
        let reconcile_flux = parse_or(&lookup, "KCONVERGE_RECONCILE_FLUX", false)?;

        let wait_for = match lookup("KCONVERGE_WAIT_FOR") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<ReadinessCheck>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Invalid KCONVERGE_WAIT_FOR")?,
            None => Vec::new(),
        };

        Ok(Config {
            kubeconfig: lookup("KCONVERGE_KUBECONFIG").map(PathBuf::from),
            context: lookup("KCONVERGE_CONTEXT"),
            timeout: Duration::from_secs(timeout_secs),
            wait_for,
            api_stable_probes,
            reconcile_flux,
            flux_namespace: lookup("KCONVERGE_FLUX_NAMESPACE")
                .unwrap_or_else(|| flux::NAMESPACE.to_string()),
            flux_name: lookup("KCONVERGE_FLUX_NAME").unwrap_or_else(|| flux::ROOT_NAME.to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}
