// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Interpretation of Flux `status.conditions`.

use crate::error::ConvergeError;
use crate::gitops::poll::Verdict;
use crate::kubernetes::classify::{contains_any, is_not_found};
use crate::types::flux::{generation, ConditionStatus, FluxStatus};
use crate::types::Condition;
use kube::api::DynamicObject;

pub const READY: &str = "Ready";
pub const STALLED: &str = "Stalled";

/// OCIRepository reasons meaning the artifact cannot be pulled
const OCI_PULL_FAILED_REASONS: &[&str] = &["OCIPullFailed", "OCIArtifactPullFailed"];

/// Registry errors surfaced on fetch meaning the artifact is absent
const OCI_MISSING_ARTIFACT_MESSAGES: &[&str] = &["manifest unknown", "does not exist"];

/// Kustomization `Ready=False` reasons that retrying will not clear
const KUSTOMIZATION_TERMINAL_REASONS: &[&str] = &[
    "ReconciliationFailed",
    "ValidationFailed",
    "DependencyNotReady",
    "ArtifactFailed",
];

/// The controller has not yet processed the latest spec change
pub fn is_status_stale(generation: i64, observed_generation: i64) -> bool {
    observed_generation < generation
}

/// Classify a Kustomization's conditions, assuming its status is current.
pub fn evaluate_kustomization_conditions(conditions: &[Condition]) -> Verdict {
    let ready = conditions.iter().find(|c| c.condition_type == READY);
    if ready.is_some_and(Condition::is_true) {
        return Verdict::Converged;
    }

    if let Some(stalled) = conditions
        .iter()
        .find(|c| c.condition_type == STALLED && c.is_true())
    {
        return Verdict::Failed(ConvergeError::KustomizationFailed(format!(
            "stalled: {}",
            stalled.message
        )));
    }

    match ready {
        Some(ready)
            if ready.status == ConditionStatus::False
                && KUSTOMIZATION_TERMINAL_REASONS.contains(&ready.reason.as_str()) =>
        {
            Verdict::Failed(ConvergeError::KustomizationFailed(format!(
                "{} - {}",
                ready.reason, ready.message
            )))
        }
        Some(ready) => Verdict::Pending(format!("{}: {}", ready.reason, ready.message)),
        None => Verdict::Pending("waiting for Ready condition".to_string()),
    }
}

/// Classify a fetched Kustomization.
///
/// Generation bookkeeping is checked before any condition: a `Ready=True` left over from an
/// earlier generation must not count.
pub fn classify_kustomization(obj: &DynamicObject) -> Verdict {
    let status = match FluxStatus::from_object(obj) {
        Ok(status) => status,
        Err(e) => return Verdict::Pending(format!("unreadable status: {}", e)),
    };

    if status.conditions.is_empty() {
        return Verdict::Pending("no conditions yet".to_string());
    }

    let generation = generation(obj);
    let observed = status.observed_generation();
    if is_status_stale(generation, observed) {
        return Verdict::Pending(format!(
            "waiting for controller (generation {}, observed {})",
            generation, observed
        ));
    }

    evaluate_kustomization_conditions(&status.conditions)
}

/// Classify an OCIRepository's conditions.
pub fn evaluate_oci_repository_conditions(conditions: &[Condition]) -> Verdict {
    if conditions.is_empty() {
        return Verdict::Pending("no conditions yet".to_string());
    }

    match conditions.iter().find(|c| c.condition_type == READY) {
        Some(ready) if ready.is_true() => Verdict::Converged,
        Some(ready) if OCI_PULL_FAILED_REASONS.contains(&ready.reason.as_str()) => {
            Verdict::Failed(ConvergeError::OciRepositoryNotReady(ready.message.clone()))
        }
        Some(ready) => Verdict::Pending(format!("{}: {}", ready.reason, ready.message)),
        None => Verdict::Pending("waiting for Ready condition".to_string()),
    }
}

pub fn classify_oci_repository(obj: &DynamicObject) -> Verdict {
    match FluxStatus::from_object(obj) {
        Ok(status) => evaluate_oci_repository_conditions(&status.conditions),
        Err(e) => Verdict::Pending(format!("unreadable status: {}", e)),
    }
}

/// NotFound may just mean "not created yet"; a missing artifact will not appear on its own.
pub fn classify_oci_repository_fetch_error(err: kube::Error) -> Verdict {
    if is_not_found(&err) {
        return Verdict::Retry(err);
    }
    if contains_any(&err.to_string(), OCI_MISSING_ARTIFACT_MESSAGES) {
        return Verdict::Failed(ConvergeError::OciRepositoryNotReady(err.to_string()));
    }
    Verdict::Retry(err)
}
