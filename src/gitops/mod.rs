// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Flux reconciliation: annotation triggers and condition-aware waits.

pub mod conditions;
pub mod poll;
pub mod reconciler;
pub mod trigger;

pub use conditions::{
    evaluate_kustomization_conditions, evaluate_oci_repository_conditions, is_status_stale,
};
pub use poll::{poll_until_classified, Progress, Unconverged, Verdict};
pub use reconciler::{ReconcileOptions, Reconciler};
pub use trigger::{requested_at_now, trigger_reconciliation_with_retry};
