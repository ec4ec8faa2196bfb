// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, CRD discovery, and error classification.

pub mod classify;
pub mod client;
pub mod crd;

pub use classify::{classify, is_not_found, is_transient, ErrorClass};
pub use client::create_client;
pub use crd::wait_for_flux_crds;
