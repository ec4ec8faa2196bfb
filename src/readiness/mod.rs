// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Polling waits for workloads and the API server.

pub mod apiserver;
pub mod multi;
pub mod poller;
pub mod workloads;

pub use apiserver::{wait_for_api_server_ready, wait_for_api_server_stable};
pub use multi::{wait_for_multiple_resources, wait_for_named_resources, ReadinessCheck, ResourceKind};
pub use poller::{poll_for_readiness, poll_for_readiness_every};
pub use workloads::{
    is_daemonset_ready, is_deployment_ready, wait_for_daemonset_ready, wait_for_deployment_ready,
};
