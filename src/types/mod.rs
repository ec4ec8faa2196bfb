// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Status models read from Flux resources.

pub mod flux;

pub use flux::{Condition, ConditionStatus, FluxStatus};
