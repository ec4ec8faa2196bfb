// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};

/// The subset of a Flux resource status that convergence decisions depend on.
/// Always parsed from a freshly fetched object, never cached.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FluxStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl FluxStatus {
    /// Read `.status` from a dynamic object. A missing status is an empty one.
    pub fn from_object(obj: &DynamicObject) -> Result<Self, serde_json::Error> {
        match obj.data.get("status") {
            Some(status) if !status.is_null() => serde_json::from_value(status.clone()),
            _ => Ok(Self::default()),
        }
    }

    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    /// Missing counters read as zero
    pub fn observed_generation(&self) -> i64 {
        self.observed_generation.unwrap_or(0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl Condition {
    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// `metadata.generation`, zero when unset
pub fn generation(obj: &DynamicObject) -> i64 {
    obj.metadata.generation.unwrap_or(0)
}
