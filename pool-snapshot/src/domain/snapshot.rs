// This file is part of pool-snapshot.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::{EpochProgress, EpochRecord, average_ros, trailing};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Number of trailing epochs shown in the snapshot history and averaged for `avg_ros_last_30`.
pub const HISTORY_WINDOW: usize = 30;

/// Aggregate statistics over the epoch history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub avg_ros_all: Option<f64>,
    pub avg_ros_last_30: Option<f64>,
    pub epochs_count: usize,
    pub epochs_last_30_count: usize,
}

impl StatsSummary {
    /// Compute the statistics for the given normalized history.
    pub fn new(history: &[EpochRecord]) -> Self {
        Self {
            avg_ros_all: average_ros(history, None),
            avg_ros_last_30: average_ros(history, Some(HISTORY_WINDOW)),
            epochs_count: history.len(),
            epochs_last_30_count: trailing(history, HISTORY_WINDOW).len(),
        }
    }
}

/// The document consumed by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSnapshot {
    #[serde(rename = "poolInfo")]
    pub pool_info: Map<String, Value>,

    pub delegators: Vec<Value>,

    /// The trailing [HISTORY_WINDOW] epochs.
    pub history: Vec<EpochRecord>,

    pub stats: StatsSummary,

    pub generated_at: DateTime<Utc>,

    #[serde(rename = "currentEpoch", skip_serializing_if = "Option::is_none")]
    pub current_epoch: Option<EpochProgress>,
}

impl PoolSnapshot {
    /// Assemble a snapshot from the given normalized history and the other, independently
    /// obtained, parts. Nothing is validated.
    pub fn assemble(
        pool_info: Map<String, Value>,
        delegators: Vec<Value>,
        history: &[EpochRecord],
        current_epoch: Option<EpochProgress>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pool_info,
            delegators,
            history: trailing(history, HISTORY_WINDOW).to_vec(),
            stats: StatsSummary::new(history),
            generated_at,
            current_epoch,
        }
    }
}

/// Pool metadata from a `pool_info` response, i.e. its first entry if that is a mapping.
pub fn pool_info_from(response: Value) -> Map<String, Value> {
    match response {
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(pool_info)) => pool_info,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Delegators from a `pool_delegators` response; empty unless it is a sequence.
pub fn delegators_from(response: Value) -> Vec<Value> {
    match response {
        Value::Array(delegators) => delegators,
        _ => vec![],
    }
}
