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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Observed metrics of a stake pool for one epoch as delivered by the upstream source. Only
/// `epoch_no` and `epoch_ros` are interpreted; all other fields, e.g. `active_stake` or
/// `block_cnt`, are carried as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochRecord(Map<String, Value>);

impl EpochRecord {
    /// The epoch number; 0 if absent or not a non-negative whole number.
    pub fn epoch_no(&self) -> u64 {
        match self.0.get("epoch_no") {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n < u64::MAX as f64)
                        .map(|n| n as u64)
                })
                .unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            _ => 0,
        }
    }

    /// The reward-of-stake for this epoch, if present and a finite decimal. Upstream delivers
    /// decimals as strings, but plain numbers are accepted as well.
    pub fn epoch_ros(&self) -> Option<f64> {
        let ros = match self.0.get("epoch_ros")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        ros.filter(|ros| ros.is_finite())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for EpochRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for EpochRecord {
    type Error = Value;

    /// Only mappings are epoch records; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

/// Progress of the current epoch at the time a snapshot is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochProgress {
    pub epoch_no: u64,

    /// Unix seconds.
    pub start_time: i64,

    /// Unix seconds.
    pub end_time: i64,

    /// Elapsed share of the epoch, clamped to [0, 100].
    pub progress_pct: f64,
}

impl EpochProgress {
    /// Derive the progress from the first entry of an `epoch_info` response. `None` if that
    /// entry is missing, lacks any of `epoch_no`, `start_time` and `end_time` or describes an
    /// empty epoch.
    pub fn from_epoch_info(epoch_info: &Value, now: DateTime<Utc>) -> Option<Self> {
        let latest = epoch_info.as_array()?.first()?;

        let epoch_no = latest.get("epoch_no")?.as_u64()?;
        let start_time = latest.get("start_time")?.as_i64()?;
        let end_time = latest.get("end_time")?.as_i64()?;
        if end_time <= start_time {
            return None;
        }

        let elapsed = now.timestamp_millis() as f64 / 1000.0 - start_time as f64;
        let duration = (end_time - start_time) as f64;
        let progress_pct = (elapsed / duration * 100.0).clamp(0.0, 100.0);

        Some(Self {
            epoch_no,
            start_time,
            end_time,
            progress_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{EpochProgress, EpochRecord};
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    fn record(value: Value) -> EpochRecord {
        EpochRecord::try_from(value).expect("record is a mapping")
    }

    #[test]
    fn test_epoch_no() {
        assert_eq!(record(json!({ "epoch_no": 42 })).epoch_no(), 42);
        assert_eq!(record(json!({ "epoch_no": "42" })).epoch_no(), 42);
        assert_eq!(record(json!({ "epoch_no": 42.0 })).epoch_no(), 42);
        assert_eq!(record(json!({})).epoch_no(), 0);
        assert_eq!(record(json!({ "epoch_no": null })).epoch_no(), 0);
        assert_eq!(record(json!({ "epoch_no": -1 })).epoch_no(), 0);
        assert_eq!(record(json!({ "epoch_no": 1.5 })).epoch_no(), 0);
        assert_eq!(record(json!({ "epoch_no": -2.0 })).epoch_no(), 0);
        assert_eq!(record(json!({ "epoch_no": [1] })).epoch_no(), 0);
    }

    #[test]
    fn test_epoch_ros() {
        assert_eq!(record(json!({ "epoch_ros": "0.03" })).epoch_ros(), Some(0.03));
        assert_eq!(record(json!({ "epoch_ros": " 0.03 " })).epoch_ros(), Some(0.03));
        assert_eq!(record(json!({ "epoch_ros": 0.05 })).epoch_ros(), Some(0.05));
        assert_eq!(record(json!({ "epoch_ros": 0 })).epoch_ros(), Some(0.0));

        assert_eq!(record(json!({})).epoch_ros(), None);
        assert_eq!(record(json!({ "epoch_ros": null })).epoch_ros(), None);
        assert_eq!(record(json!({ "epoch_ros": "" })).epoch_ros(), None);
        assert_eq!(record(json!({ "epoch_ros": "n/a" })).epoch_ros(), None);
        assert_eq!(record(json!({ "epoch_ros": "NaN" })).epoch_ros(), None);
        assert_eq!(record(json!({ "epoch_ros": "inf" })).epoch_ros(), None);
        assert_eq!(record(json!({ "epoch_ros": true })).epoch_ros(), None);
    }

    #[test]
    fn test_try_from_value() {
        assert_matches!(EpochRecord::try_from(json!({ "epoch_no": 1 })), Ok(r) if r.epoch_no() == 1);
        assert_matches!(EpochRecord::try_from(json!(1)), Err(Value::Number(_)));
        assert_matches!(EpochRecord::try_from(Value::Null), Err(Value::Null));
    }

    #[test]
    fn test_record_serializes_unchanged() {
        let value = json!({
            "epoch_no": 500,
            "active_stake": "12345678901",
            "block_cnt": 3,
            "epoch_ros": "0.0312",
            "member_rewards": null
        });

        let serialized = serde_json::to_value(record(value.clone())).unwrap();
        assert_eq!(serialized, value);
    }

    #[test]
    fn test_epoch_progress() {
        let epoch_info = json!([{ "epoch_no": 500, "start_time": 1000, "end_time": 2000 }]);

        let now = Utc.timestamp_opt(1250, 0).unwrap();
        let progress = EpochProgress::from_epoch_info(&epoch_info, now);
        assert_eq!(
            progress,
            Some(EpochProgress {
                epoch_no: 500,
                start_time: 1000,
                end_time: 2000,
                progress_pct: 25.0,
            })
        );

        let now = Utc.timestamp_opt(5000, 0).unwrap();
        let progress = EpochProgress::from_epoch_info(&epoch_info, now);
        assert_matches!(progress, Some(p) if p.progress_pct == 100.0);

        let now = Utc.timestamp_opt(0, 0).unwrap();
        let progress = EpochProgress::from_epoch_info(&epoch_info, now);
        assert_matches!(progress, Some(p) if p.progress_pct == 0.0);
    }

    #[test]
    fn test_epoch_progress_malformed() {
        let now = Utc.timestamp_opt(1250, 0).unwrap();

        assert_eq!(EpochProgress::from_epoch_info(&json!([]), now), None);
        assert_eq!(EpochProgress::from_epoch_info(&json!({}), now), None);
        assert_eq!(EpochProgress::from_epoch_info(&Value::Null, now), None);
        assert_eq!(
            EpochProgress::from_epoch_info(&json!([{ "epoch_no": 500, "start_time": 1000 }]), now),
            None
        );
        assert_eq!(
            EpochProgress::from_epoch_info(
                &json!([{ "epoch_no": 500, "start_time": 2000, "end_time": 2000 }]),
                now
            ),
            None
        );
    }
}
