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

use crate::domain::EpochRecord;
use log::warn;
use serde_json::Value;

const HISTORY_FIELD: &str = "history";

/// The shapes in which the upstream source delivers the epoch history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryShape {
    /// A sequence of epoch records.
    Flat(Vec<Value>),

    /// A sequence whose first element wraps the epoch records in a `history` field.
    Wrapped(Vec<Value>),

    /// Anything else, e.g. null or an error object.
    Absent,
}

impl HistoryShape {
    pub fn classify(raw: Value) -> Self {
        let Value::Array(mut items) = raw else {
            return Self::Absent;
        };

        let wrapped = items
            .first_mut()
            .and_then(Value::as_object_mut)
            .and_then(|first| first.remove(HISTORY_FIELD));

        match wrapped {
            Some(Value::Array(records)) => Self::Wrapped(records),
            Some(_) => Self::Wrapped(vec![]),
            None => Self::Flat(items),
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Flat(items) | Self::Wrapped(items) => items,
            Self::Absent => vec![],
        }
    }
}

/// Normalize a raw epoch history into epoch records ordered by ascending epoch number. Records
/// without an epoch number sort as epoch 0; the sort is stable and duplicates are kept. Items
/// which are not mappings are skipped.
pub fn normalize_history(raw: Value) -> Vec<EpochRecord> {
    let mut records = HistoryShape::classify(raw)
        .into_items()
        .into_iter()
        .filter_map(|item| match EpochRecord::try_from(item) {
            Ok(record) => Some(record),
            Err(item) => {
                warn!(item:%; "skipping history item which is not an epoch record");
                None
            }
        })
        .collect::<Vec<_>>();

    records.sort_by_key(EpochRecord::epoch_no);
    records
}

/// The last `n` records in their original order; all of them if there are fewer.
pub fn trailing<T>(records: &[T], n: usize) -> &[T] {
    &records[records.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use crate::domain::{EpochRecord, HistoryShape, normalize_history, trailing};
    use assert_matches::assert_matches;
    use serde_json::{Value, json};

    fn epoch_nos(records: &[EpochRecord]) -> Vec<u64> {
        records.iter().map(EpochRecord::epoch_no).collect()
    }

    #[test]
    fn test_classify() {
        assert_matches!(
            HistoryShape::classify(json!([{ "epoch_no": 1 }])),
            HistoryShape::Flat(items) if items.len() == 1
        );
        assert_matches!(HistoryShape::classify(json!([])), HistoryShape::Flat(items) if items.is_empty());
        assert_matches!(
            HistoryShape::classify(json!([{ "history": [{ "epoch_no": 1 }, { "epoch_no": 2 }] }])),
            HistoryShape::Wrapped(items) if items.len() == 2
        );
        assert_matches!(
            HistoryShape::classify(json!([{ "history": null }])),
            HistoryShape::Wrapped(items) if items.is_empty()
        );
        assert_matches!(HistoryShape::classify(Value::Null), HistoryShape::Absent);
        assert_matches!(HistoryShape::classify(json!({ "history": [] })), HistoryShape::Absent);
        assert_matches!(HistoryShape::classify(json!("error")), HistoryShape::Absent);
    }

    #[test]
    fn test_normalize_flat() {
        let records = normalize_history(json!([
            { "epoch_no": 3, "epoch_ros": "0.05" },
            { "epoch_no": 1, "epoch_ros": "0.03" },
            { "epoch_no": 2, "epoch_ros": null }
        ]));

        assert_eq!(epoch_nos(&records), vec![1, 2, 3]);
    }

    #[test]
    fn test_normalize_float_epoch_no() {
        let records = normalize_history(json!([{ "epoch_no": 5.0 }, { "epoch_no": 3 }]));
        assert_eq!(epoch_nos(&records), vec![3, 5]);
    }

    #[test]
    fn test_normalize_wrapped() {
        let records = normalize_history(json!([{ "history": [{ "epoch_no": 5, "epoch_ros": "0.1" }] }]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].epoch_no(), 5);
        assert_eq!(records[0].epoch_ros(), Some(0.1));
    }

    #[test]
    fn test_normalize_absent() {
        assert!(normalize_history(Value::Null).is_empty());
        assert!(normalize_history(json!({ "epoch_no": 1 })).is_empty());
        assert!(normalize_history(json!(42)).is_empty());
    }

    #[test]
    fn test_normalize_missing_epoch_no_and_duplicates() {
        let records = normalize_history(json!([
            { "epoch_no": 2, "tag": "a" },
            { "tag": "missing" },
            { "epoch_no": 2, "tag": "b" },
            { "epoch_no": 1 },
            "not a record"
        ]));

        assert_eq!(epoch_nos(&records), vec![0, 1, 2, 2]);
        let tags = records
            .iter()
            .filter_map(|record| record.fields().get("tag"))
            .collect::<Vec<_>>();
        assert_eq!(tags, vec!["missing", "a", "b"]);
    }

    #[test]
    fn test_normalize_keeps_count_and_order() {
        let raw = (0..100u64).rev().map(|n| json!({ "epoch_no": n % 37 })).collect::<Vec<_>>();
        let records = normalize_history(Value::Array(raw));

        assert_eq!(records.len(), 100);
        assert!(records.windows(2).all(|w| w[0].epoch_no() <= w[1].epoch_no()));
    }

    #[test]
    fn test_trailing() {
        let items = (1..=40).collect::<Vec<_>>();

        assert_eq!(trailing(&items, 30), &items[10..]);
        assert_eq!(trailing(&items[..30], 30), &items[..30]);
        assert_eq!(trailing(&items[..5], 30), &items[..5]);
        assert_eq!(trailing(&items, 1), &[40]);
        assert!(trailing(&items, 0).is_empty());

        let empty: &[u64] = &[];
        assert!(trailing(empty, 30).is_empty());
    }
}
