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

use crate::domain::{EpochRecord, trailing};

/// Arithmetic mean of `epoch_ros` over the given records, optionally restricted to the trailing
/// `window` records by ascending epoch number; a window of 0 means no restriction. Records
/// without a valid `epoch_ros` are skipped. `None` if no record has a valid `epoch_ros`.
pub fn average_ros(records: &[EpochRecord], window: Option<usize>) -> Option<f64> {
    if records.is_empty() {
        return None;
    }

    let mut sorted = records.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|record| record.epoch_no());

    let retained = match window {
        Some(window) if window > 0 => trailing(&sorted, window),
        _ => sorted.as_slice(),
    };

    let (sum, count) = retained
        .iter()
        .filter_map(|record| record.epoch_ros())
        .fold((0.0, 0usize), |(sum, count), ros| (sum + ros, count + 1));

    (count > 0).then(|| sum / count as f64)
}
