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

mod epoch;
mod history;
mod pool_id;
mod ros;
mod snapshot;

pub use epoch::*;
pub use history::*;
pub use pool_id::*;
pub use ros::*;
pub use snapshot::*;

use serde_json::Value;
use std::error::Error as StdError;

/// Source of public stake pool data. Responses are raw JSON because their shape is not under
/// our control.
#[trait_variant::make(Send)]
pub trait PoolSource
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// Pool metadata, a sequence with one mapping per requested pool.
    async fn pool_info(&self, pool_id: &PoolId) -> Result<Value, Self::Error>;

    async fn pool_delegators(&self, pool_id: &PoolId) -> Result<Value, Self::Error>;

    /// Per-epoch metrics, flat or wrapped, see [HistoryShape].
    async fn pool_history(&self, pool_id: &PoolId) -> Result<Value, Self::Error>;

    /// Information about the latest epoch, a sequence with at most one mapping.
    async fn epoch_info(&self) -> Result<Value, Self::Error>;
}

/// Destination for pool snapshots; each write fully replaces the previous snapshot.
#[trait_variant::make(Send)]
pub trait SnapshotSink
where
    Self: Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    async fn write(&self, snapshot: &PoolSnapshot) -> Result<(), Self::Error>;
}
