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

use crate::domain::{
    EpochProgress, PoolId, PoolSnapshot, PoolSource, SnapshotSink, delegators_from,
    normalize_history, pool_info_from,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use metrics::{counter, gauge};
use pool_common::error::StdErrorExt;
use serde::Deserialize;
use serde_json::Value;
use std::{error::Error as StdError, future::Future, time::Duration};
use tokio::{
    select,
    signal::unix::Signal,
    time::{MissedTickBehavior, interval},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pool_id: PoolId,

    /// Period for refreshing the snapshot; if not set, a single snapshot is created.
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

pub async fn run(
    config: Config,
    source: impl PoolSource,
    sink: impl SnapshotSink,
    mut sigterm: Signal,
) -> anyhow::Result<()> {
    let Config { pool_id, interval: period } = config;

    let Some(period) = period else {
        run_once(&pool_id, &source, &sink, Utc::now()).await?;
        return Ok(());
    };

    info!(pool_id:%, period:?; "refreshing pool snapshot periodically");
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            biased;

            _ = sigterm.recv() => {
                warn!("SIGTERM received");
                return Ok(());
            }

            result = async {
                ticker.tick().await;
                run_once(&pool_id, &source, &sink, Utc::now()).await
            } => {
                if let Err(error) = result {
                    error!(error:?; "cannot refresh pool snapshot");
                }
            }
        }
    }
}

/// Query all pool data, assemble a snapshot and write it. Failing queries are replaced by empty
/// defaults; only failing to write the snapshot is an error.
pub async fn run_once(
    pool_id: &PoolId,
    source: &impl PoolSource,
    sink: &impl SnapshotSink,
    now: DateTime<Utc>,
) -> anyhow::Result<PoolSnapshot> {
    let pool_info = query_or_null("pool_info", source.pool_info(pool_id)).await;
    let delegators = query_or_null("pool_delegators", source.pool_delegators(pool_id)).await;
    let history = query_or_null("pool_history", source.pool_history(pool_id)).await;
    let epoch_info = query_or_null("epoch_info", source.epoch_info()).await;

    let history = normalize_history(history);
    let snapshot = PoolSnapshot::assemble(
        pool_info_from(pool_info),
        delegators_from(delegators),
        &history,
        EpochProgress::from_epoch_info(&epoch_info, now),
        now,
    );

    sink.write(&snapshot).await.context("write pool snapshot")?;

    counter!("pool_snapshot_written_total").increment(1);
    gauge!("pool_snapshot_history_epochs").set(snapshot.stats.epochs_count as f64);
    info!(
        pool_id:%,
        history_entries = snapshot.history.len(),
        avg_ros_all:? = snapshot.stats.avg_ros_all;
        "pool snapshot written"
    );

    Ok(snapshot)
}

async fn query_or_null<E>(
    query: &'static str,
    response: impl Future<Output = Result<Value, E>>,
) -> Value
where
    E: StdError,
{
    match response.await {
        Ok(value) => value,

        Err(error) => {
            warn!(query, error = error.as_chain(); "query failed, using default");
            counter!("pool_snapshot_query_failures_total", "query" => query).increment(1);
            Value::Null
        }
    }
}
