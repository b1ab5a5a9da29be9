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

use log::{info, warn};
use logforth::{filter::env_filter::EnvFilterBuilder, layout::JsonLayout};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Deserialize;
use std::net::IpAddr;

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "metrics")]
    pub metrics_config: MetricsConfig,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: IpAddr,
    pub port: u16,
}

/// Initialize logging as JSON to stdout, filtered via `RUST_LOG` which defaults to `info`.
pub fn init_logging() {
    logforth::starter_log::stdout()
        .filter(EnvFilterBuilder::from_default_env_or("info").build())
        .layout(JsonLayout::default())
        .apply();
}

/// Install the Prometheus exporter serving metrics over HTTP if enabled. Must be called from
/// within a tokio runtime.
pub fn init_metrics(config: MetricsConfig) {
    let MetricsConfig {
        enabled,
        address,
        port,
    } = config;

    if !enabled {
        return;
    }

    match PrometheusBuilder::new()
        .with_http_listener((address, port))
        .install()
    {
        Ok(()) => info!(address:?, port; "serving metrics"),
        Err(error) => warn!(error:%; "cannot install Prometheus exporter"),
    }
}
