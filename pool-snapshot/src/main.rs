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

use anyhow::Context;
use log::{error, info};
use pool_common::{config::ConfigExt, telemetry};
use pool_snapshot::{
    application,
    config::Config,
    infra::{self, file::FileSink, koios::KoiosClient},
};
use std::panic;
use tokio::signal::unix::{SignalKind, signal};

#[tokio::main]
async fn main() {
    telemetry::init_logging();
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    if let Err(error) = run().await {
        let backtrace = error.backtrace();
        let error = format!("{error:#}");
        error!(error, backtrace:%; "process exited with ERROR");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler can be registered");

    let config = Config::load().context("load configuration")?;
    info!(config:?; "starting");
    let Config {
        application_config,
        infra_config,
        telemetry_config: telemetry::Config { metrics_config },
    } = config;

    telemetry::init_metrics(metrics_config);

    let infra::Config {
        koios_config,
        file_config,
    } = infra_config;

    let source = KoiosClient::new(koios_config).context("create Koios client")?;
    let sink = FileSink::new(file_config);

    application::run(application_config, source, sink, sigterm)
        .await
        .context("run pool snapshot application")
}
