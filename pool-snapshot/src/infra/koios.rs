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

use crate::domain::{PoolId, PoolSource};
use log::debug;
use pool_common::error::BoxError;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// Config for the Koios REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL including the API version, e.g. `https://api.koios.rest/api/v1`.
    pub base_url: String,

    /// Deadline for each request.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// A [PoolSource] implementation based on the Koios REST API.
#[derive(Debug, Clone)]
pub struct KoiosClient {
    http: HttpClient,
    base_url: String,
}

impl KoiosClient {
    /// Create a new [KoiosClient] with the given [Config].
    pub fn new(config: Config) -> Result<Self, KoiosError> {
        let Config { base_url, timeout } = config;

        let http = HttpClient::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(KoiosError::Client)?;
        let base_url = base_url.trim_end_matches('/').to_owned();

        Ok(Self { http, base_url })
    }

    async fn get(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<Value, KoiosError> {
        let url = Url::parse_with_params(&format!("{}/{endpoint}", self.base_url), params)
            .map_err(|error| KoiosError::Url(endpoint, error.into()))?;

        self.send(endpoint, self.http.get(url)).await
    }

    async fn post(&self, endpoint: &'static str, body: &Value) -> Result<Value, KoiosError> {
        let url = Url::parse(&format!("{}/{endpoint}", self.base_url))
            .map_err(|error| KoiosError::Url(endpoint, error.into()))?;

        self.send(endpoint, self.http.post(url).json(body)).await
    }

    async fn send(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, KoiosError> {
        let response = request
            .send()
            .await
            .map_err(|error| KoiosError::Request(endpoint, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KoiosError::Status {
                endpoint,
                status,
                body,
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|error| KoiosError::Decode(endpoint, error))?;
        debug!(endpoint; "received Koios response");

        Ok(value)
    }
}

impl PoolSource for KoiosClient {
    type Error = KoiosError;

    async fn pool_info(&self, pool_id: &PoolId) -> Result<Value, Self::Error> {
        self.post("pool_info", &json!({ "_pool_bech32_ids": [pool_id] }))
            .await
    }

    async fn pool_delegators(&self, pool_id: &PoolId) -> Result<Value, Self::Error> {
        self.get("pool_delegators", &[("_pool_bech32", pool_id.as_str())])
            .await
    }

    async fn pool_history(&self, pool_id: &PoolId) -> Result<Value, Self::Error> {
        self.get("pool_history", &[("_pool_bech32", pool_id.as_str())])
            .await
    }

    async fn epoch_info(&self) -> Result<Value, Self::Error> {
        self.get("epoch_info", &[("limit", "1"), ("order", "epoch_no.desc")])
            .await
    }
}

#[derive(Debug, Error)]
pub enum KoiosError {
    #[error("cannot create HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("cannot create URL for endpoint {0}")]
    Url(&'static str, #[source] BoxError),

    #[error("cannot send request to endpoint {0}")]
    Request(&'static str, #[source] reqwest::Error),

    #[error("endpoint {endpoint} responded with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("cannot decode JSON response from endpoint {0}")]
    Decode(&'static str, #[source] reqwest::Error),
}
