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

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

const POOL_HRP: &str = "pool";
const POOL_KEY_HASH_LEN: usize = 28;

/// Bech32 stake pool identifier, e.g. `pool16tcjctesjnks0p8sfrlf8f3d3vrp2fdn2msy80sgg3cdjtayu3z`.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolId(String);

impl PoolId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PoolId {
    type Error = InvalidPoolIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (hrp, bytes) = bech32::decode(&s)?;

        if !hrp.as_str().eq_ignore_ascii_case(POOL_HRP) {
            let hrp = hrp.to_string();
            return Err(InvalidPoolIdError::InvalidHrp { hrp });
        }

        if bytes.len() != POOL_KEY_HASH_LEN {
            return Err(InvalidPoolIdError::InvalidLength(bytes.len()));
        }

        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<&str> for PoolId {
    type Error = InvalidPoolIdError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.to_owned().try_into()
    }
}

impl FromStr for PoolId {
    type Err = InvalidPoolIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

impl From<PoolId> for String {
    fn from(pool_id: PoolId) -> Self {
        pool_id.0
    }
}

#[derive(Debug, Error)]
pub enum InvalidPoolIdError {
    #[error("cannot bech32-decode pool ID")]
    Decode(#[from] bech32::DecodeError),

    #[error("expected HRP pool, but was {hrp}")]
    InvalidHrp { hrp: String },

    #[error("expected 28 bytes pool key hash, but was {0}")]
    InvalidLength(usize),
}
