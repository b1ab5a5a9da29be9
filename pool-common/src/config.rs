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

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;
use std::env;

const CONFIG_FILE_VAR: &str = "CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Extension methods for configuration types.
pub trait ConfigExt
where
    Self: for<'de> Deserialize<'de>,
{
    /// Load the configuration from the YAML file named by `CONFIG_FILE` (defaults to
    /// `config.yaml`), overridden by environment variables prefixed with `APP__`, nested keys
    /// separated by `__`, e.g. `APP__APPLICATION__POOL_ID`.
    fn load() -> Result<Self, Box<figment::Error>> {
        let config_file = env::var(CONFIG_FILE_VAR)
            .map(Yaml::file_exact)
            .unwrap_or_else(|_| Yaml::file_exact(DEFAULT_CONFIG_FILE));

        Figment::new()
            .merge(config_file)
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .map_err(Box::new)
    }
}

impl<T> ConfigExt for T where T: for<'de> Deserialize<'de> {}

#[cfg(test)]
mod tests {
    use crate::config::ConfigExt;
    use figment::Jail;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Config {
        name: String,
        nested: Nested,
    }

    #[derive(Debug, Deserialize)]
    struct Nested {
        port: u16,
    }

    #[test]
    fn test_load() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test-config.yaml",
                "name: from-file\nnested:\n  port: 1234\n",
            )?;
            jail.set_env("CONFIG_FILE", "test-config.yaml");

            let config = Config::load().map_err(|error| error.to_string())?;
            assert_eq!(config.name, "from-file");
            assert_eq!(config.nested.port, 1234);

            jail.set_env("APP__NESTED__PORT", "4321");
            let config = Config::load().map_err(|error| error.to_string())?;
            assert_eq!(config.name, "from-file");
            assert_eq!(config.nested.port, 4321);

            Ok(())
        });
    }

    #[test]
    fn test_load_missing_file() {
        Jail::expect_with(|jail| {
            jail.set_env("CONFIG_FILE", "does-not-exist.yaml");
            assert!(Config::load().is_err());
            Ok(())
        });
    }
}
