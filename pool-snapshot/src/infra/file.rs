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

use crate::domain::{PoolSnapshot, SnapshotSink};
use log::debug;
use serde::Deserialize;
use std::{
    fs::{self, Permissions},
    io::{self, Write},
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};
use tempfile::Builder;
use thiserror::Error;
use tokio::task;

/// Config for the snapshot file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub path: PathBuf,
}

/// A [SnapshotSink] implementation writing pretty-printed JSON to a file. The file is replaced
/// atomically, so readers never observe a partially written snapshot.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(config: Config) -> Self {
        Self { path: config.path }
    }
}

impl SnapshotSink for FileSink {
    type Error = FileSinkError;

    async fn write(&self, snapshot: &PoolSnapshot) -> Result<(), Self::Error> {
        let contents = serde_json::to_vec_pretty(snapshot).map_err(FileSinkError::Serialize)?;
        let path = self.path.clone();

        task::spawn_blocking(move || replace_file(&path, &contents))
            .await
            .map_err(FileSinkError::Join)??;

        debug!(path:? = self.path; "snapshot written");
        Ok(())
    }
}

fn replace_file(path: &Path, contents: &[u8]) -> Result<(), FileSinkError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|error| FileSinkError::CreateDir(dir.to_owned(), error))?;

    let write_error = |error: io::Error| FileSinkError::Write(path.to_owned(), error);

    let mut file = Builder::new()
        .prefix(".pool-snapshot")
        .tempfile_in(dir)
        .map_err(write_error)?;
    file.write_all(contents).map_err(write_error)?;
    // Temporary files are private, but the frontend's web server must read the snapshot.
    file.as_file()
        .set_permissions(Permissions::from_mode(0o644))
        .map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|error| write_error(error.error))?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum FileSinkError {
    #[error("cannot serialize snapshot")]
    Serialize(#[source] serde_json::Error),

    #[error("cannot create directory {}", .0.display())]
    CreateDir(PathBuf, #[source] io::Error),

    #[error("cannot write snapshot to {}", .0.display())]
    Write(PathBuf, #[source] io::Error),

    #[error("cannot join blocking write task")]
    Join(#[source] task::JoinError),
}
