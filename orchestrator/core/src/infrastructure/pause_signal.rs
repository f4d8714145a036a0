// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Pause Signal Adapters
//
// FilePauseSignal: presence of a file on the local filesystem means "paused".
// Contents are never read. Operators create/remove the file out of band.
//
// FlagPauseSignal: in-process flag for embedders that drive the pause gate
// from their own control plane (or from tests).

use crate::domain::governor::PauseSignal;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub struct FilePauseSignal {
    path: PathBuf,
}

impl FilePauseSignal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the pause file. Existing files are left untouched.
    pub async fn pause(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        Ok(())
    }

    /// Remove the pause file. Returns false if it was not present.
    pub async fn resume(&self) -> std::io::Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl PauseSignal for FilePauseSignal {
    async fn is_paused(&self) -> bool {
        // An unreadable location counts as absent.
        match tokio::fs::try_exists(&self.path).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!("Could not check pause file {:?}: {}", self.path, e);
                false
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Default)]
pub struct FlagPauseSignal {
    paused: AtomicBool,
}

impl FlagPauseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }
}

#[async_trait]
impl PauseSignal for FlagPauseSignal {
    async fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        "in-memory pause flag".to_string()
    }
}
