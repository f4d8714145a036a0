// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Crew Manifest YAML Parser
//!
//! Parses crew YAML manifests into domain objects and validates them.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Parse external YAML → Domain objects

use crate::domain::crew::CrewManifest;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

pub struct CrewManifestParser;

impl CrewManifestParser {
    /// Parse crew manifest from YAML string
    pub fn parse_yaml(yaml: &str) -> Result<CrewManifest> {
        let manifest: CrewManifest =
            serde_yaml::from_str(yaml).context("Failed to parse YAML manifest")?;

        manifest
            .validate()
            .map_err(|e| anyhow!("Manifest validation failed: {}", e))?;

        Ok(manifest)
    }

    /// Parse crew manifest from YAML file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<CrewManifest> {
        let yaml = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read manifest file: {:?}", path.as_ref()))?;

        Self::parse_yaml(&yaml)
    }

    /// Serialize crew manifest to YAML string
    pub fn to_yaml(manifest: &CrewManifest) -> Result<String> {
        serde_yaml::to_string(manifest).context("Failed to serialize manifest to YAML")
    }
}
