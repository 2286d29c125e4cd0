// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Every scoring constant and threshold is configuration. The observed
//! deployments disagreed on the exact values (15 vs 20 minute buffers,
//! optional type-switch penalty), so the defaults here are a reference
//! point, not gospel; operations tune them in the TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How equal top scores are resolved within one allocation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Lexicographically smallest worker id wins; deterministic regardless
    /// of roster order
    #[default]
    LowestWorkerId,
    /// First maximum encountered in roster order wins
    FirstSeen,
}

/// Scoring and reallocation constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Guard interval at both ends of a shift window
    #[serde(with = "humantime_serde")]
    pub shift_buffer: Duration,
    /// Current task closer than this triggers release of the queued task
    #[serde(with = "humantime_serde")]
    pub release_threshold: Duration,
    /// How long past its effective time a task still counts as current
    #[serde(with = "humantime_serde")]
    pub current_grace: Duration,
    /// Score penalty when the candidate's aircraft type differs from the
    /// worker's latest commitment
    pub type_switch_penalty: i64,
    /// Score penalty per outstanding task
    pub load_penalty: i64,
    /// Base score in minutes credited to an unoccupied worker
    pub unoccupied_base: i64,
    pub tie_break: TieBreak,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            shift_buffer: Duration::from_secs(15 * 60),
            release_threshold: Duration::from_secs(15 * 60),
            current_grace: Duration::from_secs(5 * 60),
            type_switch_penalty: 10,
            load_penalty: 2,
            unoccupied_base: 240,
            tie_break: TieBreak::LowestWorkerId,
        }
    }
}

impl AllocationConfig {
    pub fn with_shift_buffer(mut self, buffer: Duration) -> Self {
        self.shift_buffer = buffer;
        self
    }

    pub fn with_release_threshold(mut self, threshold: Duration) -> Self {
        self.release_threshold = threshold;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period of the automatic allocation loop
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub allocation: AllocationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            allocation: AllocationConfig::default(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
