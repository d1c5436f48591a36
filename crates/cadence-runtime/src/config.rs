// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Runtime configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the [`TaskScheduler`](crate::TaskScheduler).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Emit a trace line with the outcome of every tick.
    pub log_tick_summary: bool,
}

/// Configuration for the [`EventBus`](crate::EventBus) as driven by a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Time budget for draining queued events each frame, in milliseconds.
    /// `None` drains everything that was queued when the frame started.
    pub update_budget_ms: Option<u64>,
    /// Log a warning when a frame's drain stops because the budget ran out.
    pub warn_on_budget_exceeded: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            update_budget_ms: None,
            warn_on_budget_exceeded: true,
        }
    }
}

impl EventBusConfig {
    /// The budget as a [`Duration`].
    pub fn update_budget(&self) -> Option<Duration> {
        self.update_budget_ms.map(Duration::from_millis)
    }
}

/// Top-level configuration of a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Event bus settings.
    pub events: EventBusConfig,
}

impl RuntimeConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse runtime configuration")
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read runtime configuration '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize runtime configuration")
    }
}
