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


use super::Timeline;
use cadence_core::{Task, TaskContext};
use std::time::Duration;

/// Succeeds once the accumulated tick time reaches its duration.
#[derive(Debug, Clone)]
pub struct DelayTask {
    timeline: Timeline,
}

impl DelayTask {
    /// Waits `seconds` of accumulated tick time. Non-positive values finish on the first update.
    pub fn new(seconds: f32) -> Self {
        Self {
            timeline: Timeline::new(seconds),
        }
    }

    /// Waits for `duration`.
    pub fn from_duration(duration: Duration) -> Self {
        Self::new(duration.as_secs_f32())
    }

    /// Seconds left before the delay completes.
    pub fn remaining(&self) -> f32 {
        self.timeline.remaining()
    }
}

impl Task for DelayTask {
    fn name(&self) -> &str {
        "DelayTask"
    }

    fn on_update(&mut self, dt: f32, ctx: &mut TaskContext<'_>) {
        self.timeline.advance(dt);
        if self.timeline.finished() {
            ctx.succeed();
        }
    }
}
