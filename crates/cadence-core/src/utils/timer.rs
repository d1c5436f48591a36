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


//! Wall-clock time sources for frame deltas and processing budgets.

use std::time::{Duration, Instant};

/// Measures the time elapsed since it was started.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Creates a new Stopwatch, started now.
    #[inline]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Returns the elapsed time since the stopwatch was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time in whole milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Returns `true` once `budget` has been used up. `None` means no budget.
    #[inline]
    pub fn exceeded(&self, budget: Option<Duration>) -> bool {
        budget.is_some_and(|limit| self.elapsed() >= limit)
    }

    /// Restarts the stopwatch and returns the time elapsed before the restart.
    #[inline]
    pub fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time);
        self.start_time = now;
        elapsed
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces the per-frame delta fed to the scheduler's `tick`.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    watch: Stopwatch,
}

impl FrameClock {
    /// Creates a clock whose first delta is measured from now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the seconds elapsed since the previous call (or since creation).
    pub fn delta(&mut self) -> f32 {
        self.watch.restart().as_secs_f32()
    }
}
