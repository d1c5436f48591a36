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


//! Reusable leaf tasks.
//!
//! These are the building blocks for chains: wait a while, run some code,
//! drive a value over time. The event bus uses [`DelayTask`] and
//! [`ClosureTask`] for delayed delivery.

mod closure;
mod delay;
mod interpolate;

pub use self::closure::ClosureTask;
pub use self::delay::DelayTask;
pub use self::interpolate::{Curve, InterpolateTask};

/// Tick time accumulated in `f64` so that frame deltas such as `1.0 / 60.0`
/// reach a deadline on the frame they should, despite rounding.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Timeline {
    elapsed: f64,
    duration: f64,
}

impl Timeline {
    // Relative slack, about one `f32` ulp per second of duration.
    const TOLERANCE: f64 = 1e-6;

    pub(crate) fn new(seconds: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: f64::from(seconds.max(0.0)),
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.elapsed += f64::from(dt);
    }

    pub(crate) fn finished(&self) -> bool {
        self.elapsed + Self::TOLERANCE * self.duration.max(1.0) >= self.duration
    }

    /// Completed fraction in `[0, 1]`.
    pub(crate) fn progress(&self) -> f32 {
        if self.finished() {
            1.0
        } else {
            (self.elapsed / self.duration) as f32
        }
    }

    pub(crate) fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0) as f32
    }
}
