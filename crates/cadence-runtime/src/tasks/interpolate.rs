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
use std::fmt;

/// Easing curve mapping normalized time `t` in `[0, 1]` to progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curve {
    /// Constant speed.
    #[default]
    Linear,
    /// Starts slow.
    EaseInQuad,
    /// Ends slow.
    EaseOutQuad,
    /// Starts and ends slow.
    EaseInOutQuad,
    /// Starts and ends slow, steeper in the middle.
    EaseInOutCubic,
    /// Sinusoidal start and end.
    EaseInOutSine,
}

impl Curve {
    /// Applies the curve to `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseInQuad => t * t,
            Curve::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Curve::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Curve::EaseInOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Drives a value from `start` to `end` over a duration, then succeeds.
///
/// The sink receives the start value on init and the eased value every
/// update; the last value it sees is exactly `end`. Used for fades and
/// similar timed transitions.
pub struct InterpolateTask {
    start: f32,
    end: f32,
    timeline: Timeline,
    curve: Curve,
    sink: Box<dyn FnMut(f32) + Send>,
}

impl InterpolateTask {
    /// Interpolates linearly from `start` to `end` over `seconds`.
    pub fn new<F>(start: f32, end: f32, seconds: f32, sink: F) -> Self
    where
        F: FnMut(f32) + Send + 'static,
    {
        Self {
            start,
            end,
            timeline: Timeline::new(seconds),
            curve: Curve::Linear,
            sink: Box::new(sink),
        }
    }

    /// Uses `curve` instead of linear progress.
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

}

impl Task for InterpolateTask {
    fn name(&self) -> &str {
        "InterpolateTask"
    }

    fn on_init(&mut self, _ctx: &mut TaskContext<'_>) {
        (self.sink)(self.start);
    }

    fn on_update(&mut self, dt: f32, ctx: &mut TaskContext<'_>) {
        self.timeline.advance(dt);
        if self.timeline.finished() {
            (self.sink)(self.end);
            ctx.succeed();
            return;
        }
        let t = self.timeline.progress();
        let value = self.start + (self.end - self.start) * self.curve.apply(t);
        (self.sink)(value);
    }
}

impl fmt::Debug for InterpolateTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpolateTask")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("timeline", &self.timeline)
            .field("curve", &self.curve)
            .finish()
    }
}
