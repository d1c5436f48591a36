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


//! The per-session owner of the scheduler and the event bus.

use crate::bus::EventBus;
use crate::config::RuntimeConfig;
use crate::scheduler::{TaskScheduler, TaskSubmitter, TickOutcome};
use cadence_core::LogicThread;
use std::sync::Arc;

/// What one [`Runtime::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Outcome of the scheduler tick.
    pub tick: TickOutcome,
    /// `false` if queued events were left over because the update budget ran out.
    pub events_flushed: bool,
}

/// Owns one [`TaskScheduler`] and one shared [`EventBus`], both bound to the
/// same logic thread.
///
/// Hand [`Runtime::events`] and [`Runtime::submitter`] to worker threads; keep
/// the runtime itself on the logic thread and call [`Runtime::frame`] once
/// per frame.
pub struct Runtime {
    config: RuntimeConfig,
    scheduler: TaskScheduler,
    events: Arc<EventBus>,
    frame_count: u64,
}

impl Runtime {
    /// Creates a runtime whose logic thread is the calling thread.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_logic_thread(config, LogicThread::current())
    }

    /// Creates a runtime bound to an explicit logic thread.
    pub fn with_logic_thread(config: RuntimeConfig, logic_thread: LogicThread) -> Self {
        let scheduler = TaskScheduler::with_config(logic_thread, config.scheduler.clone());
        let events = Arc::new(EventBus::with_config(
            scheduler.submitter(),
            logic_thread,
            config.events.clone(),
        ));
        log::info!("Runtime created on {:?}.", logic_thread.id());
        Self {
            config,
            scheduler,
            events,
            frame_count: 0,
        }
    }

    /// Runs one frame: ticks the scheduler by `dt` seconds, then delivers
    /// queued events within the configured budget.
    ///
    /// # Panics
    ///
    /// Panics when called from any thread but the logic thread.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let tick = self.scheduler.tick(dt);
        let events_flushed = self.events.update(self.config.events.update_budget());
        self.frame_count += 1;
        FrameReport {
            tick,
            events_flushed,
        }
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// The scheduler, mutably, for ticking or aborting outside [`frame`](Self::frame).
    pub fn scheduler_mut(&mut self) -> &mut TaskScheduler {
        &mut self.scheduler
    }

    /// The shared event bus.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// A submission handle for other threads.
    pub fn submitter(&self) -> TaskSubmitter {
        self.scheduler.submitter()
    }

    /// The logic thread this runtime is bound to.
    pub fn logic_thread(&self) -> LogicThread {
        self.scheduler.logic_thread()
    }

    /// The configuration the runtime was created with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Aborts every active task, running their abort hooks now, and discards
    /// queued events.
    pub fn shutdown(&mut self) {
        self.scheduler.abort_all(true);
        let discarded = self.events.clear_events();
        log::info!(
            "Runtime shut down after {} frame(s); {discarded} queued event(s) discarded.",
            self.frame_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventBusConfig;
    use crate::tasks::{ClosureTask, DelayTask};
    use cadence_core::{Listener, SignalEvent, TaskRef, TaskState};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn frame_ticks_then_flushes_events() {
        let mut runtime = Runtime::new(RuntimeConfig::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        runtime
            .events()
            .add_listener(&Listener::infallible(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }), 1);

        // A task that queues an event during the tick is delivered in the same frame.
        let events = Arc::clone(runtime.events());
        runtime.submitter().submit_task(ClosureTask::new(move || {
            events.queue(SignalEvent::new(1, "FromTask").shared());
        }));

        let report = runtime.frame(0.016);
        assert_eq!(report.tick.succeeded, 1);
        assert!(report.events_flushed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.frame_count(), 1);
    }

    #[test]
    fn zero_budget_reports_leftovers() {
        let config = RuntimeConfig {
            events: EventBusConfig {
                update_budget_ms: Some(0),
                warn_on_budget_exceeded: false,
            },
            ..RuntimeConfig::default()
        };
        let mut runtime = Runtime::new(config);
        runtime.events().queue(SignalEvent::new(1, "a").shared());
        runtime.events().queue(SignalEvent::new(1, "b").shared());

        assert!(!runtime.frame(0.0).events_flushed);
        assert_eq!(runtime.events().queued_count(), 1);
        assert!(runtime.frame(0.0).events_flushed);
    }

    #[test]
    fn shutdown_aborts_tasks_and_discards_events() {
        let mut runtime = Runtime::new(RuntimeConfig::default());
        let delay = TaskRef::new(DelayTask::new(10.0));
        runtime.scheduler().submit(delay.clone());
        runtime.frame(1.0);
        runtime.events().queue(SignalEvent::new(1, "late").shared());

        runtime.shutdown();
        assert_eq!(delay.state(), TaskState::Aborted);
        assert_eq!(runtime.scheduler().process_count(), 0);
        assert_eq!(runtime.events().queued_count(), 0);
    }
}
