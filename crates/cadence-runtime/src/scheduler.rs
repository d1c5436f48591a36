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


//! The cooperative task scheduler.
//!
//! Any thread may submit tasks; only the logic thread ticks them. Submissions
//! travel through a lock-free queue and are spliced into the active list at
//! the start of the next tick, ahead of tasks carried over from earlier ticks.

use crate::config::SchedulerConfig;
use cadence_core::queue::{ConcurrentQueue, QueueProducer};
use cadence_core::{LogicThread, Task, TaskRef, TaskState, WeakTask};

/// Counts reported by [`TaskScheduler::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Chains that finished: a task succeeded and had no child to promote.
    pub succeeded: u32,
    /// Chains that ended in failure or abort.
    pub failed: u32,
}

/// A cloneable submission handle for threads other than the logic thread.
#[derive(Debug, Clone)]
pub struct TaskSubmitter {
    producer: QueueProducer<TaskRef>,
}

impl TaskSubmitter {
    /// Queues `task` for the next tick. Never blocks.
    pub fn submit(&self, task: TaskRef) -> WeakTask {
        let weak = task.downgrade();
        if accepts(&task) {
            self.producer.push(task);
        }
        weak
    }

    /// Wraps `task` in a handle and queues it.
    pub fn submit_task<T: Task + 'static>(&self, task: T) -> WeakTask {
        self.submit(TaskRef::new(task))
    }
}

/// Admits a fresh task exactly once; the claim is atomic across submitting threads.
fn accepts(task: &TaskRef) -> bool {
    if task.state() != TaskState::Uninitialized {
        log::warn!(
            "Refusing to submit task '{}' in state {}; only fresh tasks can be scheduled.",
            task.name(),
            task.state()
        );
        return false;
    }
    if !task.mark_scheduled() {
        log::warn!(
            "Refusing to submit task '{}': it is already {}.",
            task.name(),
            if task.is_attached() {
                "the child of another task"
            } else {
                "scheduled"
            }
        );
        return false;
    }
    true
}

/// Owns the active task chains and advances them once per logic tick.
#[derive(Debug)]
pub struct TaskScheduler {
    active: Vec<TaskRef>,
    pending: ConcurrentQueue<TaskRef>,
    logic_thread: LogicThread,
    config: SchedulerConfig,
}

impl TaskScheduler {
    /// Creates a scheduler ticked from `logic_thread`.
    pub fn new(logic_thread: LogicThread) -> Self {
        Self::with_config(logic_thread, SchedulerConfig::default())
    }

    /// Creates a scheduler with an explicit configuration.
    pub fn with_config(logic_thread: LogicThread, config: SchedulerConfig) -> Self {
        log::debug!("TaskScheduler initialized on {:?}.", logic_thread.id());
        Self {
            active: Vec::new(),
            pending: ConcurrentQueue::new(),
            logic_thread,
            config,
        }
    }

    /// Queues `task` for the next tick and returns a weak handle to it.
    ///
    /// Callable from any thread through a shared reference; never blocks.
    pub fn submit(&self, task: TaskRef) -> WeakTask {
        let weak = task.downgrade();
        if accepts(&task) {
            self.pending.push(task);
        }
        weak
    }

    /// Wraps `task` in a handle and queues it.
    pub fn submit_task<T: Task + 'static>(&self, task: T) -> WeakTask {
        self.submit(TaskRef::new(task))
    }

    /// Returns a handle other threads can submit through.
    pub fn submitter(&self) -> TaskSubmitter {
        TaskSubmitter {
            producer: self.pending.producer(),
        }
    }

    /// The thread this scheduler must be ticked from.
    pub fn logic_thread(&self) -> LogicThread {
        self.logic_thread
    }

    /// Advances every active task by `dt` seconds.
    ///
    /// 1. Pending submissions are spliced in front of the active list.
    /// 2. One pass initializes fresh tasks and updates running ones.
    /// 3. A succeeded task hands its child to the end of the active list, where
    ///    the same pass reaches it; a failed or aborted task aborts its chain.
    /// 4. Dead tasks are removed.
    ///
    /// # Panics
    ///
    /// Panics when called from any thread but the logic thread.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        self.logic_thread.assert_current("TaskScheduler::tick");

        let fresh = self.pending.drain();
        if !fresh.is_empty() {
            let carried = std::mem::replace(&mut self.active, fresh);
            self.active.extend(carried);
        }

        let mut outcome = TickOutcome::default();
        let mut reaped = Vec::with_capacity(self.active.len());
        let mut index = 0;
        while index < self.active.len() {
            let task = self.active[index].clone();
            if task.state() == TaskState::Uninitialized {
                task.run_init();
            }
            if task.state() == TaskState::Running {
                task.run_update(dt);
            }

            let dead = task.is_dead();
            if dead {
                if let Some(child) = reap(&task, &mut outcome) {
                    self.active.push(child);
                }
            }
            reaped.push(dead || task.is_removed());
            index += 1;
        }

        // Tasks killed from outside after their visit keep their slot and are
        // reaped on the next tick.
        let mut slot = 0;
        self.active.retain(|_| {
            let keep = !reaped[slot];
            slot += 1;
            keep
        });

        if self.config.log_tick_summary {
            log::trace!(
                "TaskScheduler tick: {} active, {} succeeded, {} failed.",
                self.active.len(),
                outcome.succeeded,
                outcome.failed
            );
        }
        outcome
    }

    /// Aborts every live task in the active list.
    ///
    /// With `immediate`, abort hooks run now and the tasks are removed;
    /// otherwise they are reaped by the next tick. Tasks still waiting in the
    /// submission queue are not affected.
    ///
    /// An immediate abort also settles tasks that died after their visit in
    /// the last tick: their outcome hook runs, but a succeeded task's child is
    /// aborted rather than promoted. The returned outcome counts the chains
    /// settled here; a deferred abort returns an empty outcome and the next
    /// tick counts them.
    pub fn abort_all(&mut self, immediate: bool) -> TickOutcome {
        self.logic_thread.assert_current("TaskScheduler::abort_all");
        let aborted = self.active.iter().filter(|task| task.abort()).count();
        log::info!(
            "TaskScheduler: aborted {aborted} task(s){}.",
            if immediate { " immediately" } else { "" }
        );

        let mut outcome = TickOutcome::default();
        if immediate {
            for task in self.active.drain(..) {
                if task.is_dead() {
                    task.notify_outcome();
                }
                let child = task.remove_child();
                if task.state() == TaskState::Succeeded && child.is_none() {
                    outcome.succeeded += 1;
                } else if task.is_dead() {
                    outcome.failed += 1;
                }
                if let Some(child) = child {
                    child.abort_chain();
                }
            }
        }
        outcome
    }

    /// Discards every active and pending task without running any hook.
    ///
    /// Discarded tasks are left in the `Removed` state; pending ones never
    /// receive `on_init`.
    pub fn clear_all(&mut self) {
        self.logic_thread.assert_current("TaskScheduler::clear_all");
        let pending = self.pending.drain();
        log::info!(
            "TaskScheduler: clearing {} active and {} pending task(s).",
            self.active.len(),
            pending.len()
        );
        for task in self.active.drain(..).chain(pending) {
            let mut next = Some(task);
            while let Some(task) = next {
                task.mark_removed();
                next = task.peek_child();
            }
        }
    }

    /// Number of chains in the active list.
    pub fn process_count(&self) -> usize {
        self.active.len()
    }

    /// Number of submissions waiting for the next tick.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Runs the outcome hooks of a dead task and returns the child to promote, if any.
fn reap(task: &TaskRef, outcome: &mut TickOutcome) -> Option<TaskRef> {
    task.notify_outcome();
    match task.state() {
        TaskState::Succeeded => match task.remove_child() {
            Some(child) if child.mark_scheduled() => Some(child),
            Some(child) => {
                log::warn!(
                    "Task '{}' was scheduled on its own; not promoting it after '{}'.",
                    child.name(),
                    task.name()
                );
                None
            }
            None => {
                outcome.succeeded += 1;
                None
            }
        },
        _ => {
            if let Some(child) = task.remove_child() {
                child.abort_chain();
            }
            outcome.failed += 1;
            None
        }
    }
}
