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


//! Lifecycle states of a task and their forward-only transitions.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskState {
    /// Created but not yet initialized by the scheduler.
    Uninitialized = 0,
    /// Initialized and receiving updates every tick.
    Running = 1,
    /// Initialized but skipped by updates until resumed.
    Paused = 2,
    /// Discarded by the scheduler without reaching an outcome.
    Removed = 3,
    /// Finished successfully.
    Succeeded = 4,
    /// Finished with a failure.
    Failed = 5,
    /// Cancelled before finishing.
    Aborted = 6,
}

impl TaskState {
    /// Running or paused.
    pub fn is_alive(self) -> bool {
        matches!(self, TaskState::Running | TaskState::Paused)
    }

    /// Succeeded, failed, or aborted.
    pub fn is_dead(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Aborted
        )
    }

    /// Dead or removed: no further transition is possible.
    pub fn is_terminal(self) -> bool {
        self.is_dead() || self == TaskState::Removed
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Uninitialized,
            1 => TaskState::Running,
            2 => TaskState::Paused,
            3 => TaskState::Removed,
            4 => TaskState::Succeeded,
            5 => TaskState::Failed,
            _ => TaskState::Aborted,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Atomic cell holding a [`TaskState`].
#[derive(Debug)]
pub(crate) struct AtomicTaskState(AtomicU8);

impl AtomicTaskState {
    pub(crate) fn new(state: TaskState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> TaskState {
        TaskState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves to `to` if the current state satisfies `allowed`.
    ///
    /// Returns the previous state on success and the unchanged current state on refusal.
    pub(crate) fn transition<F>(&self, allowed: F, to: TaskState) -> Result<TaskState, TaskState>
    where
        F: Fn(TaskState) -> bool,
    {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                allowed(TaskState::from_u8(raw)).then_some(to as u8)
            })
            .map(TaskState::from_u8)
            .map_err(TaskState::from_u8)
    }

    pub(crate) fn succeed(&self, task: &str) -> bool {
        self.finish(task, TaskState::Succeeded, "succeed")
    }

    pub(crate) fn fail(&self, task: &str) -> bool {
        self.finish(task, TaskState::Failed, "fail")
    }

    fn finish(&self, task: &str, to: TaskState, op: &str) -> bool {
        match self.transition(TaskState::is_alive, to) {
            Ok(_) => true,
            Err(current) => {
                log::warn!("Task '{task}': {op}() ignored in state {current}.");
                false
            }
        }
    }

    pub(crate) fn pause(&self, task: &str) -> bool {
        match self.transition(|s| s == TaskState::Running, TaskState::Paused) {
            Ok(_) => true,
            Err(current) => {
                log::warn!("Task '{task}': pause() ignored, state is {current} not Running.");
                false
            }
        }
    }

    pub(crate) fn resume(&self, task: &str) -> bool {
        match self.transition(|s| s == TaskState::Paused, TaskState::Running) {
            Ok(_) => true,
            Err(current) => {
                log::warn!("Task '{task}': resume() ignored, state is {current} not Paused.");
                false
            }
        }
    }

    /// Uninitialized, running, or paused tasks can be aborted.
    pub(crate) fn abort(&self) -> bool {
        self.transition(|s| !s.is_terminal(), TaskState::Aborted)
            .is_ok()
    }
}
