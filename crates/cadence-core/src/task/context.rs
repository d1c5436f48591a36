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


//! The view of its own task handed to a hook while it runs.

use super::state::{AtomicTaskState, TaskState};
use super::TaskRef;

/// Lets a running hook report its outcome and extend its own chain.
///
/// A hook must use its context rather than a [`TaskRef`] pointing at itself:
/// the task's body is locked for the duration of the hook.
pub struct TaskContext<'a> {
    this: &'a TaskRef,
    name: &'a str,
    state: &'a AtomicTaskState,
    child: &'a mut Option<TaskRef>,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(
        this: &'a TaskRef,
        name: &'a str,
        state: &'a AtomicTaskState,
        child: &'a mut Option<TaskRef>,
    ) -> Self {
        Self {
            this,
            name,
            state,
            child,
        }
    }

    /// The task's current state.
    pub fn state(&self) -> TaskState {
        self.state.load()
    }

    /// Marks the task as succeeded. Valid only while running or paused.
    pub fn succeed(&mut self) -> bool {
        self.state.succeed(self.name)
    }

    /// Marks the task as failed. Valid only while running or paused.
    pub fn fail(&mut self) -> bool {
        self.state.fail(self.name)
    }

    /// Pauses the task after this hook returns.
    pub fn pause(&mut self) -> bool {
        self.state.pause(self.name)
    }

    /// Appends `task` at the tail of this task's chain.
    ///
    /// Refused with a warning, returning `false`, under the same rules as
    /// [`TaskRef::attach_child`], including attaching the running task itself.
    pub fn attach_child(&mut self, task: TaskRef) -> bool {
        if !task.adopt_into(self.this) {
            return false;
        }
        if let Some(child) = self.child.as_ref() {
            child.link_tail(task);
        } else {
            *self.child = Some(task);
        }
        true
    }

    /// Returns the direct child without detaching it.
    pub fn peek_child(&self) -> Option<TaskRef> {
        self.child.clone()
    }
}
