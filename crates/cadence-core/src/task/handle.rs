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


//! Reference-counted handles to tasks and the hook-driving entry points used by schedulers.

use super::context::TaskContext;
use super::state::{AtomicTaskState, TaskState};
use super::Task;
use crate::error::panic_message;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

struct TaskBody {
    task: Box<dyn Task>,
    child: Option<TaskRef>,
}

// Who holds a task: nobody yet, a scheduler's active list, or a parent task.
const FREE: u8 = 0;
const SCHEDULED: u8 = 1;
const ATTACHED: u8 = 2;

struct TaskShared {
    name: String,
    state: AtomicTaskState,
    owner: AtomicU8,
    body: Mutex<TaskBody>,
}

/// A shared, thread-safe handle to a task and its chain.
///
/// Handles may be created and cloned on any thread. A task exclusively owns
/// its child until the child is promoted on success or discarded on failure.
#[derive(Clone)]
pub struct TaskRef {
    shared: Arc<TaskShared>,
}

/// A non-owning handle returned by submission.
#[derive(Clone)]
pub struct WeakTask {
    shared: Weak<TaskShared>,
}

impl TaskRef {
    /// Wraps a task in a new, uninitialized handle.
    pub fn new<T: Task + 'static>(task: T) -> Self {
        Self::from_boxed(Box::new(task))
    }

    /// Wraps an already boxed task in a new, uninitialized handle.
    pub fn from_boxed(task: Box<dyn Task>) -> Self {
        let name = task.name().to_string();
        Self {
            shared: Arc::new(TaskShared {
                name,
                state: AtomicTaskState::new(TaskState::Uninitialized),
                owner: AtomicU8::new(FREE),
                body: Mutex::new(TaskBody { task, child: None }),
            }),
        }
    }

    /// The task's name, as reported by [`Task::name`] at creation.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The task's current state.
    pub fn state(&self) -> TaskState {
        self.shared.state.load()
    }

    /// Running or paused.
    pub fn is_alive(&self) -> bool {
        self.state().is_alive()
    }

    /// Succeeded, failed, or aborted.
    pub fn is_dead(&self) -> bool {
        self.state().is_dead()
    }

    /// Discarded by the scheduler without an outcome.
    pub fn is_removed(&self) -> bool {
        self.state() == TaskState::Removed
    }

    /// Currently paused.
    pub fn is_paused(&self) -> bool {
        self.state() == TaskState::Paused
    }

    /// Marks the task as succeeded. Logs a warning and returns `false` unless running or paused.
    pub fn succeed(&self) -> bool {
        self.shared.state.succeed(self.name())
    }

    /// Marks the task as failed. Logs a warning and returns `false` unless running or paused.
    pub fn fail(&self) -> bool {
        self.shared.state.fail(self.name())
    }

    /// Running → Paused. Any other state is left unchanged and a warning is logged.
    pub fn pause(&self) -> bool {
        self.shared.state.pause(self.name())
    }

    /// Paused → Running. Any other state is left unchanged and a warning is logged.
    pub fn resume(&self) -> bool {
        self.shared.state.resume(self.name())
    }

    /// Marks the task as aborted. The scheduler runs the abort hooks on its next sweep.
    pub fn abort(&self) -> bool {
        self.shared.state.abort()
    }

    /// Appends `task` at the tail of this chain.
    ///
    /// If this task already owns a child the call is forwarded to that child,
    /// so the chain reads as an ordered list. Costs O(depth).
    ///
    /// Refused with a warning, returning `false`, if `task` already has a
    /// parent, is already scheduled, or would close a cycle.
    pub fn attach_child(&self, task: TaskRef) -> bool {
        if !task.adopt_into(self) {
            return false;
        }
        self.link_tail(task);
        true
    }

    /// Appends `task` to the chain and returns the head, for fluent chain building.
    pub fn then(self, task: TaskRef) -> Self {
        self.attach_child(task);
        self
    }

    /// Detaches and returns the direct child without destroying it.
    ///
    /// The detached task has no owner and may be submitted or attached again.
    pub fn remove_child(&self) -> Option<TaskRef> {
        let child = self.lock_body().child.take();
        if let Some(child) = &child {
            child.shared.owner.store(FREE, Ordering::Release);
        }
        child
    }

    /// Returns the direct child without transferring ownership.
    pub fn peek_child(&self) -> Option<TaskRef> {
        self.lock_body().child.clone()
    }

    /// Number of tasks in the chain starting at this one.
    pub fn chain_len(&self) -> usize {
        1 + self.peek_child().map_or(0, |child| child.chain_len())
    }

    /// Owned as the child of another task.
    pub fn is_attached(&self) -> bool {
        self.shared.owner.load(Ordering::Acquire) == ATTACHED
    }

    /// Claimed by a scheduler.
    pub fn is_scheduled(&self) -> bool {
        self.shared.owner.load(Ordering::Acquire) == SCHEDULED
    }

    /// Returns a non-owning handle to this task.
    pub fn downgrade(&self) -> WeakTask {
        WeakTask {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns `true` if both handles point at the same task.
    pub fn ptr_eq(&self, other: &TaskRef) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn chain_contains(&self, needle: &TaskRef) -> bool {
        if self.ptr_eq(needle) {
            return true;
        }
        self.peek_child()
            .is_some_and(|child| child.chain_contains(needle))
    }

    /// Links `task` below the current tail. Ownership must already be claimed.
    pub(crate) fn link_tail(&self, task: TaskRef) {
        let mut body = self.lock_body();
        match body.child.as_ref() {
            Some(child) => child.link_tail(task),
            None => body.child = Some(task),
        }
    }

    /// Claims this task as the child of `parent`'s chain.
    ///
    /// The cycle walk stops on `parent` before locking it, so this is safe
    /// while `parent`'s own hook holds its body.
    pub(crate) fn adopt_into(&self, parent: &TaskRef) -> bool {
        let refusal = if self.chain_contains(parent) {
            "it would create a cycle"
        } else {
            match self.claim(ATTACHED) {
                Ok(()) => return true,
                Err(SCHEDULED) => "it is already scheduled",
                Err(_) => "it already has a parent",
            }
        };
        log::warn!(
            "Task '{}': refusing to attach '{}', {refusal}.",
            parent.name(),
            self.name()
        );
        false
    }

    fn claim(&self, owner: u8) -> Result<(), u8> {
        self.shared
            .owner
            .compare_exchange(FREE, owner, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
    }

    // --- Scheduler entry points ---

    /// Claims the task for a scheduler's active list.
    ///
    /// Returns `false` if it is already scheduled or owned by a parent, so a
    /// handle submitted twice, even from racing threads, is admitted once.
    pub fn mark_scheduled(&self) -> bool {
        self.claim(SCHEDULED).is_ok()
    }

    /// Uninitialized → Running, then runs [`Task::on_init`].
    ///
    /// Returns `false` if the task was not uninitialized. Called by schedulers
    /// on the logic thread only.
    pub fn run_init(&self) -> bool {
        if self
            .shared
            .state
            .transition(|s| s == TaskState::Uninitialized, TaskState::Running)
            .is_err()
        {
            return false;
        }
        if !self.invoke("on_init", |task, ctx| task.on_init(ctx)) {
            self.force_fail();
        }
        true
    }

    /// Runs [`Task::on_update`] if the task is running.
    ///
    /// A panicking update marks the task as failed. Called by schedulers on the
    /// logic thread only.
    pub fn run_update(&self, dt: f32) {
        if self.state() != TaskState::Running {
            return;
        }
        if !self.invoke("on_update", |task, ctx| task.on_update(dt, ctx)) {
            self.force_fail();
        }
    }

    /// Runs the outcome hook matching the task's dead state.
    pub fn notify_outcome(&self) {
        match self.state() {
            TaskState::Succeeded => {
                self.invoke("on_success", |task, _| task.on_success());
            }
            TaskState::Failed => {
                self.invoke("on_fail", |task, _| task.on_fail());
            }
            TaskState::Aborted => {
                self.invoke("on_abort", |task, _| task.on_abort());
            }
            state => log::warn!(
                "Task '{}': no outcome to report in state {state}.",
                self.name()
            ),
        }
    }

    /// Aborts this task and every descendant, running [`Task::on_abort`] on each.
    ///
    /// Descendants are detached as they are discarded, so none of them ever
    /// receives [`Task::on_init`].
    pub fn abort_chain(&self) {
        let mut next = Some(self.clone());
        while let Some(task) = next {
            task.abort();
            if task.state() == TaskState::Aborted {
                task.notify_outcome();
            }
            next = task.remove_child();
        }
    }

    /// Marks a task that never reached an outcome as removed.
    pub fn mark_removed(&self) -> bool {
        self.shared
            .state
            .transition(|s| !s.is_terminal(), TaskState::Removed)
            .is_ok()
    }

    fn force_fail(&self) {
        let _ = self
            .shared
            .state
            .transition(|s| !s.is_terminal(), TaskState::Failed);
    }

    fn lock_body(&self) -> MutexGuard<'_, TaskBody> {
        self.shared
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a hook with the body locked. Returns `false` if the hook panicked.
    fn invoke<F>(&self, hook: &str, f: F) -> bool
    where
        F: FnOnce(&mut dyn Task, &mut TaskContext<'_>),
    {
        let shared = &*self.shared;
        let mut body = self.lock_body();
        let TaskBody { task, child } = &mut *body;
        let mut ctx = TaskContext::new(self, &shared.name, &shared.state, child);
        match panic::catch_unwind(AssertUnwindSafe(|| f(task.as_mut(), &mut ctx))) {
            Ok(()) => true,
            Err(payload) => {
                log::error!(
                    "Task '{}' panicked in {hook}: {}",
                    shared.name,
                    panic_message(payload.as_ref())
                );
                false
            }
        }
    }
}

impl fmt::Debug for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRef")
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}

impl WeakTask {
    /// Returns a strong handle if the task is still alive somewhere.
    pub fn upgrade(&self) -> Option<TaskRef> {
        self.shared.upgrade().map(|shared| TaskRef { shared })
    }

    /// The task's state, or `None` once every strong handle has been released.
    pub fn state(&self) -> Option<TaskState> {
        self.upgrade().map(|task| task.state())
    }
}

impl fmt::Debug for WeakTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTask")
            .field("state", &self.state())
            .finish()
    }
}
