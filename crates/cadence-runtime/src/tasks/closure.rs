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


use cadence_core::{Task, TaskContext};
use std::fmt;

type Callback = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Invokes a callback once on its first update, then succeeds.
///
/// A fallible callback that returns an error fails the task instead.
pub struct ClosureTask {
    name: String,
    callback: Option<Callback>,
}

impl ClosureTask {
    /// Runs `callback` once.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::fallible(move || {
            callback();
            Ok(())
        })
    }

    /// Runs `callback` once; an `Err` fails the task.
    pub fn fallible<F>(callback: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            name: "ClosureTask".to_string(),
            callback: Some(Box::new(callback)),
        }
    }

    /// Sets the name used in logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Task for ClosureTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_update(&mut self, _dt: f32, ctx: &mut TaskContext<'_>) {
        let Some(callback) = self.callback.take() else {
            ctx.succeed();
            return;
        };
        match callback() {
            Ok(()) => {
                ctx.succeed();
            }
            Err(e) => {
                log::error!("Task '{}' failed: {e:#}", self.name);
                ctx.fail();
            }
        }
    }
}

impl fmt::Debug for ClosureTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureTask")
            .field("name", &self.name)
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{TaskRef, TaskState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_once_then_succeeds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let task = TaskRef::new(ClosureTask::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        task.run_init();
        task.run_update(0.1);
        task.run_update(0.1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(task.state(), TaskState::Succeeded);
    }

    #[test]
    fn error_fails_the_task() {
        let task = TaskRef::new(ClosureTask::fallible(|| anyhow::bail!("load failed")).named("LoadScene"));
        assert_eq!(task.name(), "LoadScene");
        task.run_init();
        task.run_update(0.1);
        assert_eq!(task.state(), TaskState::Failed);
    }
}
