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


//! Cooperative units of work and their chains.
//!
//! A [`Task`] never blocks: it expresses "still waiting" by returning from
//! [`Task::on_update`] without reporting an outcome, and is revisited on the
//! next tick. Each task may own a single child that runs after it succeeds,
//! which gives chains such as *wait, then fade, then load*.

mod context;
mod handle;
mod state;

pub use self::context::TaskContext;
pub use self::handle::{TaskRef, WeakTask};
pub use self::state::TaskState;

/// The behaviour of a cooperative task.
///
/// The scheduler owns the state machine; implementors only react to hooks and
/// report outcomes through the [`TaskContext`].
pub trait Task: Send {
    /// A human readable name, used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once, on the first tick after submission. The task is already running.
    fn on_init(&mut self, _ctx: &mut TaskContext<'_>) {}

    /// Called every tick while the task is running.
    ///
    /// Call [`TaskContext::succeed`] or [`TaskContext::fail`] when the work concludes.
    fn on_update(&mut self, dt: f32, ctx: &mut TaskContext<'_>);

    /// Called once after the task succeeded, before its child is promoted.
    fn on_success(&mut self) {}

    /// Called once after the task failed.
    fn on_fail(&mut self) {}

    /// Called once after the task was aborted, or discarded because a parent failed.
    fn on_abort(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every hook it receives and succeeds after `ticks` updates.
    struct Recorder {
        label: &'static str,
        ticks: u32,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn task(label: &'static str, ticks: u32, log: &Arc<Mutex<Vec<String>>>) -> TaskRef {
            TaskRef::new(Recorder {
                label,
                ticks,
                log: Arc::clone(log),
            })
        }

        fn record(&self, hook: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{hook}", self.label));
        }
    }

    impl Task for Recorder {
        fn name(&self) -> &str {
            self.label
        }
        fn on_init(&mut self, _ctx: &mut TaskContext<'_>) {
            self.record("init");
        }
        fn on_update(&mut self, _dt: f32, ctx: &mut TaskContext<'_>) {
            self.record("update");
            self.ticks = self.ticks.saturating_sub(1);
            if self.ticks == 0 {
                ctx.succeed();
            }
        }
        fn on_success(&mut self) {
            self.record("success");
        }
        fn on_fail(&mut self) {
            self.record("fail");
        }
        fn on_abort(&mut self) {
            self.record("abort");
        }
    }

    struct Panicky;

    impl Task for Panicky {
        fn on_update(&mut self, _dt: f32, _ctx: &mut TaskContext<'_>) {
            panic!("update exploded");
        }
    }

    fn new_log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn new_task_is_uninitialized_and_named() {
        let log = new_log();
        let task = Recorder::task("recorder", 1, &log);
        assert_eq!(task.state(), TaskState::Uninitialized);
        assert_eq!(task.name(), "recorder");
        assert!(!task.is_alive());
        assert!(!task.is_dead());
    }

    #[test]
    fn default_name_is_type_name() {
        let task = TaskRef::new(Panicky);
        assert!(task.name().ends_with("Panicky"));
    }

    #[test]
    fn init_then_update_until_success() {
        let log = new_log();
        let task = Recorder::task("a", 2, &log);

        assert!(task.run_init());
        assert!(!task.run_init(), "A task is initialized only once");
        assert_eq!(task.state(), TaskState::Running);

        task.run_update(0.1);
        assert_eq!(task.state(), TaskState::Running);
        task.run_update(0.1);
        assert_eq!(task.state(), TaskState::Succeeded);

        task.notify_outcome();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:init", "a:update", "a:update", "a:success"]
        );
    }

    #[test]
    fn pause_and_resume_round_trip() {
        let log = new_log();
        let task = Recorder::task("a", 5, &log);

        assert!(!task.pause(), "Pausing an uninitialized task is a no-op");
        assert_eq!(task.state(), TaskState::Uninitialized);
        assert!(!task.resume());

        task.run_init();
        assert!(task.pause());
        assert!(task.is_paused());
        assert!(!task.pause(), "Pausing twice is a no-op");

        task.run_update(1.0);
        assert_eq!(log.lock().unwrap().len(), 1, "Paused tasks are not updated");

        assert!(task.resume());
        assert_eq!(task.state(), TaskState::Running);
        assert!(!task.run_init(), "Resuming never re-runs on_init");
        assert_eq!(*log.lock().unwrap(), vec!["a:init"]);
    }

    #[test]
    fn fail_only_valid_while_alive() {
        let log = new_log();
        let task = Recorder::task("a", 1, &log);
        assert!(!task.fail());
        assert_eq!(task.state(), TaskState::Uninitialized);

        task.run_init();
        task.pause();
        assert!(task.fail());
        assert_eq!(task.state(), TaskState::Failed);
        assert!(!task.succeed(), "Dead tasks never change state again");
        assert!(!task.abort());
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn attach_child_appends_at_tail() {
        let log = new_log();
        let a = Recorder::task("a", 1, &log);
        let b = Recorder::task("b", 1, &log);
        let c = Recorder::task("c", 1, &log);

        a.attach_child(b.clone());
        a.attach_child(c.clone());

        assert!(a.peek_child().unwrap().ptr_eq(&b));
        assert!(b.peek_child().unwrap().ptr_eq(&c));
        assert_eq!(a.chain_len(), 3);
    }

    #[test]
    fn then_builds_the_same_chain() {
        let log = new_log();
        let head = Recorder::task("a", 1, &log)
            .then(Recorder::task("b", 1, &log))
            .then(Recorder::task("c", 1, &log));
        assert_eq!(head.chain_len(), 3);
        assert_eq!(head.peek_child().unwrap().name(), "b");
    }

    #[test]
    fn attach_refuses_cycles() {
        let log = new_log();
        let a = Recorder::task("a", 1, &log);
        let b = Recorder::task("b", 1, &log);
        a.attach_child(b.clone());
        b.attach_child(a.clone());
        a.attach_child(a.clone());
        assert_eq!(a.chain_len(), 2);
        assert!(b.peek_child().is_none());
    }

    #[test]
    fn remove_child_transfers_ownership() {
        let log = new_log();
        let a = Recorder::task("a", 1, &log);
        let b = Recorder::task("b", 1, &log);
        a.attach_child(b.clone());

        let detached = a.remove_child().expect("child should be present");
        assert!(detached.ptr_eq(&b));
        assert!(a.peek_child().is_none());
        assert_eq!(detached.state(), TaskState::Uninitialized);
    }

    #[test]
    fn abort_chain_reaches_every_descendant() {
        let log = new_log();
        let a = Recorder::task("a", 1, &log);
        let b = Recorder::task("b", 1, &log);
        let c = Recorder::task("c", 1, &log);
        a.attach_child(b.clone());
        a.attach_child(c.clone());

        a.abort_chain();

        for task in [&a, &b, &c] {
            assert_eq!(task.state(), TaskState::Aborted);
        }
        assert_eq!(*log.lock().unwrap(), vec!["a:abort", "b:abort", "c:abort"]);
        assert!(b.peek_child().is_none());
    }

    #[test]
    fn panicking_update_fails_the_task() {
        let task = TaskRef::new(Panicky);
        task.run_init();
        task.run_update(0.016);
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn context_can_extend_the_chain_from_a_hook() {
        struct Spawner;
        impl Task for Spawner {
            fn on_update(&mut self, _dt: f32, ctx: &mut TaskContext<'_>) {
                ctx.attach_child(TaskRef::new(Spawner));
                ctx.succeed();
            }
        }

        let task = TaskRef::new(Spawner);
        task.run_init();
        task.run_update(0.0);
        assert_eq!(task.state(), TaskState::Succeeded);
        assert!(task.peek_child().is_some());
    }

    /// Tries to attach its own handle, then a chain leading back to itself.
    struct Looper {
        me: Arc<Mutex<Option<TaskRef>>>,
        loop_back: Option<TaskRef>,
        accepted: Arc<Mutex<Vec<bool>>>,
    }

    impl Task for Looper {
        fn on_update(&mut self, _dt: f32, ctx: &mut TaskContext<'_>) {
            let me = self.me.lock().unwrap().clone().expect("handle set before update");
            let mut accepted = self.accepted.lock().unwrap();
            accepted.push(ctx.attach_child(me));
            if let Some(loop_back) = self.loop_back.take() {
                accepted.push(ctx.attach_child(loop_back));
            }
            ctx.succeed();
        }
    }

    fn looper(loop_back: Option<TaskRef>) -> (TaskRef, Arc<Mutex<Vec<bool>>>) {
        let me = Arc::new(Mutex::new(None));
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let task = TaskRef::new(Looper {
            me: Arc::clone(&me),
            loop_back,
            accepted: Arc::clone(&accepted),
        });
        *me.lock().unwrap() = Some(task.clone());
        (task, accepted)
    }

    #[test]
    fn context_refuses_to_attach_the_running_task() {
        let (task, accepted) = looper(None);
        task.run_init();
        task.run_update(0.0);

        assert_eq!(*accepted.lock().unwrap(), vec![false]);
        assert!(task.peek_child().is_none());
        assert_eq!(task.state(), TaskState::Succeeded);
    }

    #[test]
    fn context_refuses_a_chain_leading_back_to_the_running_task() {
        let log = new_log();
        let back = Recorder::task("back", 1, &log);
        let (task, accepted) = looper(Some(back.clone()));
        assert!(task.attach_child(Recorder::task("child", 1, &log)));
        assert!(back.attach_child(task.clone()));

        task.run_init();
        task.run_update(0.0);

        assert_eq!(*accepted.lock().unwrap(), vec![false, false]);
        assert_eq!(task.chain_len(), 2);
        assert_eq!(task.state(), TaskState::Succeeded);
    }

    #[test]
    fn attached_task_has_a_single_parent() {
        let log = new_log();
        let a = Recorder::task("a", 1, &log);
        let b = Recorder::task("b", 1, &log);
        let shared = Recorder::task("shared", 1, &log);

        assert!(a.attach_child(shared.clone()));
        assert!(shared.is_attached());
        assert!(!b.attach_child(shared.clone()));
        assert!(b.peek_child().is_none());

        a.remove_child();
        assert!(!shared.is_attached());
        assert!(b.attach_child(shared));
    }

    #[test]
    fn weak_handle_observes_release() {
        let log = new_log();
        let task = Recorder::task("a", 1, &log);
        let weak = task.downgrade();
        assert_eq!(weak.state(), Some(TaskState::Uninitialized));
        drop(task);
        assert!(weak.upgrade().is_none());
        assert_eq!(weak.state(), None);
    }

    #[test]
    fn handles_cross_threads() {
        let log = new_log();
        let task = Recorder::task("a", 1, &log);
        let remote = task.clone();
        std::thread::spawn(move || {
            remote.attach_child(TaskRef::new(Panicky));
        })
        .join()
        .expect("Thread join failed");
        assert_eq!(task.chain_len(), 2);
    }
}
