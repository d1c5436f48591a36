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


use cadence_runtime::{
    ClosureTask, DelayTask, LogicThread, Task, TaskContext, TaskRef, TaskScheduler, TaskState,
};
use std::sync::{Arc, Mutex};
use std::thread;

type Journal = Arc<Mutex<Vec<String>>>;

/// Records every hook and finishes with a fixed outcome on its first update.
struct Step {
    name: &'static str,
    journal: Journal,
    succeeds: bool,
}

impl Step {
    fn task(name: &'static str, journal: &Journal, succeeds: bool) -> TaskRef {
        TaskRef::new(Step {
            name,
            journal: Arc::clone(journal),
            succeeds,
        })
    }

    fn record(&self, hook: &str) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{hook}", self.name));
    }
}

impl Task for Step {
    fn name(&self) -> &str {
        self.name
    }

    fn on_init(&mut self, _ctx: &mut TaskContext<'_>) {
        self.record("init");
    }

    fn on_update(&mut self, _dt: f32, ctx: &mut TaskContext<'_>) {
        self.record("update");
        if self.succeeds {
            ctx.succeed();
        } else {
            ctx.fail();
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

#[test]
fn test_delayed_closure_runs_exactly_once() {
    // --- 1. ARRANGE ---
    let mut scheduler = TaskScheduler::new(LogicThread::current());
    let journal: Journal = Arc::default();
    let writer = Arc::clone(&journal);
    let chain = TaskRef::new(DelayTask::new(5.0)).then(TaskRef::new(ClosureTask::new(move || {
        writer.lock().unwrap().push("X".to_string());
    })));
    scheduler.submit(chain);

    // --- 2. ACT & ASSERT ---
    for _ in 0..4 {
        scheduler.tick(1.0);
    }
    assert!(journal.lock().unwrap().is_empty(), "Delay must not elapse before 5s");

    let outcome = scheduler.tick(1.0);
    assert_eq!(*journal.lock().unwrap(), vec!["X"]);
    assert_eq!(outcome.succeeded, 1);

    scheduler.tick(1.0);
    assert_eq!(*journal.lock().unwrap(), vec!["X"], "The closure must run only once");
    assert_eq!(scheduler.process_count(), 0);
}

#[test]
fn test_succeeding_chain_runs_in_order() {
    // --- 1. ARRANGE ---
    let mut scheduler = TaskScheduler::new(LogicThread::current());
    let journal: Journal = Arc::default();
    let a = Step::task("A", &journal, true);
    let b = Step::task("B", &journal, true);
    let c = Step::task("C", &journal, true);
    scheduler.submit(a.clone().then(b.clone()).then(c.clone()));

    // --- 2. ACT ---
    let outcome = scheduler.tick(0.1);

    // --- 3. ASSERT ---
    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "A:init", "A:update", "A:success", "B:init", "B:update", "B:success", "C:init",
            "C:update", "C:success",
        ]
    );
    assert_eq!(outcome.succeeded, 1, "A chain counts once, when its tail finishes");
    assert_eq!(outcome.failed, 0);
    for task in [&a, &b, &c] {
        assert_eq!(task.state(), TaskState::Succeeded);
    }
    assert_eq!(scheduler.process_count(), 0);
}

#[test]
fn test_failure_aborts_the_rest_of_the_chain() {
    // --- 1. ARRANGE ---
    let mut scheduler = TaskScheduler::new(LogicThread::current());
    let journal: Journal = Arc::default();
    let b = Step::task("B", &journal, true);
    let c = Step::task("C", &journal, true);
    scheduler.submit(Step::task("A", &journal, false).then(b.clone()).then(c.clone()));

    // --- 2. ACT ---
    let outcome = scheduler.tick(0.1);

    // --- 3. ASSERT ---
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["A:init", "A:update", "A:fail", "B:abort", "C:abort"]
    );
    assert_eq!(outcome.failed, 1);
    assert_eq!(b.state(), TaskState::Aborted);
    assert_eq!(c.state(), TaskState::Aborted);
    assert_eq!(scheduler.process_count(), 0);
}

#[test]
fn test_paused_task_holds_its_chain() {
    // --- 1. ARRANGE ---
    let mut scheduler = TaskScheduler::new(LogicThread::current());
    let journal: Journal = Arc::default();
    let delay = TaskRef::new(DelayTask::new(1.0));
    let tail = Step::task("Tail", &journal, true);
    scheduler.submit(delay.clone().then(tail.clone()));
    scheduler.tick(0.5);

    // --- 2. ACT ---
    assert!(delay.pause());
    scheduler.tick(10.0);
    scheduler.tick(10.0);

    // --- 3. ASSERT ---
    assert_eq!(delay.state(), TaskState::Paused);
    assert!(journal.lock().unwrap().is_empty());

    assert!(delay.resume());
    scheduler.tick(0.5);
    assert_eq!(tail.state(), TaskState::Succeeded);
}

#[test]
fn test_submissions_from_many_threads() {
    // --- 1. ARRANGE ---
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;
    let mut scheduler = TaskScheduler::new(LogicThread::current());
    let journal: Journal = Arc::default();

    // --- 2. ACT ---
    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let submitter = scheduler.submitter();
            let journal = Arc::clone(&journal);
            thread::spawn(move || {
                for job in 0..PER_THREAD {
                    let journal = Arc::clone(&journal);
                    submitter.submit_task(ClosureTask::new(move || {
                        journal.lock().unwrap().push(format!("{worker}:{job}"));
                    }));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("Worker thread panicked");
    }
    let outcome = scheduler.tick(0.0);

    // --- 3. ASSERT ---
    assert_eq!(outcome.succeeded as usize, THREADS * PER_THREAD);
    let journal = journal.lock().unwrap();
    assert_eq!(journal.len(), THREADS * PER_THREAD);
    for worker in 0..THREADS {
        let jobs: Vec<_> = journal
            .iter()
            .filter(|entry| entry.starts_with(&format!("{worker}:")))
            .collect();
        let expected: Vec<_> = (0..PER_THREAD).map(|job| format!("{worker}:{job}")).collect();
        assert_eq!(jobs.len(), PER_THREAD);
        assert!(
            jobs.iter().zip(&expected).all(|(got, want)| *got == want),
            "Submissions from one thread keep their order"
        );
    }
}

#[test]
fn test_tick_off_logic_thread_panics() {
    let logic = LogicThread::current();
    let result = thread::spawn(move || {
        let mut scheduler = TaskScheduler::new(logic);
        scheduler.tick(0.0);
    })
    .join();
    assert!(result.is_err());
}
