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


//! The publish/subscribe event bus.
//!
//! Three delivery modes share one listener registry:
//!
//! - **immediate** ([`EventBus::trigger`] with no delay): fan-out on the
//!   calling thread, which must be the logic thread;
//! - **delayed** ([`EventBus::trigger`] with a delay): the current listeners
//!   are snapshotted and a delay chain is submitted to the scheduler;
//! - **queued** ([`EventBus::queue`]): any thread enqueues, the logic thread
//!   delivers on its next [`EventBus::update`].
//!
//! The registry lock is held only while the registry is read or mutated,
//! never during dispatch, so listeners may (un)register from inside a callback.

use crate::config::EventBusConfig;
use crate::scheduler::TaskSubmitter;
use crate::tasks::{ClosureTask, DelayTask};
use cadence_core::event::dispatch;
use cadence_core::queue::ConcurrentQueue;
use cadence_core::utils::timer::Stopwatch;
use cadence_core::{EventPtr, EventType, Listener, ListenerId, LogicThread, TaskRef};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type ListenerMap = HashMap<EventType, Vec<Listener>>;

/// Registry of listeners per event type, with immediate, delayed and queued delivery.
///
/// Share it between threads behind an `Arc`.
pub struct EventBus {
    listeners: Mutex<ListenerMap>,
    queue: ConcurrentQueue<EventPtr>,
    scheduler: TaskSubmitter,
    logic_thread: LogicThread,
    config: EventBusConfig,
}

impl EventBus {
    /// Creates a bus that schedules delayed deliveries through `scheduler`.
    pub fn new(scheduler: TaskSubmitter, logic_thread: LogicThread) -> Self {
        Self::with_config(scheduler, logic_thread, EventBusConfig::default())
    }

    /// Creates a bus with an explicit configuration.
    pub fn with_config(
        scheduler: TaskSubmitter,
        logic_thread: LogicThread,
        config: EventBusConfig,
    ) -> Self {
        log::info!("EventBus initialized.");
        Self {
            listeners: Mutex::new(HashMap::new()),
            queue: ConcurrentQueue::new(),
            scheduler,
            logic_thread,
            config,
        }
    }

    /// The bus configuration.
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    // --- Registry ---

    /// Registers `listener` for `event_type`. Callable from any thread.
    ///
    /// Returns `false` if this listener is already registered for the type.
    pub fn add_listener(&self, listener: &Listener, event_type: EventType) -> bool {
        let mut registry = self.registry();
        let list = registry.entry(event_type).or_default();
        if list.iter().any(|l| l.id() == listener.id()) {
            log::warn!(
                "EventBus: listener {} is already registered for event type {event_type:#x}.",
                listener.id()
            );
            return false;
        }
        list.push(listener.clone());
        log::trace!(
            "EventBus: listener {} registered for event type {event_type:#x}.",
            listener.id()
        );
        true
    }

    /// Unregisters the listener with `id` from `event_type`. Callable from any thread.
    ///
    /// Returns `false` if the pairing was not registered.
    pub fn remove_listener(&self, id: ListenerId, event_type: EventType) -> bool {
        let mut registry = self.registry();
        let Some(list) = registry.get_mut(&event_type) else {
            return false;
        };
        let Some(position) = list.iter().position(|l| l.id() == id) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            registry.remove(&event_type);
        }
        true
    }

    /// Unregisters the listener with `id` from every event type.
    ///
    /// Returns the number of registrations removed.
    pub fn remove_all(&self, id: ListenerId) -> usize {
        let mut registry = self.registry();
        let mut removed = 0;
        registry.retain(|_, list| {
            let before = list.len();
            list.retain(|l| l.id() != id);
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Number of listeners registered for `event_type`.
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.registry().get(&event_type).map_or(0, Vec::len)
    }

    // --- Delivery ---

    /// Fires `event` now, or after `delay_secs` of accumulated scheduler time.
    ///
    /// Without a delay the listeners run synchronously on the calling thread
    /// and the return value tells whether any listener was registered. With a
    /// delay the listener list is captured now; later registry changes do not
    /// affect this delivery.
    ///
    /// # Panics
    ///
    /// Immediate delivery panics when called from any thread but the logic thread.
    pub fn trigger(&self, event: EventPtr, delay_secs: f32) -> bool {
        if delay_secs <= 0.0 {
            self.logic_thread.assert_current("EventBus::trigger");
            let listeners = self.snapshot(event.event_type());
            if listeners.is_empty() {
                return false;
            }
            dispatch(&listeners, &event);
            return true;
        }

        let listeners = self.snapshot(event.event_type());

        log::debug!(
            "EventBus: delaying event '{}' by {delay_secs}s for {} listener(s).",
            event.name(),
            listeners.len()
        );
        let name = format!("DelayedTrigger({})", event.name());
        let fan_out = ClosureTask::new(move || {
            dispatch(&listeners, &event);
        })
        .named(name);
        self.scheduler
            .submit(TaskRef::new(DelayTask::new(delay_secs)).then(TaskRef::new(fan_out)));
        true
    }

    /// Queues `event` for the next [`update`](Self::update). Callable from any thread.
    pub fn queue(&self, event: EventPtr) -> bool {
        log::trace!("EventBus: queued event '{}'.", event.name());
        self.queue.push(event);
        true
    }

    /// Delivers queued events on the logic thread.
    ///
    /// Only the events already queued when the call starts are processed;
    /// events queued meanwhile wait for the next call. With a `budget`, the
    /// drain stops once the budget is spent and `false` is returned: the rest
    /// stays queued, in order, for a later call.
    ///
    /// # Panics
    ///
    /// Panics when called from any thread but the logic thread.
    pub fn update(&self, budget: Option<Duration>) -> bool {
        self.logic_thread.assert_current("EventBus::update");
        let watch = Stopwatch::new();
        let batch = self.queue.len();

        for processed in 1..=batch {
            let Some(event) = self.queue.try_pop() else {
                break;
            };
            let listeners = self.snapshot(event.event_type());
            dispatch(&listeners, &event);

            if processed < batch && watch.exceeded(budget) {
                if self.config.warn_on_budget_exceeded {
                    log::warn!(
                        "EventBus: update budget of {:?} spent after {processed} event(s) in {}ms; {} deferred.",
                        budget.unwrap_or_default(),
                        watch.elapsed_ms(),
                        batch - processed
                    );
                }
                return false;
            }
        }
        true
    }

    /// Discards every queued event. Callable from any thread.
    ///
    /// Returns the number of events discarded.
    pub fn clear_events(&self) -> usize {
        let discarded = self.queue.drain().len();
        if discarded > 0 {
            log::debug!("EventBus: cleared {discarded} queued event(s).");
        }
        discarded
    }

    /// Returns `true` if an event of `event_type` is waiting in the queue.
    ///
    /// The queue has no in-place search: every event is drained and
    /// re-enqueued. Events queued concurrently by other threads may end up
    /// ahead of re-enqueued ones.
    pub fn has_event(&self, event_type: EventType) -> bool {
        self.queue.any(|event| event.event_type() == event_type)
    }

    /// Removes the first queued event of `event_type`, or all of them.
    ///
    /// Returns `true` if anything was removed. Same ordering caveat as
    /// [`has_event`](Self::has_event). Events already being dispatched are
    /// not affected.
    pub fn abort_event(&self, event_type: EventType, all_of_type: bool) -> bool {
        let mut removed_one = false;
        let removed = self.queue.retain(|event| {
            if event.event_type() != event_type || (removed_one && !all_of_type) {
                return true;
            }
            removed_one = true;
            false
        });
        removed > 0
    }

    /// Number of events waiting in the queue.
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    fn snapshot(&self, event_type: EventType) -> Vec<Listener> {
        self.registry()
            .get(&event_type)
            .cloned()
            .unwrap_or_default()
    }

    fn registry(&self) -> MutexGuard<'_, ListenerMap> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
