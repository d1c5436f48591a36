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


//! # Cadence Runtime
//!
//! The cooperative task scheduler and the publish/subscribe event bus that
//! together let a single logic thread coordinate deferred work and
//! cross-thread notifications without blocking.
//!
//! There are no global singletons: a [`Runtime`] owns one [`TaskScheduler`]
//! and one shared [`EventBus`] per session and is passed to whoever needs them.

#![warn(missing_docs)]

pub mod bus;
pub mod config;
pub mod context;
pub mod scheduler;
pub mod tasks;

pub use bus::EventBus;
pub use config::{EventBusConfig, RuntimeConfig, SchedulerConfig};
pub use context::{FrameReport, Runtime};
pub use scheduler::{TaskScheduler, TaskSubmitter, TickOutcome};
pub use tasks::{ClosureTask, Curve, DelayTask, InterpolateTask};

pub use cadence_core::{
    Event, EventPtr, EventType, FrameClock, Listener, ListenerId, LogicThread, SignalEvent, Task,
    TaskContext, TaskRef, TaskState, WeakTask,
};
