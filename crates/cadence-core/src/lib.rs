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


//! # Cadence Core
//!
//! Foundational crate containing the traits, handles, and cross-thread
//! primitives shared by the task scheduler and the event bus.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod queue;
pub mod task;
pub mod thread;
pub mod utils;

pub use error::DispatchError;
pub use event::{Event, EventFactory, EventPtr, EventType, Listener, ListenerId, SignalEvent};
pub use queue::{ConcurrentQueue, QueueProducer};
pub use task::{Task, TaskContext, TaskRef, TaskState, WeakTask};
pub use thread::LogicThread;
pub use utils::timer::{FrameClock, Stopwatch};
