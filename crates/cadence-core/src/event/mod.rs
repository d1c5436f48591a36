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


//! Event records and the listener contracts used by the event bus.
//!
//! Events are shared, immutable records identified by a numeric [`EventType`].
//! The bus hands the same [`EventPtr`] to every listener of a fan-out; the
//! record is dropped when the last holder releases it.

mod factory;
mod listener;

pub use self::factory::EventFactory;
pub use self::listener::{dispatch, Listener, ListenerId};

use std::any::Any;
use std::io;
use std::sync::Arc;

/// Numeric identifier of an event type.
pub type EventType = u64;

/// A shared, reference-counted event record.
pub type EventPtr = Arc<dyn Event>;

/// Base contract for every event carried by the bus.
pub trait Event: Any + Send + Sync {
    /// The type id listeners register against.
    fn event_type(&self) -> EventType;

    /// A readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Game time at which the event was created, in seconds.
    fn timestamp(&self) -> f32 {
        0.0
    }

    /// Writes the event's payload, for collaborators that forward events elsewhere.
    ///
    /// Payload-free events write nothing.
    fn serialize(&self, _out: &mut dyn io::Write) -> io::Result<()> {
        Ok(())
    }

    /// Allows downcasting to the concrete event type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    /// Returns the concrete event if it is of type `E`.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// A payload-free notification: only a type id, a name, and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    event_type: EventType,
    name: &'static str,
    timestamp: f32,
}

impl SignalEvent {
    /// Creates a signal with a zero timestamp.
    pub fn new(event_type: EventType, name: &'static str) -> Self {
        Self {
            event_type,
            name,
            timestamp: 0.0,
        }
    }

    /// Sets the timestamp.
    pub fn at(mut self, timestamp: f32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Wraps the signal in a shared pointer.
    pub fn shared(self) -> EventPtr {
        Arc::new(self)
    }
}

impl Event for SignalEvent {
    fn event_type(&self) -> EventType {
        self.event_type
    }
    fn name(&self) -> &'static str {
        self.name
    }
    fn timestamp(&self) -> f32 {
        self.timestamp
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}
