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


//! A registry of event constructors keyed by event type.
//!
//! Lets collaborators that only know a numeric [`EventType`] (for example a
//! network layer decoding a packet header) create the matching event.

use super::{Event, EventPtr, EventType};
use std::collections::HashMap;
use std::sync::Arc;

type Constructor = Box<dyn Fn() -> EventPtr + Send + Sync>;

/// Creates default-constructed events from their type id.
///
/// # Example
///
/// ```rust
/// use cadence_core::event::{Event, EventFactory, EventType};
/// use std::any::Any;
///
/// #[derive(Default)]
/// struct Pause;
///
/// impl Event for Pause {
///     fn event_type(&self) -> EventType { 42 }
///     fn name(&self) -> &'static str { "Pause" }
///     fn as_any(&self) -> &dyn Any { self }
/// }
///
/// let mut factory = EventFactory::new();
/// factory.register::<Pause>();
///
/// let event = factory.create(42).unwrap();
/// assert_eq!(event.name(), "Pause");
/// ```
#[derive(Default)]
pub struct EventFactory {
    constructors: HashMap<EventType, Constructor>,
}

impl EventFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers `E` under the type id reported by `E::default()`.
    ///
    /// Registering a second constructor for the same id replaces the first
    /// and returns `false`.
    pub fn register<E: Event + Default>(&mut self) -> bool {
        let event_type = E::default().event_type();
        self.register_with(event_type, || Arc::new(E::default()))
    }

    /// Registers an arbitrary constructor for `event_type`.
    pub fn register_with<F>(&mut self, event_type: EventType, constructor: F) -> bool
    where
        F: Fn() -> EventPtr + Send + Sync + 'static,
    {
        let replaced = self
            .constructors
            .insert(event_type, Box::new(constructor))
            .is_some();
        if replaced {
            log::warn!("EventFactory: replaced constructor for event type {event_type:#x}.");
        }
        !replaced
    }

    /// Creates a new event of the given type, or `None` if it is unknown.
    #[must_use]
    pub fn create(&self, event_type: EventType) -> Option<EventPtr> {
        self.constructors.get(&event_type).map(|make| make())
    }

    /// Returns `true` if a constructor is registered for `event_type`.
    #[must_use]
    pub fn contains(&self, event_type: EventType) -> bool {
        self.constructors.contains_key(&event_type)
    }

    /// Returns the number of registered constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
