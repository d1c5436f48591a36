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


//! Listener delegates and the isolated fan-out used by every delivery mode.

use super::EventPtr;
use crate::error::{panic_message, DispatchError};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token of a listener.
///
/// Closures cannot be compared, so registration and removal match on this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// The raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type ListenerFn = dyn Fn(&EventPtr) -> anyhow::Result<()> + Send + Sync;

/// A callable listener with a stable identity.
///
/// Cloning a listener keeps its id, so the clone can be used to unregister
/// the original. One listener may be registered for many event types.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<ListenerFn>,
}

impl Listener {
    /// Creates a listener with a fresh id.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EventPtr) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            id: ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed)),
            callback: Arc::new(callback),
        }
    }

    /// Creates a listener from a callback that cannot fail.
    pub fn infallible<F>(callback: F) -> Self
    where
        F: Fn(&EventPtr) + Send + Sync + 'static,
    {
        Self::new(move |event| {
            callback(event);
            Ok(())
        })
    }

    /// The listener's identity token.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invokes the listener, turning both errors and panics into a [`DispatchError`].
    pub fn invoke(&self, event: &EventPtr) -> Result<(), DispatchError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(event))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DispatchError::ListenerFailed {
                event: event.name(),
                listener: self.id.get(),
                message: format!("{e:#}"),
            }),
            Err(payload) => Err(DispatchError::ListenerPanicked {
                event: event.name(),
                listener: self.id.get(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// Delivers `event` to every listener in order.
///
/// Each invocation is isolated: a failing listener is logged with the event's
/// name and the error text, and delivery continues with the rest. Returns the
/// number of listeners that completed normally.
pub fn dispatch(listeners: &[Listener], event: &EventPtr) -> usize {
    let mut delivered = 0;
    for listener in listeners {
        log::trace!("Sending event '{}' to listener {}.", event.name(), listener.id());
        match listener.invoke(event) {
            Ok(()) => delivered += 1,
            Err(e) => log::error!("Error in listener for event '{}': {e}", event.name()),
        }
    }
    delivered
}
