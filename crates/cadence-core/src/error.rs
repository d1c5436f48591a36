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


//! Errors surfaced while dispatching events to listeners.
//!
//! These never cross the public API boundary; dispatch sites log them and
//! move on to the next listener.

use thiserror::Error;

/// A single listener invocation that did not complete normally.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The listener returned an error.
    #[error("listener {listener} failed on event '{event}': {message}")]
    ListenerFailed {
        /// Name of the event being delivered.
        event: &'static str,
        /// Numeric id of the listener.
        listener: u64,
        /// The listener's error text.
        message: String,
    },
    /// The listener panicked.
    #[error("listener {listener} panicked on event '{event}': {message}")]
    ListenerPanicked {
        /// Name of the event being delivered.
        event: &'static str,
        /// Numeric id of the listener.
        listener: u64,
        /// The panic payload, if it was a string.
        message: String,
    },
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
