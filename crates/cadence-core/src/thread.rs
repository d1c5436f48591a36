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


//! Identity of the single thread allowed to mutate scheduler state and dispatch events.

use std::thread::{self, ThreadId};

/// Answers "is this the logic thread?".
///
/// Captured once when the scheduler and bus are created and copied into both.
/// Calling a logic-thread-only operation elsewhere is a programming error and
/// is enforced with an assertion, not reported as a recoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicThread {
    id: ThreadId,
}

impl LogicThread {
    /// Binds the logic thread to the calling thread.
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    /// Binds the logic thread to an explicit thread id.
    pub fn from_id(id: ThreadId) -> Self {
        Self { id }
    }

    /// Returns the bound thread id.
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Returns `true` if the caller runs on the logic thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.id
    }

    /// Panics if the caller is not the logic thread.
    ///
    /// `operation` names the offending call in the panic message.
    #[track_caller]
    pub fn assert_current(&self, operation: &str) {
        assert!(
            self.is_current(),
            "`{operation}` must be called from the logic thread ({:?}), but was called from {:?}",
            self.id,
            thread::current().id()
        );
    }
}
