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


//! A non-blocking multi-producer queue used as the cross-thread handoff primitive.
//!
//! Producers on any thread push through a [`QueueProducer`] or the queue itself;
//! the owner drains it from its own thread. The queue offers no in-place search,
//! so [`ConcurrentQueue::retain`] and [`ConcurrentQueue::any`] drain the whole
//! queue into a temporary buffer and re-enqueue what survives. Items pushed by
//! other threads while such a scan is running end up behind the re-enqueued
//! items, so strict FIFO order is not kept under concurrent producers.

/// Manages a generic, thread-safe, unbounded channel used as a queue.
///
/// The queue is generic over the item type `T` so that the scheduler can move
/// task handles through it and the event bus can move event records through it.
#[derive(Debug)]
pub struct ConcurrentQueue<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> ConcurrentQueue<T> {
    /// Creates a new, empty queue backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Enqueues an item. Never blocks.
    pub fn push(&self, item: T) {
        // The queue owns its receiver, so the channel cannot be disconnected here.
        if let Err(e) = self.sender.send(item) {
            log::error!("Failed to enqueue item: {e}.");
        }
    }

    /// Dequeues the oldest item, if any. Never blocks.
    pub fn try_pop(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Removes and returns every item currently in the queue, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.drain().collect()
    }

    /// Returns the number of items currently queued.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns a cloneable producer handle for other threads.
    pub fn producer(&self) -> QueueProducer<T> {
        QueueProducer {
            sender: self.sender.clone(),
        }
    }

    /// Keeps only the items for which `keep` returns `true`.
    ///
    /// Returns the number of items removed. `keep` sees the items oldest first
    /// and may carry state, e.g. to drop only the first match.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let buffered = self.drain();
        let mut removed = 0;
        for item in buffered {
            if keep(&item) {
                self.push(item);
            } else {
                removed += 1;
            }
        }
        removed
    }

    /// Returns `true` if any queued item matches `predicate`.
    ///
    /// Every item is drained and re-enqueued, even after a match is found.
    pub fn any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut found = false;
        self.retain(|item| {
            found = found || predicate(item);
            true
        });
        found
    }
}

impl<T: Send + 'static> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The sending half of a [`ConcurrentQueue`], safe to clone and move across threads.
#[derive(Debug)]
pub struct QueueProducer<T: Send + 'static> {
    sender: flume::Sender<T>,
}

impl<T: Send + 'static> QueueProducer<T> {
    /// Enqueues an item. Returns `false` if the queue itself has been dropped.
    pub fn push(&self, item: T) -> bool {
        if self.sender.send(item).is_err() {
            log::warn!("Dropping item: the receiving queue no longer exists.");
            return false;
        }
        true
    }
}

impl<T: Send + 'static> Clone for QueueProducer<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
