//! Ktest-name queue shared between the watcher (sole producer) and the
//! replay driver (sole consumer). A mutex-guarded deque is enough here: test
//! production rates are low enough that poll/sleep on the consumer side
//! costs nothing observable.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct KtestQueue(Arc<Mutex<VecDeque<String>>>);

impl KtestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a ktest name. Producer side only.
    pub fn push(&self, name: String) {
        self.0.lock().unwrap().push_back(name);
    }

    /// Pop the oldest still-queued name, preserving emission order.
    pub fn pop(&self) -> Option<String> {
        self.0.lock().unwrap().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }

    /// Drain everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.0.lock().unwrap().drain(..).collect()
    }
}
