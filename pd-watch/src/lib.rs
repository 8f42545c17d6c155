//! Watches the executor's output directory for newly emitted ktest files and
//! queues their names for the replay driver (§4.6).

pub mod queue;
pub mod watcher;

pub use queue::KtestQueue;
pub use watcher::{is_ktest_filename, spawn, watch};
