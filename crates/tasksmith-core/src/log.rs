//! The log multiplexer: a bounded, multi-producer, single-consumer channel
//! of per-task output lines.
//!
//! The core defines the channel and the producer discipline (one record per
//! completed line, FIFO per producer); how a consumer renders those lines
//! (plain stdout, colorized, an interactive table) is outside this crate.

use tokio::sync::mpsc;

/// Default bound used when a caller doesn't have a specific capacity in
/// mind. Large enough to absorb a burst of output from a handful of
/// concurrently-running tasks without blocking their pipe readers.
pub const DEFAULT_CAPACITY: usize = 256;

/// One line of output from one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub task: String,
    pub line: String,
}

pub type LogSender = mpsc::Sender<LogLine>;
pub type LogReceiver = mpsc::Receiver<LogLine>;

/// Create a bounded log channel. Publishers block when the channel is full;
/// that back-pressure is intentional and specified.
pub fn channel(capacity: usize) -> (LogSender, LogReceiver) {
    mpsc::channel(capacity.max(1))
}
