//! Error types for weft-core.

use crate::notifier::Phase;
use crate::runtime::WidgetId;
use crate::timer::TaskId;
use thiserror::Error;

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core runtime.
///
/// Parse and lookup failures are recoverable values carrying diagnostic
/// context; "no match" outcomes are booleans, never errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The chord grammar could not be parsed; `offset` is the number of
    /// characters consumed before the failing chord-key.
    #[error("malformed chord at offset {offset}")]
    ChordParse {
        /// Characters consumed before the failure.
        offset: usize,
    },

    /// A chord must contain at least one key.
    #[error("chord key sequence is empty")]
    EmptyChord,

    /// A listener id was out of range for the given phase.
    #[error("no {phase:?} listener with id {id}")]
    InvalidListener {
        /// The requested id.
        id: usize,
        /// The phase that was indexed.
        phase: Phase,
    },

    /// A timer task id was out of range.
    #[error("no timer task with id {}", .0 .0)]
    InvalidTask(TaskId),

    /// A widget handle did not name a live registry slot.
    #[error("no widget with id {}", .0 .0)]
    InvalidWidget(WidgetId),

    /// The scheduler thread is already running.
    #[error("scheduler thread already running")]
    SchedulerRunning,

    /// The scheduler thread is not running.
    #[error("scheduler thread not running")]
    SchedulerStopped,

    /// The scheduler thread could not be joined after a blocking stop.
    /// The thread is in an unknown state; the stop operation is aborted.
    #[error("scheduler thread could not be joined")]
    SchedulerJoin,

    /// A runtime already exists in this process.
    #[error("a runtime already exists in this process")]
    RuntimeConflict,

    /// An I/O error from the terminal backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_parse_error_carries_offset() {
        let err = Error::ChordParse { offset: 4 };
        assert!(err.to_string().contains("offset 4"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
