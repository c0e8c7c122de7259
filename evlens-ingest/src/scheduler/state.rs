//! Scheduler lifecycle state shared with the consumer.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Lifecycle state of the ingest loop.
///
/// `Idle -> Running -> (Yielded <-> Running)* -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IngestState {
    /// Created, not started.
    Idle = 0,
    /// Pulling and storing messages.
    Running = 1,
    /// Parked in a hand-off, waiting for the consumer.
    Yielded = 2,
    /// Finished. Terminal.
    Stopped = 3,
}

impl IngestState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Yielded,
            _ => Self::Stopped,
        }
    }

    /// Check if the state is terminal.
    pub fn is_terminal(self) -> bool {
        self == Self::Stopped
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Yielded => "yielded",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Why the ingest loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source has no more messages.
    Exhausted,
    /// [`SchedulerHandle::request_stop`] was called.
    StopRequested,
    /// The consumer dropped its hand-off receiver.
    ConsumerGone,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Exhausted => "source exhausted",
            Self::StopRequested => "stop requested",
            Self::ConsumerGone => "consumer gone",
        };
        f.write_str(reason)
    }
}

/// Counters of a finished ingest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Messages pulled from the source.
    pub messages: u64,
    /// Events appended to the table.
    pub events: u64,
    /// Schemas declared.
    pub schemas: usize,
    /// Hand-offs to the consumer.
    pub yields: u64,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
}

/// Cloneable control handle of a running scheduler.
///
/// Lets any context observe the lifecycle state and request a stop.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    state: Arc<AtomicU8>,
    stop: Arc<AtomicBool>,
}

impl SchedulerHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(IngestState::Idle as u8)),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IngestState {
        IngestState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Ask the scheduler to stop. Honored at the top of its next iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Check if a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Check if the scheduler has stopped.
    pub fn is_stopped(&self) -> bool {
        self.state().is_terminal()
    }

    pub(crate) fn set_state(&self, state: IngestState) {
        self.state.store(state as u8, Ordering::Release);
    }
}
