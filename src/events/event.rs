//! # Runtime events emitted by the engine and the combinators.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Task lifecycle**: forked, completed, failed, cancelled
//! - **Primitives**: invoke, cancel, send/receive, first
//! - **Combinators**: race decisions, subscription dispatch, invariant violations
//! - **Runtime**: observer health and engine shutdown
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! message key and reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskweave::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("fetch")
//!     .with_task_id(7)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("fetch"));
//! assert_eq!(ev.task_id, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle ===
    /// A task was forked.
    ///
    /// Sets:
    /// - `task`, `task_id`: the new task
    /// - `parent`: the issuing task
    TaskForked,

    /// A forked task returned a value.
    ///
    /// Sets: `task`, `task_id`
    TaskCompleted,

    /// A forked task failed or panicked.
    ///
    /// Sets: `task`, `task_id`, `reason`
    TaskFailed,

    /// A forked task was torn down by cancellation.
    ///
    /// Sets: `task`, `task_id`
    TaskCanceled,

    // === Primitives ===
    /// An effect was invoked inside the current task.
    ///
    /// Sets:
    /// - `task`: effect name
    /// - `parent`: invoking task
    EffectInvoked,

    /// Cancellation was requested for a task.
    ///
    /// Sets:
    /// - `task`, `task_id`: the target
    /// - `parent`: the requesting task
    CancelRequested,

    /// A message was sent on a keyed channel.
    ///
    /// Sets: `key`
    MessageSent,

    /// A receiver accepted a message.
    ///
    /// Sets: `key`, `task`
    MessageReceived,

    /// A receiver fell behind the mailbox ring buffer and skipped messages.
    ///
    /// Sets: `task`, `reason` (number of skipped messages)
    MailboxLagged,

    /// Wait-for-first was issued.
    ///
    /// Sets:
    /// - `task`: waiting task
    /// - `index`: number of handles waited on
    FirstRequested,

    /// Wait-for-first resumed.
    ///
    /// Sets:
    /// - `task`: waiting task
    /// - `index`: winning position
    FirstResolved,

    // === Combinators ===
    /// A race picked its winner.
    ///
    /// Sets:
    /// - `task`: racing task
    /// - `key`: winning key
    /// - `reason`: `fast_path` or `first`
    RaceDecided,

    /// A subscription dispatched a message to its handler.
    ///
    /// Sets:
    /// - `task`: subscription task
    /// - `key`: message key
    /// - `reason`: dispatch policy label
    HandlerDispatched,

    /// A combinator detected a contract breach.
    ///
    /// Sets: `task`, `reason`
    InvariantViolated,

    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets: `task` (observer name), `reason` (panic info)
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (observer name), `reason`
    ObserverOverflow,

    // === Shutdown events ===
    /// Engine shutdown requested.
    ShutdownRequested,

    /// All live tasks settled within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some tasks did not settle in time.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or effect, or observer), if applicable.
    pub task: Option<Arc<str>>,
    /// Engine-assigned id of the task, if applicable.
    pub task_id: Option<u64>,
    /// Name of the issuing/requesting task.
    pub parent: Option<Arc<str>>,
    /// Message key or race key.
    pub key: Option<Arc<str>>,
    /// Position or count (wait-for-first).
    pub index: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            task_id: None,
            parent: None,
            key: None,
            index: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an engine task id.
    #[inline]
    pub fn with_task_id(mut self, id: u64) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Attaches the issuing task name.
    #[inline]
    pub fn with_parent(mut self, parent: impl Into<Arc<str>>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Attaches a message or race key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a position or count.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_task(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_task(observer)
            .with_reason(info)
    }

    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ObserverOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::MessageSent);
        let b = Event::new(EventKind::MessageSent);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_attach_metadata() {
        let ev = Event::new(EventKind::RaceDecided)
            .with_task("race")
            .with_key("1")
            .with_index(1)
            .with_reason("fast_path");
        assert_eq!(ev.key.as_deref(), Some("1"));
        assert_eq!(ev.index, Some(1));
        assert_eq!(ev.reason.as_deref(), Some("fast_path"));
        assert!(ev.parent.is_none());
    }

    #[test]
    fn overflow_helper() {
        let ev = Event::observer_overflow("metrics", "full");
        assert!(ev.is_observer_overflow());
        assert_eq!(ev.task.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("observer=metrics reason=full"));
    }
}
