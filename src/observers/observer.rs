//! # Event observer trait.
//!
//! Provides [`Observe`], the extension point for plugging custom event handlers
//! into the engine.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-observer bounded queue** (capacity via [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::ObserverPanicked`)
//!
//! ## Architecture
//! ```text
//! ObserverSet ──► [bounded queue] ──► worker task ──► observer.on_event()
//!                                  └─► panic caught → EventKind::ObserverPanicked
//! ```
//!
//! ## Rules
//! - A slow observer only affects its own queue.
//! - Queue overflow drops the event **for this observer only** and publishes
//!   `EventKind::ObserverOverflow`.
//! - Events are processed sequentially (FIFO) per observer.
//! - Observers never block the engine, the combinators or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskweave::{Event, EventKind, Observe};
//!
//! struct RaceAudit;
//!
//! #[async_trait]
//! impl Observe for RaceAudit {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::RaceDecided) {
//!             // record the winning key, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "race-audit" }
//!     fn queue_capacity(&self) -> usize { 256 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event observer for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the observer name used in overflow/panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this observer (clamped to at least 1).
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
