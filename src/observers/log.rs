//! # Simple logging observer for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [forked] task=fetch id=3 parent=root
//! [completed] task=fetch id=3
//! [race] task=root key=fast reason=fast_path
//! [dispatch] task=on-click key=click policy=latest_only
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use super::Observe;
use crate::events::{Event, EventKind};

/// Stdout logging observer.
///
/// Enabled via the `logging` feature. Not intended for production use; implement
/// [`Observe`] for structured logging or metrics.
pub struct LogWriter;

fn show(v: &Option<std::sync::Arc<str>>) -> &str {
    v.as_deref().unwrap_or("-")
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskForked => println!(
                "[forked] task={} id={:?} parent={}",
                show(&e.task),
                e.task_id,
                show(&e.parent)
            ),
            EventKind::TaskCompleted => {
                println!("[completed] task={} id={:?}", show(&e.task), e.task_id)
            }
            EventKind::TaskFailed => println!(
                "[failed] task={} id={:?} err={}",
                show(&e.task),
                e.task_id,
                show(&e.reason)
            ),
            EventKind::TaskCanceled => {
                println!("[canceled] task={} id={:?}", show(&e.task), e.task_id)
            }
            EventKind::CancelRequested => println!(
                "[cancel] task={} by={}",
                show(&e.task),
                show(&e.parent)
            ),
            EventKind::RaceDecided => println!(
                "[race] task={} key={} reason={}",
                show(&e.task),
                show(&e.key),
                show(&e.reason)
            ),
            EventKind::HandlerDispatched => println!(
                "[dispatch] task={} key={} policy={}",
                show(&e.task),
                show(&e.key),
                show(&e.reason)
            ),
            EventKind::InvariantViolated => println!(
                "[invariant] task={} what={}",
                show(&e.task),
                show(&e.reason)
            ),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
