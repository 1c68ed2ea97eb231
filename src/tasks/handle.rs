//! # Handles to running tasks.
//!
//! A [`Handle`] is a cheap, cloneable reference to a task started by
//! [`Engine::fork`](crate::Engine::fork). It never owns the task; it observes a
//! one-shot settlement slot that the engine fills exactly once:
//!
//! ```text
//! fork ──► Handle (pending) ──► task returns / fails / panics / is cancelled
//!                                      │
//!                                      ▼
//!                              Settler::settle(outcome)   (exactly once)
//!                                      │
//!              is_done() == true ◄─────┴────► result() == Some(outcome)
//! ```
//!
//! Cancellation counts as finished: a cancelled task settles with
//! [`FlowError::Canceled`](crate::FlowError::Canceled).

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::FlowError;
use crate::tasks::Payload;

/// Settlement state: `None` while running, `Some(outcome)` once finished.
type Settled<V> = Option<Result<V, FlowError>>;

struct Inner<V> {
    id: u64,
    name: Arc<str>,
    token: CancellationToken,
    state: watch::Receiver<Settled<V>>,
}

/// Reference to a concurrently-running task.
pub struct Handle<V> {
    inner: Arc<Inner<V>>,
}

/// Write side of a handle, held by the engine. Consumed on settlement.
pub(crate) struct Settler<V> {
    tx: watch::Sender<Settled<V>>,
}

impl<V: Payload> Settler<V> {
    /// Publishes the task outcome. Consuming `self` makes settlement happen once.
    pub(crate) fn settle(self, outcome: Result<V, FlowError>) {
        self.tx.send_replace(Some(outcome));
    }
}

impl<V: Payload> Handle<V> {
    /// Creates a pending handle and its settler.
    pub(crate) fn pending(id: u64, name: Arc<str>, token: CancellationToken) -> (Self, Settler<V>) {
        let (tx, state) = watch::channel(None);
        let handle = Self {
            inner: Arc::new(Inner {
                id,
                name,
                token,
                state,
            }),
        };
        (handle, Settler { tx })
    }

    /// Engine-assigned task id (unique per engine).
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Task name (the forked effect's name).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Non-suspending completion query.
    pub fn is_done(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Non-suspending result query; `None` while the task is still running.
    pub fn result(&self) -> Option<Result<V, FlowError>> {
        self.inner.state.borrow().clone()
    }

    /// Waits until the task has settled and returns its outcome.
    ///
    /// This is the engine-side wait used to implement wait-for-first; combinators
    /// go through [`Context::first`](crate::Context::first) instead.
    /// A task dropped without settling (runtime torn down) reports `Canceled`.
    pub async fn finished(&self) -> Result<V, FlowError> {
        let mut rx = self.inner.state.clone();
        let settled = rx.wait_for(Option::is_some).await.map(|s| (*s).clone());
        match settled {
            Ok(Some(outcome)) => outcome,
            _ => Err(FlowError::Canceled),
        }
    }

    /// Cancellation token of the task.
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.inner.token
    }
}

impl<V> Clone for Handle<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> PartialEq for Handle<V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<V> Eq for Handle<V> {}

impl<V> fmt::Debug for Handle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("done", &self.inner.state.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pending_until_settled() {
        let (h, settler) = Handle::<u32>::pending(1, Arc::from("t"), CancellationToken::new());
        assert!(!h.is_done());
        assert_eq!(h.result(), None);

        settler.settle(Ok(5));
        assert!(h.is_done());
        assert_eq!(h.result(), Some(Ok(5)));
        assert_eq!(h.clone().result(), Some(Ok(5)));
    }

    #[tokio::test]
    async fn finished_wakes_on_settle() {
        let (h, settler) = Handle::<u32>::pending(2, Arc::from("t"), CancellationToken::new());
        let waiter = {
            let h = h.clone();
            tokio::spawn(async move { h.finished().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        settler.settle(Err(FlowError::fail("boom")));

        let outcome = waiter.await.expect("join");
        assert_eq!(outcome, Err(FlowError::fail("boom")));
    }

    #[tokio::test]
    async fn dropped_settler_reads_as_cancelled() {
        let (h, settler) = Handle::<u32>::pending(3, Arc::from("t"), CancellationToken::new());
        drop(settler);
        assert_eq!(h.finished().await, Err(FlowError::Canceled));
        assert!(!h.is_done());
    }

    #[test]
    fn equality_is_identity() {
        let (a, _sa) = Handle::<u32>::pending(4, Arc::from("a"), CancellationToken::new());
        let (b, _sb) = Handle::<u32>::pending(4, Arc::from("a"), CancellationToken::new());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
