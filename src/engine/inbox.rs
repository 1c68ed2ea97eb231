//! # Persistent receive registration.
//!
//! An [`Inbox`] is the result of [`Engine::listen`](crate::Engine::listen): a
//! receiver for one key that is registered at creation time and stays registered
//! until dropped. Messages sent while its owner is busy are queued, not lost.
//!
//! ```text
//! listen(key, predicate) ──► Inbox (registered now)
//!   send(key, m1) ─┐
//!   send(key, m2) ─┼─► queued in the mailbox ring for this inbox
//!                  ▼
//!   inbox.next() ──► m1, inbox.next() ──► m2
//! ```
//!
//! One-shot receive is `listen(..)` followed by a single `next()`.

use std::fmt;
use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use futures::FutureExt;
use tokio::sync::broadcast::{self, error::RecvError};

use super::mailbox::Message;
use crate::error::FlowError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::Predicate;

/// Queue of messages on one key, in send order.
pub struct Inbox<V> {
    key: Arc<str>,
    stream: BoxStream<'static, Result<V, FlowError>>,
}

impl<V: Send + 'static> Inbox<V> {
    /// Wraps a stream of messages already filtered to `key`.
    ///
    /// The stream ending means the mailbox is gone; [`Inbox::next`] reports that
    /// as cancellation.
    pub fn new(key: impl Into<Arc<str>>, stream: BoxStream<'static, Result<V, FlowError>>) -> Self {
        Self {
            key: key.into(),
            stream,
        }
    }

    /// Key this inbox listens on.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the next queued message.
    pub async fn next(&mut self) -> Result<V, FlowError> {
        self.stream.next().await.unwrap_or(Err(FlowError::Canceled))
    }

    /// Drops every message that is already queued; returns how many were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while let Some(Some(_)) = self.stream.next().now_or_never() {
            dropped += 1;
        }
        dropped
    }
}

impl<V> fmt::Debug for Inbox<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Mailbox subscription filtered by key and predicate.
pub(crate) struct Listener<V> {
    pub rx: broadcast::Receiver<Message<V>>,
    pub bus: Bus,
    pub key: Arc<str>,
    pub predicate: Option<Predicate<V>>,
    pub task: Arc<str>,
}

impl<V: Clone + Send + 'static> Listener<V> {
    /// Turns the subscription into an [`Inbox`].
    pub fn into_inbox(self) -> Inbox<V> {
        let key = self.key.clone();
        let stream = futures::stream::unfold(self, |mut listener| async move {
            let value = listener.next_match().await?;
            Some((Ok(value), listener))
        });
        Inbox::new(key, stream.boxed())
    }

    async fn next_match(&mut self) -> Option<V> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => {
                    if msg.key != self.key {
                        continue;
                    }
                    if self.predicate.as_ref().is_some_and(|accept| !accept(&msg.value)) {
                        continue;
                    }
                    self.bus.publish(
                        Event::new(EventKind::MessageReceived)
                            .with_key(self.key.clone())
                            .with_task(self.task.clone()),
                    );
                    return Some(msg.value);
                }
                Err(RecvError::Lagged(skipped)) => {
                    self.bus.publish(
                        Event::new(EventKind::MailboxLagged)
                            .with_task(self.task.clone())
                            .with_key(self.key.clone())
                            .with_reason(format!("skipped={skipped}")),
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mailbox::Mailbox;

    fn listener(mailbox: &Mailbox<u32>, bus: &Bus, predicate: Option<Predicate<u32>>) -> Inbox<u32> {
        Listener {
            rx: mailbox.subscribe(),
            bus: bus.clone(),
            key: Arc::from("k"),
            predicate,
            task: Arc::from("t"),
        }
        .into_inbox()
    }

    #[tokio::test]
    async fn queues_messages_sent_before_next() {
        let mailbox = Mailbox::<u32>::new(8);
        let bus = Bus::new(8);
        let mut inbox = listener(&mailbox, &bus, None);

        mailbox.send("k", 1);
        mailbox.send("other", 9);
        mailbox.send("k", 2);

        assert_eq!(inbox.key(), "k");
        assert_eq!(inbox.next().await, Ok(1));
        assert_eq!(inbox.next().await, Ok(2));
    }

    #[tokio::test]
    async fn discard_pending_drops_only_queued_messages() {
        let mailbox = Mailbox::<u32>::new(8);
        let bus = Bus::new(8);
        let accept_odd: Predicate<u32> = Arc::new(|v: &u32| v % 2 == 1);
        let mut inbox = listener(&mailbox, &bus, Some(accept_odd));

        mailbox.send("k", 1);
        mailbox.send("k", 2);
        mailbox.send("k", 3);
        assert_eq!(inbox.discard_pending(), 2);

        mailbox.send("k", 5);
        assert_eq!(inbox.next().await, Ok(5));
    }

    #[tokio::test]
    async fn closed_mailbox_reads_as_cancellation() {
        let mailbox = Mailbox::<u32>::new(8);
        let bus = Bus::new(8);
        let mut inbox = listener(&mailbox, &bus, None);

        drop(mailbox);
        assert_eq!(inbox.next().await, Err(FlowError::Canceled));
    }
}
