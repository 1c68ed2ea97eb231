//! # Keyed message channel behind send/receive.
//!
//! A single [`tokio::sync::broadcast`] ring buffer carries `(key, value)` pairs.
//! Each [`Inbox`](super::Inbox) holds its own subscription and filters by key and
//! predicate.
//!
//! ## Rules
//! - **Non-blocking send**: `send()` never blocks.
//! - **Registered listeners only**: a message reaches the inboxes that exist at
//!   send time and stays queued in each until read; nothing is stored for
//!   inboxes created later.
//! - **Lag handling**: a receiver that falls behind skips the oldest messages.

use std::sync::Arc;

use tokio::sync::broadcast;

/// One message on a keyed channel.
#[derive(Clone, Debug)]
pub(crate) struct Message<V> {
    pub key: Arc<str>,
    pub value: V,
}

/// Broadcast mailbox shared by all keys.
#[derive(Clone, Debug)]
pub(crate) struct Mailbox<V> {
    tx: broadcast::Sender<Message<V>>,
}

impl<V: Clone> Mailbox<V> {
    /// Creates a mailbox with the given ring buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends `value` on `key`; returns the number of receivers that got it.
    pub fn send(&self, key: &str, value: V) -> usize {
        self.tx
            .send(Message {
                key: Arc::from(key),
                value,
            })
            .unwrap_or(0)
    }

    /// Registers a receiver for messages sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Message<V>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_registered_receivers_only() {
        let mailbox = Mailbox::<u32>::new(4);
        assert_eq!(mailbox.send("k", 1), 0);

        let mut rx = mailbox.subscribe();
        assert_eq!(mailbox.send("k", 2), 1);

        let msg = rx.recv().await.expect("message");
        assert_eq!(&*msg.key, "k");
        assert_eq!(msg.value, 2);
    }
}
