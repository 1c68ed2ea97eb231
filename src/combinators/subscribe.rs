//! # Subscribe: background dispatch of keyed messages to a handler.
//!
//! [`subscribe`] registers an [`Inbox`] for the key, then forks one long-lived task
//! that owns it and loops forever:
//!
//! ```text
//! inbox = listen(key, predicate)              (before subscribe returns)
//! loop:
//!   msg = inbox.next()                        (queued while the loop was busy)
//!   publish HandlerDispatched
//!   match policy:
//!     Every       ──► fork(handler(msg))                        (runs may overlap)
//!     LeadingOnly ──► invoke(handler(msg)) and wait, then discard
//!                     everything queued meanwhile               (never overlaps)
//!     LatestOnly  ──► cancel(previous) if running, then fork(handler(msg))
//! ```
//!
//! Messages sent back to back are all seen by the loop: `Every` handles each one and
//! `LatestOnly` ends with the handler for the newest.
//!
//! The loop only ends when its task is cancelled, when a leading-only handler fails,
//! or when receiving fails.

use std::fmt;
use std::sync::Arc;

use super::violation;
use crate::error::FlowError;
use crate::engine::Inbox;
use crate::events::{Event, EventKind};
use crate::policies::DispatchPolicy;
use crate::tasks::{Context, Effect, Handle, Payload, Predicate};

/// Builds the effect run for one received message.
pub type Handler<V> = Arc<dyn Fn(V) -> Effect<V> + Send + Sync>;

/// Configuration of a subscription.
///
/// ## Example
/// ```rust
/// use taskweave::{DispatchPolicy, Effect, SubscribeSpec};
///
/// let spec = SubscribeSpec::new("search", |query: String| {
///     Effect::new("lookup", move |_cx| async move { Ok(query.to_uppercase()) })
/// })
/// .with_predicate(|q: &String| !q.is_empty())
/// .latest_only(true);
///
/// assert_eq!(spec.policy(), Ok(DispatchPolicy::LatestOnly));
/// assert!(spec.clone().leading_only(true).policy().is_err());
/// ```
pub struct SubscribeSpec<V> {
    key: String,
    predicate: Option<Predicate<V>>,
    handler: Handler<V>,
    leading_only: bool,
    latest_only: bool,
}

impl<V: Payload> SubscribeSpec<V> {
    /// Subscribes `handler` to messages sent on `key`.
    pub fn new<F>(key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(V) -> Effect<V> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            predicate: None,
            handler: Arc::new(handler),
            leading_only: false,
            latest_only: false,
        }
    }

    /// Only dispatches messages accepted by `predicate`.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Handles one message at a time and ignores messages that arrive meanwhile.
    pub fn leading_only(mut self, on: bool) -> Self {
        self.leading_only = on;
        self
    }

    /// Cancels the running handler whenever a newer message arrives.
    pub fn latest_only(mut self, on: bool) -> Self {
        self.latest_only = on;
        self
    }

    /// Subscribed message key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolves the flags into a dispatch policy.
    ///
    /// Setting both `leading_only` and `latest_only` is an invariant violation.
    pub fn policy(&self) -> Result<DispatchPolicy, FlowError> {
        match (self.leading_only, self.latest_only) {
            (true, true) => Err(FlowError::invariant(format!(
                "subscription on `{}` sets both leading_only and latest_only",
                self.key
            ))),
            (true, false) => Ok(DispatchPolicy::LeadingOnly),
            (false, true) => Ok(DispatchPolicy::LatestOnly),
            (false, false) => Ok(DispatchPolicy::Every),
        }
    }
}

impl<V> Clone for SubscribeSpec<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            predicate: self.predicate.clone(),
            handler: Arc::clone(&self.handler),
            leading_only: self.leading_only,
            latest_only: self.latest_only,
        }
    }
}

impl<V> fmt::Debug for SubscribeSpec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeSpec")
            .field("key", &self.key)
            .field("filtered", &self.predicate.is_some())
            .field("leading_only", &self.leading_only)
            .field("latest_only", &self.latest_only)
            .finish()
    }
}

/// Forks the subscription loop and returns its handle.
///
/// Messages on the key are queued for the loop from the moment this returns. The
/// loop runs until the handle is cancelled. Fails without forking anything when
/// both exclusive flags are set.
pub fn subscribe<V: Payload>(cx: &Context<V>, spec: SubscribeSpec<V>) -> Result<Handle<V>, FlowError> {
    let policy = match spec.policy() {
        Ok(policy) => policy,
        Err(FlowError::Invariant { what }) => return Err(violation(cx, what)),
        Err(err) => return Err(err),
    };
    let inbox = cx.listen(&spec.key, spec.predicate.clone());
    let name = format!("subscribe({})", spec.key);
    Ok(cx.fork(Effect::new(name, move |cx| dispatch_loop(cx, spec, inbox, policy))))
}

async fn dispatch_loop<V: Payload>(
    cx: Context<V>,
    spec: SubscribeSpec<V>,
    mut inbox: Inbox<V>,
    policy: DispatchPolicy,
) -> Result<V, FlowError> {
    let mut latest: Option<Handle<V>> = None;
    loop {
        let message = inbox.next().await?;
        cx.publish(
            Event::new(EventKind::HandlerDispatched)
                .with_task(cx.task_name())
                .with_key(spec.key.as_str())
                .with_reason(policy.as_label()),
        );
        let effect = (spec.handler)(message);

        match policy {
            DispatchPolicy::Every => {
                cx.fork(effect);
            }
            DispatchPolicy::LeadingOnly => {
                cx.invoke(effect).await?;
                inbox.discard_pending();
            }
            DispatchPolicy::LatestOnly => {
                if let Some(previous) = latest.take() {
                    if !previous.is_done() {
                        cx.cancel(&previous).await;
                    }
                }
                latest = Some(cx.fork(effect));
            }
        }
    }
}
