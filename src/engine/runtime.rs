//! # TokioEngine: the primitive effect set on tokio.
//!
//! [`TokioEngine`] owns the event bus, the keyed mailbox, the registry of live
//! tasks and the root [`CancellationToken`]. Every task it forks is a tokio task
//! (after an optional eager first poll) whose body is raced against a child token.
//!
//! ## High-level architecture
//! ```text
//! Context::fork(effect)
//!   └─► TokioEngine::fork
//!         ├─► child token = parent.token().child_token()
//!         ├─► publish TaskForked
//!         ├─► runner::drive(effect, cx, token)       (boxed)
//!         │     ├─ eager poll on the issuing task (Config::eager_fork)
//!         │     │     └─ Ready → settle handle, publish terminal event, return
//!         │     └─ Pending → Registry.insert(handle), tokio::spawn(...)
//!         └─► Handle (returned without suspending)
//!
//! Context::cancel(handle)
//!   └─► publish CancelRequested → handle.token().cancel() → await handle settled
//!
//! Context::first(handles)
//!   └─► select_all(handle.finished()...) → (index, value)
//!
//! Context::listen(key, predicate) ──► Inbox (registered now)
//! Context::send(key, v) ──► Mailbox (broadcast) ──► queued in every matching Inbox
//!
//! Event flow:
//!   engine/combinators ── publish(Event) ──► Bus ──► observer_listener ──► ObserverSet
//!
//! Shutdown path:
//!   shutdown()
//!     └─► Bus.publish(ShutdownRequested)
//!     └─► root_token.cancel()   → propagates to every forked task
//!     └─► wait live handles up to cfg.grace:
//!            ├─ Ok (all settled)   → Bus.publish(AllStoppedWithin)
//!            └─ Timeout exceeded   → Bus.publish(GraceExceeded)
//! ```
//!
//! ## Example
//! ```rust
//! use taskweave::{Config, Effect, Node, TokioEngine, fork, join};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = TokioEngine::<u64>::new(Config::default());
//!     let cx = engine.context();
//!
//!     let handles = fork(&cx, Node::ordered([
//!         Node::leaf(Effect::ready("a", 1)),
//!         Node::leaf(Effect::new("b", |_cx| async move { Ok(2) })),
//!     ])).await?;
//!     let values = join(&cx, handles).await?;
//!
//!     assert_eq!(values, Node::ordered([Node::leaf(1), Node::leaf(2)]));
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context as PollContext, Poll};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::{
    Engine, EngineBuilder,
    inbox::{Inbox, Listener},
    mailbox::Mailbox,
    registry::Registry,
    runner,
};
use crate::{
    config::Config,
    error::{FlowError, RuntimeError},
    events::{Bus, Event, EventKind},
    observers::ObserverSet,
    tasks::{Context, Effect, Handle, Payload, Predicate},
};

/// Tokio-backed implementation of the primitive effect set.
pub struct TokioEngine<V> {
    cfg: Config,
    bus: Bus,
    mailbox: Mailbox<V>,
    registry: Arc<Registry<V>>,
    root: CancellationToken,
    listener: CancellationToken,
    next_id: AtomicU64,
}

impl<V: Payload> TokioEngine<V> {
    /// Creates an engine without observers.
    ///
    /// Does not need a running tokio runtime; forking does.
    pub fn new(cfg: Config) -> Arc<Self> {
        EngineBuilder::new(cfg).build()
    }

    /// Returns a builder (use it to attach observers).
    pub fn builder(cfg: Config) -> EngineBuilder<V> {
        EngineBuilder::new(cfg)
    }

    pub(super) fn new_internal(cfg: Config, bus: Bus, observers: Option<Arc<ObserverSet>>) -> Self {
        let engine = Self {
            mailbox: Mailbox::new(cfg.mailbox_capacity_clamped()),
            cfg,
            bus,
            registry: Registry::new(),
            root: CancellationToken::new(),
            listener: CancellationToken::new(),
            next_id: AtomicU64::new(1),
        };
        if let Some(set) = observers {
            engine.observer_listener(set);
        }
        engine
    }

    /// Root context: the parent of every top-level task.
    pub fn context(self: &Arc<Self>) -> Context<V> {
        Context::new(self.clone(), self.root.clone(), "root")
    }

    /// Invokes `effect` on the root context and waits for its outcome.
    pub async fn run<T: Send + 'static>(self: &Arc<Self>, effect: Effect<V, T>) -> Result<T, FlowError> {
        self.context().invoke(effect).await
    }

    /// Forks `effect` from the root context.
    pub fn spawn(self: &Arc<Self>, effect: Effect<V>) -> Handle<V> {
        self.context().fork(effect)
    }

    /// Event bus shared with all tasks.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Engine configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns sorted names of forked tasks that have not settled yet.
    pub fn live_tasks(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Cancels every task and waits up to [`Config::grace`] for all of them to settle.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.root.cancel();

        let live = self.registry.snapshot();
        let done = futures::future::join_all(live.iter().map(Handle::finished));

        match tokio::time::timeout(self.cfg.grace, done).await {
            Ok(_) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    stuck: self.registry.names(),
                })
            }
        }
    }

    /// Subscribes to the bus and forwards events to the observer set (fire-and-forget).
    fn observer_listener(&self, set: Arc<ObserverSet>) {
        let mut rx = self.bus.subscribe();
        let stop = self.listener.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        });
    }

    fn finish(&self, id: u64, name: &str, outcome: Result<V, FlowError>, settler: crate::tasks::Settler<V>) {
        runner::publish_outcome(&self.bus, id, name, &outcome);
        settler.settle(outcome);
    }
}

#[async_trait]
impl<V: Payload> Engine<V> for TokioEngine<V> {
    fn fork(&self, parent: &Context<V>, effect: Effect<V>) -> Handle<V> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name: Arc<str> = Arc::from(effect.name());
        let token = parent.token().child_token();
        let (handle, settler) = Handle::pending(id, name.clone(), token.clone());
        let cx = Context::new(parent.engine().clone(), token.clone(), name.clone());

        self.bus.publish(
            Event::new(EventKind::TaskForked)
                .with_task(name.clone())
                .with_task_id(id)
                .with_parent(parent.task_name()),
        );

        let mut task = runner::drive(effect, cx, token).boxed();
        if self.cfg.eager_fork {
            let mut poll_cx = PollContext::from_waker(futures::task::noop_waker_ref());
            if let Poll::Ready(outcome) = task.as_mut().poll(&mut poll_cx) {
                self.finish(id, &name, outcome, settler);
                return handle;
            }
        }

        self.registry.insert(handle.clone());
        let bus = self.bus.clone();
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            let outcome = task.await;
            registry.remove(id);
            runner::publish_outcome(&bus, id, &name, &outcome);
            settler.settle(outcome);
        });
        handle
    }

    fn send(&self, key: &str, value: V) {
        let delivered = self.mailbox.send(key, value);
        self.bus.publish(
            Event::new(EventKind::MessageSent)
                .with_key(key)
                .with_index(delivered),
        );
    }

    fn listen(&self, cx: &Context<V>, key: &str, predicate: Option<Predicate<V>>) -> Inbox<V> {
        Listener {
            rx: self.mailbox.subscribe(),
            bus: self.bus.clone(),
            key: Arc::from(key),
            predicate,
            task: Arc::from(cx.task_name()),
        }
        .into_inbox()
    }

    async fn first(&self, cx: &Context<V>, handles: &[Handle<V>]) -> Result<(usize, V), FlowError> {
        if handles.is_empty() {
            return Err(FlowError::invariant("first over an empty handle set"));
        }
        self.bus.publish(
            Event::new(EventKind::FirstRequested)
                .with_task(cx.task_name())
                .with_index(handles.len()),
        );

        let waits = handles.iter().map(|h| h.finished().boxed());
        let (outcome, index, _rest) = futures::future::select_all(waits).await;

        self.bus.publish(
            Event::new(EventKind::FirstResolved)
                .with_task(cx.task_name())
                .with_index(index),
        );
        outcome.map(|value| (index, value))
    }

    async fn cancel(&self, cx: &Context<V>, handle: &Handle<V>) {
        self.bus.publish(
            Event::new(EventKind::CancelRequested)
                .with_task(handle.name())
                .with_task_id(handle.id())
                .with_parent(cx.task_name()),
        );
        handle.token().cancel();
        let _ = handle.finished().await;
    }

    fn publish(&self, event: Event) {
        self.bus.publish(event);
    }
}

impl<V> Drop for TokioEngine<V> {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}
