//! Instrumented engine for unit tests.
//!
//! [`Recorder`] wraps a [`TokioEngine`] and appends one line per primitive request to
//! a shared log (`fork:<name>`, `cancel:<name>`, `first:<n>`). Test effects can add
//! their own lines with [`Recorder::note`], so the log shows the exact interleaving
//! of engine requests and task bodies.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::{Engine, Inbox, TokioEngine};
use crate::error::FlowError;
use crate::events::{Bus, Event};
use crate::tasks::{Context, Effect, Handle, Payload, Predicate};

pub(crate) struct Recorder<V> {
    inner: Arc<TokioEngine<V>>,
    log: Mutex<Vec<String>>,
    firsts: AtomicUsize,
    rigged_first: Option<usize>,
}

impl<V: Payload> Recorder<V> {
    pub fn new() -> Arc<Self> {
        Self::build(None)
    }

    /// Reports `index` from every First, whatever actually finished.
    pub fn rigged(index: usize) -> Arc<Self> {
        Self::build(Some(index))
    }

    fn build(rigged_first: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            inner: TokioEngine::new(Config::default()),
            log: Mutex::new(Vec::new()),
            firsts: AtomicUsize::new(0),
            rigged_first,
        })
    }

    pub fn context(self: &Arc<Self>) -> Context<V> {
        Context::new(self.clone(), CancellationToken::new(), "root")
    }

    pub fn note(&self, line: impl Into<String>) {
        self.log.lock().push(line.into());
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn firsts(&self) -> usize {
        self.firsts.load(Ordering::SeqCst)
    }

    pub fn bus(&self) -> &Bus {
        self.inner.bus()
    }
}

#[async_trait]
impl<V: Payload> Engine<V> for Recorder<V> {
    fn fork(&self, parent: &Context<V>, effect: Effect<V>) -> Handle<V> {
        self.note(format!("fork:{}", effect.name()));
        self.inner.fork(parent, effect)
    }

    fn send(&self, key: &str, value: V) {
        self.inner.send(key, value);
    }

    fn listen(&self, cx: &Context<V>, key: &str, predicate: Option<Predicate<V>>) -> Inbox<V> {
        self.inner.listen(cx, key, predicate)
    }

    async fn first(&self, cx: &Context<V>, handles: &[Handle<V>]) -> Result<(usize, V), FlowError> {
        self.firsts.fetch_add(1, Ordering::SeqCst);
        self.note(format!("first:{}", handles.len()));
        let (index, value) = self.inner.first(cx, handles).await?;
        Ok((self.rigged_first.unwrap_or(index), value))
    }

    async fn cancel(&self, cx: &Context<V>, handle: &Handle<V>) {
        self.note(format!("cancel:{}", handle.name()));
        self.inner.cancel(cx, handle).await;
    }

    fn publish(&self, event: Event) {
        self.inner.publish(event);
    }
}
