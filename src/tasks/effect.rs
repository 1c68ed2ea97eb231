//! # Effects: opaque, named, one-shot requests.
//!
//! [`Effect`] wraps a closure `FnOnce(Context<V>) -> Fut`, producing the future only
//! when the effect is run. Combinators never look inside an effect; they either run
//! it inside the current task ([`Context::invoke`]) or hand it to the engine as the
//! body of a new task ([`Context::fork`]).
//!
//! ## Example
//! ```rust
//! use taskweave::{Effect, FlowError};
//!
//! let fetch: Effect<u64> = Effect::new("fetch", |cx| async move {
//!     if cx.is_cancelled() {
//!         return Err(FlowError::Canceled);
//!     }
//!     Ok(42)
//! });
//! assert_eq!(fetch.name(), "fetch");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::FlowError;
use crate::tasks::{Context, Handle, Payload, Predicate};

/// Boxed, `Send` future resolving to a combinator or effect outcome.
pub type BoxFlow<T> = BoxFuture<'static, Result<T, FlowError>>;

type Body<V, T> = Box<dyn FnOnce(Context<V>) -> BoxFlow<T> + Send>;

/// A lazily-run request producing `T` inside an engine carrying payload `V`.
///
/// `T` defaults to `V`, the only output type the engine can fork.
pub struct Effect<V, T = V> {
    name: Cow<'static, str>,
    body: Body<V, T>,
}

impl<V: Payload, T: Send + 'static> Effect<V, T> {
    /// Creates an effect from a closure that builds its future on demand.
    pub fn new<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnOnce(Context<V>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FlowError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(move |cx| f(cx).boxed()),
        }
    }

    /// An effect that resolves to `value` without suspending.
    pub fn ready(name: impl Into<Cow<'static, str>>, value: T) -> Self {
        Self::new(name, move |_cx| async move { Ok(value) })
    }

    /// An effect that fails with `error` without suspending.
    pub fn fail(name: impl Into<Cow<'static, str>>, error: FlowError) -> Self {
        Self::new(name, move |_cx| async move { Err(error) })
    }

    /// Returns the effect name (used as the task name when forked).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the effect's future for the given context.
    pub(crate) fn run(self, cx: Context<V>) -> BoxFlow<T> {
        (self.body)(cx)
    }
}

impl<V: Payload> Effect<V, V> {
    /// Receive primitive as an effect: resolves to the next message on `key`
    /// accepted by `predicate`.
    pub fn receive(key: impl Into<String>, predicate: Option<Predicate<V>>) -> Self {
        let key = key.into();
        Self::new(format!("receive({key})"), move |cx| async move {
            cx.receive(&key, predicate.as_ref()).await
        })
    }

    /// Send primitive as an effect: delivers `value` on `key` and resolves to it.
    pub fn send(key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        Self::new(format!("send({key})"), move |cx| async move {
            cx.send(&key, value.clone());
            Ok(value)
        })
    }

    /// Resolves to the outcome of `handle` (see [`join_one`](crate::join_one)).
    pub fn join(handle: Handle<V>) -> Self {
        Self::new(format!("join({})", handle.name()), move |cx| async move {
            crate::combinators::join_one(&cx, &handle).await
        })
    }
}

impl<V, T> fmt::Debug for Effect<V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("name", &self.name).finish()
    }
}
