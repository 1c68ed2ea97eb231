//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Effect`] - named, one-shot request run against a [`Context`]
//! - [`Context`] - the running task's view of the engine (primitive operations)
//! - [`Handle`] - reference to a forked task with non-suspending queries
//! - [`Payload`] - bound shared by effect results and channel messages

use std::sync::Arc;

mod context;
mod effect;
mod handle;

pub use context::Context;
pub use effect::{BoxFlow, Effect};
pub use handle::Handle;
pub(crate) use handle::Settler;

/// Values flowing through an engine: effect results and keyed messages.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}

/// Message filter used by the receive primitive.
pub type Predicate<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;
