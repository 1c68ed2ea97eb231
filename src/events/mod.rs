//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/observe runtime events emitted by the engine, forked tasks and the
//! combinators.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `TokioEngine` (fork/cancel/send/receive/first/shutdown),
//!   `Context::invoke`, `race`, `join_one`, `subscribe`, `ObserverSet` workers.
//! - **Consumers**: `TokioEngine::observer_listener()` fans out to `ObserverSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
