//! # Drive one forked task to a settled outcome.
//!
//! - **Run the body** of the forked effect with the task's own context
//! - **Race it against the task token**: cancellation drops the body future
//! - **Catch panics** and convert them to [`FlowError::Panicked`]
//! - **Publish exactly one** terminal event
//!
//! ## Event flow
//!
//! ```text
//! Success:       body → Ok(v)             → publish TaskCompleted
//! Failure:       body → Err(e)            → publish TaskFailed
//! Panic:         body panics              → publish TaskFailed (task_panicked)
//! Cancellation:  token cancelled          → body dropped → publish TaskCanceled
//! ```
//!
//! ## Rules
//! - The body future is dropped **before** the outcome is returned, so a settled
//!   handle implies a completed teardown.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::FlowError,
    events::{Bus, Event, EventKind},
    tasks::{Context, Effect, Payload},
};

/// Runs `effect` under `token`, returning its outcome.
pub(crate) async fn drive<V: Payload>(
    effect: Effect<V>,
    cx: Context<V>,
    token: CancellationToken,
) -> Result<V, FlowError> {
    let body = AssertUnwindSafe(effect.run(cx)).catch_unwind();

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(FlowError::Canceled),
        res = body => match res {
            Ok(outcome) => outcome,
            Err(panic_err) => Err(FlowError::Panicked { info: panic_info(&*panic_err) }),
        },
    }
}

/// Publishes the terminal event matching `outcome`.
pub(crate) fn publish_outcome<V>(bus: &Bus, id: u64, name: &str, outcome: &Result<V, FlowError>) {
    let ev = match outcome {
        Ok(_) => Event::new(EventKind::TaskCompleted),
        Err(FlowError::Canceled) => Event::new(EventKind::TaskCanceled),
        Err(e) => Event::new(EventKind::TaskFailed).with_reason(e.to_string()),
    };
    bus.publish(ev.with_task(name).with_task_id(id));
}

fn panic_info(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
