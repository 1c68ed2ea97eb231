//! # Join: resolve handles to their values.
//!
//! ```text
//! join_one(h):
//!   h.result() is Some(outcome) ──► outcome                 (no suspension, no First)
//!   otherwise                   ──► first([h]) ──► (0, v) ──► v
//!                                               └► (i≠0, _) ──► FlowError::Invariant
//!
//! join(Node<Handle>):
//!   Leaf(h)   ──► join_one(h)
//!   composite ──► map each h to Effect::join(h) ──► sequence
//! ```

use std::slice;

use futures::FutureExt;

use super::{sequence, violation};
use crate::error::FlowError;
use crate::tasks::{BoxFlow, Context, Effect, Handle, Payload};
use crate::tree::Node;
use crate::HandleTree;

/// Waits for every handle of the tree and returns the values in the same shape.
///
/// Handles are awaited in left-to-right / insertion order; the first failed task
/// aborts the join and its failure propagates unchanged.
pub fn join<V: Payload>(cx: &Context<V>, handles: HandleTree<V>) -> BoxFlow<Node<V>> {
    match handles {
        Node::Leaf(handle) => {
            let cx = cx.clone();
            async move { join_one(&cx, &handle).await.map(Node::Leaf) }.boxed()
        }
        composite => sequence(cx, composite.map(Effect::join)),
    }
}

/// Resolves a single handle.
///
/// Returns immediately when the task has already settled; otherwise waits through
/// exactly one First over the singleton `[handle]`.
pub async fn join_one<V: Payload>(cx: &Context<V>, handle: &Handle<V>) -> Result<V, FlowError> {
    if let Some(outcome) = handle.result() {
        return outcome;
    }
    let (index, value) = cx.first(slice::from_ref(handle)).await?;
    if index != 0 {
        return Err(violation(
            cx,
            format!("first over a single handle reported index {index}"),
        ));
    }
    Ok(value)
}
