//! # Fork: start every effect of a tree as its own task.
//!
//! Each leaf effect `e` becomes a fork request whose task body simply invokes `e`.
//! The requests are issued through [`sequence`], so tasks are forked in
//! left-to-right / insertion order, but Fork never suspends the issuer: all of them
//! run concurrently with each other and with the caller.

use super::sequence;
use crate::tasks::{BoxFlow, Context, Effect, Handle, Payload};
use crate::{Descriptor, HandleTree};

/// Forks every leaf effect and returns the handles, unjoined, in the same shape.
///
/// ## Example
/// ```rust
/// use taskweave::{Config, Effect, Node, TokioEngine, fork, join};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskweave::FlowError> {
/// let engine = TokioEngine::<u32>::new(Config::default());
/// let cx = engine.context();
///
/// let handles = fork(&cx, Node::keyed([
///     ("a", Node::ordered([Node::leaf(Effect::ready("a0", 1)), Node::leaf(Effect::ready("a1", 2))])),
///     ("b", Node::leaf(Effect::ready("b", 3))),
/// ])).await?;
/// assert!(handles.leaves().iter().all(|h| h.is_done()));
///
/// let values = join(&cx, handles).await?;
/// assert_eq!(values.leaves(), vec![&1, &2, &3]);
/// # Ok(())
/// # }
/// ```
pub fn fork<V: Payload>(cx: &Context<V>, descriptor: Descriptor<V>) -> BoxFlow<HandleTree<V>> {
    sequence(cx, descriptor.map(fork_request))
}

/// Wraps `effect` into a request that forks a pass-through task running it.
pub(crate) fn fork_request<V: Payload>(effect: Effect<V>) -> Effect<V, Handle<V>> {
    let task = effect.name().to_string();
    Effect::new(format!("fork({task})"), move |cx: Context<V>| async move {
        let body = Effect::new(task, move |inner: Context<V>| async move { inner.invoke(effect).await });
        Ok(cx.fork(body))
    })
}
