//! # Sequential composer.
//!
//! Resolves a descriptor tree strictly in order, inside the calling task:
//!
//! ```text
//! Leaf(e)          → invoke(e)                        → Leaf(v)
//! Ordered[a, b, c] → resolve a; then b; then c         → Ordered[va, vb, vc]
//! Keyed{k1: a, ..} → resolve entries in insertion order → Keyed{k1: va, ..}
//! ```
//!
//! ## Rules
//! - Element `i + 1` is not started before element `i` (and everything nested in it)
//!   has resolved.
//! - The first failure aborts the remaining elements and propagates unchanged.
//! - The result has exactly the shape of the descriptor.

use futures::FutureExt;
use indexmap::IndexMap;

use crate::tasks::{BoxFlow, Context, Payload};
use crate::tree::Node;
use crate::Descriptor;

/// Resolves every effect of `descriptor` one after the other and returns the values
/// in the same shape.
///
/// ## Example
/// ```rust
/// use taskweave::{Config, Effect, Node, TokioEngine, sequence};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskweave::FlowError> {
/// let engine = TokioEngine::<&'static str>::new(Config::default());
/// let cx = engine.context();
///
/// let out = sequence(&cx, Node::keyed([
///     ("user", Node::leaf(Effect::ready("load-user", "ada"))),
///     ("role", Node::leaf(Effect::ready("load-role", "admin"))),
/// ])).await?;
///
/// assert_eq!(out, Node::keyed([("user", Node::leaf("ada")), ("role", Node::leaf("admin"))]));
/// # Ok(())
/// # }
/// ```
pub fn sequence<V, T>(cx: &Context<V>, descriptor: Descriptor<V, T>) -> BoxFlow<Node<T>>
where
    V: Payload,
    T: Send + 'static,
{
    resolve(cx.clone(), descriptor)
}

fn resolve<V, T>(cx: Context<V>, node: Descriptor<V, T>) -> BoxFlow<Node<T>>
where
    V: Payload,
    T: Send + 'static,
{
    async move {
        match node {
            Node::Leaf(effect) => cx.invoke(effect).await.map(Node::Leaf),
            Node::Ordered(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(resolve(cx.clone(), item).await?);
                }
                Ok(Node::Ordered(out))
            }
            Node::Keyed(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    let value = resolve(cx.clone(), item).await?;
                    out.insert(key, value);
                }
                Ok(Node::Keyed(out))
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use crate::tasks::Effect;
    use crate::testing::Recorder;
    use std::sync::Arc;
    use std::time::Duration;

    fn step(rec: &Arc<Recorder<usize>>, i: usize) -> Node<Effect<usize>> {
        let rec = rec.clone();
        Node::leaf(Effect::new(format!("step{i}"), move |_cx| async move {
            rec.note(format!("start:{i}"));
            tokio::time::sleep(Duration::from_millis(1)).await;
            rec.note(format!("end:{i}"));
            Ok(i)
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn ordered_runs_strictly_in_order() {
        let rec = Recorder::<usize>::new();
        let cx = rec.context();

        let out = sequence(&cx, Node::ordered((0..4).map(|i| step(&rec, i))))
            .await
            .expect("sequence");

        assert_eq!(out, Node::ordered((0..4).map(Node::leaf)));
        let expected: Vec<String> = (0..4)
            .flat_map(|i| [format!("start:{i}"), format!("end:{i}")])
            .collect();
        assert_eq!(rec.log(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn nested_composites_finish_before_next_sibling() {
        let rec = Recorder::<usize>::new();
        let cx = rec.context();

        let tree = Node::ordered([
            Node::ordered([step(&rec, 0), step(&rec, 1)]),
            step(&rec, 2),
        ]);
        let out = sequence(&cx, tree).await.expect("sequence");

        assert_eq!(
            out,
            Node::ordered([
                Node::ordered([Node::leaf(0), Node::leaf(1)]),
                Node::leaf(2)
            ])
        );
        assert_eq!(
            rec.log(),
            vec!["start:0", "end:0", "start:1", "end:1", "start:2", "end:2"]
        );
    }

    #[tokio::test]
    async fn keyed_keeps_keys_and_order() {
        let rec = Recorder::<usize>::new();
        let cx = rec.context();

        let tree = Node::keyed([
            ("zeta", Node::leaf(Effect::ready("z", 1))),
            ("alpha", Node::leaf(Effect::ready("a", 2))),
            ("mid", Node::ordered([Node::leaf(Effect::ready("m", 3))])),
        ]);
        let out = sequence(&cx, tree).await.expect("sequence");

        assert_eq!(
            out,
            Node::keyed([
                ("zeta", Node::leaf(1)),
                ("alpha", Node::leaf(2)),
                ("mid", Node::ordered([Node::leaf(3)])),
            ])
        );
        let Node::Keyed(map) = out else {
            panic!("expected a mapping");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_aborts_the_rest() {
        let rec = Recorder::<usize>::new();
        let cx = rec.context();

        let tree = Node::ordered([
            step(&rec, 0),
            Node::leaf(Effect::fail("broken", FlowError::fail("nope"))),
            step(&rec, 2),
        ]);
        let err = sequence(&cx, tree).await.unwrap_err();

        assert_eq!(err, FlowError::fail("nope"));
        assert_eq!(rec.log(), vec!["start:0", "end:0"]);
    }

    #[tokio::test]
    async fn nothing_runs_until_awaited() {
        let rec = Recorder::<usize>::new();
        let cx = rec.context();

        let pending = sequence(&cx, step(&rec, 0));
        assert!(rec.log().is_empty());
        assert_eq!(pending.await, Ok(Node::leaf(0)));
        assert_eq!(rec.log(), vec!["start:0", "end:0"]);
    }
}
