//! # Race: first competitor to finish wins.
//!
//! ```text
//! competitors: Ordered[e0, e1, ..] or Keyed{k0: e0, ..}   (leaf effects only)
//!
//! for (key, e) in competitors:
//!     h = fork(e)
//!     h already finished? ──► return (key, value)          reason=fast_path
//! first(live handles) ──► (i, v) ──► return (key_i, v)     reason=first
//! ```
//!
//! ## Rules
//! - A top-level leaf, a nested composite competitor or an empty competitor set is
//!   an invariant violation.
//! - A winner that finished with a failure propagates that failure.
//! - **Losers are not cancelled**; see [`race`].

use futures::FutureExt;

use super::{fork_request, violation};
use crate::events::{Event, EventKind};
use crate::tasks::{BoxFlow, Context, Effect, Handle, Payload};
use crate::tree::{Key, Node};
use crate::Descriptor;

/// Forks every competitor in order and returns the key and value of the first one
/// to finish.
///
/// If a competitor has already finished right after its fork (it completed without
/// suspending), it wins immediately and the remaining competitors are **not even
/// forked**.
///
/// # Losers keep running
///
/// The competitors that did not win are **not cancelled**: they run to completion in
/// the background and their results are discarded. Cancel them explicitly (for
/// example by racing inside a forked task and cancelling that task) if they must stop.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use taskweave::{Config, Effect, Key, Node, TokioEngine, race};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskweave::FlowError> {
/// let engine = TokioEngine::<&'static str>::new(Config::default());
/// let cx = engine.context();
///
/// let (key, value) = race(&cx, Node::keyed([
///     ("slow", Node::leaf(Effect::new("slow", |_cx| async move {
///         tokio::time::sleep(Duration::from_secs(1)).await;
///         Ok("tortoise")
///     }))),
///     ("fast", Node::leaf(Effect::ready("fast", "hare"))),
/// ])).await?;
///
/// assert_eq!((key, value), (Key::from("fast"), "hare"));
/// # Ok(())
/// # }
/// ```
pub fn race<V: Payload>(cx: &Context<V>, competitors: Descriptor<V>) -> BoxFlow<(Key, V)> {
    let cx = cx.clone();
    async move {
        let entries = match competitor_entries(competitors) {
            Ok(entries) => entries,
            Err(what) => return Err(violation(&cx, what)),
        };

        let mut live: Vec<(Key, Handle<V>)> = Vec::with_capacity(entries.len());
        for (key, effect) in entries {
            let handle = cx.invoke(fork_request(effect)).await?;
            if let Some(outcome) = handle.result() {
                let value = outcome?;
                decided(&cx, &key, "fast_path");
                return Ok((key, value));
            }
            live.push((key, handle));
        }

        let handles: Vec<Handle<V>> = live.iter().map(|(_, h)| h.clone()).collect();
        let (index, value) = cx.first(&handles).await?;
        let Some((key, _)) = live.into_iter().nth(index) else {
            return Err(violation(
                &cx,
                format!("first over {} handles reported index {index}", handles.len()),
            ));
        };
        decided(&cx, &key, "first");
        Ok((key, value))
    }
    .boxed()
}

fn competitor_entries<V: Payload>(competitors: Descriptor<V>) -> Result<Vec<(Key, Effect<V>)>, String> {
    let children: Vec<(Key, Descriptor<V>)> = match competitors {
        Node::Leaf(effect) => {
            return Err(format!(
                "race over the single effect `{}`; competitors must be a sequence or a mapping",
                effect.name()
            ));
        }
        Node::Ordered(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, node)| (Key::Index(i), node))
            .collect(),
        Node::Keyed(entries) => entries
            .into_iter()
            .map(|(k, node)| (Key::Name(k), node))
            .collect(),
    };
    if children.is_empty() {
        return Err("race over an empty competitor set".to_string());
    }

    children
        .into_iter()
        .map(|(key, node)| match node.into_leaf() {
            Some(effect) => Ok((key, effect)),
            None => Err(format!("race competitor {key} is not a single effect")),
        })
        .collect()
}

fn decided<V: Payload>(cx: &Context<V>, key: &Key, reason: &'static str) {
    cx.publish(
        Event::new(EventKind::RaceDecided)
            .with_task(cx.task_name())
            .with_key(key.to_string())
            .with_reason(reason),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use crate::testing::Recorder;
    use std::sync::Arc;
    use std::time::Duration;

    fn after(rec: &Arc<Recorder<u32>>, name: &'static str, ms: u64, value: u32) -> Node<Effect<u32>> {
        let rec = rec.clone();
        Node::leaf(Effect::new(name, move |_cx| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            rec.note(format!("done:{name}"));
            Ok(value)
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn synchronous_competitor_wins_without_first() {
        let rec = Recorder::<u32>::new();
        let cx = rec.context();

        let out = race(
            &cx,
            Node::ordered([after(&rec, "slow", 1_000, 1), Node::leaf(Effect::ready("fast", 2))]),
        )
        .await;

        assert_eq!(out, Ok((Key::Index(1), 2)));
        assert_eq!(rec.firsts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_finisher_wins_and_loser_keeps_running() {
        let rec = Recorder::<u32>::new();
        let cx = rec.context();

        let out = race(
            &cx,
            Node::ordered([after(&rec, "a", 10, 1), after(&rec, "b", 30, 2)]),
        )
        .await;

        assert_eq!(out, Ok((Key::Index(0), 1)));
        assert_eq!(rec.firsts(), 1);
        assert!(!rec.log().contains(&"cancel:b".to_string()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rec.log().contains(&"done:b".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn keyed_race_reports_the_winning_name() {
        let rec = Recorder::<u32>::new();
        let cx = rec.context();

        let out = race(
            &cx,
            Node::keyed([("primary", after(&rec, "p", 50, 1)), ("replica", after(&rec, "r", 5, 2))]),
        )
        .await;

        assert_eq!(out, Ok((Key::from("replica"), 2)));
    }

    #[tokio::test]
    async fn failed_fast_winner_propagates() {
        let rec = Recorder::<u32>::new();
        let cx = rec.context();

        let out = race(
            &cx,
            Node::ordered([Node::leaf(Effect::fail("broken", FlowError::fail("nope")))]),
        )
        .await;
        assert_eq!(out, Err(FlowError::fail("nope")));
    }

    #[tokio::test]
    async fn malformed_competitors_are_invariant_violations() {
        let rec = Recorder::<u32>::new();
        let cx = rec.context();

        let empty = race(&cx, Node::ordered([])).await.unwrap_err();
        assert!(empty.is_invariant());

        let single = race(&cx, Node::leaf(Effect::ready("solo", 1))).await.unwrap_err();
        assert!(single.is_invariant());

        let nested = race(
            &cx,
            Node::ordered([Node::ordered([Node::leaf(Effect::ready("deep", 1))])]),
        )
        .await
        .unwrap_err();
        assert!(nested.is_invariant());
        assert!(rec.log().is_empty(), "nothing may be forked");
    }
}
