use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskweave::{
    Config, Descriptor, Effect, Event, EventKind, FlowError, HandleTree, Key, Node, Observe,
    SubscribeSpec, TokioEngine, fork, join, race, sequence, subscribe,
};

#[derive(Default)]
struct Collect(Mutex<Vec<Event>>);

#[async_trait]
impl Observe for Collect {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

impl Collect {
    fn kinds(&self) -> Vec<EventKind> {
        self.0.lock().iter().map(|e| e.kind).collect()
    }
}

fn after(name: &'static str, ms: u64, value: u32) -> Descriptor<u32> {
    Node::leaf(Effect::new(name, move |_cx| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(value)
    }))
}

#[tokio::test(start_paused = true)]
async fn combinators_compose_inside_forked_tasks() -> anyhow::Result<()> {
    let engine = TokioEngine::<u32>::new(Config::default());
    let cx = engine.context();

    // A task whose body forks two mirrors, races them and adds a sequential step.
    let pipeline = Effect::new("pipeline", |cx| async move {
        let (_, fastest) = race(&cx, Node::ordered([after("eu", 30, 10), after("us", 5, 20)])).await?;
        let extra = sequence(&cx, Node::ordered([after("post", 1, 1)])).await?;
        Ok(fastest + extra.leaves().into_iter().sum::<u32>())
    });

    let handles: HandleTree<u32> = fork(
        &cx,
        Node::keyed([("pipeline", Node::leaf(pipeline)), ("side", after("side", 2, 7))]),
    )
    .await?;
    let values = join(&cx, handles).await?;

    assert_eq!(
        values,
        Node::keyed([("pipeline", Node::leaf(21)), ("side", Node::leaf(7))])
    );
    Ok(())
}

#[tokio::test]
async fn observers_see_race_decisions() -> anyhow::Result<()> {
    let collect = Arc::new(Collect::default());
    let engine = TokioEngine::<u32>::builder(Config::default())
        .with_observers(vec![collect.clone() as Arc<dyn Observe>])
        .build();
    let cx = engine.context();

    let (key, value) = race(
        &cx,
        Node::keyed([("slow", after("slow", 500, 1)), ("now", Node::leaf(Effect::ready("now", 2)))]),
    )
    .await?;
    assert_eq!((key, value), (Key::from("now"), 2));

    engine.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let kinds = collect.kinds();
    assert!(kinds.contains(&EventKind::TaskForked));
    assert!(kinds.contains(&EventKind::RaceDecided));
    assert!(kinds.contains(&EventKind::ShutdownRequested));

    let decided = collect
        .0
        .lock()
        .iter()
        .find(|e| e.kind == EventKind::RaceDecided)
        .cloned()
        .expect("race event");
    assert_eq!(decided.key.as_deref(), Some("now"));
    assert_eq!(decided.reason.as_deref(), Some("fast_path"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_parent_stops_its_subscription() -> anyhow::Result<()> {
    let engine = TokioEngine::<u32>::new(Config::default());
    let cx = engine.context();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let owner = cx.fork(Effect::new("owner", move |cx| async move {
        let spec = SubscribeSpec::new("tick", move |n: u32| {
            let sink = sink.clone();
            Effect::new("record", move |_cx| async move {
                sink.lock().push(n);
                Ok(n)
            })
        });
        let sub = subscribe(&cx, spec)?;
        sub.finished().await
    }));

    cx.send("tick", 1);
    tokio::time::sleep(Duration::from_millis(1)).await;
    cx.cancel(&owner).await;
    cx.send("tick", 2);
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(*seen.lock(), vec![1]);
    assert_eq!(owner.result(), Some(Err(FlowError::Canceled)));
    assert!(engine.live_tasks().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn subscription_sees_messages_sent_right_after_it_starts() -> anyhow::Result<()> {
    let engine = TokioEngine::<u32>::new(Config {
        eager_fork: false,
        ..Config::default()
    });
    let cx = engine.context();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let sub = subscribe(
        &cx,
        SubscribeSpec::new("job", move |n: u32| {
            let sink = sink.clone();
            Effect::new("record", move |_cx| async move {
                sink.lock().push(n);
                Ok(n)
            })
        }),
    )?;
    // The loop task has not been polled yet.
    for n in 1..=4 {
        cx.send("job", n);
    }
    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut got = seen.lock().clone();
    got.sort_unstable();
    assert_eq!(got, vec![1, 2, 3, 4]);
    cx.cancel(&sub).await;
    Ok(())
}

#[tokio::test]
async fn shutdown_reports_clean_stop() -> anyhow::Result<()> {
    let engine = TokioEngine::<u32>::new(Config {
        grace: Duration::from_secs(1),
        ..Config::default()
    });
    let cx = engine.context();

    let sub = subscribe(&cx, SubscribeSpec::new("never", |n: u32| Effect::ready("h", n)))?;
    assert_eq!(engine.live_tasks(), vec!["subscribe(never)"]);

    engine.shutdown().await?;
    assert_eq!(sub.result(), Some(Err(FlowError::Canceled)));
    Ok(())
}
