//! End-to-end scenarios through the public runtime handle.
//!
//! All tests run on a paused clock: tokio advances virtual time whenever every
//! task is idle, so multi-second cadences complete instantly and exactly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};
use tokio::time::{self, Instant};

use crate::{
    Alarms, Command, Config, Event, EventKind, RequestKind, Subscribe, SubmitError,
};

type Rx = broadcast::Receiver<Event>;

fn runtime(cfg: Config) -> (Arc<Alarms>, Rx) {
    let alarms = Alarms::builder(cfg).build();
    let rx = alarms.subscribe();
    (alarms, rx)
}

async fn next(rx: &mut Rx) -> Event {
    time::timeout(Duration::from_secs(120), rx.recv())
        .await
        .expect("no event within 120s")
        .expect("bus closed")
}

async fn expect(rx: &mut Rx, kind: EventKind, id: i32, text: &str) -> Instant {
    let ev = next(rx).await;
    assert_eq!(
        (ev.kind, ev.alarm, ev.text_or_empty()),
        (kind, Some(id), text),
        "unexpected event {ev:?}"
    );
    Instant::now()
}

async fn expect_silence(rx: &mut Rx, window: Duration) {
    if let Ok(ev) = time::timeout(window, rx.recv()).await {
        panic!("expected silence, got {ev:?}");
    }
}

fn assert_gap(from: Instant, to: Instant, secs: u64) {
    let gap = to - from;
    assert!(
        gap >= Duration::from_secs(secs) && gap < Duration::from_secs(secs) + Duration::from_millis(50),
        "gap {gap:?}, expected ~{secs}s"
    );
}

#[tokio::test(start_paused = true)]
async fn test_message_ticks_interval_times_then_silence() {
    let (alarms, mut rx) = runtime(Config::default());
    alarms.submit_message(1, 5, "A").await.unwrap();

    expect(&mut rx, EventKind::WorkerCreated, 1, "A").await;
    let mut prev = expect(&mut rx, EventKind::Tick, 1, "A").await;
    for _ in 0..4 {
        let at = expect(&mut rx, EventKind::Tick, 1, "A").await;
        assert_gap(prev, at, 5);
        prev = at;
    }
    expect_silence(&mut rx, Duration::from_secs(60)).await;
    assert!(alarms.is_live(1).await);

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_supersede_changes_message_without_new_worker() {
    let (alarms, mut rx) = runtime(Config::default());
    alarms.submit_message(2, 3, "B").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 2, "B").await;
    expect(&mut rx, EventKind::Tick, 2, "B").await;

    alarms.submit_message(2, 3, "C").await.unwrap();

    expect(&mut rx, EventKind::MessageChanged, 2, "C").await;
    for _ in 0..3 {
        expect(&mut rx, EventKind::Tick, 2, "C").await;
    }
    expect_silence(&mut rx, Duration::from_secs(30)).await;

    let snap = alarms.snapshot().await;
    assert_eq!(snap.len(), 1);
    assert_eq!(&*snap[0].text, "C");
    assert!(snap[0].superseded);

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_supersede_before_claim_reports_change() {
    let (alarms, mut rx) = runtime(Config::default());
    alarms.submit_message(2, 3, "B").await.unwrap();
    alarms.submit_message(2, 3, "C").await.unwrap();

    expect(&mut rx, EventKind::WorkerCreated, 2, "C").await;
    expect(&mut rx, EventKind::MessageChanged, 2, "C").await;
    for _ in 0..3 {
        expect(&mut rx, EventKind::Tick, 2, "C").await;
    }
    expect_silence(&mut rx, Duration::from_secs(30)).await;

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_new_interval_applies_at_next_boundary() {
    let (alarms, mut rx) = runtime(Config::default());
    alarms.submit_message(4, 10, "slow").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 4, "slow").await;
    expect(&mut rx, EventKind::Tick, 4, "slow").await;

    alarms.submit_message(4, 2, "fast").await.unwrap();

    // The pending 10s sleep finishes first; after that the period is 2s.
    let changed = expect(&mut rx, EventKind::MessageChanged, 4, "fast").await;
    let first = expect(&mut rx, EventKind::Tick, 4, "fast").await;
    assert_eq!(changed, first);
    let second = expect(&mut rx, EventKind::Tick, 4, "fast").await;
    assert_gap(first, second, 2);
    expect_silence(&mut rx, Duration::from_secs(30)).await;

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_worker_within_one_period() {
    let (alarms, mut rx) = runtime(Config::default());
    alarms.submit_message(3, 10, "X").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 3, "X").await;
    let ticked = expect(&mut rx, EventKind::Tick, 3, "X").await;

    alarms.submit_cancel(3).await.unwrap();

    expect(&mut rx, EventKind::Cancelled, 3, "X").await;
    let exited = expect(&mut rx, EventKind::WorkerExiting, 3, "X").await;
    assert!(exited - ticked <= Duration::from_secs(10) + Duration::from_millis(50));
    assert!(!alarms.is_live(3).await);
    assert!(alarms.snapshot().await.is_empty());

    // Repeating the cancel changes nothing.
    alarms.submit_cancel(3).await.unwrap();
    expect_silence(&mut rx, Duration::from_secs(30)).await;
    assert!(alarms.snapshot().await.is_empty());

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_wake_on_cancel_exits_immediately() {
    let (alarms, mut rx) = runtime(Config {
        wake_on_cancel: true,
        ..Config::default()
    });
    alarms.submit_message(3, 60, "X").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 3, "X").await;
    expect(&mut rx, EventKind::Tick, 3, "X").await;

    alarms.submit_cancel(3).await.unwrap();
    let cancelled = expect(&mut rx, EventKind::Cancelled, 3, "X").await;
    let exited = expect(&mut rx, EventKind::WorkerExiting, 3, "X").await;
    assert!(exited - cancelled < Duration::from_millis(50));

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_of_unknown_id_is_silent() {
    let (alarms, mut rx) = runtime(Config::default());
    alarms.submit_cancel(42).await.unwrap();

    expect_silence(&mut rx, Duration::from_secs(10)).await;
    assert!(alarms.snapshot().await.is_empty());

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_message_after_cancel_gets_fresh_worker() {
    let (alarms, mut rx) = runtime(Config {
        wake_on_cancel: true,
        ..Config::default()
    });
    alarms.submit_message(5, 4, "old").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 5, "old").await;
    expect(&mut rx, EventKind::Tick, 5, "old").await;
    alarms.submit_cancel(5).await.unwrap();
    expect(&mut rx, EventKind::Cancelled, 5, "old").await;
    expect(&mut rx, EventKind::WorkerExiting, 5, "old").await;

    alarms.submit_message(5, 4, "new").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 5, "new").await;
    expect(&mut rx, EventKind::Tick, 5, "new").await;

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_registry_stays_sorted_across_submissions() {
    let (alarms, _rx) = runtime(Config::default());
    for id in [8, 2, 5, 1, 9, 2, 5] {
        alarms.submit_message(id, 3, "m").await.unwrap();
    }
    alarms.submit_cancel(5).await.unwrap();
    alarms.submit_cancel(5).await.unwrap();
    alarms.submit_cancel(7).await.unwrap();

    let snap = alarms.snapshot().await;
    for pair in snap.windows(2) {
        assert!(pair[0].id <= pair[1].id, "{snap:?}");
    }
    let messages: Vec<i32> = snap
        .iter()
        .filter(|v| v.kind == RequestKind::Message)
        .map(|v| v.id)
        .collect();
    let mut dedup = messages.clone();
    dedup.dedup();
    assert_eq!(messages, dedup, "duplicate live message");

    alarms.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_submit_command_and_rejections() {
    let (alarms, mut rx) = runtime(Config::default());

    assert_eq!(
        alarms.submit_message(1, 0, "never").await,
        Err(SubmitError::ZeroInterval)
    );

    let cmd = Command::parse("2 Message(6) via intake").unwrap();
    alarms.submit(cmd).await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 6, "via intake").await;

    alarms.shutdown().await;
    assert!(alarms.is_shut_down());
    assert_eq!(
        alarms.submit_cancel(6).await,
        Err(SubmitError::Closed)
    );
    // Second shutdown is a no-op.
    alarms.shutdown().await;
}

#[derive(Default)]
struct Collect {
    kinds: Mutex<Vec<(EventKind, Option<i32>)>>,
}

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, ev: &Event) {
        self.kinds.lock().await.push((ev.kind, ev.alarm));
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_receive_events_before_shutdown_returns() {
    let collect = Arc::new(Collect::default());
    let alarms = Alarms::builder(Config::default())
        .with_subscriber(collect.clone())
        .build();
    let mut rx = alarms.subscribe();

    alarms.submit_message(1, 2, "a").await.unwrap();
    expect(&mut rx, EventKind::WorkerCreated, 1, "a").await;
    expect(&mut rx, EventKind::Tick, 1, "a").await;

    alarms.shutdown().await;

    let kinds = collect.kinds.lock().await.clone();
    assert_eq!(
        kinds,
        vec![
            (EventKind::WorkerCreated, Some(1)),
            (EventKind::Tick, Some(1)),
        ]
    );
}
