//! Call spacing across operations, tasks and failover attempts.

mod common;

use common::{client, throttled_client, Behavior, MockUpstream};
use std::time::{Duration, Instant};
use tokio_test::assert_ok;

/// Server-side timestamps include connection setup, which differs between a
/// fresh and a pooled connection.
const SLACK: Duration = Duration::from_millis(30);

fn gaps(upstream: &MockUpstream) -> Vec<Duration> {
    let mut times: Vec<Instant> = upstream.calls().iter().map(|call| call.at).collect();
    times.sort();
    times.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

#[tokio::test]
async fn sequential_calls_are_spaced_even_when_fast() {
    let upstream = MockUpstream::start(Behavior::Healthy).await;
    let interval = Duration::from_millis(400);
    let client = throttled_client(&[upstream.url()], interval);

    let started = Instant::now();
    assert_ok!(client.users().profile("gioscottii").await);
    assert!(started.elapsed() < interval, "first call should not wait");

    assert_ok!(client.posts().fetch("7002172928477367557", false).await);
    assert!(started.elapsed() >= interval);

    for gap in gaps(&upstream) {
        assert!(gap + SLACK >= interval, "calls only {gap:?} apart");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_share_one_budget() {
    let upstream = MockUpstream::start(Behavior::Healthy).await;
    let interval = Duration::from_millis(200);
    let client = throttled_client(&[upstream.url()], interval);

    let started = Instant::now();
    let profile = tokio::spawn({
        let client = client.clone();
        async move { client.users().profile("gioscottii").await }
    });
    let post = tokio::spawn({
        let client = client.clone();
        async move { client.posts().fetch("7002172928477367557", true).await }
    });
    let page = tokio::spawn({
        let client = client.clone();
        async move { client.users().feed_page("gioscottii", 33, "0").await }
    });

    assert_ok!(profile.await.unwrap());
    assert_ok!(post.await.unwrap());
    assert_ok!(page.await.unwrap());

    assert!(started.elapsed() >= interval * 2);
    assert_eq!(upstream.calls().len(), 3);
    for gap in gaps(&upstream) {
        assert!(gap + SLACK >= interval, "calls only {gap:?} apart");
    }
}

#[tokio::test]
async fn failover_attempts_are_throttled() {
    let garbage = MockUpstream::start(Behavior::Garbage).await;
    let healthy = MockUpstream::start(Behavior::Healthy).await;
    let interval = Duration::from_millis(300);
    let client = throttled_client(&[garbage.url(), healthy.url()], interval);

    let started = Instant::now();
    assert_ok!(client.users().profile("gioscottii").await);
    assert!(started.elapsed() >= interval);
}

#[tokio::test]
async fn separate_clients_throttle_independently() {
    let upstream = MockUpstream::start(Behavior::Healthy).await;
    let interval = Duration::from_secs(2);
    let first = throttled_client(&[upstream.url()], interval);
    let second = throttled_client(&[upstream.url()], interval);

    let started = Instant::now();
    assert_ok!(first.users().profile("gioscottii").await);
    assert_ok!(second.users().profile("gioscottii").await);
    assert!(started.elapsed() < interval);
}

#[tokio::test]
async fn cancelled_call_still_consumes_its_slot() {
    let upstream = MockUpstream::start(Behavior::SlowFirst(Duration::from_secs(5))).await;
    let interval = Duration::from_millis(500);
    let client = throttled_client(&[upstream.url()], interval);

    let started = Instant::now();
    let cancelled = tokio::time::timeout(
        Duration::from_millis(100),
        client.users().profile("gioscottii"),
    )
    .await;
    assert!(cancelled.is_err());

    // Dropping the call released the throttle without giving back its slot.
    let profile = assert_ok!(
        tokio::time::timeout(Duration::from_secs(3), client.users().profile("gioscottii")).await
    );
    assert_ok!(profile);
    assert!(started.elapsed() >= interval);
    assert_eq!(upstream.calls().len(), 2);
}

#[tokio::test]
async fn unthrottled_client_does_not_wait() {
    let upstream = MockUpstream::start(Behavior::Healthy).await;
    let client = client(&[upstream.url()]);

    let started = Instant::now();
    for _ in 0..3 {
        assert_ok!(client.users().profile("gioscottii").await);
    }
    assert!(started.elapsed() < Duration::from_millis(1100));
}
