//! Full-pipeline test: the poller observes a changing odds endpoint and
//! drives the projector and the history store through their listener seams.

use livematch_feed::{FeedPoller, MappingResolver, MatchDecoder};
use livematch_state::{LiveStateProjector, MatchHistoryStore, GENERATED_LINE};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MATCH_X: &str = "ec517b6c-6ed8-4449-ad9b-0a1dbbbf8fb9";
const MATCH_Y: &str = "2db5f60f-6ae6-4fef-9744-e957e0f27c67";
const SPORT: &str = "9860e748-1f53-45ed-9a3f-2eeb46550083";
const COMPETITION: &str = "13605dbb-fb95-4373-8354-dbce8272086c";
const HOME: &str = "c22ca89b-50db-4a90-84d3-25daf31de9db";
const AWAY: &str = "54963ddf-ddc6-41b6-a7d1-3e2b76f531c0";
const STATUS_PRE: &str = "ac68a563-e511-4593-b8b8-2a01712b649c";
const STATUS_LIVE: &str = "93f346fd-c921-4f67-b4c3-64fe1f466140";

fn record(match_id: &str, status_id: &str) -> String {
    format!("{match_id},{SPORT},{COMPETITION},1729839678453,{HOME},{AWAY},{status_id}")
}

fn odds_body(lines: &[String]) -> serde_json::Value {
    json!({ "odds": lines.join("\n") })
}

#[tokio::test]
async fn poller_drives_view_and_history_through_a_vanishing_match() {
    let upstream = MockServer::start().await;

    let dictionary = [
        format!("{SPORT}:FOOTBALL"),
        format!("{COMPETITION}:UEFA Champions League"),
        format!("{HOME}:Bayern Munich"),
        format!("{AWAY}:Juventus"),
        format!("{STATUS_PRE}:PRE"),
        format!("{STATUS_LIVE}:LIVE"),
    ]
    .join(";");
    Mock::given(method("GET"))
        .and(path("/api/mappings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mappings": dictionary })))
        .mount(&upstream)
        .await;

    // Snapshot A once, then snapshot B (the LIVE match vanished) forever.
    let snapshot_a = odds_body(&[record(MATCH_X, STATUS_LIVE), record(MATCH_Y, STATUS_PRE)]);
    let snapshot_b = odds_body(&[record(MATCH_Y, STATUS_PRE)]);
    Mock::given(method("GET"))
        .and(path("/api/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_a))
        .up_to_n_times(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_b))
        .mount(&upstream)
        .await;

    let http = reqwest::Client::new();
    let resolver = Arc::new(MappingResolver::new(
        http.clone(),
        format!("{}/api/mappings", upstream.uri()),
    ));
    let decoder = Arc::new(MatchDecoder::new(resolver));
    let projector = Arc::new(LiveStateProjector::new(decoder.clone()));
    let store = Arc::new(MatchHistoryStore::new(decoder));

    let poller = FeedPoller::new(
        http,
        format!("{}/api/state", upstream.uri()),
        Duration::from_millis(10),
    );
    poller.add_listener(projector.clone()).await;
    poller.add_listener(store.clone()).await;

    poller.start().await;

    // Both snapshots plus at least one unchanged cycle.
    tokio::time::sleep(Duration::from_millis(400)).await;
    poller.stop().await;

    // Live view only holds the surviving PRE match.
    let view = projector.current().await;
    assert_eq!(view.len(), 1);
    assert_eq!(view[MATCH_Y].status, "PRE");

    // The vanished LIVE match got exactly one synthetic terminal entry,
    // unchanged snapshots notwithstanding.
    let history = store.history(MATCH_X).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, "LIVE");
    assert_eq!(history[1].status, "REMOVED");
    assert_eq!(history[1].raw_line, GENERATED_LINE);
    assert_eq!(history[1].rendered["competitors"]["HOME"]["name"], "Bayern Munich");

    // The surviving match deduplicated down to a single entry.
    assert_eq!(store.history(MATCH_Y).await.len(), 1);

    let stats = poller.stats().await;
    assert!(stats.cycles >= 3, "expected several cycles, got {}", stats.cycles);
    assert_eq!(stats.changes, 2);
}
