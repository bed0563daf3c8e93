//! Shared fixtures for listener tests: a stubbed mapping endpoint and raw
//! record builders.

use livematch_core::MatchStatus;
use livematch_feed::{MappingResolver, MatchDecoder};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MATCH_A: &str = "ec517b6c-6ed8-4449-ad9b-0a1dbbbf8fb9";
pub const MATCH_B: &str = "2db5f60f-6ae6-4fef-9744-e957e0f27c67";
pub const SPORT: &str = "9860e748-1f53-45ed-9a3f-2eeb46550083";
pub const COMPETITION: &str = "13605dbb-fb95-4373-8354-dbce8272086c";
pub const HOME: &str = "c22ca89b-50db-4a90-84d3-25daf31de9db";
pub const AWAY: &str = "54963ddf-ddc6-41b6-a7d1-3e2b76f531c0";
pub const STATUS_PRE: &str = "ac68a563-e511-4593-b8b8-2a01712b649c";
pub const STATUS_LIVE: &str = "93f346fd-c921-4f67-b4c3-64fe1f466140";
pub const STATUS_REMOVED: &str = "97e38e33-5a06-4ca8-bb4b-b51e1b1a35a4";
pub const PERIOD_CURRENT: &str = "5c3a00b4-6dca-4439-8340-9eba10777517";

pub struct Fixture {
    _server: MockServer,
    decoder: Arc<MatchDecoder>,
}

impl Fixture {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let dictionary = [
            format!("{SPORT}:FOOTBALL"),
            format!("{COMPETITION}:UEFA Champions League"),
            format!("{HOME}:Bayern Munich"),
            format!("{AWAY}:Juventus"),
            format!("{STATUS_PRE}:PRE"),
            format!("{STATUS_LIVE}:LIVE"),
            format!("{STATUS_REMOVED}:REMOVED"),
            format!("{PERIOD_CURRENT}:CURRENT"),
        ]
        .join(";");

        Mock::given(method("GET"))
            .and(path("/api/mappings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "mappings": dictionary })),
            )
            .mount(&server)
            .await;

        let resolver = Arc::new(MappingResolver::new(
            reqwest::Client::new(),
            format!("{}/api/mappings", server.uri()),
        ));

        Self {
            _server: server,
            decoder: Arc::new(MatchDecoder::new(resolver)),
        }
    }

    pub fn decoder(&self) -> Arc<MatchDecoder> {
        self.decoder.clone()
    }
}

/// Builds one raw record for `match_id`; `scores` is appended as field 8
/// when non-empty.
pub fn line(match_id: &str, status: MatchStatus, scores: &str) -> String {
    let status_id = match status {
        MatchStatus::Pre => STATUS_PRE,
        MatchStatus::Live => STATUS_LIVE,
        MatchStatus::Removed => STATUS_REMOVED,
    };
    let mut record =
        format!("{match_id},{SPORT},{COMPETITION},1729839678453,{HOME},{AWAY},{status_id}");
    if !scores.is_empty() {
        record.push(',');
        record.push_str(scores);
    }
    record
}

/// Wraps raw records into the JSON body listeners receive.
pub fn snapshot_payload(lines: &[String]) -> String {
    serde_json::to_string(&json!({ "odds": lines.join("\n") })).unwrap()
}
