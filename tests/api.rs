mod support;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use chess_stats::application::players::PlayerService;
use chess_stats::application::repos::PlayersRepo;
use chess_stats::application::stats::{StatsCache, StatsService};
use chess_stats::cache::ManualClock;
use chess_stats::infra::http::{self, ApiKey, ApiState};

use support::{MemoryPlayers, player};

fn seeded_repo() -> Arc<MemoryPlayers> {
    Arc::new(MemoryPlayers::with_players(vec![
        player(1503014, "Carlsen, Magnus", Some("NOR"), Some(2830), Some("GM")),
        player(2020009, "Caruana, Fabiano", Some("USA"), Some(2805), Some("GM")),
        player(2016192, "Nakamura, Hikaru", Some("USA"), Some(2794), Some("GM")),
        player(2093596, "Unrated, Sam", Some("USA"), None, None),
        player(30000001, "Hansen, Kari", Some("NOR"), Some(1487), None),
    ]))
}

fn app_with(repo: Arc<MemoryPlayers>, api_key: Option<&str>) -> Router {
    let players: Arc<dyn PlayersRepo> = repo;
    let cache = Arc::new(StatsCache::new(
        Duration::from_secs(3600),
        Arc::new(ManualClock::default()),
    ));
    let state = ApiState {
        players: Arc::new(PlayerService::new(players.clone())),
        stats: Arc::new(StatsService::new(players, Some(cache))),
        api_key: api_key.map(ApiKey::new),
    };
    http::build_router(state, &["*".to_string()])
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    send(app, request).await
}

#[tokio::test]
async fn root_returns_welcome_message() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Chess Stats API");
}

#[tokio::test]
async fn player_lookup_wraps_record_in_envelope() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/player/1503014").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["name"], "Carlsen, Magnus");
    assert_eq!(body["data"]["standard"]["rating"], 2830);
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/player/42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn non_numeric_fide_id_is_a_bad_request() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/player/magnus").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn search_filters_and_reports_total() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/search?federation=usa&min_rating=2800").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["fide_id"], 2020009);
}

#[tokio::test]
async fn search_matches_name_fragments_case_insensitively() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/search?name=CAR").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn search_rejects_out_of_range_parameters() {
    let app = app_with(seeded_repo(), None);

    let (status, body) = get(&app, "/api/v1/search?limit=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_input");

    let (status, _) = get(&app, "/api/v1/search?min_rating=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/v1/search?federation=USAA").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn top_players_are_ordered_by_rating() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/federation/usa/top?limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["federation"], "USA");
    let players = body["data"]["players"].as_array().expect("players array");
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["rating"], 2805);
    assert_eq!(players[1]["rating"], 2794);
}

#[tokio::test]
async fn top_players_limit_is_bounded() {
    let app = app_with(seeded_repo(), None);

    let (status, _) = get(&app, "/api/v1/federation/USA/top?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/v1/federation/USA/top?limit=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_federation_code_is_rejected_before_querying() {
    let repo = seeded_repo();
    let app = app_with(repo.clone(), None);
    let (status, body) = get(&app, "/api/v1/federation/U1/stats").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_input");
    assert_eq!(repo.aggregate_queries(), 0);
}

#[tokio::test]
async fn federation_stats_are_cached_across_requests() {
    let repo = seeded_repo();
    let app = app_with(repo.clone(), None);

    let (status, first) = get(&app, "/api/v1/federation/USA/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["total_players"], 2);
    assert_eq!(first["data"]["avg_rating"], 2799.5);
    assert_eq!(first["data"]["titled_players"], 2);

    let (_, second) = get(&app, "/api/v1/federation/usa/stats").await;
    assert_eq!(first, second);
    assert_eq!(repo.aggregate_queries(), 1);
}

#[tokio::test]
async fn rating_distribution_defaults_to_all_federations() {
    let app = app_with(seeded_repo(), None);

    let (status, body) = get(&app, "/api/v1/rating-distribution").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["federation"], "all");
    assert_eq!(body["data"]["distribution"][0]["rating_range"], "1400-1499");

    let (_, norway) = get(&app, "/api/v1/rating-distribution?federation=nor").await;
    assert_eq!(norway["data"]["federation"], "NOR");
    let bins = norway["data"]["distribution"]
        .as_array()
        .expect("distribution array");
    assert_eq!(bins.len(), 2);
}

#[tokio::test]
async fn titled_players_cross_tab_is_keyed_by_federation() {
    let app = app_with(seeded_repo(), None);
    let (status, body) = get(&app, "/api/v1/titled-players/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["USA"]["GM"], 2);
    assert_eq!(body["data"]["NOR"]["GM"], 1);
}

#[tokio::test]
async fn store_failures_map_to_service_unavailable() {
    let repo = seeded_repo();
    repo.set_failing(true);
    let app = app_with(repo, None);

    let (status, body) = get(&app, "/api/v1/titled-players/stats").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "db_timeout");
}

#[tokio::test]
async fn api_key_guards_versioned_routes_only() {
    let app = app_with(seeded_repo(), Some("s3cret"));

    let (status, body) = get(&app, "/api/v1/player/1503014").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let wrong = Request::get("/api/v1/player/1503014")
        .header("x-api-key", "guess")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let authorized = Request::get("/api/v1/player/1503014")
        .header("x-api-key", "s3cret")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, authorized).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_reflects_store_availability() {
    let repo = seeded_repo();
    let app = app_with(repo.clone(), None);

    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    repo.set_failing(true);
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = app_with(seeded_repo(), None);
    let request = Request::options("/api/v1/search")
        .header("origin", "https://chess.example")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("router is infallible");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = app_with(seeded_repo(), None);

    let request = Request::get("/")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("trace-123")
    );

    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("router is infallible");
    let generated = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .expect("generated request id");
    assert_eq!(generated.len(), 36);
}
