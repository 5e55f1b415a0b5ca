//! HTTP tests for the timer command and query routes.

use std::sync::Arc;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use match_clock_back::{
    config::AppConfig,
    dao::clock_store::MemoryClockStore,
    routes,
    state::{AppState, SharedState, clock::ManualClock, timer::TimerId},
};
use serde_json::Value;
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const T0: i64 = 1_700_000_000_000;

fn app() -> (Router, SharedState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let state = AppState::with_parts(
        AppConfig::default(),
        Arc::new(MemoryClockStore::new(100)),
        clock.clone(),
    );
    (routes::router(state.clone()), state, clock)
}

async fn call(router: &Router, method: &str, path: &str) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let response = router
        .clone()
        .oneshot(Request::builder().method(method).uri(path).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

#[tokio::test(start_paused = true)]
async fn reference_countdown_over_http() -> TestResult {
    let (router, state, clock) = app();

    let (status, json) = call(&router, "POST", "/footy/timer/reset/7").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["time"], "6:00");
    assert_eq!(json["state"], "paused");
    assert_eq!(json["from"], T0);
    assert_eq!(json["paused"], T0);

    let (status, json) = call(&router, "POST", "/footy/timer/start/7").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "running");
    assert!(json.get("paused").is_none());

    let (_, shown) = call(&router, "GET", "/footy/timer/7").await?;
    assert!(shown == "6:00" || shown == "5:59");

    clock.advance_secs(65);
    let (_, shown) = call(&router, "GET", "/footy/timer/7").await?;
    assert_eq!(shown, "4:55");

    let (status, _) = call(&router, "POST", "/footy/timer/stop/7").await?;
    assert_eq!(status, StatusCode::OK);
    for _ in 0..3 {
        clock.advance_secs(20);
        let (_, shown) = call(&router, "GET", "/footy/timer/7").await?;
        assert_eq!(shown, "4:55");
    }

    call(&router, "POST", "/footy/timer/start/7").await?;
    clock.advance_secs(5);
    let (_, shown) = call(&router, "GET", "/footy/timer/7").await?;
    assert_eq!(shown, "4:50");

    state.ticker().cancel_all().await;
    Ok(())
}

#[tokio::test]
async fn polling_unknown_timer_creates_it() -> TestResult {
    let (router, _state, _clock) = app();

    let (status, _) = call(&router, "GET", "/footy/timer/42/state").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, shown) = call(&router, "GET", "/footy/timer/42").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown, "6:00");

    let (status, json) = call(&router, "GET", "/footy/timer/42/state").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"id": "42", "time": "6:00", "state": "paused"}));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn invalid_transitions_conflict() -> TestResult {
    let (router, state, _clock) = app();

    let (status, json) = call(&router, "POST", "/footy/timer/stop/9").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap_or_default().contains("not been started"));

    call(&router, "POST", "/footy/timer/reset/9").await?;
    let (status, _) = call(&router, "POST", "/footy/timer/stop/9").await?;
    assert_eq!(status, StatusCode::CONFLICT);

    call(&router, "POST", "/footy/timer/start/9").await?;
    let (status, _) = call(&router, "POST", "/footy/timer/start/9").await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&router, "POST", "/footy/timer/reset/9").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!state.ticker().is_ticking(&TimerId::parse("9")?));
    Ok(())
}

#[tokio::test]
async fn malformed_timer_id_is_a_bad_request() -> TestResult {
    let (router, _state, _clock) = app();
    let long_id = "x".repeat(65);
    let (status, _) = call(&router, "GET", &format!("/footy/timer/{long_id}")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn command_keywords_are_not_timer_ids() -> TestResult {
    let (router, state, _clock) = app();
    for id in ["start", "stop", "reset"] {
        let (status, json) = call(&router, "POST", &format!("/footy/timer/reset/{id}")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap_or_default().contains("reserved"));
    }
    assert!(state.engine().store().is_empty());
    Ok(())
}

#[tokio::test]
async fn healthcheck_reports_counters() -> TestResult {
    let (router, _state, _clock) = app();
    call(&router, "GET", "/footy/timer/1").await?;

    let (status, json) = call(&router, "GET", "/healthcheck").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["stored_timers"], 1);
    assert_eq!(json["ticking_timers"], 0);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> TestResult {
    let (router, _state, _clock) = app();
    let (status, json) = call(&router, "GET", "/api-doc/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"].get("/footy/timer/start/{id}").is_some());
    Ok(())
}
