//! SSE observer stream tests: initial state for late joiners and live pushes.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use match_clock_back::{
    config::AppConfig,
    dao::clock_store::MemoryClockStore,
    routes,
    state::{AppState, SharedState, clock::ManualClock},
};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn app() -> (Router, SharedState) {
    let state = AppState::with_parts(
        AppConfig::default(),
        Arc::new(MemoryClockStore::new(100)),
        Arc::new(ManualClock::new(1_700_000_000_000)),
    );
    (routes::router(state.clone()), state)
}

async fn post(router: &Router, path: &str) -> Result<StatusCode, Box<dyn std::error::Error>> {
    let response = router
        .clone()
        .oneshot(Request::post(path).body(Body::empty())?)
        .await?;
    Ok(response.status())
}

async fn next_chunk(body: &mut Body) -> Result<String, Box<dyn std::error::Error>> {
    loop {
        let frame = body.frame().await.ok_or("stream ended")??;
        if let Ok(data) = frame.into_data() {
            return Ok(String::from_utf8(data.to_vec())?);
        }
    }
}

#[tokio::test]
async fn late_joiner_gets_current_state_then_live_updates() -> TestResult {
    let (router, state) = app();
    assert_eq!(post(&router, "/footy/timer/reset/7").await?, StatusCode::OK);

    let response = router
        .clone()
        .oneshot(Request::get("/sse/timers/7").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body();

    let initial = next_chunk(&mut body).await?;
    assert!(initial.contains("event: timerUpdate"));
    assert!(initial.contains(r#""time":"6:00""#));
    assert!(initial.contains(r#""state":"paused""#));

    assert_eq!(post(&router, "/footy/timer/start/7").await?, StatusCode::OK);
    let started = next_chunk(&mut body).await?;
    assert!(started.contains(r#""state":"running""#));

    assert_eq!(post(&router, "/footy/timer/stop/7").await?, StatusCode::OK);
    // A tick may slip in between the start push and the stop push.
    let mut stopped = next_chunk(&mut body).await?;
    for _ in 0..3 {
        if stopped.contains(r#""state":"paused""#) {
            break;
        }
        stopped = next_chunk(&mut body).await?;
    }
    assert!(stopped.contains(r#""state":"paused""#));

    assert_eq!(state.dispatcher().registry().group_count(), 1);
    drop(body);
    state.ticker().cancel_all().await;
    Ok(())
}

#[tokio::test]
async fn stream_for_unknown_timer_waits_without_initial_push() -> TestResult {
    let (router, state) = app();

    let response = router
        .clone()
        .oneshot(Request::get("/sse/timers/fresh").body(Body::empty())?)
        .await?;
    let mut body = response.into_body();
    assert_eq!(state.dispatcher().observer_count(), 1);

    // The first frame only arrives once a command produces state.
    assert_eq!(post(&router, "/footy/timer/reset/fresh").await?, StatusCode::OK);
    let first = next_chunk(&mut body).await?;
    assert!(first.contains(r#""id":"fresh""#));
    assert!(first.contains(r#""time":"6:00""#));
    Ok(())
}
