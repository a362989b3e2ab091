#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use synth_metrics::config::{ConfigSource, MapConfig};
use synth_metrics::series::{Algorithm, NumericType, Registry};
use synth_metrics::{server, AppState};

fn setup(pairs: &[(&str, &str)]) -> (Arc<Registry>, Router) {
    let config = Arc::new(MapConfig::from_pairs(pairs.iter().copied()));
    let registry = Arc::new(
        Registry::initialize(&NumericType::ALL, &Algorithm::ALL, config).expect("registry builds"),
    );
    let state = Arc::new(AppState::new(registry.clone(), Duration::from_millis(50)));
    (registry, server::create_router(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::get(uri).body(Body::empty()).expect("request builds");
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn series_routes_serve_every_pair() {
    let (_, app) = setup(&[]);
    for numeric in ["exp", "float", "int"] {
        for algorithm in ["up", "down", "random"] {
            let (status, body) = get(&app, &format!("/series/{numeric}/{algorithm}")).await;
            assert_eq!(status, StatusCode::OK);
            let prefix = format!("Metric_{numeric}_{algorithm}: ");
            assert!(body.starts_with(&prefix), "{body}");
            assert!(body.ends_with('\n'));
            let value = body[prefix.len()..].trim_end();
            assert!(value.parse::<f64>().is_ok(), "{value}");
        }
    }
}

#[tokio::test]
async fn bad_series_paths_are_rejected() {
    let (_, app) = setup(&[]);
    for uri in [
        "/series/bogus/up",
        "/series/ex/up",
        "/series/exp/u",
        "/series/exp",
        "/series/exp/",
        "/series/exp/up/for/ever",
        "/series",
        "/series/",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(!body.is_empty());
    }
}

#[tokio::test]
async fn series_value_only_moves_on_tick() {
    let (registry, app) = setup(&[]);
    let (_, first) = get(&app, "/series/exp/up").await;
    let (_, second) = get(&app, "/series/exp/up").await;
    assert_eq!(first, second);

    registry.tick();
    let expected = registry.lookup(NumericType::Exp, Algorithm::Up).unwrap().values()[1].clone();
    let (_, third) = get(&app, "/series/exp/up").await;
    assert_eq!(third, format!("Metric_exp_up: {expected}\n"));
}

#[tokio::test]
async fn metrics_page_lists_every_series() {
    let (_, app) = setup(&[]);
    let (status, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<_> = body.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines.iter().all(|l| l.starts_with("Metric_")));
    assert!(lines.contains(&"Metric_int_up: 0"));
    assert!(lines.contains(&"Metric_int_down: 10"));
}

#[tokio::test]
async fn random_page_has_one_line_per_type() {
    let (_, app) = setup(&[("RAND_LIMIT", "50"), ("RAND_MOD", "2")]);
    let (status, body) = get(&app, "/rand/all").await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<_> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    for (line, label) in lines.iter().zip(["ExpMetric: ", "FloatMetric: ", "IntMetric: "]) {
        let value: f64 = line.strip_prefix(label).expect(label).parse().unwrap();
        assert!((0.0..=100.0).contains(&value));
    }
}

#[tokio::test]
async fn reset_rebuilds_buffers() {
    let (registry, app) = setup(&[]);

    let (status, body) = get(&app, "/reset/INT_SIZE/11").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.lines().count(), 3);
    assert!(body.contains("Metric_int_up: INT_SIZE=11 (11 values)"));
    assert_eq!(registry.lookup(NumericType::Int, Algorithm::Up).unwrap().len(), 11);
    assert_eq!(registry.lookup(NumericType::Float, Algorithm::Up).unwrap().len(), 10);

    let (status, _) = get(&app, "/reset/FLOAT_TAIL/8").await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app, "/series/float/up").await;
    let value = body.trim_end().rsplit(' ').next().unwrap();
    assert_eq!(value.split_once('.').unwrap().1.len(), 8);

    let (status, _) = get(&app, "/reset/EXP_MOD/111.11").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registry.config().get_float("EXP_MOD", 0.0), 111.11);
}

#[tokio::test]
async fn bad_resets_are_rejected_without_changes() {
    let (registry, app) = setup(&[]);
    let before = registry.lookup(NumericType::Int, Algorithm::Down).unwrap().values();

    for uri in [
        "/reset/INT_SIZE",
        "/reset/INT_SIZE/11/ok",
        "/reset/ONT_SIZE/11",
        "/reset/INT_SIZE/zero",
        "/reset/INT_SIZE/18446744073709551615",
        "/reset/FLOAT_MOD/1e308",
        "/reset",
        "/reset/",
    ] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    assert_eq!(registry.lookup(NumericType::Int, Algorithm::Down).unwrap().values(), before);
    assert_eq!(registry.config().get_string("INT_SIZE"), None);
    assert_eq!(registry.config().get_string("FLOAT_MOD"), None);
}

#[tokio::test]
async fn fixtures_and_snapshot() {
    let (registry, app) = setup(&[]);

    let (status, body) = get(&app, "/ep/kv").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "HelloWorld: 69");

    let (status, body) = get(&app, "/ep/json").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["HelloWorld"], "69");

    registry.tick();
    let (status, body) = get(&app, "/api/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ticks"], 1);
    assert_eq!(json["types"].as_array().unwrap().len(), 3);
    assert_eq!(json["types"][0]["name"], "exp");
    assert_eq!(json["types"][0]["registers"][0]["algorithm"], "up");
    assert_eq!(json["types"][0]["registers"][0]["cursor"], 1);
}

#[tokio::test]
async fn responses_carry_timing_headers() {
    let (_, app) = setup(&[]);
    let request = Request::get("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-response-time-us"));
    assert!(response.headers().contains_key("server-timing"));
}

#[tokio::test]
async fn snapshot_stream_pushes_named_events() {
    use tokio_stream::StreamExt;

    let (registry, app) = setup(&[]);
    registry.tick();
    registry.tick();

    let request = Request::get("/api/snapshot/stream").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let mut body = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("first event arrives")
        .expect("stream is open")
        .unwrap();
    let frame = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(frame.contains("event: snapshot\n"), "{frame}");
    assert!(frame.contains("id: 2\n"), "{frame}");

    let data = frame
        .lines()
        .find_map(|l| l.strip_prefix("data: "))
        .expect("data line");
    let json: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(json["ticks"], 2);
}
