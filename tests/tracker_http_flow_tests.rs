use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

use time_trackers::shell::build_state;
use time_trackers::shell::config::{Config, DATABASE_PATH, STORE};
use time_trackers::shell::http::router;

fn config(pairs: Vec<(&'static str, String)>) -> Config {
    Config::from_lookup(move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

#[fixture]
fn memory_app() -> Router {
    router(build_state(&config(vec![])).unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn run_lifecycle(app: Router) {
    let (status, a) = send(
        &app,
        "POST",
        "/api/v1/tracker",
        Some(json!({ "start": "2020-05-15T00:00:00.000Z", "name": "t1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(a["id"], 1);
    assert_eq!(a["version"], 1);
    assert!(a["end"].is_null());
    assert_eq!(a["created_at"], a["updated_at"]);

    tokio::time::sleep(Duration::from_millis(2)).await;
    let (status, b) = send(
        &app,
        "POST",
        "/api/v1/tracker",
        Some(json!({ "start": "2020-05-16T00:00:00.000Z", "name": "t2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(b["id"], 2);

    let (status, window) = send(
        &app,
        "GET",
        "/api/v1/tracker?start_date=2020-05-15T00:00:01.000Z&end_date=2020-05-16T10:00:01.000Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(window.as_array().unwrap().len(), 1);
    assert_eq!(window[0]["id"], 2);

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/v1/tracker/1",
        Some(json!({ "end": "2020-05-15T10:00:00.000Z", "version": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["name"], "t1");

    let (status, conflict) = send(
        &app,
        "PUT",
        "/api/v1/tracker/1",
        Some(json!({ "name": "lost", "version": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(conflict["error"].as_str().unwrap().starts_with("wrong version"));

    let (status, _) = send(&app, "DELETE", "/api/v1/tracker/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/v1/tracker/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, all) = send(&app, "GET", "/api/v1/tracker", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["name"], "t2");
}

#[rstest]
#[tokio::test]
async fn it_should_run_the_lifecycle_against_the_memory_store(memory_app: Router) {
    run_lifecycle(memory_app).await;
}

#[rstest]
#[tokio::test]
async fn it_should_run_the_lifecycle_against_sqlite() {
    let path = std::env::temp_dir().join(format!("trackers-http-{}.db", uuid::Uuid::now_v7()));
    let app = router(
        build_state(&config(vec![
            (STORE, "sqlite".to_string()),
            (DATABASE_PATH, path.display().to_string()),
        ]))
        .unwrap(),
    );

    run_lifecycle(app).await;

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[rstest]
#[tokio::test]
async fn it_should_serve_the_same_data_over_graphql(memory_app: Router) {
    let (status, _) = send(
        &memory_app,
        "POST",
        "/api/v1/tracker",
        Some(json!({ "start": "2020-05-15T00:00:00Z", "name": "t1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &memory_app,
        "POST",
        "/gql",
        Some(json!({ "query": "{ tracker(id: 1) { id name version } }" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["tracker"],
        json!({ "id": 1, "name": "t1", "version": 1 })
    );
}
