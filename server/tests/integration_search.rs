use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use webindex_core::SharedIndex;

fn tiny_index() -> Arc<SharedIndex> {
    let index = Arc::new(SharedIndex::new());
    let words = |text: &str| -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    };
    index.add_all(&words("cat dog cat"), "a.html", 1);
    index.add_all(&words("dog dove"), "b.html", 1);
    index
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn exact_search_returns_ranked_results() {
    let app = webindex_server::build_app(tiny_index());
    let (status, json) = call(app, "/search?q=cat&exact=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["queries"], "cat");
    assert_eq!(json["total_hits"], 1);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["where"], "a.html");
    assert_eq!(results[0]["count"], 2);
    assert_eq!(results[0]["index"], 1);
}

#[tokio::test]
async fn prefix_search_is_the_default_mode() {
    let app = webindex_server::build_app(tiny_index());
    let (status, json) = call(app, "/search?q=do").await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    // b.html folds dog and dove, so it outranks a.html.
    assert_eq!(results[0]["where"], "b.html");
    assert_eq!(results[0]["count"], 2);
}

#[tokio::test]
async fn blank_query_yields_no_hits() {
    let app = webindex_server::build_app(tiny_index());
    let (status, json) = call(app, "/search?q=%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"], 0);
}

#[tokio::test]
async fn stats_reports_word_count() {
    let app = webindex_server::build_app(tiny_index());
    let (status, json) = call(app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["words"], 3);
    assert_eq!(json["empty"], false);
}
