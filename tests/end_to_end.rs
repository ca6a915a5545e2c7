//! End-to-end tests against a live server over HTTP.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

async fn call(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: String,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut req = client.request(method, url);
    if let Some(body) = body {
        req = req.json(&body);
    }
    let res = req.send().await.expect("server unreachable");
    let status = res.status();
    (status, res.text().await.unwrap())
}

#[tokio::test]
async fn test_create_then_get() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");

    let (status, body) = call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/"),
        Some(json!({"id":"1","name":"A","email":"a@x.com"})),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "{}"));

    let res = http.get(format!("{base}/customers/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(
        res.text().await.unwrap(),
        r#"{"customer":{"id":"1","name":"A","email":"a@x.com"}}"#
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_customer_is_404() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();

    let (status, body) = call(
        &http,
        reqwest::Method::GET,
        format!("http://{addr}/customers/missing"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"not found"}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_add_then_get_address() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");

    call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/"),
        Some(json!({"id":"1","name":"A","email":"a@x.com"})),
    )
    .await;

    let (status, body) = call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/1/addresses/"),
        Some(json!({"id":"a1","location":"Home"})),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "{}"));

    let (status, body) = call(
        &http,
        reqwest::Method::GET,
        format!("{base}/customers/1/addresses/a1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"address":{"id":"a1","location":"Home"}}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_error_status_mapping() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");
    let customer = json!({"id":"1","name":"A","email":"a@x.com"});

    call(&http, reqwest::Method::POST, format!("{base}/customers/"), Some(customer.clone())).await;

    let (status, body) =
        call(&http, reqwest::Method::POST, format!("{base}/customers/"), Some(customer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"already exists"}"#);

    let (status, body) = call(
        &http,
        reqwest::Method::PUT,
        format!("{base}/customers/1"),
        Some(json!({"id":"2","name":"B","email":"b@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"inconsistent IDs"}"#);

    let (status, body) = call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/"),
        Some(json!({"id":"3","name":"C"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"missing required field: email"}"#);

    let res = http
        .post(format!("{base}/customers/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_update_merges_non_empty_fields() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");

    call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/"),
        Some(json!({"id":"1","name":"A","email":"a@x.com","phone":"555"})),
    )
    .await;

    let (status, _) = call(
        &http,
        reqwest::Method::PATCH,
        format!("{base}/customers/1"),
        Some(json!({"name":"","email":"new@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&http, reqwest::Method::GET, format!("{base}/customers/1"), None).await;
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({"customer":{"id":"1","name":"A","email":"new@x.com","phone":"555"}})
    );

    let (status, _) = call(
        &http,
        reqwest::Method::PATCH,
        format!("{base}/customers/nope"),
        Some(json!({"name":"Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_address_lifecycle_preserves_order() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");

    call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/"),
        Some(json!({"id":"1","name":"A","email":"a@x.com"})),
    )
    .await;

    let (_, body) =
        call(&http, reqwest::Method::GET, format!("{base}/customers/1/addresses/"), None).await;
    assert_eq!(body, r#"{"addresses":[]}"#);

    for id in ["a", "b", "c"] {
        call(
            &http,
            reqwest::Method::POST,
            format!("{base}/customers/1/addresses/"),
            Some(json!({"id": id, "location": format!("L{id}")})),
        )
        .await;
    }

    let (status, body) = call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/1/addresses/"),
        Some(json!({"id":"b","location":"elsewhere"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"already exists"}"#);

    let (status, _) = call(
        &http,
        reqwest::Method::DELETE,
        format!("{base}/customers/1/addresses/b"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &http,
        reqwest::Method::DELETE,
        format!("{base}/customers/1/addresses/b"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) =
        call(&http, reqwest::Method::GET, format!("{base}/customers/1/addresses/"), None).await;
    assert_eq!(
        body,
        r#"{"addresses":[{"id":"a","location":"La"},{"id":"c","location":"Lc"}]}"#
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_percent_encoded_ids() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");

    call(
        &http,
        reqwest::Method::POST,
        format!("{base}/customers/"),
        Some(json!({"id":"a b/c","name":"A","email":"a@x.com"})),
    )
    .await;

    let (status, body) =
        call(&http, reqwest::Method::GET, format!("{base}/customers/a%20b%2Fc"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":"a b/c""#));

    let (status, _) =
        call(&http, reqwest::Method::DELETE, format!("{base}/customers/a%20b%2Fc"), None).await;
    assert_eq!(status, StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_operations_on_missing_customer_are_404() {
    let (addr, shutdown) = common::start_server().await;
    let http = common::http();
    let base = format!("http://{addr}");

    let cases = [
        (reqwest::Method::DELETE, "/customers/x", None),
        (reqwest::Method::GET, "/customers/x/addresses/", None),
        (reqwest::Method::GET, "/customers/x/addresses/a", None),
        (
            reqwest::Method::POST,
            "/customers/x/addresses/",
            Some(json!({"id":"a","location":"L"})),
        ),
        (reqwest::Method::DELETE, "/customers/x/addresses/a", None),
    ];
    for (method, path, body) in cases {
        let (status, text) = call(&http, method, format!("{base}{path}"), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(text, r#"{"error":"not found"}"#);
    }

    shutdown.trigger();
}
