//! Integration tests for the scrape endpoint
//!
//! These tests use wiremock to stand in for the catalog site and drive the
//! axum router directly, covering the full request cycle end-to-end.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use catalog_enricher::config::{FetcherConfig, PacingConfig};
use catalog_enricher::crawler::{Coordinator, FlipkartParser, HeaderProfile, HttpFetcher};
use catalog_enricher::server::{build_app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds the router with real HTTP fetching and no pacing delays
fn create_test_app() -> Router {
    let fetcher = HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build client");
    let parser = FlipkartParser::new().expect("Failed to build parser");
    let coordinator = Coordinator::new(
        Arc::new(fetcher),
        Arc::new(parser),
        HeaderProfile::browser(),
        PacingConfig::immediate(),
    );
    build_app(AppState::new(coordinator, 5))
}

/// Renders a search page with one card per (slug, name, price)
fn search_page(items: &[(&str, &str, u32)]) -> String {
    let cards: String = items
        .iter()
        .map(|(slug, name, price)| {
            format!(
                r#"<div data-id="{slug}">
                     <a href="/{slug}/p/itm">
                       <img class="DByuf4" src="/img/{slug}.jpg" alt="{name}">
                       <div class="KzDlHZ">{name}</div>
                       <div class="Nx9bqj">₹{price}</div>
                       <div class="yRaY8j">₹{original}</div>
                     </a>
                   </div>"#,
                slug = slug,
                name = name,
                price = price,
                original = price + 1000,
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

fn detail_page(name: &str, pid: &str) -> String {
    format!(
        r#"<html><head>
             <link rel="canonical" href="https://www.flipkart.com/x/p/itm?pid={pid}">
           </head><body>
             <h1><span class="VU-ZEz">{name}</span></h1>
             <div class="XQDdHH">4.2</div>
             <div class="xFVion"><ul><li>Fast</li><li>Light</li></ul></div>
             <button class="QqFHMw">BUY NOW</button>
           </body></html>"#,
        name = name,
        pid = pid,
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_search(server: &MockServer, items: &[(&str, &str, u32)]) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(search_page(items)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, name: &str, pid: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/p/itm", slug)))
        .respond_with(html(detail_page(name, pid)))
        .expect(1)
        .mount(server)
        .await;
}

async fn post_scrape(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request");

    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = serde_json::from_slice(&bytes).expect("Body is not JSON");
    (status, json)
}

fn error_logs(body: &Value) -> Vec<String> {
    body["logs"]
        .as_array()
        .expect("logs should be an array")
        .iter()
        .filter(|entry| entry["level"] == "error")
        .map(|entry| entry["message"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_failed_item_is_degraded_not_dropped() {
    let mock_server = MockServer::start().await;
    let items = [("alpha", "Alpha Phone", 1000), ("beta", "Beta Phone", 2000), ("gamma", "Gamma Phone", 3000)];
    mount_search(&mock_server, &items).await;
    mount_detail(&mock_server, "alpha", "Alpha Phone", "PIDA").await;
    mount_detail(&mock_server, "gamma", "Gamma Phone", "PIDG").await;
    Mock::given(method("GET"))
        .and(path("/beta/p/itm"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/search", mock_server.uri());
    let (status, body) = post_scrape(create_test_app(), json!({ "url": url })).await;

    assert_eq!(status, StatusCode::OK);
    let products = body["products"].as_array().expect("products should be an array");
    assert_eq!(products.len(), 3);

    let names: Vec<_> = products.iter().map(|p| p["product_name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Alpha Phone", "Beta Phone", "Gamma Phone"]);

    assert_eq!(products[0]["product_id"], "PIDA");
    assert_eq!(products[0]["in_stock"], true);
    assert_eq!(products[0]["highlights"], json!(["Fast", "Light"]));

    let beta = &products[1];
    assert_eq!(beta["current_price"], 2000);
    assert_eq!(beta["original_price"], 3000);
    assert_eq!(beta["product_link"], format!("{}/beta/p/itm", mock_server.uri()));
    assert_eq!(beta["thumbnail"], format!("{}/img/beta.jpg", mock_server.uri()));
    assert_eq!(beta["highlights"], json!([]));
    assert!(beta["product_id"].is_null());
    assert!(beta["in_stock"].is_null());
    assert!(beta["rating"].is_null());

    assert_eq!(products[2]["product_id"], "PIDG");

    let errors = error_logs(&body);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Beta Phone"));

    let messages: Vec<_> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages.first().unwrap(), &format!("Scraping URL: {}", url));
    assert_eq!(messages.last().unwrap(), "Scraping complete.");
}

#[tokio::test]
async fn test_limit_bounds_detail_fetches() {
    let mock_server = MockServer::start().await;
    let items = [
        ("one", "One", 100),
        ("two", "Two", 200),
        ("three", "Three", 300),
        ("four", "Four", 400),
        ("five", "Five", 500),
    ];
    mount_search(&mock_server, &items).await;
    mount_detail(&mock_server, "one", "One", "P1").await;
    mount_detail(&mock_server, "two", "Two", "P2").await;
    for slug in ["three", "four", "five"] {
        Mock::given(method("GET"))
            .and(path(format!("/{}/p/itm", slug)))
            .respond_with(html(detail_page(slug, "never")))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let url = format!("{}/search", mock_server.uri());
    let (status, body) = post_scrape(create_test_app(), json!({ "url": url, "limit": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert!(error_logs(&body).is_empty());
}

#[tokio::test]
async fn test_string_limit_is_accepted() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, &[("one", "One", 100), ("two", "Two", 200)]).await;
    mount_detail(&mock_server, "one", "One", "P1").await;

    let url = format!("{}/search", mock_server.uri());
    let (status, body) = post_scrape(create_test_app(), json!({ "url": url, "limit": "1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_page_failure_returns_500_with_logs() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let url = format!("{}/search", mock_server.uri());
    let (status, body) = post_scrape(create_test_app(), json!({ "url": url })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("products").is_none());
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert!(!body["logs"].as_array().unwrap().is_empty());
    assert_eq!(error_logs(&body).len(), 1);
}

#[tokio::test]
async fn test_blocked_search_page_logs_response_before_failing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string("Access Denied by bot wall")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/search", mock_server.uri());
    let (status, body) = post_scrape(create_test_app(), json!({ "url": url })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let messages: Vec<_> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages[1], "Response status: 403");
    assert_eq!(messages[2], "Response content-type: text/html");
    assert_eq!(messages[3], "Response length: 25 characters");
    assert_eq!(messages[4], "Response preview: Access Denied by bot wall");
    assert_eq!(
        error_logs(&body),
        [format!("Scraping failed: HTTP 403 for {}", url)]
    );
}

#[tokio::test]
async fn test_unreachable_search_page_returns_500() {
    let (status, body) =
        post_scrape(create_test_app(), json!({ "url": "http://127.0.0.1:1/search" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_logs(&body)[0].starts_with("Scraping failed: "));
}

#[tokio::test]
async fn test_requests_carry_browser_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header_exists("user-agent"))
        .and(header_eq("sec-fetch-mode", "navigate"))
        .and(header_eq("sec-fetch-user", "?1"))
        .and(header_eq("upgrade-insecure-requests", "1"))
        .respond_with(html(search_page(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/search", mock_server.uri());
    let (status, body) = post_scrape(create_test_app(), json!({ "url": url })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"], json!([]));
}

#[tokio::test]
async fn test_missing_url_is_rejected() {
    let (status, body) = post_scrape(create_test_app(), json!({ "limit": 3 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing 'url' in request body" }));
}

#[tokio::test]
async fn test_invalid_limit_is_rejected() {
    for limit in [json!(0), json!(-4), json!("ten")] {
        let (status, body) = post_scrape(
            create_test_app(),
            json!({ "url": "https://www.flipkart.com/search?q=x", "limit": limit }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "'limit' must be a positive integer" }));
    }
}

#[tokio::test]
async fn test_body_without_json_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/scrape")
        .body(Body::from("url=https://example.com"))
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Missing 'url' in request body");
}

#[tokio::test]
async fn test_index_describes_service() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = create_test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Flipkart Scraper API");
    assert_eq!(body["status"], "Running");
    assert!(body["endpoints"]["POST /scrape"].is_string());
}
