//! End-to-end tests against a mocked Workday upstream.
//!
//! Each test mounts the OAuth token endpoint and the jobPostings endpoint
//! on a wiremock server and drives the real client at it. Call counts are
//! asserted through mock expectations, verified when the server drops.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobfeed_models::{AggregationRequest, PageRequest};
use jobfeed_workday::{TokenCache, WorkdayClient, WorkdayConfig, WorkdayError};

// =============================================================================
// Helpers
// =============================================================================

fn test_config(server: &MockServer) -> WorkdayConfig {
    WorkdayConfig {
        token_url: format!("{}/token", server.uri()),
        endpoint: server.uri(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        refresh_token: "refresh-token".to_string(),
        upstream_site_filter: false,
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
    }
}

fn client(server: &MockServer) -> WorkdayClient {
    WorkdayClient::new(test_config(server)).unwrap()
}

/// Mount a token endpoint answering every exchange with the same token.
async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn posting(id: u32) -> Value {
    json!({"id": format!("P-{}", id), "title": format!("Posting {}", id)})
}

fn site_posting(id: u32, site: &str) -> Value {
    json!({"id": format!("P-{}", id), "jobSite": {"id": site}})
}

fn postings(start: u32, count: u32) -> Vec<Value> {
    (start..start + count).map(posting).collect()
}

fn posting_id(page: &jobfeed_models::Page, index: usize) -> String {
    page.items[index].0["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Token lifecycle
// =============================================================================

#[tokio::test]
async fn test_token_reused_within_expiry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("refresh_token=refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": postings(0, 3)})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    client.fetch_page(&PageRequest::new(10, 0)).await.unwrap();
    client.fetch_page(&PageRequest::new(10, 0)).await.unwrap();
}

#[tokio::test]
async fn test_token_refreshed_after_margin() {
    let server = MockServer::start().await;

    // First exchange hands out a token that is already inside the 300s
    // refresh margin, so the next request must exchange again.
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "expires_in": 60
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(header("Authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.fetch_page(&PageRequest::new(10, 0)).await.unwrap();
    client.fetch_page(&PageRequest::new(10, 0)).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_cold_start_coalesces_to_one_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(TokenCache::new(reqwest::Client::new(), test_config(&server)));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move { cache.get_token().await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "test-token");
    }
}

#[tokio::test]
async fn test_malformed_token_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": ""})),
        )
        .mount(&server)
        .await;

    let client = client(&server);

    // Missing access_token field.
    let err = client.fetch_page(&PageRequest::new(10, 0)).await.unwrap_err();
    assert!(matches!(err, WorkdayError::MalformedAuthResponse { .. }));

    // Present but empty access_token.
    let err = client.fetch_page(&PageRequest::new(10, 0)).await.unwrap_err();
    assert!(matches!(err, WorkdayError::MalformedAuthResponse { .. }));
}

// =============================================================================
// Page fetching
// =============================================================================

#[tokio::test]
async fn test_bare_array_body_normalizes() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([posting(1), posting(2)])))
        .mount(&server)
        .await;

    let page = client(&server)
        .fetch_page(&PageRequest::new(10, 0))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 2);
    assert_eq!(page.declared_total, None);
    assert_eq!(page.fetched, 2);
}

#[tokio::test]
async fn test_unfiltered_total_prefers_declared() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobPostings": postings(0, 5),
            "total": 42
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .fetch_page(&PageRequest::new(5, 0))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 42);
    assert_eq!(page.declared_total, Some(42));
}

#[tokio::test]
async fn test_site_filter_reports_post_filter_total() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                site_posting(1, "X"),
                site_posting(2, "Y"),
                site_posting(3, "X"),
                site_posting(4, "Z"),
                posting(5)
            ],
            "total": 5
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .fetch_page(&PageRequest::new(10, 0).with_job_site("X"))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 2, "filtered total is the post-filter count");
    assert_eq!(page.fetched, 5, "cursor math still sees the raw count");
    assert!(page.items.iter().all(|p| p.matches_site("X")));
}

#[tokio::test]
async fn test_limit_clamped_to_upstream_cap() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.fetch_page(&PageRequest::new(500, 0)).await.unwrap();
    client.fetch_page(&PageRequest::new(0, 0)).await.unwrap();
}

#[tokio::test]
async fn test_endpoint_trailing_slash_trimmed() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.endpoint = format!("{}/", server.uri());
    let client = WorkdayClient::new(config).unwrap();

    client.fetch_page(&PageRequest::new(10, 0)).await.unwrap();
}

#[tokio::test]
async fn test_upstream_site_filter_forwards_param() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("jobSite", "alpha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [site_posting(1, "alpha"), site_posting(2, "beta")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.upstream_site_filter = true;
    let client = WorkdayClient::new(config).unwrap();

    let page = client
        .fetch_page(&PageRequest::new(10, 0).with_job_site("alpha"))
        .await
        .unwrap();

    // Client-side filtering still applies on top of the upstream filter.
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_fetch_page_idempotent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("limit", "3"))
        .and(query_param("offset", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobPostings": postings(6, 3),
            "total": 30
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let request = PageRequest::new(3, 6);

    let first = client.fetch_page(&request).await.unwrap();
    let second = client.fetch_page(&request).await.unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_aggregate_stops_on_declared_total() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    for offset in [0u32, 10, 20] {
        Mock::given(method("GET"))
            .and(path("/jobPostings"))
            .and(query_param("offset", offset.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobPostings": postings(offset, 10),
                "total": 30
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let page = client(&server)
        .aggregate(&AggregationRequest {
            max_jobs: 100,
            page_size: 10,
            initial_offset: 0,
            job_site_id: None,
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 30);
    assert_eq!(page.total, 30);
    assert_eq!(posting_id(&page, 0), "P-0");
    assert_eq!(posting_id(&page, 29), "P-29");
}

#[tokio::test]
async fn test_aggregate_stops_on_short_page() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    for (offset, count) in [(0u32, 10u32), (10, 10), (20, 5)] {
        Mock::given(method("GET"))
            .and(path("/jobPostings"))
            .and(query_param("offset", offset.to_string().as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": postings(offset, count)})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let page = client(&server)
        .aggregate(&AggregationRequest {
            max_jobs: 100,
            page_size: 10,
            initial_offset: 0,
            job_site_id: None,
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 25);
    assert_eq!(page.total, 25);
    assert_eq!(page.fetched, 25);
}

#[tokio::test]
async fn test_aggregate_stops_on_empty_page() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": postings(0, 10)})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .aggregate(&AggregationRequest {
            max_jobs: 50,
            page_size: 10,
            initial_offset: 0,
            job_site_id: None,
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 10);
}

#[tokio::test]
async fn test_aggregate_caps_at_max_jobs() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // 1000-item corpus; 250 requested. The third request must ask for the
    // 50-item remainder, and no fourth request is allowed.
    for (limit, offset, count) in [(100u32, 0u32, 100u32), (100, 100, 100), (50, 200, 50)] {
        Mock::given(method("GET"))
            .and(path("/jobPostings"))
            .and(query_param("limit", limit.to_string().as_str()))
            .and(query_param("offset", offset.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobPostings": postings(offset, count),
                "total": 1000
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let page = client(&server)
        .aggregate(&AggregationRequest::new(250))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 250);
    assert_eq!(page.total, 1000, "declared corpus total is surfaced");
    assert_eq!(posting_id(&page, 0), "P-0");
    assert_eq!(posting_id(&page, 249), "P-249");
}

#[tokio::test]
async fn test_aggregate_page_budget_bounds_requests() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // Every page has one posting, never matching the filter. The loop may
    // only spend ceil(2/1) + 2 = 4 page requests.
    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [site_posting(1, "real")]})),
        )
        .expect(4)
        .mount(&server)
        .await;

    let page = client(&server)
        .aggregate(&AggregationRequest {
            max_jobs: 2,
            page_size: 1,
            initial_offset: 0,
            job_site_id: Some("ghost".to_string()),
        })
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.fetched, 4);
}

#[tokio::test]
async fn test_aggregate_advances_offset_by_prefilter_count() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // Two raw items per page, one matching. The offsets requested must be
    // 0, 2, 4, 6: raw counts, not post-filter counts.
    for offset in [0u32, 2, 4] {
        Mock::given(method("GET"))
            .and(path("/jobPostings"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", offset.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [site_posting(offset, "alpha"), site_posting(offset + 1, "other")]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "6"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [site_posting(6, "alpha")]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .aggregate(&AggregationRequest {
            max_jobs: 4,
            page_size: 2,
            initial_offset: 0,
            job_site_id: Some("alpha".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 4);
    assert_eq!(page.total, 4);
    assert_eq!(page.fetched, 7);
}

// =============================================================================
// Error propagation
// =============================================================================

#[tokio::test]
async fn test_auth_failure_aborts_before_any_jobs_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"error":"server_error"}"#),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .aggregate(&AggregationRequest::new(250))
        .await
        .unwrap_err();

    match err {
        WorkdayError::UpstreamAuth { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("server_error"));
        }
        other => panic!("expected UpstreamAuth, got {:?}", other),
    }
}

#[tokio::test]
async fn test_jobs_error_propagates_unmodified() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden by tenant policy"))
        .mount(&server)
        .await;

    let client = client(&server);

    let err = client.fetch_page(&PageRequest::new(10, 0)).await.unwrap_err();
    match err {
        WorkdayError::UpstreamRequest { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("forbidden by tenant policy"));
        }
        other => panic!("expected UpstreamRequest, got {:?}", other),
    }

    // The same failure surfaces identically through an aggregation.
    let err = client
        .aggregate(&AggregationRequest::new(250))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkdayError::UpstreamRequest { status: 403, .. }));
}

#[tokio::test]
async fn test_invalid_json_body_is_an_error_not_empty() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/jobPostings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_page(&PageRequest::new(10, 0))
        .await
        .unwrap_err();

    match err {
        WorkdayError::MalformedResponseBody { body } => {
            assert!(body.contains("<html>gateway timeout</html>"));
        }
        other => panic!("expected MalformedResponseBody, got {:?}", other),
    }
}
