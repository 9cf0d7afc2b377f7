//! Contract tests for SdsClient against a mocked upstream SDS API.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/sds/search/` | `search_*` |
//! | POST   | `/sds/details/` | `details_*` |
//! | POST   | `/sds/multipleDetails/` | `multiple_details_*` |
//! | POST   | `/sds/newRevisionInfo/` | `newer_revision_*` |
//! | POST   | `/sds/multipleNewRevisionInfo/` | `multiple_newer_*` |
//! | POST   | `/sds/upload/` | `upload_*` |

use sds_client::{ApiKey, Pagination, SdsApiConfig, SdsApiError, SdsClient, SearchRequest, UploadFile};
use sds_core::normalize::{BatchPayload, DetailsPayload};
use sds_core::{Checksum, InternalId};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MD5: &str = "0123456789abcdef0123456789abcdef";

fn test_client(mock_server: &MockServer) -> SdsClient {
    SdsClient::new(SdsApiConfig::local_mock(&mock_server.uri()).unwrap()).unwrap()
}

fn key() -> ApiKey {
    ApiKey::new("caller-key")
}

fn by_id(raw: u64) -> DetailsPayload {
    DetailsPayload {
        sds_id: Some(InternalId::new(raw)),
        pdf_md5: None,
        language_code: None,
    }
}

// ── POST /sds/search/ ────────────────────────────────────────────────

#[tokio::test]
async fn search_sends_pagination_body_and_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/search/"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "25"))
        .and(header("SDS-SEARCH-ACCESS-API-KEY", "caller-key"))
        .and(body_json(json!({"search": "acetone", "order_by": "-id"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{"id": 42, "product_name": "Acetone"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let req = SearchRequest {
        search: Some("acetone".into()),
        ..Default::default()
    }
    .normalized();
    let body = client
        .search(&key(), &req, Pagination { page: 2, page_size: 25 })
        .await
        .unwrap();
    assert_eq!(body["results"][0]["id"], 42);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn search_passes_through_unauthorized_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/search/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error_message": "API key expired"})),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .search(&key(), &SearchRequest::default(), Pagination::default())
        .await
        .unwrap_err();
    match err {
        SdsApiError::Unauthorized { message, .. } => assert_eq!(message, "API key expired"),
        other => panic!("expected Unauthorized, got: {other:?}"),
    }
}

// ── POST /sds/details/ ───────────────────────────────────────────────

#[tokio::test]
async fn details_sends_internal_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/details/"))
        .and(body_json(json!({"sds_id": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "sds_pdf_product_name": "Acetone"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = client.details(&key(), &by_id(42)).await.unwrap();
    assert_eq!(body["id"], 42);
}

#[tokio::test]
async fn details_maps_404_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/details/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.details(&key(), &by_id(7)).await.unwrap_err();
    assert!(matches!(err, SdsApiError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn details_maps_400_with_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/details/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error_message": "language unknown"})),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.details(&key(), &by_id(7)).await.unwrap_err();
    assert_eq!(err.upstream_message(), Some("language unknown"));
}

#[tokio::test]
async fn details_maps_server_error_to_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/details/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.details(&key(), &by_id(7)).await.unwrap_err();
    match err {
        SdsApiError::ApiError { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn details_treats_non_200_success_codes_as_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/details/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.details(&key(), &by_id(7)).await.unwrap_err();
    match err {
        SdsApiError::ApiError { status, .. } => assert_eq!(status, 204),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn details_rejects_non_json_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/details/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.details(&key(), &by_id(7)).await.unwrap_err();
    assert!(matches!(err, SdsApiError::Deserialization { .. }), "got: {err:?}");
}

// ── POST /sds/multipleDetails/ ───────────────────────────────────────

#[tokio::test]
async fn multiple_details_sends_ids_and_checksums() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/multipleDetails/"))
        .and(body_json(json!({"sds_id": [1, 2], "pdf_md5": [MD5]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let payload = BatchPayload {
        sds_id: vec![InternalId::new(1), InternalId::new(2)],
        pdf_md5: vec![Checksum::parse(MD5).unwrap()],
    };
    let body = client.multiple_details(&key(), &payload).await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

// ── POST /sds/newRevisionInfo/ ───────────────────────────────────────

#[tokio::test]
async fn newer_revision_returns_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/newRevisionInfo/"))
        .and(body_json(json!({"sds_id": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "newer": {"sds_id": 9, "revision_date": "2024-01-01"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let body = client.newer_revision(&key(), &by_id(5)).await.unwrap();
    assert_eq!(body["newer"]["sds_id"], 9);
}

// ── POST /sds/multipleNewRevisionInfo/ ───────────────────────────────

#[tokio::test]
async fn multiple_newer_revisions_hits_batch_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/multipleNewRevisionInfo/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"newer": null}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let payload = BatchPayload {
        sds_id: vec![InternalId::new(5)],
        pdf_md5: vec![],
    };
    let body = client.multiple_newer_revisions(&key(), &payload).await.unwrap();
    assert!(body[0]["newer"].is_null());
}

// ── POST /sds/upload/ ────────────────────────────────────────────────

#[tokio::test]
async fn upload_sends_multipart_with_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sds/upload/"))
        .and(header("SDS-SEARCH-ACCESS-API-KEY", "caller-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 77})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let file = UploadFile {
        file_name: "acetone.pdf".into(),
        content_type: Some("application/pdf".into()),
        bytes: b"%PDF-1.4".to_vec(),
    };
    let body = client.upload(&key(), file).await.unwrap();
    assert_eq!(body["id"], 77);

    let received = mock_server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"), "got: {content_type}");
}

#[tokio::test]
async fn connection_failure_is_http_error() {
    let client = SdsClient::new(SdsApiConfig::local_mock("http://127.0.0.1:1").unwrap()).unwrap();
    let err = client.details(&key(), &by_id(1)).await.unwrap_err();
    assert!(matches!(err, SdsApiError::Http { .. }), "got: {err:?}");
}
