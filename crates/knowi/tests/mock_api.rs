//! Mock server tests for the management client.
//!
//! These tests use wiremock to stand in for the Knowi API and check the
//! token lifecycle and request shapes without network access or real
//! credentials.

use knowi::error::{AuthError, ConfigError};
use knowi::{ApiRequest, ContentFilter, Error, FilterOperator, Knowi, ShareTarget, ShareType};
use serde_json::json;
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Knowi {
    Knowi::builder()
        .client_id("id-1")
        .client_secret("secret-1")
        .base_url(format!("http://127.0.0.1:{}/api/1.0", server.address().port()))
        .build()
        .unwrap()
}

async fn mount_token(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/1.0/auth"))
        .and(body_string_contains("client_id=id-1"))
        .and(body_string_contains("client_secret=secret-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

// ============================================================================
// Token lifecycle
// ============================================================================

#[tokio::test]
async fn test_first_call_exchanges_and_sends_bearer() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/dashboards"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    client.dashboards().list(&[]).await.unwrap();
    client.dashboards().list(&[]).await.unwrap();

    assert_eq!(client.session().exchange_count().await, 1);
}

#[tokio::test]
async fn test_invalidate_forces_new_exchange() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;
    mount_token(&server, "T2", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/kpi"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.bearer_token().await.unwrap().as_str(), "T1");

    client.invalidate_token().await;
    let body = client
        .system()
        .check(knowi::api::SystemCheck::All)
        .await
        .unwrap();
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn test_rejected_call_is_retried_once_with_fresh_token() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;
    mount_token(&server, "T2", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/queries"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1.0/queries"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let queries = client.queries().list(&[]).await.unwrap();
    assert_eq!(queries, json!([{"id": 7}]));
    assert_eq!(client.session().exchange_count().await, 2);
}

#[tokio::test]
async fn test_second_rejection_is_auth_error() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;
    mount_token(&server, "T2", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.users().list().await.unwrap_err();

    match err {
        Error::Auth(AuthError::Rejected { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "forbidden");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/dashboards/9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.dashboards().get(9).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, Error::Api(_)));
    assert!(client.session().has_token().await);
}

#[tokio::test]
async fn test_exchange_rejection_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid client"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1.0/dashboards"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.dashboards().list(&[]).await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(matches!(
        err,
        Error::Auth(AuthError::ExchangeRejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_exchange_without_token_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.bearer_token().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Auth(AuthError::MalformedExchange { .. })
    ));
    assert!(!client.session().has_token().await);
}

#[tokio::test]
async fn test_missing_secret_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = Knowi::builder()
        .client_id("id-1")
        .base_url(format!("http://127.0.0.1:{}/api/1.0", server.address().port()))
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::Missing {
            field: "client_secret"
        })
    ));
}

#[tokio::test]
async fn test_custom_auth_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "L1", "expires_in": 3600})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Knowi::builder()
        .client_id("id-1")
        .client_secret("secret-1")
        .base_url(format!("http://127.0.0.1:{}/api/1.0", server.address().port()))
        .auth_path("/login")
        .build()
        .unwrap();

    let token = client.bearer_token().await.unwrap();
    assert_eq!(token.as_str(), "L1");
    assert!(token.expires_at().is_some());
}

// ============================================================================
// Request shapes
// ============================================================================

#[tokio::test]
async fn test_raw_execute_carries_query_and_auth() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/queries/12"))
        .and(query_param("loadJoinDataSources", "true"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let body: serde_json::Value = client
        .execute_json(&ApiRequest::get("/queries/12").query_pair("loadJoinDataSources", "true"))
        .await
        .unwrap();
    assert_eq!(body["id"], 12);
}

#[tokio::test]
async fn test_dashboard_share_sends_share_properties() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("PUT"))
        .and(path("/api/1.0/dashboards/5/share"))
        .and(body_json(json!({
            "shareProperties": [
                {"type": "Users", "name": "ann@example.com", "access_level": 2},
                {"type": "Groups", "id": 44, "access_level": 1}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .dashboards()
        .share(
            5,
            &[
                ShareTarget::user("ann@example.com", knowi::AccessLevel::View),
                ShareTarget::group(44, knowi::AccessLevel::Edit),
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_secure_share_url_is_absolute() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/1.0/dashboards/5/share/url/secure"))
        .and(body_string_contains("contentFilters="))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"secureShareUrl": "s3cr3t"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let filters = [ContentFilter::new(
        "Region",
        FilterOperator::Equals,
        ["East"],
    )];
    let link = client
        .dashboards()
        .share_url(5, ShareType::Secure, &filters)
        .await
        .unwrap();

    assert_eq!(link.token, "s3cr3t");
    assert_eq!(
        link.url,
        format!("http://127.0.0.1:{}/share/secure/s3cr3t", server.address().port())
    );
}

#[tokio::test]
async fn test_share_url_keeps_site_path_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/knowi/api/1.0/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "T1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/knowi/api/1.0/widgets/3/share/url"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"shareUrl": "w1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Knowi::builder()
        .client_id("id-1")
        .client_secret("secret-1")
        .base_url(format!(
            "http://127.0.0.1:{}/knowi/api/1.0",
            server.address().port()
        ))
        .build()
        .unwrap();
    let link = client
        .widgets()
        .share_url(3, ShareType::Simple, &[])
        .await
        .unwrap();

    assert_eq!(
        link.url,
        format!("http://127.0.0.1:{}/knowi/w/w1", server.address().port())
    );
}

#[tokio::test]
async fn test_pdf_export_keeps_filename() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/dashboards/5/export/pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"Sales.pdf\"")
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let pdf = client.dashboards().export_pdf(5).await.unwrap();

    assert_eq!(pdf.filename.as_deref(), Some("Sales.pdf"));
    assert_eq!(pdf.bytes, b"%PDF-1.4");
}

#[tokio::test]
async fn test_dataset_csv_is_returned_as_text() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", 1).await;

    Mock::given(method("GET"))
        .and(path("/api/1.0/datasets"))
        .and(query_param("entityName", "Sales"))
        .and(query_param("exportFormat", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("region,total\nEast,10\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let mut query = knowi::api::DatasetQuery::by_name("Sales");
    query.export_format = knowi::api::ExportFormat::Csv;
    let data = client.datasets().get_data(&query).await.unwrap();

    assert_eq!(
        data,
        knowi::api::DatasetData::Csv("region,total\nEast,10\n".to_string())
    );
}

#[tokio::test]
async fn test_invalid_input_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .dashboards()
        .create(" ", Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
