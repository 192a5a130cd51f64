/// Integration tests for the REST lead store against a mocked backend
/// Checks request shape (paths, filters, headers) and error pass-through
use lead_desk_api::errors::AppError;
use lead_desk_api::models::{LeadChanges, LeadStatus, NewLead};
use lead_desk_api::store::{LeadStore, RestLeadStore};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "anon-test-key";

/// Helper function to create a store pointing at the mock server
fn create_test_store(mock_server: &MockServer) -> RestLeadStore {
    RestLeadStore::new(
        format!("{}/", mock_server.uri()),
        API_KEY.to_string(),
        "leads".to_string(),
    )
    .unwrap()
}

fn row(id: Uuid, name: &str, status: &str, created_at: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "company": null,
        "status": status,
        "created_at": created_at,
        "updated_at": created_at
    })
}

#[tokio::test]
async fn test_list_requests_newest_first_with_credentials() {
    let mock_server = MockServer::start().await;
    let newer = Uuid::new_v4();
    let older = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/leads"))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", API_KEY))
        .and(header("Authorization", format!("Bearer {}", API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            row(newer, "Bob", "contacted", "2024-05-02T10:00:00Z"),
            row(older, "Ann", "new", "2024-05-01T10:00:00Z"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let leads = create_test_store(&mock_server).list().await.unwrap();

    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].id, newer);
    assert_eq!(leads[0].status, LeadStatus::Contacted);
    assert_eq!(leads[1].company, None);
}

#[tokio::test]
async fn test_insert_sends_explicit_null_company_and_returns_row() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/leads"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(serde_json::json!({
            "name": "Ann",
            "email": "ann@example.com",
            "company": null,
            "status": "new"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!([row(
                id,
                "Ann",
                "new",
                "2024-05-01T10:00:00Z"
            )])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let lead = create_test_store(&mock_server)
        .insert(&NewLead {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            company: None,
            status: LeadStatus::New,
        })
        .await
        .unwrap();

    assert_eq!(lead.id, id);
    assert_eq!(lead.name, "Ann");
}

#[tokio::test]
async fn test_update_filters_by_id() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/leads"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .and(body_json(serde_json::json!({
            "name": "Ann",
            "email": "ann@example.com",
            "company": "Acme",
            "status": "converted"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([row(
                id,
                "Ann",
                "converted",
                "2024-05-01T10:00:00Z"
            )])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let changes = LeadChanges {
        name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        company: Some("Acme".to_string()),
        status: LeadStatus::Converted,
    };
    create_test_store(&mock_server)
        .update(id, &changes)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_of_missing_row_is_not_found() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/leads"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let err = create_test_store(&mock_server).delete(id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_store_error_message_is_passed_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/leads"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"leads_email_key\""
        })))
        .mount(&mock_server)
        .await;

    let err = create_test_store(&mock_server)
        .insert(&NewLead {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            company: None,
            status: LeadStatus::New,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.message(),
        "duplicate key value violates unique constraint \"leads_email_key\""
    );
}

#[tokio::test]
async fn test_unstructured_error_body_includes_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/leads"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let err = create_test_store(&mock_server).list().await.unwrap_err();

    assert!(matches!(err, AppError::StoreError(_)));
    assert!(err.message().contains("503"));
    assert!(err.message().contains("upstream unavailable"));
}
