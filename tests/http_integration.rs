//! Integration tests for the HTTP client and resource layer using wiremock
//!
//! These tests drive real `HttpClient` requests against mocked appliance
//! endpoints, covering headers, error mapping, pagination and CRUD.

use cloudres::client::{HttpClient, RequestOptions, RestClient};
use cloudres::resource::{find_with_pagination, ResourceDescriptor};
use cloudres::{ClientError, Resource, ResourceError};
use serde_json::{json, Map};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn networks() -> Arc<ResourceDescriptor> {
    Arc::new(ResourceDescriptor::new("ethernet-networks", "/rest/ethernet-networks"))
}

fn client_for(server: &MockServer) -> Arc<dyn RestClient> {
    Arc::new(
        HttpClient::new(&server.uri(), 800)
            .expect("client should build")
            .with_token("session-token"),
    )
}

/// Test module for HTTP client integration tests
mod http_client_tests {
    use super::*;

    /// Test successful GET request sends version and auth headers
    #[tokio::test]
    async fn test_get_sends_headers_and_parses_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/version"))
            .and(header("X-API-Version", "800"))
            .and(header("Auth", "session-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"currentVersion": 800})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .rest_get("/rest/version", RequestOptions::default())
            .await
            .expect("Request should succeed");
        let body = client.response_handler(response).expect("Should parse JSON");

        assert_eq!(body["currentVersion"], 800);
    }

    /// Test per-request headers are forwarded
    #[tokio::test]
    async fn test_request_headers_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/tasks"))
            .and(header("If-None-Match", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut headers = cloudres::client::Headers::new();
        headers.insert("If-None-Match".to_string(), "abc".to_string());

        let response = client
            .rest_get("/rest/tasks", RequestOptions::with_headers(headers))
            .await
            .expect("Request should succeed");
        assert_eq!(response.status, 200);
    }

    /// Test 404 response becomes a status error carrying the appliance message
    #[tokio::test]
    async fn test_404_maps_to_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/ethernet-networks/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errorCode": "RESOURCE_NOT_FOUND",
                "message": "The resource was not found"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .rest_get("/rest/ethernet-networks/missing", RequestOptions::default())
            .await
            .expect("Request should complete");
        let err = client.response_handler(response).unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 404, .. }));
        assert!(err.to_string().contains("The resource was not found"));
    }

    /// Test empty response handling
    #[tokio::test]
    async fn test_empty_response_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/fc-networks/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .rest_delete("/rest/fc-networks/1", RequestOptions::default())
            .await
            .expect("Request should succeed");

        assert!(client.response_handler(response).unwrap().is_null());
    }
}

/// Resource operations over real HTTP
mod resource_tests {
    use super::*;

    /// Test pagination follows nextPageUri and stops on a self link
    #[tokio::test]
    async fn test_pagination_follows_next_page_uri() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/ethernet-networks"))
            .and(query_param_is_missing("start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "/rest/ethernet-networks",
                "members": [{"name": "net-1"}, {"name": "net-2"}],
                "nextPageUri": "/rest/ethernet-networks?start=2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/ethernet-networks"))
            .and(query_param("start", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "/rest/ethernet-networks?start=2",
                "members": [{"name": "net-3"}],
                "nextPageUri": "/rest/ethernet-networks?start=2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let members = find_with_pagination(
            client.as_ref(),
            "/rest/ethernet-networks",
            &Default::default(),
        )
        .await
        .expect("Pagination should succeed");

        let names: Vec<&str> = members.iter().filter_map(|m| m["name"].as_str()).collect();
        assert_eq!(names, ["net-1", "net-2", "net-3"]);
    }

    /// Test retrieve issues a server-side name filter
    #[tokio::test]
    async fn test_retrieve_by_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/ethernet-networks"))
            .and(query_param("name", "prod"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "/rest/ethernet-networks?name=prod",
                "members": [{"name": "prod", "uri": "/rest/ethernet-networks/7", "vlanId": 7}],
                "nextPageUri": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut network = Resource::new(client, networks(), &json!({"name": "prod"})).unwrap();

        assert!(network.retrieve(None).await.unwrap());
        assert_eq!(network.uri(), Some("/rest/ethernet-networks/7"));
        assert_eq!(network["vlanId"], 7);
    }

    /// Test array filters travel as one quoted token
    #[tokio::test]
    async fn test_find_by_array_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/ethernet-networks"))
            .and(query_param("vlanId", "'1,2'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "/rest/ethernet-networks",
                "members": [{"name": "a", "vlanId": 1}, {"name": "b", "vlanId": 2}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut filter = Map::new();
        filter.insert("vlanId".to_string(), json!([1, 2]));

        let found = Resource::find_by(&client, &networks(), &filter, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    /// Test full create, update and delete lifecycle
    #[tokio::test]
    async fn test_create_update_delete() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/ethernet-networks"))
            .and(body_json(json!({"name": "lab", "vlanId": 42})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "lab",
                "vlanId": 42,
                "uri": "/rest/ethernet-networks/lab-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/rest/ethernet-networks/lab-1"))
            .and(body_json(json!({
                "name": "lab",
                "vlanId": 42,
                "uri": "/rest/ethernet-networks/lab-1",
                "description": "lab network"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "/rest/ethernet-networks/lab-1",
                "eTag": "2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/rest/ethernet-networks/lab-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut network =
            Resource::new(client, networks(), &json!({"name": "lab", "vlanId": 42})).unwrap();

        network.create(None).await.unwrap();
        assert_eq!(network.uri(), Some("/rest/ethernet-networks/lab-1"));

        network
            .update(&json!({"description": "lab network"}), None)
            .await
            .unwrap();
        assert_eq!(network["eTag"], "2");

        assert!(network.delete(None).await.unwrap());
    }

    /// Test server errors propagate out of resource operations
    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/ethernet-networks/1"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"message": "Appliance busy"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut network =
            Resource::new(client, networks(), &json!({"uri": "/rest/ethernet-networks/1"}))
                .unwrap();

        let err = network.refresh(None).await.unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Client(ClientError::Status { status: 503, .. })
        ));
    }
}
