//! Lifecycle tests for `azurerm_servicebus_rule` against a mocked ARM endpoint
//!
//! These tests drive the provider end to end through wiremock, covering
//! create, read, update, delete and import, plus the not-found paths.

use sbrule::azure::auth::ArmCredentials;
use sbrule::azure::client::{ArmClient, DEFAULT_API_VERSION};
use sbrule::azure::http::ApiError;
use sbrule::resource::{get_resource, IdError, ResourceData};
use sbrule::Provider;
use serde_json::{json, Map, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TYPE_NAME: &str = "azurerm_servicebus_rule";
const RULE_PATH: &str = "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.ServiceBus/namespaces/ns-1/topics/topic-1/subscriptions/sub-a/rules/rule-1";

fn provider(server: &MockServer) -> Provider {
    let credentials = ArmCredentials::new("test-token").unwrap();
    let client = ArmClient::new(&server.uri(), "sub-1", DEFAULT_API_VERSION, credentials).unwrap();
    Provider::new(client)
}

fn rule_config() -> Map<String, Value> {
    json!({
        "name": "rule-1",
        "namespace_name": "ns-1",
        "topic_name": "topic-1",
        "subscription_name": "sub-a",
        "resource_group_name": "rg-1",
        "filtertype": "SqlFilter",
        "sqlexpression": "priority > 5",
        "max_delivery_count": 10,
        "default_message_ttl": "P14D"
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn rule_response() -> Value {
    json!({
        "id": RULE_PATH,
        "name": "rule-1",
        "type": "Microsoft.ServiceBus/Namespaces/Topics/Subscriptions/Rules",
        "properties": {
            "action": {},
            "filterType": "SqlFilter",
            "sqlFilter": {
                "sqlExpression": "priority > 5",
                "compatibilityLevel": 20
            }
        }
    })
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {
            "code": "MessagingEntityNotFound",
            "message": "Entity 'rule-1' was not found."
        }
    }))
}

mod create_tests {
    use super::*;

    /// Read-after-create reports the identifying fields it was created with
    #[tokio::test]
    async fn test_create_then_read_populates_state() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(RULE_PATH))
            .and(query_param("api-version", DEFAULT_API_VERSION))
            .and(bearer_token("test-token"))
            .and(body_json(json!({
                "properties": {
                    "filterType": "SqlFilter",
                    "sqlFilter": { "sqlExpression": "priority > 5" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_response()))
            .expect(1)
            .mount(&server)
            .await;

        // Once to pick up the id, once more for the trailing read
        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_response()))
            .expect(2)
            .mount(&server)
            .await;

        let applied = provider(&server)
            .apply(TYPE_NAME, None, rule_config())
            .await
            .expect("create should succeed");

        let state = applied.state;
        assert_eq!(state.id(), RULE_PATH);
        assert_eq!(state.get_str("name"), "rule-1");
        assert_eq!(state.get_str("namespace_name"), "ns-1");
        assert_eq!(state.get_str("topic_name"), "topic-1");
        assert_eq!(state.get_str("resource_group_name"), "rg-1");
        assert_eq!(state.get_str("subscription_name"), "sub-a");
        assert_eq!(state.get_str("filtertype"), "SqlFilter");
        assert_eq!(state.get_str("sqlexpression"), "priority > 5");
        // Not part of the wire model; kept as configured
        assert_eq!(state.get_str("default_message_ttl"), "P14D");
        assert_eq!(state.get_int("max_delivery_count"), 10);
        assert!(applied.warnings.is_empty());
    }

    /// A rule that comes back without an id is a hard failure
    #[tokio::test]
    async fn test_create_without_returned_id_fails() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "rule-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server)
            .apply(TYPE_NAME, None, rule_config())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Cannot read ServiceBus Rule rule-1 (resource group rg-1) ID"
        );
    }

    /// API failures on PUT pass through untouched
    #[tokio::test]
    async fn test_create_conflict_passes_through() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": { "code": "Conflict", "message": "Rule is being updated" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .apply(TYPE_NAME, None, rule_config())
            .await
            .unwrap_err();

        let api_error = err.downcast_ref::<ApiError>().expect("should be an API error");
        assert_eq!(api_error.status.as_u16(), 409);
        assert_eq!(api_error.code.as_deref(), Some("Conflict"));
    }

    /// Invalid configs are rejected before any request is made
    #[tokio::test]
    async fn test_invalid_config_is_rejected_locally() {
        let server = MockServer::start().await;

        let mut config = rule_config();
        config.remove("max_delivery_count");
        config.insert("lock_duration".into(), json!("one minute"));

        let err = provider(&server)
            .apply(TYPE_NAME, None, config)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("lock_duration"), "{message}");
        assert!(message.contains("max_delivery_count"), "{message}");
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    /// Deprecated attributes are accepted with a warning
    #[tokio::test]
    async fn test_deprecated_attribute_warns() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_response()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_response()))
            .mount(&server)
            .await;

        let mut config = rule_config();
        config.insert("location".into(), json!("westeurope"));

        let applied = provider(&server).apply(TYPE_NAME, None, config).await.unwrap();

        assert_eq!(applied.warnings.len(), 1);
        assert_eq!(applied.warnings[0].attribute, "location");
    }

    /// Update replaces the rule wholesale through the same PUT
    #[tokio::test]
    async fn test_update_replaces_rule() {
        let server = MockServer::start().await;

        let mut updated = rule_response();
        updated["properties"]["sqlFilter"]["sqlExpression"] = json!("priority > 7");

        Mock::given(method("PUT"))
            .and(path(RULE_PATH))
            .and(body_json(json!({
                "properties": {
                    "filterType": "SqlFilter",
                    "sqlFilter": { "sqlExpression": "priority > 7" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
            .mount(&server)
            .await;

        let mut config = rule_config();
        config.insert("sqlexpression".into(), json!("priority > 7"));

        let applied = provider(&server)
            .apply(TYPE_NAME, Some(RULE_PATH), config)
            .await
            .unwrap();

        assert_eq!(applied.state.id(), RULE_PATH);
        assert_eq!(applied.state.get_str("sqlexpression"), "priority > 7");
    }
}

mod read_tests {
    use super::*;

    /// A rule that no longer exists clears the identity without an error
    #[tokio::test]
    async fn test_read_missing_rule_clears_identity() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(not_found())
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let resource = get_resource(TYPE_NAME).unwrap();

        let mut data = ResourceData::from_id(RULE_PATH);
        assert_ok!(resource.read(provider.client(), &mut data).await);
        assert!(data.is_gone());
        assert_eq!(data.id(), "");
    }

    #[tokio::test]
    async fn test_provider_read_missing_rule_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let state = provider(&server).read(TYPE_NAME, RULE_PATH).await.unwrap();
        assert!(state.is_none());
    }

    /// Anything other than a 404 is wrapped with the rule name
    #[tokio::test]
    async fn test_read_server_error_is_wrapped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "code": "InternalServerError", "message": "boom" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server).read(TYPE_NAME, RULE_PATH).await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Error making Read request on Azure ServiceBus Rule rule-1: "));
        assert!(message.contains("boom"), "{message}");
        assert!(err.downcast_ref::<ApiError>().is_some());
    }

    /// Requests stay on the client's subscription even when the ID names another
    #[tokio::test]
    async fn test_read_foreign_subscription_uses_client_subscription() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_response()))
            .expect(1)
            .mount(&server)
            .await;

        let foreign_id = RULE_PATH.replace("/subscriptions/sub-1/", "/subscriptions/sub-2/");
        let data = provider(&server)
            .read(TYPE_NAME, &foreign_id)
            .await
            .unwrap()
            .expect("rule exists");

        assert_eq!(data.id(), foreign_id);
        assert_eq!(data.get_str("name"), "rule-1");
        assert_eq!(data.get_str("subscription_name"), "sub-a");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.path().starts_with("/subscriptions/sub-1/"));
    }

    #[tokio::test]
    async fn test_read_malformed_id_fails_without_request() {
        let server = MockServer::start().await;

        let err = provider(&server)
            .read(TYPE_NAME, "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.ServiceBus")
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<IdError>(), Some(&IdError::MissingElement("namespaces")));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_issues_delete() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(RULE_PATH))
            .and(query_param("api-version", DEFAULT_API_VERSION))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert_ok!(provider(&server).delete(TYPE_NAME, RULE_PATH).await);
    }

    #[tokio::test]
    async fn test_delete_error_passes_through() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = provider(&server).delete(TYPE_NAME, RULE_PATH).await.unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_error.status.as_u16(), 403);
        assert_eq!(api_error.message, "Forbidden");
    }
}

mod import_tests {
    use super::*;

    #[tokio::test]
    async fn test_import_existing_rule() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(rule_response()))
            .expect(1)
            .mount(&server)
            .await;

        let state = provider(&server).import(TYPE_NAME, RULE_PATH).await.unwrap();

        assert_eq!(state.id(), RULE_PATH);
        assert_eq!(state.get_str("resource_group_name"), "rg-1");
        assert_eq!(state.get_str("namespace_name"), "ns-1");
        assert_eq!(state.get_str("topic_name"), "topic-1");
        assert_eq!(state.get_str("subscription_name"), "sub-a");
        assert_eq!(state.get_str("name"), "rule-1");
        assert_eq!(state.get_str("filtertype"), "SqlFilter");
    }

    #[tokio::test]
    async fn test_import_missing_rule_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RULE_PATH))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let err = provider(&server).import(TYPE_NAME, RULE_PATH).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot import non-existent remote object");
    }

    #[tokio::test]
    async fn test_import_malformed_id_fails() {
        let server = MockServer::start().await;

        let result = provider(&server).import(TYPE_NAME, "rule-1").await;
        let err = assert_err!(result);
        assert!(matches!(err.downcast_ref::<IdError>(), Some(IdError::NotAbsolute(_))));
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let server = MockServer::start().await;

        let err = provider(&server)
            .import("azurerm_servicebus_queue", RULE_PATH)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown resource type: azurerm_servicebus_queue");
    }
}
