//! ARM Client
//!
//! Main client for interacting with Azure Resource Manager, combining the
//! bearer credentials, HTTP functionality and the subscription scope.

use super::auth::ArmCredentials;
use super::http::ArmHttpClient;
use super::servicebus::RulesClient;
use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

/// Public Azure cloud management endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Service Bus management API version the rule model is written against
pub const DEFAULT_API_VERSION: &str = "2017-04-01";

/// Main ARM client
#[derive(Clone, Debug)]
pub struct ArmClient {
    credentials: ArmCredentials,
    http: ArmHttpClient,
    endpoint: Url,
    pub subscription_id: String,
    pub api_version: String,
}

impl ArmClient {
    /// Create a new ARM client scoped to one subscription
    pub fn new(
        endpoint: &str,
        subscription_id: &str,
        api_version: &str,
        credentials: ArmCredentials,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid ARM endpoint: {endpoint}"))?;
        if subscription_id.trim().is_empty() {
            anyhow::bail!("No subscription ID configured");
        }

        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
            endpoint,
            subscription_id: subscription_id.to_string(),
            api_version: api_version.to_string(),
        })
    }

    /// Make a GET request to an ARM API
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.http
            .get(url, &self.api_version, self.credentials.token())
            .await
    }

    /// Make a PUT request to an ARM API
    pub async fn put(&self, url: &str, body: &Value) -> Result<Value> {
        self.http
            .put(url, &self.api_version, self.credentials.token(), body)
            .await
    }

    /// Make a DELETE request to an ARM API
    pub async fn delete(&self, url: &str) -> Result<Value> {
        self.http
            .delete(url, &self.api_version, self.credentials.token())
            .await
    }

    /// Service Bus rule operations
    pub fn servicebus_rules(&self) -> RulesClient<'_> {
        RulesClient::new(self)
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an ARM URL from an already-encoded absolute path
    pub fn arm_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.as_str().trim_end_matches('/'), path)
    }

    /// Build the URL of a provider resource inside a resource group.
    ///
    /// `segments` are the `type/name` pairs below the provider namespace;
    /// every name is percent-encoded.
    pub fn provider_resource_url(
        &self,
        resource_group: &str,
        provider: &str,
        segments: &[(&str, &str)],
    ) -> String {
        let mut path = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group),
            provider
        );
        for (kind, name) in segments {
            path.push('/');
            path.push_str(kind);
            path.push('/');
            path.push_str(&urlencoding::encode(name));
        }
        self.arm_url(&path)
    }
}
