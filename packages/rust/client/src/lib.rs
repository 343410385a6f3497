//! HTTP client for a remote resolvekit server.
//!
//! [`RemoteStore`] implements [`DocumentStore`] over the
//! `/structured-complaints` routes and wraps the `/seo` routes. Every call is
//! one request; nothing is coalesced, retried or cancelled.
//!
//! Error mapping: transport failures are `Network`, 5xx responses are
//! `Persistence` (both retryable), 4xx responses are `Validation`.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use resolvekit_shared::{
    ApiEnvelope, ClientConfig, DocumentFragment, DocumentStore, ResolveKitError, Result,
    StructuredComplaintDocument,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

/// User-Agent string for client requests.
const USER_AGENT: &str = concat!("resolvekit/", env!("CARGO_PKG_VERSION"));

/// Query for `GET /seo`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeoQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base: Url,
}

impl RemoteStore {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ResolveKitError::config(format!("invalid client.base_url {:?}: {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ResolveKitError::config(format!(
                "client.base_url cannot be a base URL: {base}"
            )));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResolveKitError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base })
    }

    /// Store a fragment. The server re-runs the pipeline when it carries
    /// `richTextContent`.
    #[instrument(skip(self, fragment))]
    pub async fn save_fragment(
        &self,
        entity_id: &str,
        fragment: &DocumentFragment,
    ) -> Result<StructuredComplaintDocument> {
        let url = self.url(&["structured-complaints", "entity", entity_id])?;
        self.call::<StructuredComplaintDocument>(Method::POST, url, Some(fragment))
            .await?
            .ok_or_else(|| ResolveKitError::Persistence("server returned no document".into()))
    }

    /// Save a document and (optionally) its parent's SEO settings in one
    /// server-side transaction.
    #[instrument(skip(self, document, seo))]
    pub async fn save_bundle(
        &self,
        entity_id: &str,
        document: &StructuredComplaintDocument,
        seo: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(&["structured-complaints", "entity", entity_id, "bundle"])?;
        let body = json!({ "document": document, "seo": seo });
        Ok(self
            .call::<Value>(Method::POST, url, Some(&body))
            .await?
            .unwrap_or(Value::Null))
    }

    /// Flattened SEO settings, or `None` when nothing matches.
    #[instrument(skip(self))]
    pub async fn get_seo(&self, query: &SeoQuery) -> Result<Option<Value>> {
        let mut url = self.url(&["seo"])?;
        let encoded = serde_json::to_value(query)
            .map_err(|e| ResolveKitError::validation(format!("invalid seo query: {e}")))?;
        if let Value::Object(params) = encoded {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if let Value::String(value) = value {
                    pairs.append_pair(&key, &value);
                }
            }
        }
        self.call::<Value>(Method::GET, url, None::<&()>).await
    }

    /// `body` is `{type, identifier, tab?, ...fields}`.
    #[instrument(skip(self, body))]
    pub async fn upsert_seo(&self, body: &Value) -> Result<Value> {
        let url = self.url(&["seo"])?;
        Ok(self
            .call::<Value>(Method::POST, url, Some(body))
            .await?
            .unwrap_or(Value::Null))
    }

    #[instrument(skip(self))]
    pub async fn delete_seo(&self, id: &str) -> Result<bool> {
        let url = self.url(&["seo", id])?;
        self.call::<Value>(Method::DELETE, url, None::<&()>).await?;
        Ok(true)
    }

    /// `GET /health` succeeded.
    pub async fn health(&self) -> Result<bool> {
        let url = self.url(&["health"])?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ResolveKitError::Network(format!("{url}: {e}")))?;
        Ok(response.status().is_success())
    }

    /// Base URL plus percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ResolveKitError::config(format!("cannot extend base URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and unwrap the `{success, data, error}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<Option<T>> {
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ResolveKitError::Network(format!("{method} {url}: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ResolveKitError::Network(format!("{url}: failed to read body: {e}")))?;
        debug!(%method, %url, %status, len = text.len(), "response received");

        let envelope = serde_json::from_str::<ApiEnvelope<T>>(&text).ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|e| e.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(status_error(status, format!("{method} {url}: {message}")));
        }

        match envelope {
            Some(ApiEnvelope {
                success: true,
                data,
                ..
            }) => Ok(data),
            Some(ApiEnvelope { error, .. }) => Err(ResolveKitError::Persistence(
                error.unwrap_or_else(|| "request failed".into()),
            )),
            None => Err(ResolveKitError::Persistence(format!(
                "{url}: malformed response body"
            ))),
        }
    }
}

fn status_error(status: StatusCode, message: String) -> ResolveKitError {
    if status.is_client_error() {
        ResolveKitError::validation(message)
    } else {
        ResolveKitError::Persistence(message)
    }
}

impl DocumentStore for RemoteStore {
    async fn upsert(
        &self,
        key: &str,
        doc: &StructuredComplaintDocument,
    ) -> Result<StructuredComplaintDocument> {
        self.save_fragment(key, &DocumentFragment::from(doc)).await
    }

    async fn get(&self, key: &str) -> Result<Option<StructuredComplaintDocument>> {
        let url = self.url(&["structured-complaints", "entity", key])?;
        self.call(Method::GET, url, None::<&()>).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let url = self.url(&["structured-complaints", "entity", key])?;
        self.call::<Value>(Method::DELETE, url, None::<&()>).await?;
        Ok(true)
    }
}
