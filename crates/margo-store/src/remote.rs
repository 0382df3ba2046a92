//! HTTP client for a Hypothesis-compatible annotation store.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use margo_core::config::StoreConfig;
use margo_core::models::{Annotation, AnnotationPayload, Group, Profile, SearchQuery};
use margo_core::traits::{AnnotationStore, SearchResult};
use margo_core::{Error, Result};

/// Client for the remote annotation store API.
///
/// Requests carry the configured bearer token when one is set;
/// unauthenticated clients see only public annotations.
pub struct RemoteStore {
    config: StoreConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct CreateGroupRequest<'a> {
    name: &'a str,
}

impl RemoteStore {
    pub fn new(config: StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Create a client from `MARGO_STORE_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(StoreConfig::from_env())
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {e}")))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Unauthorized(format!("Store returned {status}: {body}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("Store returned {status}: {body}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Store(format!("Invalid response body: {e}")))
    }
}

#[async_trait::async_trait]
impl AnnotationStore for RemoteStore {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        debug!(
            op = "search",
            uri = query.uri.as_deref().unwrap_or(""),
            group = query.group.as_deref().unwrap_or(""),
            "Searching annotations"
        );
        let mut query = query.clone();
        if query.limit.is_none() {
            query.limit = Some(self.config.search_limit);
        }
        let request = self.request(Method::GET, "/search").query(&query);
        let result: SearchResult = self.execute(request).await?;
        debug!(
            op = "search",
            annotation_count = result.rows.len(),
            total = result.total,
            "Search complete"
        );
        Ok(result)
    }

    async fn create_annotation(&self, payload: &AnnotationPayload) -> Result<Annotation> {
        debug!(op = "create", uri = %payload.uri, "Creating annotation");
        let request = self.request(Method::POST, "/annotations").json(payload);
        self.execute(request).await
    }

    async fn update_annotation(
        &self,
        id: &str,
        payload: &AnnotationPayload,
    ) -> Result<Annotation> {
        debug!(op = "update", annotation_id = id, "Updating annotation");
        let request = self
            .request(Method::PATCH, &format!("/annotations/{id}"))
            .json(payload);
        self.execute(request).await
    }

    async fn delete_annotation(&self, id: &str) -> Result<bool> {
        debug!(op = "delete", annotation_id = id, "Deleting annotation");
        let request = self.request(Method::DELETE, &format!("/annotations/{id}"));
        let response: DeleteResponse = self.execute(request).await?;
        Ok(response.deleted)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        debug!(op = "list_groups", "Listing groups");
        let request = self.request(Method::GET, "/groups");
        self.execute(request).await
    }

    async fn create_group(&self, name: &str) -> Result<Group> {
        debug!(op = "create_group", group_name = name, "Creating group");
        let request = self
            .request(Method::POST, "/groups")
            .json(&CreateGroupRequest { name });
        self.execute(request).await
    }

    async fn user_profile(&self) -> Result<Profile> {
        debug!(op = "profile", "Fetching profile");
        let request = self.request(Method::GET, "/profile");
        self.execute(request).await
    }
}
