//! REST API client for the crowdsourcing backend.
//!
//! Wraps the project, module, and category endpoints using [`reqwest`].
//! Every URL ends with a trailing slash, as the backend requires.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crowdsource_core::module::Module;
use crowdsource_core::project::{NewModule, NewProject};
use crowdsource_core::remote::{EntityKind, ModuleBackend, RemoteError, RemoteUpdate};
use crowdsource_core::types::DbId;

use crate::config::ClientConfig;

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct CrowdsourceApi {
    client: reqwest::Client,
    api_url: String,
}

/// A project category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<DbId>,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ApiError { status, body } => RemoteError::Status { status, body },
            ApiError::Request(e) if e.is_decode() => RemoteError::Decode(e.to_string()),
            ApiError::Request(e) => RemoteError::Transport(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct BatchFileRef {
    batch_file: DbId,
}

impl CrowdsourceApi {
    /// Create a client for the backend at `api_url`, e.g. `http://host:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Create a client from configuration, applying the request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.api_url, path)
    }

    // ---- projects ----

    /// Create a project together with its prototype module.
    ///
    /// Sends `POST /api/project/`.
    pub async fn create_project(&self, project: &NewProject) -> Result<Value, ApiError> {
        let response = self.client.post(self.url("project/")).json(project).send().await?;
        Self::parse_response(response).await
    }

    /// All projects visible to the current user. `GET /api/project/`.
    pub async fn list_projects(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.client.get(self.url("project/")).send().await?;
        Self::parse_response(response).await
    }

    /// Projects owned by the current requester.
    pub async fn requester_projects(&self) -> Result<Vec<Value>, ApiError> {
        let response = self
            .client
            .get(self.url("project/requester_projects/"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// All project categories. `GET /api/category/`.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self.client.get(self.url("category/")).send().await?;
        Self::parse_response(response).await
    }

    // ---- generic entity access ----

    /// Retrieve one entity. `GET /api/{kind}/{pk}/`.
    pub async fn retrieve<T: DeserializeOwned>(
        &self,
        pk: DbId,
        kind: EntityKind,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("{kind}/{pk}/")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Partially update one entity with only the given fields.
    ///
    /// Sends `PUT /api/{kind}/{pk}/`.
    pub async fn update_fields(
        &self,
        pk: DbId,
        fields: &Map<String, Value>,
        kind: EntityKind,
    ) -> Result<(), ApiError> {
        tracing::debug!(pk, %kind, fields = ?fields.keys().collect::<Vec<_>>(), "Updating entity");
        let response = self
            .client
            .put(self.url(&format!("{kind}/{pk}/")))
            .json(fields)
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- modules ----

    /// Add a module to an existing project. `POST /api/module/`.
    pub async fn add_milestone(&self, module: &NewModule) -> Result<Module, ApiError> {
        let response = self.client.post(self.url("module/")).json(module).send().await?;
        Self::parse_response(response).await
    }

    /// Delete a module. `DELETE /api/module/{pk}/`.
    pub async fn delete_module(&self, pk: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("module/{pk}/")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// The most recent module of a project.
    pub async fn last_milestone(&self, project_id: DbId) -> Result<Module, ApiError> {
        let response = self
            .client
            .get(self.url("module/get_last_milestone/"))
            .query(&[("projectId", project_id)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// All modules of a project.
    pub async fn modules_by_project(&self, project_id: DbId) -> Result<Vec<Module>, ApiError> {
        let response = self
            .client
            .get(self.url("module/list_by_project/"))
            .query(&[("project_id", project_id)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Worker comments left on a module's tasks.
    pub async fn module_comments(&self, pk: DbId) -> Result<Vec<Value>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("module/{pk}/list_comments/")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Modules owned by the current requester.
    pub async fn requester_modules(&self) -> Result<Vec<Module>, ApiError> {
        let response = self
            .client
            .get(self.url("module/requester_modules/"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Attach an uploaded batch file. `POST /api/module/{pk}/attach_file/`.
    pub async fn attach_file(&self, pk: DbId, file_id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("module/{pk}/attach_file/")))
            .json(&BatchFileRef { batch_file: file_id })
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Detach a batch file. `DELETE /api/module/{pk}/delete_file/` with a JSON body.
    pub async fn delete_file(&self, pk: DbId, file_id: DbId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("module/{pk}/delete_file/")))
            .json(&BatchFileRef { batch_file: file_id })
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Duplicate a module. `POST /api/module/{pk}/fork/`.
    pub async fn fork(&self, pk: DbId) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("module/{pk}/fork/")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteUpdate for CrowdsourceApi {
    async fn update(
        &self,
        id: DbId,
        fields: Map<String, Value>,
        kind: EntityKind,
    ) -> Result<(), RemoteError> {
        Ok(self.update_fields(id, &fields, kind).await?)
    }
}

#[async_trait]
impl ModuleBackend for CrowdsourceApi {
    async fn retrieve_module(&self, id: DbId) -> Result<Module, RemoteError> {
        Ok(self.retrieve(id, EntityKind::Module).await?)
    }

    async fn delete_module(&self, id: DbId) -> Result<(), RemoteError> {
        Ok(CrowdsourceApi::delete_module(self, id).await?)
    }

    async fn attach_file(&self, id: DbId, file_id: DbId) -> Result<(), RemoteError> {
        Ok(CrowdsourceApi::attach_file(self, id, file_id).await?)
    }

    async fn delete_file(&self, id: DbId, file_id: DbId) -> Result<(), RemoteError> {
        Ok(CrowdsourceApi::delete_file(self, id, file_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = CrowdsourceApi::new("http://localhost:8000/");
        assert_eq!(api.api_url(), "http://localhost:8000");
        assert_eq!(api.url("module/3/"), "http://localhost:8000/api/module/3/");
    }

    #[test]
    fn status_error_maps_to_remote_status() {
        let err: RemoteError = ApiError::ApiError {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert!(matches!(err, RemoteError::Status { status: 500, .. }));
    }
}
