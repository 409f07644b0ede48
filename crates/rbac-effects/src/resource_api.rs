//! HTTP handler for the remote resource API
//!
//! Routes:
//!
//! - `GET   /organizations`
//! - `GET   /organizations/{o}`
//! - `GET   /organizations/{o}/workspaces`
//! - `GET   /organizations/{o}/workspaces/{w}/scenarios`
//! - `PATCH <resource path>` with body `{"security": <policy>}`

use crate::http::{error_body, send, Endpoint, RawResponse, RequestFailure};
use async_trait::async_trait;
use rbac_core::{RemoteError, ResourceApi, ResourcePath, ResourceRef, SecurityPolicy};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Body of a policy update
#[derive(Debug, Serialize)]
struct PolicyUpdate<'a> {
    security: &'a SecurityPolicy,
}

/// [`ResourceApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpResourceApi {
    endpoint: Endpoint,
}

impl HttpResourceApi {
    /// Handler for the API rooted at `base_url`, authenticating with `token`
    /// when one is given
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, RemoteError> {
        let endpoint = Endpoint::new(base_url, token).map_err(into_remote)?;
        Ok(Self { endpoint })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RemoteError> {
        let url = self.endpoint.url(segments).map_err(into_remote)?;
        debug!(url = %url, "GET");
        let response = send(self.endpoint.get(url.clone()))
            .await
            .map_err(into_remote)?;
        decode(&url, response)
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn list_organizations(&self) -> Result<Vec<ResourceRef>, RemoteError> {
        self.get_json(&["organizations"]).await
    }

    async fn get_organization(&self, organization_id: &str) -> Result<ResourceRef, RemoteError> {
        self.get_json(&["organizations", organization_id]).await
    }

    async fn list_workspaces(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError> {
        self.get_json(&["organizations", organization_id, "workspaces"])
            .await
    }

    async fn list_scenarios(
        &self,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<ResourceRef>, RemoteError> {
        self.get_json(&[
            "organizations",
            organization_id,
            "workspaces",
            workspace_id,
            "scenarios",
        ])
        .await
    }

    async fn update_policy(
        &self,
        path: &ResourcePath,
        policy: &SecurityPolicy,
    ) -> Result<ResourceRef, RemoteError> {
        let url = self
            .endpoint
            .url(&path_segments(path))
            .map_err(into_remote)?;
        debug!(url = %url, "PATCH");
        let request = self
            .endpoint
            .patch(url.clone())
            .json(&PolicyUpdate { security: policy });
        let response = send(request).await.map_err(into_remote)?;
        decode(&url, response)
    }
}

/// Route segments of a resource
pub(crate) fn path_segments(path: &ResourcePath) -> Vec<&str> {
    match path {
        ResourcePath::Organization { organization_id } => {
            vec!["organizations", organization_id.as_str()]
        }
        ResourcePath::Workspace {
            organization_id,
            workspace_id,
        } => vec![
            "organizations",
            organization_id.as_str(),
            "workspaces",
            workspace_id.as_str(),
        ],
        ResourcePath::Scenario {
            organization_id,
            workspace_id,
            scenario_id,
        } => vec![
            "organizations",
            organization_id.as_str(),
            "workspaces",
            workspace_id.as_str(),
            "scenarios",
            scenario_id.as_str(),
        ],
    }
}

/// Map a response to a value or a [`RemoteError`]
pub(crate) fn decode<T: DeserializeOwned>(
    url: &Url,
    response: RawResponse,
) -> Result<T, RemoteError> {
    match response.status {
        status if status.is_success() => serde_json::from_str(&response.body)
            .map_err(|e| RemoteError::decode(format!("{url}: {e}"))),
        StatusCode::NOT_FOUND => Err(RemoteError::not_found(url.path().to_string())),
        status => Err(RemoteError::status(
            status.as_u16(),
            error_body(&response.body),
        )),
    }
}

fn into_remote(failure: RequestFailure) -> RemoteError {
    RemoteError::network(failure.to_string())
}
