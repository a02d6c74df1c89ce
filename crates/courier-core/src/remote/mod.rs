//! Remote API access
//!
//! The bootstrap flow talks to the backend through the [`ApiClient`] trait.
//! A request resolving to `None` means "not found / nothing returned" and
//! callers must treat it as a failure, never as an empty success.

pub mod http;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

pub use http::{HttpApiClient, HttpApiClientBuilder, SESSION_HEADER};

/// Backend endpoints used by the application
pub mod paths {
    pub const ORGANIZATIONS: &str = "/v1/organizations";
    pub const USER_PROFILE: &str = "/v1/user/profile";
    pub const CURRENT_PLAN: &str = "/v1/billing/current-plan";

    pub fn organization_features(organization_id: &str) -> String {
        format!("/v1/organizations/{}/features", organization_id)
    }

    pub fn team_projects(organization_id: &str) -> String {
        format!("/v1/organizations/{}/team-projects", organization_id)
    }
}

/// A single authenticated call to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub session_id: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            session_id: None,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            session_id: None,
            body: Some(body),
        }
    }

    pub fn session(mut self, session_id: Option<&str>) -> Self {
        self.session_id = session_id.map(str::to_string);
        self
    }
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Perform the request and return the decoded JSON payload, if any
    async fn request(&self, request: ApiRequest) -> Result<Option<Value>>;
}

/// Perform a request and deserialize its payload
pub async fn fetch<T: DeserializeOwned>(
    client: &dyn ApiClient,
    request: ApiRequest,
) -> Result<Option<T>> {
    match client.request(request).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
