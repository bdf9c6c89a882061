//! Google Cloud service-account authentication
//!
//! Builds `google_cloud_auth` service-account credentials from the JSON key
//! and takes the bearer token from the `Authorization` header they produce.
//! A provider is built per call, so nothing is reused across calls.

use async_trait::async_trait;
use google_cloud_auth::credentials::{CacheableResource, Credentials, service_account};
use http::Extensions;
use std::path::Path;

use crate::error::{Result, SpeechError};
use crate::request::Provider;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

fn auth_error(message: String) -> SpeechError {
    SpeechError::AuthenticationFailed {
        provider: Provider::Google,
        message,
    }
}

/// Source of OAuth2 bearer tokens for Google Cloud APIs
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, for tests and pre-issued tokens
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Token provider backed by a service-account key
pub struct ServiceAccountTokenProvider {
    credentials: Credentials,
}

impl std::fmt::Debug for ServiceAccountTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenProvider")
            .field("credentials", &"<credentials>")
            .finish()
    }
}

impl ServiceAccountTokenProvider {
    /// Build credentials from the content of a service-account key file
    pub fn from_json(json: &str) -> Result<Self> {
        let key: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| auth_error(format!("Invalid service account key: {}", e)))?;

        let key_type = key
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        if key_type != "service_account" {
            return Err(auth_error(format!(
                "Unsupported credential type '{}', expected 'service_account'",
                key_type
            )));
        }

        let credentials = service_account::Builder::new(key)
            .with_access_specifier(service_account::AccessSpecifier::from_scopes([
                CLOUD_PLATFORM_SCOPE,
            ]))
            .build()
            .map_err(|e| {
                auth_error(format!("Failed to load service account credentials: {}", e))
            })?;

        Ok(Self { credentials })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            auth_error(format!(
                "Failed to read service account key '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let headers = self
            .credentials
            .headers(Extensions::new())
            .await
            .map_err(|e| auth_error(format!("Failed to fetch access token: {}", e)))?;

        let header_map = match headers {
            CacheableResource::New { data, .. } => data,
            CacheableResource::NotModified => {
                return Err(auth_error(
                    "Credentials returned no headers to use".to_string(),
                ));
            }
        };

        let value = header_map
            .get(http::header::AUTHORIZATION)
            .ok_or_else(|| auth_error("No Authorization header in credentials".to_string()))?
            .to_str()
            .map_err(|e| auth_error(format!("Invalid Authorization header value: {}", e)))?;

        log::debug!("Obtained Google access token");

        value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| auth_error("Authorization header is not a Bearer token".to_string()))
    }
}
