//! Cloud asset host backend
//!
//! Talks to the host's browse endpoint over HTTP. Authentication is supplied
//! through configuration as a bearer key; this backend never negotiates it.

use super::Listing;
use crate::config::CloudBackendSettings;
use crate::error::{ConfigError, ListingError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Request body sent to the browse endpoint
#[derive(Debug, Serialize)]
struct BrowseRequest<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    wildcard: bool,
}

/// Response body returned by the browse endpoint
#[derive(Debug, Default, Deserialize)]
struct BrowseResponse {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    dirs: Vec<String>,
}

/// Lists a cloud user's drive and wildcard paths through the host API
#[derive(Debug, Clone)]
pub struct CloudHostBrowser {
    client: Client,
    api_url: Url,
    api_key: Option<String>,
    user_id: Option<String>,
}

impl CloudHostBrowser {
    /// Create a browser for `api_url`
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = Url::parse(api_url).map_err(|e| ConfigError::InvalidValue {
            field: "backends.cloud.api_url".to_string(),
            value: format!("{} ({})", api_url, e),
        })?;

        Ok(Self {
            client: Client::new(),
            api_url,
            api_key: None,
            user_id: None,
        })
    }

    /// Create a browser from backend settings
    pub fn from_settings(settings: &CloudBackendSettings) -> Result<Self, ConfigError> {
        let api_url = settings
            .api_url
            .as_deref()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "backends.cloud.api_url".to_string(),
                value: String::new(),
            })?;

        let mut browser = Self::new(api_url)?;
        browser.api_key = settings.api_key.clone();
        browser.user_id = settings.user_id.clone();
        Ok(browser)
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn map_status(path: &str, status: StatusCode) -> ListingError {
        match status {
            StatusCode::NOT_FOUND => ListingError::NotFound {
                path: path.to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ListingError::PermissionDenied {
                path: path.to_string(),
            },
            other => ListingError::Network {
                path: path.to_string(),
                message: format!("HTTP {}", other),
            },
        }
    }

    async fn browse(&self, path: &str, wildcard: bool) -> Result<Listing, ListingError> {
        let mut request = self
            .client
            .post(self.api_url.clone())
            .json(&BrowseRequest { path, wildcard });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let network = |e: reqwest::Error| ListingError::Network {
            path: path.to_string(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(path, status));
        }

        let body: BrowseResponse = response.json().await.map_err(network)?;
        Ok(Listing {
            target: body.target.unwrap_or_else(|| path.to_string()),
            files: body.files,
            dirs: body.dirs,
        })
    }

    /// List the files matched by a wildcard pattern
    pub async fn browse_wildcard(&self, pattern: &str) -> Result<Listing, ListingError> {
        self.browse(pattern, true).await
    }

    /// List a directory of the authenticated user's drive
    pub async fn browse_drive(&self, drive_root: &str, dir: &str) -> Result<Listing, ListingError> {
        tracing::trace!(drive_root, dir, "Browsing cloud drive");
        self.browse(dir, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = CloudBackendSettings {
            api_url: Some("https://forge-vtt.com/api/assets/browse".to_string()),
            api_key: Some("secret".to_string()),
            user_id: Some("abc123".to_string()),
            ..CloudBackendSettings::default()
        };

        let browser = CloudHostBrowser::from_settings(&settings).unwrap();
        assert_eq!(browser.user_id(), Some("abc123"));
        assert_eq!(browser.api_url().host_str(), Some("forge-vtt.com"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = CloudHostBrowser::new("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let settings = CloudBackendSettings::default();
        assert!(CloudHostBrowser::from_settings(&settings).is_err());
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(BrowseRequest {
            path: "maps",
            wildcard: false,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"path": "maps"}));

        let body = serde_json::to_value(BrowseRequest {
            path: "https://assets.forge-vtt.com/abc/maps/*",
            wildcard: true,
        })
        .unwrap();
        assert_eq!(body["wildcard"], true);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            CloudHostBrowser::map_status("maps", StatusCode::NOT_FOUND),
            ListingError::NotFound { .. }
        ));
        assert!(matches!(
            CloudHostBrowser::map_status("maps", StatusCode::FORBIDDEN),
            ListingError::PermissionDenied { .. }
        ));
        assert!(matches!(
            CloudHostBrowser::map_status("maps", StatusCode::BAD_GATEWAY),
            ListingError::Network { .. }
        ));
    }
}
