//! S3 bucket backend using the AWS SDK for Rust

use super::Listing;
use crate::config::S3BackendSettings;
use crate::error::ListingError;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use aws_sdk_s3::Client as S3Client;

/// Lists bucket prefixes as if they were directories
#[derive(Debug, Clone)]
pub struct S3Browser {
    client: S3Client,
    public_base_url: Option<String>,
}

impl S3Browser {
    /// Create a browser with the default credential chain
    pub async fn from_settings(settings: &S3BackendSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(aws_sdk_s3::config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // S3-compatible stores behind a custom endpoint expect path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint_url.is_some())
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            public_base_url: settings.public_base_url.clone(),
        }
    }

    /// Create a browser from an existing client (for testing)
    pub fn from_client(client: S3Client, public_base_url: Option<String>) -> Self {
        Self {
            client,
            public_base_url,
        }
    }

    /// Key prefix for a directory-like path: no leading slash, one trailing slash
    pub fn prefix_for(path: &str) -> String {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}/", trimmed)
        }
    }

    /// Public URL of an object
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        let base = match &self.public_base_url {
            Some(base) => base.replace("{bucket}", bucket),
            None => format!("https://{}.s3.amazonaws.com", bucket),
        };
        format!("{}/{}", base.trim_end_matches('/'), key)
    }

    fn map_error(bucket: &str, prefix: &str, err: SdkError<ListObjectsV2Error>) -> ListingError {
        let path = format!("s3://{}/{}", bucket, prefix);
        let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
        match code.as_deref() {
            Some("NoSuchBucket") | Some("NoSuchKey") => ListingError::NotFound { path },
            Some("AccessDenied") | Some("AllAccessDisabled") => {
                ListingError::PermissionDenied { path }
            }
            _ => ListingError::Network {
                path,
                message: DisplayErrorContext(&err).to_string(),
            },
        }
    }

    /// List the objects and common prefixes directly under `path`
    pub async fn browse(&self, bucket: &str, path: &str) -> Result<Listing, ListingError> {
        let prefix = Self::prefix_for(path);
        let mut listing = Listing {
            target: prefix.trim_end_matches('/').to_string(),
            ..Listing::default()
        };
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(&prefix)
                .delimiter("/");

            if let Some(ref token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|err| Self::map_error(bucket, &prefix, err))?;

            for object in response.contents() {
                match object.key() {
                    // Folder placeholder objects carry the prefix itself as key
                    Some(key) if key != prefix => listing.files.push(self.object_url(bucket, key)),
                    _ => {}
                }
            }

            for common in response.common_prefixes() {
                if let Some(dir) = common.prefix() {
                    listing.dirs.push(dir.to_string());
                }
            }

            match (response.is_truncated(), response.next_continuation_token()) {
                (Some(true), Some(token)) => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_browser(public_base_url: Option<String>) -> S3Browser {
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        S3Browser::from_client(S3Client::from_conf(config), public_base_url)
    }

    #[test]
    fn test_prefix_for() {
        assert_eq!(S3Browser::prefix_for(""), "");
        assert_eq!(S3Browser::prefix_for("/"), "");
        assert_eq!(S3Browser::prefix_for("maps/city"), "maps/city/");
        assert_eq!(S3Browser::prefix_for("/maps/city/"), "maps/city/");
    }

    #[test]
    fn test_object_url() {
        let browser = offline_browser(None);
        assert_eq!(
            browser.object_url("mybucket", "maps/city/Market.jpg"),
            "https://mybucket.s3.amazonaws.com/maps/city/Market.jpg"
        );

        let browser = offline_browser(Some("https://cdn.example.com/{bucket}/".to_string()));
        assert_eq!(
            browser.object_url("mybucket", "maps/a.png"),
            "https://cdn.example.com/mybucket/maps/a.png"
        );
    }
}
