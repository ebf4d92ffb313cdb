//! S3 storage for rendered report files.
//!
//! Supports both AWS S3 and MinIO for development. Uploads return the
//! public URL that gets stored on the report row.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use tracing::info;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    public_domain: String,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "worklog");

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        let storage = Self {
            client,
            bucket: config.bucket.clone(),
            public_domain: config.public_domain.clone(),
        };

        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Upload a file and return its public URL.
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<String> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(format!("https://{}/{}", self.public_domain, key))
    }

    /// S3 key for a user's daily report, e.g. `reports/{user_id}/2026-08-29.md`.
    pub fn report_key(user_id: &str, date: &str) -> String {
        format!("reports/{}/{}.md", user_id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_key() {
        let key = Storage::report_key("u-123", "2026-08-29");
        assert_eq!(key, "reports/u-123/2026-08-29.md");
    }
}
