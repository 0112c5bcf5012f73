use crate::{
    config::Config,
    error::{AppError, Result},
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Client for the external object-storage (image) service.
///
/// Uploads take the raw image payload sent by the client and return the
/// stored object's URL; deletion is keyed by the public id derived from
/// that URL.
#[derive(Clone)]
pub struct StorageService {
    config: Config,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl StorageService {
    pub async fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    /// Upload an image payload, returning the stored object's URL.
    pub async fn upload(&self, payload: &str) -> Result<String> {
        let url = format!(
            "{}/{}/image/upload",
            self.config.storage_url, self.config.storage_cloud_name
        );

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("file", payload),
                ("upload_preset", self.config.storage_upload_preset.as_str()),
                ("api_key", self.config.storage_api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach media storage: {}", e);
                AppError::ExternalService("Failed to reach media storage".to_string())
            })?;

        if !response.status().is_success() {
            error!("Media storage rejected upload with status {}", response.status());
            return Err(AppError::ExternalService(
                "Media storage rejected the upload".to_string(),
            ));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            error!("Failed to parse media storage response: {}", e);
            AppError::ExternalService("Invalid response from media storage".to_string())
        })?;

        debug!("Uploaded image to {}", body.secure_url);
        Ok(body.secure_url)
    }

    /// Request deletion of a previously stored image by its URL.
    pub async fn destroy(&self, image_url: &str) -> Result<()> {
        let Some(public_id) = public_id_from_url(image_url) else {
            warn!("Could not derive public id from image URL: {}", image_url);
            return Ok(());
        };

        let url = format!(
            "{}/{}/image/destroy",
            self.config.storage_url, self.config.storage_cloud_name
        );

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("public_id", public_id.as_str()),
                ("api_key", self.config.storage_api_key.as_str()),
                ("api_secret", self.config.storage_api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach media storage: {}", e);
                AppError::ExternalService("Failed to reach media storage".to_string())
            })?;

        if !response.status().is_success() {
            error!("Media storage rejected destroy with status {}", response.status());
            return Err(AppError::ExternalService(
                "Media storage rejected the deletion".to_string(),
            ));
        }

        debug!("Destroyed stored image {}", public_id);
        Ok(())
    }
}

/// Derive the storage public id from an object URL: the last path segment
/// with its extension stripped.
fn public_id_from_url(image_url: &str) -> Option<String> {
    let segment = image_url.rsplit('/').next()?;
    let public_id = segment.split('.').next()?;
    if public_id.is_empty() {
        return None;
    }
    Some(public_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn public_id_is_last_segment_without_extension() {
        assert_eq!(
            public_id_from_url("https://cdn.test/img/v12/abc123.png"),
            Some("abc123".to_string())
        );
        assert_eq!(
            public_id_from_url("https://cdn.test/plain-id"),
            Some("plain-id".to_string())
        );
        assert_eq!(public_id_from_url("https://cdn.test/img/"), None);
    }

    async fn service_against(server: &MockServer) -> StorageService {
        let mut config = Config::default();
        config.storage_url = server.uri();
        config.storage_cloud_name = "demo".to_string();
        StorageService::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn upload_returns_stored_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://cdn.test/img/abc123.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let storage = service_against(&server).await;
        let url = storage.upload("data:image/png;base64,aGVsbG8=").await.unwrap();
        assert_eq!(url, "https://cdn.test/img/abc123.png");
    }

    #[tokio::test]
    async fn upload_failure_is_an_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let storage = service_against(&server).await;
        let err = storage.upload("data:image/png;base64,aGVsbG8=").await;
        assert!(matches!(err, Err(AppError::ExternalService(_))));
    }

    #[tokio::test]
    async fn destroy_sends_derived_public_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/destroy"))
            .and(body_string_contains("public_id=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let storage = service_against(&server).await;
        storage
            .destroy("https://cdn.test/img/abc123.png")
            .await
            .unwrap();
    }
}
