use std::time::Duration;

use axum::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::{config::PlantIdConfig, error::ApiError};

use super::dto::{Diagnosis, IdentificationResponse};

/// Outbound plant-health identification. Behind a trait so tests and the
/// fake state can swap in a canned implementation.
#[async_trait]
pub trait DiagnosisClient: Send + Sync {
    async fn identify(&self, image_b64: &str) -> Result<Diagnosis, ApiError>;
}

pub struct PlantIdClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl PlantIdClient {
    pub fn new(config: &PlantIdConfig) -> anyhow::Result<Self> {
        // One attempt per request; a hang past the timeout surfaces as
        // service-unavailable rather than blocking the caller.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl DiagnosisClient for PlantIdClient {
    async fn identify(&self, image_b64: &str) -> Result<Diagnosis, ApiError> {
        let body = json!({
            "images": [image_b64],
            "health": "all",
        });

        let resp = self
            .http
            .post(&self.api_url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            warn!(%status, %detail, "identification request rejected");
            return Err(upstream_error(status.as_u16(), detail));
        }

        let parsed: IdentificationResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("unexpected response shape: {e}")))?;
        debug!("identification response received");
        Ok(parsed.into())
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() || e.is_connect() {
        ApiError::UpstreamUnavailable
    } else {
        ApiError::Upstream(e.to_string())
    }
}

fn upstream_error(status: u16, detail: String) -> ApiError {
    match status {
        401 | 403 => ApiError::UpstreamAuth,
        400 | 413 => ApiError::UpstreamValidation(detail),
        _ => ApiError::Upstream(format!("{status}: {detail}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn auth_failures_map_to_upstream_auth() {
        assert_eq!(
            upstream_error(401, "bad key".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            upstream_error(403, "forbidden".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn client_rejections_map_to_validation() {
        let err = upstream_error(400, "no image".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("no image"));

        assert_eq!(
            upstream_error(413, "too large".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn other_failures_map_to_bad_gateway() {
        assert_eq!(
            upstream_error(500, "oops".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            upstream_error(429, "rate limited".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_service_unavailable() {
        let client = PlantIdClient::new(&PlantIdConfig {
            api_key: "test".into(),
            // Port 9 (discard) is never listening locally.
            api_url: "http://127.0.0.1:9/identification".into(),
            timeout_secs: 1,
        })
        .expect("client builds");

        let err = client.identify("aGVsbG8=").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
