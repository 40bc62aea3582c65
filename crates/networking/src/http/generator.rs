//! Client for the hosted reward generation function

use super::client::{check_auth_error, ClientConfig};
use ascend_core::{
    Error, GenerationContext, GenerationResponse, Result, RewardCandidate, RewardGenerator,
};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use tracing::{debug, instrument, warn};

const GENERATE_PATH: &str = "functions/v1/generate-rewards";

/// HTTP implementation of `RewardGenerator`.
///
/// Every failure (transport, status, malformed body) is reported as
/// `GenerationUnavailable`; callers never retry.
pub struct GeneratorClient {
    http: Client,
    url: String,
    headers: HeaderMap,
}

impl GeneratorClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http: config.build_http()?,
            url: format!("{}/{}", config.base_url, GENERATE_PATH),
            headers: config.default_headers()?,
        })
    }
}

#[async_trait]
impl RewardGenerator for GeneratorClient {
    #[instrument(skip(self, context), fields(level = context.level))]
    async fn generate(&self, context: &GenerationContext) -> Result<Vec<RewardCandidate>> {
        let response = self
            .http
            .post(&self.url)
            .headers(self.headers.clone())
            .json(context)
            .send()
            .await
            .map_err(|e| {
                warn!("Generation request failed: {}", e);
                Error::GenerationUnavailable(e.to_string())
            })?;

        if let Some(err) = check_auth_error(&response) {
            return Err(Error::GenerationUnavailable(err.to_string()));
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generation service returned HTTP {}: {}", status, body);
            return Err(Error::GenerationUnavailable(format!("HTTP {}", status)));
        }

        let parsed: GenerationResponse = response.json().await.map_err(|e| {
            warn!("Malformed generation response: {}", e);
            Error::GenerationUnavailable(e.to_string())
        })?;

        debug!("Generation returned {} candidates", parsed.rewards.len());
        Ok(parsed.rewards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let config = ClientConfig::new("https://backend.example.co/", "key", "token");
        let client = GeneratorClient::new(&config).unwrap();
        assert_eq!(
            client.url,
            "https://backend.example.co/functions/v1/generate-rewards"
        );
    }

    #[test]
    fn test_response_without_rewards_is_empty() {
        let parsed: GenerationResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.rewards.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_generation_unavailable() {
        // Port 9 on localhost (discard) refuses connections
        let config = ClientConfig::new("http://127.0.0.1:9", "key", "token")
            .with_timeout(std::time::Duration::from_secs(2));
        let client = GeneratorClient::new(&config).unwrap();
        let err = client.generate(&GenerationContext::default()).await.unwrap_err();
        assert!(matches!(err, Error::GenerationUnavailable(_)));
    }
}
