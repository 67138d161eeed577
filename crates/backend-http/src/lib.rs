//! Prediction service backend.
//!
//! Provides the `OppositionBackend` trait and its HTTP implementation.
//! Each trait method maps to exactly one remote call; nothing is retried.

pub mod config;
pub mod credentials;

pub use config::BackendConfig;
pub use credentials::{BearerToken, CredentialError, CredentialProvider, StaticCredentials};

use opposition_model::{
    BatchGsSimilarityRequest, CasePredictionRequest, CasePredictionResult,
    GoodServiceLikelihoodOutput, GsSimilarityRequest, HealthStatus, MarkSimilarityOutput,
    MarkSimilarityRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub const MARK_SIMILARITY_PATH: &str = "/mark_similarity";
pub const GS_SIMILARITY_PATH: &str = "/gs_similarity";
pub const BATCH_GS_SIMILARITY_PATH: &str = "/batch_gs_similarity";
pub const CASE_PREDICTION_PATH: &str = "/case_prediction";
pub const HEALTH_PATH: &str = "/health";

/// Errors from prediction service calls.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Unauthenticated(#[from] CredentialError),

    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Decode(String),

    #[error("API health check failed with status {0}")]
    HealthCheck(u16),
}

/// Coarse classification used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorCategory {
    Configuration,
    Authentication,
    Api,
}

impl BackendError {
    pub fn category(&self) -> BackendErrorCategory {
        match self {
            Self::Configuration(_) => BackendErrorCategory::Configuration,
            Self::Unauthenticated(_) => BackendErrorCategory::Authentication,
            Self::Status { .. } | Self::Transport(_) | Self::Decode(_) | Self::HealthCheck(_) => {
                BackendErrorCategory::Api
            }
        }
    }
}

/// Trait for prediction service backends (HTTP, in-memory stubs, ...).
pub trait OppositionBackend: Send + Sync {
    /// Stage 1: compare the two marks.
    fn mark_similarity(
        &self,
        request: &MarkSimilarityRequest,
    ) -> impl Future<Output = Result<MarkSimilarityOutput, BackendError>> + Send;

    /// Compare a single goods/services pair.
    fn gs_similarity(
        &self,
        request: &GsSimilarityRequest,
    ) -> impl Future<Output = Result<GoodServiceLikelihoodOutput, BackendError>> + Send;

    /// Stage 2: compare every applicant good against every opponent good.
    ///
    /// Results are ordered outer-applicant, inner-opponent.
    fn batch_gs_similarity(
        &self,
        request: &BatchGsSimilarityRequest,
    ) -> impl Future<Output = Result<Vec<GoodServiceLikelihoodOutput>, BackendError>> + Send;

    /// Stage 3: predict the opposition outcome.
    fn case_prediction(
        &self,
        request: &CasePredictionRequest,
    ) -> impl Future<Output = Result<CasePredictionResult, BackendError>> + Send;

    /// Check if the service is up. Unauthenticated.
    fn health_check(&self) -> impl Future<Output = Result<HealthStatus, BackendError>> + Send;

    /// Get the backend name for logging.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// HTTP backend talking JSON to the prediction service.
pub struct HttpBackend<C> {
    config: BackendConfig,
    credentials: C,
    client: reqwest::Client,
}

impl<C: CredentialProvider> HttpBackend<C> {
    /// Create a new HTTP backend.
    pub fn new(config: BackendConfig, credentials: C) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            credentials,
            client,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// POST `body` to `path` under the current bearer token.
    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        // Both preconditions are checked before anything touches the network.
        let url = self.config.endpoint(path)?;
        let token = self.credentials.current_token().await?;

        tracing::debug!(endpoint = path, "Calling prediction service");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.detail);
            let message = detail.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown status").to_string()
            });

            tracing::error!(
                endpoint = path,
                status = status.as_u16(),
                error = %message,
                "API request failed"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl<C: CredentialProvider> OppositionBackend for HttpBackend<C> {
    async fn mark_similarity(
        &self,
        request: &MarkSimilarityRequest,
    ) -> Result<MarkSimilarityOutput, BackendError> {
        self.post_json(MARK_SIMILARITY_PATH, request).await
    }

    async fn gs_similarity(
        &self,
        request: &GsSimilarityRequest,
    ) -> Result<GoodServiceLikelihoodOutput, BackendError> {
        self.post_json(GS_SIMILARITY_PATH, request).await
    }

    async fn batch_gs_similarity(
        &self,
        request: &BatchGsSimilarityRequest,
    ) -> Result<Vec<GoodServiceLikelihoodOutput>, BackendError> {
        self.post_json(BATCH_GS_SIMILARITY_PATH, request).await
    }

    async fn case_prediction(
        &self,
        request: &CasePredictionRequest,
    ) -> Result<CasePredictionResult, BackendError> {
        self.post_json(CASE_PREDICTION_PATH, request).await
    }

    async fn health_check(&self) -> Result<HealthStatus, BackendError> {
        let url = self.config.endpoint(HEALTH_PATH)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::HealthCheck(response.status().as_u16()));
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
