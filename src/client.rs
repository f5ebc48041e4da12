//! HTTP client for the recommendation backend.
//!
//! The backend is an external collaborator; this module fixes only the two
//! endpoints the page consumes. Transport is deliberately dumb: no retries,
//! no caching, no request deduplication. Interpreting the `status` field of
//! a parsed response is the controller's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::model::{InsightsResponse, RecommendationRequest, RecommendationResponse};

/// Seam between the controller and the backend, so tests can substitute a
/// scripted backend without a network.
#[async_trait]
pub trait MealApi: Send + Sync {
    /// `POST /recommend`
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, ApiError>;

    /// `GET /user_insights/{user_id}?date={date}`
    async fn user_insights(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<InsightsResponse, ApiError>;
}

/// `MealApi` over reqwest with connection pooling and configured timeouts.
pub struct HttpMealApi {
    http: Client,
    base_url: String,
}

impl HttpMealApi {
    pub fn new(config: &BackendConfig) -> Self {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MealApi for HttpMealApi {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, ApiError> {
        tracing::debug!(date = %request.date, goal = %request.goal, "requesting recommendation");

        let response = self
            .http
            .post(format!("{}/recommend", self.base_url))
            .json(request)
            .send()
            .await?;

        Ok(response.json::<RecommendationResponse>().await?)
    }

    async fn user_insights(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<InsightsResponse, ApiError> {
        tracing::debug!(user_id, date, "loading insights");

        let response = self
            .http
            .get(format!("{}/user_insights/{}", self.base_url, user_id))
            .query(&[("date", date)])
            .send()
            .await?;

        Ok(response.json::<InsightsResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let api = HttpMealApi::new(&BackendConfig {
            base_url: "http://backend.local/".to_string(),
            ..BackendConfig::default()
        });
        assert_eq!(api.base_url, "http://backend.local");
    }
}
