use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::auth::AuthContext;
use crate::api::error::RequestError;
use crate::api::types::{
    DashboardStats, HealthStatus, Market, MarketDetails, MarketEvent, MarketsResponse,
};
use crate::settings::BotSettings;

/// Thin client over the bot's HTTP API. One method per endpoint, no retries.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth: Arc<AuthContext>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        auth: Arc<AuthContext>,
        timeout: Option<Duration>,
    ) -> Result<Self, RequestError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RequestError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RequestError::Network)?;

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub async fn stats(&self) -> Result<DashboardStats, RequestError> {
        let url = self.endpoint(&["api", "stats"])?;
        let stats: DashboardStats = self.send(self.client.get(url)).await?;
        if !stats.is_consistent() {
            warn!(
                "Backend reported more active markets ({}) than total ({})",
                stats.active_markets, stats.total_markets
            );
        }
        Ok(stats)
    }

    pub async fn markets(&self) -> Result<Vec<Market>, RequestError> {
        let url = self.endpoint(&["api", "markets"])?;
        let response: MarketsResponse = self.send(self.client.get(url)).await?;
        Ok(response.markets.unwrap_or_default())
    }

    pub async fn market_details(&self, market_id: &str) -> Result<MarketDetails, RequestError> {
        let url = self.endpoint(&["api", "markets", market_id])?;
        self.send(self.client.get(url)).await
    }

    pub async fn market_events(&self, market_id: &str) -> Result<Vec<MarketEvent>, RequestError> {
        let url = self.endpoint(&["api", "markets", market_id, "events"])?;
        self.send(self.client.get(url)).await
    }

    pub async fn health(&self) -> Result<HealthStatus, RequestError> {
        let url = self.endpoint(&["api", "health"])?;
        let body: serde_json::Value = self.send(self.client.get(url)).await?;
        Ok(HealthStatus::from_body(&body))
    }

    pub async fn save_settings(
        &self,
        settings: &BotSettings,
    ) -> Result<serde_json::Value, RequestError> {
        let url = self.endpoint(&["api", "settings"])?;
        self.send(self.client.post(url).json(settings)).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RequestError> {
        let credentials = self.auth.credentials();
        let request = match &credentials.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(RequestError::Network)?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        if status == StatusCode::UNAUTHORIZED {
            self.auth.handle_unauthorized(&credentials);
            return Err(RequestError::AuthExpired);
        }

        let body = response.text().await.map_err(RequestError::Network)?;
        if !status.is_success() {
            return Err(RequestError::http(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(RequestError::Decode)
    }
}
