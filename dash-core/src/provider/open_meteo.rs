use async_trait::async_trait;

use crate::{
    error::Result,
    http::HttpFetcher,
    normalize::{Forecast, normalize_forecast},
    request::ForecastRequest,
};

use super::ForecastProvider;

pub const DEFAULT_FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    endpoint: String,
    http: HttpFetcher,
}

impl OpenMeteoProvider {
    pub fn new(endpoint: impl Into<String>, http: HttpFetcher) -> Self {
        Self { endpoint: endpoint.into(), http }
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn get_forecast(&self, request: &ForecastRequest) -> Result<Forecast> {
        let http_request = request.to_http(self.http.client(), &self.endpoint)?;
        let body = self.http.fetch_text("Open-Meteo", http_request).await?;
        normalize_forecast(&body)
    }
}
