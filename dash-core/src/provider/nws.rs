use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::{
    error::{DashboardError, Result},
    http::HttpFetcher,
    model::AlertRecord,
};

use super::AlertsProvider;

pub const DEFAULT_ALERTS_ENDPOINT: &str = "https://api.weather.gov/alerts/active";

const PROVIDER: &str = "NWS alerts";

/// Active alerts from the US National Weather Service.
///
/// The NWS API refuses requests without an identifying `User-Agent`; the [`HttpFetcher`] passed
/// in is expected to carry one.
#[derive(Debug, Clone)]
pub struct NwsAlertsProvider {
    endpoint: String,
    http: HttpFetcher,
}

impl NwsAlertsProvider {
    pub fn new(endpoint: impl Into<String>, http: HttpFetcher) -> Self {
        Self { endpoint: endpoint.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct AlertCollection {
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    event: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    severity: Option<String>,
}

impl From<AlertProperties> for AlertRecord {
    fn from(p: AlertProperties) -> Self {
        AlertRecord {
            event: p.event.unwrap_or_default(),
            headline: p.headline.unwrap_or_default(),
            description: p.description.unwrap_or_default(),
            severity: p.severity.unwrap_or_default(),
        }
    }
}

pub fn parse_alerts(body: &str) -> Result<Vec<AlertRecord>> {
    let parsed: AlertCollection = serde_json::from_str(body)
        .map_err(|e| DashboardError::malformed(PROVIDER, format!("invalid alerts JSON: {e}")))?;

    Ok(parsed.features.into_iter().map(|f| f.properties.into()).collect())
}

#[async_trait]
impl AlertsProvider for NwsAlertsProvider {
    async fn get_alerts(&self, latitude: f64, longitude: f64) -> Result<Vec<AlertRecord>> {
        let point = format!("{latitude:.4},{longitude:.4}");
        let request = self
            .http
            .client()
            .get(&self.endpoint)
            .query(&[("point", point.as_str())])
            .header(ACCEPT, "application/geo+json")
            .build()
            .map_err(|e| DashboardError::InvalidRequest(format!("cannot build alerts request: {e}")))?;

        let body = self.http.fetch_text(PROVIDER, request).await?;
        parse_alerts(&body)
    }
}
