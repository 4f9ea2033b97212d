use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    model::AlertRecord,
    normalize::Forecast,
    request::ForecastRequest,
};

pub mod nws;
pub mod open_meteo;

pub use nws::NwsAlertsProvider;
pub use open_meteo::OpenMeteoProvider;

/// Source of hourly and daily forecast tables.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn get_forecast(&self, request: &ForecastRequest) -> Result<Forecast>;
}

/// Source of active weather alerts for a point.
#[async_trait]
pub trait AlertsProvider: Send + Sync + Debug {
    async fn get_alerts(&self, latitude: f64, longitude: f64) -> Result<Vec<AlertRecord>>;
}
