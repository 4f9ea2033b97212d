use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::{
    cache::ResponseCache,
    conditions::ConditionTable,
    config::Config,
    error::Result,
    http::HttpFetcher,
    present::{AlertsState, DashboardView, DisplaySurface, Presenter},
    provider::{AlertsProvider, ForecastProvider, NwsAlertsProvider, OpenMeteoProvider},
    request::ForecastRequest,
};

/// One configured dashboard: providers, request and labels, ready to render on demand.
#[derive(Debug)]
pub struct Dashboard {
    location_name: String,
    request: ForecastRequest,
    forecast: Box<dyn ForecastProvider>,
    alerts: Option<Box<dyn AlertsProvider>>,
    conditions: ConditionTable,
}

impl Dashboard {
    /// Wire up the Open-Meteo and NWS providers described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let http =
            HttpFetcher::new(config.http.timeout(), &config.user_agent(), config.http.retry_policy())?;

        // Alerts always go to the network; only forecast bodies are cached.
        let alerts_http = http.clone();
        let mut forecast_http = http;

        if config.cache.enabled {
            let cache = if config.cache.persist {
                match Config::cache_file_path() {
                    Ok(path) => ResponseCache::open(path, config.cache.ttl()),
                    Err(e) => {
                        tracing::warn!("Falling back to in-memory response cache: {:#}", e);
                        ResponseCache::in_memory(config.cache.ttl())
                    }
                }
            } else {
                ResponseCache::in_memory(config.cache.ttl())
            };
            forecast_http = forecast_http.with_cache(Arc::new(cache));
        }

        let forecast: Box<dyn ForecastProvider> =
            Box::new(OpenMeteoProvider::new(config.forecast.endpoint.clone(), forecast_http));

        let alerts: Option<Box<dyn AlertsProvider>> = if config.alerts.enabled {
            Some(Box::new(NwsAlertsProvider::new(config.alerts.endpoint.clone(), alerts_http)))
        } else {
            None
        };

        Ok(Self::with_providers(
            config.location.name.clone(),
            config.forecast_request()?,
            forecast,
            alerts,
            ConditionTable::wmo(),
        ))
    }

    pub fn with_providers(
        location_name: String,
        request: ForecastRequest,
        forecast: Box<dyn ForecastProvider>,
        alerts: Option<Box<dyn AlertsProvider>>,
        conditions: ConditionTable,
    ) -> Self {
        Self { location_name, request, forecast, alerts, conditions }
    }

    /// Fetch forecast and alerts concurrently.
    ///
    /// Alert failures are folded into [`AlertsState::Unavailable`]; only forecast failures
    /// return `Err`.
    pub async fn load_at(&self, now: DateTime<Utc>) -> Result<DashboardView> {
        let forecast_fut = self.forecast.get_forecast(&self.request);
        let alerts_fut = async {
            match &self.alerts {
                None => AlertsState::Disabled,
                Some(provider) => {
                    match provider.get_alerts(self.request.latitude, self.request.longitude).await {
                        Ok(list) => AlertsState::Active(list),
                        Err(e) => {
                            tracing::warn!("Alerts unavailable: {}", e);
                            AlertsState::Unavailable(e.to_string())
                        }
                    }
                }
            }
        };

        let (forecast, alerts) = tokio::join!(forecast_fut, alerts_fut);
        let forecast = forecast?;

        Ok(DashboardView {
            local_now: forecast.local_time(now),
            forecast,
            alerts,
            refreshed_at: now.with_timezone(&Local),
        })
    }

    /// Load and draw the dashboard. Any failure is drawn as one inline error.
    pub async fn render(&self, surface: &mut dyn DisplaySurface) {
        self.render_at(surface, Utc::now()).await
    }

    pub async fn render_at(&self, surface: &mut dyn DisplaySurface, now: DateTime<Utc>) {
        let presenter = Presenter::new(
            &self.conditions,
            &self.location_name,
            self.request.units,
            &self.request.hourly_fields,
        );

        match self.load_at(now).await {
            Ok(view) => presenter.render(surface, &view),
            Err(e) => {
                tracing::error!("Forecast failed: {}", e);
                presenter.render_error(surface, &e);
            }
        }
    }
}
