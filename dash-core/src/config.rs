use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{
    model::{DailyField, HourlyField, PrecipitationUnit, TemperatureUnit, Units, WindSpeedUnit},
    provider::{nws::DEFAULT_ALERTS_ENDPOINT, open_meteo::DEFAULT_FORECAST_ENDPOINT},
    request::ForecastRequest,
    retry::RetryPolicy,
};

/// Largest accepted `http.backoff_factor`, in seconds.
pub const MAX_BACKOFF_FACTOR: f64 = 60.0;

/// Where the dashboard is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self { name: "Dorset, VT".to_string(), latitude: 43.2548, longitude: -73.0973 }
    }
}

/// What to ask the forecast provider for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub endpoint: String,
    pub hourly: Vec<HourlyField>,
    pub daily: Vec<DailyField>,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub precipitation_unit: PrecipitationUnit,
    /// IANA name, or "auto" to let the provider pick from the coordinates.
    pub timezone: String,
    pub forecast_days: u8,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FORECAST_ENDPOINT.to_string(),
            hourly: HourlyField::REQUIRED.to_vec(),
            daily: DailyField::REQUIRED.to_vec(),
            temperature_unit: TemperatureUnit::Fahrenheit,
            wind_speed_unit: WindSpeedUnit::Mph,
            precipitation_unit: PrecipitationUnit::Inch,
            timezone: "auto".to_string(),
            forecast_days: 10,
        }
    }
}

impl ForecastConfig {
    pub fn units(&self) -> Units {
        Units {
            temperature: self.temperature_unit,
            wind_speed: self.wind_speed_unit,
            precipitation: self.precipitation_unit,
        }
    }

    pub fn set_units(&mut self, units: Units) {
        self.temperature_unit = units.temperature;
        self.wind_speed_unit = units.wind_speed;
        self.precipitation_unit = units.precipitation;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// Contact string sent in the User-Agent, e.g. an email address.
    pub contact: Option<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { enabled: true, endpoint: DEFAULT_ALERTS_ENDPOINT.to_string(), contact: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self { timeout_secs: 10, max_retries: retry.max_retries, backoff_factor: retry.backoff_factor }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.backoff_factor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    /// Keep the cache in a file under the platform cache directory.
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, ttl_secs: 3600, persist: true }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [location]
/// name = "Dorset, VT"
/// latitude = 43.2548
/// longitude = -73.0973
///
/// [forecast]
/// hourly = ["temperature_2m", "weather_code", "precipitation_probability"]
/// temperature_unit = "celsius"
/// forecast_days = 7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub location: LocationConfig,
    pub forecast: ForecastConfig,
    pub alerts: AlertsConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate().with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted response cache.
    pub fn cache_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().join("responses.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast.endpoint.trim().is_empty() {
            bail!("forecast.endpoint must not be empty");
        }
        if self.alerts.enabled && self.alerts.endpoint.trim().is_empty() {
            bail!("alerts.endpoint must not be empty when alerts are enabled");
        }
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be at least 1");
        }
        if !(0.0..=MAX_BACKOFF_FACTOR).contains(&self.http.backoff_factor) {
            bail!("http.backoff_factor must be between 0 and {MAX_BACKOFF_FACTOR} seconds");
        }

        self.forecast_request()?;
        Ok(())
    }

    /// The forecast request described by this config.
    pub fn forecast_request(&self) -> Result<ForecastRequest> {
        let request = ForecastRequest::new(
            self.location.latitude,
            self.location.longitude,
            &self.forecast.hourly,
            &self.forecast.daily,
            self.forecast.units(),
            self.forecast.timezone.clone(),
            self.forecast.forecast_days,
        )?;

        Ok(request)
    }

    /// User-Agent for outbound requests; the alerts provider requires a contact.
    pub fn user_agent(&self) -> String {
        let base = concat!("weather-dash/", env!("CARGO_PKG_VERSION"));
        match self.alerts.contact.as_deref().map(str::trim) {
            Some(contact) if !contact.is_empty() => format!("{base} ({contact})"),
            _ => base.to_string(),
        }
    }
}
