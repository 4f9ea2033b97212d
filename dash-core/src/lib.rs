//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - Forecast request building and response normalization
//! - Forecast and alert providers over a shared HTTP layer (timeout, retry, cache)
//! - WMO condition labels and the presenter that drives a display surface
//!
//! It is used by `weather-dash`, but the presenter can drive any [`DisplaySurface`].

pub mod cache;
pub mod conditions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod model;
pub mod normalize;
pub mod present;
pub mod provider;
pub mod request;
pub mod retry;

pub use conditions::ConditionTable;
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::DashboardError;
pub use model::{AlertRecord, DailyRecord, HourlyRecord, Units};
pub use normalize::Forecast;
pub use present::{DisplaySurface, Presenter, RecordingSurface};
pub use provider::{AlertsProvider, ForecastProvider};
pub use request::ForecastRequest;
