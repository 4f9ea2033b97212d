//! Forecast request construction.
//!
//! Multi-value parameters are produced from typed field lists and handed to reqwest's query
//! encoder. URLs are never assembled by string concatenation.

use reqwest::{Client, Request};

use crate::{
    error::{DashboardError, Result},
    model::{DailyField, HourlyField, Units},
};

pub const MAX_FORECAST_DAYS: u8 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly_fields: Vec<HourlyField>,
    pub daily_fields: Vec<DailyField>,
    pub units: Units,
    pub timezone: String,
    pub forecast_days: u8,
}

impl ForecastRequest {
    /// Validate inputs and normalize the field lists.
    ///
    /// Fields the normalizer depends on are appended when missing and duplicates are dropped,
    /// keeping the first occurrence.
    pub fn new(
        latitude: f64,
        longitude: f64,
        hourly_fields: &[HourlyField],
        daily_fields: &[DailyField],
        units: Units,
        timezone: impl Into<String>,
        forecast_days: u8,
    ) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DashboardError::InvalidRequest(format!(
                "latitude {latitude} is outside -90..=90"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DashboardError::InvalidRequest(format!(
                "longitude {longitude} is outside -180..=180"
            )));
        }
        if !(1..=MAX_FORECAST_DAYS).contains(&forecast_days) {
            return Err(DashboardError::InvalidRequest(format!(
                "forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {forecast_days}"
            )));
        }

        let timezone = timezone.into();
        if timezone.trim().is_empty() {
            return Err(DashboardError::InvalidRequest("timezone must not be empty".into()));
        }

        Ok(Self {
            latitude,
            longitude,
            hourly_fields: with_required(hourly_fields, &HourlyField::REQUIRED),
            daily_fields: with_required(daily_fields, &DailyField::REQUIRED),
            units,
            timezone,
            forecast_days,
        })
    }

    pub fn has_hourly(&self, field: HourlyField) -> bool {
        self.hourly_fields.contains(&field)
    }

    /// Query parameters in the order the provider documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("hourly", join_fields(self.hourly_fields.iter().map(HourlyField::as_str))),
            ("daily", join_fields(self.daily_fields.iter().map(DailyField::as_str))),
            ("temperature_unit", self.units.temperature.as_str().to_string()),
            ("wind_speed_unit", self.units.wind_speed.as_str().to_string()),
            ("precipitation_unit", self.units.precipitation.as_str().to_string()),
            ("timezone", self.timezone.clone()),
            ("forecast_days", self.forecast_days.to_string()),
        ]
    }

    /// Build a GET request against `endpoint` with the encoded query.
    pub fn to_http(&self, http: &Client, endpoint: &str) -> Result<Request> {
        http.get(endpoint)
            .query(&self.query_pairs())
            .build()
            .map_err(|e| DashboardError::InvalidRequest(format!("cannot build request: {e}")))
    }
}

fn with_required<T: Copy + PartialEq>(fields: &[T], required: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(fields.len() + required.len());
    for field in fields.iter().chain(required) {
        if !out.contains(field) {
            out.push(*field);
        }
    }
    out
}

// The provider takes one comma-separated value per multi-value parameter.
fn join_fields<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PrecipitationUnit, TemperatureUnit, WindSpeedUnit};
    use std::collections::HashMap;

    fn dorset() -> ForecastRequest {
        ForecastRequest::new(
            43.2548,
            -73.0973,
            &[HourlyField::Temperature2m, HourlyField::WeatherCode],
            &DailyField::REQUIRED,
            Units::default(),
            "auto",
            10,
        )
        .unwrap()
    }

    fn decoded_query(request: &Request) -> HashMap<String, Vec<String>> {
        let mut out: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in request.url().query_pairs() {
            out.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        out
    }

    #[test]
    fn multi_value_fields_survive_the_encoder() {
        let req = dorset();
        let http = Client::new();
        let built = req.to_http(&http, "https://api.open-meteo.com/v1/forecast").unwrap();

        let query = decoded_query(&built);
        assert_eq!(query["hourly"], vec!["temperature_2m,weather_code"]);
        assert_eq!(query["daily"], vec!["weather_code,temperature_2m_max,temperature_2m_min"]);
        assert_eq!(query["latitude"], vec!["43.2548"]);
        assert_eq!(query["longitude"], vec!["-73.0973"]);
        assert_eq!(query["temperature_unit"], vec!["fahrenheit"]);
        assert_eq!(query["wind_speed_unit"], vec!["mph"]);
        assert_eq!(query["precipitation_unit"], vec!["inch"]);
        assert_eq!(query["timezone"], vec!["auto"]);
        assert_eq!(query["forecast_days"], vec!["10"]);
        assert_eq!(built.url().path(), "/v1/forecast");
    }

    #[test]
    fn timezone_with_slash_is_escaped() {
        let req = ForecastRequest::new(
            51.5,
            -0.12,
            &[],
            &[],
            Units::metric(),
            "Europe/London",
            3,
        )
        .unwrap();
        let built = req.to_http(&Client::new(), "https://example.test/v1/forecast").unwrap();

        assert!(built.url().query().unwrap().contains("timezone=Europe%2FLondon"));
        assert_eq!(decoded_query(&built)["timezone"], vec!["Europe/London"]);
    }

    #[test]
    fn required_fields_are_added_and_duplicates_dropped() {
        let req = ForecastRequest::new(
            0.0,
            0.0,
            &[HourlyField::Snowfall, HourlyField::Snowfall, HourlyField::WeatherCode],
            &[DailyField::Temperature2mMin],
            Units::default(),
            "UTC",
            1,
        )
        .unwrap();

        assert_eq!(
            req.hourly_fields,
            vec![HourlyField::Snowfall, HourlyField::WeatherCode, HourlyField::Temperature2m]
        );
        assert_eq!(
            req.daily_fields,
            vec![
                DailyField::Temperature2mMin,
                DailyField::WeatherCode,
                DailyField::Temperature2mMax
            ]
        );
        assert!(req.has_hourly(HourlyField::Snowfall));
        assert!(!req.has_hourly(HourlyField::PrecipitationProbability));
    }

    #[test]
    fn forecast_days_bounds() {
        let make = |days| {
            ForecastRequest::new(0.0, 0.0, &[], &[], Units::default(), "auto", days)
        };

        assert!(make(1).is_ok());
        assert!(make(16).is_ok());

        let err = make(0).unwrap_err();
        assert!(err.to_string().contains("forecast_days must be between 1 and 16"));
        assert!(make(17).is_err());
    }

    #[test]
    fn coordinates_are_validated() {
        let units = Units {
            temperature: TemperatureUnit::Celsius,
            wind_speed: WindSpeedUnit::Ms,
            precipitation: PrecipitationUnit::Mm,
        };

        let err = ForecastRequest::new(91.0, 0.0, &[], &[], units, "auto", 7).unwrap_err();
        assert!(err.to_string().contains("latitude"));

        let err = ForecastRequest::new(0.0, -181.0, &[], &[], units, "auto", 7).unwrap_err();
        assert!(err.to_string().contains("longitude"));

        assert!(ForecastRequest::new(f64::NAN, 0.0, &[], &[], units, "auto", 7).is_err());
        assert!(ForecastRequest::new(0.0, 0.0, &[], &[], units, " ", 7).is_err());
    }
}
