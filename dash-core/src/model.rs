use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Hourly series the forecast provider understands.
///
/// The serde names are the provider's wire vocabulary, so a config file with a typo fails to
/// parse instead of producing a request the provider rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HourlyField {
    #[serde(rename = "temperature_2m")]
    Temperature2m,
    #[serde(rename = "weather_code")]
    WeatherCode,
    #[serde(rename = "precipitation_probability")]
    PrecipitationProbability,
    #[serde(rename = "snowfall")]
    Snowfall,
}

impl HourlyField {
    pub const REQUIRED: [HourlyField; 2] = [HourlyField::Temperature2m, HourlyField::WeatherCode];

    pub fn as_str(&self) -> &'static str {
        match self {
            HourlyField::Temperature2m => "temperature_2m",
            HourlyField::WeatherCode => "weather_code",
            HourlyField::PrecipitationProbability => "precipitation_probability",
            HourlyField::Snowfall => "snowfall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DailyField {
    #[serde(rename = "weather_code")]
    WeatherCode,
    #[serde(rename = "temperature_2m_max")]
    Temperature2mMax,
    #[serde(rename = "temperature_2m_min")]
    Temperature2mMin,
}

impl DailyField {
    pub const REQUIRED: [DailyField; 3] =
        [DailyField::WeatherCode, DailyField::Temperature2mMax, DailyField::Temperature2mMin];

    pub fn as_str(&self) -> &'static str {
        match self {
            DailyField::WeatherCode => "weather_code",
            DailyField::Temperature2mMax => "temperature_2m_max",
            DailyField::Temperature2mMin => "temperature_2m_min",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    Kmh,
    Ms,
    #[default]
    Mph,
    Kn,
}

impl WindSpeedUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindSpeedUnit::Kmh => "kmh",
            WindSpeedUnit::Ms => "ms",
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Kn => "kn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationUnit {
    Mm,
    #[default]
    Inch,
}

impl PrecipitationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecipitationUnit::Mm => "mm",
            PrecipitationUnit::Inch => "inch",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PrecipitationUnit::Mm => "mm",
            PrecipitationUnit::Inch => "in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Units {
    pub temperature: TemperatureUnit,
    pub wind_speed: WindSpeedUnit,
    pub precipitation: PrecipitationUnit,
}

impl Units {
    pub fn metric() -> Self {
        Self {
            temperature: TemperatureUnit::Celsius,
            wind_speed: WindSpeedUnit::Kmh,
            precipitation: PrecipitationUnit::Mm,
        }
    }
}

/// One hour of forecast. Timestamps are wall-clock time in the provider's timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub weather_code: i32,
    pub precipitation_probability: Option<f64>,
    pub snowfall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_max: f64,
    pub temp_min: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertRecord {
    pub event: String,
    pub headline: String,
    pub description: String,
    pub severity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_match_serde_vocabulary() {
        for field in [
            HourlyField::Temperature2m,
            HourlyField::WeatherCode,
            HourlyField::PrecipitationProbability,
            HourlyField::Snowfall,
        ] {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }

        for field in DailyField::REQUIRED {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn legacy_field_spelling_is_rejected() {
        let err = serde_json::from_str::<HourlyField>("\"weathercode\"");
        assert!(err.is_err());
    }

    #[test]
    fn metric_units() {
        let units = Units::metric();
        assert_eq!(units.temperature.symbol(), "°C");
        assert_eq!(units.wind_speed.as_str(), "kmh");
        assert_eq!(units.precipitation.as_str(), "mm");
    }
}
