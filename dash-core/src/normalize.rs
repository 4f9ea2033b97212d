//! Reshapes the forecast provider's parallel-array payload into ordered hourly and daily rows.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::{
    error::{DashboardError, Result},
    model::{DailyRecord, HourlyRecord},
};

/// Number of hourly rows kept after sorting.
pub const HOURLY_WINDOW: usize = 36;

const PROVIDER: &str = "forecast";
const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DAILY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub hourly: Vec<HourlyRecord>,
    pub daily: Vec<DailyRecord>,
    /// Offset of the provider-local timestamps from UTC.
    pub utc_offset: FixedOffset,
}

impl Forecast {
    /// Wall-clock time in the forecast's timezone for a UTC instant.
    pub fn local_time(&self, now: chrono::DateTime<chrono::Utc>) -> NaiveDateTime {
        now.with_timezone(&self.utc_offset).naive_local()
    }
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    #[serde(default)]
    utc_offset_seconds: Option<i32>,
    hourly: Option<RawHourly>,
    daily: Option<RawDaily>,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Option<Vec<String>>,
    temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(alias = "weathercode")]
    weather_code: Option<Vec<Option<i32>>>,
    precipitation_probability: Option<Vec<Option<f64>>>,
    snowfall: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Option<Vec<String>>,
    #[serde(alias = "weathercode")]
    weather_code: Option<Vec<Option<i32>>>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
    temperature_2m_min: Option<Vec<Option<f64>>>,
}

/// Parse a forecast body into sorted tables, keeping the first [`HOURLY_WINDOW`] hours.
pub fn normalize_forecast(body: &str) -> Result<Forecast> {
    let raw: RawForecast = serde_json::from_str(body)
        .map_err(|e| DashboardError::malformed(PROVIDER, format!("invalid JSON: {e}")))?;

    let hourly = raw
        .hourly
        .ok_or_else(|| DashboardError::malformed(PROVIDER, "missing \"hourly\" section"))?;
    let daily = raw
        .daily
        .ok_or_else(|| DashboardError::malformed(PROVIDER, "missing \"daily\" section"))?;

    let offset_secs = raw.utc_offset_seconds.unwrap_or(0);
    let utc_offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        DashboardError::malformed(PROVIDER, format!("utc_offset_seconds {offset_secs} out of range"))
    })?;

    let mut hourly = normalize_hourly(hourly)?;
    hourly.sort_by_key(|r| r.timestamp);
    hourly.truncate(HOURLY_WINDOW);

    let mut daily = normalize_daily(daily)?;
    daily.sort_by_key(|r| r.date);

    Ok(Forecast { hourly, daily, utc_offset })
}

fn normalize_hourly(raw: RawHourly) -> Result<Vec<HourlyRecord>> {
    let time = required("hourly.time", raw.time)?;
    let len = time.len();

    let temperature = required("hourly.temperature_2m", raw.temperature_2m)?;
    check_len("hourly.temperature_2m", temperature.len(), len)?;
    let weather_code = required("hourly.weather_code", raw.weather_code)?;
    check_len("hourly.weather_code", weather_code.len(), len)?;

    if let Some(series) = &raw.precipitation_probability {
        check_len("hourly.precipitation_probability", series.len(), len)?;
    }
    if let Some(series) = &raw.snowfall {
        check_len("hourly.snowfall", series.len(), len)?;
    }

    time.iter()
        .enumerate()
        .map(|(i, stamp)| {
            let timestamp = NaiveDateTime::parse_from_str(stamp, HOURLY_TIME_FORMAT).map_err(|e| {
                DashboardError::malformed(PROVIDER, format!("bad hourly timestamp {stamp:?}: {e}"))
            })?;

            Ok(HourlyRecord {
                timestamp,
                temperature: value_at("hourly.temperature_2m", &temperature, i)?,
                weather_code: value_at("hourly.weather_code", &weather_code, i)?,
                precipitation_probability: optional_at(&raw.precipitation_probability, i),
                snowfall: optional_at(&raw.snowfall, i),
            })
        })
        .collect()
}

fn normalize_daily(raw: RawDaily) -> Result<Vec<DailyRecord>> {
    let time = required("daily.time", raw.time)?;
    let len = time.len();

    let weather_code = required("daily.weather_code", raw.weather_code)?;
    check_len("daily.weather_code", weather_code.len(), len)?;
    let temp_max = required("daily.temperature_2m_max", raw.temperature_2m_max)?;
    check_len("daily.temperature_2m_max", temp_max.len(), len)?;
    let temp_min = required("daily.temperature_2m_min", raw.temperature_2m_min)?;
    check_len("daily.temperature_2m_min", temp_min.len(), len)?;

    time.iter()
        .enumerate()
        .map(|(i, day)| {
            let date = NaiveDate::parse_from_str(day, DAILY_DATE_FORMAT).map_err(|e| {
                DashboardError::malformed(PROVIDER, format!("bad daily date {day:?}: {e}"))
            })?;

            Ok(DailyRecord {
                date,
                weather_code: value_at("daily.weather_code", &weather_code, i)?,
                temp_max: value_at("daily.temperature_2m_max", &temp_max, i)?,
                temp_min: value_at("daily.temperature_2m_min", &temp_min, i)?,
            })
        })
        .collect()
}

fn required<T>(name: &str, series: Option<Vec<T>>) -> Result<Vec<T>> {
    series.ok_or_else(|| DashboardError::malformed(PROVIDER, format!("missing series {name}")))
}

fn check_len(name: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(DashboardError::malformed(
            PROVIDER,
            format!("series {name} has {actual} values but time has {expected}"),
        ));
    }
    Ok(())
}

fn value_at<T: Copy>(name: &str, series: &[Option<T>], i: usize) -> Result<T> {
    series
        .get(i)
        .copied()
        .flatten()
        .ok_or_else(|| DashboardError::malformed(PROVIDER, format!("null value in {name} at index {i}")))
}

fn optional_at(series: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    series.as_ref().and_then(|s| s.get(i).copied().flatten())
}

/// Index of the record whose timestamp equals `now` truncated to the hour.
pub fn find_current_hour(records: &[HourlyRecord], now: NaiveDateTime) -> Option<usize> {
    let hour = truncate_to_hour(now)?;
    records.iter().position(|r| r.timestamp == hour)
}

/// The current hour if present, otherwise the earliest record.
///
/// Falling back to the earliest hour rather than the nearest one is a known weak spot: a stale
/// cached forecast will show a temperature from hours ago.
pub fn current_hour_or_earliest(records: &[HourlyRecord], now: NaiveDateTime) -> Option<&HourlyRecord> {
    let index = find_current_hour(records, now).unwrap_or(0);
    records.get(index)
}

fn truncate_to_hour(t: NaiveDateTime) -> Option<NaiveDateTime> {
    t.with_minute(0)?.with_second(0)?.with_nanosecond(0)
}
