//! Turns forecast tables into display calls.
//!
//! The presenter knows nothing about terminals or web pages; it drives a [`DisplaySurface`].

use chrono::{DateTime, Local, NaiveDateTime};

use crate::{
    conditions::ConditionTable,
    error::DashboardError,
    model::{AlertRecord, HourlyField, TemperatureUnit, Units},
    normalize::{Forecast, HOURLY_WINDOW, current_hour_or_earliest},
};

pub const NO_ACTIVE_ALERTS: &str = "No active alerts";

const HOURLY_LABEL_FORMAT: &str = "%m/%d %I:%M %p";
const DAILY_LABEL_FORMAT: &str = "%Y-%m-%d";
const REFRESHED_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// All cells of the named column, top to bottom.
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(|r| r.get(idx).map(String::as_str).unwrap_or("")).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Rendering primitives the presenter needs.
pub trait DisplaySurface {
    fn headline(&mut self, text: &str);
    fn subheader(&mut self, text: &str);
    fn text(&mut self, text: &str);
    fn divider(&mut self);
    fn success(&mut self, text: &str);
    fn warning(&mut self, text: &str);
    fn error(&mut self, text: &str);
    fn line_chart(&mut self, y_label: &str, points: &[ChartPoint]);
    /// Start a collapsible section; everything until [`DisplaySurface::end_expander`] is inside.
    fn begin_expander(&mut self, title: &str, expanded: bool);
    fn end_expander(&mut self);
    fn table(&mut self, table: &Table);
}

/// Outcome of the alerts sub-flow. A failure here never blocks the forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertsState {
    Disabled,
    Active(Vec<AlertRecord>),
    Unavailable(String),
}

/// Everything one render needs.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub forecast: Forecast,
    pub alerts: AlertsState,
    /// Wall-clock time in the forecast's timezone, used for current-hour selection.
    pub local_now: NaiveDateTime,
    pub refreshed_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct Presenter<'a> {
    conditions: &'a ConditionTable,
    location_name: &'a str,
    units: Units,
    hourly_fields: &'a [HourlyField],
}

impl<'a> Presenter<'a> {
    pub fn new(
        conditions: &'a ConditionTable,
        location_name: &'a str,
        units: Units,
        hourly_fields: &'a [HourlyField],
    ) -> Self {
        Self { conditions, location_name, units, hourly_fields }
    }

    fn temp_unit(&self) -> TemperatureUnit {
        self.units.temperature
    }

    pub fn render(&self, surface: &mut dyn DisplaySurface, view: &DashboardView) {
        self.render_current(surface, view);
        self.render_alerts(surface, &view.alerts);
        self.render_hourly(surface, &view.forecast);
        self.render_daily(surface, &view.forecast);
    }

    pub fn render_error(&self, surface: &mut dyn DisplaySurface, err: &DashboardError) {
        surface.error(&format!("Could not load the forecast: {err}"));
    }

    fn render_current(&self, surface: &mut dyn DisplaySurface, view: &DashboardView) {
        let symbol = self.temp_unit().symbol();
        match current_hour_or_earliest(&view.forecast.hourly, view.local_now) {
            Some(current) => {
                surface.headline(&format!("{:.1}{symbol}", current.temperature));
                surface.subheader(&format!(
                    "{}: {}",
                    self.location_name,
                    self.conditions.label(current.weather_code)
                ));
            }
            None => {
                surface.headline(&format!("--{symbol}"));
                surface.subheader(&format!("{}: no hourly data", self.location_name));
            }
        }
        surface.text(&format!("Refreshed: {}", view.refreshed_at.format(REFRESHED_FORMAT)));
        surface.divider();
    }

    fn render_alerts(&self, surface: &mut dyn DisplaySurface, alerts: &AlertsState) {
        match alerts {
            AlertsState::Disabled => {}
            AlertsState::Active(list) if list.is_empty() => {
                surface.begin_expander("Active Alerts", false);
                surface.success(NO_ACTIVE_ALERTS);
                surface.end_expander();
            }
            AlertsState::Active(list) => {
                surface.begin_expander(&format!("Active Alerts ({})", list.len()), true);
                for alert in list {
                    surface.warning(&format!("{} ({})", alert.event, alert.severity));
                    if !alert.headline.is_empty() {
                        surface.text(&alert.headline);
                    }
                    if !alert.description.is_empty() {
                        surface.text(&alert.description);
                    }
                }
                surface.end_expander();
            }
            AlertsState::Unavailable(reason) => {
                surface.begin_expander("Active Alerts", false);
                surface.warning(&format!("Alerts unavailable: {reason}"));
                surface.end_expander();
            }
        }
    }

    fn render_hourly(&self, surface: &mut dyn DisplaySurface, forecast: &Forecast) {
        let temp_header = format!("Temp ({})", self.temp_unit().symbol());

        surface.subheader(&format!("Next {HOURLY_WINDOW} Hours"));
        let points: Vec<ChartPoint> = forecast
            .hourly
            .iter()
            .map(|r| ChartPoint {
                label: r.timestamp.format(HOURLY_LABEL_FORMAT).to_string(),
                value: r.temperature,
            })
            .collect();
        surface.line_chart(&temp_header, &points);

        surface.begin_expander("View Hourly Table", false);
        surface.table(&self.hourly_table(forecast));
        surface.end_expander();
    }

    pub fn hourly_table(&self, forecast: &Forecast) -> Table {
        let show_precip = self.hourly_fields.contains(&HourlyField::PrecipitationProbability);
        let show_snow = self.hourly_fields.contains(&HourlyField::Snowfall);

        let mut headers = vec![
            "Time".to_string(),
            format!("Temp ({})", self.temp_unit().symbol()),
            "Condition".to_string(),
        ];
        if show_precip {
            headers.push("Precip (%)".to_string());
        }
        if show_snow {
            headers.push(format!("Snowfall ({})", self.snowfall_unit()));
        }

        let mut table = Table::new(headers);
        for r in &forecast.hourly {
            let mut row = vec![
                r.timestamp.format(HOURLY_LABEL_FORMAT).to_string(),
                format!("{:.1}", r.temperature),
                self.conditions.label(r.weather_code).to_string(),
            ];
            if show_precip {
                row.push(optional_cell(r.precipitation_probability, 0));
            }
            if show_snow {
                row.push(optional_cell(r.snowfall, 2));
            }
            table.push_row(row);
        }
        table
    }

    // Open-Meteo reports snowfall in cm for metric requests and inches otherwise.
    fn snowfall_unit(&self) -> &'static str {
        match self.units.precipitation {
            crate::model::PrecipitationUnit::Mm => "cm",
            crate::model::PrecipitationUnit::Inch => "in",
        }
    }

    fn render_daily(&self, surface: &mut dyn DisplaySurface, forecast: &Forecast) {
        surface.divider();
        surface.subheader(&format!("{}-Day Forecast", forecast.daily.len()));
        surface.table(&self.daily_table(forecast));
    }

    pub fn daily_table(&self, forecast: &Forecast) -> Table {
        let symbol = self.temp_unit().symbol();
        let mut table = Table::new([
            "Date".to_string(),
            "Condition".to_string(),
            format!("High ({symbol})"),
            format!("Low ({symbol})"),
        ]);

        for d in &forecast.daily {
            table.push_row(vec![
                d.date.format(DAILY_LABEL_FORMAT).to_string(),
                self.conditions.label(d.weather_code).to_string(),
                format!("{:.1}", d.temp_max),
                format!("{:.1}", d.temp_min),
            ]);
        }
        table
    }
}

fn optional_cell(value: Option<f64>, precision: usize) -> String {
    value.map(|v| format!("{v:.precision$}")).unwrap_or_else(|| "-".to_string())
}

/// One recorded [`DisplaySurface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Headline(String),
    Subheader(String),
    Text(String),
    Divider,
    Success(String),
    Warning(String),
    Error(String),
    LineChart { y_label: String, points: Vec<ChartPoint> },
    BeginExpander { title: String, expanded: bool },
    EndExpander,
    Table(Table),
}

/// A surface that records calls instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> Vec<&Table> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingSurface {
    fn headline(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Headline(text.to_string()));
    }

    fn subheader(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Subheader(text.to_string()));
    }

    fn text(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Text(text.to_string()));
    }

    fn divider(&mut self) {
        self.events.push(SurfaceEvent::Divider);
    }

    fn success(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Success(text.to_string()));
    }

    fn warning(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Warning(text.to_string()));
    }

    fn error(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Error(text.to_string()));
    }

    fn line_chart(&mut self, y_label: &str, points: &[ChartPoint]) {
        self.events
            .push(SurfaceEvent::LineChart { y_label: y_label.to_string(), points: points.to_vec() });
    }

    fn begin_expander(&mut self, title: &str, expanded: bool) {
        self.events.push(SurfaceEvent::BeginExpander { title: title.to_string(), expanded });
    }

    fn end_expander(&mut self) {
        self.events.push(SurfaceEvent::EndExpander);
    }

    fn table(&mut self, table: &Table) {
        self.events.push(SurfaceEvent::Table(table.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DailyRecord, HourlyRecord};
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn hour(t: &str, temperature: f64, code: i32) -> HourlyRecord {
        HourlyRecord {
            timestamp: at(t),
            temperature,
            weather_code: code,
            precipitation_probability: Some(20.0),
            snowfall: None,
        }
    }

    fn forecast() -> Forecast {
        Forecast {
            hourly: vec![
                hour("2024-01-01T09:00", 28.04, 3),
                hour("2024-01-01T10:00", 30.06, 61),
            ],
            daily: [(1, 0), (2, 61), (3, 95)]
                .iter()
                .map(|&(day, code)| DailyRecord {
                    date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                    weather_code: code,
                    temp_max: 40.0,
                    temp_min: 20.0,
                })
                .collect(),
            utc_offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn view(alerts: AlertsState, local_now: &str) -> DashboardView {
        DashboardView {
            forecast: forecast(),
            alerts,
            local_now: at(local_now),
            refreshed_at: Local.with_ymd_and_hms(2024, 1, 1, 10, 15, 0).unwrap(),
        }
    }

    fn render(view: &DashboardView, fields: &[HourlyField]) -> RecordingSurface {
        let conditions = ConditionTable::wmo();
        let presenter = Presenter::new(&conditions, "Dorset, VT", Units::default(), fields);
        let mut surface = RecordingSurface::new();
        presenter.render(&mut surface, view);
        surface
    }

    #[test]
    fn headline_uses_current_hour() {
        let surface = render(&view(AlertsState::Disabled, "2024-01-01T10:20"), &[]);

        assert_eq!(surface.events[0], SurfaceEvent::Headline("30.1°F".into()));
        assert_eq!(surface.events[1], SurfaceEvent::Subheader("Dorset, VT: 🌧 Slight Rain".into()));
        assert_eq!(surface.events[2], SurfaceEvent::Text("Refreshed: 10:15 AM".into()));
        assert_eq!(surface.events[3], SurfaceEvent::Divider);
    }

    #[test]
    fn headline_falls_back_to_earliest_hour() {
        let surface = render(&view(AlertsState::Disabled, "2024-01-01T18:00"), &[]);
        assert_eq!(surface.events[0], SurfaceEvent::Headline("28.0°F".into()));
        assert_eq!(surface.events[1], SurfaceEvent::Subheader("Dorset, VT: ☁️ Overcast".into()));
    }

    #[test]
    fn sections_come_in_order() {
        let surface = render(&view(AlertsState::Active(vec![]), "2024-01-01T10:00"), &[]);

        let kinds: Vec<&str> = surface
            .events
            .iter()
            .map(|e| match e {
                SurfaceEvent::Headline(_) => "headline",
                SurfaceEvent::Subheader(_) => "subheader",
                SurfaceEvent::Text(_) => "text",
                SurfaceEvent::Divider => "divider",
                SurfaceEvent::Success(_) => "success",
                SurfaceEvent::Warning(_) => "warning",
                SurfaceEvent::Error(_) => "error",
                SurfaceEvent::LineChart { .. } => "chart",
                SurfaceEvent::BeginExpander { .. } => "begin",
                SurfaceEvent::EndExpander => "end",
                SurfaceEvent::Table(_) => "table",
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                "headline", "subheader", "text", "divider", "begin", "success", "end",
                "subheader", "chart", "begin", "table", "end", "divider", "subheader", "table",
            ]
        );
    }

    #[test]
    fn empty_alerts_show_acknowledgement() {
        let surface = render(&view(AlertsState::Active(vec![]), "2024-01-01T10:00"), &[]);

        assert!(surface.events.contains(&SurfaceEvent::Success(NO_ACTIVE_ALERTS.into())));
        assert!(!surface.events.iter().any(|e| matches!(e, SurfaceEvent::Warning(_))));
    }

    #[test]
    fn alerts_are_itemized() {
        let alerts = vec![AlertRecord {
            event: "Winter Storm Warning".into(),
            headline: "Winter Storm Warning until 7 PM".into(),
            description: "Heavy snow.".into(),
            severity: "Severe".into(),
        }];
        let surface = render(&view(AlertsState::Active(alerts), "2024-01-01T10:00"), &[]);

        assert!(surface.events.contains(&SurfaceEvent::BeginExpander {
            title: "Active Alerts (1)".into(),
            expanded: true
        }));
        assert!(surface.events.contains(&SurfaceEvent::Warning("Winter Storm Warning (Severe)".into())));
        assert!(surface.events.contains(&SurfaceEvent::Text("Winter Storm Warning until 7 PM".into())));
        assert!(surface.events.contains(&SurfaceEvent::Text("Heavy snow.".into())));
        assert!(!surface.events.contains(&SurfaceEvent::Success(NO_ACTIVE_ALERTS.into())));
    }

    #[test]
    fn failed_alerts_show_warning() {
        let surface = render(
            &view(AlertsState::Unavailable("timed out".into()), "2024-01-01T10:00"),
            &[],
        );
        assert!(surface.events.contains(&SurfaceEvent::Warning("Alerts unavailable: timed out".into())));
    }

    #[test]
    fn daily_table_translates_codes() {
        let surface = render(&view(AlertsState::Disabled, "2024-01-01T10:00"), &[]);
        let daily = surface.tables().last().copied().unwrap().clone();

        assert_eq!(daily.headers, vec!["Date", "Condition", "High (°F)", "Low (°F)"]);
        assert_eq!(
            daily.column("Condition").unwrap(),
            vec!["☀️ Sunny", "🌧 Slight Rain", "🌩 Thunderstorm"]
        );
        assert_eq!(daily.column("Date").unwrap(), vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert!(surface.events.contains(&SurfaceEvent::Subheader("3-Day Forecast".into())));
    }

    #[test]
    fn hourly_table_formats_timestamps_and_optional_columns() {
        let conditions = ConditionTable::wmo();
        let fields = [HourlyField::PrecipitationProbability, HourlyField::Snowfall];
        let presenter = Presenter::new(&conditions, "x", Units::metric(), &fields);

        let table = presenter.hourly_table(&forecast());
        assert_eq!(
            table.headers,
            vec!["Time", "Temp (°C)", "Condition", "Precip (%)", "Snowfall (cm)"]
        );
        assert_eq!(table.rows[0], vec!["01/01 09:00 AM", "28.0", "☁️ Overcast", "20", "-"]);
    }

    #[test]
    fn chart_has_one_point_per_hour() {
        let surface = render(&view(AlertsState::Disabled, "2024-01-01T10:00"), &[]);
        let chart = surface
            .events
            .iter()
            .find_map(|e| match e {
                SurfaceEvent::LineChart { y_label, points } => Some((y_label.clone(), points.clone())),
                _ => None,
            })
            .unwrap();

        assert_eq!(chart.0, "Temp (°F)");
        assert_eq!(chart.1.len(), 2);
        assert_eq!(chart.1[1].value, 30.06);
    }

    #[test]
    fn error_is_a_single_inline_message() {
        let conditions = ConditionTable::wmo();
        let presenter = Presenter::new(&conditions, "x", Units::default(), &[]);
        let mut surface = RecordingSurface::new();

        presenter.render_error(&mut surface, &DashboardError::malformed("forecast", "missing \"hourly\" section"));
        assert_eq!(surface.events.len(), 1);
        assert!(surface.errors()[0].contains("missing \"hourly\" section"));
    }
}
