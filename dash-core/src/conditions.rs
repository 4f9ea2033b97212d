use std::collections::HashMap;

pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Display labels for WMO weather codes.
///
/// Built once and handed to whoever needs labels. Lookups are total: codes missing from the
/// table resolve to [`UNKNOWN_CONDITION`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionTable {
    labels: HashMap<i32, String>,
}

impl ConditionTable {
    /// The decorated WMO labels used by the dashboard.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn wmo() -> Self {
        Self::from_entries([
            (0, "☀️ Sunny"),
            (1, "🌤 Mainly Clear"),
            (2, "⛅ Partly Cloudy"),
            (3, "☁️ Overcast"),
            (45, "🌫 Foggy"),
            (48, "🌫 Rime Fog"),
            (51, "🌦 Light Drizzle"),
            (53, "🌦 Moderate Drizzle"),
            (55, "🌦 Dense Drizzle"),
            (61, "🌧 Slight Rain"),
            (63, "🌧 Moderate Rain"),
            (65, "🌧 Heavy Rain"),
            (71, "❄️ Slight Snow"),
            (73, "❄️ Moderate Snow"),
            (75, "❄️ Heavy Snow"),
            (77, "❄️ Snow Grains"),
            (80, "🌦 Slight Rain Showers"),
            (81, "🌧 Moderate Rain Showers"),
            (82, "⛈ Violent Rain Showers"),
            (85, "❄️ Slight Snow Showers"),
            (86, "❄️ Heavy Snow Showers"),
            (95, "🌩 Thunderstorm"),
        ])
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        Self { labels: entries.into_iter().map(|(code, label)| (code, label.into())).collect() }
    }

    pub fn label(&self, code: i32) -> &str {
        self.labels.get(&code).map(String::as_str).unwrap_or(UNKNOWN_CONDITION)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ConditionTable {
    fn default() -> Self {
        Self::wmo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        let table = ConditionTable::wmo();
        assert_eq!(table.label(0), "☀️ Sunny");
        assert_eq!(table.label(3), "☁️ Overcast");
        assert_eq!(table.label(61), "🌧 Slight Rain");
        assert_eq!(table.label(82), "⛈ Violent Rain Showers");
        assert_eq!(table.label(95), "🌩 Thunderstorm");
        assert_eq!(table.len(), 22);
    }

    #[test]
    fn lookup_is_total() {
        let table = ConditionTable::wmo();
        for code in [-1, -100, 4, 56, 96, 99, 100, i32::MIN, i32::MAX] {
            assert_eq!(table.label(code), UNKNOWN_CONDITION, "code {code}");
        }
    }

    #[test]
    fn custom_table_falls_back_too() {
        let table = ConditionTable::from_entries([(0, "Clear".to_string())]);
        assert_eq!(table.label(0), "Clear");
        assert_eq!(table.label(1), "Unknown");

        let empty = ConditionTable::from_entries(Vec::<(i32, &str)>::new());
        assert!(empty.is_empty());
        assert_eq!(empty.label(0), "Unknown");
    }
}
