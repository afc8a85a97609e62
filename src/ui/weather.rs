use crate::ui::Panel;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use serde::Serialize;
use serde_json::Value;

const UNKNOWN_ICON: &str = "❓";
const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub summary: String,
    pub temperature: String,
    pub wind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub day: String,
    pub summary: String,
    pub temperature: String,
    pub wind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub current: Panel<CurrentWeather>,
    pub forecast: Panel<Vec<ForecastDay>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "view", rename_all = "lowercase")]
pub enum WeatherDisplay {
    Ready(WeatherView),
    Unavailable,
}

fn current_condition(code: &str) -> Option<(&'static str, &'static str)> {
    let entry = match code {
        "1000" => ("☀️", "Clear, Sunny"),
        "1100" => ("🌤️", "Mostly Clear"),
        "1101" => ("⛅", "Partly Cloudy"),
        "1102" => ("🌥️", "Mostly Cloudy"),
        "1001" => ("☁️", "Cloudy"),
        "4001" => ("🌧️", "Rain"),
        "5000" => ("❄️", "Snow"),
        "8000" => ("⛈️", "Thunderstorm"),
        "5100" => ("❄️", "Flurries"),
        "5001" => ("❄️", "Light Snow"),
        _ => return None,
    };
    Some(entry)
}

// The forecast strip uses a shorter table than the current panel.
fn forecast_condition(code: &str) -> Option<(&'static str, &'static str)> {
    let entry = match code {
        "1000" => ("☀️", "Clear"),
        "1100" => ("🌤️", "Mostly Clear"),
        "1001" => ("☁️", "Cloudy"),
        "4001" => ("🌧️", "Rain"),
        "5000" => ("❄️", "Snow"),
        "8000" => ("⛈️", "Thunderstorm"),
        "5100" => ("❄️", "Flurries"),
        "5001" => ("❄️", "Light Snow"),
        _ => return None,
    };
    Some(entry)
}

/// Weather codes arrive as strings or integers depending on the API version.
fn weather_code(values: Option<&Value>) -> Option<String> {
    match values?.get("weatherCode")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_text(values: Option<&Value>, field: &str) -> String {
    match values.and_then(|v| v.get(field)) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "--".to_string(),
    }
}

fn temperature_line(values: Option<&Value>) -> String {
    format!(
        "High: {}°F, Low: {}°F",
        field_text(values, "temperatureMax"),
        field_text(values, "temperatureMin")
    )
}

fn wind_line(values: Option<&Value>) -> String {
    format!("Wind: {} mph", field_text(values, "windSpeed"))
}

pub fn render_current(interval: &Value) -> CurrentWeather {
    let values = interval.get("values");
    let (icon, description) = weather_code(values)
        .as_deref()
        .and_then(current_condition)
        .unwrap_or((UNKNOWN_ICON, "Unknown Weather"));

    CurrentWeather {
        summary: format!("{} {}", icon, description),
        temperature: temperature_line(values),
        wind: wind_line(values),
    }
}

/// The day label is the weekday of `startTime` in `tz`.
pub fn render_forecast_day<Tz: TimeZone>(interval: &Value, tz: &Tz) -> ForecastDay
where
    Tz::Offset: Display,
{
    let values = interval.get("values");
    let (icon, description) = weather_code(values)
        .as_deref()
        .and_then(forecast_condition)
        .unwrap_or((UNKNOWN_ICON, "Unknown"));

    let day = interval
        .get("startTime")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(tz).format("%A").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    ForecastDay {
        day,
        summary: format!("{} {}", icon, description),
        temperature: temperature_line(values),
        wind: wind_line(values),
    }
}

pub fn render_weather(payload: &Value) -> WeatherView {
    render_weather_in(payload, &Local)
}

/// First daily interval is today; the next five are the forecast strip.
pub fn render_weather_in<Tz: TimeZone>(payload: &Value, tz: &Tz) -> WeatherView
where
    Tz::Offset: Display,
{
    let Some(intervals) = payload
        .pointer("/data/timelines/0/intervals")
        .and_then(Value::as_array)
    else {
        tracing::debug!("Weather payload has no daily intervals");
        return WeatherView {
            current: Panel::Unknown,
            forecast: Panel::Unknown,
        };
    };

    let current = intervals
        .first()
        .map(render_current)
        .map_or(Panel::Unknown, Panel::Ready);

    let forecast = intervals
        .iter()
        .skip(1)
        .take(FORECAST_DAYS)
        .map(|interval| render_forecast_day(interval, tz))
        .collect();

    WeatherView {
        current,
        forecast: Panel::Ready(forecast),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    fn interval(start: &str, code: Value) -> Value {
        json!({
            "startTime": start,
            "values": {
                "temperatureMax": 78.4,
                "temperatureMin": 61,
                "weatherCode": code,
                "windSpeed": 7.2
            }
        })
    }

    fn payload(intervals: Vec<Value>) -> Value {
        json!({"data": {"timelines": [{"timestep": "1d", "intervals": intervals}]}})
    }

    #[test]
    fn test_current_known_code() {
        let current = render_current(&interval("2025-06-02T10:00:00Z", json!("1000")));
        assert_eq!(current.summary, "☀️ Clear, Sunny");
        assert_eq!(current.temperature, "High: 78.4°F, Low: 61°F");
        assert_eq!(current.wind, "Wind: 7.2 mph");
    }

    #[test]
    fn test_numeric_code_is_accepted() {
        let current = render_current(&interval("2025-06-02T10:00:00Z", json!(4001)));
        assert_eq!(current.summary, "🌧️ Rain");
    }

    #[test]
    fn test_unknown_code_degrades_without_touching_forecast() {
        let view = render_weather_in(&payload(vec![
            interval("2025-06-02T10:00:00Z", json!("9999")),
            interval("2025-06-03T10:00:00Z", json!("1001")),
            interval("2025-06-04T10:00:00Z", json!("8000")),
        ]), &Utc);

        let Panel::Ready(current) = &view.current else {
            panic!("current panel should render");
        };
        assert_eq!(current.summary, "❓ Unknown Weather");

        let Panel::Ready(forecast) = &view.forecast else {
            panic!("forecast panel should render");
        };
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].day, "Tuesday");
        assert_eq!(forecast[0].summary, "☁️ Cloudy");
        assert_eq!(forecast[1].day, "Wednesday");
        assert_eq!(forecast[1].summary, "⛈️ Thunderstorm");
    }

    #[test]
    fn test_forecast_table_differs_from_current() {
        let day = render_forecast_day(&interval("2025-06-03T10:00:00Z", json!("1000")), &Utc);
        assert_eq!(day.summary, "☀️ Clear");

        let day = render_forecast_day(&interval("2025-06-03T10:00:00Z", json!("1101")), &Utc);
        assert_eq!(day.summary, "❓ Unknown");
    }

    #[test]
    fn test_forecast_is_capped_at_five_days() {
        let intervals = (0..8)
            .map(|d| interval(&format!("2025-06-{:02}T10:00:00Z", d + 1), json!("1100")))
            .collect();
        let view = render_weather_in(&payload(intervals), &Utc);

        let Panel::Ready(forecast) = view.forecast else {
            panic!("forecast panel should render");
        };
        assert_eq!(forecast.len(), 5);
        assert_eq!(forecast[0].day, "Monday");
        assert_eq!(forecast[4].day, "Friday");
    }

    #[test]
    fn test_forecast_weekday_follows_display_zone() {
        // Daily intervals start at 06:00 at the location, which is the
        // previous UTC date east of UTC+6.
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let start = interval("2025-06-02T21:00:00Z", json!("1000"));

        assert_eq!(render_forecast_day(&start, &tokyo).day, "Tuesday");
        assert_eq!(render_forecast_day(&start, &Utc).day, "Monday");

        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let evening = interval("2025-06-03T02:00:00Z", json!("1000"));
        assert_eq!(render_forecast_day(&evening, &west).day, "Monday");
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let day = render_forecast_day(&json!({"startTime": "not-a-date", "values": {}}), &Utc);
        assert_eq!(day.day, "Unknown");
        assert_eq!(day.summary, "❓ Unknown");
        assert_eq!(day.temperature, "High: --°F, Low: --°F");
        assert_eq!(day.wind, "Wind: -- mph");
    }

    #[test]
    fn test_missing_timeline_marks_both_panels_unknown() {
        let view = render_weather(&json!({"data": {}}));
        assert_eq!(view.current, Panel::Unknown);
        assert_eq!(view.forecast, Panel::Unknown);
    }

    #[test]
    fn test_empty_intervals() {
        let view = render_weather(&payload(vec![]));
        assert_eq!(view.current, Panel::Unknown);
        assert_eq!(view.forecast, Panel::Ready(vec![]));
    }
}
