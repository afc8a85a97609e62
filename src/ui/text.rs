use crate::ui::{Dashboard, NotesView, Panel, WeatherDisplay, WeatherView};

const RULE: &str = "────────────────────────────────────────";
pub const WEATHER_UNAVAILABLE: &str = "Weather data unavailable";

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

/// Plain-text frame for a terminal or kiosk console.
pub fn render_frame(dashboard: &Dashboard, clock_line: &str) -> String {
    let mut out = String::new();
    line(&mut out, clock_line);
    line(&mut out, RULE);

    match &dashboard.weather {
        Some(weather) => write_weather(&mut out, weather),
        None => line(&mut out, "Weather: waiting for data"),
    }

    line(&mut out, RULE);

    match &dashboard.notes {
        Some(notes) => write_notes(&mut out, notes),
        None => line(&mut out, "Notes: waiting for data"),
    }

    out
}

pub fn write_weather(out: &mut String, weather: &WeatherDisplay) {
    match weather {
        WeatherDisplay::Unavailable => line(out, WEATHER_UNAVAILABLE),
        WeatherDisplay::Ready(view) => write_weather_view(out, view),
    }
}

fn write_weather_view(out: &mut String, view: &WeatherView) {
    line(out, "Current Weather");
    match &view.current {
        Panel::Ready(current) => {
            line(out, &format!("  {}", current.summary));
            line(out, &format!("  {}", current.temperature));
            line(out, &format!("  {}", current.wind));
        }
        Panel::Unknown => line(out, "  ❓ Unknown Weather"),
    }

    line(out, "Forecast");
    match &view.forecast {
        Panel::Ready(days) if days.is_empty() => line(out, "  (no forecast)"),
        Panel::Ready(days) => {
            for day in days {
                line(
                    out,
                    &format!(
                        "  {:<10} {:<18} {}  {}",
                        day.day, day.summary, day.temperature, day.wind
                    ),
                );
            }
        }
        Panel::Unknown => line(out, "  ❓ Unknown"),
    }
}

pub fn write_notes(out: &mut String, notes: &NotesView) {
    for (title, panel) in notes.sections() {
        line(out, title);
        match panel {
            Panel::Ready(items) if items.is_empty() => line(out, "  (none)"),
            Panel::Ready(items) => {
                for item in items {
                    line(out, &format!("  • {}", item));
                }
            }
            Panel::Unknown => line(out, "  ❓ Unknown"),
        }
    }
}
