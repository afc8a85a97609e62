mod notes;
pub mod text;
mod weather;

use crate::core::models::SourceId;
use serde::Serialize;

use notes::render_notes;
use weather::render_weather;

pub use notes::NotesView;
pub use weather::{WeatherDisplay, WeatherView};

/// One independently rendered part of a section. `Unknown` is a degraded
/// render, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "lowercase")]
pub enum Panel<T> {
    Ready(T),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    Weather(WeatherDisplay),
    Notes(NotesView),
}

impl DisplayState {
    pub fn source(&self) -> SourceId {
        match self {
            DisplayState::Weather(_) => SourceId::Weather,
            DisplayState::Notes(_) => SourceId::Notes,
        }
    }

    pub fn unavailable(source: SourceId) -> Option<Self> {
        match source {
            SourceId::Weather => Some(DisplayState::Weather(WeatherDisplay::Unavailable)),
            SourceId::Notes => None,
        }
    }
}

/// Project a payload into its section's view model. Recomputed in full on
/// every call.
pub fn render(source: SourceId, payload: &serde_json::Value) -> DisplayState {
    match source {
        SourceId::Weather => DisplayState::Weather(WeatherDisplay::Ready(render_weather(payload))),
        SourceId::Notes => DisplayState::Notes(render_notes(payload)),
    }
}

/// Latest display state of every section on screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub weather: Option<WeatherDisplay>,
    pub notes: Option<NotesView>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole section the state belongs to.
    pub fn apply(&mut self, state: DisplayState) {
        match state {
            DisplayState::Weather(weather) => self.weather = Some(weather),
            DisplayState::Notes(notes) => self.notes = Some(notes),
        }
    }
}
