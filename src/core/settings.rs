use crate::core::models::SourceId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "wall-dash";
pub const WEATHER_KEY_ENV: &str = "WALL_DASH_WEATHER_API_KEY";
pub const SHEETS_KEY_ENV: &str = "WALL_DASH_SHEETS_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub weather: WeatherSettings,
    pub notes: NotesSettings,
    pub storage: StorageSettings,
    pub display: DisplaySettings,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weather: WeatherSettings::default(),
            notes: NotesSettings::default(),
            storage: StorageSettings::default(),
            display: DisplaySettings::default(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub interval_minutes: u32,
    pub endpoint: String,
    pub startup_jitter_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            latitude: 38.2527,
            longitude: -85.7585,
            interval_minutes: 15,
            endpoint: "https://api.tomorrow.io/v4/timelines".to_string(),
            startup_jitter_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub sheet_id: Option<String>,
    pub range: String,
    pub interval_minutes: u32,
    pub endpoint: String,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            sheet_id: None,
            range: "Sheet1!A1:C100".to_string(),
            interval_minutes: 30,
            endpoint: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub start_visible: bool,
    pub redraw_secs: u64,
    pub clear_screen: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            start_visible: true,
            redraw_secs: 60,
            clear_screen: false,
        }
    }
}

impl DisplaySettings {
    pub fn redraw_period(&self) -> Duration {
        Duration::from_secs(self.redraw_secs.max(1))
    }
}

impl WeatherSettings {
    pub fn interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.interval_minutes))
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }

    pub fn startup_jitter(&self) -> Duration {
        Duration::from_secs(self.startup_jitter_secs)
    }
}

impl NotesSettings {
    pub fn interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.interval_minutes))
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }
}

impl StorageSettings {
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        dirs::cache_dir()
            .map(|p| p.join(APP_NAME))
            .context("Could not determine cache directory")
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME).join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config directory")?;

        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let settings: Settings = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            tracing::info!(?path, "Loaded config");
            settings
        } else {
            tracing::info!(?path, "Config file not found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides(|name| std::env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(WEATHER_KEY_ENV).filter(|k| !k.is_empty()) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = lookup(SHEETS_KEY_ENV).filter(|k| !k.is_empty()) {
            self.notes.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.weather.latitude) {
            anyhow::bail!(
                "weather.latitude must be between -90 and 90, got {}",
                self.weather.latitude
            );
        }
        if !(-180.0..=180.0).contains(&self.weather.longitude) {
            anyhow::bail!(
                "weather.longitude must be between -180 and 180, got {}",
                self.weather.longitude
            );
        }
        if self.weather.interval_minutes == 0 {
            anyhow::bail!("weather.interval_minutes must be greater than 0");
        }
        if self.notes.interval_minutes == 0 {
            anyhow::bail!("notes.interval_minutes must be greater than 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn interval_for(&self, source: SourceId) -> chrono::Duration {
        match source {
            SourceId::Weather => self.weather.interval(),
            SourceId::Notes => self.notes.interval(),
        }
    }
}
