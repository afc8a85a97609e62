use crate::core::error::FetchError;
use crate::core::models::SourceId;
use crate::core::settings::WeatherSettings;
use crate::providers::{fetch_json, RemoteSource};
use async_trait::async_trait;
use reqwest::{Client, Url};

const FIELDS: &str = "temperatureMax,temperatureMin,weatherCode,windSpeed";

/// Daily timelines from the Tomorrow.io v4 API.
pub struct WeatherSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl WeatherSource {
    pub fn new(client: Client, settings: &WeatherSettings) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            latitude: settings.latitude,
            longitude: settings.longitude,
        }
    }

    fn request_url(&self) -> Result<Url, FetchError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingCredentials(self.credential_error_hint()))?;
        let location = format!("{},{}", self.latitude, self.longitude);

        Url::parse_with_params(
            &self.endpoint,
            &[
                ("location", location.as_str()),
                ("fields", FIELDS),
                ("units", "imperial"),
                ("timesteps", "1d"),
                ("apikey", key),
            ],
        )
        .map_err(|e| FetchError::Parse(format!("Invalid weather endpoint {}: {}", self.endpoint, e)))
    }
}

#[async_trait]
impl RemoteSource for WeatherSource {
    fn identifier(&self) -> SourceId {
        SourceId::Weather
    }

    async fn fetch_json(&self) -> Result<serde_json::Value, FetchError> {
        let url = self.request_url()?;
        tracing::debug!(endpoint = %self.endpoint, "Requesting weather timelines");
        fetch_json(&self.client, url).await
    }

    fn has_valid_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn credential_error_hint(&self) -> &'static str {
        "Set weather.api_key or WALL_DASH_WEATHER_API_KEY"
    }
}
