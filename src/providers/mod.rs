mod sheets;
mod weather;

use crate::core::error::FetchError;
use crate::core::models::SourceId;
use crate::core::settings::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;

pub use sheets::SheetSource;
pub use weather::WeatherSource;

#[async_trait]
pub trait RemoteSource: Send + Sync {
    fn identifier(&self) -> SourceId;
    /// Performs one request. Retries are left to the next scheduled trigger.
    async fn fetch_json(&self) -> Result<serde_json::Value, FetchError>;
    fn has_valid_credentials(&self) -> bool;
    fn credential_error_hint(&self) -> &'static str;
}

pub fn build_client(settings: &Settings) -> Result<Client> {
    Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

pub fn build_sources(settings: &Settings) -> Result<Vec<Arc<dyn RemoteSource>>> {
    let client = build_client(settings)?;
    let mut sources: Vec<Arc<dyn RemoteSource>> = Vec::new();

    if settings.weather.enabled {
        sources.push(Arc::new(WeatherSource::new(client.clone(), &settings.weather)));
    }

    if settings.notes.enabled {
        sources.push(Arc::new(SheetSource::new(client, &settings.notes)));
    }

    Ok(sources)
}

/// GET `url` and parse the body as JSON.
pub async fn fetch_json(client: &Client, url: Url) -> Result<serde_json::Value, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::from_status(status, &body));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
}

/// Reject payloads that are valid JSON but not what the upstream API
/// returns, so they never replace a good cached record.
pub fn check_payload_shape(source: SourceId, payload: &serde_json::Value) -> Result<(), FetchError> {
    match source {
        SourceId::Weather => {
            if payload
                .pointer("/data/timelines/0/intervals")
                .is_some_and(|v| v.is_array())
            {
                Ok(())
            } else {
                Err(FetchError::Parse(
                    "weather payload missing data.timelines[0].intervals".to_string(),
                ))
            }
        }
        SourceId::Notes if !payload.is_object() => Err(FetchError::Parse(
            "notes payload is not an object".to_string(),
        )),
        SourceId::Notes => match payload.get("values") {
            None => Ok(()),
            Some(values) if values.is_array() => Ok(()),
            Some(_) => Err(FetchError::Parse(
                "notes payload `values` is not an array".to_string(),
            )),
        },
    }
}
