use crate::core::error::FetchError;
use crate::core::models::SourceId;
use crate::core::settings::NotesSettings;
use crate::providers::{fetch_json, RemoteSource};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Cell values of one range from the Google Sheets v4 API.
pub struct SheetSource {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    sheet_id: Option<String>,
    range: String,
}

impl SheetSource {
    pub fn new(client: Client, settings: &NotesSettings) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            sheet_id: settings.sheet_id.clone(),
            range: settings.range.clone(),
        }
    }

    fn request_url(&self) -> Result<Url, FetchError> {
        let (Some(key), Some(sheet_id)) = (self.api_key.as_deref(), self.sheet_id.as_deref())
        else {
            return Err(FetchError::MissingCredentials(self.credential_error_hint()));
        };

        let invalid =
            |reason: String| FetchError::Parse(format!("Invalid sheets endpoint {}: {}", self.endpoint, reason));

        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(sheet_id)
            .push("values")
            .push(&self.range);
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }
}

#[async_trait]
impl RemoteSource for SheetSource {
    fn identifier(&self) -> SourceId {
        SourceId::Notes
    }

    async fn fetch_json(&self) -> Result<serde_json::Value, FetchError> {
        let url = self.request_url()?;
        tracing::debug!(range = %self.range, "Requesting sheet values");
        fetch_json(&self.client, url).await
    }

    fn has_valid_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.sheet_id.as_deref().is_some_and(|s| !s.is_empty())
    }

    fn credential_error_hint(&self) -> &'static str {
        "Set notes.sheet_id and notes.api_key (or WALL_DASH_SHEETS_API_KEY)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(endpoint: String) -> NotesSettings {
        NotesSettings {
            endpoint,
            api_key: Some("sheet-key".to_string()),
            sheet_id: Some("doc42".to_string()),
            ..NotesSettings::default()
        }
    }

    #[test]
    fn test_request_url_layout() {
        let source = SheetSource::new(
            Client::new(),
            &settings("https://sheets.googleapis.com/v4/spreadsheets/".into()),
        );
        let url = source.request_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/doc42/values/Sheet1!A1:C100?key=sheet-key"
        );
    }

    #[test]
    fn test_missing_sheet_id() {
        let mut notes = settings("https://example.com".into());
        notes.sheet_id = None;
        let source = SheetSource::new(Client::new(), &notes);
        assert!(!source.has_valid_credentials());
        assert!(matches!(
            source.request_url(),
            Err(FetchError::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/doc42/values/Sheet1!A1:C100"))
            .and(query_param("key", "sheet-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Sheet1!A1:C100",
                "values": [["Field Notes", "Shop/Office Notes", "Upcoming"]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = SheetSource::new(
            Client::new(),
            &settings(format!("{}/v4/spreadsheets", server.uri())),
        );
        let payload = source.fetch_json().await.unwrap();
        assert_eq!(payload["values"][0][2], "Upcoming");
    }
}
