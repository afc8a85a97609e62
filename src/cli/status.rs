use crate::core::clock::format_age;
use crate::core::models::{FreshnessRecord, SourceId};
use crate::core::schedule::should_fetch;
use crate::core::settings::{Settings, StorageBackend};
use crate::core::store::{open_store, CacheStore};
use crate::ui::text::{write_notes, write_weather};
use crate::ui::{render, DisplayState};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct StatusOutput {
    sources: BTreeMap<SourceId, SourceStatus>,
    #[serde(with = "chrono::serde::ts_seconds")]
    checked_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct SourceStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    last_fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<String>,
    stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<DisplayState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(json: bool, source_filter: Option<String>) -> Result<()> {
    let settings = Settings::load()?;

    if settings.storage.backend == StorageBackend::Memory {
        anyhow::bail!("Cache storage is in-memory; only the running daemon holds data");
    }

    let sources = select_sources(source_filter.as_deref())?;
    let store = open_store(&settings.storage)?;
    let now = Utc::now();

    let results: BTreeMap<SourceId, SourceStatus> = sources
        .into_iter()
        .map(|source| {
            let status = source_status(store.as_ref(), &settings, source, now);
            (source, status)
        })
        .collect();

    if json {
        let output = StatusOutput {
            sources: results,
            checked_at: now,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", text_output(&results));
    }

    Ok(())
}

fn select_sources(filter: Option<&str>) -> Result<Vec<SourceId>> {
    match filter {
        None => Ok(SourceId::ALL.to_vec()),
        Some(name) => match SourceId::parse(name) {
            Some(source) => Ok(vec![source]),
            None => anyhow::bail!("Unknown source: {}. Valid sources: weather, notes", name),
        },
    }
}

fn source_status(
    store: &dyn CacheStore,
    settings: &Settings,
    source: SourceId,
    now: DateTime<Utc>,
) -> SourceStatus {
    match store.read(source) {
        Ok(Some(record)) => record_status(&record, settings, source, now),
        Ok(None) => SourceStatus {
            last_fetched_at: None,
            age: None,
            stale: true,
            display: None,
            error: None,
        },
        Err(e) => SourceStatus {
            last_fetched_at: None,
            age: None,
            stale: true,
            display: None,
            error: Some(format!("{:#}", e)),
        },
    }
}

fn record_status(
    record: &FreshnessRecord,
    settings: &Settings,
    source: SourceId,
    now: DateTime<Utc>,
) -> SourceStatus {
    SourceStatus {
        last_fetched_at: Some(record.last_fetched_at),
        age: Some(format_age(record.last_fetched_at, now)),
        stale: should_fetch(
            Some(record.last_fetched_at),
            now,
            settings.interval_for(source),
        ),
        display: Some(render(source, &record.payload)),
        error: None,
    }
}

fn text_output(results: &BTreeMap<SourceId, SourceStatus>) -> String {
    let mut out = String::new();

    for (i, (source, status)) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        if let Some(error) = &status.error {
            out.push_str(&format!("{}\n  Error: {}\n", source.name(), error));
            continue;
        }

        let Some(age) = &status.age else {
            out.push_str(&format!("{}\n  No cached data\n", source.name()));
            continue;
        };

        let freshness = if status.stale { "stale" } else { "fresh" };
        out.push_str(&format!("{} (fetched {}, {})\n", source.name(), age, freshness));

        match &status.display {
            Some(DisplayState::Weather(weather)) => write_weather(&mut out, weather),
            Some(DisplayState::Notes(notes)) => write_notes(&mut out, notes),
            None => {}
        }
    }

    out
}
