use crate::core::clock::format_age;
use crate::core::models::RequestLog;
use crate::core::settings::{Settings, StorageBackend};
use crate::core::store::open_store;
use anyhow::Result;
use chrono::{DateTime, Local, Utc};

/// Prints the weather request log, oldest first.
pub async fn run(json: bool) -> Result<()> {
    let settings = Settings::load()?;

    if settings.storage.backend == StorageBackend::Memory {
        anyhow::bail!("Cache storage is in-memory; the request log only lives in the daemon");
    }

    let log = open_store(&settings.storage)?.request_log()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        print!("{}", text_output(&log, Utc::now()));
    }

    Ok(())
}

fn text_output(log: &RequestLog, now: DateTime<Utc>) -> String {
    if log.is_empty() {
        return "No weather requests recorded\n".to_string();
    }

    let mut out = format!("Last {} weather requests\n", log.len());
    for entry in log.entries() {
        out.push_str(&format!(
            "  {}  ({})\n",
            entry.time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            format_age(entry.time, now)
        ));
    }
    out
}
