use crate::core::error::FetchError;
use crate::core::models::{FreshnessRecord, RequestLogEntry, SourceId, REQUEST_LOG_CAPACITY};
use crate::core::schedule::should_fetch;
use crate::core::store::CacheStore;
use crate::providers::{check_payload_shape, RemoteSource};
use crate::ui::{render, DisplayState};
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Timer ticks fire one interval after the previous fetch started, while the
/// record is stamped when it finished. Ticks this close to due count as due.
const TIMER_TOLERANCE_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Checking,
    Fetching,
    Cached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    InitialLoad,
    Timer,
    VisibilityRegained,
    Manual,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Fetched,
    Cached,
    Failed(FetchError),
    /// Another sync for the same source was already running.
    Coalesced,
}

#[derive(Debug)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub display: Option<DisplayState>,
}

impl SyncReport {
    fn coalesced() -> Self {
        Self {
            outcome: SyncOutcome::Coalesced,
            display: None,
        }
    }
}

/// Resets the phase to `Idle` however the sync ends.
struct PhaseGuard<'a> {
    phase: &'a Mutex<SyncPhase>,
}

impl PhaseGuard<'_> {
    fn set(&self, next: SyncPhase) {
        *lock_phase(self.phase) = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *lock_phase(self.phase) = SyncPhase::Idle;
    }
}

fn lock_phase(phase: &Mutex<SyncPhase>) -> std::sync::MutexGuard<'_, SyncPhase> {
    phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fetch/cache/render cycle for one data source.
pub struct SourceSync {
    source: SourceId,
    interval: Duration,
    remote: Arc<dyn RemoteSource>,
    store: Arc<dyn CacheStore>,
    phase: Mutex<SyncPhase>,
    attempts: AtomicU64,
}

impl SourceSync {
    pub fn new(remote: Arc<dyn RemoteSource>, store: Arc<dyn CacheStore>, interval: Duration) -> Self {
        Self {
            source: remote.identifier(),
            interval,
            remote,
            store,
            phase: Mutex::new(SyncPhase::Idle),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    #[cfg(test)]
    pub fn phase(&self) -> SyncPhase {
        *lock_phase(&self.phase)
    }

    /// Number of triggers received so far, coalesced ones included.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub async fn run(&self, trigger: Trigger) -> SyncReport {
        self.run_with_clock(trigger, Utc::now).await
    }

    /// Runs with a fixed clock, for callers that control time.
    pub async fn run_at(&self, trigger: Trigger, now: DateTime<Utc>) -> SyncReport {
        self.run_with_clock(trigger, move || now).await
    }

    async fn run_with_clock<C>(&self, trigger: Trigger, clock: C) -> SyncReport
    where
        C: Fn() -> DateTime<Utc>,
    {
        let now = clock();
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let source = self.source;

        let Some(guard) = self.begin() else {
            tracing::debug!(%source, ?trigger, attempt, "Sync already in flight, coalescing trigger");
            return SyncReport::coalesced();
        };

        let cached = self.read_cached();
        let last_fetched_at = cached.as_ref().map(|r| r.last_fetched_at);

        let checked_at = match trigger {
            Trigger::Timer => now + Duration::seconds(TIMER_TOLERANCE_SECS),
            _ => now,
        };

        if !should_fetch(last_fetched_at, checked_at, self.interval) {
            guard.set(SyncPhase::Cached);
            tracing::info!(%source, ?trigger, attempt, "Skipping API call, using cached data");
            return SyncReport {
                outcome: SyncOutcome::Cached,
                display: cached.map(|record| render(source, &record.payload)),
            };
        }

        guard.set(SyncPhase::Fetching);
        tracing::info!(%source, ?trigger, attempt, "Fetching new data");

        match self.fetch().await {
            Ok(payload) => {
                self.persist(&payload, clock());
                SyncReport {
                    outcome: SyncOutcome::Fetched,
                    display: Some(render(source, &payload)),
                }
            }
            Err(e) => {
                tracing::warn!(%source, error = %e, status = ?e.status(), attempt, "Failed to fetch data");
                SyncReport {
                    display: DisplayState::unavailable(source),
                    outcome: SyncOutcome::Failed(e),
                }
            }
        }
    }

    fn begin(&self) -> Option<PhaseGuard<'_>> {
        let mut phase = lock_phase(&self.phase);
        if *phase != SyncPhase::Idle {
            return None;
        }
        *phase = SyncPhase::Checking;
        Some(PhaseGuard { phase: &self.phase })
    }

    fn read_cached(&self) -> Option<FreshnessRecord> {
        match self.store.read(self.source) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(source = %self.source, error = %e, "Cached record unreadable, treating as missing");
                None
            }
        }
    }

    async fn fetch(&self) -> Result<serde_json::Value, FetchError> {
        if !self.remote.has_valid_credentials() {
            return Err(FetchError::MissingCredentials(
                self.remote.credential_error_hint(),
            ));
        }

        let payload = self.remote.fetch_json().await?;
        check_payload_shape(self.source, &payload)?;
        Ok(payload)
    }

    fn persist(&self, payload: &serde_json::Value, fetched_at: DateTime<Utc>) {
        if let Err(e) = self.store.write(self.source, payload, fetched_at) {
            tracing::warn!(source = %self.source, error = %e, "Failed to write cache record");
        }

        if self.source.records_requests() {
            match self
                .store
                .append_log(RequestLogEntry::at(fetched_at), REQUEST_LOG_CAPACITY)
            {
                Ok(()) => tracing::debug!(source = %self.source, "Logged API request"),
                Err(e) => tracing::warn!(error = %e, "Failed to append request log"),
            }
        }
    }
}
