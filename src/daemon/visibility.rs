use crate::daemon::sync::{SourceSync, SyncOutcome, Trigger};
use crate::ui::DisplayState;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// Latest reported visibility plus the number of hidden to visible
/// transitions so far. Receivers compare the counter, so a quick
/// hide/show pair is still seen as a regain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub visibility: Visibility,
    pub regained: u64,
}

impl VisibilityState {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            regained: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn report(&mut self, visibility: Visibility) {
        if !self.is_visible() && visibility == Visibility::Visible {
            self.regained += 1;
        }
        self.visibility = visibility;
    }
}

/// Random delay in `[0, max]` so many displays starting together do not
/// hit the weather API in the same instant.
pub fn startup_delay(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

fn timer(period: Duration) -> tokio::time::Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Weather syncs on load (after jitter) when visible, whenever the display
/// becomes visible again, and on each timer tick while visible.
pub async fn run_weather_triggers(
    tx: mpsc::UnboundedSender<Trigger>,
    mut visibility: watch::Receiver<VisibilityState>,
    period: Duration,
    jitter: Duration,
) {
    let initial = *visibility.borrow_and_update();
    let mut seen_regains = initial.regained;

    if initial.is_visible() {
        let delay = startup_delay(jitter);
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Delaying initial weather sync");
        tokio::time::sleep(delay).await;
        if tx.send(Trigger::InitialLoad).is_err() {
            return;
        }
    } else {
        tracing::info!("Display hidden at startup, weather waits for visibility");
    }

    let mut timer = timer(period);
    let mut visibility_open = true;

    loop {
        let trigger = tokio::select! {
            _ = timer.tick() => {
                if !visibility.borrow().is_visible() {
                    continue;
                }
                Trigger::Timer
            }
            changed = visibility.changed(), if visibility_open => {
                if changed.is_err() {
                    tracing::debug!("Visibility source closed, weather keeps its timer only");
                    visibility_open = false;
                    continue;
                }
                let regains = visibility.borrow_and_update().regained;
                let regained = regains != seen_regains;
                seen_regains = regains;
                if !regained {
                    continue;
                }
                Trigger::VisibilityRegained
            }
        };

        if tx.send(trigger).is_err() {
            return;
        }
    }
}

/// Notes sync on load and on their own timer; visibility is not consulted.
pub async fn run_notes_triggers(tx: mpsc::UnboundedSender<Trigger>, period: Duration) {
    if tx.send(Trigger::InitialLoad).is_err() {
        return;
    }

    let mut timer = timer(period);
    loop {
        timer.tick().await;
        if tx.send(Trigger::Timer).is_err() {
            return;
        }
    }
}

/// Runs one sync per received trigger. Triggers that queued up while a sync
/// was running are folded into the next one.
pub async fn run_source_loop(
    sync: Arc<SourceSync>,
    mut triggers: mpsc::UnboundedReceiver<Trigger>,
    ui_tx: mpsc::UnboundedSender<DisplayState>,
) {
    let source = sync.source();

    while let Some(trigger) = triggers.recv().await {
        let mut folded = 0usize;
        while triggers.try_recv().is_ok() {
            folded += 1;
        }
        if folded > 0 {
            tracing::debug!(%source, folded, "Coalesced queued triggers");
        }

        let report = sync.run(trigger).await;
        if let SyncOutcome::Failed(e) = &report.outcome {
            tracing::debug!(%source, error = %e, attempts = sync.attempts(), "Sync attempt failed");
        }

        if let Some(display) = report.display {
            if ui_tx.send(display).is_err() {
                tracing::debug!(%source, "Display closed, stopping sync loop");
                return;
            }
        }
    }
}
