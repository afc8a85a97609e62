use crate::core::clock::format_clock;
use crate::core::settings::DisplaySettings;
use crate::ui::text::render_frame;
use crate::ui::{Dashboard, DisplayState};
use anyhow::{Context, Result};
use chrono::Local;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub async fn run_display_loop(
    ui_rx: mpsc::UnboundedReceiver<DisplayState>,
    settings: DisplaySettings,
) -> Result<()> {
    run_display_to(ui_rx, &settings, std::io::stdout()).await
}

/// Redraws after every state update and on the clock interval. Returns once
/// every sync loop has dropped its sender.
async fn run_display_to<W: Write>(
    mut ui_rx: mpsc::UnboundedReceiver<DisplayState>,
    settings: &DisplaySettings,
    mut out: W,
) -> Result<()> {
    let mut dashboard = Dashboard::new();
    let period = settings.redraw_period();
    let mut redraw = interval_at(Instant::now() + period, period);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    draw(&mut out, &dashboard, settings.clear_screen)?;

    loop {
        tokio::select! {
            biased;
            _ = redraw.tick() => {}
            state = ui_rx.recv() => {
                let Some(state) = state else {
                    tracing::info!("All sync loops stopped, closing display");
                    return Ok(());
                };
                tracing::debug!(source = %state.source(), "Display section updated");
                dashboard.apply(state);
            }
        }

        draw(&mut out, &dashboard, settings.clear_screen)?;
    }
}

fn draw<W: Write>(out: &mut W, dashboard: &Dashboard, clear_screen: bool) -> Result<()> {
    let frame = render_frame(dashboard, &format_clock(&Local::now()));
    if clear_screen {
        out.write_all(CLEAR_SCREEN.as_bytes())?;
    }
    out.write_all(frame.as_bytes())
        .and_then(|_| out.flush())
        .context("Failed to write display frame")
}
