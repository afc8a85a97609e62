use crate::core::models::SourceId;
use crate::core::settings::Settings;
use crate::core::store::open_store;
use crate::daemon::dbus::{start_dbus_server, DbusCommand};
use crate::daemon::display::run_display_loop;
use crate::daemon::sync::{SourceSync, Trigger};
use crate::daemon::visibility::{
    run_notes_triggers, run_source_loop, run_weather_triggers, Visibility, VisibilityState,
};
use crate::providers::build_sources;
use crate::ui::DisplayState;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub async fn run() -> Result<()> {
    let settings = Settings::load()?;
    let store = open_store(&settings.storage)?;
    let sources = build_sources(&settings)?;

    if sources.is_empty() {
        tracing::warn!("No sources enabled, showing the clock only");
    }

    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<DisplayState>();
    let (vis_tx, vis_rx) = watch::channel(VisibilityState::new(Visibility::from(
        settings.display.start_visible,
    )));
    let mut trigger_txs: Vec<(SourceId, mpsc::UnboundedSender<Trigger>)> = Vec::new();

    for remote in sources {
        let source = remote.identifier();
        let sync = Arc::new(SourceSync::new(
            remote,
            Arc::clone(&store),
            settings.interval_for(source),
        ));
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel::<Trigger>();

        tokio::spawn(run_source_loop(sync, trigger_rx, ui_tx.clone()));

        match source {
            SourceId::Weather => {
                tokio::spawn(run_weather_triggers(
                    trigger_tx.clone(),
                    vis_rx.clone(),
                    settings.weather.period(),
                    settings.weather.startup_jitter(),
                ));
            }
            SourceId::Notes => {
                tokio::spawn(run_notes_triggers(
                    trigger_tx.clone(),
                    settings.notes.period(),
                ));
            }
        }

        tracing::info!(%source, interval_minutes = settings.interval_for(source).num_minutes(), "Source sync started");
        trigger_txs.push((source, trigger_tx));
    }

    let (dbus_cmd_tx, dbus_cmd_rx) = mpsc::unbounded_channel::<DbusCommand>();
    let _dbus_connection =
        match start_dbus_server(dbus_cmd_tx, settings.display.start_visible).await {
            Ok(connection) => Some(connection),
            Err(e) => {
                tracing::warn!(error = %e, "D-Bus unavailable, refresh and visibility control disabled");
                None
            }
        };

    tokio::spawn(handle_dbus_commands(dbus_cmd_rx, trigger_txs, vis_tx));

    run_display_loop(ui_rx, settings.display).await
}

async fn handle_dbus_commands(
    mut cmd_rx: mpsc::UnboundedReceiver<DbusCommand>,
    trigger_txs: Vec<(SourceId, mpsc::UnboundedSender<Trigger>)>,
    vis_tx: watch::Sender<VisibilityState>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            DbusCommand::Refresh => {
                tracing::info!("D-Bus refresh command received");
                for (source, tx) in &trigger_txs {
                    if tx.send(Trigger::Manual).is_err() {
                        tracing::warn!(%source, "Sync loop stopped, refresh dropped");
                    }
                }
            }
            DbusCommand::SetVisible(visible) => {
                let visibility = Visibility::from(visible);
                tracing::info!(?visibility, "Display visibility changed");
                vis_tx.send_modify(|state| state.report(visibility));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_reaches_every_source() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (weather_tx, mut weather_rx) = mpsc::unbounded_channel();
        let (notes_tx, mut notes_rx) = mpsc::unbounded_channel();
        let (vis_tx, _vis_rx) = watch::channel(VisibilityState::new(Visibility::Visible));

        cmd_tx.send(DbusCommand::Refresh).unwrap();
        drop(cmd_tx);

        handle_dbus_commands(
            cmd_rx,
            vec![(SourceId::Weather, weather_tx), (SourceId::Notes, notes_tx)],
            vis_tx,
        )
        .await;

        assert_eq!(weather_rx.recv().await, Some(Trigger::Manual));
        assert_eq!(notes_rx.recv().await, Some(Trigger::Manual));
    }

    #[tokio::test]
    async fn test_set_visible_updates_watch() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (vis_tx, vis_rx) = watch::channel(VisibilityState::new(Visibility::Visible));

        cmd_tx.send(DbusCommand::SetVisible(false)).unwrap();
        drop(cmd_tx);

        handle_dbus_commands(cmd_rx, Vec::new(), vis_tx).await;

        assert_eq!(vis_rx.borrow().visibility, Visibility::Hidden);
    }

    #[tokio::test]
    async fn test_queued_hide_show_counts_as_regain() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (vis_tx, vis_rx) = watch::channel(VisibilityState::new(Visibility::Visible));

        cmd_tx.send(DbusCommand::SetVisible(false)).unwrap();
        cmd_tx.send(DbusCommand::SetVisible(true)).unwrap();
        drop(cmd_tx);

        handle_dbus_commands(cmd_rx, Vec::new(), vis_tx).await;

        let state = *vis_rx.borrow();
        assert_eq!(state.visibility, Visibility::Visible);
        assert_eq!(state.regained, 1);
    }
}
