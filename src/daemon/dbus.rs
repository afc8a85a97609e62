use anyhow::{Context, Result};
use tokio::sync::mpsc;
use zbus::interface;

pub const DBUS_NAME: &str = "com.github.kabilan.WallDash";
pub const DBUS_PATH: &str = "/com/github/kabilan/WallDash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbusCommand {
    Refresh,
    SetVisible(bool),
}

pub struct WallDashService {
    cmd_tx: mpsc::UnboundedSender<DbusCommand>,
    visible: bool,
}

impl WallDashService {
    pub fn new(cmd_tx: mpsc::UnboundedSender<DbusCommand>, visible: bool) -> Self {
        Self { cmd_tx, visible }
    }

    fn forward(&self, cmd: DbusCommand) -> zbus::fdo::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| zbus::fdo::Error::Failed("Daemon is shutting down".to_string()))
    }
}

#[interface(name = "com.github.kabilan.WallDash")]
impl WallDashService {
    async fn refresh(&self) -> zbus::fdo::Result<()> {
        tracing::info!("D-Bus Refresh called");
        self.forward(DbusCommand::Refresh)
    }

    async fn set_visible(&mut self, visible: bool) -> zbus::fdo::Result<()> {
        tracing::info!(visible, "D-Bus SetVisible called");
        self.visible = visible;
        self.forward(DbusCommand::SetVisible(visible))
    }

    #[zbus(property)]
    fn visible(&self) -> bool {
        self.visible
    }
}

pub async fn start_dbus_server(
    cmd_tx: mpsc::UnboundedSender<DbusCommand>,
    visible: bool,
) -> Result<zbus::Connection> {
    let connection = zbus::connection::Builder::session()
        .context("Failed to connect to session D-Bus")?
        .name(DBUS_NAME)
        .context("Invalid D-Bus name")?
        .serve_at(DBUS_PATH, WallDashService::new(cmd_tx, visible))
        .context("Failed to register D-Bus interface")?
        .build()
        .await
        .with_context(|| format!("Failed to acquire D-Bus name {}", DBUS_NAME))?;

    tracing::info!(name = DBUS_NAME, path = DBUS_PATH, "D-Bus service ready");
    Ok(connection)
}

/// Call a method on a running daemon.
pub async fn call_daemon<B>(method: &str, body: &B) -> Result<()>
where
    B: serde::Serialize + zbus::zvariant::DynamicType,
{
    let connection = zbus::Connection::session()
        .await
        .context("Failed to connect to session D-Bus")?;

    let _reply: () = connection
        .call_method(Some(DBUS_NAME), DBUS_PATH, Some(DBUS_NAME), method, body)
        .await
        .with_context(|| format!("Failed to call {} method - is the daemon running?", method))?
        .body()
        .deserialize()
        .context("Failed to deserialize response")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_service_forwards_commands() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut service = WallDashService::new(tx, true);

        service.refresh().await.unwrap();
        service.set_visible(false).await.unwrap();

        assert_eq!(rx.recv().await, Some(DbusCommand::Refresh));
        assert_eq!(rx.recv().await, Some(DbusCommand::SetVisible(false)));
        assert!(!service.visible());
    }

    #[tokio::test]
    async fn test_service_reports_shutdown() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let service = WallDashService::new(tx, true);
        assert!(service.refresh().await.is_err());
    }
}
