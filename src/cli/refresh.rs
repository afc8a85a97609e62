use crate::daemon::call_daemon;
use anyhow::Result;

pub async fn run() -> Result<()> {
    call_daemon("Refresh", &()).await?;
    println!("Refresh triggered successfully");
    Ok(())
}
