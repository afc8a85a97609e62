use crate::daemon::call_daemon;
use anyhow::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VisibilityArg {
    Visible,
    Hidden,
}

impl VisibilityArg {
    fn is_visible(self) -> bool {
        matches!(self, VisibilityArg::Visible)
    }
}

pub async fn run(state: VisibilityArg) -> Result<()> {
    call_daemon("SetVisible", &(state.is_visible(),)).await?;
    println!(
        "Display marked {}",
        if state.is_visible() { "visible" } else { "hidden" }
    );
    Ok(())
}
