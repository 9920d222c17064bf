use anyhow::Result;
use clap::Args;

use crate::{cli::Globals, config};

#[derive(Debug, Clone, Args)]
pub struct ConfigureCommand {}

impl ConfigureCommand {
    pub async fn execute(self, globals: &Globals) -> Result<()> {
        config::configure_interactive(&globals.config_path).await
    }
}
