use anyhow::Result;
use clap::Args;
use std::io;
use tracing::info;

use super::build_broker;
use crate::{broker::Outcome, cli::Globals, publish::ShellExports};

#[derive(Debug, Clone, Args)]
pub struct EnvCommand {
    #[arg(short = 't', long, help = "MFA code to use instead of prompting")]
    pub token_code: Option<String>,
}

impl EnvCommand {
    pub async fn execute(self, globals: &Globals) -> Result<()> {
        let settings = globals.settings().await?;
        let broker = build_broker(settings, self.token_code);

        let mut sink = ShellExports::new(io::stdout());
        match broker.run(&mut sink).await? {
            Outcome::Published => {}
            outcome => info!("No credentials exported ({:?})", outcome),
        }

        Ok(())
    }
}
