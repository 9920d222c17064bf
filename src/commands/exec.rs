use anyhow::{Context, Result};
use clap::Args;
use std::process::ExitCode;
use tokio::process::Command;
use tracing::{debug, info};

use super::build_broker;
use crate::{broker::Outcome, cli::Globals, publish::ProcessEnvironment};

#[derive(Debug, Clone, Args)]
pub struct ExecCommand {
    #[arg(short = 't', long, help = "MFA code to use instead of prompting")]
    pub token_code: Option<String>,

    #[arg(
        last = true,
        required = true,
        num_args = 1..,
        help = "Command to run with the role credentials"
    )]
    pub command: Vec<String>,
}

impl ExecCommand {
    pub async fn execute(self, globals: &Globals) -> Result<ExitCode> {
        let settings = globals.settings().await?;
        let broker = build_broker(settings, self.token_code);

        // Callers tolerate runs that produce no credentials
        match broker.run(&mut ProcessEnvironment).await? {
            Outcome::Published => {}
            outcome => info!("Running without role credentials ({:?})", outcome),
        }

        let (program, args) = self
            .command
            .split_first()
            .context("No command given")?;
        debug!("Running {} {:?}", program, args);

        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to run {program}"))?;

        Ok(forwarded_code(status.code()).map_or(ExitCode::FAILURE, ExitCode::from))
    }
}

/// Child exit code as ours; signals and out-of-range codes have none
fn forwarded_code(code: Option<i32>) -> Option<u8> {
    code.and_then(|c| u8::try_from(c).ok())
}
