use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};

use crate::{
    commands::{ClearCommand, CompletionsCommand, ConfigureCommand, EnvCommand, ExecCommand},
    config::{self, Settings},
    constants,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "aws-2nd-factor", version, about = "MFA-gated AWS session caching and role assumption", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Settings file (default ~/.config/aws-2nd-factor/config)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Run the MFA flow even without SERVERLESS_LOCAL_ENV / CF_IS_LOCAL"
    )]
    pub force: bool,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Print shell exports for role credentials")]
    Env(EnvCommand),
    #[command(about = "Run a command with role credentials in its environment")]
    Exec(ExecCommand),
    #[command(about = "Remove the cached MFA session")]
    Clear(ClearCommand),
    #[command(about = "Edit the settings file interactively")]
    Configure(ConfigureCommand),
    #[command(about = "Generate shell completion scripts for aws-2nd-factor")]
    Completions(CompletionsCommand),
}

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct Globals {
    pub config_path: PathBuf,
    pub force: bool,
}

impl Globals {
    /// Settings for this run: file values, `--force`, then the environment
    pub async fn settings(&self) -> Result<Settings> {
        let mut config = config::load(&self.config_path).await?;
        config.force |= self.force;
        Ok(Settings::from_env(config))
    }
}

impl Cli {
    pub async fn execute(self) -> Result<ExitCode> {
        let config_path = match self.config {
            Some(path) => path,
            None => constants::get_settings_path()
                .context("Failed to determine settings file path")?,
        };
        let globals = Globals {
            config_path,
            force: self.force,
        };

        let command = self
            .command
            .unwrap_or(Commands::Env(EnvCommand { token_code: None }));

        match command {
            Commands::Env(cmd) => cmd.execute(&globals).await.map(|()| ExitCode::SUCCESS),
            Commands::Exec(cmd) => cmd.execute(&globals).await,
            Commands::Clear(cmd) => cmd.execute(&globals).await.map(|()| ExitCode::SUCCESS),
            Commands::Configure(cmd) => cmd.execute(&globals).await.map(|()| ExitCode::SUCCESS),
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
