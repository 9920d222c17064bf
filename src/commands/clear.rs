use anyhow::Result;
use clap::Args;

use crate::{cache::SessionCache, cli::Globals};

#[derive(Debug, Clone, Args)]
pub struct ClearCommand {}

impl ClearCommand {
    pub async fn execute(self, globals: &Globals) -> Result<()> {
        let settings = globals.settings().await?;
        let cache = SessionCache::new(settings.cache_file, settings.max_time_seconds);
        cache.invalidate().await?;

        eprintln!("Cached MFA session cleared: {}", cache.path().display());
        Ok(())
    }
}
