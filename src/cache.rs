use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::aws::SessionCredentials;

/// Session record persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSession {
    /// Absolute expiry, epoch milliseconds
    pub expires: i64,
    #[serde(rename = "Credentials")]
    pub credentials: SessionCredentials,
}

impl CachedSession {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        self.expires > now_ms
    }
}

/// Single-file store for the MFA session
///
/// Expiry is measured from save time with the configured lifetime, never from
/// the expiry STS reports. No locking; one writer at a time is assumed.
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
    max_time_seconds: i32,
}

impl SessionCache {
    pub fn new(path: PathBuf, max_time_seconds: i32) -> Self {
        Self {
            path,
            max_time_seconds,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Return the cached session if it is still valid
    ///
    /// Expired or unparsable content is removed before returning `None`.
    pub async fn load(&self) -> Option<CachedSession> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!("Cannot read session cache {}: {}", self.path.display(), e);
                }
                return None;
            }
        };

        let session = match serde_json::from_str::<CachedSession>(&contents) {
            Ok(session) => session,
            Err(e) => {
                debug!("Discarding unparsable session cache: {}", e);
                self.remove_quietly().await;
                return None;
            }
        };

        if !session.is_valid_at(Utc::now().timestamp_millis()) {
            info!("Cached session expired");
            self.remove_quietly().await;
            return None;
        }

        debug!("Using cached session from {}", self.path.display());
        Some(session)
    }

    /// Persist a freshly minted session, stamping its expiry
    pub async fn save(&self, credentials: SessionCredentials) -> Result<CachedSession> {
        let session = CachedSession {
            expires: Utc::now().timestamp_millis() + i64::from(self.max_time_seconds) * 1000,
            credentials,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let contents = serde_json::to_string(&session).context("Failed to encode session")?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".new");
        let staging = PathBuf::from(staging);

        fs::write(&staging, contents)
            .await
            .with_context(|| format!("Failed to write {}", staging.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = fs::metadata(&staging).await?.permissions();
            permissions.set_mode(0o600);
            fs::set_permissions(&staging, permissions).await?;
        }

        fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!("Session cached until epoch ms {}", session.expires);
        Ok(session)
    }

    /// Drop the cached session so the next run asks for a new code
    pub async fn invalidate(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Removed session cache {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }

    async fn remove_quietly(&self) {
        if let Err(e) = self.invalidate().await {
            debug!("{e:#}");
        }
    }
}
