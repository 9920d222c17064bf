use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    aws::{
        AssumedCredentials, Identity, RoleAssumer, SessionTokenExchanger,
        profiles::ProfileFiles,
    },
    cache::{CachedSession, SessionCache},
    config::Settings,
    constants::{ENV_MFA_SERIAL_NUMBER, RETRY_MESSAGE},
    otp::OtpPrompt,
    publish::CredentialSink,
};

/// How a run ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a local/interactive execution; nothing was done
    Disabled,
    /// No MFA device configured; no credentials were produced
    MissingSerial,
    /// Role credentials were handed to the sink
    Published,
}

/// Drives cache lookup, the MFA exchange and role assumption
pub struct CredentialBroker {
    settings: Settings,
    profiles: ProfileFiles,
    cache: SessionCache,
    prompt: Arc<dyn OtpPrompt>,
    exchanger: Box<dyn SessionTokenExchanger>,
    assumer: Box<dyn RoleAssumer>,
}

impl CredentialBroker {
    pub fn new(
        settings: Settings,
        profiles: ProfileFiles,
        prompt: Arc<dyn OtpPrompt>,
        exchanger: Box<dyn SessionTokenExchanger>,
        assumer: Box<dyn RoleAssumer>,
    ) -> Self {
        let cache = SessionCache::new(settings.cache_file.clone(), settings.max_time_seconds);
        Self {
            settings,
            profiles,
            cache,
            prompt,
            exchanger,
            assumer,
        }
    }

    /// Run once, publishing role credentials to `sink` on success
    pub async fn run(&self, sink: &mut dyn CredentialSink) -> Result<Outcome> {
        if !self.settings.is_local {
            debug!("Not a local execution, skipping MFA");
            return Ok(Outcome::Disabled);
        }

        let Some(serial) = self.settings.mfa_serial_number.as_deref() else {
            warn!("Environment var {} is required.", ENV_MFA_SERIAL_NUMBER);
            return Ok(Outcome::MissingSerial);
        };

        let role_arn = self
            .profiles
            .role_arn(&self.settings.local_profile)
            .with_context(|| {
                format!(
                    "Cannot determine the role to assume from profile '{}'",
                    self.settings.local_profile
                )
            })?;

        let session = match self.cache.load().await {
            Some(session) => {
                info!("Reusing cached MFA session");
                session
            }
            None => self.start_session(serial).await?,
        };

        let credentials = self.assume_role(&session, &role_arn).await?;

        sink.publish(&credentials)
            .context("Failed to publish credentials")?;

        info!("Published credentials for {}", role_arn);
        Ok(Outcome::Published)
    }

    async fn start_session(&self, serial: &str) -> Result<CachedSession> {
        // The operator read blocks, so it runs on the blocking pool.
        let prompt = Arc::clone(&self.prompt);
        let otp = tokio::task::spawn_blocking(move || prompt.prompt())
            .await
            .context("MFA prompt task failed")??;

        let credentials = self
            .exchanger
            .exchange(
                &Identity::Profile(self.settings.base_profile.clone()),
                serial,
                &otp,
                self.settings.max_time_seconds,
            )
            .await
            .inspect_err(|e| error!("{e:#}"))
            .context(RETRY_MESSAGE)?;

        self.cache.save(credentials).await
    }

    async fn assume_role(
        &self,
        session: &CachedSession,
        role_arn: &str,
    ) -> Result<AssumedCredentials> {
        let session_name = format!(
            "{}{}",
            self.settings.session_prefix,
            Utc::now().timestamp_millis()
        );

        let result = self
            .assumer
            .assume_role(
                &Identity::Session(session.credentials.clone()),
                role_arn,
                &session_name,
            )
            .await;

        match result {
            Ok(credentials) => Ok(credentials),
            Err(e) => {
                error!("{e:#}");
                if let Err(cleanup) = self.cache.invalidate().await {
                    warn!("{cleanup:#}");
                }
                Err(e.context(RETRY_MESSAGE))
            }
        }
    }
}
