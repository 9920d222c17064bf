use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig, profile::ProfileFileCredentialsProvider};
use aws_credential_types::{Credentials as SdkCredentials, provider::SharedCredentialsProvider};
use aws_sdk_sts::Client as StsClient;
use tracing::{debug, info};

use super::{AssumedCredentials, Identity, SessionCredentials};
use crate::constants::DEFAULT_AWS_REGION;

/// Provider name attached to session credentials handed to the SDK
const SESSION_PROVIDER_NAME: &str = "aws-2nd-factor";

/// Mints an MFA-backed session from a base identity
#[async_trait]
pub trait SessionTokenExchanger: Send + Sync {
    async fn exchange(
        &self,
        identity: &Identity,
        mfa_serial_number: &str,
        otp: &str,
        duration_seconds: i32,
    ) -> Result<SessionCredentials>;
}

/// Trades a session for credentials bound to a role
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(
        &self,
        identity: &Identity,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedCredentials>;
}

/// STS-backed implementation of both exchange steps
///
/// `region_profile` is only consulted for region resolution when the call is
/// signed with session credentials.
#[derive(Debug, Clone)]
pub struct StsGateway {
    region_profile: String,
}

impl StsGateway {
    pub fn new(region_profile: impl Into<String>) -> Self {
        Self {
            region_profile: region_profile.into(),
        }
    }

    /// SDK config signed by exactly `identity`
    ///
    /// A profile identity reads only the shared profile files, so credentials
    /// already exported in the environment never sign the call.
    async fn sdk_config(&self, identity: &Identity) -> SdkConfig {
        match identity {
            Identity::Profile(profile) => {
                let provider = ProfileFileCredentialsProvider::builder()
                    .profile_name(profile)
                    .build();
                load_sdk_config(profile, SharedCredentialsProvider::new(provider)).await
            }
            Identity::Session(session) => {
                let credentials = SdkCredentials::new(
                    &session.access_key_id,
                    &session.secret_access_key,
                    Some(session.session_token.clone()),
                    None,
                    SESSION_PROVIDER_NAME,
                );
                load_sdk_config(
                    &self.region_profile,
                    SharedCredentialsProvider::new(credentials),
                )
                .await
            }
        }
    }

    async fn client(&self, identity: &Identity) -> StsClient {
        StsClient::new(&self.sdk_config(identity).await)
    }
}

#[async_trait]
impl SessionTokenExchanger for StsGateway {
    async fn exchange(
        &self,
        identity: &Identity,
        mfa_serial_number: &str,
        otp: &str,
        duration_seconds: i32,
    ) -> Result<SessionCredentials> {
        info!("Calling AWS STS GetSessionToken");
        debug!("MFA serial number: {}", mfa_serial_number);
        debug!("Duration: {} seconds", duration_seconds);

        let response = self
            .client(identity)
            .await
            .get_session_token()
            .duration_seconds(duration_seconds)
            .serial_number(mfa_serial_number)
            .token_code(otp)
            .send()
            .await
            .context("Failed to get session token")?;

        let sts_creds = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        info!("Obtained MFA session");
        Ok(SessionCredentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
        })
    }
}

#[async_trait]
impl RoleAssumer for StsGateway {
    async fn assume_role(
        &self,
        identity: &Identity,
        role_arn: &str,
        session_name: &str,
    ) -> Result<AssumedCredentials> {
        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", role_arn);
        debug!("Session name: {}", session_name);

        let response = self
            .client(identity)
            .await
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .context("Failed to assume role")?;

        let sts_creds = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        info!("Successfully obtained role credentials");
        Ok(AssumedCredentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: *sts_creds.expiration(),
        })
    }
}

/// Load AWS config for `profile`, signed by `credentials`
///
/// Region priority: ENV vars -> config file -> EC2 metadata -> DEFAULT_AWS_REGION
async fn load_sdk_config(profile: &str, credentials: SharedCredentialsProvider) -> SdkConfig {
    let loader = || {
        aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .credentials_provider(credentials.clone())
    };

    let loaded = loader().load().await;
    match loaded.region() {
        Some(region) => {
            debug!("Using region: {}", region);
            loaded
        }
        None => {
            info!(
                "No region configured, using default {} for STS",
                DEFAULT_AWS_REGION
            );
            loader()
                .region(Region::new(DEFAULT_AWS_REGION))
                .load()
                .await
        }
    }
}
