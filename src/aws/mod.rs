use aws_smithy_types::DateTime;
use serde::{Deserialize, Serialize};

pub mod profiles;
pub mod sts;

/// Temporary credentials minted by GetSessionToken
///
/// Field names on the wire match the STS response shape, which is also the
/// shape of the `Credentials` object inside the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,
    #[serde(rename = "SessionToken")]
    pub session_token: String,
}

/// Role-scoped credentials returned by AssumeRole
#[derive(Debug, Clone)]
pub struct AssumedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

/// Identity an STS call is signed with
#[derive(Debug, Clone)]
pub enum Identity {
    /// Long-lived credentials of a shared config profile
    Profile(String),
    /// A previously minted MFA session
    Session(SessionCredentials),
}

pub use sts::{RoleAssumer, SessionTokenExchanger, StsGateway};
