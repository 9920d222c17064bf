use anyhow::{Context, Result, bail};
use ini::Ini;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;

/// Read access to the shared AWS config and credentials files
#[derive(Debug, Clone)]
pub struct ProfileFiles {
    config_path: Option<PathBuf>,
    credentials_path: Option<PathBuf>,
}

impl ProfileFiles {
    pub fn new(config_path: Option<PathBuf>, credentials_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            credentials_path,
        }
    }

    /// Locations the AWS CLI and SDKs use, honoring their override variables
    pub fn from_env() -> Self {
        Self::new(
            constants::get_aws_config_path(),
            constants::get_aws_credentials_path(),
        )
    }

    /// Look up `role_arn` for a profile
    ///
    /// The config file (`[profile name]`, or `[default]`) wins over a
    /// `[name]` section in the credentials file.
    pub fn role_arn(&self, profile: &str) -> Result<String> {
        let config_section = if profile == "default" {
            profile.to_string()
        } else {
            format!("profile {profile}")
        };

        let candidates = [
            (self.config_path.as_deref(), config_section.as_str()),
            (self.credentials_path.as_deref(), profile),
        ];

        for (path, section) in candidates {
            let Some(path) = path else { continue };
            if let Some(role_arn) = read_key(path, section, "role_arn")? {
                debug!("Found role_arn for '{}' in {}", profile, path.display());
                return Ok(role_arn);
            }
        }

        bail!("No role_arn configured for profile '{profile}'")
    }
}

fn read_key(path: &Path, section: &str, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let ini = Ini::load_from_file(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(ini
        .section(Some(section))
        .and_then(|props| props.get(key))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from))
}
