use crate::constants::{
    self, DEFAULT_BASE_PROFILE, DEFAULT_LOCAL_PROFILE, DEFAULT_MAX_TIME_SECONDS,
    DEFAULT_SESSION_PREFIX, ENV_LOCAL_FLAGS, ENV_MFA_SERIAL_NUMBER, SETTINGS_SECTION,
    STS_MAX_SESSION_SECONDS,
};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use ini::{Ini, Properties};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Settings block as written in the settings file
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub local_profile: String,
    pub base_profile: String,
    pub max_time_seconds: i32,
    pub cache_file: PathBuf,
    pub session_prefix: String,
    pub mfa_serial_number: Option<String>,
    pub force: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_profile: DEFAULT_LOCAL_PROFILE.to_string(),
            base_profile: DEFAULT_BASE_PROFILE.to_string(),
            max_time_seconds: DEFAULT_MAX_TIME_SECONDS,
            cache_file: constants::default_cache_file(),
            session_prefix: DEFAULT_SESSION_PREFIX.to_string(),
            mfa_serial_number: None,
            force: false,
        }
    }
}

impl Config {
    fn from_ini_section(section: &Properties) -> Self {
        let get = |key: &str| non_empty(section, key);

        Self {
            local_profile: get("local_profile")
                .unwrap_or(DEFAULT_LOCAL_PROFILE)
                .to_string(),
            base_profile: get("base_profile")
                .unwrap_or(DEFAULT_BASE_PROFILE)
                .to_string(),
            max_time_seconds: get("max_time")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &i32| *secs > 0)
                .unwrap_or(DEFAULT_MAX_TIME_SECONDS),
            cache_file: get("tmp_file")
                .map_or_else(constants::default_cache_file, PathBuf::from),
            session_prefix: get("session_prefix")
                .unwrap_or(DEFAULT_SESSION_PREFIX)
                .to_string(),
            mfa_serial_number: get("mfa_serial_number").map(String::from),
            force: get("force").is_some_and(|s| s.eq_ignore_ascii_case("true")),
        }
    }

    fn save_to_ini(&self, ini: &mut Ini) {
        ini.with_section(Some(SETTINGS_SECTION))
            .set("local_profile", &self.local_profile)
            .set("base_profile", &self.base_profile)
            .set("max_time", self.max_time_seconds.to_string())
            .set("tmp_file", self.cache_file.to_string_lossy())
            .set("session_prefix", &self.session_prefix)
            .set("force", self.force.to_string());

        match &self.mfa_serial_number {
            Some(serial) => {
                ini.with_section(Some(SETTINGS_SECTION))
                    .set("mfa_serial_number", serial);
            }
            None => {
                ini.delete_from(Some(SETTINGS_SECTION), "mfa_serial_number");
            }
        }
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Load the settings block, falling back to defaults when the file is absent
pub async fn load(path: &Path) -> Result<Config> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!("No settings file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let ini = Ini::load_from_file(path)
        .with_context(|| format!("Failed to load settings file {}", path.display()))?;

    Ok(ini
        .section(Some(SETTINGS_SECTION))
        .map(Config::from_ini_section)
        .unwrap_or_default())
}

pub async fn save(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut ini = if path.exists() {
        Ini::load_from_file(path).unwrap_or_else(|_| Ini::new())
    } else {
        Ini::new()
    };

    config.save_to_ini(&mut ini);

    ini.write_to_file(path)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// Effective settings for one run, after the environment overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub local_profile: String,
    pub base_profile: String,
    pub max_time_seconds: i32,
    pub cache_file: PathBuf,
    pub session_prefix: String,
    pub mfa_serial_number: Option<String>,
    pub is_local: bool,
}

impl Settings {
    /// Apply environment overrides to a settings block
    ///
    /// `AWS_MFA_SERIAL_NUMBER` wins over the file. The flow is enabled by
    /// `force` or by any non-empty local-execution variable.
    pub fn resolve(config: Config, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let mfa_serial_number = set(ENV_MFA_SERIAL_NUMBER).or(config.mfa_serial_number);
        let is_local = config.force || ENV_LOCAL_FLAGS.into_iter().any(|name| set(name).is_some());

        if config.max_time_seconds > STS_MAX_SESSION_SECONDS {
            warn!(
                "max_time of {}s exceeds the STS session limit of {}s; the cache may outlive the session",
                config.max_time_seconds, STS_MAX_SESSION_SECONDS
            );
        }

        Self {
            local_profile: config.local_profile,
            base_profile: config.base_profile,
            max_time_seconds: config.max_time_seconds,
            cache_file: config.cache_file,
            session_prefix: config.session_prefix,
            mfa_serial_number,
            is_local,
        }
    }

    pub fn from_env(config: Config) -> Self {
        Self::resolve(config, |name| std::env::var(name).ok())
    }
}

pub async fn configure_interactive(path: &Path) -> Result<()> {
    println!("Configuring aws-2nd-factor in {}", path.display());

    let existing_config = if path.exists() {
        Some(load(path).await?)
    } else {
        None
    };

    if existing_config.is_some() {
        println!("Press Enter to keep current values, or type new values.");
    }
    println!();

    let theme = ColorfulTheme::default();
    let current = existing_config.unwrap_or_default();

    let local_profile = Input::<String>::with_theme(&theme)
        .with_prompt("Local profile (holds role_arn)")
        .default(current.local_profile)
        .interact_text()
        .context("Failed to read local profile")?;

    let base_profile = Input::<String>::with_theme(&theme)
        .with_prompt("Base profile")
        .default(current.base_profile)
        .interact_text()
        .context("Failed to read base profile")?;

    let mfa_serial_number = Input::<String>::with_theme(&theme)
        .with_prompt("MFA device serial number (ARN)")
        .default(current.mfa_serial_number.unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read MFA serial number")?;

    let max_time_seconds = Input::<i32>::with_theme(&theme)
        .with_prompt("Session lifetime in seconds (900-129600)")
        .default(current.max_time_seconds)
        .validate_with(|input: &i32| {
            if (900..=STS_MAX_SESSION_SECONDS).contains(input) {
                Ok(())
            } else {
                Err("Please enter a value between 900 and 129600")
            }
        })
        .interact_text()
        .context("Failed to read session lifetime")?;

    let session_prefix = Input::<String>::with_theme(&theme)
        .with_prompt("Role session name prefix")
        .default(current.session_prefix)
        .interact_text()
        .context("Failed to read session prefix")?;

    let cache_file = Input::<String>::with_theme(&theme)
        .with_prompt("Session cache file")
        .default(current.cache_file.to_string_lossy().to_string())
        .interact_text()
        .context("Failed to read cache file path")?;

    let force = Confirm::with_theme(&theme)
        .with_prompt("Always run, even without SERVERLESS_LOCAL_ENV / CF_IS_LOCAL?")
        .default(current.force)
        .interact()
        .context("Failed to read force flag")?;

    let config = Config {
        local_profile,
        base_profile,
        max_time_seconds,
        cache_file: PathBuf::from(cache_file),
        session_prefix,
        mfa_serial_number: Some(mfa_serial_number.trim().to_string())
            .filter(|serial| !serial.is_empty()),
        force,
    };

    save(path, &config).await?;

    println!("\nConfiguration saved successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_ini_section() {
        let mut props = Properties::new();
        props.insert("local_profile", "app-dev");
        props.insert("base_profile", "app");
        props.insert("max_time", "3600");
        props.insert("tmp_file", "/var/tmp/session.json");
        props.insert("session_prefix", "ci-");
        props.insert("mfa_serial_number", "arn:aws:iam::123456789012:mfa/dev");
        props.insert("force", "true");

        let config = Config::from_ini_section(&props);

        assert_eq!(config.local_profile, "app-dev");
        assert_eq!(config.base_profile, "app");
        assert_eq!(config.max_time_seconds, 3600);
        assert_eq!(config.cache_file, PathBuf::from("/var/tmp/session.json"));
        assert_eq!(config.session_prefix, "ci-");
        assert_eq!(
            config.mfa_serial_number.as_deref(),
            Some("arn:aws:iam::123456789012:mfa/dev")
        );
        assert!(config.force);
    }

    #[test]
    fn test_config_from_ini_section_with_defaults() {
        let props = Properties::new();
        let config = Config::from_ini_section(&props);
        assert_eq!(config, Config::default());
        assert_eq!(config.max_time_seconds, 43200);
        assert!(config.cache_file.ends_with(".2nd-aws-credentials.tmp"));
    }

    #[test]
    fn test_config_invalid_values_fall_back() {
        let mut props = Properties::new();
        props.insert("max_time", "twelve hours");
        props.insert("force", "yes please");
        props.insert("mfa_serial_number", "  ");

        let config = Config::from_ini_section(&props);
        assert_eq!(config.max_time_seconds, DEFAULT_MAX_TIME_SECONDS);
        assert!(!config.force);
        assert_eq!(config.mfa_serial_number, None);
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load(&dir.path().join("absent")).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broker").join("config");
        let config = Config {
            local_profile: "app-dev".to_string(),
            mfa_serial_number: Some("arn:aws:iam::123456789012:mfa/dev".to_string()),
            force: true,
            ..Config::default()
        };

        save(&path, &config).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), config);

        let cleared = Config {
            mfa_serial_number: None,
            ..config
        };
        save(&path, &cleared).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), cleared);
    }

    #[test]
    fn test_resolve_env_serial_overrides_file() {
        let config = Config {
            mfa_serial_number: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings = Settings::resolve(config, env_of(&[("AWS_MFA_SERIAL_NUMBER", "from-env")]));
        assert_eq!(settings.mfa_serial_number.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_resolve_serial_from_file() {
        let config = Config {
            mfa_serial_number: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings = Settings::resolve(config, env_of(&[]));
        assert_eq!(settings.mfa_serial_number.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_resolve_local_flags() {
        assert!(!Settings::resolve(Config::default(), env_of(&[])).is_local);
        assert!(Settings::resolve(Config::default(), env_of(&[("SERVERLESS_LOCAL_ENV", "1")])).is_local);
        assert!(Settings::resolve(Config::default(), env_of(&[("CF_IS_LOCAL", "true")])).is_local);
        assert!(!Settings::resolve(Config::default(), env_of(&[("CF_IS_LOCAL", "")])).is_local);

        let forced = Config {
            force: true,
            ..Config::default()
        };
        assert!(Settings::resolve(forced, env_of(&[])).is_local);
    }
}
