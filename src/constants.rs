use std::{env, path::PathBuf};

/// Configuration directory name under the user's config directory
pub const CONFIG_DIR_NAME: &str = "aws-2nd-factor";

/// Settings file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config";

/// INI section holding the broker settings
pub const SETTINGS_SECTION: &str = "aws-2nd-factor";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

pub const DEFAULT_LOCAL_PROFILE: &str = "cf-dev";
pub const DEFAULT_BASE_PROFILE: &str = "cf";
pub const DEFAULT_SESSION_PREFIX: &str = "cfsvl-";

/// Default session lifetime (12 hours)
pub const DEFAULT_MAX_TIME_SECONDS: i32 = 3600 * 12;

/// Upper bound STS accepts for GetSessionToken with IAM user credentials
pub const STS_MAX_SESSION_SECONDS: i32 = 129_600;

/// Cache file name placed in the system temp directory by default
pub const CACHE_FILE_NAME: &str = ".2nd-aws-credentials.tmp";

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Environment variables read by the broker
pub const ENV_MFA_SERIAL_NUMBER: &str = "AWS_MFA_SERIAL_NUMBER";
pub const ENV_LOCAL_FLAGS: [&str; 2] = ["SERVERLESS_LOCAL_ENV", "CF_IS_LOCAL"];
pub const ENV_SETTINGS_FILE: &str = "AWS_2ND_FACTOR_CONFIG";

/// Environment variables written on publication
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const ENV_CREDENTIAL_EXPIRATION: &str = "AWS_CREDENTIAL_EXPIRATION";

/// Legacy token variable some tools read before `AWS_SESSION_TOKEN`
pub const ENV_STALE_PROVIDER_STATE: [&str; 1] = ["AWS_SECURITY_TOKEN"];

/// User-facing message for any fatal STS failure
pub const RETRY_MESSAGE: &str = "Error. Try it again";

/// Default location of the cached session
pub fn default_cache_file() -> PathBuf {
    env::temp_dir().join(CACHE_FILE_NAME)
}

/// Get the settings file path
/// Respects AWS_2ND_FACTOR_CONFIG environment variable if set
pub fn get_settings_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(ENV_SETTINGS_FILE) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}
