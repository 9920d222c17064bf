use anyhow::{Context, Result};
use aws_smithy_types::date_time::Format;
use std::{env, io::Write};

use crate::{aws::AssumedCredentials, constants};

/// Receives the role credentials at the end of a successful run
pub trait CredentialSink {
    fn publish(&mut self, credentials: &AssumedCredentials) -> Result<()>;
}

fn variables(credentials: &AssumedCredentials) -> Result<[(&'static str, String); 4]> {
    let expiration = credentials
        .expiration
        .fmt(Format::DateTime)
        .context("Failed to format credential expiration")?;

    Ok([
        (constants::ENV_ACCESS_KEY_ID, credentials.access_key_id.clone()),
        (constants::ENV_SECRET_ACCESS_KEY, credentials.secret_access_key.clone()),
        (constants::ENV_SESSION_TOKEN, credentials.session_token.clone()),
        (constants::ENV_CREDENTIAL_EXPIRATION, expiration),
    ])
}

/// Writes credentials into this process's environment
///
/// Child processes spawned afterwards inherit them. The expiration is replaced
/// with the role's, and the legacy token variable is dropped so SDKs do not
/// pair it with the new keys.
#[derive(Debug, Default)]
pub struct ProcessEnvironment;

impl CredentialSink for ProcessEnvironment {
    fn publish(&mut self, credentials: &AssumedCredentials) -> Result<()> {
        let variables = variables(credentials)?;
        // Nothing else touches the environment while the broker runs.
        unsafe {
            for name in constants::ENV_STALE_PROVIDER_STATE {
                env::remove_var(name);
            }
            for (name, value) in variables {
                env::set_var(name, value);
            }
        }
        Ok(())
    }
}

/// Prints `export` lines suitable for `eval "$(aws-2nd-factor env)"`
pub struct ShellExports<W: Write> {
    out: W,
}

impl<W: Write> ShellExports<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CredentialSink for ShellExports<W> {
    fn publish(&mut self, credentials: &AssumedCredentials) -> Result<()> {
        for name in constants::ENV_STALE_PROVIDER_STATE {
            writeln!(self.out, "unset {name}")?;
        }
        for (name, value) in variables(credentials)? {
            writeln!(self.out, "export {name}={}", shell_quote(&value))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
