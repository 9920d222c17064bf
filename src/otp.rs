use anyhow::{Context, Result};
use dialoguer::{Input, theme::ColorfulTheme};

/// Source of the one-time code for GetSessionToken
///
/// Codes are not validated here; STS rejects malformed ones.
pub trait OtpPrompt: Send + Sync {
    fn prompt(&self) -> Result<String>;
}

/// Asks the operator on the terminal, blocking until a line is entered
#[derive(Debug, Default, Clone)]
pub struct TerminalPrompt;

impl OtpPrompt for TerminalPrompt {
    fn prompt(&self) -> Result<String> {
        let code = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Insert MFA code")
            .interact_text()
            .context("Failed to read MFA code")?;

        Ok(code.trim().to_string())
    }
}

/// A code supplied up front, e.g. with `--token-code`
#[derive(Debug, Clone)]
pub struct FixedCode(String);

impl FixedCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl OtpPrompt for FixedCode {
    fn prompt(&self) -> Result<String> {
        Ok(self.0.trim().to_string())
    }
}
