pub mod clear;
pub mod completions;
pub mod configure;
pub mod env;
pub mod exec;

pub use clear::ClearCommand;
pub use completions::CompletionsCommand;
pub use configure::ConfigureCommand;
pub use env::EnvCommand;
pub use exec::ExecCommand;

use std::sync::Arc;

use crate::{
    aws::{StsGateway, profiles::ProfileFiles},
    broker::CredentialBroker,
    config::Settings,
    otp::{FixedCode, OtpPrompt, TerminalPrompt},
};

/// Wire the broker to STS, the shared AWS files and an OTP source
fn build_broker(settings: Settings, token_code: Option<String>) -> CredentialBroker {
    let prompt: Arc<dyn OtpPrompt> = match token_code {
        Some(code) => Arc::new(FixedCode::new(code)),
        None => Arc::new(TerminalPrompt),
    };
    let sts = StsGateway::new(settings.base_profile.clone());

    CredentialBroker::new(
        settings,
        ProfileFiles::from_env(),
        prompt,
        Box::new(sts.clone()),
        Box::new(sts),
    )
}
