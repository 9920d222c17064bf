use clap::{Args, CommandFactory};
use clap_complete::Shell;
use std::io;

use crate::cli::Cli;

#[derive(Debug, Clone, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum, help = "Target shell for completion script")]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) {
        let mut cmd = Cli::command();
        let app_name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, app_name, &mut io::stdout());
    }

    #[cfg(test)]
    pub fn generate_to_string(&self) -> String {
        let mut cmd = Cli::command();
        let app_name = cmd.get_name().to_string();
        let mut buffer = Vec::new();
        clap_complete::generate(self.shell, &mut cmd, app_name, &mut buffer);
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_completion(shell: Shell, expected_patterns: &[&str]) {
        let result = CompletionsCommand { shell }.generate_to_string();

        assert!(!result.is_empty(), "Completion script should not be empty");
        for pattern in expected_patterns {
            assert!(
                result.contains(pattern),
                "Expected pattern '{}' not found in {} completion script",
                pattern,
                shell
            );
        }
    }

    #[test]
    fn test_bash_completion() {
        assert_completion(
            Shell::Bash,
            &["_aws-2nd-factor()", "COMPREPLY", "complete -F _aws-2nd-factor"],
        );
    }

    #[test]
    fn test_zsh_completion() {
        assert_completion(Shell::Zsh, &["#compdef aws-2nd-factor", "_aws-2nd-factor", "_arguments"]);
    }

    #[test]
    fn test_fish_completion() {
        assert_completion(Shell::Fish, &["complete -c aws-2nd-factor"]);
    }

    #[test]
    fn test_powershell_completion() {
        assert_completion(Shell::PowerShell, &["Register-ArgumentCompleter"]);
    }

    #[test]
    fn test_completion_contains_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let result = CompletionsCommand { shell }.generate_to_string();
            for subcommand in ["env", "exec", "clear", "configure", "completions"] {
                assert!(
                    result.contains(subcommand),
                    "{} command should be in {} completions",
                    subcommand,
                    shell
                );
            }
        }
    }

    #[test]
    fn test_completion_contains_global_options() {
        let result = CompletionsCommand { shell: Shell::Bash }.generate_to_string();

        assert!(result.contains("--config"));
        assert!(result.contains("--force"));
        assert!(result.contains("--verbose"));
    }
}
