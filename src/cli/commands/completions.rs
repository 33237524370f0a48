//! Shell completions command implementation.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::Shell as CompletionShell;
use std::io::{self, Write};

const BIN_NAME: &str = "psync";

impl From<&Shell> for CompletionShell {
    fn from(shell: &Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}

fn write_completions(shell: &Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(CompletionShell::from(shell), &mut cmd, BIN_NAME, out);
}

/// Generate shell completions for the specified shell.
pub fn execute(shell: &Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout());
    Ok(())
}
