//! `docwarden completions <shell>`

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::Cli;

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for the chosen shell to stdout
pub fn run(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    generate(args.shell, &mut command, bin_name, &mut std::io::stdout());
    Ok(())
}
