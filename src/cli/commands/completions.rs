//! `passhero completions`: generate shell completion scripts.
//!
//! Usage:
//!   passhero completions bash > ~/.bash_completion.d/passhero
//!   passhero completions zsh

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    render(shell, &mut io::stdout())
}

fn render(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
    Ok(())
}
