//! `passhero list`: show every application in the vault.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (vault, _) = open_vault(cli)?;

    let mut apps = vault.list_applications();
    apps.sort_by_key(|name| name.to_lowercase());

    output::info(&format!("{} application(s)", apps.len()));
    output::print_applications_table(&apps);

    vault.shutdown()
}
