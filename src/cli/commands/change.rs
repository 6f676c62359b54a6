//! `passhero change`: replace an application's password.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{PassHeroError, Result};

/// Execute the `change` command.
pub fn execute(cli: &Cli, app: &str) -> Result<()> {
    let (vault, _) = open_vault(cli)?;

    vault.change_secret(app)?;
    let password = vault
        .get_plaintext(app)
        .map(Zeroizing::new)
        .ok_or_else(|| PassHeroError::NoSuchApplication(app.to_string()))?;

    vault.shutdown()?;

    output::success(&format!("Changed password for '{app}'"));
    output::print_password(&password);
    Ok(())
}
