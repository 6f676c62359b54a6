//! `passhero get`: print or copy an application's password.

use std::time::Duration;

use zeroize::Zeroizing;

use crate::cli::{clipboard, open_vault, output, Cli};
use crate::errors::{PassHeroError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, app: &str, copy: bool) -> Result<()> {
    let (vault, settings) = open_vault(cli)?;

    let password = vault
        .get_plaintext(app)
        .map(Zeroizing::new)
        .ok_or_else(|| PassHeroError::NoSuchApplication(app.to_string()))?;
    vault.shutdown()?;

    if copy {
        clipboard::copy_temporarily(
            &password,
            Duration::from_secs(settings.clipboard_clear_secs),
        )
    } else {
        output::print_password(&password);
        Ok(())
    }
}
