//! `passhero add`: generate a password for a new application.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, validate_app_name, Cli};
use crate::errors::{PassHeroError, Result};

/// Execute the `add` command.
pub fn execute(cli: &Cli, app: &str) -> Result<()> {
    validate_app_name(app)?;
    let (vault, _) = open_vault(cli)?;

    // Generating over an existing entry would silently replace it.
    if vault.has_secret(app) {
        output::tip(&format!("Use `passhero change {app}` to replace its password."));
        return Err(PassHeroError::ApplicationExists(app.to_string()));
    }

    vault.generate_secret(app);
    let password = vault
        .get_plaintext(app)
        .map(Zeroizing::new)
        .ok_or_else(|| PassHeroError::NoSuchApplication(app.to_string()))?;

    // Wait for the encrypted write before reporting success.
    vault.shutdown()?;

    output::success(&format!("Generated password for '{app}'"));
    output::print_password(&password);
    Ok(())
}
