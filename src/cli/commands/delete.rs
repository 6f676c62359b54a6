//! `passhero delete`: remove an application and its password.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{PassHeroError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, app: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete the password for '{app}'?"))
            .default(false)
            .interact()
            .map_err(|e| PassHeroError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let (vault, _) = open_vault(cli)?;
    let removed = vault.delete_secret(app);
    vault.shutdown()?;

    if !removed {
        return Err(PassHeroError::NoSuchApplication(app.to_string()));
    }

    output::success(&format!("Deleted password for '{app}'"));
    Ok(())
}
