//! `passhero init`: first-run setup: create the vault file and pick a
//! master passphrase.

use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, Cli};
use crate::datastore::FileDatastore;
use crate::errors::{PassHeroError, Result};
use crate::vault::VaultManager;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (settings, vault_path) = load_settings(cli)?;

    // 1. Refuse to clobber an existing vault.
    if vault_path.exists() {
        output::tip("Use `passhero rekey` to change the master passphrase of the existing vault.");
        return Err(PassHeroError::VaultAlreadyExists(vault_path));
    }

    // 2. Fail on a bad config before asking for anything.
    let options = settings.vault_options()?;

    // 3. Choose the master passphrase (with confirmation).
    let password = prompt_new_password("PASSHERO_PASSWORD")?;

    // 4. Create the empty vault file and check the passphrase builds a key.
    let datastore = FileDatastore::create(&vault_path)?;
    VaultManager::open(datastore, &password, options)?.shutdown()?;

    output::success(&format!("Vault created at {}", vault_path.display()));
    output::tip("The passphrase is fixed once the first password is saved.");
    output::tip("Run `passhero add <APP>` to generate a password.");
    output::tip("Run `passhero list` to see all applications.");

    Ok(())
}
