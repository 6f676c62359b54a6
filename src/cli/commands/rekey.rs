//! `passhero rekey`: change the master passphrase.
//!
//! Opens the vault with the current passphrase, swaps in a key derived
//! from the new one, and waits for the vault to be re-encrypted on disk.

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, Cli};
use crate::errors::Result;

/// Execute the `rekey` command.
pub fn execute(cli: &Cli) -> Result<()> {
    output::info("Enter your current master passphrase.");
    let (vault, _) = open_vault(cli)?;

    output::info("Choose your new master passphrase.");
    let new_password = prompt_new_password("PASSHERO_NEW_PASSWORD")?;

    vault.change_master_key(&new_password)?;
    let count = vault.len();
    vault.shutdown()?;

    output::success(&format!(
        "Master passphrase changed ({count} password(s) re-encrypted)"
    ));
    Ok(())
}
