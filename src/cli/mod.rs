//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod clipboard;
pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::datastore::FileDatastore;
use crate::errors::{PassHeroError, Result};
use crate::vault::VaultManager;

/// Minimum master passphrase length to prevent trivially weak passphrases.
const MIN_PASSWORD_LEN: usize = 8;

/// Longest accepted application name.
const MAX_APP_NAME_LEN: usize = 256;

/// Password Hero CLI: one generated password per application.
#[derive(Parser)]
#[command(
    name = "passhero",
    about = "Generated-password vault, encrypted under one master passphrase",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Password Hero home directory (default: ~/.password-hero)
    #[arg(long, env = "PASSHERO_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault file and choose a master passphrase
    Init,

    /// List all applications
    List,

    /// Generate a password for a new application
    Add {
        /// Application name (e.g. github)
        app: String,
    },

    /// Show an application's password
    Get {
        /// Application name
        app: String,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
    },

    /// Replace an application's password with a new one
    Change {
        /// Application name
        app: String,
    },

    /// Delete an application's password
    Delete {
        /// Application name
        app: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the master passphrase
    Rekey,

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the home directory from `--home` / `PASSHERO_HOME` or `$HOME`.
pub fn home_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.home {
        Some(dir) => Ok(dir.clone()),
        None => Settings::default_home_dir(),
    }
}

/// Load settings and compute the vault path.
pub fn load_settings(cli: &Cli) -> Result<(Settings, PathBuf)> {
    let home = home_dir(cli)?;
    let settings = Settings::load(&home)?;
    let vault_path = settings.vault_path(&home);
    Ok((settings, vault_path))
}

/// Get the master passphrase, trying in order:
/// 1. `PASSHERO_PASSWORD` env var (scripts, tests)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSHERO_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master passphrase")
        .interact()
        .map_err(|e| PassHeroError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master passphrase with confirmation.
///
/// `env_var` lets scripted use supply it (`PASSHERO_PASSWORD` for `init`,
/// `PASSHERO_NEW_PASSWORD` for `rekey`).  Enforces a minimum length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(PassHeroError::CommandFailed(format!(
                    "passphrase must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master passphrase")
            .with_confirmation(
                "Confirm master passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| PassHeroError::CommandFailed(format!("passphrase prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Open the configured vault, prompting for the master passphrase.
pub fn open_vault(cli: &Cli) -> Result<(VaultManager, Settings)> {
    let (settings, path) = load_settings(cli)?;
    let options = settings.vault_options()?;

    if !path.exists() {
        output::tip("Run `passhero init` to create a vault.");
    }
    let datastore = FileDatastore::new(path)?;

    let password = prompt_password()?;
    let vault = VaultManager::open(datastore, &password, options)?;
    Ok((vault, settings))
}

/// Validate that an application name is usable.
///
/// Must be non-empty, at most 256 bytes, free of control characters and
/// not padded with whitespace.
pub fn validate_app_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PassHeroError::CommandFailed(
            "application name cannot be empty".into(),
        ));
    }

    if name.len() > MAX_APP_NAME_LEN {
        return Err(PassHeroError::CommandFailed(format!(
            "application name cannot exceed {MAX_APP_NAME_LEN} bytes"
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(PassHeroError::CommandFailed(
            "application name cannot contain control characters".into(),
        ));
    }

    if name.trim() != name {
        return Err(PassHeroError::CommandFailed(format!(
            "application name '{name}' cannot start or end with whitespace"
        )));
    }

    Ok(())
}
