use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{PassHeroError, Result};
use crate::generator::PasswordGenerator;
use crate::vault::VaultOptions;

/// User-level configuration, loaded from `<home>/config.toml`.
///
/// Every field has a sensible default so Password Hero works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file name, relative to the home directory unless absolute.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Shortest generated password.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Longest generated password.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Seconds a copied password stays on the clipboard.
    #[serde(default = "default_clipboard_clear_secs")]
    pub clipboard_clear_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "encrypted.vault".to_string()
}

fn default_min_length() -> usize {
    20
}

fn default_max_length() -> usize {
    30
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_clipboard_clear_secs() -> u64 {
    30
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            clipboard_clear_secs: default_clipboard_clear_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the home directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Directory name used under the user's home directory.
    pub const HOME_DIR_NAME: &'static str = ".password-hero";

    /// Load settings from `<home_dir>/config.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(home_dir: &Path) -> Result<Self> {
        let config_path = home_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        toml::from_str(&contents).map_err(|e| {
            PassHeroError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Default home directory: `$HOME/.password-hero`.
    pub fn default_home_dir() -> Result<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(Self::HOME_DIR_NAME))
            .ok_or_else(|| {
                PassHeroError::ConfigError(
                    "cannot determine home directory; pass --home or set PASSHERO_HOME".into(),
                )
            })
    }

    /// Full path to the vault file.
    pub fn vault_path(&self, home_dir: &Path) -> PathBuf {
        let file = Path::new(&self.vault_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            home_dir.join(file)
        }
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Validated options for opening a vault.
    pub fn vault_options(&self) -> Result<VaultOptions> {
        let argon2 = self.argon2_params();
        argon2.validate()?;

        Ok(VaultOptions {
            generator: PasswordGenerator::new(self.min_length, self.max_length)?,
            argon2,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────
