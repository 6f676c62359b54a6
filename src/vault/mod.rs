//! Vault module: the in-memory password vault and its persistence.
//!
//! This module provides:
//! - The properties-style on-disk entry format (`format`)
//! - `VaultManager`, the lock-guarded cache of application passwords (`manager`)
//! - The single background writer that keeps the datastore in sync (`persistence`)

pub mod format;
pub mod manager;
mod persistence;

// Re-export the most commonly used items.
pub use manager::{KeyFactory, VaultManager, VaultOptions};
