//! Cryptographic primitives for Password Hero.
//!
//! This module provides:
//! - AES-256-GCM sealing and opening (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - The `Encryptor` capability and its passphrase implementation (`encryptor`)

pub mod encryption;
pub mod encryptor;
pub mod kdf;

pub use encryptor::{Encryptor, PassphraseEncryptor};
pub use kdf::Argon2Params;
