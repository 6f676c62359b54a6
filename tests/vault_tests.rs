//! Integration tests for `VaultManager` over real and in-memory datastores.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use passhero::crypto::Argon2Params;
use passhero::datastore::{FileDatastore, MemoryDatastore};
use passhero::errors::PassHeroError;
use passhero::generator::PasswordGenerator;
use passhero::vault::{VaultManager, VaultOptions};
use tempfile::TempDir;

/// Fast KDF settings so the suite does not spend seconds in Argon2.
fn fast_options() -> VaultOptions {
    VaultOptions {
        generator: PasswordGenerator::default(),
        argon2: Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// Helper: an empty vault file inside a fresh temp dir.
fn vault_file() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("encrypted.vault");
    FileDatastore::create(&path).expect("create vault file");
    (dir, path)
}

fn open_file(path: &std::path::Path, passphrase: &str) -> passhero::errors::Result<VaultManager> {
    VaultManager::open(FileDatastore::new(path)?, passphrase, fast_options())
}

fn snapshot(vault: &VaultManager) -> HashMap<String, String> {
    vault
        .list_applications()
        .into_iter()
        .map(|app| {
            let secret = vault.get_plaintext(&app).expect("listed app has a secret");
            (app, secret)
        })
        .collect()
}

fn assert_printable(secret: &str, min: usize, max: usize) {
    assert!((min..=max).contains(&secret.len()), "bad length {}", secret.len());
    assert!(secret.bytes().all(|b| (0x21..=0x7E).contains(&b)));
}

// ---------------------------------------------------------------------------
// Persistence round-trip
// ---------------------------------------------------------------------------

#[test]
fn reopen_reproduces_the_same_vault() {
    let (_dir, path) = vault_file();

    let vault = open_file(&path, "master passphrase").unwrap();
    for app in ["a", "b", "c"] {
        vault.generate_secret(app);
    }
    let before = snapshot(&vault);
    vault.shutdown().unwrap();

    let reopened = open_file(&path, "master passphrase").unwrap();
    assert_eq!(snapshot(&reopened), before);
    assert_eq!(reopened.len(), 3);
}

#[test]
fn github_scenario() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "master passphrase").unwrap();

    vault.generate_secret("github");
    assert!(vault.has_secret("github"));
    assert_printable(&vault.get_plaintext("github").unwrap(), 20, 30);

    vault.delete_secret("github");
    assert!(!vault.has_secret("github"));
    vault.shutdown().unwrap();

    let reopened = open_file(&path, "master passphrase").unwrap();
    assert!(!reopened.has_secret("github"));
}

#[test]
fn names_with_separators_survive_reopen() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "master passphrase").unwrap();
    vault.generate_secret("bank: savings = main");
    vault.generate_secret("#not a comment");
    let before = snapshot(&vault);
    vault.shutdown().unwrap();

    let reopened = open_file(&path, "master passphrase").unwrap();
    assert_eq!(snapshot(&reopened), before);
}

#[test]
fn file_never_contains_plaintext() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "master passphrase").unwrap();
    vault.generate_secret("github");
    vault.generate_secret("mail.example.com");
    let secrets = snapshot(&vault);
    vault.shutdown().unwrap();

    let on_disk = fs::read_to_string(&path).unwrap();
    for (app, secret) in &secrets {
        assert!(!on_disk.contains(app.as_str()), "name leaked");
        assert!(!on_disk.contains(secret.as_str()), "secret leaked");
    }
    let entry_lines = on_disk.lines().filter(|l| !l.starts_with('#')).count();
    assert_eq!(entry_lines, 2);
}

// ---------------------------------------------------------------------------
// Master passphrase
// ---------------------------------------------------------------------------

#[test]
fn wrong_passphrase_is_rejected() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "right passphrase").unwrap();
    vault.generate_secret("a");
    vault.generate_secret("b");
    vault.shutdown().unwrap();

    for _ in 0..3 {
        assert!(matches!(
            open_file(&path, "wrong passphrase"),
            Err(PassHeroError::InvalidMasterPassphrase)
        ));
    }
    assert_eq!(open_file(&path, "right passphrase").unwrap().len(), 2);
}

#[test]
fn any_passphrase_opens_an_empty_vault() {
    let (_dir, path) = vault_file();
    assert!(open_file(&path, "one").unwrap().is_empty());
    assert!(open_file(&path, "another").unwrap().is_empty());
}

#[test]
fn rekey_reencrypts_everything() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "old passphrase").unwrap();
    vault.generate_secret("a");
    vault.generate_secret("b");
    vault.flush().unwrap();
    let before = snapshot(&vault);

    vault.change_master_key("new passphrase").unwrap();
    vault.shutdown().unwrap();

    assert!(matches!(
        open_file(&path, "old passphrase"),
        Err(PassHeroError::InvalidMasterPassphrase)
    ));
    let reopened = open_file(&path, "new passphrase").unwrap();
    assert_eq!(snapshot(&reopened), before);
}

#[test]
fn rekey_interleaved_with_changes_never_mixes_keys() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "pass-0").unwrap();

    for round in 1..=4 {
        vault.generate_secret(&format!("app-{round}"));
        vault.change_master_key(&format!("pass-{round}")).unwrap();
        vault.generate_secret("shared");
    }
    let before = snapshot(&vault);
    vault.shutdown().unwrap();

    let reopened = open_file(&path, "pass-4").unwrap();
    assert_eq!(snapshot(&reopened), before);
}

// ---------------------------------------------------------------------------
// Change / delete semantics
// ---------------------------------------------------------------------------

#[test]
fn changed_secret_is_persisted() {
    let (_dir, path) = vault_file();
    let vault = open_file(&path, "master passphrase").unwrap();
    vault.generate_secret("github");
    let old = vault.get_plaintext("github").unwrap();

    vault.change_secret("github").unwrap();
    let new = vault.get_plaintext("github").unwrap();
    assert_ne!(old, new);
    vault.shutdown().unwrap();

    let reopened = open_file(&path, "master passphrase").unwrap();
    assert_eq!(reopened.get_plaintext("github").unwrap(), new);
}

#[test]
fn second_delete_writes_nothing() {
    let store = MemoryDatastore::new();
    let vault = VaultManager::open(store.clone(), "master", fast_options()).unwrap();

    vault.generate_secret("app");
    vault.flush().unwrap();

    assert!(vault.delete_secret("app"));
    vault.flush().unwrap();
    let commits = store.commit_count();
    let contents = store.contents();

    assert!(!vault.delete_secret("app"));
    vault.flush().unwrap();
    assert_eq!(store.commit_count(), commits);
    assert_eq!(store.contents(), contents);
}

#[test]
fn nothing_is_written_without_changes() {
    let store = MemoryDatastore::new();
    let vault = VaultManager::open(store.clone(), "master", fast_options()).unwrap();
    let _ = vault.list_applications();
    let _ = vault.get_plaintext("x");
    vault.shutdown().unwrap();
    assert_eq!(store.commit_count(), 0);
}

#[test]
fn drop_drains_pending_writes() {
    let store = MemoryDatastore::new();
    {
        let vault = VaultManager::open(store.clone(), "master", fast_options()).unwrap();
        vault.generate_secret("late");
    }
    let reopened = VaultManager::open(store, "master", fast_options()).unwrap();
    assert!(reopened.has_secret("late"));
}

// ---------------------------------------------------------------------------
// Bad input
// ---------------------------------------------------------------------------

#[test]
fn malformed_file_is_rejected() {
    let store = MemoryDatastore::with_contents("#passhero vault\nthis line has no separator\n");
    assert!(matches!(
        VaultManager::open(store, "master", fast_options()),
        Err(PassHeroError::InvalidVaultFormat(_))
    ));
}

#[test]
fn tampered_entry_is_rejected() {
    let store = MemoryDatastore::new();
    let vault = VaultManager::open(store.clone(), "master", fast_options()).unwrap();
    vault.generate_secret("app");
    vault.shutdown().unwrap();

    let text = String::from_utf8(store.contents()).unwrap();
    let tampered: String = text
        .lines()
        .map(|line| {
            if line.starts_with('#') {
                format!("{line}\n")
            } else {
                // Flip the last character of the encrypted secret.
                let mut chars: Vec<char> = line.chars().collect();
                let last = chars.len() - 1;
                chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
                format!("{}\n", chars.into_iter().collect::<String>())
            }
        })
        .collect();

    let store = MemoryDatastore::with_contents(tampered);
    assert!(matches!(
        VaultManager::open(store, "master", fast_options()),
        Err(PassHeroError::InvalidMasterPassphrase)
    ));
}

#[test]
fn missing_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        open_file(&dir.path().join("missing.vault"), "master"),
        Err(PassHeroError::DatastoreUnavailable { .. })
    ));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn readers_never_see_torn_entries() {
    let store = MemoryDatastore::new();
    let vault = Arc::new(VaultManager::open(store, "master", fast_options()).unwrap());
    vault.generate_secret("stable");
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let vault = Arc::clone(&vault);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut reads = 0usize;
                while !done.load(Ordering::SeqCst) || reads == 0 {
                    for app in ["stable", "flapping"] {
                        if let Some(secret) = vault.get_plaintext(app) {
                            assert_printable(&secret, 20, 30);
                        }
                    }
                    assert!(vault.has_secret("stable"));
                    let apps = vault.list_applications();
                    assert!(apps.len() == 1 || apps.len() == 2);
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    for _ in 0..200 {
        vault.change_secret("stable").unwrap();
        vault.generate_secret("flapping");
        vault.delete_secret("flapping");
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        assert!(reader.join().expect("reader panicked") > 0);
    }
    vault.flush().unwrap();
}
