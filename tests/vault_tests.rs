//! Integration tests for the record lifecycle.

use std::sync::Arc;

use locker::app::Locker;
use locker::auth::{Principal, SigningKey};
use locker::config::Settings;
use locker::errors::LockerError;
use locker::store::{MemoryStore, RecordStore, SqliteStore};
use locker::vault::{RecordMetadata, SealedUpdate};

/// Settings with low-cost KDF parameters.
fn fast_settings() -> Settings {
    Settings {
        argon2_memory_kib: 8_192,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..Settings::default()
    }
}

/// Helper: a locker over an in-memory store, plus the store itself.
fn memory_locker() -> (Arc<MemoryStore>, Locker) {
    let store = Arc::new(MemoryStore::new());
    let locker = Locker::with_stores(
        fast_settings(),
        std::env::temp_dir(),
        store.clone(),
        store.clone(),
        SigningKey::generate(),
    )
    .expect("compose locker");
    (store, locker)
}

/// Helper: register and log in, returning the validated principal.
fn signed_in(locker: &Locker, username: &str, email: &str, password: &str) -> Principal {
    locker
        .accounts()
        .register(username, email, password)
        .expect("register");
    let outcome = locker.accounts().login(username, password).expect("login");
    locker
        .authenticate(outcome.token.as_str())
        .expect("token validates")
}

fn example_metadata() -> RecordMetadata {
    RecordMetadata::new("example.com", "alice_ex", None)
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[test]
fn alice_scenario() {
    let (_store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();

    // Same credential reads it back.
    let view = locker
        .vault()
        .read(&alice, &created.id, "Secret123!")
        .unwrap();
    assert_eq!(view.secret.as_str(), "p@ss");
    assert_eq!(view.label, "example.com");
    assert_eq!(view.account_name, "alice_ex");

    // Wrong credential is Unauthorized.
    let wrong = locker.vault().read(&alice, &created.id, "wrong");
    assert!(matches!(wrong, Err(LockerError::Unauthorized)));

    // Another authenticated user sees NotFound, not Unauthorized.
    let bob = signed_in(&locker, "bob", "bob@x.com", "Hunter22!");
    let foreign = locker.vault().read(&bob, &created.id, "Hunter22!");
    assert!(matches!(foreign, Err(LockerError::NotFound)));
}

#[test]
fn foreign_and_missing_records_look_the_same() {
    let (_store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");
    let bob = signed_in(&locker, "bob", "bob@x.com", "Hunter22!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();

    let foreign = locker.vault().read(&bob, &created.id, "Hunter22!").unwrap_err();
    let missing = locker.vault().read(&bob, "no-such-id", "Hunter22!").unwrap_err();
    assert_eq!(foreign.to_string(), missing.to_string());

    // Ownership is decided before the credential: a wrong password on a
    // foreign record still says NotFound.
    assert!(matches!(
        locker.vault().read(&bob, &created.id, "wrong"),
        Err(LockerError::NotFound)
    ));
    assert!(matches!(
        locker.vault().delete(&bob, &created.id),
        Err(LockerError::NotFound)
    ));
    assert!(matches!(
        locker
            .vault()
            .update(&bob, &created.id, "x", example_metadata(), "Hunter22!"),
        Err(LockerError::NotFound)
    ));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_with_wrong_credential_stores_nothing() {
    let (store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let result = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "not-it");
    assert!(matches!(result, Err(LockerError::Unauthorized)));
    assert!(store.records_for_owner(&alice.id).unwrap().is_empty());
}

#[test]
fn create_validates_input() {
    let (_store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let empty_secret = locker
        .vault()
        .create(&alice, "", example_metadata(), "Secret123!");
    assert!(matches!(empty_secret, Err(LockerError::Validation(_))));

    let empty_label = locker.vault().create(
        &alice,
        "p@ss",
        RecordMetadata::new("", "alice_ex", None),
        "Secret123!",
    );
    assert!(matches!(empty_label, Err(LockerError::Validation(_))));

    let no_credential = locker.vault().create(&alice, "p@ss", example_metadata(), "");
    assert!(matches!(no_credential, Err(LockerError::Validation(_))));
}

#[test]
fn stored_record_holds_no_plaintext() {
    let (store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "very-distinct-secret", example_metadata(), "Secret123!")
        .unwrap();

    let raw = store.get_record(&created.id).unwrap().unwrap();
    assert_eq!(raw.owner_id, alice.id);
    assert!(raw.has_valid_nonce());
    let json = serde_json::to_string(&raw).unwrap();
    assert!(!json.contains("very-distinct-secret"));
    assert!(!json.contains("Secret123!"));
}

#[test]
fn session_principal_for_unknown_user_cannot_unlock() {
    let (_store, locker) = memory_locker();
    let ghost = Principal {
        id: "ghost".into(),
        username: "ghost".into(),
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
    };
    let result = locker
        .vault()
        .create(&ghost, "p@ss", example_metadata(), "Secret123!");
    assert!(matches!(result, Err(LockerError::Unauthorized)));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_replaces_ciphertext_and_nonce_together() {
    let (store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();
    let before = store.get_record(&created.id).unwrap().unwrap();

    let updated = locker
        .vault()
        .update(
            &alice,
            &created.id,
            "n3w-p@ss",
            RecordMetadata::new("example.com", "alice_new", Some("rotated")),
            "Secret123!",
        )
        .unwrap();
    let after = store.get_record(&created.id).unwrap().unwrap();

    assert_ne!(before.nonce, after.nonce, "nonce must be fresh");
    assert_ne!(before.ciphertext, after.ciphertext);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > after.created_at);
    assert_eq!(updated.updated_at, after.updated_at);

    let view = locker
        .vault()
        .read(&alice, &created.id, "Secret123!")
        .unwrap();
    assert_eq!(view.secret.as_str(), "n3w-p@ss");
    assert_eq!(view.account_name, "alice_new");
    assert_eq!(view.notes.as_deref(), Some("rotated"));
}

#[test]
fn update_with_wrong_credential_leaves_record_untouched() {
    let (store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();
    let before = store.get_record(&created.id).unwrap().unwrap();

    let result = locker.vault().update(
        &alice,
        &created.id,
        "other",
        example_metadata(),
        "wrong",
    );
    assert!(matches!(result, Err(LockerError::Unauthorized)));
    assert_eq!(store.get_record(&created.id).unwrap().unwrap(), before);
}

// ---------------------------------------------------------------------------
// Tampering
// ---------------------------------------------------------------------------

#[test]
fn tampered_record_reads_as_unauthorized() {
    let (store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();

    let mut raw = store.get_record(&created.id).unwrap().unwrap();
    raw.ciphertext[0] ^= 0xFF;
    store
        .replace_sealed(
            &raw.id,
            &SealedUpdate {
                metadata: raw.metadata.clone(),
                ciphertext: raw.ciphertext.clone(),
                nonce: raw.nonce.clone(),
                updated_at: raw.updated_at,
            },
        )
        .unwrap();

    let result = locker.vault().read(&alice, &created.id, "Secret123!");
    assert!(matches!(result, Err(LockerError::Unauthorized)));
}

#[test]
fn truncated_nonce_reads_as_unauthorized() {
    let (store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();

    let raw = store.get_record(&created.id).unwrap().unwrap();
    store
        .replace_sealed(
            &raw.id,
            &SealedUpdate {
                metadata: raw.metadata.clone(),
                ciphertext: raw.ciphertext.clone(),
                nonce: raw.nonce[..8].to_vec(),
                updated_at: raw.updated_at,
            },
        )
        .unwrap();

    let result = locker.vault().read(&alice, &created.id, "Secret123!");
    assert!(matches!(result, Err(LockerError::Unauthorized)));

    // Rewriting the secret repairs the record.
    locker
        .vault()
        .update(&alice, &created.id, "fixed", example_metadata(), "Secret123!")
        .unwrap();
    let view = locker.vault().read(&alice, &created.id, "Secret123!").unwrap();
    assert_eq!(view.secret.as_str(), "fixed");
}

// ---------------------------------------------------------------------------
// Delete, list, search
// ---------------------------------------------------------------------------

#[test]
fn delete_needs_only_ownership() {
    let (_store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");

    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();

    locker.vault().delete(&alice, &created.id).unwrap();
    assert!(matches!(
        locker.vault().read(&alice, &created.id, "Secret123!"),
        Err(LockerError::NotFound)
    ));
    assert!(matches!(
        locker.vault().delete(&alice, &created.id),
        Err(LockerError::NotFound)
    ));
}

#[test]
fn list_and_search_are_scoped_to_owner() {
    let (_store, locker) = memory_locker();
    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");
    let bob = signed_in(&locker, "bob", "bob@x.com", "Hunter22!");

    for (label, account) in [("GitHub.com", "alice"), ("example.com", "alice_ex")] {
        locker
            .vault()
            .create(
                &alice,
                "p@ss",
                RecordMetadata::new(label, account, None),
                "Secret123!",
            )
            .unwrap();
    }
    locker
        .vault()
        .create(
            &bob,
            "b0b",
            RecordMetadata::new("github.com", "bob", None),
            "Hunter22!",
        )
        .unwrap();

    let all = locker.vault().list(&alice).unwrap();
    assert_eq!(all.len(), 2);

    let hits = locker.vault().search(&alice, "HUB").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].label, "GitHub.com");

    assert_eq!(locker.vault().list(&bob).unwrap().len(), 1);
    assert!(locker.vault().search(&bob, "example").unwrap().is_empty());

    // A blank query behaves like list.
    let blank = locker.vault().search(&alice, "  ").unwrap();
    assert_eq!(blank, all);
}

// ---------------------------------------------------------------------------
// Same lifecycle against SQLite
// ---------------------------------------------------------------------------

#[test]
fn sqlite_backed_lifecycle() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("locker.db")).unwrap());
    let locker = Locker::with_stores(
        fast_settings(),
        dir.path().to_path_buf(),
        store.clone(),
        store.clone(),
        SigningKey::generate(),
    )
    .unwrap();

    let alice = signed_in(&locker, "alice", "alice@x.com", "Secret123!");
    let created = locker
        .vault()
        .create(&alice, "p@ss", example_metadata(), "Secret123!")
        .unwrap();

    let before = store.get_record(&created.id).unwrap().unwrap();
    locker
        .vault()
        .update(&alice, &created.id, "n3w", example_metadata(), "Secret123!")
        .unwrap();
    let after = store.get_record(&created.id).unwrap().unwrap();

    assert_ne!(before.nonce, after.nonce);
    assert!(after.updated_at > after.created_at);
    assert_eq!(
        locker
            .vault()
            .read(&alice, &created.id, "Secret123!")
            .unwrap()
            .secret
            .as_str(),
        "n3w"
    );

    locker.vault().delete(&alice, &created.id).unwrap();
    assert!(locker.vault().list(&alice).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Concurrent access
// ---------------------------------------------------------------------------

const ROUNDS: usize = 3;

/// Writers rotate the secret while readers keep opening it; every read must
/// decrypt to one of the values some writer stored.
fn updates_and_reads_interleave(locker: &Locker) {
    let alice = signed_in(locker, "alice", "alice@x.com", "Secret123!");
    let created = locker
        .vault()
        .create(&alice, "initial", example_metadata(), "Secret123!")
        .unwrap();

    let mut allowed = vec!["initial".to_string()];
    for writer in 0..2 {
        for round in 0..ROUNDS {
            allowed.push(format!("w{writer}-r{round}"));
        }
    }

    std::thread::scope(|s| {
        for writer in 0..2 {
            let (alice, id) = (&alice, &created.id);
            s.spawn(move || {
                for round in 0..ROUNDS {
                    locker
                        .vault()
                        .update(
                            alice,
                            id,
                            &format!("w{writer}-r{round}"),
                            example_metadata(),
                            "Secret123!",
                        )
                        .unwrap();
                }
            });
        }
        for _ in 0..2 {
            let (alice, id, allowed) = (&alice, &created.id, &allowed);
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    let view = locker.vault().read(alice, id, "Secret123!").unwrap();
                    assert!(
                        allowed.iter().any(|v| v == view.secret.as_str()),
                        "read an unexpected secret"
                    );
                }
            });
        }
    });

    let last = locker.vault().read(&alice, &created.id, "Secret123!").unwrap();
    assert!(allowed[1..].iter().any(|v| v == last.secret.as_str()));
}

#[test]
fn concurrent_updates_and_reads_over_memory() {
    let (_store, locker) = memory_locker();
    updates_and_reads_interleave(&locker);
}

#[test]
fn concurrent_updates_and_reads_over_sqlite() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("locker.db")).unwrap());
    let locker = Locker::with_stores(
        fast_settings(),
        dir.path().to_path_buf(),
        store.clone(),
        store,
        SigningKey::generate(),
    )
    .unwrap();
    updates_and_reads_interleave(&locker);
}
