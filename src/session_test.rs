#![allow(clippy::float_cmp)]

use super::*;

fn profile(balance: f64) -> UserProfile {
    UserProfile { id: 1, username: "ada".into(), balance }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[test]
fn starts_anonymous() {
    let state = SessionState::default();
    assert!(!state.is_authenticated());
    assert!(state.session().is_none());
}

#[test]
fn login_then_logout() {
    let mut state = SessionState::default();
    state.login("tok");
    assert_eq!(state.session().map(|s| s.token.as_str()), Some("tok"));
    state.logout();
    assert_eq!(state, SessionState::Anonymous);
}

#[test]
fn unauthorized_returns_to_anonymous() {
    let mut state = SessionState::default();
    state.login("tok");
    state.receive_unauthorized();
    assert_eq!(state, SessionState::Anonymous);
}

#[test]
fn relogin_replaces_cached_profile() {
    let mut state = SessionState::default();
    state.login("a");
    if let Some(s) = state.session_mut() {
        s.user = Some(profile(3.0));
    }
    state.login("b");
    assert_eq!(state.session(), Some(&Session::new("b")));
}

// =============================================================================
// FILE STORE
// =============================================================================

#[test]
fn file_store_round_trips_under_access_token_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("credentials.json");
    let store = FileCredentialStore::new(&path);

    assert_eq!(store.load().unwrap(), None);
    store.save("secret").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("secret"));

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[CREDENTIAL_KEY], "secret");
}

#[cfg(unix)]
#[test]
fn file_store_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "{}").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    FileCredentialStore::new(&path).save("secret").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn file_store_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("credentials.json"));
    store.save("secret").unwrap();
    store.clear().unwrap();
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
    assert!(!store.path().exists());
}

#[test]
fn file_store_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "not json").unwrap();
    let err = FileCredentialStore::new(&path).load().unwrap_err();
    assert!(matches!(err, CredentialError::Malformed(_)));
}

#[test]
fn file_store_ignores_empty_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, r#"{"access_token": ""}"#).unwrap();
    assert_eq!(FileCredentialStore::new(&path).load().unwrap(), None);
}

// =============================================================================
// MANAGER
// =============================================================================

#[test]
fn manager_login_persists_token() {
    let mut mgr = SessionManager::new(Box::new(MemoryCredentialStore::new()));
    mgr.login("tok").unwrap();
    assert!(mgr.is_authenticated());
    assert_eq!(mgr.token(), Some("tok"));
    assert_eq!(mgr.store().load().unwrap().as_deref(), Some("tok"));
}

#[test]
fn manager_restore_adopts_stored_token() {
    let mut mgr = SessionManager::new(Box::new(MemoryCredentialStore::with_token("saved")));
    assert!(mgr.restore().unwrap());
    assert_eq!(mgr.token(), Some("saved"));
}

#[test]
fn manager_restore_without_token_stays_anonymous() {
    let mut mgr = SessionManager::new(Box::new(MemoryCredentialStore::new()));
    assert!(!mgr.restore().unwrap());
    assert!(!mgr.is_authenticated());
}

#[test]
fn manager_logout_clears_store() {
    let mut mgr = SessionManager::new(Box::new(MemoryCredentialStore::new()));
    mgr.login("tok").unwrap();
    mgr.logout().unwrap();
    assert!(!mgr.is_authenticated());
    assert_eq!(mgr.store().load().unwrap(), None);
}

#[test]
fn manager_unauthorized_clears_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let mut mgr = SessionManager::new(Box::new(FileCredentialStore::new(&path)));
    mgr.login("tok").unwrap();

    mgr.receive_unauthorized();

    assert!(!mgr.is_authenticated());
    assert!(!path.exists());
}

#[test]
fn profile_and_staleness() {
    let mut mgr = SessionManager::new(Box::new(MemoryCredentialStore::new()));
    mgr.set_profile(profile(5.0));
    assert_eq!(mgr.balance(), None);

    mgr.login("tok").unwrap();
    mgr.set_profile(profile(5.0));
    mgr.mark_balance_stale();
    assert_eq!(mgr.balance(), Some(5.0));
    assert!(mgr.session().unwrap().balance_stale);

    mgr.set_profile(profile(4.0));
    assert_eq!(mgr.balance(), Some(4.0));
    assert!(!mgr.session().unwrap().balance_stale);
}
