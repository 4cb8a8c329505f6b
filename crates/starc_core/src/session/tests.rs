use super::{FileSessionStore, MemorySessionStore, PersistedSession, Session, SessionStore};
use crate::models::auth::TokenPair;
use crate::settings::{FontSize, SettingsPatch, Theme};
use std::sync::Arc;
use tempfile::TempDir;

fn tokens(access: &str, refresh: Option<&str>) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
    }
}

#[test]
fn file_store_round_trips_through_legacy_key_names() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("session.json");
    let session = Session::init(FileSessionStore::new(&path)).expect("session");

    session
        .store_tokens(&tokens("access-1", Some("refresh-1")))
        .expect("store tokens");
    session.set_open_document(Some(42)).expect("open doc");

    let raw = std::fs::read_to_string(&path).expect("session file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["authToken"], "access-1");
    assert_eq!(value["refreshToken"], "refresh-1");
    assert_eq!(value["openDocId"], 42);
    assert_eq!(value["userSettings"]["theme"], "light");
    assert!(!path.with_file_name("session.json.tmp").exists());
}

#[test]
fn tokens_are_read_fresh_from_store_on_every_call() {
    let store = Arc::new(MemorySessionStore::default());
    let session = Session::init(store.clone()).expect("session");
    session
        .store_tokens(&tokens("old", Some("r")))
        .expect("store");
    assert_eq!(session.access_token().as_deref(), Some("old"));

    // Out-of-band rotation, e.g. another process refreshing the token.
    let mut rotated = store.load().expect("load");
    rotated.access_token = Some("new".to_string());
    store.save(&rotated).expect("save");

    assert_eq!(session.access_token().as_deref(), Some("new"));
}

#[test]
fn login_without_refresh_token_keeps_previous_refresh_token() {
    let session = Session::ephemeral();
    session
        .store_tokens(&tokens("a1", Some("r1")))
        .expect("first login");
    session.store_tokens(&tokens("a2", None)).expect("second login");
    assert_eq!(session.access_token().as_deref(), Some("a2"));
    assert_eq!(session.refresh_token().as_deref(), Some("r1"));
}

#[test]
fn blank_tokens_do_not_count_as_authenticated() {
    let session = Session::ephemeral();
    assert!(!session.is_authenticated());
    session.store_tokens(&tokens("   ", None)).expect("store");
    assert!(!session.is_authenticated());
    session.set_access_token("real").expect("set");
    assert!(session.is_authenticated());
}

#[test]
fn logout_clears_tokens_and_open_document_but_keeps_settings() {
    let session = Session::ephemeral();
    session
        .store_tokens(&tokens("a", Some("r")))
        .expect("store");
    session.set_open_document(Some(7)).expect("open");
    session
        .update_settings(SettingsPatch {
            theme: Some(Theme::Dark),
            font_size: None,
        })
        .expect("settings");

    session.logout().expect("logout");

    assert_eq!(session.access_token(), None);
    assert_eq!(session.refresh_token(), None);
    assert_eq!(session.open_document_id(), None);
    assert_eq!(session.settings().theme, Theme::Dark);
}

#[test]
fn update_settings_merges_and_persists() {
    let session = Session::ephemeral();
    let applied = session
        .update_settings(SettingsPatch {
            theme: None,
            font_size: Some(FontSize::Large),
        })
        .expect("update");
    assert_eq!(applied.font_size, FontSize::Large);
    assert_eq!(applied.theme, Theme::Light);
    assert_eq!(session.settings(), applied);
}

#[test]
fn corrupt_session_file_starts_fresh() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").expect("write corrupt");

    let session = Session::init(FileSessionStore::new(&path)).expect("session");
    assert!(!session.is_authenticated());
    assert!(!path.exists(), "corrupt file is cleared");
}

#[test]
fn invalid_stored_settings_keep_the_login() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        r#"{"authToken":"kept","refreshToken":"r","openDocId":5,"userSettings":{"theme":"purple","fontSize":"small"}}"#,
    )
    .expect("write session");

    let session = Session::init(FileSessionStore::new(&path)).expect("session");
    assert!(path.exists());
    assert_eq!(session.access_token().as_deref(), Some("kept"));
    assert_eq!(session.open_document_id(), Some(5));
    assert_eq!(session.settings().theme, Theme::Light);
    assert_eq!(session.settings().font_size, FontSize::Small);

    std::fs::write(&path, r#"{"authToken":"kept","userSettings":"sepia"}"#)
        .expect("write session");
    let session = Session::init(FileSessionStore::new(&path)).expect("session");
    assert!(session.is_authenticated());
    assert_eq!(session.settings().theme, Theme::Light);
}

#[test]
fn missing_settings_fields_fall_back_to_defaults() {
    let store = MemorySessionStore::default();
    let parsed: PersistedSession =
        serde_json::from_str(r#"{"authToken":"t","userSettings":{"fontSize":"small"}}"#)
            .expect("parse");
    store.save(&parsed).expect("save");
    let session = Session::init(store).expect("session");
    assert_eq!(session.settings().theme, Theme::Light);
    assert_eq!(session.settings().font_size, FontSize::Small);
}
