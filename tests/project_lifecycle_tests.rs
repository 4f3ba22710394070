//! Project Lifecycle Tests
//!
//! Create a project directory, edit it through sessions, store and reopen.

use std::fs;

use approx::assert_relative_eq;
use montage::layers::{LayerPatch, MediaSource};
use montage::state::{Project, ProjectDir, CURRENT_SCHEMA_VERSION};
use montage::EditorConfig;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn create(dir: &TempDir) -> ProjectDir {
    let store = ProjectDir::new(dir.path().join("promo"));
    let project = Project::new("Promo", 300, 30).with_template(3);
    store.create(&project, 50).unwrap();
    store
}

#[test]
fn test_create_writes_both_files() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);

    assert!(store.project_file().exists());
    assert!(store.history_file().exists());

    let project = store.load_project().unwrap();
    assert_eq!(project.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(project.template_id, Some(3));
    assert!(project.layers.is_empty());
}

#[test]
fn test_reopened_project_keeps_layers_and_history() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);
    let config = EditorConfig::default();

    let (mut project, mut session) = store.open_session(config.clone()).unwrap();
    let text = session.add_text_layer().unwrap();
    session.playhead_mut().seek(45);
    session
        .add_audio_layer(MediaSource::new("blob:9").with_file_name("theme.mp3"))
        .unwrap();
    session
        .update_layer(&text, &LayerPatch::new().set("opacity", 0.25))
        .unwrap();
    session.undo();
    session.select_layer(Some(text.clone())).unwrap();
    store.store_session(&mut project, &session).unwrap();

    let (reopened_project, reopened) = store.open_session(config).unwrap();

    assert_eq!(reopened.layers(), session.layers());
    assert_eq!(reopened.history().index(), session.history().index());
    assert_eq!(reopened.history().len(), session.history().len());
    assert!(reopened.can_undo());
    assert!(reopened.can_redo());
    assert_eq!(reopened.playhead().current_frame(), 45);
    assert_eq!(reopened.selected_layer(), Some(&text));
    assert_eq!(reopened_project.layers[1].name(), "theme");
    assert_relative_eq!(reopened.layer(&text).unwrap().common().opacity, 1.0);
}

#[test]
fn test_redo_after_reopen() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);
    let config = EditorConfig::default();

    let (mut project, mut session) = store.open_session(config.clone()).unwrap();
    let id = session.add_text_layer().unwrap();
    session.undo();
    store.store_session(&mut project, &session).unwrap();

    let (_, mut reopened) = store.open_session(config).unwrap();
    assert!(reopened.layers().is_empty());
    assert!(reopened.redo());
    assert!(reopened.layer(&id).is_some());
}

#[test]
fn test_applied_snapshot_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);
    let config = EditorConfig::default();

    let (mut project, mut session) = store.open_session(config.clone()).unwrap();
    let first = session.add_text_layer().unwrap();
    session.add_text_layer().unwrap();
    let mut shown = session.layers().to_vec();
    shown[0].common_mut().opacity = 0.5;
    session.apply_snapshot(shown.clone());
    store.store_session(&mut project, &session).unwrap();

    let (_, mut reopened) = store.open_session(config).unwrap();

    assert_eq!(reopened.layers(), shown.as_slice());
    assert_eq!(reopened.history().len(), 3);
    assert_eq!(reopened.history().index(), 2);
    assert!(reopened.can_undo());
    assert!(reopened.undo());
    assert_eq!(reopened.layers().len(), 1);
    assert_relative_eq!(reopened.layer(&first).unwrap().common().opacity, 1.0);
}

#[test]
fn test_smaller_cap_trims_stored_history() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);

    let (mut project, mut session) = store.open_session(EditorConfig::default()).unwrap();
    for _ in 0..6 {
        session.add_text_layer().unwrap();
    }
    store.store_session(&mut project, &session).unwrap();

    let config = EditorConfig {
        max_history_size: 3,
        ..EditorConfig::default()
    };
    let (_, reopened) = store.open_session(config).unwrap();

    assert_eq!(reopened.history().len(), 3);
    assert_eq!(reopened.layers().len(), 6);
    assert!(!reopened.can_redo());
}

#[test]
fn test_corrupt_history_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);
    fs::write(store.history_file(), r#"{"entries": [], "index": 0, "max_entries": 50}"#).unwrap();

    let err = store.open_session(EditorConfig::default()).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_HISTORY");
}

#[test]
fn test_missing_history_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);
    fs::remove_file(store.history_file()).unwrap();

    let (_, session) = store.open_session(EditorConfig::default()).unwrap();
    assert!(!session.can_undo());
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_playhead_and_selection_are_not_unsaved_changes() {
    let dir = TempDir::new().unwrap();
    let store = create(&dir);
    let config = EditorConfig::default();

    let (mut project, mut session) = store.open_session(config.clone()).unwrap();
    let id = session.add_text_layer().unwrap();
    store.store_session(&mut project, &session).unwrap();
    project.mark_saved(11, "https://cdn.example.com/11.mp4").unwrap();
    store.store_session(&mut project, &session).unwrap();

    let (mut project, mut session) = store.open_session(config).unwrap();
    session.playhead_mut().seek(200);
    session.select_layer(None).unwrap();
    store.store_session(&mut project, &session).unwrap();
    assert!(!project.has_unsaved_changes().unwrap());

    session
        .update_layer(&id, &LayerPatch::new().set("name", "Headline"))
        .unwrap();
    store.store_session(&mut project, &session).unwrap();
    assert!(project.has_unsaved_changes().unwrap());
}
