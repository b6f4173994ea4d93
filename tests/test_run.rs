mod helpers;

use clap::Parser;
use helpers::{cornell_content, session, TestStore};
use snapnote::application::{NoteRepository, Notebook};
use snapnote::cli::args::Args;
use snapnote::domain::DomainError;
use std::sync::Arc;

fn args(store: &TestStore, rest: &[&str]) -> Args {
    let store_path = store.path.to_string_lossy().to_string();
    let mut argv = vec!["snapnote", "--store", store_path.as_str()];
    argv.extend_from_slice(rest);
    Args::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn given_content_file_when_running_save_then_note_is_replaced_on_disk() {
    // Arrange
    let test_store = TestStore::new();
    let note = Notebook::new(Arc::clone(&test_store.store))
        .create(&session("alice"), cornell_content("Eigenvalues", 2))
        .await
        .unwrap();
    let content_path = test_store.path.with_file_name("updated.json");
    let content = serde_json::to_string(&cornell_content("Spectral Theorem", 4)).unwrap();
    std::fs::write(&content_path, content).unwrap();
    let from = content_path.to_string_lossy().to_string();

    // Act
    snapnote::run(args(&test_store, &["save", &note.id, "--from", &from, "-u", "alice"]))
        .await
        .unwrap();

    // Assert
    let saved = test_store.reopen().get_note("alice", &note.id).await.unwrap();
    assert_eq!(saved.topic, "Spectral Theorem");
    assert_eq!(saved.content.rows.len(), 4);
}

#[tokio::test]
async fn given_owned_note_when_running_delete_then_note_is_gone() {
    let test_store = TestStore::new();
    let note = Notebook::new(Arc::clone(&test_store.store))
        .create(&session("alice"), cornell_content("Eigenvalues", 2))
        .await
        .unwrap();

    snapnote::run(args(&test_store, &["delete", &note.id, "-u", "alice"]))
        .await
        .unwrap();

    let result = test_store.reopen().get_note("alice", &note.id).await;
    assert!(matches!(result, Err(DomainError::NoteNotFound(_))));
}

#[tokio::test]
async fn given_anonymous_user_when_running_delete_then_fails_and_keeps_note() {
    let test_store = TestStore::new();
    let note = Notebook::new(Arc::clone(&test_store.store))
        .create(&session("alice"), cornell_content("Eigenvalues", 2))
        .await
        .unwrap();

    let result = snapnote::run(args(&test_store, &["delete", &note.id])).await;

    assert!(result.is_err());
    assert!(test_store.reopen().get_note("alice", &note.id).await.is_ok());
}
