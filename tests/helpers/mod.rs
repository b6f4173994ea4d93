use snapnote::domain::{Metadata, NoteContent, Role, Row, Session, User};
use snapnote::infrastructure::JsonStore;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// JSON store in a temporary directory, removed on drop
#[allow(dead_code)]
pub struct TestStore {
    _temp_dir: TempDir,
    pub path: PathBuf,
    pub store: Arc<JsonStore>,
}

#[allow(dead_code)]
impl TestStore {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("store.json");
        let store = Arc::new(JsonStore::new(&path));
        Self {
            _temp_dir: temp_dir,
            path,
            store,
        }
    }

    /// Reopen the same file with a fresh store instance
    pub fn reopen(&self) -> Arc<JsonStore> {
        Arc::new(JsonStore::new(&self.path))
    }

    pub async fn with_admin(self, id: &str) -> Self {
        self.store
            .upsert_user(User::new(id).with_role(Role::Admin))
            .await
            .expect("Failed to register admin");
        self
    }
}

#[allow(dead_code)]
pub fn session(user_id: &str) -> Session {
    Session::signed_in(User::new(user_id))
}

/// Cornell content with `rows` numbered rows mixing text and math
#[allow(dead_code)]
pub fn cornell_content(topic: &str, rows: usize) -> NoteContent {
    NoteContent {
        metadata: Metadata {
            topic: topic.to_string(),
            date: "2026-10-17".to_string(),
            course: "MATH 240".to_string(),
            objective: "Diagonalise symmetric matrices".to_string(),
        },
        rows: (1..=rows)
            .map(|i| Row {
                id: format!("r{i}"),
                cue: format!("Cue {i}"),
                note: format!("Step {i}: $$A = Q \\Lambda Q^T$$"),
            })
            .collect(),
        summary: "- symmetric matrices have orthogonal eigenvectors".to_string(),
    }
}
