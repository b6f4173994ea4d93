// src/application/notebook.rs
use crate::application::{parse_generated, ContentGenerator, InFlight, NoteRepository};
use crate::domain::{DomainError, Note, NoteContent, Session};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Owner-side note authoring: create, load, save, list, delete.
///
/// Notes are scoped by owner in the store, so another user's note id simply
/// resolves to `NoteNotFound`.
pub struct Notebook<S> {
    store: Arc<S>,
    in_flight: InFlight,
}

impl<S: NoteRepository> Notebook<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            in_flight: InFlight::new(),
        }
    }

    #[instrument(level = "debug", skip(self, session, content))]
    pub async fn create(&self, session: &Session, content: NoteContent) -> Result<Note, DomainError> {
        let user = session.require_user("create a note")?;
        content.validate()?;
        let _guard = self.in_flight.begin(format!("create:{}", user.id))?;

        let note = Note::new(Uuid::new_v4().simple().to_string(), &user.id, content, Utc::now());
        self.store.save_note(&note).await?;
        info!(note_id = %note.id, owner = %user.id, "Created note");
        Ok(note)
    }

    /// Seed a new note from the AI backend. Malformed output aborts the flow
    /// and nothing is stored.
    #[instrument(level = "debug", skip(self, session, generator))]
    pub async fn create_from_generator<G: ContentGenerator>(
        &self,
        session: &Session,
        generator: &G,
        topic: &str,
        course: &str,
    ) -> Result<Note, DomainError> {
        let user = session.require_user("generate a note")?;
        if topic.trim().is_empty() {
            return Err(DomainError::Validation("topic must not be empty".to_string()));
        }
        // held across the backend call and the store write
        let _guard = self.in_flight.begin(format!("generate:{}", user.id))?;

        let raw = generator.generate(topic.trim(), course.trim()).await?;
        let content = parse_generated(&raw, Utc::now().timestamp_millis())?;
        self.create(session, content).await
    }

    pub async fn get(&self, session: &Session, note_id: &str) -> Result<Note, DomainError> {
        let user = session.require_user("open a note")?;
        self.store.get_note(&user.id, note_id).await
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Note>, DomainError> {
        let user = session.require_user("list notes")?;
        self.store.list_notes(&user.id).await
    }

    /// Replace a note's content. Topic and course code follow the metadata.
    #[instrument(level = "debug", skip(self, session, content))]
    pub async fn save(
        &self,
        session: &Session,
        note_id: &str,
        content: NoteContent,
    ) -> Result<Note, DomainError> {
        let user = session.require_user("save a note")?;
        content.validate()?;
        let _guard = self.in_flight.begin(format!("save:{}:{}", user.id, note_id))?;

        let mut note = self.store.get_note(&user.id, note_id).await?;
        note.apply_content(content);
        self.store.save_note(&note).await?;
        info!(note_id, "Saved note");
        Ok(note)
    }

    pub async fn delete(&self, session: &Session, note_id: &str) -> Result<(), DomainError> {
        let user = session.require_user("delete a note")?;
        let _guard = self.in_flight.begin(format!("delete:{}:{}", user.id, note_id))?;
        self.store.delete_note(&user.id, note_id).await?;
        info!(note_id, "Deleted note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::util::testing::{sample_content, sample_note, MockStore, Operation, StaticGenerator};

    fn alice() -> Session {
        Session::signed_in(User::new("alice"))
    }

    #[tokio::test]
    async fn given_anonymous_session_when_creating_then_requires_auth_and_writes_nothing() {
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));

        let result = notebook.create(&Session::anonymous(), sample_content(1)).await;

        assert!(matches!(result, Err(DomainError::AuthRequired(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn given_blank_topic_when_creating_then_stores_untitled_private_note() {
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));

        let note = notebook
            .create(&alice(), NoteContent::blank("2026-03-01"))
            .await
            .unwrap();

        assert_eq!(note.topic, "Untitled");
        assert!(!note.is_public);
        assert_eq!(store.note("alice", &note.id), Some(note));
    }

    #[tokio::test]
    async fn given_content_without_rows_when_saving_then_rejects_before_store_call() {
        let store = Arc::new(
            MockStore::builder()
                .with_note(sample_note("n1", "alice", 2))
                .build(),
        );
        let notebook = Notebook::new(Arc::clone(&store));

        let result = notebook.save(&alice(), "n1", sample_content(0)).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(store.note("alice", "n1").unwrap().content.rows.len(), 2);
    }

    #[tokio::test]
    async fn given_new_content_when_saving_then_refreshes_topic_from_metadata() {
        let store = Arc::new(
            MockStore::builder()
                .with_note(sample_note("n1", "alice", 2))
                .build(),
        );
        let notebook = Notebook::new(Arc::clone(&store));
        let mut content = sample_content(3);
        content.metadata.topic = "Graph Theory".to_string();
        content.metadata.course = "CS 201".to_string();

        let saved = notebook.save(&alice(), "n1", content).await.unwrap();

        assert_eq!(saved.topic, "Graph Theory");
        assert_eq!(saved.course_code, "CS 201");
        assert_eq!(store.note("alice", "n1").unwrap().content.rows.len(), 3);
    }

    #[tokio::test]
    async fn given_other_users_note_when_saving_then_not_found() {
        let store = Arc::new(
            MockStore::builder()
                .with_note(sample_note("n1", "alice", 2))
                .build(),
        );
        let notebook = Notebook::new(Arc::clone(&store));
        let bob = Session::signed_in(User::new("bob"));

        let result = notebook.save(&bob, "n1", sample_content(1)).await;

        assert!(matches!(result, Err(DomainError::NoteNotFound(_))));
    }

    #[tokio::test]
    async fn given_backend_failure_when_saving_then_surfaces_error_and_keeps_prior_state() {
        let store = Arc::new(
            MockStore::builder()
                .with_note(sample_note("n1", "alice", 2))
                .failing_on(Operation::SaveNote)
                .build(),
        );
        let notebook = Notebook::new(Arc::clone(&store));

        let result = notebook.save(&alice(), "n1", sample_content(4)).await;

        assert!(matches!(result, Err(DomainError::Backend(_))));
        assert_eq!(store.note("alice", "n1").unwrap().content.rows.len(), 2);
    }

    #[tokio::test]
    async fn given_generator_output_when_creating_from_generator_then_stores_parsed_note() {
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));
        let generator = StaticGenerator::returning(
            r#"```json
            {"metadata": {"topic": "Cells", "date": "2026-01-01", "course": "BIO 1", "objective": "Organelles"},
             "rows": [{"id": "1", "cue": "Nucleus?", "note": "Holds DNA"}],
             "summary": "- cells"}
            ```"#,
        );

        let note = notebook
            .create_from_generator(&alice(), &generator, "Cells", "BIO 1")
            .await
            .unwrap();

        assert_eq!(note.topic, "Cells");
        assert!(note.content.rows[0].id.starts_with("row-"));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn given_malformed_generator_output_when_creating_then_aborts_without_storing() {
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));
        let generator = StaticGenerator::returning("not json at all");

        let result = notebook
            .create_from_generator(&alice(), &generator, "Cells", "")
            .await;

        assert!(matches!(result, Err(DomainError::MalformedContent(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn given_generator_failure_when_creating_then_surfaces_backend_error() {
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));

        let result = notebook
            .create_from_generator(&alice(), &StaticGenerator::failing("quota"), "Cells", "")
            .await;

        assert!(matches!(result, Err(DomainError::Backend(msg)) if msg == "quota"));
    }

    #[tokio::test]
    async fn given_overlapping_generate_requests_when_creating_then_second_is_busy() {
        // Arrange
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));
        let generator = StaticGenerator::returning(
            r#"{"metadata": {"topic": "Optics", "date": "", "course": "", "objective": ""},
                "rows": [{"id": "1", "cue": "Lens?", "note": "Refracts"}], "summary": ""}"#,
        )
        .with_delay(std::time::Duration::from_millis(50));

        // Act
        let session = alice();
        let (first, second) = tokio::join!(
            notebook.create_from_generator(&session, &generator, "Optics", ""),
            notebook.create_from_generator(&session, &generator, "Optics", ""),
        );

        // Assert
        assert!(first.is_ok());
        assert!(matches!(second, Err(DomainError::Busy(_))));
        assert_eq!(generator.call_count(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn given_finished_generate_request_when_generating_again_then_guard_is_released() {
        let store = Arc::new(MockStore::builder().build());
        let notebook = Notebook::new(Arc::clone(&store));
        let generator = StaticGenerator::failing("quota");

        let _ = notebook
            .create_from_generator(&alice(), &generator, "Optics", "")
            .await;
        let retry = notebook
            .create_from_generator(&alice(), &generator, "Optics", "")
            .await;

        assert!(matches!(retry, Err(DomainError::Backend(_))));
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn given_notes_when_listing_and_deleting_then_only_owner_scope_is_touched() {
        let store = Arc::new(
            MockStore::builder()
                .with_note(sample_note("n1", "alice", 1))
                .with_note(sample_note("n2", "alice", 1))
                .with_note(sample_note("n3", "bob", 1))
                .build(),
        );
        let notebook = Notebook::new(Arc::clone(&store));

        assert_eq!(notebook.list(&alice()).await.unwrap().len(), 2);
        notebook.delete(&alice(), "n1").await.unwrap();

        assert_eq!(notebook.list(&alice()).await.unwrap().len(), 1);
        assert!(store.note("bob", "n3").is_some());
    }
}
