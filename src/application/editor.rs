// src/application/editor.rs
use crate::application::print::ViewRequest;
use crate::domain::{DomainError, Metadata, Note, NoteContent, Row, ViewMode, ViewState};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Topic,
    Date,
    Course,
    Objective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Cue,
    Note,
}

/// Working copy of a note in the editor, plus its view mode.
///
/// Mutations are only accepted in `Edit`; in `Preview` and `Print` they fail
/// with `ReadOnly` and leave the content untouched. Every accepted mutation
/// and every mode change advances the render epoch.
#[derive(Debug, Clone)]
pub struct EditorSession {
    session_id: String,
    note_id: Option<String>,
    content: NoteContent,
    view: ViewState,
}

impl EditorSession {
    /// Blank, unsaved note dated `date`.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().simple().to_string(),
            note_id: None,
            content: NoteContent::blank(date),
            view: ViewState::default(),
        }
    }

    pub fn from_note(note: &Note) -> Self {
        Self {
            session_id: Uuid::new_v4().simple().to_string(),
            note_id: Some(note.id.clone()),
            content: note.content.clone(),
            view: ViewState::default(),
        }
    }

    /// Identifies this editor's requests on a shared render surface.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn note_id(&self) -> Option<&str> {
        self.note_id.as_deref()
    }

    pub fn content(&self) -> &NoteContent {
        &self.content
    }

    pub fn into_content(self) -> NoteContent {
        self.content
    }

    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    pub fn epoch(&self) -> u64 {
        self.view.epoch()
    }

    pub fn update_metadata(&mut self, field: MetadataField, value: &str) -> Result<(), DomainError> {
        self.ensure_editable()?;
        let Metadata {
            topic,
            date,
            course,
            objective,
        } = &mut self.content.metadata;
        let target = match field {
            MetadataField::Topic => topic,
            MetadataField::Date => date,
            MetadataField::Course => course,
            MetadataField::Objective => objective,
        };
        *target = value.to_string();
        self.view.touch();
        Ok(())
    }

    pub fn set_summary(&mut self, value: &str) -> Result<(), DomainError> {
        self.ensure_editable()?;
        self.content.summary = value.to_string();
        self.view.touch();
        Ok(())
    }

    /// Append an empty row and return its id.
    pub fn add_row(&mut self) -> Result<String, DomainError> {
        self.ensure_editable()?;
        let id = format!("row-{}", Uuid::new_v4().simple());
        self.content.rows.push(Row::empty(id.clone()));
        self.view.touch();
        Ok(id)
    }

    /// Remove a row. The last remaining row is kept; returns whether a row was removed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_row(&mut self, row_id: &str) -> Result<bool, DomainError> {
        self.ensure_editable()?;
        let index = self.row_index(row_id)?;
        if self.content.rows.len() <= 1 {
            debug!("Keeping last row");
            return Ok(false);
        }
        self.content.rows.remove(index);
        self.view.touch();
        Ok(true)
    }

    pub fn update_row(&mut self, row_id: &str, field: RowField, value: &str) -> Result<(), DomainError> {
        self.ensure_editable()?;
        let index = self.row_index(row_id)?;
        let row = &mut self.content.rows[index];
        match field {
            RowField::Cue => row.cue = value.to_string(),
            RowField::Note => row.note = value.to_string(),
        }
        self.view.touch();
        Ok(())
    }

    /// Flip between Edit and Preview. No effect while printing.
    pub fn toggle_preview(&mut self) -> ViewMode {
        let mode = self.view.toggle();
        debug!(%mode, epoch = self.view.epoch(), "Toggled view mode");
        mode
    }

    /// Enter Preview and return the epoch a rendered frame must reach.
    pub fn force_preview(&mut self) -> u64 {
        self.view.force_preview()
    }

    pub fn begin_print(&mut self) {
        self.view.begin_print();
    }

    pub fn end_print(&mut self) {
        self.view.end_print();
    }

    /// Snapshot for a render surface.
    pub fn view_request(&self) -> ViewRequest {
        ViewRequest {
            session_id: self.session_id.clone(),
            epoch: self.view.epoch(),
            mode: self.view.mode(),
            content: self.content.clone(),
        }
    }

    fn ensure_editable(&self) -> Result<(), DomainError> {
        if !self.view.mode().is_editable() {
            return Err(DomainError::ReadOnly(self.view.mode()));
        }
        Ok(())
    }

    fn row_index(&self, row_id: &str) -> Result<usize, DomainError> {
        self.content
            .rows
            .iter()
            .position(|r| r.id == row_id)
            .ok_or_else(|| DomainError::Validation(format!("no row with id '{row_id}'")))
    }
}
