// src/application/print.rs
use crate::application::{EditorSession, InFlight};
use crate::constants::DEFAULT_PRINT_TITLE;
use crate::domain::{DomainError, NoteContent, ViewMode};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// What a render surface is asked to draw.
///
/// Epochs are only ordered within one editor session, so requests carry the
/// session id alongside the epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRequest {
    pub session_id: String,
    pub epoch: u64,
    pub mode: ViewMode,
    pub content: NoteContent,
}

/// A completed render, tagged with the session and epoch of the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub session_id: String,
    pub epoch: u64,
    pub mode: ViewMode,
    pub html: String,
}

/// Something that renders view requests asynchronously and reports finished frames.
#[async_trait]
pub trait RenderTarget: Send + Sync {
    fn submit(&self, request: ViewRequest);

    /// Resolve once a frame for `session_id` with `epoch >= target` has been
    /// rendered. Frames of other sessions never satisfy the wait.
    async fn frame_at(&self, session_id: &str, target: u64) -> Result<Frame, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintOutcome {
    Printed,
    Cancelled,
}

/// External print/PDF engine.
#[async_trait]
pub trait PrintEngine: Send + Sync {
    async fn capture(&self, job: PrintJob) -> Result<PrintOutcome, DomainError>;
}

/// Exports the editor's read-only layout through a print engine.
pub struct PrintExporter<P> {
    engine: P,
    in_flight: InFlight,
}

impl<P: PrintEngine> PrintExporter<P> {
    pub fn new(engine: P) -> Self {
        Self {
            engine,
            in_flight: InFlight::new(),
        }
    }

    /// Force Preview, wait for the surface to finish that frame, then capture it.
    ///
    /// The engine only ever sees a Preview frame. The session ends in Preview
    /// whatever the engine reports.
    #[instrument(level = "debug", skip_all, fields(note_id = editor.note_id()))]
    pub async fn export<T>(
        &self,
        editor: &mut EditorSession,
        surface: &T,
    ) -> Result<PrintOutcome, DomainError>
    where
        T: RenderTarget + ?Sized,
    {
        let key = format!("print:{}", editor.note_id().unwrap_or("draft"));
        let _guard = self.in_flight.begin(key)?;

        let target = editor.force_preview();
        surface.submit(editor.view_request());
        let frame = surface.frame_at(editor.session_id(), target).await?;
        debug!(epoch = frame.epoch, target, "Preview frame ready");
        if frame.mode != ViewMode::Preview {
            return Err(DomainError::InvalidState(format!(
                "expected a preview frame, surface rendered {}",
                frame.mode
            )));
        }

        let topic = editor.content().metadata.topic.trim();
        let title = if topic.is_empty() {
            DEFAULT_PRINT_TITLE.to_string()
        } else {
            topic.to_string()
        };

        editor.begin_print();
        let outcome = self
            .engine
            .capture(PrintJob {
                title,
                html: frame.html,
            })
            .await;
        editor.end_print();

        match &outcome {
            Ok(result) => info!(?result, "Print capture finished"),
            Err(e) => warn!(error = %e, "Print capture failed"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MetadataField;
    use crate::ports::{HtmlPresenter, RenderSurface};
    use crate::util::testing::{sample_note, RecordingPrinter};

    #[tokio::test]
    async fn given_empty_note_in_edit_when_exporting_then_captures_preview_without_inputs() {
        // Arrange
        let surface = RenderSurface::spawn(HtmlPresenter::new());
        let exporter = PrintExporter::new(RecordingPrinter::answering(PrintOutcome::Printed));
        let mut editor = EditorSession::new("2026-10-17");

        // Act
        let outcome = exporter.export(&mut editor, &surface).await.unwrap();

        // Assert
        assert_eq!(outcome, PrintOutcome::Printed);
        assert_eq!(editor.mode(), ViewMode::Preview);
        let jobs = exporter.engine.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Cornell Note");
        assert!(!jobs[0].html.contains("<textarea"));
        assert!(!jobs[0].html.contains("<input"));
        assert!(!jobs[0].html.contains("<button"));
    }

    #[tokio::test]
    async fn given_edit_frame_rendered_when_exporting_then_waits_for_preview_frame() {
        let surface = RenderSurface::spawn(HtmlPresenter::new());
        let exporter = PrintExporter::new(RecordingPrinter::answering(PrintOutcome::Printed));
        let mut editor = EditorSession::from_note(&sample_note("n1", "alice", 3));
        surface.submit(editor.view_request());
        surface
            .frame_at(editor.session_id(), editor.epoch())
            .await
            .unwrap();

        exporter.export(&mut editor, &surface).await.unwrap();

        let jobs = exporter.engine.jobs();
        assert_eq!(jobs[0].title, "Linear Algebra");
        assert!(jobs[0].html.contains("Question 3?"));
        assert!(!jobs[0].html.contains("<textarea"));
    }

    #[tokio::test]
    async fn given_surface_reused_for_second_editor_when_exporting_then_prints_second_note() {
        // Arrange
        let surface = RenderSurface::spawn(HtmlPresenter::new());
        let exporter = PrintExporter::new(RecordingPrinter::answering(PrintOutcome::Printed));
        let mut first = EditorSession::from_note(&sample_note("n1", "alice", 1));
        let mut second = EditorSession::new("2026-10-17");
        second
            .update_metadata(MetadataField::Topic, "Thermodynamics")
            .unwrap();

        // Act
        exporter.export(&mut first, &surface).await.unwrap();
        exporter.export(&mut second, &surface).await.unwrap();

        // Assert
        let jobs = exporter.engine.jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].title, "Thermodynamics");
        assert!(jobs[1].html.contains("Thermodynamics"));
        assert!(!jobs[1].html.contains("Linear Algebra"));
        assert_eq!(surface.latest().unwrap().session_id, second.session_id());
    }

    #[tokio::test]
    async fn given_cancelled_or_failed_capture_when_exporting_then_stays_in_preview() {
        let surface = RenderSurface::spawn(HtmlPresenter::new());
        let cancelling = PrintExporter::new(RecordingPrinter::answering(PrintOutcome::Cancelled));
        let failing = PrintExporter::new(RecordingPrinter::failing());
        let mut editor = EditorSession::new("today");

        let cancelled = cancelling.export(&mut editor, &surface).await;
        assert_eq!(cancelled.unwrap(), PrintOutcome::Cancelled);
        assert_eq!(editor.mode(), ViewMode::Preview);

        let failed = failing.export(&mut editor, &surface).await;
        assert!(matches!(failed, Err(DomainError::Backend(_))));
        assert_eq!(editor.mode(), ViewMode::Preview);
        assert!(matches!(
            editor.update_metadata(MetadataField::Topic, "x"),
            Err(DomainError::ReadOnly(ViewMode::Preview))
        ));
    }
}
