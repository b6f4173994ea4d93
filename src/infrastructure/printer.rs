// src/infrastructure/printer.rs
use crate::application::{PrintEngine, PrintJob, PrintOutcome};
use crate::constants::BROWSER_LAUNCH_DELAY_MS;
use crate::domain::DomainError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{Builder, TempDir};
use tokio::process::Command;
use tracing::{debug, info, instrument};

const PRINT_ON_LOAD: &str =
    "<script>window.addEventListener('load', () => setTimeout(() => window.print(), 800));</script>";

/// Writes HTML documents to a temp directory and opens them in the system browser.
#[derive(Debug, Default)]
pub struct DocumentViewer {
    // Keep last temp dir alive to prevent deletion
    temp_dir: Mutex<Option<TempDir>>,
}

impl DocumentViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_temp_file(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let temp_dir = Builder::new()
            .prefix("snapnote-")
            .rand_bytes(5)
            .tempdir()
            .context("Failed to create temporary directory")?;

        let file_path = temp_dir.path().join(file_name);
        std::fs::write(&file_path, content)
            .with_context(|| format!("Failed to write temp file at {}", file_path.display()))?;

        // Store temp_dir to keep it alive
        *self.temp_dir.lock().unwrap_or_else(|e| e.into_inner()) = Some(temp_dir);

        Ok(file_path)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn open_in_browser(&self, path: &Path) -> Result<()> {
        let path_str = path.to_str().context("Failed to convert path to string")?;

        #[cfg(target_os = "macos")]
        let mut command = {
            let mut c = Command::new("open");
            c.arg(path_str);
            c
        };
        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", path_str]);
            c
        };
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let mut command = {
            let mut c = Command::new("xdg-open");
            c.arg(path_str);
            c
        };

        command.spawn().context("Failed to open browser")?;

        // Keep the temp directory alive while the browser loads the file
        tokio::time::sleep(std::time::Duration::from_millis(BROWSER_LAUNCH_DELAY_MS)).await;

        Ok(())
    }

    /// Write `html` to a temp file and open it.
    pub async fn show(&self, file_name: &str, html: &str) -> Result<PathBuf> {
        let path = self.create_temp_file(file_name, html)?;
        self.open_in_browser(&path).await?;
        Ok(path)
    }
}

/// Print engine that hands the document to the browser's print dialog.
///
/// The browser does not report whether the dialog was confirmed, so a
/// successful hand-off counts as `Printed`. With `open_browser` off the
/// document is only written and its path logged.
#[derive(Debug, Default)]
pub struct BrowserPrinter {
    viewer: DocumentViewer,
    open_browser: bool,
    last_document: Mutex<Option<PathBuf>>,
}

impl BrowserPrinter {
    pub fn new(open_browser: bool) -> Self {
        Self {
            viewer: DocumentViewer::new(),
            open_browser,
            last_document: Mutex::new(None),
        }
    }

    /// Path of the most recently written print document.
    pub fn last_document(&self) -> Option<PathBuf> {
        self.last_document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn with_print_trigger(html: &str) -> String {
    match html.rfind("</body>") {
        Some(index) => format!("{}{}{}", &html[..index], PRINT_ON_LOAD, &html[index..]),
        None => format!("{html}{PRINT_ON_LOAD}"),
    }
}

#[async_trait]
impl PrintEngine for BrowserPrinter {
    #[instrument(level = "debug", skip(self, job), fields(title = %job.title))]
    async fn capture(&self, job: PrintJob) -> Result<PrintOutcome, DomainError> {
        let document = with_print_trigger(&job.html);
        let path = self
            .viewer
            .create_temp_file("print.html", &document)
            .map_err(|e| DomainError::Backend(format!("{e:#}")))?;
        *self.last_document.lock().unwrap_or_else(|e| e.into_inner()) = Some(path.clone());

        if self.open_browser {
            self.viewer
                .open_in_browser(&path)
                .await
                .map_err(|e| DomainError::Backend(format!("{e:#}")))?;
        } else {
            debug!("Browser launch disabled");
        }
        info!(path = %path.display(), "Print document ready");
        Ok(PrintOutcome::Printed)
    }
}
