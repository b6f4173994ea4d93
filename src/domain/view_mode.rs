// src/domain/view_mode.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Edit,
    Preview,
    /// Transient: only held while the print engine captures a preview frame.
    Print,
}

impl ViewMode {
    /// Input controls are rendered (and mutations allowed) only in `Edit`.
    pub fn is_editable(&self) -> bool {
        matches!(self, ViewMode::Edit)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Edit => write!(f, "edit"),
            ViewMode::Preview => write!(f, "preview"),
            ViewMode::Print => write!(f, "print"),
        }
    }
}

/// Current mode plus a render epoch that advances on every mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    mode: ViewMode,
    epoch: u64,
}

impl ViewState {
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// User toggle between Edit and Preview. Ignored while printing.
    pub fn toggle(&mut self) -> ViewMode {
        match self.mode {
            ViewMode::Edit => self.set(ViewMode::Preview),
            ViewMode::Preview => self.set(ViewMode::Edit),
            ViewMode::Print => {}
        }
        self.mode
    }

    /// Enter Preview from any mode; returns the epoch a render must reach.
    pub fn force_preview(&mut self) -> u64 {
        if self.mode != ViewMode::Preview {
            self.set(ViewMode::Preview);
        }
        self.epoch
    }

    pub fn begin_print(&mut self) {
        self.mode = ViewMode::Print;
    }

    /// Print always settles back in Preview; there is no revert to Edit.
    pub fn end_print(&mut self) {
        self.mode = ViewMode::Preview;
    }

    /// Mark content changes so surfaces re-render without a mode change.
    pub fn touch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn set(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.epoch += 1;
    }
}
