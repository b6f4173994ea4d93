// src/constants.rs
//
// Application-wide constants shared by the domain, application and presentation layers.

/// Rows shown to viewers who neither own nor purchased a listing.
///
/// Used in: `domain/entitlement.rs`
pub const PREVIEW_ROW_LIMIT: usize = 2;

/// Appended to the topic of a purchaser's private copy of a listing.
///
/// Used in: `domain/note.rs`
pub const DERIVATIVE_TOPIC_SUFFIX: &str = " (Copy)";

/// Topic stored for notes whose metadata topic is blank.
pub const DEFAULT_TOPIC: &str = "Untitled";

/// Marketplace card text when a listing has neither objective nor summary.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Print job title when the note has no topic.
///
/// Used in: `application/print.rs`
pub const DEFAULT_PRINT_TITLE: &str = "Cornell Note";

/// Delay in milliseconds after writing the print document before opening the browser.
///
/// The browser needs a brief moment for the file to be fully written before
/// it opens; otherwise it may show an empty page.
///
/// Used in: `infrastructure/printer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 500;

/// MathJax bundle referenced by every rendered document.
pub const MATHJAX_CDN: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mathjax/3.2.2/es5/tex-mml-chtml.js";
