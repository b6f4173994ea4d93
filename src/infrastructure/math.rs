// src/infrastructure/math.rs
use html_escape::encode_text;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{instrument, warn};

lazy_static! {
    // Block spans win over inline spans starting at the same `$`.
    // Inline content is non-empty and never contains `$`.
    static ref MATH_SPAN_REGEX: Regex =
        Regex::new(r"(?s)\$\$(.*?)\$\$|\$([^$]+)\$").expect("Failed to compile math span regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Text,
    BlockMath,
    InlineMath,
}

/// One unit of renderer output.
///
/// For math segments `raw` is the expression between the delimiters; for text
/// it is the verbatim text, whitespace and newlines included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub raw: String,
    pub rendered: Option<String>,
}

impl Segment {
    fn new(kind: SegmentKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
            rendered: None,
        }
    }

    /// The segment as it appeared in the source, delimiters included.
    pub fn source(&self) -> String {
        match self.kind {
            SegmentKind::Text => self.raw.clone(),
            SegmentKind::BlockMath => format!("$${}$$", self.raw),
            SegmentKind::InlineMath => format!("${}$", self.raw),
        }
    }

    pub fn is_math(&self) -> bool {
        self.kind != SegmentKind::Text
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MathError {
    #[error("empty math expression")]
    Empty,
    #[error("unbalanced braces in '{0}'")]
    UnbalancedBraces(String),
}

/// Turns a TeX expression into HTML.
pub trait MathBackend {
    fn render(&self, tex: &str, display: bool) -> Result<String, MathError>;
}

/// Emits MathJax delimiters (`\(..\)` inline, `\[..\]` display) for client-side typesetting.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathJaxBackend;

impl MathBackend for MathJaxBackend {
    fn render(&self, tex: &str, display: bool) -> Result<String, MathError> {
        if tex.trim().is_empty() {
            return Err(MathError::Empty);
        }
        check_braces(tex)?;

        let escaped = encode_text(tex);
        Ok(if display {
            format!(r#"<span class="math display">\[{}\]</span>"#, escaped)
        } else {
            format!(r#"<span class="math inline">\({}\)</span>"#, escaped)
        })
    }
}

fn check_braces(tex: &str) -> Result<(), MathError> {
    let mut depth: i64 = 0;
    let mut chars = tex.chars();
    while let Some(ch) = chars.next() {
        match ch {
            // \{ and \} are literal braces
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(MathError::UnbalancedBraces(tex.to_string()));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(MathError::UnbalancedBraces(tex.to_string()));
    }
    Ok(())
}

/// Split text into text and math segments without rendering.
///
/// Scans left to right for non-overlapping `$$..$$` and `$..$` spans. An
/// unmatched `$` stays literal text. Text without any span comes back as a
/// single text segment equal to the input.
pub fn split_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in MATH_SPAN_REGEX.captures_iter(text) {
        let (kind, body) = match (caps.get(1), caps.get(2)) {
            (Some(block), _) => (SegmentKind::BlockMath, block),
            (None, Some(inline)) => (SegmentKind::InlineMath, inline),
            (None, None) => continue,
        };
        // delimiters are one or two `$` on each side of the body
        let width = if kind == SegmentKind::BlockMath { 2 } else { 1 };
        let (start, end) = (body.start() - width, body.end() + width);
        if start > last {
            segments.push(Segment::new(SegmentKind::Text, &text[last..start]));
        }
        segments.push(Segment::new(kind, body.as_str()));
        last = end;
    }

    if last < text.len() || segments.is_empty() {
        segments.push(Segment::new(SegmentKind::Text, &text[last..]));
    }
    segments
}

/// Math-aware renderer for note fields.
#[derive(Debug, Default, Clone)]
pub struct MathRenderer<B = MathJaxBackend> {
    backend: B,
}

impl MathRenderer<MathJaxBackend> {
    pub fn new() -> Self {
        Self {
            backend: MathJaxBackend,
        }
    }
}

impl<B: MathBackend> MathRenderer<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Segment the text and render each math span.
    ///
    /// A span the backend rejects keeps `rendered = None`; callers display its
    /// delimited source instead.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let mut segments = split_segments(text);
        for segment in segments.iter_mut().filter(|s| s.is_math()) {
            let display = segment.kind == SegmentKind::BlockMath;
            match self.backend.render(&segment.raw, display) {
                Ok(html) => segment.rendered = Some(html),
                Err(e) => warn!(error = %e, source = %segment.source(), "Math render failed, showing source"),
            }
        }
        segments
    }

    /// Render a field to HTML. Empty text shows only the placeholder, if any.
    #[instrument(level = "trace", skip(self))]
    pub fn render_html(&self, text: &str, placeholder: Option<&str>) -> String {
        if text.is_empty() {
            return match placeholder {
                Some(p) if !p.is_empty() => {
                    format!(r#"<span class="placeholder">{}</span>"#, encode_text(p))
                }
                _ => String::new(),
            };
        }

        self.segments(text)
            .iter()
            .map(|segment| match (&segment.kind, &segment.rendered) {
                (SegmentKind::Text, _) => {
                    format!(r#"<span class="text">{}</span>"#, encode_text(&segment.raw))
                }
                (_, Some(html)) => html.clone(),
                (_, None) => format!(
                    r#"<span class="math-fallback">{}</span>"#,
                    encode_text(&segment.source())
                ),
            })
            .collect()
    }
}
