// src/util/text.rs
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").expect("Failed to compile whitespace regex");
    static ref BULLET_REGEX: Regex = Regex::new(r"^[-*•]\s*").expect("Failed to compile bullet regex");
}

/// One-line excerpt of free text for terminal listings.
///
/// This function:
/// 1. Takes the first non-empty line
/// 2. Drops a leading list bullet
/// 3. Collapses runs of whitespace
/// 4. Cuts at `max_chars` characters, marking the cut with `…`
///
/// # Examples
///
/// ```
/// use snapnote::util::text::excerpt;
///
/// let summary = "\n- Eigenvalues   scale eigenvectors\n- Second point";
/// assert_eq!(excerpt(summary, 40), "Eigenvalues scale eigenvectors");
/// assert_eq!(excerpt(summary, 11), "Eigenvalue…");
/// ```
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let line = BULLET_REGEX.replace(line, "");
    let line = WHITESPACE_REGEX.replace_all(&line, " ").into_owned();

    if line.chars().count() <= max_chars {
        return line;
    }
    let mut cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
