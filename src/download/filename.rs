//! Directory and file naming for downloaded series and chapters.

use std::path::Path;

use crate::metadata::ChapterNumber;

/// Name used when sanitization leaves nothing behind.
pub const FALLBACK_NAME: &str = "untitled";

/// Longest allowed name, in bytes.
const MAX_NAME_BYTES: usize = 255;

const WINDOWS_RESERVED: [&str; 4] = ["con", "prn", "aux", "nul"];

/// Makes `name` safe to use as a single path segment.
///
/// Removes `/ ? < > \ : * | "` and control characters, drops names made
/// only of dots, Windows device names (`CON`, `com1.txt`, ...) and trailing
/// dots or spaces, then truncates to 255 bytes on a character boundary.
/// Falls back to [`FALLBACK_NAME`] when nothing is left.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '?' | '<' | '>' | '\\' | ':' | '*' | '|' | '"'))
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().all(|c| c == '.') || is_windows_reserved(&cleaned) {
        cleaned.clear();
    }

    truncate_to_boundary(&mut cleaned, MAX_NAME_BYTES);
    let trimmed_len = cleaned.trim_end_matches(['.', ' ']).len();
    cleaned.truncate(trimmed_len);

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

fn is_windows_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).to_ascii_lowercase();
    if WINDOWS_RESERVED.contains(&stem.as_str()) {
        return true;
    }
    ["com", "lpt"].iter().any(|prefix| {
        stem.len() == 4
            && stem.starts_with(prefix)
            && stem.chars().nth(3).is_some_and(|c| c.is_ascii_digit())
    })
}

fn truncate_to_boundary(value: &mut String, max_bytes: usize) {
    if value.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
}

/// Directory name for a series, derived from its title.
#[must_use]
pub fn series_directory_name(title: &str) -> String {
    sanitize_file_name(title)
}

/// Directory name for a chapter: `volume-{v}-chapter-{c}` or `chapter-{c}`.
///
/// A missing or zero volume is left out. Numbers keep the text they were
/// listed with, so `1.10` and `1.1` get separate directories.
#[must_use]
pub fn chapter_directory_name(
    chapter_number: &ChapterNumber,
    volume_number: Option<&ChapterNumber>,
) -> String {
    let name = match volume_number.filter(|v| !v.is_zero()) {
        Some(volume) => format!("volume-{volume}-chapter-{chapter_number}"),
        None => format!("chapter-{chapter_number}"),
    };
    sanitize_file_name(&name)
}

/// File stem for the page at zero-based `index` (pages are numbered from 1).
#[must_use]
pub fn page_file_stem(dir: &Path, index: usize) -> std::path::PathBuf {
    dir.join((index + 1).to_string())
}
