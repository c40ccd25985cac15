//! Helpers for `site:series[:chapter]` compound identifiers.

use super::MetadataError;

/// Separator between identifier segments.
pub const ID_SEPARATOR: char = ':';

/// Derives the series identifier from a chapter identifier.
///
/// The series identifier is the first two colon-delimited segments, so
/// `mangadex:senryu-girl:5` becomes `mangadex:senryu-girl`.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidIdentifier`] when fewer than two
/// non-empty leading segments are present.
pub fn series_id_from_chapter_id(chapter_id: &str) -> Result<String, MetadataError> {
    let mut segments = chapter_id.split(ID_SEPARATOR);
    match (segments.next(), segments.next()) {
        (Some(site), Some(series)) if !site.is_empty() && !series.is_empty() => {
            Ok(format!("{site}{ID_SEPARATOR}{series}"))
        }
        _ => Err(MetadataError::invalid_identifier(chapter_id)),
    }
}
