//! Series and chapter records returned by a [`MetadataSource`](super::MetadataSource).
//!
//! Field names follow the camelCase JSON used by the metadata service, so a
//! [`Series`] can be written back out verbatim as `metadata.json`. Fields the
//! model does not name are carried in `extra` and survive that round trip.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A manga title with its ordered chapter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Series identifier (`site:series`).
    pub id: String,
    /// Display title; also used for the series directory name.
    pub title: String,
    /// Cover image location, when the site exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Canonical series URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Chapters in the order the site declares them.
    #[serde(default)]
    pub chapters: Vec<ChapterSummary>,
    /// Remaining service fields (`site`, `slug`, `updatedAt`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Series {
    /// Looks up a chapter summary by its full identifier.
    #[must_use]
    pub fn find_chapter(&self, chapter_id: &str) -> Option<&ChapterSummary> {
        self.chapters.iter().find(|chapter| chapter.id == chapter_id)
    }
}

/// Chapter entry as listed on a series. Authoritative for numbering and titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    /// Chapter identifier (`site:series:chapter`).
    pub id: String,
    pub chapter_number: ChapterNumber,
    #[serde(
        default,
        deserialize_with = "optional_chapter_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub volume_number: Option<ChapterNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Remaining service fields (`createdAt`, `slug`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chapter with its page list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    #[serde(default)]
    pub chapter_number: ChapterNumber,
    #[serde(
        default,
        deserialize_with = "optional_chapter_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub volume_number: Option<ChapterNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Pages in reading order; index + 1 is the on-disk page number.
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Chapter {
    /// Combines a page listing with the chapter's series entry.
    ///
    /// Numbering and title come from `summary` whenever it has them; the
    /// page list always comes from `self`.
    #[must_use]
    pub fn merged_with(mut self, summary: &ChapterSummary) -> Self {
        self.chapter_number.clone_from(&summary.chapter_number);
        if summary.volume_number.is_some() {
            self.volume_number.clone_from(&summary.volume_number);
        }
        if summary.title.is_some() {
            self.title.clone_from(&summary.title);
        }
        self
    }

    /// Human readable heading, e.g. `Chapter 5: The Return`.
    #[must_use]
    pub fn display_title(&self) -> String {
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("Chapter {}: {title}", self.chapter_number),
            None => format!("Chapter {}", self.chapter_number),
        }
    }
}

/// A single page image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
}

impl Page {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A chapter or volume number, kept exactly as the service sent it.
///
/// Sites send either JSON numbers or numeric strings. Strings keep their
/// text (`"1.10"` and `"05"` stay distinct from `1.1` and `5`), so directory
/// names and `metadata.json` match what was listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChapterNumber {
    Number(Number),
    Text(String),
}

impl ChapterNumber {
    /// Numeric value, when the text parses as one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_f64() == Some(0.0)
    }
}

impl Default for ChapterNumber {
    fn default() -> Self {
        Self::Number(Number::from(0))
    }
}

impl From<u32> for ChapterNumber {
    fn from(value: u32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for ChapterNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `1.0` prints as `1`
            Self::Number(n) if n.is_f64() => match n.as_f64() {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "{n}"),
            },
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text.trim()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(Number),
    Text(String),
}

impl<'de> Deserialize<'de> for ChapterNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawNumber::deserialize(deserializer)? {
            RawNumber::Number(n) => Ok(Self::Number(n)),
            RawNumber::Text(text) if text.trim().parse::<f64>().is_ok() => Ok(Self::Text(text)),
            RawNumber::Text(text) => Err(serde::de::Error::custom(format!(
                "expected a numeric value, got {text:?}"
            ))),
        }
    }
}

fn optional_chapter_number<'de, D>(deserializer: D) -> Result<Option<ChapterNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawNumber::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawNumber::Number(n)) => Ok(Some(ChapterNumber::Number(n))),
        Some(RawNumber::Text(text)) if text.trim().parse::<f64>().is_ok() => {
            Ok(Some(ChapterNumber::Text(text)))
        }
        Some(RawNumber::Text(text)) => Err(serde::de::Error::custom(format!(
            "expected a numeric value, got {text:?}"
        ))),
    }
}
