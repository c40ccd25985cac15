//! Built-in table of supported sites, used to classify input and to expand
//! short identifiers into canonical URLs.

use regex::Regex;
use tracing::trace;
use url::Url;

use super::identifier::ID_SEPARATOR;
use super::{InputKind, MetadataError};

/// Compiles a regex literal that is part of the binary.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercases.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

/// One supported site.
#[derive(Debug, Clone)]
pub struct Site {
    id: &'static str,
    hosts: &'static [&'static str],
    series_template: &'static str,
    chapter_template: &'static str,
    series_path: Regex,
    chapter_path: Regex,
}

impl Site {
    /// Creates a site definition.
    ///
    /// Templates use `{series}` and `{chapter}` placeholders. The path
    /// patterns are matched against the URL path only.
    ///
    /// # Panics
    ///
    /// Panics if either path pattern is not a valid regex.
    #[must_use]
    pub fn new(
        id: &'static str,
        hosts: &'static [&'static str],
        series_template: &'static str,
        chapter_template: &'static str,
        series_path: &str,
        chapter_path: &str,
    ) -> Self {
        Self {
            id,
            hosts,
            series_template,
            chapter_template,
            series_path: compile_static_regex(series_path),
            chapter_path: compile_static_regex(chapter_path),
        }
    }

    /// Identifier prefix, e.g. `mangadex`.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    fn serves_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| *h == host)
    }

    fn classify_path(&self, path: &str) -> Option<InputKind> {
        if self.chapter_path.is_match(path) {
            Some(InputKind::Chapter)
        } else if self.series_path.is_match(path) {
            Some(InputKind::Series)
        } else {
            None
        }
    }

    fn series_url(&self, series: &str) -> String {
        self.series_template.replace("{series}", series)
    }

    fn chapter_url(&self, series: &str, chapter: &str) -> String {
        self.chapter_template
            .replace("{series}", series)
            .replace("{chapter}", chapter)
    }
}

/// Registry of supported sites.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: Vec<Site>,
}

impl SiteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every site the tool knows about.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Site::new(
            "mangadex",
            &["mangadex.org"],
            "https://mangadex.org/title/{series}",
            "https://mangadex.org/chapter/{chapter}",
            r"^/(?:title|manga)/([^/]+)(?:/[^/]*)?/?$",
            r"^/chapter/([^/]+)(?:/\d+)?/?$",
        ));
        registry.register(Site::new(
            "merakiscans",
            &["merakiscans.com"],
            "http://merakiscans.com/{series}/",
            "http://merakiscans.com/{series}/{chapter}/",
            r"^/([^/]+)/?$",
            r"^/([^/]+)/([^/]+)/?$",
        ));
        registry.register(Site::new(
            "jaiminis-box",
            &["jaiminisbox.com"],
            "https://jaiminisbox.com/reader/series/{series}/",
            "https://jaiminisbox.com/reader/read/{series}/en/{chapter}/",
            r"^/reader/series/([^/]+)/?$",
            r"^/reader/read/([^/]+)/en/(.+?)/?$",
        ));
        registry
    }

    /// Adds a site. Later registrations never shadow earlier ones.
    pub fn register(&mut self, site: Site) {
        self.sites.push(site);
    }

    /// Number of registered sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    fn by_id(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }

    fn by_host(&self, host: &str) -> Option<&Site> {
        let host = canonical_host(host);
        self.sites.iter().find(|site| site.serves_host(&host))
    }

    /// Classifies a URL or short identifier as a series or a chapter.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::UnsupportedSite`] when the host or identifier prefix
    ///   is not registered.
    /// - [`MetadataError::InvalidUrl`] when the input does not parse, or the
    ///   path matches neither the series nor the chapter pattern.
    pub fn get_type(&self, input: &str) -> Result<InputKind, MetadataError> {
        let input = input.trim();
        if is_url(input) {
            let url = Url::parse(input).map_err(|_| MetadataError::invalid_url(input))?;
            let host = url
                .host_str()
                .ok_or_else(|| MetadataError::invalid_url(input))?;
            let site = self
                .by_host(host)
                .ok_or_else(|| MetadataError::unsupported_site(input))?;
            let kind = site
                .classify_path(url.path())
                .ok_or_else(|| MetadataError::invalid_url(input))?;
            trace!(site = site.id, %kind, "classified URL");
            return Ok(kind);
        }

        let segments = split_identifier(input)?;
        if self.by_id(segments[0]).is_none() {
            return Err(MetadataError::unsupported_site(input));
        }
        Ok(if segments.len() == 2 {
            InputKind::Series
        } else {
            InputKind::Chapter
        })
    }

    /// Expands `site:series` or `site:series:chapter` into the site's URL.
    ///
    /// # Errors
    ///
    /// Same conditions as [`get_type`](Self::get_type) for identifiers.
    pub fn construct_url(&self, short_id: &str) -> Result<String, MetadataError> {
        let short_id = short_id.trim();
        let segments = split_identifier(short_id)?;
        let site = self
            .by_id(segments[0])
            .ok_or_else(|| MetadataError::unsupported_site(short_id))?;
        let separator = ID_SEPARATOR.to_string();
        Ok(match segments.as_slice() {
            [_, series] => site.series_url(series),
            [_, series, chapter @ ..] => site.chapter_url(series, &chapter.join(&separator)),
            _ => return Err(MetadataError::invalid_url(short_id)),
        })
    }
}

/// True when the input should be treated as a URL rather than an identifier.
#[must_use]
pub fn is_url(input: &str) -> bool {
    input.trim_start().starts_with("http")
}

fn split_identifier(input: &str) -> Result<Vec<&str>, MetadataError> {
    let segments: Vec<&str> = input.split(ID_SEPARATOR).collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty() || s.contains('/')) {
        return Err(MetadataError::invalid_url(input));
    }
    Ok(segments)
}
