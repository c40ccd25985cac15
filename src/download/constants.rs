//! Constants for the download module (timeouts, concurrency).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Page downloads allowed in flight at once within a chapter.
pub const PAGE_CONCURRENCY: usize = 3;

/// Minimum allowed page concurrency.
pub(crate) const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed page concurrency.
pub(crate) const MAX_CONCURRENCY: usize = 100;

/// JPEG quality used when converting unsupported formats.
pub const JPEG_QUALITY: u8 = 90;
