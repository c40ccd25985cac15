//! Shared User-Agent string for image and metadata HTTP clients.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/poketo/poketo-cli";

/// Default User-Agent for every request (identifies the tool and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("poketo/{version} (+{PROJECT_UA_URL})")
}
