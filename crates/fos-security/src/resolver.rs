//! URL Resolution
//!
//! Resolves guest-supplied URLs against the current document location, the
//! same way an anchor `href` is resolved.

use std::sync::{Arc, RwLock};
use url::Url;

use crate::SecurityError;

/// Resolve `raw` against `base`.
///
/// Absolute URLs come back unchanged. Relative URLs are joined onto `base`.
/// Input that cannot be resolved (no base, or a base that cannot hold
/// relative references) is passed through untouched.
pub fn resolve(raw: &str, base: Option<&Url>) -> String {
    if is_absolute(raw) && !is_same_scheme_relative(raw, base) {
        return raw.to_string();
    }

    match base.map(|base| base.join(raw)) {
        Some(Ok(url)) => url.into(),
        Some(Err(err)) => {
            tracing::debug!("Cannot resolve {:?} against base: {}", raw, err);
            raw.to_string()
        }
        None => raw.to_string(),
    }
}

/// Whether `raw` parses as a URL on its own
pub fn is_absolute(raw: &str) -> bool {
    Url::parse(raw).is_ok()
}

/// Schemes whose URLs always carry a host-style hierarchy
const SPECIAL_SCHEMES: [&str; 6] = ["http", "https", "ws", "wss", "ftp", "file"];

/// `https:foo` against an `https:` base is relative to the base, as an anchor
/// `href` would treat it. With `//` it names a new authority instead.
fn is_same_scheme_relative(raw: &str, base: Option<&Url>) -> bool {
    let (Some(base), Some((scheme, rest))) = (base, raw.split_once(':')) else {
        return false;
    };
    let names_authority = rest.len() >= 2 && rest.chars().take(2).all(|c| matches!(c, '/' | '\\'));
    scheme.eq_ignore_ascii_case(base.scheme())
        && SPECIAL_SCHEMES.contains(&base.scheme())
        && !names_authority
}

/// Current document location.
///
/// Cloning shares the same location; the host moves it with [`navigate`]
/// and every reader sees the change on its next call.
///
/// [`navigate`]: DocumentContext::navigate
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    location: Arc<RwLock<Option<Url>>>,
}

impl DocumentContext {
    /// Context without a location (relative URLs pass through unresolved)
    pub fn new() -> Self {
        Self::default()
    }

    /// Context positioned at `href`
    pub fn at(href: &str) -> Result<Self, SecurityError> {
        let context = Self::new();
        context.navigate(href)?;
        Ok(context)
    }

    /// Move the document to a new location
    pub fn navigate(&self, href: &str) -> Result<(), SecurityError> {
        let url = Url::parse(href)
            .map_err(|e| SecurityError::InvalidDocumentUrl(format!("{}: {}", href, e)))?;
        *self.location.write().unwrap_or_else(|e| e.into_inner()) = Some(url);
        Ok(())
    }

    /// Forget the current location
    pub fn clear(&self) {
        *self.location.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Snapshot of the current location
    pub fn location(&self) -> Option<Url> {
        self.location.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Current location as a string
    pub fn href(&self) -> Option<String> {
        self.location().map(String::from)
    }

    /// Resolve `raw` against the location as it is right now
    pub fn resolve(&self, raw: &str) -> String {
        resolve(raw, self.location().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_relative_is_joined() {
        assert_eq!(resolve("special.html", Some(&base())), "https://example.com/special.html");
        assert_eq!(resolve("/a/b?c=d", Some(&base())), "https://example.com/a/b?c=d");
    }

    #[test]
    fn test_relative_against_nested_base() {
        let base = Url::parse("https://example.com/games/index.html").unwrap();
        assert_eq!(resolve("level.json", Some(&base)), "https://example.com/games/level.json");
        assert_eq!(resolve("../up.png", Some(&base)), "https://example.com/up.png");
        assert_eq!(resolve("//cdn.example.org/x.js", Some(&base)), "https://cdn.example.org/x.js");
    }

    #[test]
    fn test_absolute_unchanged() {
        for url in [
            "https://example.com/",
            "http://example.com",
            "file:///etc/hosts",
            "data:text/html,test",
            "blob:https://example.com/8c071bf8-c0b6-4a48-81d7-6413c2adf3dd",
            "javascript:alert(1)",
        ] {
            assert_eq!(resolve(url, Some(&base())), url);
        }
    }

    #[test]
    fn test_same_scheme_reference_is_relative() {
        let base = Url::parse("https://example.com/dir/page.html").unwrap();
        assert_eq!(resolve("https:foo", Some(&base)), "https://example.com/dir/foo");
        assert_eq!(resolve("HTTPS:/top", Some(&base)), "https://example.com/top");
        assert_eq!(resolve("https://other.example/x", Some(&base)), "https://other.example/x");
        assert_eq!(resolve("http:foo", Some(&base)), "http:foo");
        assert_eq!(resolve("https:foo", None), "https:foo");

        let opaque = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(resolve("mailto:foo", Some(&opaque)), "mailto:foo");
    }

    #[test]
    fn test_idempotent() {
        let once = resolve("page.html", Some(&base()));
        let twice = resolve(&once, Some(&base()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_base_passes_through() {
        assert_eq!(resolve("index.html", None), "index.html");
    }

    #[test]
    fn test_opaque_base_passes_through() {
        let base = Url::parse("data:text/html,hello").unwrap();
        assert_eq!(resolve("index.html", Some(&base)), "index.html");
    }

    #[test]
    fn test_context_follows_navigation() {
        let context = DocumentContext::at("https://example.com/").unwrap();
        assert_eq!(context.resolve("a.html"), "https://example.com/a.html");

        let shared = context.clone();
        shared.navigate("https://other.example/dir/").unwrap();
        assert_eq!(context.resolve("a.html"), "https://other.example/dir/a.html");

        context.clear();
        assert_eq!(shared.resolve("a.html"), "a.html");
    }

    #[test]
    fn test_invalid_location_rejected() {
        let context = DocumentContext::new();
        assert!(matches!(
            context.navigate("not a url"),
            Err(SecurityError::InvalidDocumentUrl(_))
        ));
        assert!(context.location().is_none());
    }
}
