//! Canonicalization of user-typed reference URLs.

use std::sync::OnceLock;

use regex::Regex;

/// `[scheme://][www.]host.with.dot[/path]`
static URL_PATTERN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:((?i:https?))://)?((?i:www)\.)?([^/\s]+\.[^/\s]+)(/.*)?$")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Turn a raw user-typed URL into `scheme://www.host/path`.
///
/// Returns an empty string when the input has no host containing a dot.
/// A missing scheme defaults to `https`, `www.` is prepended unless it is
/// already there in any case, and the path is kept verbatim. Normalizing an already
/// normalized URL returns it unchanged.
///
/// ```
/// use linkchat_core::normalize;
///
/// assert_eq!(normalize("example.com"), "https://www.example.com");
/// assert_eq!(normalize("not-a-host"), "");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let Some(caps) = url_pattern().captures(raw.trim()) else {
        return String::new();
    };
    let Some(host) = caps.get(3) else {
        return String::new();
    };

    let scheme = caps.get(1).map_or("https", |m| m.as_str());
    let www = caps.get(2).map_or("www.", |m| m.as_str());
    let path = caps.get(4).map_or("", |m| m.as_str());

    format!("{scheme}://{www}{}{path}", host.as_str())
}

/// Whether `raw` normalizes to a usable reference.
#[must_use]
pub fn is_valid(raw: &str) -> bool {
    !normalize(raw).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_urls() {
        assert_eq!(normalize("invalid-url"), "");
        assert_eq!(normalize("not-a-host"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("ftp://example.com"), "");
        assert!(!is_valid("localhost/path"));
    }

    #[test]
    fn completes_missing_scheme() {
        assert_eq!(normalize("www.example.com"), "https://www.example.com");
    }

    #[test]
    fn completes_missing_subdomain() {
        assert_eq!(normalize("example.com"), "https://www.example.com");
    }

    #[test]
    fn keeps_given_scheme_and_path() {
        assert_eq!(
            normalize("http://example.com/path"),
            "http://www.example.com/path"
        );
        assert_eq!(
            normalize("https://example.com/a/b?q=1#frag"),
            "https://www.example.com/a/b?q=1#frag"
        );
        assert_eq!(normalize("HTTP://example.com"), "HTTP://www.example.com");
    }

    #[test]
    fn does_not_invent_trailing_slash() {
        assert_eq!(normalize("example.com/"), "https://www.example.com/");
        assert_eq!(normalize("example.com"), "https://www.example.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  example.com\n"), "https://www.example.com");
    }

    #[test]
    fn other_subdomains_still_get_www() {
        assert_eq!(normalize("docs.rs"), "https://www.docs.rs");
        assert_eq!(normalize("blog.example.com"), "https://www.blog.example.com");
    }

    #[test]
    fn exactly_one_www_before_host() {
        for raw in ["example.com", "www.example.com", "https://www.example.com/x"] {
            let normalized = normalize(raw);
            assert!(normalized.starts_with("https://"));
            assert_eq!(normalized.matches("www.").count(), 1, "{normalized}");
        }

        for raw in ["WWW.example.com", "https://Www.example.com/x"] {
            let normalized = normalize(raw);
            assert_eq!(
                normalized.to_ascii_lowercase().matches("www.").count(),
                1,
                "{normalized}"
            );
            assert_eq!(normalize(&normalized), normalized);
        }
        assert_eq!(normalize("WWW.example.com"), "https://WWW.example.com");
    }

    #[test]
    fn is_idempotent() {
        for raw in [
            "example.com",
            "www.example.com",
            "http://example.com/path",
            "https://www.example.com/a/b",
            "sub.example.co.uk/x y",
            "example.com:8080/api",
        ] {
            let once = normalize(raw);
            assert!(!once.is_empty(), "{raw}");
            assert_eq!(normalize(&once), once, "{raw}");
        }
    }
}
