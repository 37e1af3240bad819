//! URL to canonical domain normalization.
//!
//! [`normalize_domain`] never fails: anything it cannot make sense of becomes
//! the empty string, which every caller treats as "cannot evaluate, allow".

use tracing::{debug, warn};
use url::Url;

/// Browser-internal prefixes. These are returned as `scheme//authority` and
/// are never matched against ordinary blocklist entries.
const INTERNAL_PREFIXES: [&str; 5] = [
    "chrome://",
    "chrome-extension://",
    "edge://",
    "moz-extension://",
    "about:",
];

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";
const CHROME_FAVICON: &str = "chrome://favicon/chrome://logo";

/// Canonical domain for `url`, or `""` when it cannot be determined.
///
/// Bare domains such as `example.com/path` are accepted and treated as
/// `https://` URLs.
pub fn normalize_domain(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if let Some(origin) = internal_origin(url) {
        return origin;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(&format!("https://{url}")) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(url, error = %e, "could not extract domain");
                    return String::new();
                }
            }
        }
        Err(e) => {
            warn!(url, error = %e, "could not extract domain");
            return String::new();
        }
    };

    match parsed.host_str() {
        Some(host) => host.strip_prefix("www.").unwrap_or(host).to_ascii_lowercase(),
        None => {
            debug!(url, "url has no host");
            String::new()
        }
    }
}

/// The `https://` URL a canonical domain stands for.
pub fn domain_url(domain: &str) -> String {
    format!("https://{domain}/")
}

/// True for browser-internal pages and for pages under `extension_base`.
pub fn is_internal_url(url: &str, extension_base: &str) -> bool {
    let url = url.trim();
    (!extension_base.is_empty() && has_prefix(url, extension_base))
        || INTERNAL_PREFIXES.iter().any(|p| has_prefix(url, p))
}

/// ASCII case-insensitive `starts_with`; schemes are case-insensitive.
fn has_prefix(url: &str, prefix: &str) -> bool {
    url.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Default icon URL cached alongside per-site usage.
pub fn favicon_for(domain: &str) -> String {
    if domain.is_empty() {
        return String::new();
    }
    if domain.starts_with("chrome://") {
        return CHROME_FAVICON.to_string();
    }
    format!("{FAVICON_SERVICE}?domain={domain}&sz=64")
}

fn internal_origin(url: &str) -> Option<String> {
    let prefix = INTERNAL_PREFIXES.iter().find(|p| has_prefix(url, p))?;
    if let Some(scheme) = prefix.strip_suffix("//") {
        let authority = url[prefix.len()..]
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        Some(format!("{scheme}//{}", authority.to_ascii_lowercase()))
    } else {
        // `about:` has no authority component.
        let end = url.find(['/', '?', '#']).unwrap_or(url.len());
        Some(url[..end].to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_www_and_path() {
        assert_eq!(normalize_domain("https://www.example.com/a/b?c=d"), "example.com");
        assert_eq!(normalize_domain("http://sub.example.com:8080/"), "sub.example.com");
        assert_eq!(normalize_domain("HTTPS://WWW.Example.COM"), "example.com");
    }

    #[test]
    fn only_leading_www_is_stripped() {
        assert_eq!(normalize_domain("https://wwwexample.com"), "wwwexample.com");
        assert_eq!(normalize_domain("https://a.www.example.com"), "a.www.example.com");
    }

    #[test]
    fn internal_schemes_keep_scheme_and_authority() {
        assert_eq!(normalize_domain("chrome://settings/privacy"), "chrome://settings");
        assert_eq!(
            normalize_domain("chrome-extension://abcdef/block.html?blocked=x"),
            "chrome-extension://abcdef"
        );
        assert_eq!(normalize_domain("about:blank"), "about:blank");
    }

    #[test]
    fn failures_are_empty() {
        assert_eq!(normalize_domain(""), "");
        assert_eq!(normalize_domain("   "), "");
        assert_eq!(normalize_domain("https://exa mple.com"), "");
        assert_eq!(normalize_domain("data:text/plain,hello"), "");
    }

    #[test]
    fn bare_domains_are_accepted() {
        assert_eq!(normalize_domain("example.com"), "example.com");
        assert_eq!(normalize_domain("www.youtube.com/shorts"), "youtube.com");
    }

    #[test]
    fn internal_url_detection() {
        let base = "chrome-extension://argon/";
        assert!(is_internal_url("chrome-extension://argon/dashboard.html", base));
        assert!(is_internal_url("chrome://newtab", base));
        assert!(is_internal_url("about:blank", ""));
        assert!(!is_internal_url("https://example.com", base));
    }

    #[test]
    fn internal_schemes_ignore_case() {
        let base = "chrome-extension://argon/";
        assert!(is_internal_url("CHROME://settings", base));
        assert!(is_internal_url("Chrome-Extension://argon/block.html", base));
        assert!(is_internal_url("About:Blank", ""));
        assert_eq!(normalize_domain("CHROME://Settings/privacy"), "chrome://settings");
        assert_eq!(normalize_domain("ABOUT:blank"), "about:blank");
    }

    #[test]
    fn favicons() {
        assert_eq!(
            favicon_for("example.com"),
            "https://www.google.com/s2/favicons?domain=example.com&sz=64"
        );
        assert_eq!(favicon_for("chrome://settings"), "chrome://favicon/chrome://logo");
        assert_eq!(favicon_for(""), "");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(d in "[a-v][a-z0-9]{0,10}(\\.[a-z][a-z0-9]{0,6}){0,2}\\.[a-z]{2,5}") {
            let once = normalize_domain(&domain_url(&d));
            prop_assert_eq!(&once, &normalize_domain(&d));
            prop_assert_eq!(&normalize_domain(&domain_url(&once)), &once);
            prop_assert_eq!(once, d);
        }
    }
}
