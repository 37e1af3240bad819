//! Site blocking: the block list, "allow once" overrides and block counters.

mod allow;
mod counts;
mod rules;

pub use allow::TemporaryAllowRegistry;
pub use counts::{BlockCounts, BlockStats};
pub use rules::{decide, normalize_site_entry, should_block, AllowReason, BlockList, Decision};

/// Extension page shown in place of a blocked site.
pub const BLOCK_PAGE: &str = "block.html";

/// Default "allow once" duration.
pub const DEFAULT_ALLOW_MS: u64 = 5 * 60 * 1000;

/// URL of the block page carrying the original URL as `?blocked=`.
pub fn block_page_url(extension_base: &str, page: &str, blocked_url: &str) -> String {
    let base = extension_base.trim_end_matches('/');
    format!(
        "{base}/{page}?blocked={}",
        urlencoding::encode(blocked_url)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_page_url_encodes_original() {
        assert_eq!(
            block_page_url("chrome-extension://argon/", BLOCK_PAGE, "https://x.com/a?b=c"),
            "chrome-extension://argon/block.html?blocked=https%3A%2F%2Fx.com%2Fa%3Fb%3Dc"
        );
    }
}
