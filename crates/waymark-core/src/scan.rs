//! Public-URL extraction from tunnel provider output.
//!
//! Provider output format is not a stable contract, so this is a
//! deliberately tolerant substring scan rather than a URL parser: the first
//! `https://` prefix on a line, taken through the end of its token.

/// Extract the first `https://` URL token from one output line.
///
/// Interleaved diagnostic text on the same line is tolerated; the token
/// runs from the prefix to the next whitespace (or end of line).
pub fn find_https_url(line: &str) -> Option<&str> {
    let start = line.find("https://")?;
    let candidate = &line[start..];
    let end = candidate
        .find(char::is_whitespace)
        .unwrap_or(candidate.len());
    Some(&candidate[..end])
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_url_line() {
        assert_eq!(
            find_https_url("https://abc123.example.tld"),
            Some("https://abc123.example.tld")
        );
    }

    #[test]
    fn url_embedded_in_diagnostics() {
        assert_eq!(
            find_https_url("Forwarding HTTP traffic from https://abc123.example.tld (session x)"),
            Some("https://abc123.example.tld")
        );
    }

    #[test]
    fn first_of_several_urls_wins() {
        assert_eq!(
            find_https_url("https://one.example https://two.example"),
            Some("https://one.example")
        );
    }

    #[test]
    fn tab_terminates_the_token() {
        assert_eq!(
            find_https_url("url:\thttps://x.example\tready"),
            Some("https://x.example")
        );
    }

    #[test]
    fn plain_diagnostics_yield_nothing() {
        assert_eq!(find_https_url("connecting..."), None);
        assert_eq!(find_https_url(""), None);
    }

    #[test]
    fn insecure_scheme_is_ignored() {
        assert_eq!(find_https_url("listening on http://localhost:8080"), None);
    }
}
