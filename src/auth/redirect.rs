//! Helpers for redirect URLs during authentication flows.

use axum::{extract::Request, http::Uri};
use tracing::error;

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW
}

/// Keep only the path and query of `raw_url` if it points back into this app.
///
/// Absolute URLs, protocol-relative URLs and the log-in page itself are rejected.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL that sends the user back to `request`'s page afterwards.
///
/// Falls back to the plain log-in page if the request URI is not a safe target.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
        .and_then(|target| build_log_in_redirect_url_from_target(&target))
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

#[cfg(test)]
mod redirect_tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_relative_path_and_query() {
        assert_eq!(
            normalize_redirect_url("/add/?foo=bar"),
            Some("/add/?foo=bar".to_owned())
        );
    }

    #[test]
    fn rejects_external_urls() {
        assert_eq!(normalize_redirect_url("https://example.com/"), None);
        assert_eq!(normalize_redirect_url("//example.com/"), None);
        assert_eq!(normalize_redirect_url("add/"), None);
    }

    #[test]
    fn rejects_log_in_page() {
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN_VIEW), None);
        assert_eq!(normalize_redirect_url("/login/?redirect_url=%2F"), None);
    }

    #[test]
    fn builds_log_in_url_with_original_target() {
        let request = Request::builder()
            .uri("/?category=Food&page=2")
            .body(Body::empty())
            .unwrap();

        let got = build_log_in_redirect_url(&request);

        let want_query =
            serde_urlencoded::to_string([("redirect_url", "/?category=Food&page=2")]).unwrap();
        assert_eq!(got, format!("{}?{}", endpoints::LOG_IN_VIEW, want_query));
    }
}
