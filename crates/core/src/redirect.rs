//! Route Matcher and Redirect URL Builder.
//!
//! Once a shopper picks a binding, the platform answers with the equivalent
//! page on every binding ([`AlternateRoute`]). The matching path is joined to
//! the target binding's canonical path prefix on the *current* host, so dev
//! and staging hosts keep working.

use thiserror::Error;
use url::Url;

use crate::types::{AlternateRoute, BindingId};

/// Errors composing a redirect URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedirectError {
    /// The binding's canonical base address can't be parsed.
    #[error("invalid canonical base address {address:?}: {reason}")]
    InvalidCanonicalAddress { address: String, reason: String },

    /// No hostname to redirect to.
    #[error("hostname cannot be empty")]
    MissingHostname,
}

/// Inputs of [`build_redirect_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectTarget<'a> {
    /// Canonical base address of the target binding (scheme optional).
    pub canonical_base_address: &'a str,
    /// Hostname the shopper is currently on.
    pub hostname: &'a str,
    /// Current protocol, with or without the trailing colon (`https:`).
    pub protocol: &'a str,
    /// Matched alternate path, or empty for the binding root.
    pub path: &'a str,
}

/// Find the alternate path for a binding.
///
/// The first route for the binding wins. Returns an empty string when no
/// route matches, which redirects to the binding's canonical root.
#[must_use]
pub fn match_route<'a>(routes: &'a [AlternateRoute], binding_id: &BindingId) -> &'a str {
    routes
        .iter()
        .find(|route| &route.binding_id == binding_id)
        .map_or("", |route| route.path.as_str())
}

/// Compose the navigation URL for a binding switch.
///
/// `protocol//hostname` + canonical path prefix + matched path. The
/// canonical address's own host is discarded.
///
/// # Errors
///
/// Returns an error if the hostname is empty or the canonical address is not
/// a valid URL (with or without scheme).
pub fn build_redirect_url(target: RedirectTarget<'_>) -> Result<String, RedirectError> {
    if target.hostname.is_empty() {
        return Err(RedirectError::MissingHostname);
    }

    let base_path = canonical_path(target.canonical_base_address)?;

    let scheme = match target.protocol.trim_end_matches(':') {
        "" => "https",
        scheme => scheme,
    };

    let mut url = format!("{scheme}://{}{base_path}", target.hostname);

    if !target.path.is_empty() && !target.path.starts_with('/') {
        url.push('/');
    }
    url.push_str(target.path);

    if base_path.is_empty() && target.path.is_empty() {
        url.push('/');
    }

    Ok(url)
}

/// Path component of a canonical base address, without trailing slash.
fn canonical_path(address: &str) -> Result<String, RedirectError> {
    let parsed = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("https://{address}"))
    }
    .map_err(|e| RedirectError::InvalidCanonicalAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    Ok(parsed.path().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn route(binding_id: &str, path: &str) -> AlternateRoute {
        AlternateRoute {
            binding_id: BindingId::new(binding_id),
            path: path.to_string(),
        }
    }

    fn target<'a>(address: &'a str, path: &'a str) -> RedirectTarget<'a> {
        RedirectTarget {
            canonical_base_address: address,
            hostname: "shop.test",
            protocol: "https:",
            path,
        }
    }

    #[test]
    fn test_match_route_empty() {
        assert_eq!(match_route(&[], &BindingId::new("a")), "");
    }

    #[test]
    fn test_match_route_found() {
        let routes = vec![route("b", "/other"), route("a", "/x")];
        assert_eq!(match_route(&routes, &BindingId::new("a")), "/x");
    }

    #[test]
    fn test_match_route_first_wins() {
        let routes = vec![route("a", "/x"), route("a", "/y")];
        assert_eq!(match_route(&routes, &BindingId::new("a")), "/x");
    }

    #[test]
    fn test_match_route_missing_binding() {
        let routes = vec![route("a", "/x")];
        assert_eq!(match_route(&routes, &BindingId::new("z")), "");
    }

    #[test]
    fn test_build_with_path() {
        let url = build_redirect_url(target("https://old.com/us", "/prod/1")).unwrap();
        assert_eq!(url, "https://shop.test/us/prod/1");
    }

    #[test]
    fn test_build_empty_path_goes_to_canonical_root() {
        let url = build_redirect_url(target("https://old.com/us", "")).unwrap();
        assert_eq!(url, "https://shop.test/us");
    }

    #[test]
    fn test_build_without_scheme() {
        let url = build_redirect_url(target("old.com/us/", "/en/shoes")).unwrap();
        assert_eq!(url, "https://shop.test/us/en/shoes");
    }

    #[test]
    fn test_build_root_binding() {
        assert_eq!(
            build_redirect_url(target("store.com.br", "")).unwrap(),
            "https://shop.test/"
        );
        assert_eq!(
            build_redirect_url(target("store.com.br", "/p/1")).unwrap(),
            "https://shop.test/p/1"
        );
    }

    #[test]
    fn test_build_adds_leading_slash() {
        let url = build_redirect_url(target("old.com/us", "prod/1")).unwrap();
        assert_eq!(url, "https://shop.test/us/prod/1");
    }

    #[test]
    fn test_build_protocol_without_colon() {
        let url = build_redirect_url(RedirectTarget {
            protocol: "http",
            ..target("old.com/us", "/x")
        })
        .unwrap();
        assert_eq!(url, "http://shop.test/us/x");
    }

    #[test]
    fn test_build_is_idempotent() {
        let input = target("https://old.com/us", "/prod/1");
        assert_eq!(
            build_redirect_url(input).unwrap(),
            build_redirect_url(input).unwrap()
        );
    }

    #[test]
    fn test_build_missing_hostname() {
        let result = build_redirect_url(RedirectTarget {
            hostname: "",
            ..target("old.com/us", "/x")
        });
        assert_eq!(result, Err(RedirectError::MissingHostname));
    }

    #[test]
    fn test_build_invalid_canonical_address() {
        let result = build_redirect_url(target("http://[::1", "/x"));
        assert!(matches!(
            result,
            Err(RedirectError::InvalidCanonicalAddress { .. })
        ));
    }
}
