//! Viewer identity.
//!
//! Sign-in happens at an external identity provider. The proxy in front of
//! the server forwards the signed-in user's id in a request header (named by
//! `IDENTITY_HEADER`); requests without it are anonymous.

use axum::http::HeaderMap;

/// The external identity id of the viewer, if the request carries one.
pub fn viewer_from_headers(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Whether the viewer owns the profile with the given identity id.
pub fn is_profile_owner(viewer: Option<&str>, clerk_id: &str) -> bool {
    viewer == Some(clerk_id)
}
