//! Auth gate for data routes
//!
//! The `auth_token` cookie is preferred; `Authorization: Bearer <token>` is
//! the fallback for callers without a cookie jar.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::modules::credential::{validate_token, CredentialError};
use crate::proxy::error::PortalError;
use crate::proxy::server::AppState;
use crate::proxy::session::SESSION_COOKIE_NAME;

const BEARER_PREFIX: &str = "Bearer ";

/// Paths that require a credential
fn is_protected_path(path: &str) -> bool {
    if !path.starts_with("/api/") {
        // Static front-end and health checks
        return false;
    }

    // Login, logout and status must stay reachable
    !path.starts_with("/api/auth/")
}

/// Extract the presented credential: non-empty cookie first, bearer header second
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_header
        .strip_prefix(BEARER_PREFIX)
        .map(|token| token.to_string())
}

/// Auth gate middleware
pub async fn auth_gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if !is_protected_path(&path) {
        tracing::debug!("auth_gate: path {} is not protected, allowing", path);
        return next.run(request).await;
    }

    let token = extract_credential(request.headers());

    match validate_token(state.verifier.as_ref(), token.as_deref()) {
        Ok(()) => {
            tracing::debug!("auth_gate: valid credential for {}", path);
            next.run(request).await
        }
        Err(CredentialError::Missing) => {
            tracing::info!("auth_gate: missing credential for {}", path);
            PortalError::Unauthorized(CredentialError::Missing.into()).into_response()
        }
        Err(CredentialError::Invalid) => {
            tracing::warn!("auth_gate: invalid credential for {}", path);
            PortalError::Unauthorized(CredentialError::Invalid.into()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_protected_paths() {
        assert!(is_protected_path("/api/use-cases"));
        assert!(!is_protected_path("/api/auth/login"));
        assert!(!is_protected_path("/api/auth/logout"));
        assert!(!is_protected_path("/healthz"));
        assert!(!is_protected_path("/login"));
        assert!(!is_protected_path("/"));
    }

    #[test]
    fn test_cookie_preferred_over_header() {
        let map = headers(&[
            (header::COOKIE, "theme=dark; auth_token=from-cookie"),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(extract_credential(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_fallback() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer from-header")]);
        assert_eq!(extract_credential(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_empty_cookie_falls_back_to_header() {
        let map = headers(&[
            (header::COOKIE, "auth_token="),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(extract_credential(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        let map = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert_eq!(extract_credential(&map), None);

        let map = headers(&[(header::AUTHORIZATION, "bearer lowercase")]);
        assert_eq!(extract_credential(&map), None);
    }

    #[test]
    fn test_nothing_presented() {
        assert_eq!(extract_credential(&HeaderMap::new()), None);
    }
}
