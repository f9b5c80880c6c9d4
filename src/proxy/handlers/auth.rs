//! Login, logout and session status

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::modules::credential::{validate_token, CredentialError};
use crate::proxy::error::PortalError;
use crate::proxy::middleware::auth_gate::extract_credential;
use crate::proxy::server::AppState;
use crate::proxy::session::{clear_session_cookie, issue_session_cookie};

/// Login request body. `token` is kept loose so a wrong JSON type is
/// answered with 400/401 rather than a parse failure.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub token: Option<Value>,
}

/// A falsy token (`null`, `false`, `0`, `""`) counts as not presented
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Exchange the shared token for a session cookie.
///
/// The body is parsed as JSON whatever its `Content-Type`.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<Value>), PortalError> {
    let req: LoginRequest = serde_json::from_slice(&body)
        .map_err(|e| PortalError::InternalError(format!("Unreadable login body: {}", e)))?;

    let token = match req.token {
        None => Err(CredentialError::Missing),
        Some(value) if is_blank(&value) => Err(CredentialError::Missing),
        Some(Value::String(token)) => {
            validate_token(state.verifier.as_ref(), Some(token.as_str())).map(|()| token)
        }
        Some(_) => Err(CredentialError::Invalid),
    };

    let token = token.map_err(|e| {
        tracing::warn!("Failed login attempt: {}", e);
        PortalError::from_login(e)
    })?;

    let jar = jar.add(issue_session_cookie(&token, state.secure_cookies));

    tracing::info!("Token authentication successful");
    Ok((jar, Json(json!({ "message": "Authentication successful" }))))
}

/// Drop the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(clear_session_cookie(state.secure_cookies));

    tracing::info!("Session cookie cleared");
    (jar, Json(json!({ "message": "Logged out" })))
}

/// Whether the caller currently holds a valid credential
pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = extract_credential(&headers);
    let authenticated = validate_token(state.verifier.as_ref(), token.as_deref()).is_ok();

    Json(json!({ "authenticated": authenticated }))
}
