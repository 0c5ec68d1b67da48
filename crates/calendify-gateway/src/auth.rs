//! Turns request credentials into a `User`, according to `gateway.auth.mode`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use calendify_core::config::AuthMode;
use calendify_core::CalendifyError;
use calendify_protocol::handshake::AuthPayload;
use calendify_users::{ResolvedUser, User};
use tracing::{info, warn};

use crate::app::AppState;

/// Identity provider name for subjects asserted by the upstream proxy.
pub const PROXY_PROVIDER: &str = "proxy";
/// Identity provider name for the single `none`-mode user.
pub const DEV_PROVIDER: &str = "dev";

/// Authenticate a plain HTTP request from its headers.
pub fn authenticate_http(headers: &HeaderMap, app: &AppState) -> Result<User, CalendifyError> {
    match app.config.gateway.auth.mode {
        AuthMode::Token => {
            let token = bearer_token(headers)
                .ok_or_else(|| CalendifyError::AuthFailed("missing bearer token".to_string()))?;
            Ok(app.users.authenticate_token(token)?)
        }
        AuthMode::TrustedProxy => {
            let subject = proxy_subject(headers, &app.config.gateway.auth.proxy_header)
                .ok_or_else(|| {
                    CalendifyError::AuthFailed(format!(
                        "missing '{}' header",
                        app.config.gateway.auth.proxy_header
                    ))
                })?;
            resolve_subject(app, PROXY_PROVIDER, &subject)
        }
        AuthMode::None => resolve_subject(app, DEV_PROVIDER, &app.config.gateway.auth.dev_user),
    }
}

/// Authenticate a WS `connect` request. `proxy_subject` is read from the
/// upgrade request's headers, since the socket itself carries none.
pub fn authenticate_ws(
    auth: &AuthPayload,
    proxy_subject: Option<&str>,
    app: &AppState,
) -> Result<User, CalendifyError> {
    match (&app.config.gateway.auth.mode, auth) {
        (AuthMode::Token, AuthPayload::Token { token }) => {
            Ok(app.users.authenticate_token(token)?)
        }
        (AuthMode::TrustedProxy, _) => {
            let subject = proxy_subject.ok_or_else(|| {
                CalendifyError::AuthFailed("upgrade request carried no proxy identity".to_string())
            })?;
            resolve_subject(app, PROXY_PROVIDER, subject)
        }
        (AuthMode::None, _) => {
            resolve_subject(app, DEV_PROVIDER, &app.config.gateway.auth.dev_user)
        }
        (AuthMode::Token, _) => Err(CalendifyError::AuthFailed(
            "expected token auth mode".to_string(),
        )),
    }
}

/// `Authorization: Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Non-empty value of the configured proxy header.
pub fn proxy_subject(headers: &HeaderMap, header: &str) -> Option<String> {
    let value = headers.get(header)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn resolve_subject(app: &AppState, provider: &str, subject: &str) -> Result<User, CalendifyError> {
    match app.users.resolve(provider, subject) {
        Ok(ResolvedUser::NewlyCreated(user)) => {
            info!(user_id = %user.id, provider, "user created on first contact");
            Ok(user)
        }
        Ok(ResolvedUser::Known(user)) => Ok(user),
        Err(e) => {
            warn!(provider, error = %e, "identity resolution failed");
            Err(CalendifyError::AuthFailed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_state;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(
            bearer_token(&headers(&[("authorization", "Bearer abc")])),
            Some("abc")
        );
        assert_eq!(
            bearer_token(&headers(&[("authorization", "bearer  abc ")])),
            Some("abc")
        );
        assert_eq!(bearer_token(&headers(&[("authorization", "Basic abc")])), None);
        assert_eq!(bearer_token(&headers(&[("authorization", "Bearer ")])), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn token_mode_accepts_issued_token() {
        let app = test_state(AuthMode::Token);
        let user = app.users.create_user("Dana").unwrap();
        let issued = app.users.issue_token(&user.id, None).unwrap();

        let auth = format!("Bearer {}", issued.token);
        let found = authenticate_http(&headers(&[("authorization", &auth)]), &app).unwrap();
        assert_eq!(found.id, user.id);

        let err = authenticate_http(&headers(&[("authorization", "Bearer nope")]), &app)
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_FAILED");
        let err = authenticate_http(&HeaderMap::new(), &app).unwrap_err();
        assert_eq!(err.code(), "AUTH_FAILED");
    }

    #[test]
    fn proxy_mode_creates_user_once() {
        let app = test_state(AuthMode::TrustedProxy);
        let h = headers(&[("x-forwarded-user", "dana@example.com")]);
        let first = authenticate_http(&h, &app).unwrap();
        let second = authenticate_http(&h, &app).unwrap();
        assert_eq!(first.id, second.id);

        let err = authenticate_http(&HeaderMap::new(), &app).unwrap_err();
        assert_eq!(err.code(), "AUTH_FAILED");
    }

    #[test]
    fn none_mode_is_a_single_user() {
        let app = test_state(AuthMode::None);
        let a = authenticate_http(&HeaderMap::new(), &app).unwrap();
        let b = authenticate_ws(&AuthPayload::None, None, &app).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.display_name, "local");
    }

    #[test]
    fn ws_token_mode_rejects_other_payloads() {
        let app = test_state(AuthMode::Token);
        let err = authenticate_ws(&AuthPayload::None, None, &app).unwrap_err();
        assert_eq!(err.code(), "AUTH_FAILED");
    }
}
