use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderName,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{AppendHeaders, IntoResponse, Response},
};
use tracing::debug;

use crate::{
    consts::route_const::{REFRESH_COOKIE, REFRESH_COOKIE_MAX_AGE, SESSION_COOKIE},
    errors::{Error, Result},
    models::user::{AuthSession, Principal},
    platform::Platform,
    state::AppState,
};

/// The caller's principal, looked up against the platform on every request.
/// `principal` is `None` when neither cookie yields a live session.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub principal: Option<Principal>,
    /// Set when an expired access token was renewed during this request.
    pub refreshed: Option<AuthSession>,
}

impl CurrentSession {
    fn signed_in(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            refreshed: None,
        }
    }

    /// Adds the renewed session cookies, if any, to `response`.
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        match &self.refreshed {
            Some(session) => (set_cookies(session_cookies(session)), response).into_response(),
            None => response.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        resolve_session(state.platform.as_ref(), &parts.headers).await
    }
}

/// Checks the access token, and when it is missing or no longer accepted
/// trades the refresh token for a new session once.
pub async fn resolve_session(platform: &dyn Platform, headers: &HeaderMap) -> Result<CurrentSession> {
    if let Some(token) = cookie_value(headers, SESSION_COOKIE) {
        if let Some(principal) = platform.current_user(&token).await? {
            return Ok(CurrentSession::signed_in(principal));
        }
    }

    let Some(refresh_token) = cookie_value(headers, REFRESH_COOKIE) else {
        return Ok(CurrentSession::default());
    };
    match platform.refresh_session(&refresh_token).await {
        Ok(session) => {
            debug!(user_id = %session.user.id, "session refreshed");
            Ok(CurrentSession {
                principal: Some(Principal::new(
                    session.user.clone(),
                    &session.access_token,
                )),
                refreshed: Some(session),
            })
        }
        Err(err) if err.is_rejection() => {
            debug!("refresh token rejected: {err}");
            Ok(CurrentSession::default())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

fn cookie(name: &str, value: &str, max_age: Option<i64>) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    cookie
}

/// Access cookie lives as long as the token; the refresh cookie outlives it.
pub fn session_cookies(session: &AuthSession) -> Vec<String> {
    let mut cookies = vec![cookie(
        SESSION_COOKIE,
        &session.access_token,
        session.expires_in,
    )];
    if let Some(refresh_token) = &session.refresh_token {
        cookies.push(cookie(
            REFRESH_COOKIE,
            refresh_token,
            Some(REFRESH_COOKIE_MAX_AGE),
        ));
    }
    cookies
}

pub fn clear_session_cookies() -> Vec<String> {
    vec![
        cookie(SESSION_COOKIE, "", Some(0)),
        cookie(REFRESH_COOKIE, "", Some(0)),
    ]
}

pub fn set_cookies(cookies: Vec<String>) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(
        cookies
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie))
            .collect(),
    )
}
