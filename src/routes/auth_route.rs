use std::{sync::Arc, time::Duration};

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    config::AppConfig,
    consts::route_const::{GROUPS_PATH, LOGIN_PATH, LOGOUT_PATH},
    errors::{Error, Result},
    middleware::{CurrentSession, clear_session_cookies, session_cookies, set_cookies},
    state::AppState,
    utils::validator::first_message,
    views::login,
};

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct SignInFormRequest {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Must be called from within the tokio runtime; the limiter's cleanup task
/// is spawned on it and ends with it.
pub fn auth_router(config: &AppConfig) -> Result<Router<AppState>> {
    // one attempt back every 12 seconds once the burst is spent,
    // keyed on the peer address so forwarded headers cannot pick the bucket
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(12)
            .burst_size(config.login_burst)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .ok_or(Error::RateLimitConfig)?,
    );
    let governor_limiter = governor_conf.limiter().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            tracing::debug!("login rate limiting storage size: {}", governor_limiter.len());
            governor_limiter.retain_recent();
        }
    });

    Ok(Router::new()
        .route(
            LOGIN_PATH,
            get(login_page).merge(post(sign_in).layer(GovernorLayer {
                config: governor_conf,
            })),
        )
        .route(LOGOUT_PATH, post(sign_out)))
}

pub async fn login_page(session: Result<CurrentSession>) -> Response {
    match session {
        Ok(session) if session.principal.is_some() => {
            session.attach(Redirect::to(GROUPS_PATH))
        }
        Ok(_) => Html(login::render("", None)).into_response(),
        // An unreachable platform still gets the form.
        Err(err) => {
            warn!("session lookup failed: {err}");
            Html(login::render("", None)).into_response()
        }
    }
}

pub async fn sign_in(
    State(state): State<AppState>,
    Form(input): Form<SignInFormRequest>,
) -> Response {
    let input = SignInFormRequest {
        email: input.email.trim().to_string(),
        password: input.password,
    };

    if input.email.is_empty() || input.password.is_empty() {
        return login_failed(
            StatusCode::BAD_REQUEST,
            &input.email,
            &Error::MissingCredentials.to_string(),
        );
    }
    if let Err(errors) = input.validate() {
        return login_failed(StatusCode::BAD_REQUEST, &input.email, &first_message(&errors));
    }

    match state.platform.sign_in(&input.email, &input.password).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "admin signed in");
            (
                set_cookies(session_cookies(&session)),
                Redirect::to(GROUPS_PATH),
            )
                .into_response()
        }
        Err(err) => {
            warn!(email = %input.email, "sign in rejected: {err}");
            login_failed(StatusCode::UNAUTHORIZED, &input.email, &err.to_string())
        }
    }
}

fn login_failed(status: StatusCode, email: &str, message: &str) -> Response {
    (status, Html(login::render(email, Some(message)))).into_response()
}

/// Ends the platform session (renewing it first when only the refresh token
/// is left) and drops both cookies either way.
pub async fn sign_out(State(state): State<AppState>, session: Result<CurrentSession>) -> Response {
    match session {
        Ok(CurrentSession {
            principal: Some(principal),
            ..
        }) => {
            if let Err(err) = state.platform.sign_out(&principal.access_token).await {
                warn!("platform sign out failed: {err}");
            }
        }
        Ok(_) => {}
        Err(err) => warn!("session lookup failed: {err}"),
    }

    (
        set_cookies(clear_session_cookies()),
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
