//! Google sign-in: consent redirect and callback

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;

use crate::infrastructure::auth::session_cookie;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::user_service;

const STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user declines consent
    pub error: Option<String>,
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, value))
        .path("/api/google")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

#[utoipa::path(
    get,
    path = "/api/google",
    responses(
        (status = 303, description = "Redirect to the Google consent screen"),
        (status = 503, description = "Google sign-in is not configured")
    )
)]
pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, DomainError> {
    let google = state
        .google
        .as_ref()
        .ok_or_else(|| DomainError::Unavailable("Google sign-in is not configured".into()))?;

    let nonce = uuid::Uuid::new_v4().to_string();
    let url = google.authorization_url(&nonce)?;

    Ok((
        jar.add(state_cookie(nonce, state.config.cookie_secure)),
        Redirect::to(&url),
    ))
}

fn login_failed(client_url: &str, reason: &str) -> Redirect {
    Redirect::to(&format!(
        "{}/login?error={}",
        client_url.trim_end_matches('/'),
        reason
    ))
}

#[utoipa::path(
    get,
    path = "/api/google/callback",
    responses(
        (status = 303, description = "Redirect to the frontend, with the session cookie on success")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let client_url = state.config.client_url.as_str();

    let Some(google) = state.google.as_ref() else {
        return DomainError::Unavailable("Google sign-in is not configured".into()).into_response();
    };

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_owned());
    let mut used = Cookie::build(STATE_COOKIE).path("/api/google").build();
    used.make_removal();
    let jar = jar.add(used);

    if let Some(error) = query.error {
        tracing::info!("Google sign-in cancelled: {}", error);
        return (jar, login_failed(client_url, "access_denied")).into_response();
    }

    let (Some(code), Some(returned)) = (query.code, query.state) else {
        return (jar, login_failed(client_url, "invalid_request")).into_response();
    };

    if expected.as_deref() != Some(returned.as_str()) {
        tracing::warn!("Google callback with mismatched state");
        return (jar, login_failed(client_url, "invalid_state")).into_response();
    }

    let result = async {
        let token = google.exchange_code(&code).await?;
        let profile = google.fetch_profile(&token).await?;
        let user = user_service::upsert_google_user(state.db(), profile).await?;
        session_cookie(&user, &state.config).map(|cookie| (user, cookie))
    }
    .await;

    match result {
        Ok((user, cookie)) => {
            tracing::info!("User {} signed in with Google", user.id);
            (jar.add(cookie), Redirect::to(client_url)).into_response()
        }
        Err(e) => {
            tracing::error!("Google sign-in failed: {}", e);
            (jar, login_failed(client_url, "google_auth_failed")).into_response()
        }
    }
}
