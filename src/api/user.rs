use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::infrastructure::auth::{AuthUser, clear_session_cookie, session_cookie};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::user::ProfileUpdate;
use crate::services::user_service::{self, LoginInput, PasswordChange, SignupInput};

#[utoipa::path(
    post,
    path = "/api/user/signup",
    responses(
        (status = 201, description = "Account created, session cookie set"),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupInput>,
) -> Result<impl IntoResponse, DomainError> {
    let user = user_service::signup(state.db(), payload).await?;
    let cookie = session_cookie(&user, &state.config)?;

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(json!({
            "message": "User created successfully",
            "user": user
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    responses(
        (status = 200, description = "Logged in, session cookie set"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginInput>,
) -> Result<impl IntoResponse, DomainError> {
    let user = user_service::authenticate(state.db(), payload).await?;
    let cookie = session_cookie(&user, &state.config)?;

    tracing::info!("User {} logged in", user.id);
    Ok((
        jar.add(cookie),
        Json(json!({
            "message": "Login successful",
            "user": user
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/logout",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(clear_session_cookie()),
        Json(json!({ "message": "Logged out successfully" })),
    )
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(user_service::get_user(state.db(), caller.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Profile of the caller"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(user_service::get_user(state.db(), caller.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, DomainError> {
    let user = user_service::update_profile(state.db(), caller.id, payload).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user
    })))
}

#[utoipa::path(
    put,
    path = "/api/user/password",
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<PasswordChange>,
) -> Result<impl IntoResponse, DomainError> {
    user_service::change_password(state.db(), caller.id, payload).await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}
