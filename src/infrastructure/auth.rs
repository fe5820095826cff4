use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::{AppState, config::Config};
use crate::models::user;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user id
    pub name: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_jwt(
    user: &user::Model,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();

    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Sign a token for `user` and wrap it in the HTTP-only session cookie.
pub fn session_cookie(user: &user::Model, config: &Config) -> Result<Cookie<'static>, DomainError> {
    let token = create_jwt(
        user,
        config.jwt_secret(),
        Duration::hours(config.jwt_ttl_hours),
    )
    .map_err(|e| DomainError::Internal(format!("token signing failed: {}", e)))?;

    Ok(Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(if config.cookie_secure {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .build())
}

/// An expired, empty `token` cookie that makes the browser drop the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE).path("/").build();
    cookie.make_removal();
    cookie
}

/// The cookie wins over the header when both are present.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        return Some(cookie.value().to_owned());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Identity of the caller, taken from a verified token whose account still exists.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Verify the token, then load the account it names.
async fn current_user(parts: &Parts, state: &AppState) -> Result<user::Model, DomainError> {
    let token = token_from_parts(parts)
        .ok_or_else(|| DomainError::Unauthorized("Not authenticated, please log in".into()))?;

    let claims = decode_jwt(&token, state.config.jwt_secret()).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        DomainError::Unauthorized("Invalid or expired token".into())
    })?;

    // Tokens outlive deleted accounts
    user::Entity::find_by_id(claims.sub)
        .one(state.db())
        .await?
        .ok_or_else(|| DomainError::Unauthorized("Account no longer exists".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = DomainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state).await?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
        })
    }
}

/// A caller whose current database record has the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = DomainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state).await?;

        if !user.is_admin() {
            tracing::warn!("Non-admin user {} attempted an admin route", user.id);
            return Err(DomainError::Forbidden("Access denied. Admins only.".into()));
        }

        Ok(AdminUser(user))
    }
}
