//! Google OAuth 2.0 authorization-code client.
//!
//! Only the three calls the sign-in flow needs: build the consent URL,
//! exchange the code for an access token, and fetch the OpenID profile.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::domain::DomainError;
use crate::infrastructure::config::GoogleConfig;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Subset of the OpenID Connect userinfo response we keep
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account id
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug)]
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    http: Client,
}

impl GoogleOAuthClient {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: SecretString::new(config.client_secret.expose_secret().clone()),
            redirect_uri: config.callback_url.clone(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the token and userinfo calls somewhere else (a local stub server).
    pub fn with_endpoints(mut self, token_url: &str, userinfo_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.userinfo_url = userinfo_url.to_string();
        self
    }

    pub fn authorization_url(&self, state: &str) -> Result<String, DomainError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| DomainError::Internal(format!("Failed to build URL: {}", e)))?;

        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String, DomainError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| DomainError::External(e.to_string()))?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Google token exchange failed: {}", error_body);
            return Err(DomainError::External("Token exchange failed".into()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::External(e.to_string()))?;

        Ok(token.access_token)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, DomainError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| DomainError::External(e.to_string()))?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Google userinfo request failed: {}", error_body);
            return Err(DomainError::External("UserInfo fetch failed".into()));
        }

        let profile: GoogleProfile = response
            .json()
            .await
            .map_err(|e| DomainError::External(e.to_string()))?;

        if !profile.email_verified {
            tracing::warn!("Google account email not verified: {}", profile.email);
            return Err(DomainError::Unauthorized(
                "Google account email is not verified".into(),
            ));
        }

        Ok(profile)
    }
}
