// src/services/google.rs
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("invalid id_token: {0}")]
    InvalidToken(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// Verified identity claims extracted from a Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    client: Client,
}

impl GoogleService {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client_id,
            client_secret,
            redirect_uri,
            client,
        }
    }

    /// Consent-page URL for the server-driven redirect flow.
    pub fn authorization_url(&self) -> Result<String, GoogleError> {
        let client_id = self.client_id.as_deref().ok_or(GoogleError::NotConfigured)?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=online&prompt=select_account",
            AUTH_ENDPOINT,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode("openid email profile"),
        ))
    }

    /// Exchange an authorization code for tokens. The redirect URI must match
    /// the one used to build the consent URL.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, GoogleError> {
        let client_id = self.client_id.as_deref().ok_or(GoogleError::NotConfigured)?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(GoogleError::NotConfigured)?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = %status, error = %body, "Token exchange rejected by Google");
            return Err(GoogleError::OAuthFailed(format!(
                "token exchange returned {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::InvalidResponse(e.to_string()))
    }

    /// Verify an ID token with Google's tokeninfo endpoint and extract the
    /// identity claims.
    ///
    /// Checks performed: the endpoint accepts the token (signature), the
    /// token is not expired, the audience matches our client id, and the
    /// subject and email claims are present.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleIdentity, GoogleError> {
        let tokeninfo_url = format!("{}?id_token={}", TOKENINFO_ENDPOINT, id_token);

        debug!("Validating id_token with Google tokeninfo endpoint");

        let response = self
            .client
            .get(&tokeninfo_url)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(http_status = %status, "Google tokeninfo rejected the id_token");
            return Err(GoogleError::InvalidToken(
                "id_token validation failed".to_string(),
            ));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| GoogleError::InvalidResponse(e.to_string()))?;

        // tokeninfo serializes numeric claims as strings
        let exp = body.get("exp").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_str().and_then(|s| s.parse::<i64>().ok()))
        });
        if let Some(exp) = exp {
            if exp < Utc::now().timestamp() {
                warn!(token_exp = exp, "Google id_token has expired");
                return Err(GoogleError::InvalidToken("token has expired".to_string()));
            }
        }

        if let Some(client_id) = &self.client_id {
            match body.get("aud").and_then(|v| v.as_str()) {
                Some(aud) if aud == client_id => {}
                Some(aud) => {
                    warn!(token_audience = %aud, "id_token audience mismatch");
                    return Err(GoogleError::InvalidToken(
                        "token audience mismatch".to_string(),
                    ));
                }
                None => {
                    return Err(GoogleError::InvalidToken(
                        "token missing audience".to_string(),
                    ));
                }
            }
        }

        let sub = body.get("sub").and_then(|v| v.as_str()).map(str::to_string);
        let email = body
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let (sub, email) = match (sub, email) {
            (Some(sub), Some(email)) => (sub, email),
            _ => {
                warn!("Google id_token missing required fields (email/sub)");
                return Err(GoogleError::InvalidToken(
                    "token missing required fields".to_string(),
                ));
            }
        };

        let name = body
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let picture = body
            .get("picture")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(GoogleIdentity {
            sub,
            email,
            name,
            picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_contains_configured_parameters() {
        let service = GoogleService::new(
            Some("client-123.apps.googleusercontent.com".to_string()),
            Some("secret".to_string()),
            "http://localhost:5000/api/auth/google/callback".to_string(),
        );

        let url = service.authorization_url().unwrap();

        assert!(url.starts_with(AUTH_ENDPOINT));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fapi%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let service = GoogleService::new(None, None, "http://localhost/cb".to_string());

        match service.authorization_url() {
            Err(GoogleError::NotConfigured) => {}
            other => panic!("expected NotConfigured, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_fails_fast_when_unconfigured() {
        let service = GoogleService::new(
            Some("client-123".to_string()),
            None, // secret missing
            "http://localhost/cb".to_string(),
        );

        match service.exchange_code("code").await {
            Err(GoogleError::NotConfigured) => {}
            other => panic!("expected NotConfigured, got {:?}", other),
        }
    }
}
