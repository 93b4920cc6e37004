//! Session extractor for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::models::{decode_session, SESSION_COOKIE};
use crate::common::{ApiError, AppState};

/// Identity decoded from the session cookie.
///
/// A validly signed token is fully trusted (the signing secret is the
/// integrity boundary), so no database lookup happens here.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("unreadable cookies".to_string()))?;

        let token = match jar.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => {
                warn!("Authentication failed: no session cookie");
                return Err(ApiError::Unauthorized("missing session".into()));
            }
        };

        match decode_session(&token, &app_state.jwt_secret) {
            Ok(claims) => Ok(AuthedUser {
                id: claims.sub,
                email: claims.email,
            }),
            Err(e) => {
                warn!(error = %e, "Session token validation failed");
                Err(ApiError::Unauthorized("invalid or expired session".into()))
            }
        }
    }
}
