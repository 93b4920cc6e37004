//! Authentication handlers
//!
//! Server-driven Google OAuth: `/api/auth/google` redirects to the consent
//! page, the callback exchanges the authorization code, verifies the ID
//! token, upserts the user and plants the session cookie.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{decode_session, sign_session, User, SESSION_COOKIE, SESSION_TTL_DAYS};
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState};
use crate::services::google::{GoogleError, GoogleIdentity};

/// GET /api/auth/google
/// Starts the OAuth flow by redirecting the browser to Google's consent page.
pub async fn google_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let auth_url = state
        .google_service
        .authorization_url()
        .map_err(|e| match e {
            GoogleError::NotConfigured => {
                error!("Login attempted without Google OAuth configuration");
                ApiError::InternalServer("Google OAuth is not configured".to_string())
            }
            other => ApiError::InternalServer(other.to_string()),
        })?;

    info!("Redirecting to Google consent page");
    Ok(Redirect::to(&auth_url))
}

/// GET /api/auth/google/callback
/// Exchanges the authorization code, verifies the returned ID token, creates
/// or refreshes the user, sets the session cookie and sends the browser back
/// to the client origin.
pub async fn google_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let state = state_lock.read().await.clone();

    // Consent denied or another provider-side error: back to the client with
    // the error in the query string rather than a dead-end error page.
    if let Some(oauth_error) = params.get("error") {
        warn!(oauth_error = %oauth_error, "Google OAuth returned error");
        let target = format!(
            "{}?auth_error={}",
            state.client_origin,
            urlencoding::encode(oauth_error)
        );
        return Ok((jar, Redirect::to(&target)));
    }

    let code = params.get("code").ok_or_else(|| {
        warn!("OAuth callback without authorization code");
        ApiError::BadRequest("Missing authorization code".to_string())
    })?;

    debug!("Received OAuth callback with authorization code");

    let tokens = state
        .google_service
        .exchange_code(code)
        .await
        .map_err(|e| {
            error!(error = %e, "Authorization code exchange failed");
            match e {
                GoogleError::NotConfigured => {
                    ApiError::InternalServer("Google OAuth is not configured".to_string())
                }
                GoogleError::OAuthFailed(msg) => ApiError::Unauthorized(msg),
                other => ApiError::InternalServer(other.to_string()),
            }
        })?;

    let id_token = tokens.id_token.as_deref().ok_or_else(|| {
        error!("Token exchange response did not include an id_token");
        ApiError::InternalServer("Google did not return an id_token".to_string())
    })?;

    let identity = state
        .google_service
        .verify_id_token(id_token)
        .await
        .map_err(|e| {
            warn!(error = %e, "ID token verification failed");
            match e {
                GoogleError::InvalidToken(msg) => ApiError::Unauthorized(msg),
                GoogleError::NotConfigured => {
                    ApiError::InternalServer("Google OAuth is not configured".to_string())
                }
                other => ApiError::InternalServer(other.to_string()),
            }
        })?;

    let user = upsert_user(&state.db, &identity).await?;

    let token = sign_session(&user, &state.jwt_secret).map_err(|e| {
        error!(error = %e, user_id = %user.id, "Session token signing failed");
        ApiError::InternalServer("session signing failed".to_string())
    })?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    Ok((jar.add(session_cookie(token)), Redirect::to(&state.client_origin)))
}

/// GET /api/auth/me
/// Reports whether the presented session cookie is valid, and for whom.
/// Responds with the `{authenticated, user?}` shape the client polls; never
/// an error envelope.
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    jar: CookieJar,
) -> (StatusCode, Json<serde_json::Value>) {
    let state = state_lock.read().await.clone();

    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "authenticated": false })),
        );
    };

    match decode_session(cookie.value(), &state.jwt_secret) {
        Ok(claims) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "authenticated": true,
                "user": {
                    "id": claims.sub,
                    "email": claims.email,
                    "name": claims.name,
                    "picture": claims.picture,
                },
            })),
        ),
        Err(e) => {
            debug!(error = %e, "Presented session cookie failed validation");
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "authenticated": false })),
            )
        }
    }
}

/// GET /api/auth/logout
/// Clears the session cookie; there is no server-side state to revoke.
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    info!("User logout");
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Json(serde_json::json!({ "message": "Logged out" })))
}

// ---- Helper Functions ----

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// Find or create the user for a verified Google identity, refreshing the
/// profile fields that may have changed at the provider.
async fn upsert_user(db: &SqlitePool, identity: &GoogleIdentity) -> Result<User, ApiError> {
    let existing: Option<User> = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE provider = ? AND provider_id = ?",
    )
    .bind("google")
    .bind(&identity.sub)
    .fetch_optional(db)
    .await
    .map_err(|e| {
        error!(error = %e, provider_id = %identity.sub, "Database error checking existing user");
        ApiError::DatabaseError(e)
    })?;

    match existing {
        Some(mut user) => {
            if user.name != identity.name || user.avatar != identity.picture {
                sqlx::query("UPDATE users SET name = ?, avatar = ? WHERE id = ?")
                    .bind(identity.name.as_deref())
                    .bind(identity.picture.as_deref())
                    .bind(&user.id)
                    .execute(db)
                    .await
                    .map_err(ApiError::DatabaseError)?;
                user.name = identity.name.clone();
                user.avatar = identity.picture.clone();
                debug!(user_id = %user.id, "Refreshed user profile from provider claims");
            }
            Ok(user)
        }
        None => {
            let id = generate_user_id();
            info!(
                user_id = %id,
                email = %safe_email_log(&identity.email),
                provider = "google",
                "Creating new user account via Google OAuth"
            );

            sqlx::query(
                "INSERT OR IGNORE INTO users (id, email, name, avatar, provider, provider_id) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&identity.email)
            .bind(identity.name.as_deref())
            .bind(identity.picture.as_deref())
            .bind("google")
            .bind(&identity.sub)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %id, "Database error inserting new user");
                ApiError::DatabaseError(e)
            })?;

            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
                .bind(&id)
                .fetch_one(db)
                .await
                .map_err(ApiError::DatabaseError)
        }
    }
}
