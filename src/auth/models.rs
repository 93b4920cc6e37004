//! Authentication data models and session token helpers

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name of the session cookie held by the browser.
pub const SESSION_COOKIE: &str = "token";

/// Sessions expire after 7 days; there is no server-side revocation.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Claims embedded in the signed session token. The token is stateless and
/// carries the full identity, so request handling never touches the users
/// table.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// Internal user id (not the provider subject).
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub created_at: Option<String>,
}

/// Sign a session token for the given user with the fixed 7-day expiry.
pub fn sign_session(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::days(SESSION_TTL_DAYS)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        picture: user.avatar.clone(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and verify a presented session token (signature and expiry).
pub fn decode_session(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}
