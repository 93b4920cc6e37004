//! Tests for auth module
//!
//! These tests verify the session token lifecycle:
//! - Sign/decode round-trip preserves the identity
//! - Tampered and wrong-secret tokens are rejected
//! - Expired tokens are rejected
//! - The expiry is the fixed 7-day window

#[cfg(test)]
mod tests {
    use super::super::models::{
        decode_session, sign_session, Claims, User, SESSION_TTL_DAYS,
    };
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    fn sample_user() -> User {
        User {
            id: "U_K7NP3X".to_string(),
            email: "test@example.com".to_string(),
            name: Some("Test User".to_string()),
            avatar: Some("https://lh3.googleusercontent.com/a/photo.jpg".to_string()),
            provider: Some("google".to_string()),
            provider_id: Some("1234567890".to_string()),
            created_at: Some("2024-01-01 00:00:00".to_string()),
        }
    }

    #[test]
    fn test_session_round_trip() {
        let user = sample_user();
        let token = sign_session(&user, "test_secret_key").expect("Failed to sign token");

        let claims = decode_session(&token, "test_secret_key").expect("Failed to decode token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.picture, user.avatar);
    }

    #[test]
    fn test_session_expiry_is_seven_days() {
        let token = sign_session(&sample_user(), "test_secret_key").unwrap();
        let claims = decode_session(&token, "test_secret_key").unwrap();

        let expected = (Utc::now() + Duration::days(SESSION_TTL_DAYS)).timestamp() as usize;
        // Allow a minute of slack for the time between sign and assert
        assert!(claims.exp <= expected + 60 && claims.exp >= expected - 60);
    }

    #[test]
    fn test_validation_fails_with_wrong_secret() {
        let token = sign_session(&sample_user(), "test_secret_key").unwrap();

        assert!(
            decode_session(&token, "wrong_secret_key").is_err(),
            "Token validation should fail with wrong secret"
        );
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = sign_session(&sample_user(), "test_secret_key").unwrap();

        // Corrupt the signature segment
        let tampered = format!("{}AAAA", &token[..token.len() - 4]);

        assert!(
            decode_session(&tampered, "test_secret_key").is_err(),
            "Tampered token should fail validation"
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        // Backdate the expiry well past jsonwebtoken's default leeway
        let claims = Claims {
            sub: "U_K7NP3X".to_string(),
            email: "test@example.com".to_string(),
            name: None,
            picture: None,
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .unwrap();

        assert!(
            decode_session(&token, "test_secret_key").is_err(),
            "Expired token should fail validation"
        );
    }

    #[test]
    fn test_user_model_structure() {
        let user = sample_user();

        assert_eq!(user.id, "U_K7NP3X");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.provider, Some("google".to_string()));
    }
}
