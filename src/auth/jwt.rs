use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime, shared by the JWT `exp` and the cookie Max-Age.
pub const SESSION_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, role: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.to_string(),
            role: role.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_DAYS)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-that-is-long-enough";

    #[test]
    fn claims_survive_signing() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "ana@imagen.bo", "ventas", "Ana");
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.email, "ana@imagen.bo");
        assert_eq!(decoded.role, "ventas");
        assert_eq!(decoded.name, "Ana");
        assert_eq!(decoded.exp - decoded.iat, SESSION_DAYS * 24 * 3600);
    }

    #[test]
    fn wrong_secret_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "a@b.c", "admin", "A");
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "another-secret-that-is-long-enough").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "a@b.c", "admin", "A");
        claims.iat -= 10 * 24 * 3600;
        claims.exp = claims.iat + 3600;
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }
}
