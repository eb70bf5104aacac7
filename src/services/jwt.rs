use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Role code carried by super admins.
pub const SUPER_ADMIN_ROLE: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Admin ID
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtService;

impl JwtService {
    /// Tokens are issued by the platform's auth service; this side only verifies.
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_with_secret(token, &crate::config::Config::jwt_secret())
    }

    pub fn verify_with_secret(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    #[cfg(test)]
    pub fn issue_for_test(admin_id: &str, role: &str, secret: &str) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: admin_id.to_string(),
            email: format!("{}@nritya.co.in", admin_id),
            role: role.to_string(),
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_tokens_only() {
        let token = JwtService::issue_for_test("a1", SUPER_ADMIN_ROLE, "s3cret");

        let claims = JwtService::verify_with_secret(&token, "s3cret").expect("claims");
        assert_eq!(claims.sub, "a1");
        assert_eq!(claims.role, SUPER_ADMIN_ROLE);

        assert!(JwtService::verify_with_secret(&token, "other").is_err());
    }
}
