use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to validate token: {0}")]
    TokenValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,   // Subject (user id)
    pub email: String, // User email
    pub role: String,  // admin | manager | staff
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// Validates bearer tokens issued by the auth service. Token issuance lives
/// there; this service only verifies.
#[derive(Clone)]
pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = jsonwebtoken::Validation::default();
        validation.validate_exp = true;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::TokenValidationError(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_token(secret: &str, claims: &Claims) -> String {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            claims,
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtService::new("secret".to_string());
        let result = service.validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_token_with_role_claim() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "manager@test.com".to_string(),
            role: "manager".to_string(),
            exp: now + 3600,
            iat: now,
            token_type: TokenType::Access,
        };
        let token = encode_token("secret", &claims);

        let service = JwtService::new("secret".to_string());
        let validated = service.validate_token(&token).unwrap();

        assert_eq!(validated.role, "manager");
        assert_eq!(validated.token_type, TokenType::Access);
    }

    #[test]
    fn test_validate_expired_token() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "staff@test.com".to_string(),
            role: "staff".to_string(),
            exp: now - 3600,
            iat: now - 7200,
            token_type: TokenType::Access,
        };
        let token = encode_token("secret", &claims);

        let service = JwtService::new("secret".to_string());
        assert!(matches!(service.validate_token(&token), Err(JwtError::TokenExpired)));
    }
}
