use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Validates HS256 access tokens signed with the shared application secret.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "iss")]
    _iss: String,
    #[serde(rename = "aud")]
    _aud: AudienceClaim,
    #[serde(rename = "exp")]
    _exp: u64,
}

/// Audience can be either a single string or an array of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[allow(dead_code)]
enum AudienceClaim {
    Single(String),
    Multiple(Vec<String>),
}

impl JwtValidator {
    pub fn new(secret: &str, issuer: &str, audience: &str, leeway: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway.as_secs();
        validation.validate_nbf = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        // The subject is the user id; anything else cannot own media
        let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| {
            AppError::Unauthorized("Token subject is not a valid user id".to_string())
        })?;

        Ok(AuthenticatedUser { user_id })
    }
}
