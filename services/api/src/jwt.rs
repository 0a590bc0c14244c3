//! Session credential issuance and verification
//!
//! Mints the locally-issued session credential after a successful identity
//! exchange and verifies it on protected routes. Tokens are HS256-signed,
//! carry the verified subject and display name, and expire one hour after
//! issuance. The server keeps no session table: validity is entirely a
//! function of the signed contents and the current time.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Fixed session credential lifetime.
const TOKEN_TTL_SECS: u64 = 3600;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric signing key
    pub secret: String,
    /// Value stamped into and required from the `iss` claim
    pub issuer: String,
    /// Value stamped into and required from the `aud` claim
    pub audience: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: symmetric signing key
    /// - `JWT_ISSUER`: issuer claim
    /// - `JWT_AUDIENCE`: audience claim
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;
        let issuer = std::env::var("JWT_ISSUER")
            .map_err(|_| anyhow::anyhow!("JWT_ISSUER environment variable not set"))?;
        let audience = std::env::var("JWT_AUDIENCE")
            .map_err(|_| anyhow::anyhow!("JWT_AUDIENCE environment variable not set"))?;

        Ok(JwtConfig {
            secret,
            issuer,
            audience,
        })
    }
}

/// Session credential claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Verified subject identifier (the external email)
    pub sub: String,
    /// Display name, possibly empty
    pub name: String,
    /// Unique token identifier
    pub jti: Uuid,
    pub iss: String,
    pub aud: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Session token service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new session token service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        // No clock-skew window: an expired token is rejected immediately.
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a session credential for a verified identity
    pub fn issue(&self, subject: &str, display_name: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: subject.to_string(),
            name: display_name.to_string(),
            jti: Uuid::new_v4(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            issuer: "catalog-api".to_string(),
            audience: "catalog-web".to_string(),
        }
    }

    fn expired_claims(now: u64) -> Claims {
        Claims {
            sub: "user@example.com".to_string(),
            name: String::new(),
            jti: Uuid::new_v4(),
            iss: "catalog-api".to_string(),
            aud: "catalog-web".to_string(),
            iat: now - 7200,
            exp: now - 60,
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let service = JwtService::new(test_config());
        let token = service.issue("user@example.com", "Example User").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.name, "Example User");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn empty_display_name_is_preserved() {
        let service = JwtService::new(test_config());
        let token = service.issue("user@example.com", "").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.name, "");
    }

    #[test]
    fn token_identifiers_are_unique() {
        let service = JwtService::new(test_config());
        let first = service
            .verify(&service.issue("user@example.com", "").unwrap())
            .unwrap();
        let second = service
            .verify(&service.issue("user@example.com", "").unwrap())
            .unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = JwtService::new(test_config());
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &expired_claims(now),
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn issuer_and_audience_must_match() {
        let service = JwtService::new(test_config());
        let token = service.issue("user@example.com", "").unwrap();

        let mut other = test_config();
        other.audience = "another-app".to_string();
        assert!(JwtService::new(other).verify(&token).is_err());

        let mut other = test_config();
        other.issuer = "another-issuer".to_string();
        assert!(JwtService::new(other).verify(&token).is_err());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let service = JwtService::new(test_config());
        let mut foreign = test_config();
        foreign.secret = "some-other-key".to_string();

        let token = JwtService::new(foreign)
            .issue("user@example.com", "")
            .unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    #[serial]
    fn config_requires_every_variable() {
        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::set_var("JWT_ISSUER", "catalog-api");
            std::env::set_var("JWT_AUDIENCE", "catalog-web");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::set_var("JWT_SECRET", "test-secret-key");
        }
        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.issuer, "catalog-api");

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_ISSUER");
            std::env::remove_var("JWT_AUDIENCE");
        }
    }
}
