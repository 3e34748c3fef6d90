use anyhow::{bail, Result};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pawmart_misc::api::user::TokenResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT issuer identifier
const ISSUER: &str = "pawmart.io/pawmart/jwt-tokenizer";

/// Claims represents public claim values (as specified in RFC 7519).
/// Tokens carry identity only. Roles are deliberately absent here, they
/// are resolved from storage on every request.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    pub exp: usize,  // Required. Token expiration time (timestamp)
    pub iat: usize,  // Optional. Time at which token was issued (timestamp)
    pub iss: String, // Optional. Token issuer
    pub nbf: usize,  // Optional. Time before which token must not be accepted (timestamp)
    pub sub: String, // Optional. Subject of the token (user identifier)
}

/// Why a token was rejected. Expiration is reported separately so the
/// caller can tell the client to log in again rather than retry.
#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

/// JSON Web Token generator for creating signed tokens.
/// For more details, see: https://en.wikipedia.org/wiki/JSON_Web_Token
pub struct JwtTokenGenerator {
    key: EncodingKey, // Private key for signing
    expiry: usize,    // Token expiration time in seconds
}

impl JwtTokenGenerator {
    /// Creates a new JWT token generator that signs tokens using an RSA private key.
    ///
    /// # Arguments
    /// * `private_key` - RSA private key in PEM format
    /// * `expiry` - Token expiration time in seconds
    pub fn new(private_key: &[u8], expiry: u64) -> Result<Self> {
        let key = match EncodingKey::from_rsa_pem(private_key) {
            Ok(key) => key,
            Err(e) => bail!("parse RSA private key for jwt token generation failed: {e}"),
        };
        Ok(Self {
            key,
            expiry: expiry as usize,
        })
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let private_key = include_bytes!("testdata/private_key.pem");
        Self::new(private_key, 60).unwrap()
    }

    pub fn generate_token(&self, name: String, now: u64) -> Result<TokenResponse> {
        let now = now as usize;

        let claims = Claims {
            exp: now + self.expiry,
            iat: now,
            iss: String::from(ISSUER),
            nbf: now,
            sub: name,
        };

        // Sign the claims using RS256 algorithm
        match encode(&Header::new(Algorithm::RS256), &claims, &self.key) {
            Ok(token) => Ok(TokenResponse {
                token,
                expire_after: claims.exp as u64,
            }),
            Err(e) => bail!("generate jwt token failed: {e}"),
        }
    }
}

/// JSON Web Token validator for verifying and decoding tokens.
/// Validates token signature, expiration time, and other claims.
pub struct JwtTokenValidator {
    key: DecodingKey, // Public key for verification
}

impl JwtTokenValidator {
    /// Creates a new JWT token validator using an RSA public key.
    ///
    /// # Arguments
    /// * `public_key` - RSA public key in PEM format
    pub fn new(public_key: &[u8]) -> Result<Self> {
        let key = match DecodingKey::from_rsa_pem(public_key) {
            Ok(key) => key,
            Err(e) => bail!("parse RSA public key for jwt token validation failed: {e}"),
        };
        Ok(Self { key })
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let public_key = include_bytes!("testdata/public_key.pem");
        Self::new(public_key).unwrap()
    }

    /// Verifies the token signature and claims, returning the subject name.
    pub fn validate_token(&self, token: &str, now: u64) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[ISSUER]); // Validate issuer
        validation.set_required_spec_claims(&["exp", "iat", "iss", "nbf", "sub"]);

        // Verify token signature and decode
        let claims = match decode::<Claims>(token, &self.key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                    _ => Err(TokenError::Invalid),
                };
            }
        };

        // Verify subject is not empty
        if claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        let now = now as usize;
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        if now < claims.nbf {
            return Err(TokenError::Invalid);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_jwt() {
        let jwt_generator = JwtTokenGenerator::new_test();
        let jwt_validator = JwtTokenValidator::new_test();

        let names = ["alice", "Bob", "test_user"];

        let now = Utc::now().timestamp() as u64;
        for name in names {
            let token = jwt_generator.generate_token(name.to_string(), now).unwrap();
            assert_eq!(token.expire_after, now + 60);

            let sub = jwt_validator.validate_token(&token.token, now).unwrap();
            assert_eq!(sub, name);
        }
    }

    #[test]
    fn test_jwt_expired() {
        let jwt_generator = JwtTokenGenerator::new_test();
        let jwt_validator = JwtTokenValidator::new_test();

        let now = Utc::now().timestamp() as u64;
        let token = jwt_generator
            .generate_token(String::from("alice"), now)
            .unwrap();

        // Expiry is 60 secs, so 80 secs later the token is dead.
        let result = jwt_validator.validate_token(&token.token, now + 80);
        assert_eq!(result, Err(TokenError::Expired));

        // A token minted far in the past fails inside the decoder too.
        let token = jwt_generator
            .generate_token(String::from("alice"), now - 10000)
            .unwrap();
        let result = jwt_validator.validate_token(&token.token, now);
        assert_eq!(result, Err(TokenError::Expired));
    }

    #[test]
    fn test_jwt_invalid() {
        let jwt_generator = JwtTokenGenerator::new_test();
        let jwt_validator = JwtTokenValidator::new_test();

        let now = Utc::now().timestamp() as u64;

        let result = jwt_validator.validate_token("not-a-token", now);
        assert_eq!(result, Err(TokenError::Invalid));

        let result = jwt_validator.validate_token("", now);
        assert_eq!(result, Err(TokenError::Invalid));

        // Tampered signature
        let token = jwt_generator
            .generate_token(String::from("alice"), now)
            .unwrap();
        let tampered = format!("{}xx", token.token);
        let result = jwt_validator.validate_token(&tampered, now);
        assert_eq!(result, Err(TokenError::Invalid));

        // Token signed with a different private key
        let other_key = include_bytes!("testdata/private_key2.pem");
        let other_generator = JwtTokenGenerator::new(other_key, 60).unwrap();
        let token = other_generator
            .generate_token(String::from("alice"), now)
            .unwrap();
        let result = jwt_validator.validate_token(&token.token, now);
        assert_eq!(result, Err(TokenError::Invalid));
    }
}
