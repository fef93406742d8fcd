//! Bearer token validation (HS256)
//!
//! The service only verifies tokens; issuing is the auth service's job.
//! A token is accepted when its signature checks out, its time claims are
//! valid and it carries a non-empty `sub`.

use std::time::SystemTime;

use josekit::jws::alg::hmac::HmacJwsVerifier;
use josekit::jws::HS256;
use josekit::jwt::{self, JwtPayloadValidator};
use thiserror::Error;

/// Error types for token validation
#[derive(Error, Debug)]
pub enum JwtError {
    /// The token is malformed, has a bad signature or failed claim validation
    #[error("invalid token: {0}")]
    InvalidToken(#[from] josekit::JoseError),

    /// The token carries no subject, so there is no known caller
    #[error("token has no subject")]
    MissingSubject,
}

/// Validated claims extracted from a bearer token
#[derive(Debug, Clone)]
pub struct Claims {
    /// The `sub` claim: the calling user's id
    pub subject: String,
}

/// Verifies HS256 bearer tokens against a shared secret
pub struct JwtManager {
    verifier: HmacJwsVerifier,
}

impl JwtManager {
    /// Creates a new manager from the shared secret
    ///
    /// # Errors
    ///
    /// Returns `JwtError` if the secret cannot back an HS256 verifier
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        let verifier = HS256.verifier_from_bytes(secret.as_bytes())?;
        Ok(Self { verifier })
    }

    /// Decodes and validates a token, returning its claims
    ///
    /// # Errors
    ///
    /// Returns `JwtError` if the signature or time claims are invalid, or
    /// if the token has no subject
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let (payload, _header) = jwt::decode_with_verifier(token, &self.verifier)?;

        let mut validator = JwtPayloadValidator::new();
        validator.set_base_time(SystemTime::now());
        validator.validate(&payload)?;

        let subject = payload
            .subject()
            .filter(|sub| !sub.is_empty())
            .ok_or(JwtError::MissingSubject)?
            .to_string();

        Ok(Claims { subject })
    }
}
