//! JWT token codec
//!
//! Access tokens carry the user id and scope list; reset tokens carry only
//! the user id and are only accepted by the password-reset confirmation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{DomainError, Role, ScopeSet};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Password-reset token lifetime
    pub reset_ttl: Duration,
    /// Issuer claim
    pub issuer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Reset,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub scope: ScopeSet,
    pub purpose: TokenPurpose,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

/// Identity and scope recovered from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub id: Uuid,
    pub scope: ScopeSet,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid authentication token")]
    Invalid,

    #[error("Token is not valid for this purpose")]
    WrongPurpose,

    #[error("Insufficient scope: missing {missing:?}")]
    InsufficientScope { missing: Vec<Role> },

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for DomainError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InsufficientScope { .. } => DomainError::Forbidden(e.to_string()),
            TokenError::Signing(msg) => DomainError::Internal(msg),
            other => DomainError::Unauthorized(other.to_string()),
        }
    }
}

/// Signs and verifies tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    config: JwtConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(config: JwtConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue an access token valid from now.
    pub fn encode(&self, id: Uuid, scope: &ScopeSet) -> Result<String, TokenError> {
        self.encode_at(id, scope, Utc::now())
    }

    /// Issue an access token as if it had been signed at `issued_at`.
    pub fn encode_at(
        &self,
        id: Uuid,
        scope: &ScopeSet,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.sign(id, scope.clone(), TokenPurpose::Access, issued_at, self.config.access_ttl)
    }

    /// Issue a single-purpose password-reset token.
    pub fn encode_reset(&self, id: Uuid) -> Result<String, TokenError> {
        self.sign(
            id,
            ScopeSet::new(),
            TokenPurpose::Reset,
            Utc::now(),
            self.config.reset_ttl,
        )
    }

    fn sign(
        &self,
        id: Uuid,
        scope: ScopeSet,
        purpose: TokenPurpose,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: id.simple().to_string(),
            scope,
            purpose,
            exp: (issued_at + ttl).timestamp(),
            iat: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify an access token and check it carries every required scope.
    pub fn decode(&self, token: &str, required: &[Role]) -> Result<DecodedToken, TokenError> {
        let claims = self.verify(token, TokenPurpose::Access)?;
        let id = parse_subject(&claims.sub)?;

        if !claims.scope.satisfies(required) {
            return Err(TokenError::InsufficientScope {
                missing: claims.scope.missing(required),
            });
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Invalid)?;

        Ok(DecodedToken {
            id,
            scope: claims.scope,
            expires_at,
        })
    }

    /// Verify a password-reset token and return the user it was issued for.
    pub fn decode_reset(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = self.verify(token, TokenPurpose::Reset)?;
        parse_subject(&claims.sub)
    }

    fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.purpose != purpose {
            return Err(TokenError::WrongPurpose);
        }
        Ok(data.claims)
    }
}

fn parse_subject(sub: &str) -> Result<Uuid, TokenError> {
    Uuid::parse_str(sub).map_err(|_| TokenError::Invalid)
}
