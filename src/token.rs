// Short-lived ES256 access tokens for the reporting API.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::TokenError;

/// Audience every reporting API token must carry.
pub const AUDIENCE: &str = "appstoreconnect-v1";

/// Default token lifetime in seconds.
pub const DEFAULT_TTL_SECS: i64 = 600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub exp: i64,
    pub aud: String,
}

/// Signs bearer tokens with the account's `.p8` private key.
pub struct TokenSigner {
    key_id: String,
    issuer_id: String,
    key: EncodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key_id", &self.key_id)
            .field("issuer_id", &self.issuer_id)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Builds a signer from PKCS#8 PEM text.
    pub fn from_pem(
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        pem: &[u8],
    ) -> Result<Self, TokenError> {
        let key = EncodingKey::from_ec_pem(pem).map_err(TokenError::InvalidKey)?;
        Ok(Self {
            key_id: key_id.into(),
            issuer_id: issuer_id.into(),
            key,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        })
    }

    /// Builds a signer from a `.p8` file.
    pub fn from_file(
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        path: &Path,
    ) -> Result<Self, TokenError> {
        let pem = fs::read(path).map_err(|source| TokenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(key_id, issuer_id, &pem)
    }

    pub fn with_ttl(mut self, secs: i64) -> Self {
        self.ttl = Duration::seconds(secs);
        self
    }

    /// Signs a token valid from now for the configured lifetime.
    pub fn sign(&self) -> Result<String, TokenError> {
        self.sign_at(Utc::now())
    }

    pub fn sign_at(&self, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());
        header.typ = Some("JWT".to_string());

        let claims = Claims {
            iss: self.issuer_id.clone(),
            exp: (now + self.ttl).timestamp(),
            aud: AUDIENCE.to_string(),
        };
        encode(&header, &claims, &self.key).map_err(TokenError::Sign)
    }
}
