//! # Bearer Token Verification
//!
//! Callers authenticate with a JWT issued by the user service and signed
//! with its RSA private key. The ledger writer only holds the public half
//! and accepts RS256 exclusively; a token signed with any other algorithm
//! is rejected even if it would otherwise decode.

use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{BEARER_PREFIX, TOKEN_ALGORITHM};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A token failed verification.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("unsupported signature algorithm, only RS256 is accepted")]
    UnsupportedAlgorithm,

    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// The verifier's public key could not be loaded.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to read public key {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RSA public key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Claims carried by tokens from the user service.
///
/// Only `acct` is read. Time-based claims are checked by `jsonwebtoken`
/// during decoding and every other claim is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Authenticated account number. A non-string value counts as absent.
    #[serde(default, deserialize_with = "string_or_none")]
    pub acct: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
}

impl Claims {
    /// The authenticated account, or an empty string if the claim is absent.
    pub fn account(&self) -> &str {
        self.acct.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

/// Something that turns a raw bearer token into verified claims.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Verifies signature and time-based claims, returning the payload.
    fn verify(&self, token: &str) -> Result<Claims, VerificationError>;
}

/// RS256 verifier backed by the user service's public key.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Builds a verifier from a PEM-encoded RSA public key.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, KeyError> {
        let key = DecodingKey::from_rsa_pem(pem)?;

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // `exp` and `nbf` are checked when present but not required.
        validation.set_required_spec_claims::<&str>(&[]);
        validation.validate_nbf = true;
        validation.leeway = 0;

        Ok(Self { key, validation })
    }

    /// Reads the PEM public key at `path`.
    pub fn from_file(path: &Path) -> Result<Self, KeyError> {
        let pem = std::fs::read(path).map_err(|source| KeyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rsa_pem(&pem)
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Removes a leading `"Bearer "` from an `Authorization` header value.
///
/// Values without the prefix are returned unchanged.
pub fn strip_bearer(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};

    const PRIVATE_KEY: &[u8] = include_bytes!("../tests/fixtures/jwtRS256.key");
    const PUBLIC_KEY: &[u8] = include_bytes!("../tests/fixtures/jwtRS256.key.pub");
    const OTHER_PRIVATE_KEY: &[u8] = include_bytes!("../tests/fixtures/other.key");

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn sign(key: &[u8], claims: &Value) -> String {
        let key = EncodingKey::from_rsa_pem(key).unwrap();
        encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
    }

    fn alice_claims() -> Value {
        json!({
            "acct": "1011226111",
            "user": "testuser",
            "name": "Test User",
            "iat": now(),
            "exp": now() + 3600,
        })
    }

    fn with(mut claims: Value, key: &str, value: Value) -> Value {
        claims[key] = value;
        claims
    }

    fn without(mut claims: Value, key: &str) -> Value {
        if let Some(map) = claims.as_object_mut() {
            map.remove(key);
        }
        claims
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::from_rsa_pem(PUBLIC_KEY).unwrap()
    }

    #[test]
    fn accepts_token_signed_by_user_service_key() {
        let token = sign(PRIVATE_KEY, &alice_claims());
        let claims = verifier().verify(&token).unwrap();
        assert_eq!(claims.account(), "1011226111");
    }

    #[test]
    fn accepts_token_without_expiry() {
        let token = sign(PRIVATE_KEY, &without(alice_claims(), "exp"));
        assert!(verifier().verify(&token).is_ok());
    }

    #[test]
    fn missing_account_claim_yields_empty_account() {
        let token = sign(PRIVATE_KEY, &without(alice_claims(), "acct"));
        assert_eq!(verifier().verify(&token).unwrap().account(), "");
    }

    #[test]
    fn non_string_account_claim_yields_empty_account() {
        for acct in [json!(1011226111_u64), json!(null), json!(["1011226111"])] {
            let token = sign(PRIVATE_KEY, &with(alice_claims(), "acct", acct));
            assert_eq!(verifier().verify(&token).unwrap().account(), "");
        }
    }

    #[test]
    fn unused_claims_of_any_type_are_ignored() {
        let claims = with(alice_claims(), "name", json!(42));
        let claims = with(claims, "user", json!({ "nested": true }));
        let token = sign(PRIVATE_KEY, &claims);
        assert_eq!(verifier().verify(&token).unwrap().account(), "1011226111");
    }

    #[test]
    fn rejects_token_signed_by_another_key() {
        let token = sign(OTHER_PRIVATE_KEY, &alice_claims());
        assert!(matches!(
            verifier().verify(&token),
            Err(VerificationError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let claims = with(alice_claims(), "iat", json!(now() - 7200));
        let token = sign(PRIVATE_KEY, &with(claims, "exp", json!(now() - 3600)));
        assert!(matches!(
            verifier().verify(&token),
            Err(VerificationError::Expired)
        ));
    }

    #[test]
    fn rejects_token_expired_seconds_ago() {
        let token = sign(PRIVATE_KEY, &with(alice_claims(), "exp", json!(now() - 5)));
        assert!(matches!(
            verifier().verify(&token),
            Err(VerificationError::Expired)
        ));
    }

    #[test]
    fn rejects_token_used_before_not_before() {
        let token = sign(PRIVATE_KEY, &with(alice_claims(), "nbf", json!(now() + 300)));
        assert!(matches!(
            verifier().verify(&token),
            Err(VerificationError::NotYetValid)
        ));
    }

    #[test]
    fn accepts_token_past_not_before() {
        let token = sign(PRIVATE_KEY, &with(alice_claims(), "nbf", json!(now() - 5)));
        assert!(verifier().verify(&token).is_ok());
    }

    #[test]
    fn rejects_hmac_signed_token() {
        let key = EncodingKey::from_secret(b"shared-secret");
        let token = encode(&Header::new(Algorithm::HS256), &alice_claims(), &key).unwrap();
        assert!(matches!(
            verifier().verify(&token),
            Err(VerificationError::UnsupportedAlgorithm)
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            verifier().verify("not.a.jwt"),
            Err(VerificationError::Malformed(_))
        ));
        assert!(verifier().verify("").is_err());
    }

    #[test]
    fn rejects_non_pem_key_material() {
        assert!(matches!(
            JwtVerifier::from_rsa_pem(b"definitely not a key"),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[test]
    fn reports_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pub");
        let err = JwtVerifier::from_file(&path).unwrap_err();
        assert!(matches!(err, KeyError::Read { .. }));
        assert!(err.to_string().contains("missing.pub"));
    }

    #[test]
    fn loads_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwtRS256.key.pub");
        std::fs::write(&path, PUBLIC_KEY).unwrap();
        let token = sign(PRIVATE_KEY, &alice_claims());
        assert!(JwtVerifier::from_file(&path).unwrap().verify(&token).is_ok());
    }

    #[test]
    fn strips_bearer_prefix_only_once() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("Bearer Bearer x"), "Bearer x");
        assert_eq!(strip_bearer("bearer abc"), "bearer abc");
    }
}
