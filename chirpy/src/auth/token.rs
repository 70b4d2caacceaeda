//! HS256 JWT access tokens.
//!
//! Tokens carry exactly four claims: `sub` (user UUID), `iat`, `exp` and
//! `iss`. Validation pins the algorithm to HS256, so a token whose header
//! names any other algorithm is rejected before its signature is checked.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{errors::TokenError, models::UserId};

/// Issuer label written into and required from every token
pub const ISSUER: &str = "chirpy";

/// Signing algorithm for access tokens
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims for access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String, // User ID
    pub iat: i64,    // Issued at timestamp
    pub exp: i64,    // Expiration timestamp
    pub iss: String,
}

impl AccessTokenClaims {
    pub fn new(subject: UserId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            iss: ISSUER.to_string(),
        }
    }
}

/// Claims as they appear on the wire, before required-field checks
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
    iss: Option<String>,
}

impl TryFrom<RawClaims> for AccessTokenClaims {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            sub: raw.sub.ok_or(TokenError::ClaimMissing)?,
            iat: raw.iat.ok_or(TokenError::ClaimMissing)?,
            exp: raw.exp.ok_or(TokenError::ClaimMissing)?,
            iss: raw.iss.ok_or(TokenError::ClaimMissing)?,
        })
    }
}

/// Mint an access token for `subject` valid for `ttl` from now
pub fn mint(subject: UserId, secret: &[u8], ttl: Duration) -> Result<String, TokenError> {
    mint_at(subject, secret, ttl, Utc::now())
}

/// Mint an access token with an explicit issue time
///
/// Output is fully determined by the arguments.
pub fn mint_at(
    subject: UserId,
    secret: &[u8],
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = AccessTokenClaims::new(subject, issued_at, ttl);

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| TokenError::Malformed)
}

/// Decode and check an access token, returning its claims
///
/// # Errors
///
/// * `TokenError::SignatureInvalid` - Wrong key, tampered token or non-HS256 header
/// * `TokenError::Expired` - `exp` has passed (no leeway)
/// * `TokenError::ClaimMissing` - A required claim is absent
/// * `TokenError::Malformed` - Anything else, including a foreign issuer
pub fn decode_claims(token: &str, secret: &[u8]) -> Result<AccessTokenClaims, TokenError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let data = decode::<RawClaims>(token, &DecodingKey::from_secret(secret), &validation)?;
    AccessTokenClaims::try_from(data.claims)
}

/// Validate an access token and return the user it was issued to
pub fn validate(token: &str, secret: &[u8]) -> Result<UserId, TokenError> {
    let claims = decode_claims(token, secret)?;
    Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)
}
