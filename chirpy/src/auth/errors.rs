//! Authentication error types.

use thiserror::Error;

/// The salt entropy source failed while hashing a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Password hashing failed")]
pub struct HashingFailure;

/// A candidate password did not match the stored credential.
///
/// Wrong passwords and unparseable hashes produce the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid password")]
pub struct MismatchError;

/// The operating system random source could not produce a refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Secure random source unavailable")]
pub struct EntropySourceFailure;

/// Access token failures
///
/// Every variant is reported to clients as the same unauthorized outcome;
/// the kind only survives into logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a decodable JWT, wrong issuer, or a subject that is not a user ID
    #[error("Malformed token")]
    Malformed,

    /// Signature mismatch or a header algorithm other than HS256
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// `exp` is in the past
    #[error("Token expired")]
    Expired,

    /// One of `sub`, `iat`, `exp` or `iss` is absent
    #[error("Required token claim missing")]
    ClaimMissing,
}

impl TokenError {
    /// Short label for logs and metric dimensions
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Expired => "expired",
            TokenError::ClaimMissing => "claim_missing",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingAlgorithm => TokenError::SignatureInvalid,
            ErrorKind::MissingRequiredClaim(_) => TokenError::ClaimMissing,
            _ => TokenError::Malformed,
        }
    }
}

/// `Authorization` header parsing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Header absent or empty
    #[error("missing Authorization header")]
    MissingHeader,

    /// Header does not start with `<scheme> `
    #[error("invalid Authorization header: missing {0} prefix")]
    MissingPrefix(&'static str),

    /// Only whitespace follows the scheme
    #[error("invalid Authorization header: empty token")]
    EmptyToken,
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::MissingHeader => "missing_header",
            ExtractError::MissingPrefix(_) => "missing_prefix",
            ExtractError::EmptyToken => "empty_token",
        }
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error(transparent)]
    Hashing(#[from] HashingFailure),

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already exists
    #[error("Email already exists")]
    EmailTaken,

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected before hashing
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Access token rejected
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Authorization header rejected
    #[error(transparent)]
    Header(#[from] ExtractError),

    /// Random source failure while issuing a refresh token
    #[error(transparent)]
    Entropy(#[from] EntropySourceFailure),

    /// Refresh token was never issued
    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    /// Refresh token is past its expiry
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// Refresh token was revoked
    #[error("Refresh token revoked")]
    RefreshTokenRevoked,

    /// Blocking hash task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<MismatchError> for AuthError {
    fn from(_: MismatchError) -> Self {
        AuthError::InvalidPassword
    }
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Login failures collapse into one message so that a caller cannot tell
    /// an unknown email from a wrong password, and token failures never reveal
    /// which check rejected them.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_)
            | AuthError::Hashing(_)
            | AuthError::Entropy(_)
            | AuthError::Task(_) => "Internal server error".to_string(),
            AuthError::InvalidPassword | AuthError::UserNotFound => {
                "Incorrect email or password".to_string()
            }
            AuthError::Token(_) => "Expired or invalid jwt token".to_string(),
            AuthError::RefreshTokenNotFound
            | AuthError::RefreshTokenExpired
            | AuthError::RefreshTokenRevoked => "Invalid or expired refresh token".to_string(),
            _ => self.to_string(),
        }
    }

    /// Short label for logs and metric dimensions
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Database(_) => "database",
            AuthError::Hashing(_) => "hashing",
            AuthError::InvalidPassword => "invalid_password",
            AuthError::UserNotFound => "user_not_found",
            AuthError::EmailTaken => "email_taken",
            AuthError::InvalidEmail(_) => "invalid_email",
            AuthError::WeakPassword(_) => "weak_password",
            AuthError::Token(e) => e.kind(),
            AuthError::Header(e) => e.kind(),
            AuthError::Entropy(_) => "entropy",
            AuthError::RefreshTokenNotFound => "refresh_not_found",
            AuthError::RefreshTokenExpired => "refresh_expired",
            AuthError::RefreshTokenRevoked => "refresh_revoked",
            AuthError::Task(_) => "task",
        }
    }

    /// Whether the failure is the server's fault rather than the caller's
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Database(_)
                | AuthError::Hashing(_)
                | AuthError::Entropy(_)
                | AuthError::Task(_)
        )
    }

    /// Whether a refresh token is unusable for renewal
    pub fn is_invalid_refresh_token(&self) -> bool {
        matches!(
            self,
            AuthError::RefreshTokenNotFound
                | AuthError::RefreshTokenExpired
                | AuthError::RefreshTokenRevoked
        )
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_messages() {
        assert_eq!(
            ExtractError::MissingHeader.to_string(),
            "missing Authorization header"
        );
        assert_eq!(
            ExtractError::MissingPrefix("Bearer").to_string(),
            "invalid Authorization header: missing Bearer prefix"
        );
        assert_eq!(
            ExtractError::EmptyToken.to_string(),
            "invalid Authorization header: empty token"
        );
    }

    #[test]
    fn test_client_message_hides_token_kind() {
        let expired = AuthError::from(TokenError::Expired);
        let forged = AuthError::from(TokenError::SignatureInvalid);
        assert_eq!(expired.client_message(), forged.client_message());
    }

    #[test]
    fn test_client_message_hides_account_existence() {
        assert_eq!(
            AuthError::UserNotFound.client_message(),
            AuthError::from(MismatchError).client_message()
        );
    }

    #[test]
    fn test_internal_classification() {
        assert!(AuthError::from(EntropySourceFailure).is_internal());
        assert!(AuthError::from(HashingFailure).is_internal());
        assert!(!AuthError::RefreshTokenRevoked.is_internal());
        assert!(AuthError::RefreshTokenRevoked.is_invalid_refresh_token());
    }

    #[test]
    fn test_auth_error_kind_passes_through() {
        assert_eq!(AuthError::from(TokenError::Expired).kind(), "expired");
        assert_eq!(
            AuthError::from(ExtractError::MissingHeader).kind(),
            "missing_header"
        );
    }

    #[test]
    fn test_token_error_kinds_are_distinct() {
        let kinds = [
            TokenError::Malformed.kind(),
            TokenError::SignatureInvalid.kind(),
            TokenError::Expired.kind(),
            TokenError::ClaimMissing.kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
