//! `Authorization` header parsing.

use subtle::ConstantTimeEq;

use super::errors::ExtractError;

/// Scheme for JWT access tokens and refresh tokens
pub const BEARER_SCHEME: &str = "Bearer";

/// Scheme for webhook API keys
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// Exactly one space must follow the scheme. Whitespace around the token is
/// trimmed; the token itself is returned untouched.
///
/// # Errors
///
/// * `ExtractError::MissingHeader` - No header, or an empty one
/// * `ExtractError::MissingPrefix` - Value does not start with `"Bearer "`
/// * `ExtractError::EmptyToken` - Nothing but whitespace after the prefix
pub fn extract(header: Option<&str>) -> Result<&str, ExtractError> {
    extract_credential(header, BEARER_SCHEME)
}

/// Extract the key from an `Authorization: ApiKey <key>` header value
pub fn extract_api_key(header: Option<&str>) -> Result<&str, ExtractError> {
    extract_credential(header, API_KEY_SCHEME)
}

/// Compare a presented API key with the expected one in constant time
pub fn api_key_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn extract_credential<'a>(
    header: Option<&'a str>,
    scheme: &'static str,
) -> Result<&'a str, ExtractError> {
    let value = header
        .filter(|value| !value.is_empty())
        .ok_or(ExtractError::MissingHeader)?;

    let credential = value
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or(ExtractError::MissingPrefix(scheme))?
        .trim();

    if credential.is_empty() {
        return Err(ExtractError::EmptyToken);
    }

    Ok(credential)
}
