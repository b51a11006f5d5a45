//! Credential extraction for the `Basic` authorization scheme.
//!
//! The pipeline is split into three steps so that each can be reused (and
//! tested) on its own:
//!
//! 1. [`extract_base64_authorization_header`] strips the `Basic ` prefix,
//! 2. [`decode_base64_authorization_header`] decodes the base64 payload,
//! 3. [`extract_user_credentials`] splits `identifier:secret` on the first
//!    colon.
//!
//! Every step returns `None` rather than an error when its input is missing
//! or malformed.

use base64::{engine::general_purpose::STANDARD, Engine as _};

const BASIC_PREFIX: &str = "Basic ";

/// An identifier and secret pair taken from a request.
///
/// Credentials only live for the duration of a request and are never
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The identifier, e.g. an email address.
    pub identifier: String,

    /// The plaintext secret.
    pub secret: String,
}

// Implemented by hand so the secret never ends up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Returns the base64 token following `"Basic "` in an authorization header.
///
/// The keyword is case-sensitive and must be followed by exactly one space.
/// A header of just `"Basic "` yields an empty token rather than `None`.
pub fn extract_base64_authorization_header(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix(BASIC_PREFIX)
}

/// Decodes a base64 token into UTF-8 text.
///
/// Returns `None` on invalid base64 or when the decoded bytes aren't UTF-8.
pub fn decode_base64_authorization_header(token: Option<&str>) -> Option<String> {
    let bytes = STANDARD.decode(token?).ok()?;
    String::from_utf8(bytes).ok()
}

/// Splits decoded `identifier:secret` text at its first colon.
///
/// Either side may be empty, but text without any colon yields `None`.
pub fn extract_user_credentials(decoded: Option<&str>) -> Option<Credentials> {
    let (identifier, secret) = decoded.filter(|s| !s.is_empty())?.split_once(':')?;

    Some(Credentials {
        identifier: identifier.to_owned(),
        secret: secret.to_owned(),
    })
}

/// Runs the full extraction pipeline over an authorization header value.
pub fn credentials_from_header(header: Option<&str>) -> Option<Credentials> {
    let token = extract_base64_authorization_header(header);
    let decoded = decode_base64_authorization_header(token)?;
    extract_user_credentials(Some(&decoded))
}
