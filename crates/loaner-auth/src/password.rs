//! Account-holder password verification (Argon2id).

use std::borrow::Cow;

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// The bytes actually fed to Argon2: the pepper, if any, followed by the
/// password. Must match what the credential store hashed.
fn peppered<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, [u8]> {
    match pepper {
        Some(p) => Cow::Owned(format!("{p}{password}").into_bytes()),
        None => Cow::Borrowed(password.as_bytes()),
    }
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(&peppered(password, pepper), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// Like [`verify_password`], but a mismatch is an
/// [`AuthError::InvalidCredentials`] error.
pub fn require_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<(), AuthError> {
    if verify_password(password, hash, pepper)? {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
