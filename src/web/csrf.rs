//! Synchronizer tokens for the server-rendered forms.

use subtle::ConstantTimeEq;
use tower_sessions::Session;

const CSRF_SESSION_KEY: &str = "csrf_token";

/// Generate a random token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Returns the session's token, minting one on first use.
pub async fn issue(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(token) = session.get::<String>(CSRF_SESSION_KEY).await? {
        return Ok(token);
    }

    let token = generate_token();
    session.insert(CSRF_SESSION_KEY, &token).await?;
    Ok(token)
}

pub async fn verify(
    session: &Session,
    submitted: &str,
) -> Result<bool, tower_sessions::session::Error> {
    let expected = session.get::<String>(CSRF_SESSION_KEY).await?;
    Ok(expected.is_some_and(|expected| constant_time_eq(&expected, submitted)))
}

fn constant_time_eq(expected: &str, submitted: &str) -> bool {
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}
