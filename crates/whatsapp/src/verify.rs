use thiserror::Error;

pub const SUBSCRIBE_MODE: &str = "subscribe";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("no verification token is configured")]
    NotConfigured,
    #[error("unexpected hub.mode `{0}`")]
    UnexpectedMode(String),
    #[error("hub.mode is missing")]
    MissingMode,
    #[error("hub.verify_token is missing")]
    MissingToken,
    #[error("hub.verify_token does not match")]
    TokenMismatch,
    #[error("hub.challenge is missing")]
    MissingChallenge,
}

/// Subscription handshake. Returns the challenge unchanged only for a
/// `subscribe` request carrying exactly the expected token.
pub fn verify(
    mode: Option<&str>,
    challenge: Option<&str>,
    provided_token: Option<&str>,
    expected_token: &str,
) -> Result<String, VerificationError> {
    if expected_token.is_empty() {
        return Err(VerificationError::NotConfigured);
    }

    match mode {
        Some(SUBSCRIBE_MODE) => {}
        Some(other) => return Err(VerificationError::UnexpectedMode(other.to_owned())),
        None => return Err(VerificationError::MissingMode),
    }

    match provided_token {
        Some(token) if token == expected_token => {}
        Some(_) => return Err(VerificationError::TokenMismatch),
        None => return Err(VerificationError::MissingToken),
    }

    challenge.map(str::to_owned).ok_or(VerificationError::MissingChallenge)
}
