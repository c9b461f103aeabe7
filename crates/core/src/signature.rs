//! `X-Hub-Signature-256` payload signatures (HMAC-SHA256 over the raw body).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("payload signature header is missing")]
    Missing,
    #[error("payload signature header is malformed")]
    Malformed,
    #[error("payload signature does not match")]
    Mismatch,
}

/// Signs `payload` the same way the provider does, returning the header value.
pub fn sign(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    format!("{SIGNATURE_PREFIX}{}", encode_hex(mac.finalize().into_bytes().as_slice()))
}

pub fn verify(secret: &[u8], payload: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
    let header =
        header.map(str::trim).filter(|value| !value.is_empty()).ok_or(SignatureError::Missing)?;
    let digest = header
        .strip_prefix(SIGNATURE_PREFIX)
        .and_then(decode_hex)
        .ok_or(SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)?;
    mac.update(payload);
    mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    if raw.len() % 2 != 0 || !raw.is_ascii() {
        return None;
    }

    (0..raw.len())
        .step_by(2)
        .map(|index| u8::from_str_radix(&raw[index..index + 2], 16).ok())
        .collect()
}
