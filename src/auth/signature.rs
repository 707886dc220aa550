//! Request signature generation for Bybit API authentication.
//!
//! Bybit private endpoints require a signature computed over:
//! ```text
//! timestamp + api_key + recv_window + payload
//! ```
//!
//! The prefix is always UTF-8 text. The payload is the query string for GET
//! requests, the JSON body for POST requests, or the raw multipart body for
//! file uploads. Two schemes are accepted:
//!
//! - HMAC-SHA256 keyed with the API secret, sent as lowercase hex
//! - RSA PKCS#1 v1.5 over SHA-256 with the private key, sent as base64

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::auth::{Credentials, SigningKey};
use crate::error::P2pError;

type HmacSha256 = Hmac<Sha256>;

/// Sign `message` with the given key.
///
/// Returns 64 lowercase hex characters for HMAC keys, or base64 for RSA keys.
/// Both schemes are deterministic.
pub fn sign(key: &SigningKey, message: &[u8]) -> Result<String, P2pError> {
    match key {
        SigningKey::Hmac(secret) => sign_hmac(secret.expose_secret(), message),
        SigningKey::Rsa(private_key) => sign_rsa(private_key, message),
    }
}

/// HMAC-SHA256 of `message` keyed by `secret`, hex encoded.
pub fn sign_hmac(secret: &str, message: &[u8]) -> Result<String, P2pError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| P2pError::Auth(format!("Invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// RSA PKCS#1 v1.5 signature over the SHA-256 digest of `message`, base64 encoded.
pub fn sign_rsa(private_key: &RsaPrivateKey, message: &[u8]) -> Result<String, P2pError> {
    let digest = Sha256::digest(message);
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| P2pError::Auth(format!("RSA signing failed: {e}")))?;
    Ok(BASE64.encode(signature))
}

/// Assemble the bytes that get signed for one request.
pub fn signable_bytes(api_key: &str, timestamp: u64, recv_window: u64, payload: &[u8]) -> Vec<u8> {
    let prefix = format!("{timestamp}{api_key}{recv_window}");
    let mut message = Vec::with_capacity(prefix.len() + payload.len());
    message.extend_from_slice(prefix.as_bytes());
    message.extend_from_slice(payload);
    message
}

/// Sign a request payload for Bybit's private API.
///
/// # Example
///
/// ```rust
/// use bybit_p2p::auth::{Credentials, sign_request};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::hmac("api_key", "api_secret");
/// let signature = sign_request(&credentials, 1_700_000_000_000, 5000, b"accountType=FUND")?;
/// assert_eq!(signature.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn sign_request(
    credentials: &Credentials,
    timestamp: u64,
    recv_window: u64,
    payload: &[u8],
) -> Result<String, P2pError> {
    let message = signable_bytes(&credentials.api_key, timestamp, recv_window, payload);
    sign(credentials.signing_key(), &message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::tests::{TEST_RSA_PKCS1_PEM, TEST_RSA_PKCS8_PEM};

    #[test]
    fn test_hmac_known_vector() {
        let signature = sign_hmac("secret", b"some_string").unwrap();
        assert_eq!(
            signature,
            "5cd6439f108902462e5bed4ed06def900159f85d6a3f0caae04623a56de6e23c"
        );
    }

    #[test]
    fn test_hmac_is_fixed_length_lowercase_hex() {
        for input in ["", "a", "accountType=FUND&coin=USDT"] {
            let signature = sign_hmac("secret", input.as_bytes()).unwrap();
            assert_eq!(signature.len(), 64);
            assert!(signature.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_rsa_known_vector() {
        let key = SigningKey::rsa_from_pem(TEST_RSA_PKCS1_PEM).unwrap();
        let signature = sign(&key, b"some_string").unwrap();
        assert_eq!(
            signature,
            "X4H/P5/oE17JYauwtGIg1FXmsRfYTccQakIyGSFyL3gvrat4nuDiOKaCtb1dJvu04pqv6Xp25/jNg85PNP+sasvM6iPsuH7r2AuLxC+ZrYzl4Y/SsxfzaoONL0s0b3oXkkmRnY5980BBW1VxTYNNMwD6Hdq+tcGWhO+7U4mWQGk="
        );
    }

    #[test]
    fn test_rsa_is_deterministic_across_encodings() {
        let pkcs1 = SigningKey::rsa_from_pem(TEST_RSA_PKCS1_PEM).unwrap();
        let pkcs8 = SigningKey::rsa_from_pem(TEST_RSA_PKCS8_PEM).unwrap();
        let sig1 = sign(&pkcs1, b"payload").unwrap();
        let sig2 = sign(&pkcs8, b"payload").unwrap();
        assert_eq!(sig1, sig2);
        assert!(BASE64.decode(&sig1).is_ok());
    }

    #[test]
    fn test_sign_request_hmac_get_payload() {
        let credentials = Credentials::hmac("test-key", "test-secret");
        let signature =
            sign_request(&credentials, 1_700_000_000_000, 5000, b"accountType=FUND").unwrap();
        assert_eq!(
            signature,
            "e3855a213b36ce32aefa3ba74449521a021b677172188772ee655ae0ffd80f77"
        );
    }

    #[test]
    fn test_sign_request_rsa_get_payload() {
        let credentials = Credentials::rsa("test-key", TEST_RSA_PKCS1_PEM).unwrap();
        let signature =
            sign_request(&credentials, 1_700_000_000_000, 5000, b"accountType=FUND").unwrap();
        assert_eq!(
            signature,
            "jMAtbrAX3LrTWeEaAMw7nmTZTFopvx/UhmV7KoLE9X9FxZVkQc1j0KbztdfY+DKAzLIQuRF7UoH4vVpccDGab14ps0C7XX9D04knlO1lZx+Xio5TDXsNPpDXrBoMVrZmw3midGFQ/yU2uAkclsS2VeOh/DTQRzVgA801PHBR1L0="
        );
    }

    #[test]
    fn test_signable_bytes_keeps_binary_payload() {
        let message = signable_bytes("key", 1, 5000, &[0x89, 0x00, 0xff]);
        assert_eq!(&message[..9], b"1key5000\x89");
        assert_eq!(&message[7..], &[b'0', 0x89, 0x00, 0xff]);
    }

    #[test]
    fn test_signature_changes_with_timestamp() {
        let credentials = Credentials::hmac("key", "secret");
        let sig1 = sign_request(&credentials, 12345, 5000, b"").unwrap();
        let sig2 = sign_request(&credentials, 12346, 5000, b"").unwrap();
        assert_ne!(sig1, sig2);
    }
}
