//! Credential management for Bybit API authentication.

use std::sync::Arc;

use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use secrecy::{ExposeSecret, SecretString};

use crate::error::P2pError;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "BYBIT_API_KEY";
/// Environment variable holding the HMAC secret or RSA private key PEM.
pub const API_SECRET_VAR: &str = "BYBIT_API_SECRET";
/// Environment variable selecting RSA signing when set to `1` or `true`.
pub const RSA_FLAG_VAR: &str = "BYBIT_RSA";

/// Which algorithm signs requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureScheme {
    /// HMAC-SHA256 with a shared secret, hex output
    #[default]
    Hmac,
    /// RSA PKCS#1 v1.5 over SHA-256 with a private key, base64 output
    Rsa,
}

impl std::fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureScheme::Hmac => write!(f, "hmac"),
            SignatureScheme::Rsa => write!(f, "rsa"),
        }
    }
}

/// Secret material, one variant per signature scheme.
#[derive(Clone)]
pub enum SigningKey {
    /// Shared secret for HMAC-SHA256
    Hmac(SecretString),
    /// Parsed RSA private key
    Rsa(Box<RsaPrivateKey>),
}

impl SigningKey {
    /// Parse an RSA private key from PEM, accepting PKCS#1 and PKCS#8 encodings.
    pub fn rsa_from_pem(pem: &str) -> Result<Self, P2pError> {
        let pem = pem.trim();
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| P2pError::Auth(format!("Invalid RSA private key: {e}")))?;
        Ok(SigningKey::Rsa(Box::new(key)))
    }

    /// The scheme this key signs with.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            SigningKey::Hmac(_) => SignatureScheme::Hmac,
            SigningKey::Rsa(_) => SignatureScheme::Rsa,
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey::{}([REDACTED])", self.scheme())
    }
}

/// API credentials containing the key and the signing secret.
#[derive(Clone)]
pub struct Credentials {
    /// The API key (public identifier)
    pub api_key: String,
    signing_key: SigningKey,
}

impl Credentials {
    /// Create credentials, interpreting `api_secret` according to `scheme`.
    ///
    /// For [`SignatureScheme::Rsa`] the secret must be a PEM-encoded private key.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        scheme: SignatureScheme,
    ) -> Result<Self, P2pError> {
        match scheme {
            SignatureScheme::Hmac => Ok(Self::hmac(api_key, api_secret)),
            SignatureScheme::Rsa => Self::rsa(api_key, &api_secret.into()),
        }
    }

    /// Create HMAC credentials from an API key and secret.
    pub fn hmac(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            signing_key: SigningKey::Hmac(SecretString::from(api_secret.into())),
        }
    }

    /// Create RSA credentials from an API key and a PEM private key.
    pub fn rsa(api_key: impl Into<String>, private_key_pem: &str) -> Result<Self, P2pError> {
        Ok(Self {
            api_key: api_key.into(),
            signing_key: SigningKey::rsa_from_pem(private_key_pem)?,
        })
    }

    /// The scheme these credentials sign with.
    pub fn scheme(&self) -> SignatureScheme {
        self.signing_key.scheme()
    }

    /// Get the signing key.
    ///
    /// This exposes the secret material - use carefully.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Get the HMAC secret, if these are HMAC credentials.
    pub fn expose_hmac_secret(&self) -> Option<&str> {
        match &self.signing_key {
            SigningKey::Hmac(secret) => Some(secret.expose_secret()),
            SigningKey::Rsa(_) => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("scheme", &self.scheme())
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Trait for providing API credentials.
///
/// Implement this trait to customize how credentials are retrieved,
/// for example from a secrets manager.
pub trait CredentialsProvider: Send + Sync {
    /// Get the credentials.
    fn get_credentials(&self) -> &Credentials;
}

/// Static credentials provider that holds credentials directly.
#[derive(Clone, Debug)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Create a provider for HMAC credentials.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::hmac(api_key, api_secret),
        }
    }

    /// Create a provider for RSA credentials.
    pub fn rsa(api_key: impl Into<String>, private_key_pem: &str) -> Result<Self, P2pError> {
        Ok(Self {
            credentials: Credentials::rsa(api_key, private_key_pem)?,
        })
    }
}

impl From<Credentials> for StaticCredentials {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl CredentialsProvider for Arc<StaticCredentials> {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Credentials provider that reads from environment variables.
///
/// By default, reads `BYBIT_API_KEY` and `BYBIT_API_SECRET`, and switches to
/// RSA signing when `BYBIT_RSA` is `1` or `true`.
#[derive(Debug)]
pub struct EnvCredentials {
    credentials: Credentials,
}

impl EnvCredentials {
    /// Create credentials from the default environment variables.
    pub fn from_env() -> Result<Self, P2pError> {
        Self::from_env_vars(API_KEY_VAR, API_SECRET_VAR, RSA_FLAG_VAR)
    }

    /// Create credentials from custom environment variable names.
    pub fn from_env_vars(key_var: &str, secret_var: &str, rsa_var: &str) -> Result<Self, P2pError> {
        let api_key = std::env::var(key_var)
            .map_err(|_| P2pError::Config(format!("Environment variable {key_var} not set")))?;
        let api_secret = std::env::var(secret_var)
            .map_err(|_| P2pError::Config(format!("Environment variable {secret_var} not set")))?;
        let scheme = match std::env::var(rsa_var) {
            Ok(flag) if flag == "1" || flag.eq_ignore_ascii_case("true") => SignatureScheme::Rsa,
            _ => SignatureScheme::Hmac,
        };

        Ok(Self {
            credentials: Credentials::new(api_key, api_secret, scheme)?,
        })
    }

    /// Try to create credentials from the default environment variables.
    ///
    /// Returns `None` if the variables are missing or the key cannot be parsed.
    pub fn try_from_env() -> Option<Self> {
        Self::from_env().ok()
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}
