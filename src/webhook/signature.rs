//! `X-Hub-Signature-256` verification

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::ErrorKind;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook secret is not configured. Please set WEBHOOK_SECRET.")]
    NotConfigured,

    #[error("Missing {SIGNATURE_HEADER} header")]
    MissingSignature,

    #[error("Malformed signature header")]
    MalformedSignature,

    #[error("Signature does not match payload")]
    InvalidSignature,

    #[error("Invalid JSON payload: {0}")]
    MalformedPayload(String),
}

impl WebhookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::Configuration,
            _ => ErrorKind::UserInput,
        }
    }
}

/// Checks deliveries against the shared webhook secret
pub struct WebhookVerifier {
    secret: Option<SecretString>,
}

impl WebhookVerifier {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify `sha256=<hex>` against an HMAC-SHA256 of the raw body
    pub fn verify(&self, signature: Option<&str>, body: &[u8]) -> Result<(), WebhookError> {
        let secret = self.secret.as_ref().ok_or(WebhookError::NotConfigured)?;
        let signature = signature.ok_or(WebhookError::MissingSignature)?;

        let hex_digest = signature
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or(WebhookError::MalformedSignature)?;
        let expected = hex::decode(hex_digest).map_err(|_| WebhookError::MalformedSignature)?;

        mac_over(secret.expose_secret().as_bytes(), body)?
            .verify_slice(&expected)
            .map_err(|_| WebhookError::InvalidSignature)
    }
}

fn mac_over(secret: &[u8], body: &[u8]) -> Result<HmacSha256, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::NotConfigured)?;
    mac.update(body);
    Ok(mac)
}

/// Compute the header value GitHub would send for `body`
pub fn sign(secret: &str, body: &[u8]) -> Result<String, WebhookError> {
    let digest = mac_over(secret.as_bytes(), body)?.finalize().into_bytes();
    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"action":"opened"}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(Some(SecretString::new("It's a Secret to Everybody".to_string())))
    }

    #[test]
    fn test_known_digest() {
        // Example delivery from GitHub's webhook documentation
        assert_eq!(
            sign("It's a Secret to Everybody", b"Hello, World!").unwrap(),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn test_sign_accepts_any_secret_length() {
        assert!(sign("", BODY).is_ok());
        assert!(sign(&"k".repeat(200), BODY).is_ok());
    }

    #[test]
    fn test_valid_signature() {
        let signature = sign("It's a Secret to Everybody", BODY).unwrap();
        assert!(verifier().verify(Some(&signature), BODY).is_ok());
    }

    #[test]
    fn test_tampered_body() {
        let signature = sign("It's a Secret to Everybody", BODY).unwrap();
        let result = verifier().verify(Some(&signature), br#"{"action":"closed"}"#);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn test_header_problems() {
        assert!(matches!(verifier().verify(None, BODY), Err(WebhookError::MissingSignature)));
        assert!(matches!(
            verifier().verify(Some("sha1=abcdef"), BODY),
            Err(WebhookError::MalformedSignature)
        ));
        assert!(matches!(
            verifier().verify(Some("sha256=not-hex"), BODY),
            Err(WebhookError::MalformedSignature)
        ));
    }

    #[test]
    fn test_unconfigured_secret() {
        let result = WebhookVerifier::new(None).verify(Some("sha256=00"), BODY);
        assert!(matches!(result, Err(WebhookError::NotConfigured)));
        assert_eq!(WebhookError::NotConfigured.kind(), ErrorKind::Configuration);
    }
}
