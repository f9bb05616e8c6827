use std::fmt;

use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_SESSION_KEY_BYTES: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionKeyError {
    #[error("session signing key must be at least {MIN_SESSION_KEY_BYTES} bytes, got {0}")]
    TooShort(usize),
}

/// Issues and checks session tokens of the form `<uuid>.<hex hmac-sha256>`.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner").field("key", &"<redacted>").finish()
    }
}

impl SessionSigner {
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, SessionKeyError> {
        let key = key.as_ref();
        if key.len() < MIN_SESSION_KEY_BYTES {
            return Err(SessionKeyError::TooShort(key.len()));
        }
        Ok(Self { key: key.to_vec() })
    }

    /// Process-local key. Tokens signed with it stop verifying after a restart.
    pub fn random() -> Self {
        let mut key = vec![0u8; MIN_SESSION_KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    pub fn sign(&self, session_id: &SessionId) -> String {
        let signature = encode_hex(&self.mac_for(session_id.as_str()).finalize().into_bytes());
        format!("{}.{signature}", session_id.as_str())
    }

    /// Returns the session id carried by `token` when its signature checks out.
    pub fn verify(&self, token: &str) -> Option<SessionId> {
        let (raw_id, signature) = token.trim().rsplit_once('.')?;
        let id = Uuid::parse_str(raw_id).ok()?;
        let signature = decode_hex(signature)?;

        self.mac_for(raw_id).verify_slice(&signature).ok()?;
        Some(SessionId(id.to_string()))
    }

    fn mac_for(&self, payload: &str) -> HmacSha256 {
        // HMAC accepts keys of any length; the length floor is enforced in `new`.
        let mut mac = match HmacSha256::new_from_slice(&self.key) {
            Ok(mac) => mac,
            Err(_) => <HmacSha256 as Mac>::new(&Default::default()),
        };
        mac.update(payload.as_bytes());
        mac
    }
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

#[cfg(test)]
mod tests {
    use super::{SessionId, SessionKeyError, SessionSigner};

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn signed_token_verifies_back_to_same_session() {
        let signer = SessionSigner::new(KEY).expect("valid key");
        let session_id = SessionId::generate();

        let token = signer.sign(&session_id);

        assert_eq!(signer.verify(&token), Some(session_id));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = SessionSigner::new(KEY).expect("valid key");
        let token = signer.sign(&SessionId::generate());
        let signature = token.rsplit_once('.').map(|(_, signature)| signature).unwrap_or("");
        let forged = format!("{}.{signature}", uuid::Uuid::new_v4());

        assert_eq!(signer.verify(&forged), None);
        assert_eq!(signer.verify("not-a-token"), None);
        assert_eq!(signer.verify(""), None);
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let signer = SessionSigner::new(KEY).expect("valid key");
        let other = SessionSigner::random();

        let token = other.sign(&SessionId::generate());

        assert_eq!(signer.verify(&token), None);
    }

    #[test]
    fn short_keys_are_refused() {
        assert_eq!(SessionSigner::new("short").err(), Some(SessionKeyError::TooShort(5)));
    }

    #[test]
    fn debug_does_not_print_key() {
        let signer = SessionSigner::new(KEY).expect("valid key");

        assert!(!format!("{signer:?}").contains(KEY));
    }
}
