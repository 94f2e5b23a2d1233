use crate::error::ConfigError;
use crate::normalize::{fix_char, normalize_in_place};
use std::sync::RwLock;
use tracing::{info, warn};

/// Length of the salt used by the classic (DES) tripcode.
pub const CLASSIC_SALT_LEN: usize = 2;

/// Length of the configured salt used by the secure tripcode.
pub const SECURE_SALT_LEN: usize = 16;

/// Prefix selecting SHA-256-crypt.
pub const SHA256_MAGIC: &str = "$5$";

/// derive_classic_salt computes the classic salt from the converted secret.
///
/// The second and third bytes of the secret seed the salt; shorter secrets
/// fall back to `'H'` and `'.'`. Both bytes are normalized afterwards.
pub fn derive_classic_salt(key: &[u8]) -> [u8; CLASSIC_SALT_LEN] {
    let salt = match key.len() {
        0 => [b'.', b'.'],
        1 => [b'H', b'.'],
        2 => [key[1], b'H'],
        _ => [key[1], key[2]],
    };
    salt.map(fix_char)
}

/// SecureSalt is a validated secure-tripcode salt.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureSalt {
    bytes: [u8; SECURE_SALT_LEN],
}

impl SecureSalt {
    /// new validates `salt` and normalizes each of its bytes.
    pub fn new(salt: &str) -> Result<Self, ConfigError> {
        let bytes: [u8; SECURE_SALT_LEN] =
            salt.as_bytes()
                .try_into()
                .map_err(|_| ConfigError::InvalidLength {
                    expected: SECURE_SALT_LEN,
                    actual: salt.len(),
                })?;
        let mut s = SecureSalt { bytes };
        normalize_in_place(&mut s.bytes);
        if s.bytes[..] != *salt.as_bytes() {
            warn!("secure salt contains characters outside the crypt alphabet; they were replaced");
        }
        Ok(s)
    }

    /// as_str returns the 16 salt characters.
    pub fn as_str(&self) -> &str {
        // normalized bytes are always ASCII
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// setting returns the full crypt setting, `$5$<salt>$`.
    pub fn setting(&self) -> String {
        format!("{}{}$", SHA256_MAGIC, self.as_str())
    }
}

impl std::fmt::Debug for SecureSalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSalt")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// SecureSaltStore holds the secure salt shared by every hashing call.
///
/// Writers replace the whole value under a write lock, so readers observe
/// either the previous or the new salt.
#[derive(Debug, Default)]
pub struct SecureSaltStore {
    salt: RwLock<Option<SecureSalt>>,
}

impl SecureSaltStore {
    /// new returns an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// configure validates `salt` and replaces the stored value. On error the
    /// previous value is kept.
    pub fn configure(&self, salt: &str) -> Result<(), ConfigError> {
        let salt = SecureSalt::new(salt)?;
        let mut guard = match self.salt.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let replaced = guard.replace(salt).is_some();
        info!(replaced, "secure salt configured");
        Ok(())
    }

    /// get returns a copy of the current salt, if one was configured.
    pub fn get(&self) -> Option<SecureSalt> {
        match self.salt.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// is_configured reports whether a salt has been set.
    pub fn is_configured(&self) -> bool {
        self.get().is_some()
    }
}
