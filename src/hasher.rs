use crate::crypt::{digest_tail, Crypt, UnixCrypt, CLASSIC_TAIL, SECURE_TAIL};
use crate::encoding::{LegacyEncoder, ShiftJis, TRIP_MAX};
use crate::error::{ConfigError, Error, ProcessingError, SetupError};
use crate::normalize::{normalize_in_place, normalized};
use crate::salt::{derive_classic_salt, SecureSaltStore};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::RwLock;
use tracing::warn;

/// Marker replacing the first character of a classic tripcode.
pub const CLASSIC_MARK: &str = "!";

/// Marker replacing the first two characters of a secure tripcode.
pub const SECURE_MARK: &str = "!!";

/// Hasher computes classic and secure tripcodes.
///
/// It owns the crypt primitive, the legacy encoder and the secure salt, and is
/// meant to be built once at startup and shared by reference.
pub struct Hasher<C = UnixCrypt, E = ShiftJis> {
    crypt: C,
    encoder: E,
    secure_salt: SecureSaltStore,
    special: RwLock<HashMap<String, String>>,
    excluded: RwLock<Vec<RangeInclusive<char>>>,
}

impl Hasher {
    /// new opens the Shift-JIS converter and returns a hasher without a
    /// secure salt.
    pub fn new() -> Result<Self, SetupError> {
        Ok(Self::with_parts(UnixCrypt, ShiftJis::shared()?))
    }

    /// with_secure_salt is `new` followed by `configure_secure_salt`.
    pub fn with_secure_salt(salt: &str) -> Result<Self, Error> {
        let h = Self::new()?;
        h.configure_secure_salt(salt)?;
        Ok(h)
    }
}

impl<C: Crypt, E: LegacyEncoder> Hasher<C, E> {
    /// with_parts builds a hasher from an explicit primitive and encoder.
    pub fn with_parts(crypt: C, encoder: E) -> Self {
        Hasher {
            crypt,
            encoder,
            secure_salt: SecureSaltStore::new(),
            special: RwLock::new(HashMap::new()),
            excluded: RwLock::new(Vec::new()),
        }
    }

    /// configure_secure_salt sets the 16-byte salt used by secure tripcodes.
    /// Subsequent calls to `hash` use the new salt immediately.
    pub fn configure_secure_salt(&self, salt: &str) -> Result<(), ConfigError> {
        self.secure_salt.configure(salt)
    }

    /// has_secure_salt reports whether a secure salt was configured.
    pub fn has_secure_salt(&self) -> bool {
        self.secure_salt.is_configured()
    }

    /// set_special_tripcodes replaces the table of fixed tripcodes, keyed by
    /// the raw trip they stand in for.
    pub fn set_special_tripcodes(&self, table: HashMap<String, String>) {
        let mut guard = match self.special.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = table;
    }

    /// special_tripcode looks `trip` up in the table of fixed tripcodes.
    pub fn special_tripcode(&self, trip: &str) -> Option<String> {
        match self.special.read() {
            Ok(g) => g.get(trip).cloned(),
            Err(poisoned) => poisoned.into_inner().get(trip).cloned(),
        }
    }

    /// set_excluded_name_chars sets the characters `sign` removes from display
    /// names.
    pub fn set_excluded_name_chars(&self, excluded: Vec<RangeInclusive<char>>) {
        let mut guard = match self.excluded.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = excluded;
    }

    /// excluded_name_chars returns the characters removed from display names.
    pub fn excluded_name_chars(&self) -> Vec<RangeInclusive<char>> {
        match self.excluded.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// hash returns the classic tripcode of `trip` followed by the secure
    /// tripcode of `secure`. Each part is left out when its input converts to
    /// nothing or the digest is unavailable.
    pub fn hash(&self, trip: &str, secure: &str) -> Result<String, ProcessingError> {
        let mut out = self.hash_classic(trip)?.unwrap_or_default();
        if let Some(s) = self.hash_secure(secure)? {
            out.push_str(&s);
        }
        Ok(out)
    }

    /// hash_classic returns the classic tripcode of `trip`.
    pub fn hash_classic(&self, trip: &str) -> Result<Option<String>, ProcessingError> {
        let key = self.encoder.convert(trip.as_bytes())?;
        if key.is_empty() {
            return Ok(None);
        }
        Ok(self.classic_segment(&key))
    }

    /// hash_secure returns the secure tripcode of `secure`.
    pub fn hash_secure(&self, secure: &str) -> Result<Option<String>, ProcessingError> {
        let key = self.encoder.convert(secure.as_bytes())?;
        if key.is_empty() {
            return Ok(None);
        }
        Ok(self.secure_segment(&key))
    }

    fn classic_segment(&self, key: &[u8]) -> Option<String> {
        let salt = derive_classic_salt(key);
        let salt = std::str::from_utf8(&salt).ok()?;
        let digest = self.crypt.crypt(&normalized(key), salt)?;
        mark(digest_tail(&digest, CLASSIC_TAIL)?, CLASSIC_MARK)
    }

    fn secure_segment(&self, key: &[u8]) -> Option<String> {
        let salt = match self.secure_salt.get() {
            Some(salt) => salt,
            None => {
                warn!("secure tripcode requested before a secure salt was configured");
                return None;
            }
        };
        let mut key = key[..key.len().min(TRIP_MAX)].to_vec();
        normalize_in_place(&mut key);
        let digest = self.crypt.crypt(&key, &salt.setting())?;
        mark(digest_tail(&digest, SECURE_TAIL)?, SECURE_MARK)
    }
}

impl<C, E> std::fmt::Debug for Hasher<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hasher")
            .field("secure_salt", &self.secure_salt)
            .finish_non_exhaustive()
    }
}

// mark overwrites the leading characters of tail with marker.
fn mark(tail: &str, marker: &str) -> Option<String> {
    Some(format!("{}{}", marker, tail.get(marker.len()..)?))
}
