use crate::salt::SHA256_MAGIC;
use pwhash::{sha256_crypt, unix_crypt, HashSetup};
use tracing::debug;

/// Number of trailing digest characters kept for a classic tripcode.
pub const CLASSIC_TAIL: usize = 11;

/// Number of trailing digest characters kept for a secure tripcode.
pub const SECURE_TAIL: usize = 12;

/// Crypt represents a `crypt(3)`-style password hashing primitive.
pub trait Crypt {
    /// crypt hashes `key` with the given `salt` setting.
    ///
    /// A setting of the form `$5$<salt>$` selects SHA-256-crypt, a bare
    /// two-character salt selects traditional DES crypt. `None` means the
    /// primitive produced no digest; callers treat that as "no output".
    fn crypt(&self, key: &[u8], salt: &str) -> Option<String>;
}

/// UnixCrypt implements [`Crypt`] with the algorithms from `pwhash`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnixCrypt;

impl Crypt for UnixCrypt {
    #[allow(deprecated)]
    fn crypt(&self, key: &[u8], salt: &str) -> Option<String> {
        let result = match sha256_salt(salt) {
            Some(salt) => sha256_crypt::hash_with(
                HashSetup {
                    salt: Some(salt),
                    rounds: None,
                },
                key,
            ),
            None => unix_crypt::hash_with(salt, key),
        };
        match result {
            Ok(digest) => Some(digest),
            Err(e) => {
                debug!(error = %e, "crypt produced no digest");
                None
            }
        }
    }
}

// sha256_salt extracts the raw salt from a `$5$<salt>$` setting.
fn sha256_salt(setting: &str) -> Option<&str> {
    let rest = setting.strip_prefix(SHA256_MAGIC)?;
    Some(rest.strip_suffix('$').unwrap_or(rest))
}

/// digest_tail returns the last `n` characters of `digest`, or `None` if the
/// digest is shorter than that.
pub fn digest_tail(digest: &str, n: usize) -> Option<&str> {
    let len = digest.len();
    if len < n {
        return None;
    }
    digest.get(len - n..)
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn des() {
        assert_eq!(UnixCrypt.crypt(b"GUH", "UH").unwrap(), "UHFLUF/KZkngk");
        assert_eq!(UnixCrypt.crypt(b"test", "aZ").unwrap(), "aZGJuE6EXrjEE");
    }

    #[test]
    fn des_ignores_key_past_eight_bytes() {
        assert_eq!(
            UnixCrypt.crypt(b"password", "as"),
            UnixCrypt.crypt(b"passwordXYZ", "as")
        );
    }

    #[test]
    fn sha256() {
        let digest = UnixCrypt.crypt(b"abc", "$5$0123456789012345$").unwrap();
        assert_eq!(
            digest,
            "$5$0123456789012345$NXN.3hCMMe4WoWHCIXRwisgw/2frN5Mu3wofGr/2D23"
        );
    }

    #[test]
    fn bad_salt_yields_nothing() {
        assert_eq!(UnixCrypt.crypt(b"abc", "!!"), None);
        assert_eq!(UnixCrypt.crypt(b"abc", "x"), None);
    }

    #[test]
    fn salt_setting() {
        assert_eq!(sha256_salt("$5$abc$"), Some("abc"));
        assert_eq!(sha256_salt("$5$abc"), Some("abc"));
        assert_eq!(sha256_salt("ab"), None);
    }

    #[test]
    fn tail() {
        assert_eq!(digest_tail("UHFLUF/KZkngk", CLASSIC_TAIL), Some("FLUF/KZkngk"));
        assert_eq!(digest_tail("0123456789A", CLASSIC_TAIL), Some("0123456789A"));
        assert_eq!(digest_tail("0123456789", CLASSIC_TAIL), None);
        assert_eq!(digest_tail("", SECURE_TAIL), None);
    }
}
