use crate::error::{Error, ProcessingError, SetupError};
use crate::hasher::Hasher;
use once_cell::sync::Lazy;

static GLOBAL: Lazy<Result<Hasher, SetupError>> = Lazy::new(Hasher::new);

/// init sets up the process-wide hasher. Call it at startup so a missing
/// converter is reported before the first post is hashed.
pub fn init() -> Result<&'static Hasher, SetupError> {
    GLOBAL.as_ref().map_err(Clone::clone)
}

/// configure_secure_salt sets the salt of the process-wide hasher.
pub fn configure_secure_salt(salt: &str) -> Result<(), Error> {
    init()?.configure_secure_salt(salt)?;
    Ok(())
}

/// hash_tripcode hashes with the process-wide hasher.
pub fn hash_tripcode(trip: &str, secure: &str) -> Result<String, ProcessingError> {
    init()?.hash(trip, secure)
}
