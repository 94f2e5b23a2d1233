#![warn(missing_docs)]
//! Tripcodes for anonymous message boards.
//!
//! A tripcode is a short public code derived from a secret typed after the
//! poster's name, letting anonymous users prove continuity of identity without
//! revealing the secret. Two variants are computed:
//!
//! * the classic tripcode, DES `crypt(3)` over the Shift-JIS encoded secret with
//!   a salt taken from the secret itself. It is weak on purpose and kept so that
//!   codes issued by older boards still match.
//! * the secure tripcode, SHA-256-crypt with a 16 character salt held by the
//!   server.
//!
//! # Example
//! ```
//! use tripcode::Hasher;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!   let h = Hasher::with_secure_salt("0123456789012345")?;
//!   assert_eq!(h.hash("GUH", "")?, "!LUF/KZkngk");
//!   assert_eq!(h.hash("GUH", "abc")?, "!LUF/KZkngk!!wofGr/2D23");
//!
//!   let sig = h.sign("anon#GUH")?;
//!   println!("{} {}", sig.name, sig.trip.unwrap_or_default());
//!
//!   Ok(())
//! }
//! ```
/// `crypt` wraps the DES and SHA-256 `crypt(3)` primitives.
pub mod crypt;
/// `encoding` converts secrets to Shift-JIS.
pub mod encoding;
/// `error` holds the error types.
pub mod error;
/// `global` is the process-wide hasher.
pub mod global;
/// `hasher` computes classic and secure tripcodes.
pub mod hasher;
/// `name` parses poster name fields.
pub mod name;
/// `normalize` maps bytes into the crypt salt alphabet.
pub mod normalize;
/// `salt` derives classic salts and stores the secure salt.
pub mod salt;

pub use error::{ConfigError, Error, ProcessingError, SetupError};
pub use hasher::Hasher;
pub use name::{parse_name, parse_name_excluding, ParsedName, Signature};
