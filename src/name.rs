use crate::crypt::Crypt;
use crate::encoding::LegacyEncoder;
use crate::error::ProcessingError;
use crate::hasher::Hasher;
use std::ops::RangeInclusive;

/// Maximum length, in UTF-16 code units, of a display name.
pub const NAME_MAX: usize = 100;

/// Maximum length, in UTF-16 code units, of an escaped trip or secure trip.
pub const TRIP_INPUT_MAX: usize = 128;

/// ParsedName is a poster name field split into its parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedName {
    /// Display name.
    pub name: String,
    /// Classic trip secret, HTML-escaped.
    pub trip: String,
    /// Secure trip secret, HTML-escaped.
    pub secure: String,
}

/// Signature is the public identity attached to a post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    /// Display name.
    pub name: String,
    /// Tripcode, if one was requested and could be computed.
    pub trip: Option<String>,
}

/// parse_name splits `name#trip#secure` into its three parts.
pub fn parse_name(field: &str) -> ParsedName {
    parse_name_excluding(field, &[])
}

/// parse_name_excluding is `parse_name` that also removes every character in
/// `excluded` from the trimmed display name.
pub fn parse_name_excluding(field: &str, excluded: &[RangeInclusive<char>]) -> ParsedName {
    let (name, trip, secure) = match field.split_once('#') {
        None => (field, "", ""),
        Some((name, rest)) => match rest.split_once('#') {
            None => (name, rest, ""),
            Some((trip, secure)) => (name, trip, secure),
        },
    };
    ParsedName {
        name: truncate(&strip(name.trim(), excluded), NAME_MAX),
        trip: truncate(&escape_html(trip), TRIP_INPUT_MAX),
        secure: truncate(&escape_html(secure), TRIP_INPUT_MAX),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn strip(s: &str, excluded: &[RangeInclusive<char>]) -> String {
    s.chars()
        .filter(|c| !excluded.iter().any(|r| r.contains(c)))
        .collect()
}

// truncate keeps the characters that fit in max UTF-16 code units. A
// surrogate pair straddling the limit is dropped whole.
fn truncate(s: &str, max: usize) -> String {
    let mut units = 0;
    s.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= max
        })
        .collect()
}

impl<C: Crypt, E: LegacyEncoder> Hasher<C, E> {
    /// sign parses a poster name field and computes its tripcode.
    ///
    /// A trip listed in the special tripcode table is replaced by its fixed
    /// value and nothing is hashed.
    pub fn sign(&self, field: &str) -> Result<Signature, ProcessingError> {
        let parsed = parse_name_excluding(field, &self.excluded_name_chars());
        let special = if parsed.trip.is_empty() {
            None
        } else {
            self.special_tripcode(&parsed.trip)
        };
        let trip = if special.is_some() {
            special
        } else if parsed.trip.is_empty() && parsed.secure.is_empty() {
            None
        } else {
            Some(self.hash(&parsed.trip, &parsed.secure)?).filter(|t| !t.is_empty())
        };
        Ok(Signature {
            name: parsed.name,
            trip,
        })
    }
}
