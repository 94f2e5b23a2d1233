use crate::error::{ProcessingError, SetupError};
use encoding_rs::{Encoder, EncoderResult, Encoding};
use once_cell::sync::Lazy;
use tracing::debug;

/// Maximum number of converted bytes fed to the crypt primitives.
pub const TRIP_MAX: usize = 128;

/// Maximum number of UTF-8 source bytes read per conversion. Shift-JIS needs
/// at most two bytes per source unit, which keeps the output within `TRIP_MAX`.
pub const SOURCE_MAX: usize = TRIP_MAX / 2;

/// LegacyEncoder converts UTF-8 input into the byte encoding tripcodes were
/// historically computed over.
pub trait LegacyEncoder {
    /// convert returns the encoded prefix of `src`.
    ///
    /// Conversion stops at the first invalid, incomplete or unmappable
    /// character and the bytes converted so far are returned. Only a failure of
    /// the converter itself is reported as an error.
    fn convert(&self, src: &[u8]) -> Result<Vec<u8>, ProcessingError>;
}

/// ShiftJis is the Shift-JIS converter backed by `encoding_rs`, narrowed to
/// the JIS X 0208 repertoire of iconv's `SHIFT_JIS`.
#[derive(Clone, Copy, Debug)]
pub struct ShiftJis {
    encoding: &'static Encoding,
}

static SHARED: Lazy<Result<ShiftJis, SetupError>> = Lazy::new(ShiftJis::open);

impl ShiftJis {
    /// Label the converter is looked up by.
    pub const LABEL: &'static str = "shift_jis";

    /// open looks up the converter.
    pub fn open() -> Result<Self, SetupError> {
        Encoding::for_label(Self::LABEL.as_bytes())
            .map(|encoding| ShiftJis { encoding })
            .ok_or(SetupError::ConverterUnavailable { label: Self::LABEL })
    }

    /// shared returns the process-wide converter, opening it on first use.
    pub fn shared() -> Result<Self, SetupError> {
        SHARED.as_ref().map(|c| *c).map_err(Clone::clone)
    }
}

impl LegacyEncoder for ShiftJis {
    fn convert(&self, src: &[u8]) -> Result<Vec<u8>, ProcessingError> {
        if src.is_empty() {
            return Ok(Vec::new());
        }
        let src = &src[..src.len().min(SOURCE_MAX)];
        let text = valid_prefix(src);
        if text.len() < src.len() {
            debug!(
                read = text.len(),
                total = src.len(),
                "dropping malformed UTF-8 tail"
            );
        }

        let mut encoder = self.encoding.new_encoder();
        let mut dst = Vec::with_capacity(TRIP_MAX);
        let mut buf = [0u8; 4];
        for (i, c) in text.char_indices() {
            let n = match jis_char(&mut encoder, c, &mut buf)? {
                Some(n) => n,
                None => {
                    debug!(read = i, written = dst.len(), "stopping at unmappable character");
                    break;
                }
            };
            if dst.len() + n > TRIP_MAX {
                return Err(ProcessingError::EncodingFailure);
            }
            dst.extend_from_slice(&buf[..n]);
        }
        Ok(dst)
    }
}

/// JIS X 0208 row 1 symbols the legacy converter maps to code points that
/// WHATWG Shift_JIS assigns to their fullwidth or CP932 variants instead.
const JIS_X0208_SYMBOLS: &[(char, [u8; 2])] = &[
    ('\u{00a2}', [0x81, 0x91]),
    ('\u{00a3}', [0x81, 0x92]),
    ('\u{00ac}', [0x81, 0xca]),
    ('\u{2016}', [0x81, 0x61]),
    ('\u{301c}', [0x81, 0x60]),
];

/// Code points only CP932 maps; the legacy converter stops at them.
const CP932_ONLY: &[char] = &['\u{0080}', '\u{2225}', '\u{ff0d}', '\u{ff5e}'];

// is_cp932_lead reports lead bytes outside JIS X 0208: NEC row 13, the
// NEC-selected and IBM extensions and the user-defined area.
fn is_cp932_lead(b: u8) -> bool {
    b == 0x87 || (0xed..=0xfc).contains(&b)
}

// jis_char encodes c into out and returns the number of bytes written, or
// None if the legacy converter had no mapping for it.
fn jis_char(
    encoder: &mut Encoder,
    c: char,
    out: &mut [u8; 4],
) -> Result<Option<usize>, ProcessingError> {
    if let Some((_, bytes)) = JIS_X0208_SYMBOLS.iter().find(|(s, _)| *s == c) {
        out[..2].copy_from_slice(bytes);
        return Ok(Some(2));
    }
    if CP932_ONLY.contains(&c) {
        return Ok(None);
    }
    let mut utf8 = [0u8; 4];
    let (result, _, written) =
        encoder.encode_from_utf8_without_replacement(c.encode_utf8(&mut utf8), out, false);
    match result {
        EncoderResult::InputEmpty => {}
        EncoderResult::Unmappable(_) => return Ok(None),
        EncoderResult::OutputFull => return Err(ProcessingError::EncodingFailure),
    }
    if written == 2 && is_cp932_lead(out[0]) {
        return Ok(None);
    }
    Ok(Some(written))
}

// valid_prefix returns the longest prefix of src that is well-formed UTF-8.
fn valid_prefix(src: &[u8]) -> &str {
    match std::str::from_utf8(src) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&src[..e.valid_up_to()]).unwrap_or_default(),
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use anyhow::Result;

    fn sjis(s: &str) -> Result<Vec<u8>> {
        Ok(ShiftJis::shared()?.convert(s.as_bytes())?)
    }

    #[test]
    fn open() {
        assert!(ShiftJis::open().is_ok());
        assert!(ShiftJis::shared().is_ok());
    }

    #[test]
    fn ascii_is_unchanged() -> Result<()> {
        assert_eq!(sjis("GUH")?, b"GUH");
        assert_eq!(sjis("a:b \\~")?, b"a:b \\~");
        Ok(())
    }

    #[test]
    fn empty() -> Result<()> {
        assert!(sjis("")?.is_empty());
        Ok(())
    }

    #[test]
    fn japanese() -> Result<()> {
        assert_eq!(sjis("あ")?, [0x82, 0xa0]);
        assert_eq!(sjis("ｱ")?, [0xb1]);
        assert_eq!(sjis("x日本")?, [b'x', 0x93, 0xfa, 0x96, 0x7b]);
        Ok(())
    }

    #[test]
    fn source_is_bounded() -> Result<()> {
        let long = "a".repeat(200);
        assert_eq!(sjis(&long)?, vec![b'a'; SOURCE_MAX]);
        Ok(())
    }

    #[test]
    fn split_character_is_dropped() -> Result<()> {
        // the 64-byte cut lands inside the three-byte encoding of the kana
        let s = format!("{}あ", "a".repeat(SOURCE_MAX - 1));
        assert_eq!(sjis(&s)?, vec![b'a'; SOURCE_MAX - 1]);
        Ok(())
    }

    #[test]
    fn unmappable_stops_conversion() -> Result<()> {
        assert_eq!(sjis("abé def")?, b"ab");
        assert!(sjis("é")?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_tail() -> Result<()> {
        let out = ShiftJis::shared()?.convert(b"ok\xe3\x81")?;
        assert_eq!(out, b"ok");
        let out = ShiftJis::shared()?.convert(b"\xff\xfe")?;
        assert!(out.is_empty());
        Ok(())
    }

    struct TestElement {
        input: &'static str,
        output: &'static [u8],
    }

    // outputs of glibc iconv -f UTF-8 -t SHIFT_JIS
    static ICONV_VECTOR: &[TestElement] = &[
        TestElement { input: "a〜b", output: &[0x61, 0x81, 0x60, 0x62] },
        TestElement { input: "a‖b", output: &[0x61, 0x81, 0x61, 0x62] },
        TestElement { input: "a¢b", output: &[0x61, 0x81, 0x91, 0x62] },
        TestElement { input: "a£b", output: &[0x61, 0x81, 0x92, 0x62] },
        TestElement { input: "a¬b", output: &[0x61, 0x81, 0xca, 0x62] },
        TestElement { input: "a−b", output: &[0x61, 0x81, 0x7c, 0x62] },
        TestElement { input: "a￠b", output: &[0x61, 0x81, 0x91, 0x62] },
        TestElement { input: "a￡b", output: &[0x61, 0x81, 0x92, 0x62] },
        TestElement { input: "a￢b", output: &[0x61, 0x81, 0xca, 0x62] },
        TestElement { input: "a¥b", output: &[0x61, 0x5c, 0x62] },
        TestElement { input: "凜熙", output: &[0xea, 0xa3, 0xea, 0xa4] },
        // CP932 extensions stop the conversion
        TestElement { input: "a～b", output: &[0x61] },
        TestElement { input: "a－b", output: &[0x61] },
        TestElement { input: "a∥b", output: &[0x61] },
        TestElement { input: "a①b", output: &[0x61] },
        TestElement { input: "aⅠb", output: &[0x61] },
        TestElement { input: "a髙b", output: &[0x61] },
        TestElement { input: "aⅰb", output: &[0x61] },
        TestElement { input: "a\u{e000}b", output: &[0x61] },
        TestElement { input: "a\u{80}b", output: &[0x61] },
    ];

    #[test]
    fn iconv_vector() -> Result<()> {
        for (i, element) in ICONV_VECTOR.iter().enumerate() {
            let got = sjis(element.input)?;
            assert_eq!(
                got, element.output,
                "iconv vector {} ({:?}) failed! got {:02x?}, want {:02x?}",
                i, element.input, got, element.output
            );
        }
        Ok(())
    }

    #[test]
    fn output_never_exceeds_trip_max() -> Result<()> {
        for s in ["あ".repeat(100), "Ω".repeat(100), "ｱ".repeat(100)] {
            assert!(sjis(&s)?.len() <= TRIP_MAX);
        }
        Ok(())
    }
}
