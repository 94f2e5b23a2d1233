/// Symbols the crypt primitives treat specially, in replacement order.
const FROM: &[u8; 13] = b":;<=>?@[\\]^_`";
/// Replacement for each entry of `FROM`, by position.
const TO: &[u8; 13] = b"ABCDEFGabcdef";

/// fix_char maps a single byte into the alphabet accepted by the crypt salts.
///
/// Bytes outside `'.'..='z'` become `'.'`, the 13 symbols between the digits
/// and the letters are folded onto `A-G` / `a-f`, everything else is kept.
pub fn fix_char(c: u8) -> u8 {
    if c < b'.' || c > b'z' {
        return b'.';
    }
    match FROM.iter().position(|&f| f == c) {
        Some(i) => TO[i],
        None => c,
    }
}

/// normalize_in_place applies `fix_char` to every byte of `buf`.
pub fn normalize_in_place(buf: &mut [u8]) {
    buf.iter_mut().for_each(|c| *c = fix_char(*c));
}

/// normalized returns a normalized copy of `src`.
pub fn normalized(src: &[u8]) -> Vec<u8> {
    src.iter().map(|&c| fix_char(c)).collect()
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn symbol_table() {
        FROM.iter()
            .zip(TO.iter())
            .for_each(|(&f, &t)| assert_eq!(fix_char(f), t, "{} mapped wrong", f as char));
    }

    #[test]
    fn out_of_range() {
        for c in (0u8..b'.').chain(b'z' + 1..=u8::MAX) {
            assert_eq!(fix_char(c), b'.', "byte {:#04x}", c);
        }
    }

    #[test]
    fn passthrough() {
        for c in b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz" {
            assert_eq!(fix_char(*c), *c);
        }
    }

    #[test]
    fn totality() {
        for c in 0..=u8::MAX {
            let n = fix_char(c);
            assert!((b'.'..=b'z').contains(&n), "{:#04x} -> {:#04x}", c, n);
            assert!(!FROM.contains(&n), "{:#04x} -> forbidden {}", c, n as char);
        }
    }

    #[test]
    fn idempotence() {
        for c in 0..=u8::MAX {
            assert_eq!(fix_char(fix_char(c)), fix_char(c));
        }
    }

    #[test]
    fn whole_buffer() {
        let mut buf = *b"a:b\x82\xa0z{";
        normalize_in_place(&mut buf);
        assert_eq!(&buf, b"aAb..z.");
        assert_eq!(normalized(b"[\\]^_`"), b"abcdef");
    }
}
