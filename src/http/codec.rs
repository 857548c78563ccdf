//! Percent-decoding and percent-encoding of URL octets.
//!
//! Decoding is byte-oriented and lenient: `+` becomes a space, `%XX` becomes
//! the byte `0xXX`, and an escape that is cut short or contains a non-hex
//! digit is dropped without error. The character that broke a malformed
//! escape is then decoded normally, so `"%zz"` decodes to `"zz"` while
//! `"a%2"` decodes to `"a"`. ASCII control bytes outside an escape are
//! dropped; every other byte is copied through unvalidated.

/// Bytes escaped by [`encode`] besides everything outside `33..=126`.
const RESERVED: &[u8] = b" #%&+;=?";

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Outcome of feeding one character to an [`EscapeDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscapeStep {
    /// One hex digit seen, waiting for the second.
    Pending,
    /// Both digits seen.
    Byte(u8),
    /// Not a hex digit; the escape is abandoned.
    Invalid,
}

/// Accumulates the two hex digits following a `%`.
///
/// Shared by [`decode_bytes`] and the query tokenizer so both treat broken
/// escapes the same way.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct EscapeDecoder {
    value: u8,
    digits: u8,
}

impl EscapeDecoder {
    pub(crate) fn push(&mut self, c: u8) -> EscapeStep {
        let Some(digit) = hex_to_digit(c) else {
            *self = Self::default();
            return EscapeStep::Invalid;
        };

        self.value = (self.value << 4) | digit;
        self.digits += 1;

        if self.digits == 2 {
            let byte = self.value;
            *self = Self::default();
            EscapeStep::Byte(byte)
        } else {
            EscapeStep::Pending
        }
    }
}

fn hex_to_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decodes raw bytes. See the module docs for the handling of bad escapes.
pub fn decode_bytes(input: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(input.len());
    let mut escape: Option<EscapeDecoder> = None;

    for &c in input {
        if let Some(decoder) = escape.as_mut() {
            match decoder.push(c) {
                EscapeStep::Pending => continue,
                EscapeStep::Byte(byte) => {
                    decoded.push(byte);
                    escape = None;
                    continue;
                }
                EscapeStep::Invalid => escape = None,
            }
        }

        match c {
            b'%' => escape = Some(EscapeDecoder::default()),
            b'+' => decoded.push(b' '),
            c if c.is_ascii_control() => {}
            c => decoded.push(c),
        }
    }

    decoded
}

/// Decodes `input` into a string, replacing invalid UTF-8 sequences.
///
/// Use [`decode_bytes`] where the exact octets matter, e.g. for file names.
pub fn decode(input: &str) -> String {
    String::from_utf8_lossy(&decode_bytes(input.as_bytes())).into_owned()
}

/// Decodes `len` bytes of `input` starting at byte offset `start`.
///
/// The range is clamped to the input, so out-of-range arguments yield a
/// shorter (possibly empty) result rather than a panic.
pub fn decode_range(input: &str, start: usize, len: usize) -> String {
    let bytes = input.as_bytes();
    let start = start.min(bytes.len());
    let end = start.saturating_add(len).min(bytes.len());
    String::from_utf8_lossy(&decode_bytes(&bytes[start..end])).into_owned()
}

/// Appends the percent-encoded form of `input` to `out`.
///
/// Space becomes `+`; reserved characters and bytes outside printable ASCII
/// become `%XX` with uppercase hex.
pub fn encode_into(out: &mut String, input: &str) {
    encode_bytes_into(out, input.as_bytes());
}

/// Like [`encode_into`] for arbitrary octets; `decode_bytes` of the output
/// gives back `input` exactly.
pub fn encode_bytes_into(out: &mut String, input: &[u8]) {
    for &b in input {
        match b {
            b' ' => out.push('+'),
            b if RESERVED.contains(&b) || !(33..=126).contains(&b) => {
                out.push('%');
                out.push(HEX_UPPER[(b >> 4) as usize] as char);
                out.push(HEX_UPPER[(b & 0x0f) as usize] as char);
            }
            b => out.push(b as char),
        }
    }
}

pub fn encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    encode_into(&mut out, input);
    out
}

pub fn encode_bytes(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    encode_bytes_into(&mut out, input);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_decoder_accepts_mixed_case() {
        let mut decoder = EscapeDecoder::default();
        assert_eq!(decoder.push(b'a'), EscapeStep::Pending);
        assert_eq!(decoder.push(b'F'), EscapeStep::Byte(0xaf));
    }

    #[test]
    fn escape_decoder_resets_after_invalid_digit() {
        let mut decoder = EscapeDecoder::default();
        assert_eq!(decoder.push(b'4'), EscapeStep::Pending);
        assert_eq!(decoder.push(b'x'), EscapeStep::Invalid);
        assert_eq!(decoder.push(b'4'), EscapeStep::Pending);
        assert_eq!(decoder.push(b'1'), EscapeStep::Byte(b'A'));
    }

    #[test]
    fn control_bytes_are_dropped_but_escaped_ones_kept() {
        assert_eq!(decode_bytes(b"a\tb"), b"ab".to_vec());
        assert_eq!(decode_bytes(b"a%09b"), b"a\tb".to_vec());
    }
}
