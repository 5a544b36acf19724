//! PNG text is Latin-1 (ISO 8859-1), the report is UTF-8.

/// Appends the UTF-8 form of some Latin-1 bytes to `out`.
///
/// Bytes below `0x80` are copied as-is, every other byte becomes a two byte
/// sequence. Nothing else is added (in particular, no terminator).
pub fn latin1_to_utf8_into(input: &[u8], out: &mut Vec<u8>) {
  out.reserve(input.len() + input.iter().filter(|&&b| b >= 0x80).count());
  for &b in input {
    if b < 0x80 {
      out.push(b);
    } else {
      out.push(0xC0 | (b >> 6));
      out.push(0x80 | (b & 0x3F));
    }
  }
}

/// Converts Latin-1 bytes into UTF-8 bytes.
#[inline]
#[must_use]
pub fn latin1_to_utf8(input: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  latin1_to_utf8_into(input, &mut out);
  out
}

/// If the byte may appear in a keyword: printable Latin-1, or the null.
#[inline]
#[must_use]
pub const fn is_keyword_byte(b: u8) -> bool {
  matches!(b, 0 | 32..=126 | 161..=255)
}

#[test]
fn test_latin1_to_utf8() {
  assert_eq!(latin1_to_utf8(b"plain"), b"plain");
  assert_eq!(latin1_to_utf8(&[]), b"");
  // every latin-1 byte is the same code point in unicode.
  let all: Vec<u8> = (0..=255).collect();
  let expected: String = all.iter().map(|&b| b as char).collect();
  assert_eq!(latin1_to_utf8(&all), expected.as_bytes());
  assert_eq!(latin1_to_utf8(&[0xE9]), "é".as_bytes());
}
