use core::fmt::Write;

use bytemuck::{Pod, Zeroable};

/// The four type bytes of a PNG chunk.
///
/// The tag is *expected* to be ASCII letters, but nothing enforces that. The
/// `Debug` and `Display` impls just `as` cast each byte into a `char`, which
/// is exactly right for letters and still safe for anything else.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ChunkTag(pub [u8; 4]);
#[allow(nonstandard_style)]
#[allow(missing_docs)]
impl ChunkTag {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const bKGD: Self = Self(*b"bKGD");
  pub const cHRM: Self = Self(*b"cHRM");
  pub const gAMA: Self = Self(*b"gAMA");
  pub const hIST: Self = Self(*b"hIST");
  pub const pHYs: Self = Self(*b"pHYs");
  pub const sBIT: Self = Self(*b"sBIT");
  pub const tEXt: Self = Self(*b"tEXt");
  pub const tIME: Self = Self(*b"tIME");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const zTXt: Self = Self(*b"zTXt");
  pub const iCCP: Self = Self(*b"iCCP");
  pub const sPLT: Self = Self(*b"sPLT");
  pub const sRGB: Self = Self(*b"sRGB");
  pub const iTXt: Self = Self(*b"iTXt");
  pub const oFFs: Self = Self(*b"oFFs");
  pub const pCAL: Self = Self(*b"pCAL");
  pub const gIFg: Self = Self(*b"gIFg");
  pub const gIFx: Self = Self(*b"gIFx");
  pub const fRAc: Self = Self(*b"fRAc");
  pub const gIFt: Self = Self(*b"gIFt");
}
impl core::fmt::Debug for ChunkTag {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char('\"')?;
    core::fmt::Display::fmt(self, f)?;
    f.write_char('\"')?;
    Ok(())
  }
}
impl core::fmt::Display for ChunkTag {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for ch in self.0.iter().copied().map(|u| u as char) {
      f.write_char(ch)?;
    }
    Ok(())
  }
}
impl From<[u8; 4]> for ChunkTag {
  #[inline]
  #[must_use]
  fn from(array: [u8; 4]) -> Self {
    Self(array)
  }
}

/// What the letter case of a chunk tag says about the chunk.
///
/// Each of the four letters carries one bit: uppercase means the property in
/// the first name of each field, lowercase means the opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagProperties {
  /// 1st letter: a decoder must understand this chunk to show the image.
  pub critical: bool,
  /// 2nd letter: the chunk type is part of the public standard.
  pub public: bool,
  /// 3rd letter: reserved bit, must currently be uppercase.
  pub reserved_uppercase: bool,
  /// 4th letter: editors that change critical chunks must drop this chunk.
  pub unsafe_to_copy: bool,
}
impl ChunkTag {
  /// Reads the case bits, or `None` if any byte isn't an ASCII letter.
  #[must_use]
  pub fn properties(self) -> Option<TagProperties> {
    if !self.0.iter().all(u8::is_ascii_alphabetic) {
      return None;
    }
    let [a, b, c, d] = self.0.map(|u| u.is_ascii_uppercase());
    Some(TagProperties { critical: a, public: b, reserved_uppercase: c, unsafe_to_copy: d })
  }
}

#[test]
#[allow(nonstandard_style)]
fn test_ChunkTag_properties() {
  let p = ChunkTag::IHDR.properties().unwrap();
  assert!(p.critical && p.public && p.reserved_uppercase && p.unsafe_to_copy);
  let p = ChunkTag::tEXt.properties().unwrap();
  assert!(!p.critical && p.public && p.reserved_uppercase && !p.unsafe_to_copy);
  let p = ChunkTag(*b"pRvt").properties().unwrap();
  assert!(!p.critical && p.public && !p.reserved_uppercase && !p.unsafe_to_copy);
  assert_eq!(ChunkTag(*b"ab1d").properties(), None);
  assert_eq!(ChunkTag(*b"\xC9abc").properties(), None);
}

#[test]
#[allow(nonstandard_style)]
fn test_ChunkTag_fmt() {
  assert_eq!(format!("{}", ChunkTag::gAMA), "gAMA");
  assert_eq!(format!("{:?}", ChunkTag::gAMA), "\"gAMA\"");
}
