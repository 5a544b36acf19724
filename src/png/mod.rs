//! Checking the chunks of a PNG.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! The general format of a PNG is an 8 byte signature followed by "chunks".
//! Each chunk is a big-endian `u32` length, a four letter type tag, that many
//! bytes of data, and a CRC-32 of the tag plus data. There's four "critical"
//! chunk types:
//! * **Header** (`IHDR`) - Dimensions and pixel format. Must be first.
//! * **Palette** (`PLTE`) - Required for indexed color, optional otherwise.
//! * **Image Data** (`IDAT`) - One or more chunks of compressed data, which
//!   must all appear one after the other.
//! * **End** (`IEND`) - The last chunk.
//!
//! Between the header and the image data there are also zero or more
//! "ancillary" chunks, several of which have their own placement rules.
//!
//! ## How The Audit Works
//!
//! Chunks are handled strictly one after the other:
//!
//! 1) The length and tag are read ([`ChunkHeader`]).
//! 2) The CRC is computed by streaming the chunk through in morsels, then
//!    compared with the stored value.
//! 3) The placement of the chunk is checked against everything seen before it
//!    ([`ChunkOrder`]).
//! 4) The chunk's data is interpreted by the handler for its [`ChunkKind`],
//!    which is looked up from the tag.
//! 5) The input is moved to the start of the next chunk, no matter how much
//!    of the data the handler actually read.
//!
//! Nothing here ever decodes pixels.

mod bkgd;
mod chrm;
mod chunk;
mod gama;
mod hist;
mod iccp;
mod idat;
mod iend;
mod ihdr;
mod itxt;
mod order;
mod phys;
mod plte;
mod sbit;
mod splt;
mod srgb;
mod text;
mod time;
mod trns;
mod unknown;
mod ztxt;

pub use bkgd::*;
pub use chrm::*;
pub use chunk::*;
pub use ihdr::*;
pub use order::*;
pub use phys::*;
pub use plte::*;
pub use sbit::*;
pub use splt::*;
pub use srgb::*;
pub use text::KEYWORD_WINDOW;
pub use time::*;

use crate::chunk_tag::ChunkTag;

use self::{ChunkKind as K, Visibility as V};

/// The 8 bytes every PNG starts with.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the initial 8 bytes are the PNG signature.
#[inline]
#[must_use]
pub const fn is_png_signature_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Every chunk type that gets its own handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkKind {
  /// `IHDR`
  Header,
  /// `PLTE`
  Palette,
  /// `IDAT`
  ImageData,
  /// `IEND`
  End,
  /// `bKGD`
  Background,
  /// `cHRM`
  Chromaticity,
  /// `gAMA`
  Gamma,
  /// `hIST`
  Histogram,
  /// `pHYs`
  PhysicalDimensions,
  /// `sBIT`
  SignificantBits,
  /// `tEXt`
  Text,
  /// `tIME`
  Time,
  /// `tRNS`
  Transparency,
  /// `zTXt`
  CompressedText,
  /// `iCCP`
  ColorProfile,
  /// `sPLT`
  SuggestedPalette,
  /// `sRGB`
  StandardRgb,
  /// `iTXt`
  InternationalText,
  /// A registered extension that isn't interpreted (`oFFs`, `pCAL`, etc).
  Extension,
  /// `gIFt`, which was dropped from the registry.
  Deprecated,
  /// Anything not in the table.
  Unknown,
}

/// When a chunk's fields get printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
  /// Printed unless the audit is in text-only mode.
  Standard,
  /// Always printed.
  Always,
}
impl Visibility {
  /// If output should happen, given the text-only setting.
  #[inline]
  #[must_use]
  pub const fn enabled(self, text_only: bool) -> bool {
    match self {
      Self::Standard => !text_only,
      Self::Always => true,
    }
  }
}

/// An entry of the [`CHUNK_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkEntry {
  /// The four letter type.
  pub tag: ChunkTag,
  /// Which handler the chunk gets.
  pub kind: ChunkKind,
  /// When the chunk's fields are printed.
  pub visibility: Visibility,
}
const fn entry(tag: ChunkTag, kind: ChunkKind, visibility: Visibility) -> ChunkEntry {
  ChunkEntry { tag, kind, visibility }
}

/// Every known chunk tag.
pub const CHUNK_TABLE: &[ChunkEntry] = &[
  entry(ChunkTag::IHDR, K::Header, V::Standard),
  entry(ChunkTag::PLTE, K::Palette, V::Standard),
  entry(ChunkTag::IDAT, K::ImageData, V::Standard),
  entry(ChunkTag::IEND, K::End, V::Standard),
  entry(ChunkTag::bKGD, K::Background, V::Standard),
  entry(ChunkTag::cHRM, K::Chromaticity, V::Standard),
  entry(ChunkTag::gAMA, K::Gamma, V::Standard),
  entry(ChunkTag::hIST, K::Histogram, V::Standard),
  entry(ChunkTag::pHYs, K::PhysicalDimensions, V::Standard),
  entry(ChunkTag::sBIT, K::SignificantBits, V::Standard),
  entry(ChunkTag::tEXt, K::Text, V::Always),
  entry(ChunkTag::tIME, K::Time, V::Standard),
  entry(ChunkTag::tRNS, K::Transparency, V::Standard),
  entry(ChunkTag::zTXt, K::CompressedText, V::Always),
  entry(ChunkTag::iCCP, K::ColorProfile, V::Always),
  entry(ChunkTag::sPLT, K::SuggestedPalette, V::Always),
  entry(ChunkTag::sRGB, K::StandardRgb, V::Standard),
  entry(ChunkTag::iTXt, K::InternationalText, V::Always),
  entry(ChunkTag::oFFs, K::Extension, V::Always),
  entry(ChunkTag::pCAL, K::Extension, V::Always),
  entry(ChunkTag::gIFg, K::Extension, V::Always),
  entry(ChunkTag::gIFx, K::Extension, V::Always),
  entry(ChunkTag::fRAc, K::Extension, V::Always),
  entry(ChunkTag::gIFt, K::Deprecated, V::Always),
];

impl ChunkEntry {
  /// Finds the entry for a tag. Tags not in the table get an
  /// [`Unknown`](ChunkKind::Unknown) entry.
  #[must_use]
  pub fn lookup(tag: ChunkTag) -> Self {
    CHUNK_TABLE
      .iter()
      .find(|e| e.tag == tag)
      .copied()
      .unwrap_or(entry(tag, ChunkKind::Unknown, Visibility::Always))
  }
}

#[test]
fn test_chunk_table_lookup() {
  assert_eq!(ChunkEntry::lookup(ChunkTag::IHDR).kind, ChunkKind::Header);
  assert_eq!(ChunkEntry::lookup(ChunkTag::zTXt).visibility, Visibility::Always);
  let e = ChunkEntry::lookup(ChunkTag(*b"abcd"));
  assert_eq!(e.kind, ChunkKind::Unknown);
  assert_eq!(e.tag, ChunkTag(*b"abcd"));
  // lowercase `ihdr` is a different tag entirely
  assert_eq!(ChunkEntry::lookup(ChunkTag(*b"ihdr")).kind, ChunkKind::Unknown);
  // no tag is listed twice
  for (i, a) in CHUNK_TABLE.iter().enumerate() {
    assert!(CHUNK_TABLE[i + 1..].iter().all(|b| b.tag != a.tag), "{:?}", a.tag);
  }
}

#[test]
fn test_is_png_signature_correct() {
  assert!(is_png_signature_correct(&PNG_SIGNATURE));
  assert!(!is_png_signature_correct(&PNG_SIGNATURE[..7]));
  assert!(!is_png_signature_correct(b"GIF89a\0\0"));
}
