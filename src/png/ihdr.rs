use std::io::{Read, Seek, Write};

use log::debug;

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

/// The PNG color types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The bit depths this color type can be stored with.
  #[inline]
  #[must_use]
  pub const fn allowed_bit_depths(self) -> &'static [u8] {
    match self {
      Self::Y => &[1, 2, 4, 8, 16],
      Self::Index => &[1, 2, 4, 8],
      Self::RGB | Self::YA | Self::RGBA => &[8, 16],
    }
  }

  /// A plain description of the image, given a legal bit depth.
  fn describe(self, bit_depth: u8) -> String {
    let levels = 1_u32 << bit_depth;
    match self {
      Self::Y => format!("Monochrome with {levels} gray levels"),
      Self::RGB => format!("True color with {levels} levels of R, G and B"),
      Self::Index => format!("Palette with {levels} colors"),
      Self::YA => format!("Monochrome with transparency with {levels} levels of gray and alpha"),
      Self::RGBA => {
        format!("True color with transparency with {levels} levels of R, G, B and alpha")
      }
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = ();
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(()),
    })
  }
}

/// Image Header
///
/// The fields are kept exactly as declared, legal or not, since the rest of
/// the audit judges later chunks against what the header *said*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IHDR {
  /// width in pixels (negative is an error, but it's still what was declared)
  pub width: i32,
  /// height in pixels
  pub height: i32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type, see [`PngColorType`]
  pub color_type: u8,
  /// must be 0
  pub compression_method: u8,
  /// must be 0
  pub filter_method: u8,
  /// 0 (none) or 1 (Adam7)
  pub interlace_method: u8,
}
impl IHDR {
  /// Splits up the 13 bytes of an `IHDR` chunk.
  #[inline]
  #[must_use]
  pub const fn from_bytes(bytes: [u8; 13]) -> Self {
    let [
      w0,
      w1,
      w2,
      w3,
      h0,
      h1,
      h2,
      h3,
      bit_depth,
      color_type,
      compression_method,
      filter_method,
      interlace_method,
    ] = bytes;
    Self {
      width: i32::from_be_bytes([w0, w1, w2, w3]),
      height: i32::from_be_bytes([h0, h1, h2, h3]),
      bit_depth,
      color_type,
      compression_method,
      filter_method,
      interlace_method,
    }
  }

  /// The color type, if it's one of the legal ones.
  #[inline]
  #[must_use]
  pub fn color(&self) -> Option<PngColorType> {
    PngColorType::try_from(self.color_type).ok()
  }

  /// The color type only has flag meaning in the low 3 bits.
  #[inline]
  const fn flag(&self, bit: u8) -> bool {
    self.color_type <= 7 && (self.color_type & bit) != 0
  }

  /// Bit 0 of the color type.
  #[inline]
  #[must_use]
  pub const fn palette_used(&self) -> bool {
    self.flag(1)
  }

  /// Bit 1 of the color type.
  #[inline]
  #[must_use]
  pub const fn color_used(&self) -> bool {
    self.flag(2)
  }

  /// Bit 2 of the color type.
  #[inline]
  #[must_use]
  pub const fn alpha_used(&self) -> bool {
    self.flag(4)
  }

  /// One more than the largest sample value at this bit depth.
  #[inline]
  #[must_use]
  pub const fn sample_limit(&self) -> u64 {
    if self.bit_depth >= 63 {
      u64::MAX
    } else {
      1 << self.bit_depth
    }
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_ihdr(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length != 13 {
      return self.error("header chunk should be 13 bytes long");
    }
    let ihdr = IHDR::from_bytes(self.cursor.read_array::<13>()?);

    if output {
      writeln!(self.out, "    Width: {}", ihdr.width)?;
      writeln!(self.out, "    Height: {}", ihdr.height)?;
      writeln!(self.out, "    Bit depth: {}", ihdr.bit_depth)?;
      write!(self.out, "    Color type: {}", ihdr.color_type)?;
      if ihdr.color_type <= 7 {
        let bit = |b: u8| if ihdr.color_type & b != 0 { '1' } else { '0' };
        write!(self.out, " (b{}{}{})", bit(1), bit(2), bit(4))?;
      }
      writeln!(self.out)?;
      writeln!(self.out, "    Compression: {}", ihdr.compression_method)?;
      writeln!(self.out, "    Filter: {}", ihdr.filter_method)?;
      writeln!(self.out, "    Interlace: {}", ihdr.interlace_method)?;
    }
    if ihdr.width < 0 {
      self.error("negative width")?;
    }
    if ihdr.height < 0 {
      self.error("negative height")?;
    }

    if ihdr.color_type > 7 {
      self.error("color type has no meaning")?;
    } else {
      if output {
        writeln!(
          self.out,
          "\n  Interpretation: {}, {}, {}",
          if ihdr.palette_used() { "palette used" } else { "no palette" },
          if ihdr.color_used() { "color used" } else { "no color" },
          if ihdr.alpha_used() { "alpha channel used" } else { "no alpha channel" },
        )?;
      }
      match ihdr.color() {
        Some(color) if color.allowed_bit_depths().contains(&ihdr.bit_depth) => {
          if output {
            writeln!(self.out, "  meaning: {}", color.describe(ihdr.bit_depth))?;
          }
        }
        Some(color) => {
          let allowed: Vec<String> =
            color.allowed_bit_depths().iter().map(u8::to_string).collect();
          self.error(format_args!(
            "forbidden bit depth (should be {} for color type {})",
            allowed.join(", "),
            ihdr.color_type
          ))?;
        }
        None => self.error("forbidden color type")?,
      }
    }

    if ihdr.compression_method != 0 {
      self.error("compression type unknown (only 0 is allowed in PNG 1.0)")?;
    }
    if ihdr.filter_method != 0 {
      self.error("filter type unknown (only 0 is allowed in PNG 1.0)")?;
    }
    match ihdr.interlace_method {
      0 => {
        if output {
          writeln!(self.out, "  No interlace")?;
        }
      }
      1 => {
        if output {
          writeln!(self.out, "  Interlace: Adam7")?;
        }
      }
      _ => self.error("unknown interlace type (only 0 and 1 are allowed in PNG 1.0)")?,
    }

    match self.image {
      None => self.image = Some(ihdr),
      Some(first) if first != ihdr => {
        debug!("ignoring a later header that disagrees with the first one");
      }
      Some(_) => (),
    }
    Ok(())
  }
}

#[test]
#[allow(nonstandard_style)]
fn test_IHDR_from_bytes() {
  let ihdr = IHDR::from_bytes([0, 0, 1, 0, 0xFF, 0xFF, 0xFF, 0xFF, 8, 3, 0, 0, 1]);
  assert_eq!(ihdr.width, 256);
  assert_eq!(ihdr.height, -1);
  assert_eq!(ihdr.bit_depth, 8);
  assert_eq!(ihdr.color(), Some(PngColorType::Index));
  assert!(ihdr.palette_used() && ihdr.color_used() && !ihdr.alpha_used());
  assert_eq!(ihdr.interlace_method, 1);
  assert_eq!(ihdr.sample_limit(), 256);
}

#[test]
#[allow(nonstandard_style)]
fn test_IHDR_color_flags() {
  let mut ihdr = IHDR::from_bytes([0; 13]);
  ihdr.color_type = 6;
  assert!(!ihdr.palette_used() && ihdr.color_used() && ihdr.alpha_used());
  ihdr.color_type = 7;
  assert!(ihdr.palette_used() && ihdr.color_used() && ihdr.alpha_used());
  assert_eq!(ihdr.color(), None);
  // past 7 the flags mean nothing
  ihdr.color_type = 9;
  assert!(!ihdr.palette_used() && !ihdr.color_used() && !ihdr.alpha_used());
}

#[test]
#[allow(nonstandard_style)]
fn test_PngColorType_bit_depths() {
  for (ty, depths) in [
    (0, &[1, 2, 4, 8, 16][..]),
    (2, &[8, 16][..]),
    (3, &[1, 2, 4, 8][..]),
    (4, &[8, 16][..]),
    (6, &[8, 16][..]),
  ] {
    assert_eq!(PngColorType::try_from(ty).unwrap().allowed_bit_depths(), depths);
  }
  for bad in [1, 5, 7, 8, 255] {
    assert!(PngColorType::try_from(bad).is_err());
  }
}
