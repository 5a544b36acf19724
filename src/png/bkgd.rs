use std::io::{Read, Seek, Write};

use super::{ChunkHeader, PngColorType};
use crate::{audit::Auditor, error::AuditResult};

/// Background color.
///
/// RGB and Greyscale colors are always given as `u16` values. The actual color
/// selected should stay within the bit depth range of the rest of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
#[allow(missing_docs)]
pub enum bKGD {
  Greyscale { y: u16 },
  RGB { r: u16, g: u16, b: u16 },
  Index { i: u8 },
}
impl bKGD {
  /// How many bytes the chunk holds for a given color type.
  #[inline]
  #[must_use]
  pub const fn expected_len(color: PngColorType) -> u32 {
    match color {
      PngColorType::Index => 1,
      PngColorType::Y | PngColorType::YA => 2,
      PngColorType::RGB | PngColorType::RGBA => 6,
    }
  }
}
impl TryFrom<&[u8]> for bKGD {
  type Error = ();
  #[inline]
  fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
    Ok(match slice {
      [y0, y1] => bKGD::Greyscale { y: u16::from_be_bytes([*y0, *y1]) },
      [r0, r1, g0, g1, b0, b1] => bKGD::RGB {
        r: u16::from_be_bytes([*r0, *r1]),
        g: u16::from_be_bytes([*g0, *g1]),
        b: u16::from_be_bytes([*b0, *b1]),
      },
      [i] => bKGD::Index { i: *i },
      _ => return Err(()),
    })
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_bkgd(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    let Some(ihdr) = self.image else {
      return self
        .error("meaning of background color depends on color type, which is undefined");
    };
    let Some(color) = ihdr.color() else {
      return self.error(
        "meaning of background color depends on color type, which has a forbidden value",
      );
    };
    let expected = bKGD::expected_len(color);
    if chunk.length != expected {
      return self.error(format_args!(
        "chunk size should be {expected} for color mode {}",
        ihdr.color_type
      ));
    }
    let data = self.cursor.read_vec(expected as usize)?;
    let limit = ihdr.sample_limit();
    match bKGD::try_from(data.as_slice()) {
      Ok(bKGD::Index { i }) => {
        if u32::from(i) < self.palette_len.unwrap_or(0) {
          if output {
            writeln!(self.out, "    Background color has index (in the palette) = {i}")?;
          }
        } else {
          self.error("background color's index is out of the palette")?;
        }
      }
      Ok(bKGD::Greyscale { y }) => {
        if u64::from(y) < limit {
          if output {
            writeln!(self.out, "    Background Intensity = {y}")?;
          }
        } else {
          self.error("background intensity is over the maximum")?;
        }
      }
      Ok(bKGD::RGB { r, g, b }) => {
        if [r, g, b].iter().all(|&c| u64::from(c) < limit) {
          if output {
            writeln!(self.out, "    RGB values of background = {r},{g},{b}")?;
          }
        } else {
          self.error("RGB values of background over bit depth")?;
        }
      }
      // the length was already checked against the color type
      Err(()) => (),
    }
    Ok(())
  }
}

#[test]
#[allow(nonstandard_style)]
fn test_bKGD_try_from() {
  assert_eq!(bKGD::try_from(&[1, 2][..]), Ok(bKGD::Greyscale { y: 0x0102 }));
  assert_eq!(bKGD::try_from(&[7][..]), Ok(bKGD::Index { i: 7 }));
  assert_eq!(bKGD::try_from(&[0, 1, 0, 2, 0, 3][..]), Ok(bKGD::RGB { r: 1, g: 2, b: 3 }));
  assert_eq!(bKGD::try_from(&[0, 1, 0][..]), Err(()));
  for color in [0, 2, 3, 4, 6] {
    let color = PngColorType::try_from(color).unwrap();
    let fake = vec![0; bKGD::expected_len(color) as usize];
    assert!(bKGD::try_from(fake.as_slice()).is_ok());
  }
}
