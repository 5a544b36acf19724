use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

/// Physical pixel dimensions
///
/// Spec: [pHYs](https://www.w3.org/TR/png/#11pHYs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
pub struct pHYs {
  /// pixels per unit, X axis
  pub x: u32,
  /// pixels per unit, Y axis
  pub y: u32,
  /// 0 means "no unit" (only the aspect ratio is known), 1 means meters.
  pub unit: u8,
}
impl pHYs {
  /// Splits up the 9 bytes of the chunk.
  #[inline]
  #[must_use]
  pub const fn from_bytes(bytes: [u8; 9]) -> Self {
    let [x0, x1, x2, x3, y0, y1, y2, y3, unit] = bytes;
    Self { x: u32::from_be_bytes([x0, x1, x2, x3]), y: u32::from_be_bytes([y0, y1, y2, y3]), unit }
  }

  /// Converts dots per meter to dots per inch.
  #[inline]
  #[must_use]
  pub fn to_dpi(per_meter: u32) -> f64 {
    0.0254 * f64::from(per_meter)
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_phys(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length != 9 {
      return self.error("this chunk should have 9 octets");
    }
    let phys = pHYs::from_bytes(self.cursor.read_array()?);
    if output {
      for (axis, value) in [("X", phys.x), ("Y", phys.y)] {
        write!(self.out, "    {axis} : {value} dots per unit")?;
        if phys.unit == 1 {
          write!(self.out, " (meaning {}dpi)", pHYs::to_dpi(value))?;
        }
        writeln!(self.out)?;
      }
      write!(self.out, "    Unit specifier {}", phys.unit)?;
      match phys.unit {
        0 => writeln!(self.out, " (no unit)")?,
        1 => writeln!(self.out, " (meter)")?,
        _ => writeln!(self.out)?,
      }
    }
    if phys.unit > 1 {
      self.error("unit specifier should be 0 or 1")?;
    }
    Ok(())
  }
}

#[test]
#[allow(nonstandard_style)]
fn test_pHYs_from_bytes() {
  let phys = pHYs::from_bytes([0, 0, 0x0B, 0x13, 0, 0, 0x0B, 0x13, 1]);
  assert_eq!(phys, pHYs { x: 2835, y: 2835, unit: 1 });
  assert!((pHYs::to_dpi(phys.x) - 72.009).abs() < 0.001);
}
