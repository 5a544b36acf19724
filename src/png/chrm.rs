use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

/// Primary chromaticities and white point
///
/// Spec: [cHRM](https://www.w3.org/TR/png/#11cHRM)
///
/// Each value is the CIE coordinate times 100,000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
#[allow(missing_docs)]
pub struct cHRM {
  pub white_x: u32,
  pub white_y: u32,
  pub red_x: u32,
  pub red_y: u32,
  pub green_x: u32,
  pub green_y: u32,
  pub blue_x: u32,
  pub blue_y: u32,
}
impl cHRM {
  /// Splits up the 32 bytes of the chunk.
  #[inline]
  #[must_use]
  pub fn from_bytes(bytes: [u8; 32]) -> Self {
    let [white_x, white_y, red_x, red_y, green_x, green_y, blue_x, blue_y] =
      bytemuck::cast::<[u8; 32], [[u8; 4]; 8]>(bytes).map(u32::from_be_bytes);
    Self { white_x, white_y, red_x, red_y, green_x, green_y, blue_x, blue_y }
  }

  /// All eight values with their labels, in file order.
  #[must_use]
  pub fn labeled(&self) -> [(&'static str, f64); 8] {
    let f = |v: u32| f64::from(v) / 100_000.0;
    [
      ("White Point x", f(self.white_x)),
      ("White Point y", f(self.white_y)),
      ("Red Point x", f(self.red_x)),
      ("Red Point y", f(self.red_y)),
      ("Green Point x", f(self.green_x)),
      ("Green Point y", f(self.green_y)),
      ("Blue Point x", f(self.blue_x)),
      ("Blue Point y", f(self.blue_y)),
    ]
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_chrm(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length != 32 {
      return self.error("chromaticity chunk length should be 32 bytes");
    }
    let chrm = cHRM::from_bytes(self.cursor.read_array()?);
    if output {
      for (label, value) in chrm.labeled() {
        writeln!(self.out, "    {label} = {value}")?;
      }
    }
    Ok(())
  }
}

#[test]
#[allow(nonstandard_style)]
fn test_cHRM_from_bytes() {
  let mut bytes = [0_u8; 32];
  bytes[..4].copy_from_slice(&31270_u32.to_be_bytes());
  bytes[28..].copy_from_slice(&6000_u32.to_be_bytes());
  let chrm = cHRM::from_bytes(bytes);
  assert_eq!(chrm.white_x, 31270);
  assert_eq!(chrm.blue_y, 6000);
  assert_eq!(chrm.labeled()[0], ("White Point x", 0.3127));
  assert_eq!(chrm.labeled()[7], ("Blue Point y", 0.06));
}
