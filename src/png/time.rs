use core::ops::RangeInclusive;
use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

/// Image last-modification time
///
/// Spec: [tIME](https://www.w3.org/TR/png/#11tIME)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
#[allow(missing_docs)]
pub struct tIME {
  pub year: u16,
  pub month: u8,
  pub day: u8,
  pub hour: u8,
  pub minute: u8,
  /// 60 is allowed, for leap seconds.
  pub second: u8,
}
impl tIME {
  /// Splits up the 7 bytes of the chunk.
  #[inline]
  #[must_use]
  pub const fn from_bytes(bytes: [u8; 7]) -> Self {
    let [y0, y1, month, day, hour, minute, second] = bytes;
    Self { year: u16::from_be_bytes([y0, y1]), month, day, hour, minute, second }
  }

  /// Names every field that's outside its legal range, with that range.
  #[must_use]
  pub fn out_of_range(&self) -> Vec<(&'static str, RangeInclusive<u8>)> {
    [
      ("month", self.month, 1..=12),
      ("day", self.day, 1..=31),
      ("hour", self.hour, 0..=23),
      ("minute", self.minute, 0..=59),
      ("second", self.second, 0..=60),
    ]
    .into_iter()
    .filter(|(_, value, range)| !range.contains(value))
    .map(|(name, _, range)| (name, range))
    .collect()
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_time(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length != 7 {
      return self.error("this chunk should be 7 bytes long");
    }
    let t = tIME::from_bytes(self.cursor.read_array()?);
    if output {
      writeln!(
        self.out,
        "    Last modification: time: {}h:{}mn:{}s date: {}/{}/{}",
        t.hour, t.minute, t.second, t.day, t.month, t.year
      )?;
    }
    for (name, range) in t.out_of_range() {
      self.error(format_args!(
        "{name} out of range (should be {} to {})",
        range.start(),
        range.end()
      ))?;
    }
    Ok(())
  }
}

#[test]
#[allow(nonstandard_style)]
fn test_tIME_ranges() {
  let t = tIME::from_bytes([0x07, 0xE8, 2, 29, 23, 59, 60]);
  assert_eq!(t.year, 2024);
  assert!(t.out_of_range().is_empty());
  let t = tIME::from_bytes([0x07, 0xE8, 0, 32, 24, 59, 61]);
  let names: Vec<_> = t.out_of_range().into_iter().map(|(name, _)| name).collect();
  assert_eq!(names, ["month", "day", "hour", "second"]);
}
