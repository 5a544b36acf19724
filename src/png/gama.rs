use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// `gAMA` is one `u32`, the gamma times 100,000.
  pub(crate) fn interpret_gama(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length != 4 {
      return self.error("GAMMA chunk length should be 4 bytes");
    }
    let raw = self.cursor.read_u32()?;
    if output {
      writeln!(self.out, "    Gamma = {}", f64::from(raw) / 100_000.0)?;
    }
    if raw == 0 {
      self.error("gamma should not be zero")?;
    }
    Ok(())
  }
}
