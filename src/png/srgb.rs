use std::io::{Read, Seek, Write};

use super::ChunkHeader;
use crate::{audit::Auditor, error::AuditResult};

/// Names of the `sRGB` rendering intents, by value.
pub const RENDERING_INTENTS: [&str; 4] =
  ["Perceptual", "Relative colorimetric", "Saturation", "Absolute colorimetric"];

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  pub(crate) fn interpret_srgb(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if chunk.length != 1 {
      return self.error("should be 1 byte long");
    }
    let intent = self.cursor.read_u8()?;
    if output {
      writeln!(self.out, "    Rendering intent = {intent}")?;
    }
    match RENDERING_INTENTS.get(usize::from(intent)) {
      Some(name) => {
        if output {
          writeln!(self.out, "    meaning: {name}")?;
        }
      }
      None => self.error("value has no meaning")?,
    }
    Ok(())
  }
}
