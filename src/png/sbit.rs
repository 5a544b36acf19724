use std::io::{Read, Seek, Write};

use super::{ChunkHeader, PngColorType};
use crate::{audit::Auditor, error::AuditResult};

/// The channel names `sBIT` gives a value for, in file order.
#[must_use]
pub const fn significant_bits_channels(color: PngColorType) -> &'static [&'static str] {
  match color {
    PngColorType::Y => &["gray"],
    PngColorType::RGB | PngColorType::Index => &["red", "green", "blue"],
    PngColorType::YA => &["gray", "alpha"],
    PngColorType::RGBA => &["red", "green", "blue", "alpha"],
  }
}

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// Each value must be at least 1 and at most the sample depth, which for an
  /// indexed image is the depth of the palette (always 8).
  pub(crate) fn interpret_sbit(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    let Some((ihdr, color)) = self.image.and_then(|ihdr| Some((ihdr, ihdr.color()?))) else {
      return self.error("meaning depends on color type, which is undefined or wrong");
    };
    let channels = significant_bits_channels(color);
    if chunk.length as usize != channels.len() {
      return self.error(format_args!(
        "in color mode {}, this chunk should be {} bytes long",
        ihdr.color_type,
        channels.len()
      ));
    }
    let values = self.cursor.read_vec(channels.len())?;
    if output {
      let listed: Vec<String> =
        channels.iter().zip(values.iter()).map(|(name, v)| format!("{name}={v}")).collect();
      writeln!(self.out, "    Significant bits of original data: {}", listed.join(", "))?;
    }
    let depth = if color == PngColorType::Index { 8 } else { ihdr.bit_depth };
    if values.iter().any(|&v| v == 0 || v > depth) {
      self.error("values should be > 0 and at most equal to the bit depth")?;
    }
    Ok(())
  }
}
