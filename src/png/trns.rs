use std::io::{Read, Seek, Write};

use super::{ChunkHeader, PngColorType};
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// Transparency
  ///
  /// * greyscale: one `u16` level
  /// * RGB: three `u16` values
  /// * indexed: up to one alpha byte per palette entry
  ///
  /// Color types that already have alpha can't have this chunk at all.
  pub(crate) fn interpret_trns(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    let Some((ihdr, color)) = self.image.and_then(|ihdr| Some((ihdr, ihdr.color()?))) else {
      return self.error("meaning of transparency depends on color type, which is undefined");
    };
    let max = ihdr.sample_limit() - 1;
    match color {
      PngColorType::Index => {
        if output {
          writeln!(self.out, "    in color mode 3, this chunk contains an array of")?;
          writeln!(self.out, "    alpha values corresponding to palette entries")?;
          writeln!(self.out, "    entries: {}", chunk.length)?;
        }
        match self.palette_len {
          Some(palette_len) if chunk.length > palette_len => {
            self.error("more entries than the palette")?;
          }
          Some(_) => (),
          None => self.error("this chunk should occur after the palette chunk")?,
        }
      }
      PngColorType::Y => {
        if chunk.length != 2 {
          return self.error("chunk should be 2 bytes long");
        }
        let level = self.cursor.read_u16()?;
        if output {
          writeln!(self.out, "    in color mode 0, this chunk contains the gray level of")?;
          writeln!(self.out, "    the only transparent color: {level}")?;
        }
        if u64::from(level) > max {
          self.error(format_args!("level too big for given bit depth (max={max})"))?;
        }
      }
      PngColorType::RGB => {
        if chunk.length != 6 {
          return self.error("chunk should be 6 bytes long");
        }
        let [r, g, b] = [self.cursor.read_u16()?, self.cursor.read_u16()?, self.cursor.read_u16()?];
        if output {
          writeln!(self.out, "    in color mode 2, this chunk contains the RGB values of")?;
          writeln!(self.out, "    the only transparent color: {r}, {g}, {b}")?;
        }
        if u64::from(r.max(g).max(b)) > max {
          self.error(format_args!("value too big for given bit depth (max={max})"))?;
        }
      }
      PngColorType::YA | PngColorType::RGBA => {
        self.error("this chunk is forbidden in color modes other than 0, 2 and 3")?;
      }
    }
    Ok(())
  }
}
