use std::io::{Read, Seek, Write};

use super::{text::Payload, ChunkHeader};
use crate::{audit::Auditor, error::AuditResult};

impl<R: Read + Seek, W: Write> Auditor<R, W> {
  /// `iCCP`: profile name, compression method, then a zlib compressed ICC
  /// profile. The profile is decompressed to check it (and to feed the
  /// profile dump), but its contents aren't interpreted.
  pub(crate) fn interpret_iccp(&mut self, chunk: &ChunkHeader, output: bool) -> AuditResult<()> {
    if output {
      writeln!(self.out, "    Embedded International Color Consortium profile.")?;
    }
    if self.read_keyword(chunk, "Profile name", output)?.is_none() {
      return Ok(());
    }
    let Some(method) = self.read_field_byte(chunk, "compression method")? else {
      return Ok(());
    };
    if output {
      writeln!(self.out, "    Compression method (0=zlib) : {method}")?;
    }
    if method != 0 {
      return self.error("compression method unknown (only 0 is allowed)");
    }
    match self.inflate_rest(chunk, Payload::Profile)? {
      Ok(size) => {
        if output {
          writeln!(self.out, "    Content: {size} bytes of profile data, not interpreted.")?;
        }
      }
      Err(e) => self.error(format_args!("while inflating the profile, {e}"))?,
    }
    Ok(())
  }
}
