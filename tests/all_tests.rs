#![allow(bad_style)]

use pngaudit::{audit, png::PNG_SIGNATURE, AuditOptions, AuditResult, AuditSummary};

mod cli;
mod png;

fn rand_bytes(count: usize) -> Vec<u8> {
  let mut buffer = vec![0; count];
  getrandom::getrandom(&mut buffer).unwrap();
  buffer
}

/// The CRC of a chunk, by a completely separate implementation.
fn reference_crc(tag: &[u8; 4], data: &[u8]) -> u32 {
  let mut h = crc32fast::Hasher::new();
  h.update(tag);
  h.update(data);
  h.finalize()
}

/// Builds PNG files chunk by chunk.
struct PngBuilder {
  bytes: Vec<u8>,
}
impl PngBuilder {
  fn new() -> Self {
    Self { bytes: PNG_SIGNATURE.to_vec() }
  }

  fn chunk(self, tag: &[u8; 4], data: &[u8]) -> Self {
    let crc = reference_crc(tag, data);
    self.chunk_with_crc(tag, data, crc)
  }

  fn chunk_with_crc(mut self, tag: &[u8; 4], data: &[u8], crc: u32) -> Self {
    self.bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    self.bytes.extend_from_slice(tag);
    self.bytes.extend_from_slice(data);
    self.bytes.extend_from_slice(&crc.to_be_bytes());
    self
  }

  fn raw(mut self, bytes: &[u8]) -> Self {
    self.bytes.extend_from_slice(bytes);
    self
  }

  fn ihdr(self, width: u32, height: u32, bit_depth: u8, color_type: u8) -> Self {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[bit_depth, color_type, 0, 0, 0]);
    self.chunk(b"IHDR", &data)
  }

  fn iend(self) -> Self {
    self.chunk(b"IEND", &[])
  }

  fn build(self) -> Vec<u8> {
    self.bytes
  }
}

/// Audits some bytes, giving back the result and the report text.
fn run_audit(bytes: Vec<u8>, options: AuditOptions) -> (AuditResult<AuditSummary>, String) {
  let mut report = Vec::new();
  let result = audit(std::io::Cursor::new(bytes), &mut report, options);
  (result, String::from_utf8(report).unwrap())
}
