//! The CRC-32 used by PNG chunks.
//!
//! This is the reflected polynomial `0xEDB8_8320` variant, driven by a 256
//! entry table that's built at compile time. A chunk's checksum covers the
//! chunk type bytes plus the chunk data (but *not* the length), starting from
//! a register of all ones and inverting the register at the end.

/// Lookup table, one entry per possible byte value.
pub const CRC_TABLE: [u32; 256] = make_crc_table();

/// Builds the [`CRC_TABLE`].
pub const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      //
      k += 1;
    }
    out[n] = c;
    //
    n += 1;
  }
  out
}

/// Pushes more bytes through a running CRC register.
///
/// The register is *not* pre or post conditioned here, so this can be called
/// over and over on successive pieces of a chunk.
#[inline]
#[must_use]
pub fn update_crc(mut crc: u32, bytes: &[u8]) -> u32 {
  for &byte in bytes {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// The register value a chunk checksum starts from.
pub const CRC_SEED: u32 = u32::MAX;

/// Finishes off a register that was started with [`CRC_SEED`].
#[inline]
#[must_use]
pub const fn finish_crc(crc: u32) -> u32 {
  crc ^ u32::MAX
}

/// Computes the whole checksum of a chunk that's already in memory.
#[inline]
#[must_use]
pub fn chunk_crc(tag: [u8; 4], data: &[u8]) -> u32 {
  finish_crc(update_crc(update_crc(CRC_SEED, &tag), data))
}

#[test]
fn test_crc_table_known_entries() {
  assert_eq!(CRC_TABLE[0], 0);
  assert_eq!(CRC_TABLE[1], 0x7707_3096);
  assert_eq!(CRC_TABLE[255], 0x2D02_EF8D);
}

#[test]
fn test_chunk_crc_of_iend() {
  // every PNG ends with these same 12 bytes, crc included.
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
}

#[test]
fn test_update_crc_is_resumable() {
  let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
  let whole = update_crc(CRC_SEED, &data);
  let (a, b) = data.split_at(377);
  assert_eq!(update_crc(update_crc(CRC_SEED, a), b), whole);
}
