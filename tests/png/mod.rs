use std::{cell::RefCell, io::Write, rc::Rc};

use pngaudit::{
  audit, crc32::chunk_crc, cursor::decode_number, png::RENDERING_INTENTS, AuditOptions, ByteCursor,
  FatalError, MORSEL_LEN,
};
use proptest::prelude::*;
use walkdir::WalkDir;

use super::{rand_bytes, reference_crc, run_audit, PngBuilder};

#[test]
fn test_minimal_file_looks_ok() {
  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).iend().build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  let summary = result.unwrap();
  assert_eq!(summary.error_count, 0);
  assert_eq!(summary.bad_crc_count, 0);
  assert!(summary.end_seen);
  assert!(summary.looks_ok());
  assert!(report.starts_with("- Signature (first 8 bytes) : 137 80 78 71 13 10 26 10\n  correct\n"));
  assert!(report.contains("- Chunk IHDR\n  Size = 13 bytes\n"), "{report}");
  assert!(report.contains("    Width: 1\n"), "{report}");
  assert!(report.contains("  meaning: True color with 256 levels of R, G and B\n"), "{report}");
  assert!(report.contains("Image data: 0 bytes in 0 records\n"), "{report}");
  assert!(report.contains("File looks OK.\n"), "{report}");
  assert!(report.ends_with("(No image decoding attempted.)\n"), "{report}");
}

#[test]
fn test_bad_signature_is_fatal() {
  let mut bytes = PngBuilder::new().ihdr(1, 1, 8, 2).iend().build();
  bytes[1] = b'Q';
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert!(matches!(result, Err(FatalError::BadSignature)));
  assert!(!report.contains("- Chunk"), "{report}");
  assert!(report.contains("Fatal Error: wrong signature\n"), "{report}");
  assert!(!report.contains("Analysis finished."), "{report}");
  // too short to even hold a signature
  let (result, _) = run_audit(vec![137, 80, 78], AuditOptions::default());
  assert!(matches!(result, Err(FatalError::UnexpectedEndOfInput)));
}

#[test]
fn test_truncated_header_is_fatal_before_fields() {
  let mut bytes = PngBuilder::new().build();
  bytes.extend_from_slice(&13_u32.to_be_bytes());
  bytes.extend_from_slice(b"IHDR");
  bytes.extend_from_slice(&[0, 0, 0, 1, 0]);
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert!(matches!(result, Err(FatalError::UnexpectedEndOfInput)));
  assert!(!report.contains("Width:"), "{report}");
  assert!(report.contains("Fatal Error: unexpected end of file\n"), "{report}");
}

#[test]
fn test_negative_length_is_fatal() {
  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).raw(&[0x80, 0, 0, 0]).raw(b"IDAT").build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert!(matches!(result, Err(FatalError::NegativeLength)));
  assert!(report.contains("Fatal Error: negative length chunk\n"), "{report}");
}

#[test]
fn test_bad_crc_is_counted_and_the_audit_goes_on() {
  let bytes = PngBuilder::new()
    .ihdr(4, 4, 8, 0)
    .chunk_with_crc(b"IDAT", &[1, 2, 3, 4], 0xDEAD_BEEF)
    .chunk(b"IDAT", &[5, 6])
    .iend()
    .build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  let summary = result.unwrap();
  assert_eq!(summary.bad_crc_count, 1);
  assert_eq!(summary.error_count, 1);
  assert_eq!(summary.image_data_bytes, 6);
  assert_eq!(summary.image_data_chunks, 2);
  assert!(report.contains("Error: CRC check incorrect (file tells 0xdeadbeef"), "{report}");
  assert!(report.contains("1 bad checksums\n"), "{report}");
  assert!(report.contains("1 non-fatal errors detected.\n"), "{report}");
}

#[test]
fn test_streaming_crc_matches_buffered_crc() {
  for n in [0, 1, MORSEL_LEN, MORSEL_LEN + 1, 200_000] {
    let data: Vec<u8> = (0..n).map(|i| (i * 7 + i / 251) as u8).collect();
    assert_eq!(chunk_crc(*b"IDAT", &data), reference_crc(b"IDAT", &data), "n = {n}");
    let bytes = PngBuilder::new().ihdr(16, 16, 8, 6).chunk(b"IDAT", &data).iend().build();
    let (result, report) = run_audit(bytes, AuditOptions::default());
    let summary = result.unwrap();
    assert_eq!(summary.bad_crc_count, 0, "n = {n}: {report}");
    assert_eq!(summary.image_data_bytes, n as u64);
  }
}

#[test]
fn test_missing_end_and_trailing_bytes() {
  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"IDAT", &[0; 10]).build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  let summary = result.unwrap();
  assert!(!summary.end_seen);
  assert_eq!(summary.error_count, 1);
  assert!(report.contains("Error: no END chunk\n"), "{report}");

  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).iend().raw(b"extra").build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  let summary = result.unwrap();
  assert_eq!(summary.trailing_bytes, 5);
  assert!(report.contains("Error: data beyond chunk END (5 bytes)\n"), "{report}");
}

#[test]
fn test_chunk_order_end_to_end() {
  let plte = [0_u8; 6];
  let good =
    PngBuilder::new().ihdr(2, 2, 1, 3).chunk(b"PLTE", &plte).chunk(b"IDAT", &[0]).iend().build();
  let (result, _) = run_audit(good, AuditOptions::default());
  let canonical = result.unwrap().error_count;
  assert_eq!(canonical, 0);

  let no_palette = PngBuilder::new().ihdr(2, 2, 1, 3).chunk(b"IDAT", &[0]).iend().build();
  let (result, report) = run_audit(no_palette, AuditOptions::default());
  assert!(result.unwrap().error_count > canonical);
  assert!(report.contains("ERROR: palette needed before beginning of data\n"), "{report}");

  let late_palette =
    PngBuilder::new().ihdr(2, 2, 1, 3).chunk(b"IDAT", &[0]).chunk(b"PLTE", &plte).iend().build();
  let (result, _) = run_audit(late_palette, AuditOptions::default());
  assert!(result.unwrap().error_count > canonical);

  let split_data = PngBuilder::new()
    .ihdr(2, 2, 8, 0)
    .chunk(b"IDAT", &[0])
    .chunk(b"tEXt", b"a\0b")
    .chunk(b"IDAT", &[0])
    .chunk(b"IDAT", &[0])
    .iend()
    .build();
  let (result, report) = run_audit(split_data, AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1);
  assert!(report.contains("ERROR: DATA chunks should be contiguous\n"), "{report}");
}

#[test]
fn test_header_field_errors() {
  let mut data = Vec::new();
  data.extend_from_slice(&(-5_i32).to_be_bytes());
  data.extend_from_slice(&1_u32.to_be_bytes());
  // depth 4 isn't allowed for RGB, and filter 1 isn't allowed at all
  data.extend_from_slice(&[4, 2, 0, 1, 2]);
  let bytes = PngBuilder::new().chunk(b"IHDR", &data).iend().build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 4, "{report}");
  assert!(report.contains("Error: negative width\n"), "{report}");
  assert!(report.contains("Error: forbidden bit depth (should be 8, 16 for color type 2)\n"));
  assert!(report.contains("Error: filter type unknown"), "{report}");
  assert!(report.contains("Error: unknown interlace type"), "{report}");

  let bytes = PngBuilder::new().chunk(b"IHDR", &[0; 12]).iend().build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1);
  assert!(report.contains("Error: header chunk should be 13 bytes long\n"), "{report}");
}

#[test]
fn test_ancillary_chunks_are_checked_against_the_header() {
  let bytes = PngBuilder::new()
    .ihdr(8, 8, 4, 3)
    .chunk(b"gAMA", &45455_u32.to_be_bytes())
    .chunk(b"sBIT", &[5, 5, 9])
    .chunk(b"PLTE", &[0; 3 * 4])
    .chunk(b"bKGD", &[4])
    .chunk(b"tRNS", &[0; 5])
    .chunk(b"hIST", &[0; 8])
    .chunk(b"pHYs", &[0, 0, 0x0B, 0x13, 0, 0, 0x0B, 0x13, 1])
    .chunk(b"tIME", &[0x07, 0xE8, 13, 1, 12, 0, 0])
    .chunk(b"IDAT", &[0])
    .iend()
    .build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  // sBIT 9 > 8, bKGD index 4 of 4, tRNS 5 entries for 4 colors, month 13
  assert_eq!(result.unwrap().error_count, 4, "{report}");
  assert!(report.contains("    Gamma = 0.45455\n"), "{report}");
  assert!(report.contains("Error: background color's index is out of the palette\n"));
  assert!(report.contains("Error: more entries than the palette\n"), "{report}");
  assert!(report.contains("Error: month out of range (should be 1 to 12)\n"), "{report}");
  assert!(report.contains("    Unit specifier 1 (meter)\n"), "{report}");
}

#[test]
fn test_text_only_mode() {
  let bytes = PngBuilder::new()
    .ihdr(1, 1, 8, 2)
    .chunk(b"tEXt", b"Title\0Sunset")
    .chunk_with_crc(b"IDAT", &[0], 0)
    .iend()
    .build();
  let (result, report) = run_audit(bytes, AuditOptions::default().with_text_only(true));
  let summary = result.unwrap();
  assert_eq!(summary.text_chunks, 1);
  assert!(!report.contains("Width:"), "{report}");
  assert!(!report.contains("- Chunk IHDR"), "{report}");
  assert!(report.contains("- Chunk tEXt\n"), "{report}");
  assert!(report.contains("    Text: \"Sunset\"\n"), "{report}");
  // errors still show up
  assert!(report.contains("Error: CRC check incorrect"), "{report}");
  assert!(report.contains("Text records: 1\n"), "{report}");
}

#[test]
fn test_wrong_length_chunks_are_reported_and_skipped() {
  let bytes = PngBuilder::new()
    .ihdr(8, 8, 8, 3)
    .chunk(b"gAMA", &[0, 1, 2])
    .chunk(b"cHRM", &[0; 31])
    .chunk(b"PLTE", &[0; 3 * 4])
    .chunk(b"hIST", &[0; 6])
    .chunk(b"pHYs", &[0; 8])
    .chunk(b"IDAT", &[0])
    .iend()
    .build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  let summary = result.unwrap();
  assert_eq!(summary.error_count, 4, "{report}");
  assert!(report.contains("Error: GAMMA chunk length should be 4 bytes\n"), "{report}");
  assert!(report.contains("Error: chromaticity chunk length should be 32 bytes\n"), "{report}");
  assert!(
    report.contains("Error: histogram should have same number of entries as the palette\n"),
    "{report}"
  );
  assert!(report.contains("Error: this chunk should have 9 octets\n"), "{report}");
  // none of the fields were printed, and the chunks after them were still found
  assert!(!report.contains("Gamma ="), "{report}");
  assert!(!report.contains("White Point"), "{report}");
  assert!(!report.contains("Unit specifier"), "{report}");
  assert_eq!(summary.image_data_chunks, 1);
  assert!(summary.end_seen);
}

#[test]
fn test_srgb_rendering_intents() {
  for (intent, name) in RENDERING_INTENTS.iter().enumerate() {
    let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"sRGB", &[intent as u8]).iend().build();
    let (result, report) = run_audit(bytes, AuditOptions::default());
    assert_eq!(result.unwrap().error_count, 0, "{report}");
    assert!(report.contains(&format!("    Rendering intent = {intent}\n")), "{report}");
    assert!(report.contains(&format!("    meaning: {name}\n")), "{report}");
  }

  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"sRGB", &[4]).iend().build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("    Rendering intent = 4\n"), "{report}");
  assert!(report.contains("Error: value has no meaning\n"), "{report}");
  assert!(!report.contains("    meaning: "), "{report}");

  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"sRGB", &[0, 0]).iend().build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("Error: should be 1 byte long\n"), "{report}");
}

#[test]
fn test_suggested_palette() {
  let splt = |depth: u8, entries: usize| {
    let mut data = b"Sunset colors\0".to_vec();
    data.push(depth);
    data.extend(std::iter::repeat(7_u8).take(entries));
    PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"sPLT", &data).iend().build()
  };

  let (result, report) = run_audit(splt(8, 6 * 3), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 0, "{report}");
  assert!(report.contains("    Palette name: \"Sunset colors\"\n"), "{report}");
  assert!(report.contains("    Sample depth: 8\n"), "{report}");
  assert!(report.contains("    number of entries = 3\n"), "{report}");

  let (result, report) = run_audit(splt(16, 10 * 2), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 0, "{report}");
  assert!(report.contains("    number of entries = 2\n"), "{report}");

  let (result, report) = run_audit(splt(16, 15), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("Error: palette data should be a multiple of 10 bytes\n"), "{report}");

  let (result, report) = run_audit(splt(4, 6), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("Error: sample depth should be 8 or 16\n"), "{report}");
  assert!(!report.contains("number of entries"), "{report}");

  // it's shown even in text mode
  let (_, report) = run_audit(splt(8, 6), AuditOptions::default().with_text_only(true));
  assert!(report.contains("- Chunk sPLT\n"), "{report}");
  assert!(report.contains("    number of entries = 1\n"), "{report}");
}

#[test]
fn test_international_text_fields() {
  fn itxt(flag: u8, method: u8, tail: &[u8]) -> Vec<u8> {
    let mut data = b"Title\0".to_vec();
    data.extend_from_slice(&[flag, method]);
    data.extend_from_slice(tail);
    PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"iTXt", &data).iend().build()
  }

  let (result, report) =
    run_audit(itxt(0, 0, "de\0Titel\0Grüße".as_bytes()), AuditOptions::default());
  let summary = result.unwrap();
  assert_eq!(summary.error_count, 0, "{report}");
  assert_eq!(summary.text_chunks, 1);
  assert!(report.contains("    Compressed? (0=no, 1=yes) : 0\n"), "{report}");
  assert!(report.contains("    Language tag: \"de\"\n"), "{report}");
  assert!(report.contains("    Translated keyword: \"Titel\"\n"), "{report}");
  assert!(report.contains("    Text: \"Grüße\"\n"), "{report}");

  let (result, report) = run_audit(itxt(2, 0, b"\0\0abc"), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("Error: compression flag should be 0 or 1\n"), "{report}");
  assert!(!report.contains("Text:"), "{report}");

  let (result, report) = run_audit(itxt(1, 3, b"\0\0abc"), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("Error: compression method unknown (only 0 is allowed)\n"), "{report}");
  assert!(!report.contains("Text:"), "{report}");

  let (result, report) = run_audit(itxt(0, 0, b"en"), AuditOptions::default());
  let summary = result.unwrap();
  assert_eq!(summary.error_count, 1, "{report}");
  assert!(
    report.contains("Error: no null-terminating character found for the language tag\n"),
    "{report}"
  );
  assert!(!report.contains("Language tag:"), "{report}");
  assert!(summary.end_seen);

  let (result, report) = run_audit(itxt(0, 0, b"en\0Title"), AuditOptions::default());
  assert_eq!(result.unwrap().error_count, 1, "{report}");
  assert!(report.contains("for the translated keyword\n"), "{report}");
}

/// A `Write` that can still be read after being handed off.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);
impl Write for SharedBuf {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.borrow_mut().extend_from_slice(buf);
    Ok(buf.len())
  }
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

#[test]
fn test_icc_profile_dump() {
  let profile: Vec<u8> = (0..100_000_u32).map(|i| (i % 253) as u8).collect();
  let mut data = b"sRGB IEC61966-2.1\0\0".to_vec();
  data.extend(miniz_oxide::deflate::compress_to_vec_zlib(&profile, 6));
  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"iCCP", &data).iend().build();
  let dump = SharedBuf::default();
  let options = AuditOptions::default().with_profile_dump(dump.clone());
  let (result, report) = run_audit(bytes, options);
  assert_eq!(result.unwrap().error_count, 0, "{report}");
  assert!(report.contains("    Profile name: \"sRGB IEC61966-2.1\"\n"), "{report}");
  assert!(report.contains("    Content: 100000 bytes of profile data"), "{report}");
  assert_eq!(*dump.0.borrow(), profile);
}

/// A dump file whose buffered bytes can never be written out.
struct FailingFlush;
impl Write for FailingFlush {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    Ok(buf.len())
  }
  fn flush(&mut self) -> std::io::Result<()> {
    Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
  }
}

#[test]
fn test_icc_profile_dump_flush_failure_is_fatal() {
  let mut data = b"p\0\0".to_vec();
  data.extend(miniz_oxide::deflate::compress_to_vec_zlib(&[1, 2, 3], 6));
  let bytes = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"iCCP", &data).iend().build();
  let options = AuditOptions::default().with_profile_dump(FailingFlush);
  let (result, report) = run_audit(bytes, options);
  assert!(matches!(result, Err(FatalError::GenericIoFailure(_))), "{report}");
  assert!(report.contains("Fatal Error: input/output error\n"), "{report}");
  assert!(!report.contains("Analysis finished."), "{report}");
}

#[test]
fn test_unknown_and_extension_chunks() {
  let bytes = PngBuilder::new()
    .ihdr(1, 1, 8, 2)
    .chunk(b"prVt", &[1, 2, 3])
    .chunk(b"oFFs", &[0; 9])
    .chunk(b"gIFt", &[])
    .chunk(b"a1b2", &[])
    .iend()
    .build();
  let (result, report) = run_audit(bytes, AuditOptions::default());
  // two unknown names, and the second isn't a valid name at all
  assert_eq!(result.unwrap().error_count, 3, "{report}");
  assert!(report.contains("this chunk is Ancillary, private, 3rd letter should be uppercase and is: Uppercase, safe to copy\n"), "{report}");
  assert!(report.contains("Error: not a valid name\n"), "{report}");
  assert!(report.contains("(registered extension) is not interpreted"), "{report}");
  assert!(report.contains("Warning: gIFt is deprecated"), "{report}");
}

#[test]
fn test_audit_never_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = audit(std::io::Cursor::new(v), std::io::sink(), AuditOptions::default());
  }
  // even totally random data should never panic the audit!
  for _ in 0..10 {
    let v = rand_bytes(1024);
    let _ = audit(std::io::Cursor::new(v), std::io::sink(), AuditOptions::default());
    let v = PngBuilder::new().raw(&rand_bytes(1024)).build();
    let _ = audit(std::io::Cursor::new(v), std::io::sink(), AuditOptions::default());
  }
}

proptest! {
  #[test]
  fn prop_decode_number_matches_std(bytes in any::<[u8; 4]>()) {
    prop_assert_eq!(decode_number(&bytes, true), i64::from(i32::from_be_bytes(bytes)));
    prop_assert_eq!(decode_number(&bytes, false), i64::from(u32::from_be_bytes(bytes)));
    let [a, b, ..] = bytes;
    prop_assert_eq!(decode_number(&[a, b], true), i64::from(i16::from_be_bytes([a, b])));
    prop_assert_eq!(decode_number(&[a, b], false), i64::from(u16::from_be_bytes([a, b])));
    prop_assert_eq!(decode_number(&[a], true), i64::from(a as i8));
    prop_assert_eq!(decode_number(&[a], false), i64::from(a));
  }

  #[test]
  fn prop_read_number_matches_decode(bytes in any::<[u8; 4]>(), signed in any::<bool>()) {
    let mut c = ByteCursor::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    prop_assert_eq!(c.read_number(4, signed).unwrap(), decode_number(&bytes, signed));
    prop_assert!(c.at_end());
  }

  #[test]
  fn prop_chunk_crc_matches_reference(
    tag in any::<[u8; 4]>(),
    data in proptest::collection::vec(any::<u8>(), 0..2048),
  ) {
    prop_assert_eq!(chunk_crc(tag, &data), reference_crc(&tag, &data));
  }
}
