use std::{
  path::PathBuf,
  process::{Command, Output},
};

use super::PngBuilder;

fn pngaudit(arg: impl AsRef<std::ffi::OsStr>) -> Output {
  Command::new(env!("CARGO_BIN_EXE_pngaudit")).arg(arg).output().unwrap()
}

/// Writes `bytes` to a file of its own in the temp dir.
fn temp_png(name: &str, bytes: &[u8]) -> PathBuf {
  let path = std::env::temp_dir().join(format!("pngaudit-{}-{name}.png", std::process::id()));
  std::fs::write(&path, bytes).unwrap();
  path
}

#[test]
fn test_cli_good_file_exits_zero() {
  let path = temp_png("good", &PngBuilder::new().ihdr(1, 1, 8, 2).iend().build());
  let output = pngaudit(&path);
  let _ = std::fs::remove_file(&path);
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert_eq!(output.status.code(), Some(0), "{stdout}");
  assert!(stdout.starts_with("File "), "{stdout}");
  assert!(stdout.contains("File looks OK.\n"), "{stdout}");
}

#[test]
fn test_cli_fatal_runs_exit_nonzero() {
  let mut bytes = PngBuilder::new().ihdr(1, 1, 8, 2).iend().build();
  bytes[0] = 0;
  let path = temp_png("bad-signature", &bytes);
  let output = pngaudit(&path);
  let _ = std::fs::remove_file(&path);
  assert_eq!(output.status.code(), Some(64));
  assert!(String::from_utf8_lossy(&output.stdout).contains("Fatal Error: wrong signature\n"));

  let path = temp_png("truncated", &PngBuilder::new().raw(&[0, 0, 0, 13]).build());
  let output = pngaudit(&path);
  let _ = std::fs::remove_file(&path);
  assert_eq!(output.status.code(), Some(8));

  // a directory opens fine but can't be read as a file
  let output = pngaudit("tests");
  assert!(!output.status.success());
  assert_ne!(output.status.code(), Some(101), "panicked");

  let output = pngaudit("tests/this-file-does-not-exist.png");
  assert_eq!(output.status.code(), Some(2));
}

#[cfg(target_os = "linux")]
#[test]
fn test_cli_unwritable_report_is_an_io_failure() {
  let Ok(full) = std::fs::File::create("/dev/full") else {
    return;
  };
  let path = temp_png("full", &PngBuilder::new().ihdr(1, 1, 8, 2).iend().build());
  let output =
    Command::new(env!("CARGO_BIN_EXE_pngaudit")).arg(&path).stdout(full).output().unwrap();
  let _ = std::fs::remove_file(&path);
  assert_eq!(output.status.code(), Some(4));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Fatal Error: input/output error"));
}
