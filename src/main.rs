use std::{
  fs::File,
  io::{BufReader, BufWriter, Write},
  path::PathBuf,
  process::ExitCode,
};

use clap::{ArgAction, Parser};

use pngaudit::{audit, AuditOptions, FatalError};

#[derive(Parser, Debug)]
#[command(
  name = "pngaudit",
  version,
  about = "Checks the structure of a PNG file, chunk by chunk, without decoding the image."
)]
struct Cli {
  #[arg(
    short = 't',
    long = "text",
    action = ArgAction::SetTrue,
    long_help = "Only print text chunks (tEXt, zTXt, iTXt) and other always-shown chunks. Errors are always printed."
  )]
  text_only: bool,
  #[arg(
    long = "dump-icc",
    value_name = "FILE",
    long_help = "Write the decompressed contents of any iCCP color profile to FILE."
  )]
  dump_icc: Option<PathBuf>,
  /// The PNG file to check.
  #[arg(value_name = "FILE")]
  input: PathBuf,
}

/// The exit status for each kind of fatal error.
///
/// Only 8 bits of a status survive on Unix, so every code is a distinct
/// non-zero byte. 2 is kept for "couldn't open the file".
fn exit_code_for(e: &FatalError) -> u8 {
  match e {
    FatalError::BadSignature => 64,
    FatalError::UnexpectedEndOfInput => 8,
    FatalError::ReadFailure(_) => 32,
    FatalError::NegativeLength => 128,
    FatalError::OutOfMemory => 16,
    FatalError::GenericIoFailure(_) => 4,
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let file = match File::open(&cli.input) {
    Ok(file) => file,
    Err(err) => {
      eprintln!("Error: could not open {}: {err}", cli.input.display());
      return ExitCode::from(2);
    }
  };
  let mut options = AuditOptions::default().with_text_only(cli.text_only);
  if let Some(path) = cli.dump_icc.as_deref() {
    match File::create(path) {
      Ok(dump) => options = options.with_profile_dump(BufWriter::new(dump)),
      Err(err) => {
        eprintln!("Error: could not create {}: {err}", path.display());
        return ExitCode::from(2);
      }
    }
  }

  let mut out = std::io::stdout().lock();
  if let Err(err) = writeln!(out, "File {}\n", cli.input.display()) {
    let e = FatalError::from(err);
    eprintln!("Fatal Error: {e}");
    return ExitCode::from(exit_code_for(&e));
  }
  match audit(BufReader::new(file), out, options) {
    Ok(_) => ExitCode::SUCCESS,
    Err(e) => ExitCode::from(exit_code_for(&e)),
  }
}

#[test]
fn test_exit_codes_are_distinct() {
  use std::io;
  let codes = [
    exit_code_for(&FatalError::BadSignature),
    exit_code_for(&FatalError::UnexpectedEndOfInput),
    exit_code_for(&FatalError::ReadFailure(io::Error::from(io::ErrorKind::Other))),
    exit_code_for(&FatalError::NegativeLength),
    exit_code_for(&FatalError::OutOfMemory),
    exit_code_for(&FatalError::GenericIoFailure(io::Error::from(io::ErrorKind::Other))),
  ];
  for (i, code) in codes.iter().enumerate() {
    assert!(*code != 0 && *code != 2, "{code}");
    assert!(!codes[i + 1..].contains(code), "{code}");
  }
}
