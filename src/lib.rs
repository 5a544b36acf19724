#![forbid(unsafe_code)]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A structural checker for PNG files.
//!
//! The file is read chunk by chunk and everything about its framing is
//! verified: the signature, every CRC, which chunks are present, where they
//! are relative to each other, and the fields of each chunk type that's
//! understood. The result is a human readable report, plus an
//! [`AuditSummary`] of the counts.
//!
//! No pixel data is ever decoded. Compressed text and color profiles are
//! decompressed (in bounded pieces) but the image data is only counted.
//!
//! ```no_run
//! use pngaudit::{audit, AuditOptions};
//! let file = std::io::BufReader::new(std::fs::File::open("image.png").unwrap());
//! let summary = audit(file, std::io::stdout(), AuditOptions::default()).unwrap();
//! println!("{} errors", summary.error_count);
//! ```
//!
//! Diagnostics about the audit itself (not the file) go through the `log`
//! crate, mostly at `trace` and `debug` level.

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod audit;
pub use audit::{audit, AuditOptions, AuditSummary};

pub mod chunk_tag;
pub use chunk_tag::*;

pub mod crc32;

pub mod cursor;
pub use cursor::{ByteCursor, MORSEL_LEN};

pub mod error;
pub use error::*;

pub mod inflate;

pub mod latin1;

pub mod png;
