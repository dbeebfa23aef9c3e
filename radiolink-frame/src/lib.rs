#![no_std]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod consts;
pub mod crc;
pub mod error;
pub mod padding;
pub mod types;
pub mod validate;

pub mod build;
pub mod parse;

pub use error::{BuildError, BuildErrorKind, ParseError, ParseErrorKind};
pub use types::*;

pub use build::{encode_header, encode_plain_frame};
pub use crc::{crc7_5b, crc7_5b_update, frame_crc};
pub use padding::{pad_32, unpad_32};
pub use parse::{PlainFrame, decode_header, decode_plain_frame};
