pub mod frame;

pub use frame::{PlainFrame, decode_header, decode_plain_frame};
