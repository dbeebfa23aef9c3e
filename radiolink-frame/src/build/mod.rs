pub mod frame;

pub use frame::{FrameWriter, encode_header, encode_plain_frame};
