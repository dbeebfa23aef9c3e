use core::fmt;

/// Specific kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Buffer ends before the header or the declared frame does.
    Truncated,
    /// Frame length byte is inconsistent with header, body and trailer.
    InvalidFrameLength,
    /// Frame type is reserved (0x00 or 0x7f in the low 7 bits).
    InvalidType,
    /// ID length nibble exceeds the maximum ID length.
    InvalidIdLength,
    /// Body length exceeds the maximum or the space left in the frame.
    InvalidBodyLength,
    /// Trailer has the wrong size, marker or CRC.
    InvalidTrailer,
    /// Padded body block is malformed.
    InvalidPadding,
}

/// Error returned by parsing functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset in the input where the error was detected.
    pub position: usize,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self.kind {
            ParseErrorKind::Truncated => "truncated frame",
            ParseErrorKind::InvalidFrameLength => "invalid frame length",
            ParseErrorKind::InvalidType => "invalid frame type",
            ParseErrorKind::InvalidIdLength => "invalid ID length",
            ParseErrorKind::InvalidBodyLength => "invalid body length",
            ParseErrorKind::InvalidTrailer => "invalid trailer",
            ParseErrorKind::InvalidPadding => "invalid padding",
        };
        write!(f, "{} at byte {}", desc, self.position)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Specific kind of build error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// Output buffer is too small.
    BufferTooSmall,
    /// Invalid input data (reserved frame type, oversized ID or body, etc.).
    InvalidInput,
}

/// Error returned by builder functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildError {
    pub kind: BuildErrorKind,
}

impl BuildError {
    #[must_use]
    pub fn buffer_too_small() -> Self {
        Self {
            kind: BuildErrorKind::BufferTooSmall,
        }
    }

    #[must_use]
    pub fn invalid_input() -> Self {
        Self {
            kind: BuildErrorKind::InvalidInput,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BuildErrorKind::BufferTooSmall => write!(f, "output buffer too small"),
            BuildErrorKind::InvalidInput => write!(f, "invalid input data"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}
