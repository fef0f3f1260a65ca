//! The transcode engine: length resolution, strategy selection and the
//! byte-for-byte table walk.

use std::ffi::CStr;

use log::trace;

use crate::scratch::ScratchBuffer;
use crate::tables::{Direction, map_byte};
use crate::{Error, Result};

/// How many input bytes a call should consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Exactly this many bytes; embedded zeros are ordinary data
    Explicit(usize),
    /// Everything up to (not including) the first zero byte
    Terminated,
}

impl Length {
    /// Number of bytes of `source` this length selects.
    ///
    /// A terminated length without a zero byte in `source`, or an explicit
    /// length past its end, is a caller error.
    pub fn resolve(self, source: &[u8]) -> Result<usize> {
        match self {
            Length::Explicit(length) if length > source.len() => Err(Error::LengthOutOfBounds {
                length,
                available: source.len(),
            }),
            Length::Explicit(length) => Ok(length),
            Length::Terminated => source
                .iter()
                .position(|&b| b == 0)
                .ok_or(Error::MissingTerminator),
        }
    }
}

impl From<usize> for Length {
    fn from(length: usize) -> Self {
        Length::Explicit(length)
    }
}

impl From<Option<usize>> for Length {
    fn from(length: Option<usize>) -> Self {
        length.map_or(Length::Terminated, Length::Explicit)
    }
}

impl TryFrom<i64> for Length {
    type Error = Error;

    /// `-1` selects [`Length::Terminated`]; other negatives are rejected.
    fn try_from(length: i64) -> Result<Self> {
        match length {
            -1 => Ok(Length::Terminated),
            n if n < 0 => Err(Error::NegativeLength(n)),
            n => usize::try_from(n)
                .map(Length::Explicit)
                .map_err(|_| Error::LengthTooLarge(n)),
        }
    }
}

/// How bytes get from the input to the view handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Walk the mapping tables into the scratch buffer
    TableDriven,
    /// Native codepage already is the interchange codepage: hand the input back
    Identity,
}

impl Strategy {
    /// Strategy for the platform this crate was built for.
    ///
    /// Only macOS renders western text in MacRoman; everywhere else the
    /// native codepage is Latin-1 compatible.
    pub fn native() -> Self {
        let strategy = if cfg!(target_os = "macos") {
            Strategy::TableDriven
        } else {
            Strategy::Identity
        };
        trace!("native transcoding strategy: {:?}", strategy);
        strategy
    }

    /// Short lowercase label
    pub fn name(self) -> &'static str {
        match self {
            Strategy::TableDriven => "table-driven",
            Strategy::Identity => "identity",
        }
    }
}

/// Map `input` through `table` into `output`, which must be the same length.
fn translate(table: &[u8; 128], input: &[u8], output: &mut [u8]) {
    debug_assert_eq!(input.len(), output.len());
    for (dst, &src) in output.iter_mut().zip(input) {
        *dst = map_byte(table, src);
    }
}

/// Stateful converter owning its scratch buffer.
///
/// Each view returned by [`to_local`](Self::to_local) or
/// [`to_interchange`](Self::to_interchange) borrows the transcoder, so it is
/// gone before the next call can reuse the buffer. Views carry no trailing
/// zero byte.
///
/// ```rust
/// use latin_roman::{Length, Strategy, Transcoder};
///
/// let mut transcoder = Transcoder::new(Strategy::TableDriven);
/// let view = transcoder.to_local(b"caf\xE9", Length::Explicit(4)).unwrap();
/// assert_eq!(view, b"caf\x8E");
/// ```
#[derive(Debug)]
pub struct Transcoder {
    strategy: Strategy,
    scratch: ScratchBuffer,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::native()
    }
}

impl Transcoder {
    /// Transcoder with a lazily allocated scratch buffer
    pub fn new(strategy: Strategy) -> Self {
        Self::with_scratch(strategy, ScratchBuffer::new())
    }

    /// Transcoder using the build target's [`Strategy::native`]
    pub fn native() -> Self {
        Self::new(Strategy::native())
    }

    /// Transcoder reusing an existing scratch buffer
    pub fn with_scratch(strategy: Strategy, scratch: ScratchBuffer) -> Self {
        Self { strategy, scratch }
    }

    /// Strategy this transcoder was built with
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Scratch buffer backing the views
    pub fn scratch(&self) -> &ScratchBuffer {
        &self.scratch
    }

    /// Interchange (Latin-1) bytes to the native codepage.
    pub fn to_local<'a>(
        &'a mut self,
        source: &'a [u8],
        length: impl Into<Length>,
    ) -> Result<&'a [u8]> {
        self.transcode(Direction::ToLocal, source, length)
    }

    /// Native codepage bytes back to interchange (Latin-1).
    pub fn to_interchange<'a>(
        &'a mut self,
        source: &'a [u8],
        length: impl Into<Length>,
    ) -> Result<&'a [u8]> {
        self.transcode(Direction::ToInterchange, source, length)
    }

    /// Convert the first `length` bytes of `source` in `direction`.
    ///
    /// The view is exactly as long as the resolved length. With the identity
    /// strategy it is a subslice of `source` and nothing is copied.
    pub fn transcode<'a>(
        &'a mut self,
        direction: Direction,
        source: &'a [u8],
        length: impl Into<Length>,
    ) -> Result<&'a [u8]> {
        let len = length.into().resolve(source)?;
        Ok(self.apply(direction, &source[..len]))
    }

    /// Convert a zero-terminated string, excluding the terminator.
    pub fn to_local_cstr<'a>(&'a mut self, source: &'a CStr) -> &'a [u8] {
        self.apply(Direction::ToLocal, source.to_bytes())
    }

    /// Convert a zero-terminated string back to interchange, excluding the terminator.
    pub fn to_interchange_cstr<'a>(&'a mut self, source: &'a CStr) -> &'a [u8] {
        self.apply(Direction::ToInterchange, source.to_bytes())
    }

    fn apply<'a>(&'a mut self, direction: Direction, input: &'a [u8]) -> &'a [u8] {
        match self.strategy {
            Strategy::Identity => input,
            Strategy::TableDriven => {
                let output = self.scratch.reserve(input.len());
                translate(direction.table(), input, output);
                output
            }
        }
    }

    /// Append the conversion of all of `source` to a caller-owned buffer.
    pub fn transcode_into(&self, direction: Direction, source: &[u8], output: &mut Vec<u8>) {
        let start = output.len();
        output.extend_from_slice(source);
        if self.strategy == Strategy::TableDriven {
            self.transcode_in_place(direction, &mut output[start..]);
        }
    }

    /// Convert `buffer` in place, overwriting its contents.
    pub fn transcode_in_place(&self, direction: Direction, buffer: &mut [u8]) {
        if self.strategy == Strategy::Identity {
            return;
        }
        let table = direction.table();
        for byte in buffer.iter_mut() {
            *byte = map_byte(table, *byte);
        }
    }

    /// Independently allocated conversion to the native codepage
    pub fn to_local_owned(&self, source: &[u8], length: impl Into<Length>) -> Result<Vec<u8>> {
        self.transcode_owned(Direction::ToLocal, source, length)
    }

    /// Independently allocated conversion back to interchange
    pub fn to_interchange_owned(
        &self,
        source: &[u8],
        length: impl Into<Length>,
    ) -> Result<Vec<u8>> {
        self.transcode_owned(Direction::ToInterchange, source, length)
    }

    fn transcode_owned(
        &self,
        direction: Direction,
        source: &[u8],
        length: impl Into<Length>,
    ) -> Result<Vec<u8>> {
        let len = length.into().resolve(source)?;
        let mut output = Vec::with_capacity(len);
        self.transcode_into(direction, &source[..len], &mut output);
        Ok(output)
    }
}
