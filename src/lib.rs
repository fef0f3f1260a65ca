//! # latin-roman - Latin-1 / MacRoman Text Transcoding
//!
//! Table-driven conversion between the Windows-1252/Latin-1 interchange
//! codepage that text is authored in and the MacRoman codepage the Mac
//! text renderer expects.
//!
//! ## Features
//!
//! - **Byte-for-byte mapping**: output is always exactly as long as the input
//! - **Shared ASCII range**: bytes 0-127 pass through unchanged
//! - **Lossy by design**: unmappable characters become the target's `¿`
//! - **Zero-copy identity path** on platforms whose native codepage is Latin-1
//! - **Reusable scratch buffer** grown in 256-byte steps, never per call
//!
//! ## Quick Start
//!
//! ```rust
//! use latin_roman::{Length, Strategy, Transcoder};
//!
//! let mut transcoder = Transcoder::new(Strategy::TableDriven);
//!
//! // "café" in Latin-1, then in MacRoman
//! let local = transcoder.to_local(b"caf\xE9", Length::Explicit(4)).unwrap();
//! assert_eq!(local, b"caf\x8E");
//!
//! // Zero-terminated input stops at the terminator
//! let back = transcoder.to_interchange(b"caf\x8E\0junk", Length::Terminated).unwrap();
//! assert_eq!(back, b"caf\xE9");
//! ```
//!
//! For call sites that cannot carry a [`Transcoder`] around, the
//! [`to_local_encoding`] and [`to_interchange_encoding`] functions use one
//! per thread and lend its output to a closure.

#![deny(missing_docs)]

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use log::debug;

pub mod config;
pub mod engine;
pub mod scratch;
pub mod tables;

pub use config::{Config, StrategyChoice};
pub use engine::{Length, Strategy, Transcoder};
pub use scratch::ScratchBuffer;
pub use tables::Direction;

/// Result type for transcoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Caller errors. Unmappable bytes are never reported; they degrade to the
/// fallback glyph instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Explicit length runs past the end of the supplied bytes
    LengthOutOfBounds {
        /// Requested length
        length: usize,
        /// Bytes actually supplied
        available: usize,
    },
    /// Length does not fit in this platform's address space
    LengthTooLarge(i64),
    /// Zero-terminated input without a zero byte
    MissingTerminator,
    /// Negative length other than the `-1` "zero-terminated" sentinel
    NegativeLength(i64),
    /// The thread's shared transcoder is already lending out a view
    ScratchBusy,
    /// Configuration could not be read or parsed
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LengthOutOfBounds { length, available } => {
                write!(f, "Length {length} exceeds {available} supplied bytes")
            }
            Error::LengthTooLarge(n) => write!(f, "Length {n} does not fit in memory"),
            Error::MissingTerminator => write!(f, "Zero-terminated input has no zero byte"),
            Error::NegativeLength(n) => write!(f, "Invalid negative length {n}"),
            Error::ScratchBusy => write!(f, "Shared scratch buffer is busy on this thread"),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// The two codepages this crate converts between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    /// Windows-1252 (Western European), the interchange codepage
    WINDOWS_1252,
    /// Macintosh Roman, the native codepage of the Mac renderer
    MAC_ROMAN,
}

impl Encoding {
    /// Get the canonical name of this encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::WINDOWS_1252 => "Windows-1252",
            Encoding::MAC_ROMAN => "MacRoman",
        }
    }

    /// One-line description
    pub fn description(self) -> &'static str {
        match self {
            Encoding::WINDOWS_1252 => "Western European Windows code page (Latin-1 superset)",
            Encoding::MAC_ROMAN => "Classic Macintosh Roman character encoding",
        }
    }
}

// 0 = nothing chosen, fall back to the build target's strategy
static DEFAULT_STRATEGY: AtomicU8 = AtomicU8::new(0);

/// Choose the strategy every thread's shared transcoder uses.
///
/// Call once at startup. Threads pick it up on their next shared call unless
/// they pinned their own with [`override_thread_strategy`].
pub fn set_default_strategy(strategy: Strategy) {
    let code = match strategy {
        Strategy::TableDriven => 1,
        Strategy::Identity => 2,
    };
    DEFAULT_STRATEGY.store(code, Ordering::Release);
    debug!("process default strategy set to {}", strategy.name());
}

/// Strategy the shared entry points use on threads without an override
pub fn default_strategy() -> Strategy {
    match DEFAULT_STRATEGY.load(Ordering::Acquire) {
        1 => Strategy::TableDriven,
        2 => Strategy::Identity,
        _ => Strategy::native(),
    }
}

struct Shared {
    transcoder: Transcoder,
    pinned: bool,
}

impl Shared {
    fn transcoder(&mut self) -> &mut Transcoder {
        if !self.pinned {
            let strategy = default_strategy();
            if self.transcoder.strategy() != strategy {
                self.transcoder = Transcoder::new(strategy);
            }
        }
        &mut self.transcoder
    }
}

thread_local! {
    static SHARED: RefCell<Shared> = RefCell::new(Shared {
        transcoder: Transcoder::new(default_strategy()),
        pinned: false,
    });
}

/// Pin this thread's shared transcoder to `strategy`, ignoring the process
/// default. The scratch buffer is dropped.
pub fn override_thread_strategy(strategy: Strategy) -> Result<()> {
    SHARED.with(|cell| {
        let mut shared = cell.try_borrow_mut().map_err(|_| Error::ScratchBusy)?;
        shared.transcoder = Transcoder::new(strategy);
        shared.pinned = true;
        Ok(())
    })
}

/// Drop this thread's override and follow the process default again.
pub fn clear_thread_override() -> Result<()> {
    SHARED.with(|cell| {
        let mut shared = cell.try_borrow_mut().map_err(|_| Error::ScratchBusy)?;
        shared.pinned = false;
        Ok(())
    })
}

/// Convert interchange bytes to the native codepage using this thread's
/// shared transcoder, and pass the view to `f`.
///
/// The view cannot escape `f`. Calling back into either shared entry point
/// from inside `f` fails with [`Error::ScratchBusy`].
pub fn to_local_encoding<R>(
    source: &[u8],
    length: impl Into<Length>,
    f: impl FnOnce(&[u8]) -> R,
) -> Result<R> {
    with_shared(Direction::ToLocal, source, length.into(), f)
}

/// Convert native codepage bytes back to interchange using this thread's
/// shared transcoder, and pass the view to `f`.
pub fn to_interchange_encoding<R>(
    source: &[u8],
    length: impl Into<Length>,
    f: impl FnOnce(&[u8]) -> R,
) -> Result<R> {
    with_shared(Direction::ToInterchange, source, length.into(), f)
}

fn with_shared<R>(
    direction: Direction,
    source: &[u8],
    length: Length,
    f: impl FnOnce(&[u8]) -> R,
) -> Result<R> {
    SHARED.with(|cell| {
        let mut shared = cell.try_borrow_mut().map_err(|_| Error::ScratchBusy)?;
        let view = shared.transcoder().transcode(direction, source, length)?;
        Ok(f(view))
    })
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn copy(view: &[u8]) -> Vec<u8> {
        view.to_vec()
    }

    fn local_on_new_thread(input: &'static [u8]) -> Vec<u8> {
        let worker = thread::spawn(move || to_local_encoding(input, input.len(), copy));
        worker.join().unwrap().unwrap()
    }

    #[test]
    fn test_shared_entry_points() {
        override_thread_strategy(Strategy::TableDriven).unwrap();

        let local = to_local_encoding(b"\x93hi\x94", 4, copy).unwrap();
        assert_eq!(local, b"\xD2hi\xD3");

        let back = to_interchange_encoding(&local, Length::Terminated, copy);
        assert_eq!(back, Err(Error::MissingTerminator));

        let input = b"\xD2hi\xD3\0";
        let back = to_interchange_encoding(input, Length::Terminated, copy);
        assert_eq!(back.unwrap(), b"\x93hi\x94");
    }

    #[test]
    fn test_shared_sequential_calls_do_not_leak() {
        override_thread_strategy(Strategy::TableDriven).unwrap();

        let first = vec![0xE9u8; 10];
        let local = to_local_encoding(&first, 10, copy).unwrap();
        assert_eq!(local, [0x8E; 10]);

        let second = vec![b'z'; 10_000];
        to_local_encoding(&second, 10_000, |view| {
            assert_eq!(view.len(), 10_000);
            assert!(view.iter().all(|&b| b == b'z'));
        })
        .unwrap();
    }

    #[test]
    fn test_shared_reentry_is_rejected() {
        override_thread_strategy(Strategy::TableDriven).unwrap();

        let inner = |_: &[u8]| to_interchange_encoding(b"inner", 5, copy);
        let nested = to_local_encoding(b"outer", 5, inner).unwrap();
        assert_eq!(nested, Err(Error::ScratchBusy));

        let pin = |_: &[u8]| override_thread_strategy(Strategy::Identity);
        let reset = to_local_encoding(b"x", 1, pin).unwrap();
        assert_eq!(reset, Err(Error::ScratchBusy));
    }

    #[test]
    fn test_shared_identity_strategy() {
        override_thread_strategy(Strategy::Identity).unwrap();
        let input = b"caf\xE9";
        let same = to_local_encoding(input, 4, |view| std::ptr::eq(view, &input[..]));
        assert!(same.unwrap());
    }

    #[test]
    fn test_default_strategy_reaches_every_thread() {
        // Only test that touches the process default
        clear_thread_override().unwrap();
        let config = Config {
            strategy: StrategyChoice::TableDriven,
            ..Config::default()
        };
        config.install();
        assert_eq!(default_strategy(), Strategy::TableDriven);

        let here = to_local_encoding(b"\xE9", 1, copy).unwrap();
        assert_eq!(here, [0x8E]);
        assert_eq!(local_on_new_thread(b"\xE9"), [0x8E]);

        // A thread that already ran follows a later change too
        set_default_strategy(Strategy::Identity);
        let here = to_local_encoding(b"\xE9", 1, copy).unwrap();
        assert_eq!(here, [0xE9]);
        assert_eq!(local_on_new_thread(b"\xE9"), [0xE9]);

        // Overrides win until cleared
        override_thread_strategy(Strategy::TableDriven).unwrap();
        let pinned = to_local_encoding(b"\xE9", 1, copy).unwrap();
        assert_eq!(pinned, [0x8E]);
        clear_thread_override().unwrap();
        let followed = to_local_encoding(b"\xE9", 1, copy).unwrap();
        assert_eq!(followed, [0xE9]);

        set_default_strategy(Strategy::native());
    }

    #[test]
    fn test_encoding_properties() {
        assert_eq!(Encoding::WINDOWS_1252.name(), "Windows-1252");
        assert_eq!(Encoding::MAC_ROMAN.name(), "MacRoman");
        assert!(Encoding::MAC_ROMAN.description().contains("Macintosh"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::LengthOutOfBounds {
            length: 9,
            available: 3,
        };
        assert_eq!(err.to_string(), "Length 9 exceeds 3 supplied bytes");
        let err = Error::NegativeLength(-5);
        assert_eq!(err.to_string(), "Invalid negative length -5");
    }
}
