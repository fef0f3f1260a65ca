//! Static codepage tables for the high half (0x80-0xFF) of both encodings.
//!
//! Bytes below 0x80 are the shared ASCII range and never go through a table.
//! Both tables send characters with no faithful counterpart to the target
//! encoding's inverted question mark.

use serde::{Deserialize, Serialize};

use crate::Encoding;

/// MacRoman `¿`, substituted for Latin-1 bytes MacRoman cannot represent.
pub const ROMAN_FALLBACK: u8 = 0xC0;

/// Latin-1 `¿`, substituted for MacRoman bytes Latin-1 cannot represent.
pub const LATIN1_FALLBACK: u8 = 0xBF;

/// Windows-1252/Latin-1 to MacRoman, indexed by `byte - 0x80`.
pub static LATIN1_TO_ROMAN: [u8; 128] = [
    0xdb, 0xc0, 0xe2, 0xc4, 0xe3, 0xc9, 0xa0, 0xe0, 0xf6, 0xe4, 0xc0, 0xdc, 0xce, 0xc0, 0xc0, 0xc0,
    0xc0, 0xd4, 0xd5, 0xd2, 0xd3, 0xa5, 0xd0, 0xd1, 0xf7, 0xaa, 0xc0, 0xdd, 0xcf, 0xc0, 0xc0, 0xd9,
    0xca, 0xc1, 0xa2, 0xa3, 0xc0, 0xb4, 0xc0, 0xa4, 0xac, 0xa9, 0xbb, 0xc7, 0xc2, 0xc0, 0xa8, 0xf8,
    0xa1, 0xb1, 0xc0, 0xc0, 0xab, 0xb5, 0xa6, 0xe1, 0xfc, 0xc0, 0xbc, 0xc8, 0xc0, 0xc0, 0xc0, 0xc0,
    0xcb, 0xe7, 0xe5, 0xcc, 0x80, 0x81, 0xae, 0x82, 0xe9, 0x83, 0xe6, 0xe8, 0xed, 0xea, 0xeb, 0xec,
    0xc0, 0x84, 0xf1, 0xee, 0xef, 0xcd, 0x85, 0xc0, 0xaf, 0xf4, 0xf2, 0xf3, 0x86, 0xc0, 0xc0, 0xa7,
    0x88, 0x87, 0x89, 0x8b, 0x8a, 0x8c, 0xbe, 0x8d, 0x8f, 0x8e, 0x90, 0x91, 0x93, 0x92, 0x94, 0x95,
    0xc0, 0x96, 0x98, 0x97, 0x99, 0x9b, 0x9a, 0xd6, 0xbf, 0x9d, 0x9c, 0x9e, 0x9f, 0xc0, 0xc0, 0xd8,
];

/// MacRoman to Windows-1252/Latin-1, indexed by `byte - 0x80`.
pub static ROMAN_TO_LATIN1: [u8; 128] = [
    0xc4, 0xc5, 0xc7, 0xc9, 0xd1, 0xd6, 0xdc, 0xe1, 0xe0, 0xe2, 0xe4, 0xe3, 0xe5, 0xe7, 0xe9, 0xe8,
    0xea, 0xeb, 0xed, 0xec, 0xee, 0xef, 0xf1, 0xf3, 0xf2, 0xf4, 0xf6, 0xf5, 0xfa, 0xf9, 0xfb, 0xfc,
    0x86, 0xb0, 0xa2, 0xa3, 0xa7, 0x95, 0xb6, 0xdf, 0xae, 0xa9, 0x99, 0xb4, 0xa8, 0xbf, 0xc6, 0xd8,
    0xbf, 0xb1, 0xbf, 0xbf, 0xa5, 0xb5, 0xbf, 0xbf, 0xbf, 0xbf, 0xbf, 0xaa, 0xba, 0xbf, 0xe6, 0xf8,
    0xbf, 0xa1, 0xac, 0xbf, 0x83, 0xbf, 0xbf, 0xab, 0xbb, 0x85, 0xa0, 0xc0, 0xc3, 0xd5, 0x8c, 0x9c,
    0x96, 0x97, 0x93, 0x94, 0x91, 0x92, 0xf7, 0xbf, 0xff, 0x9f, 0xbf, 0x80, 0x8b, 0x9b, 0xbf, 0xbf,
    0x87, 0xb7, 0x82, 0x84, 0x89, 0xc2, 0xca, 0xc1, 0xcb, 0xc8, 0xcd, 0xce, 0xcf, 0xcc, 0xd3, 0xd4,
    0xbf, 0xd2, 0xda, 0xdb, 0xd9, 0xbf, 0x88, 0x98, 0xaf, 0xbf, 0xbf, 0xbf, 0xb8, 0xbf, 0xbf, 0xbf,
];

/// Which way a transcoding call runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Interchange (Latin-1) to the platform's native codepage (MacRoman)
    #[default]
    ToLocal,
    /// Native codepage (MacRoman) back to interchange (Latin-1)
    ToInterchange,
}

impl Direction {
    /// The high-half table for this direction
    pub fn table(self) -> &'static [u8; 128] {
        match self {
            Direction::ToLocal => &LATIN1_TO_ROMAN,
            Direction::ToInterchange => &ROMAN_TO_LATIN1,
        }
    }

    /// Byte written for characters the target encoding cannot represent
    pub fn fallback(self) -> u8 {
        match self {
            Direction::ToLocal => ROMAN_FALLBACK,
            Direction::ToInterchange => LATIN1_FALLBACK,
        }
    }

    /// The opposite direction
    pub fn reverse(self) -> Self {
        match self {
            Direction::ToLocal => Direction::ToInterchange,
            Direction::ToInterchange => Direction::ToLocal,
        }
    }

    /// Encoding of the input bytes
    pub fn source(self) -> Encoding {
        match self {
            Direction::ToLocal => Encoding::WINDOWS_1252,
            Direction::ToInterchange => Encoding::MAC_ROMAN,
        }
    }

    /// Encoding of the output bytes
    pub fn target(self) -> Encoding {
        self.reverse().source()
    }
}

/// Map one byte through `table`, passing ASCII through untouched.
#[inline]
pub fn map_byte(table: &[u8; 128], byte: u8) -> u8 {
    if byte > 127 {
        table[usize::from(byte - 128)]
    } else {
        byte
    }
}

/// True when `byte` survives a trip out through `direction` and back.
pub fn is_lossless(direction: Direction, byte: u8) -> bool {
    let there = map_byte(direction.table(), byte);
    map_byte(direction.reverse().table(), there) == byte
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_never_looked_up() {
        for byte in 0..=127u8 {
            assert_eq!(map_byte(&LATIN1_TO_ROMAN, byte), byte);
            assert_eq!(map_byte(&ROMAN_TO_LATIN1, byte), byte);
        }
    }

    #[test]
    fn test_high_half_reads_the_table() {
        assert_eq!(map_byte(&LATIN1_TO_ROMAN, 0x80), 0xDB); // Euro
        assert_eq!(map_byte(&LATIN1_TO_ROMAN, 0xE9), 0x8E); // e acute
        assert_eq!(map_byte(&LATIN1_TO_ROMAN, 0xFF), 0xD8); // y diaeresis
        assert_eq!(map_byte(&ROMAN_TO_LATIN1, 0x8E), 0xE9);
        assert_eq!(map_byte(&ROMAN_TO_LATIN1, 0xDB), 0x80);
        assert_eq!(map_byte(&ROMAN_TO_LATIN1, 0xFF), 0xBF);
    }

    #[test]
    fn test_fallbacks_are_each_others_question_mark() {
        assert_eq!(map_byte(&LATIN1_TO_ROMAN, LATIN1_FALLBACK), ROMAN_FALLBACK);
        assert_eq!(map_byte(&ROMAN_TO_LATIN1, ROMAN_FALLBACK), LATIN1_FALLBACK);
    }

    #[test]
    fn test_lossy_bytes_land_on_the_fallback() {
        for direction in [Direction::ToLocal, Direction::ToInterchange] {
            let mut lossy = 0;
            for byte in 128..=255u8 {
                let mapped = map_byte(direction.table(), byte);
                if is_lossless(direction, byte) {
                    continue;
                }
                lossy += 1;
                assert_eq!(mapped, direction.fallback(), "byte 0x{byte:02X}");
            }
            // 25 unmappable code points in each direction
            assert_eq!(lossy, 25);
        }
    }

    #[test]
    fn test_direction_encodings() {
        assert_eq!(Direction::ToLocal.source(), Encoding::WINDOWS_1252);
        assert_eq!(Direction::ToLocal.target(), Encoding::MAC_ROMAN);
        assert_eq!(Direction::ToInterchange.target(), Encoding::WINDOWS_1252);
        assert_eq!(Direction::ToLocal.reverse().reverse(), Direction::ToLocal);
    }
}
