//! Byte-at-a-time UTF-8 decoding. The display receives text one byte at a time through
//! [`CharacterDisplay::write_byte`](crate::CharacterDisplay::write_byte), so a multi-byte
//! sequence has to be collected across calls.
//!
//! Malformed input never fails. It decodes to U+FFFD, which the glyph map shows as a solid block:
//! - a continuation byte without a lead byte, or a lead byte 0xF8..=0xFF
//! - a sequence cut short by a non-continuation byte; that byte then starts over on its own
//! - overlong encodings, surrogates and values above U+10FFFF

use core::char::REPLACEMENT_CHARACTER;

// smallest value each sequence length may encode, indexed by length
const MIN_VALUE: [u32; 5] = [0, 0, 0x80, 0x800, 0x1_0000];

#[derive(Debug, Default, Clone)]
pub struct Utf8Decoder {
    value: u32,
    length: u8,
    pending: u8,
}

/// Code points completed by one byte: none, one, or two when a broken sequence is followed by a
/// byte that decodes on its own.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Decoded {
    first: Option<char>,
    second: Option<char>,
}

impl Decoded {
    const fn none() -> Self {
        Decoded {
            first: None,
            second: None,
        }
    }

    const fn one(c: char) -> Self {
        Decoded {
            first: Some(c),
            second: None,
        }
    }
}

impl Iterator for Decoded {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.first.take().or_else(|| self.second.take())
    }
}

impl Utf8Decoder {
    pub const fn new() -> Self {
        Utf8Decoder {
            value: 0,
            length: 0,
            pending: 0,
        }
    }

    /// `true` while a multi-byte sequence is incomplete.
    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Drops a partially received sequence.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn push(&mut self, byte: u8) -> Decoded {
        if !self.is_pending() {
            return self.start(byte);
        }

        if byte & 0xC0 == 0x80 {
            self.value = (self.value << 6) | u32::from(byte & 0x3F);
            self.pending -= 1;
            return if self.pending == 0 {
                Decoded::one(self.finish())
            } else {
                Decoded::none()
            };
        }

        self.reset();
        let restart = self.start(byte);
        Decoded {
            first: Some(REPLACEMENT_CHARACTER),
            second: restart.first,
        }
    }

    fn start(&mut self, byte: u8) -> Decoded {
        let (value, length) = match byte {
            0x00..=0x7F => return Decoded::one(char::from(byte)),
            0xC0..=0xDF => (byte & 0x1F, 2),
            0xE0..=0xEF => (byte & 0x0F, 3),
            0xF0..=0xF7 => (byte & 0x07, 4),
            // stray continuation, or not a lead byte at all
            _ => return Decoded::one(REPLACEMENT_CHARACTER),
        };
        self.value = u32::from(value);
        self.length = length;
        self.pending = length - 1;
        Decoded::none()
    }

    fn finish(&mut self) -> char {
        let value = self.value;
        let min = MIN_VALUE[usize::from(self.length)];
        self.reset();
        if value < min {
            return REPLACEMENT_CHARACTER;
        }
        char::from_u32(value).unwrap_or(REPLACEMENT_CHARACTER)
    }
}
