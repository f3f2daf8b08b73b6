//! Mapping from Unicode scalar values to the one-byte character codes of the HD44780 character
//! generator ROM (the common A00 "Japanese" ROM), plus the custom characters kept in CGRAM.
//!
//! The A00 ROM covers printable ASCII except backslash and tilde: code 0x5C shows a yen sign and
//! 0x7E a right arrow. Those two can be provided as custom glyphs, see
//! [`DisplayConfig::with_tilde`](crate::DisplayConfig::with_tilde) and
//! [`DisplayConfig::with_backslash`](crate::DisplayConfig::with_backslash).

use crate::config::MAX_RESERVED_GLYPHS;

/// Number of CGRAM character slots. Slot `n` is displayed by writing character code `n`.
pub const NUM_CUSTOM_GLYPHS: u8 = 8;

/// Character code shown for anything the ROM cannot display: a solid block.
pub const FALLBACK_GLYPH: u8 = 0xFF;

/// A 5x8 pixel bitmap for one CGRAM slot. One byte per row, top row first, with only the 5 least
/// significant bits used. The bottom row is where the underline cursor would go; the driver keeps
/// the cursor off, so it can be used freely.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CustomGlyph(pub [u8; 8]);

impl CustomGlyph {
    pub const fn from_rows(rows: [u8; 8]) -> Self {
        CustomGlyph(rows)
    }

    /// Unpacks a bitmap stored as a `u64` with the top row in the lowest byte.
    pub const fn from_packed(bits: u64) -> Self {
        let mut rows = [0u8; 8];
        let mut i = 0;
        while i < 8 {
            rows[i] = (bits >> (8 * i)) as u8;
            i += 1;
        }
        CustomGlyph(rows)
    }

    pub fn rows(&self) -> [u8; 8] {
        self.0
    }
}

pub const TILDE_GLYPH: CustomGlyph =
    CustomGlyph::from_rows([0x00, 0x08, 0x15, 0x02, 0x00, 0x00, 0x00, 0x00]);

pub const BACKSLASH_GLYPH: CustomGlyph =
    CustomGlyph::from_rows([0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00, 0x00]);

/// A code point that is displayed with a custom glyph registered at start-up.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReservedGlyph {
    pub code_point: char,
    /// CGRAM slot, 0..=7
    pub slot: u8,
    pub glyph: CustomGlyph,
}

/// Code point to character code translation. Reserved custom glyphs take precedence over the
/// builtin table; everything else at or below U+0080 maps to itself, the rest to
/// [`FALLBACK_GLYPH`].
#[derive(Debug, Clone)]
pub struct GlyphMap {
    reserved: [Option<(char, u8)>; MAX_RESERVED_GLYPHS],
}

impl GlyphMap {
    pub fn new(reserved: &[Option<ReservedGlyph>; MAX_RESERVED_GLYPHS]) -> Self {
        let mut entries = [None; MAX_RESERVED_GLYPHS];
        for (entry, glyph) in entries.iter_mut().zip(reserved.iter()) {
            *entry = glyph.map(|g| (g.code_point, g.slot));
        }
        Self { reserved: entries }
    }

    pub fn lookup(&self, code_point: char) -> u8 {
        if let Some(slot) = self
            .reserved
            .iter()
            .flatten()
            .find(|(c, _)| *c == code_point)
            .map(|(_, slot)| *slot)
        {
            return slot;
        }
        match builtin_glyph(code_point) {
            Some(code) => code,
            None if (code_point as u32) <= 0x80 => code_point as u8,
            None => FALLBACK_GLYPH,
        }
    }
}

fn builtin_glyph(code_point: char) -> Option<u8> {
    let code = match code_point {
        '¥' => 0x5C,             // the yen sign is where the backslash is supposed to be
        '→' => 0x7E,             // the right arrow is where the tilde is supposed to be
        '←' => 0x7F,
        'ₒ' | '｡' => 0xA1,       // small circle
        '┌' | '「' => 0xA2,
        '┘' | '」' => 0xA3,
        '·' => 0xA5,
        '∃' | 'Ǝ' => 0xAE,
        '▯' | '□' => 0xDB,
        '°' => 0xDF,
        'α' => 0xE0,
        'ä' => 0xE1,
        'β' | 'ß' => 0xE2,
        'ε' | 'Ɛ' => 0xE3,
        'μ' | 'µ' => 0xE4,
        'σ' => 0xE5,
        'ρ' => 0xE6,
        '√' => 0xE8,
        '⅟' => 0xE9,             // ROM "inverse" symbol, no exact Unicode equivalent
        '¢' => 0xEC,
        'ñ' => 0xEE,
        'ö' => 0xEF,
        'θ' => 0xF2,
        '∞' => 0xF3,
        'Ω' => 0xF4,
        'ü' => 0xF5,
        'Σ' => 0xF6,
        'π' => 0xF7,
        '÷' => 0xFD,
        '▮' | '■' => 0xFF,
        _ => return None,
    };
    Some(code)
}
