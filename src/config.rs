use crate::glyph::{CustomGlyph, ReservedGlyph, BACKSLASH_GLYPH, TILDE_GLYPH};

/// Display rows. Row 1 lives at DDRAM 0x00..0x0F, row 2 at 0x40..0x4F.
pub const ROWS: u8 = 2;
/// Display columns per row.
pub const COLUMNS: u8 = 16;

/// Tilde, backslash and one free-form symbol.
pub const MAX_RESERVED_GLYPHS: usize = 3;

const TILDE_INDEX: usize = 0;
const BACKSLASH_INDEX: usize = 1;
const SYMBOL_INDEX: usize = 2;

/// How the driver waits for the controller to finish a transfer.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncStrategy {
    /// Wait the documented worst-case execution time of each instruction. Works with R/W tied
    /// to ground.
    #[default]
    FixedDelay,
    /// Read the busy flag until it clears, giving up after `attempts` reads. Giving up is not an
    /// error; the driver carries on as if the controller were ready. Requires the R/W line.
    BusyPoll { attempts: u16 },
}

/// Start-up configuration of a [`CharacterDisplay`](crate::CharacterDisplay).
///
/// `DisplayConfig::default()` uses fixed delays and reserves CGRAM slot 1 for `~` and slot 2 for
/// `\`, the two printable ASCII characters missing from the character ROM.
/// `DisplayConfig::new()` reserves nothing.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    sync: SyncStrategy,
    reserved: [Option<ReservedGlyph>; MAX_RESERVED_GLYPHS],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new().with_tilde(1).with_backslash(2)
    }
}

impl DisplayConfig {
    pub const fn new() -> Self {
        Self {
            sync: SyncStrategy::FixedDelay,
            reserved: [None; MAX_RESERVED_GLYPHS],
        }
    }

    pub fn with_sync(mut self, sync: SyncStrategy) -> Self {
        self.sync = sync;
        self
    }

    /// Poll the busy flag instead of waiting fixed delays.
    pub fn with_busy_polling(self, attempts: u16) -> Self {
        self.with_sync(SyncStrategy::BusyPoll { attempts })
    }

    /// Display `~` with a custom glyph in CGRAM slot `slot`.
    pub fn with_tilde(mut self, slot: u8) -> Self {
        self.reserved[TILDE_INDEX] = Some(ReservedGlyph {
            code_point: '~',
            slot,
            glyph: TILDE_GLYPH,
        });
        self
    }

    /// Display `\` with a custom glyph in CGRAM slot `slot`.
    pub fn with_backslash(mut self, slot: u8) -> Self {
        self.reserved[BACKSLASH_INDEX] = Some(ReservedGlyph {
            code_point: '\\',
            slot,
            glyph: BACKSLASH_GLYPH,
        });
        self
    }

    /// Display `code_point` with `glyph` in CGRAM slot `slot`. Replaces an earlier symbol. The slot must
    /// differ from those of `~` and `\`.
    pub fn with_symbol(mut self, code_point: char, slot: u8, glyph: CustomGlyph) -> Self {
        self.reserved[SYMBOL_INDEX] = Some(ReservedGlyph {
            code_point,
            slot,
            glyph,
        });
        self
    }

    pub fn sync(&self) -> SyncStrategy {
        self.sync
    }

    pub fn reserved_glyphs(&self) -> &[Option<ReservedGlyph>; MAX_RESERVED_GLYPHS] {
        &self.reserved
    }
}
