//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible 16x2 character display wired directly to GPIO pins with a 4-bit parallel bus, in an embedded, `no_std` environment.
//!
//! Key features include:
//! - Reliable start-up from any controller state, including after an MCU reset in the middle of a transfer
//! - Pacing by fixed worst-case delays (R/W tied to ground) or by polling the busy flag with an attempt budget
//! - UTF-8 text input, mapped onto the character ROM. Characters the ROM lacks show as a solid block
//! - Custom characters in CGRAM, with `~` and `\` provided as custom glyphs by default
//! - A logical cursor with line wrapping: text runs from row 1 into row 2, and the display is cleared when row 2 is full
//! - Number, voltage and bar graph helpers
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Optional support for the `defmt` and `ufmt` frameworks
//! - Optional interrupt-safe transfers through the `critical-section` crate
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! hd44780-parallel = { version = "0.1", features = ["defmt"] }
//! ```
//! The `features = ["defmt"]` line is optional and enables the `defmt` feature, which logs the start-up sequence and busy flag
//! timeouts and allows the library's types to be used with the `defmt` logging framework. Another optional feature is
//! `features = ["ufmt"]`, allowing the `uwriteln!` and `uwrite!` macros to be used. The `critical-section` feature provides
//! [`InterruptLock`], which keeps interrupt handlers off the bus while a byte is being transferred.
//!
//! Wire up the pins and create the display:
//! ```rust
//! use hd44780_parallel::{CharacterDisplay, DisplayConfig, GpioBus};
//!
//! // board setup
//! let (rs, en, rw) = ...; // OutputPin implementations
//! let data = [db4, db5, db6, db7]; // OutputPin + InputPin implementations
//! let delay = ...; // DelayNs implementation
//!
//! // with R/W wired, the busy flag can be polled
//! let bus = GpioBus::new(rs, en, rw, data);
//! let config = DisplayConfig::default().with_busy_polling(2000);
//! // without R/W, fixed delays are used
//! let bus = GpioBus::new_write_only(rs, en, data);
//! let config = DisplayConfig::default();
//!
//! let mut lcd = CharacterDisplay::new(bus, delay, config);
//! ```
//! Initialize the display:
//! ```rust
//! if let Err(e) = lcd.init() {
//!    panic!("Error initializing LCD: {}", e);
//! }
//! ```
//! Use the display:
//! ```rust
//! lcd.clear()?.goto(1, 3)?.print("Hello, world!")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "\n{}°C", 21)?;
//! ```
//! A line feed moves to row 2, or from row 2 to the "wrapped" position, where the next character clears the display
//! and is written to the top left. Text that reaches the end of row 1 continues on row 2 in the same way.
//!
//! The various methods for controlling the LCD return a `Result` that wraps the display object in `Ok()`, allowing for
//! easy chaining of commands.
//!
#![no_std]

pub mod bus;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod glyph;
pub mod lock;
mod text;
pub mod utf8;

#[cfg(test)]
mod sim;

use core::fmt::Display;

use embedded_hal::delay::DelayNs;

pub use bus::gpio::{GpioBus, NoPin};
pub use bus::{BusLine, Direction, ParallelBus};
pub use config::{DisplayConfig, SyncStrategy};
pub use cursor::Cursor;
pub use glyph::{CustomGlyph, ReservedGlyph};
#[cfg(feature = "critical-section")]
pub use lock::InterruptLock;
pub use lock::{BusLock, NoLock};

use config::COLUMNS;
use driver::command::{
    set_cgram_address, set_ddram_address, DisplayControl, DATA_WRITE_US, LCD_CMD_CLEARDISPLAY,
    LONG_COMMAND_US, SHORT_COMMAND_US,
};
use driver::{Hd44780, Register};
use glyph::{GlyphMap, NUM_CUSTOM_GLYPHS};
use utf8::Utf8Decoder;

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when using the display
pub enum CharacterDisplayError<E> {
    /// Error returned from the underlying pin implementation
    BusError(E),
    /// Formatting error
    FormattingError(core::fmt::Error),
    /// Busy flag polling was configured but the bus has no R/W line
    ReadNotSupported,
    /// Custom glyph slot is not in 0..=7
    GlyphSlotOutOfRange,
    /// Two reserved glyphs in the configuration share a custom glyph slot
    GlyphSlotInUse,
}

impl<E> From<E> for CharacterDisplayError<E> {
    fn from(err: E) -> Self {
        CharacterDisplayError::BusError(err)
    }
}

impl<E> From<&CharacterDisplayError<E>> for &'static str {
    fn from(err: &CharacterDisplayError<E>) -> Self {
        match err {
            CharacterDisplayError::BusError(_) => "Bus error",
            CharacterDisplayError::FormattingError(_) => "Formatting error",
            CharacterDisplayError::ReadNotSupported => "Read operation not supported",
            CharacterDisplayError::GlyphSlotOutOfRange => "Custom glyph slot out of range",
            CharacterDisplayError::GlyphSlotInUse => "Custom glyph slot used twice",
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for CharacterDisplayError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<E> ufmt::uDisplay for CharacterDisplayError<E> {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<E> Display for CharacterDisplayError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

/// A 16x2 character display. `LOCK` guards each byte transfer, see [`lock`].
pub struct CharacterDisplay<BUS, DELAY, LOCK = NoLock> {
    driver: Hd44780<BUS, DELAY, LOCK>,
    config: DisplayConfig,
    glyphs: GlyphMap,
    cursor: Cursor,
    decoder: Utf8Decoder,
    control: DisplayControl,
}

impl<BUS, DELAY> CharacterDisplay<BUS, DELAY, NoLock>
where
    BUS: ParallelBus,
    DELAY: DelayNs,
{
    /// Create a new character display object. Nothing is sent to the display until [`CharacterDisplay::init`].
    pub fn new(bus: BUS, delay: DELAY, config: DisplayConfig) -> Self {
        Self::new_with_lock(bus, delay, NoLock, config)
    }
}

impl<BUS, DELAY, LOCK> CharacterDisplay<BUS, DELAY, LOCK>
where
    BUS: ParallelBus,
    DELAY: DelayNs,
    LOCK: BusLock,
{
    /// Create a new character display object that holds `lock` for every byte transfer.
    pub fn new_with_lock(bus: BUS, delay: DELAY, lock: LOCK, config: DisplayConfig) -> Self {
        Self {
            driver: Hd44780::new(bus, delay, lock, config.sync()),
            glyphs: GlyphMap::new(config.reserved_glyphs()),
            config,
            cursor: Cursor::new(),
            decoder: Utf8Decoder::new(),
            control: DisplayControl::new(false, false, false),
        }
    }

    /// Initialize the display. This must be called before using the display, and may be called again at any
    /// time to recover a display that lost sync or power. Reserved glyphs from the configuration must use
    /// distinct slots in 0..=7; this is checked before anything is sent.
    pub fn init(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        let mut used_slots = 0u8;
        for glyph in self.config.reserved_glyphs().iter().flatten() {
            check_slot::<BUS::Error>(glyph.slot)?;
            let slot_bit = 1 << glyph.slot;
            if used_slots & slot_bit != 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("custom glyph slot {} reserved twice", glyph.slot);
                return Err(CharacterDisplayError::GlyphSlotInUse);
            }
            used_slots |= slot_bit;
        }

        self.control = self.driver.bring_up()?;
        self.cursor = Cursor::new();
        self.decoder.reset();

        let reserved = *self.config.reserved_glyphs();
        for glyph in reserved.iter().flatten() {
            self.register_custom_char(glyph.slot, glyph.glyph)?;
        }
        Ok(())
    }

    /// The logical cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// returns a reference to the bus. mostly needed for testing
    pub fn bus(&mut self) -> &mut BUS {
        self.driver.bus()
    }

    /// Hands back the bus, delay and lock.
    pub fn release(self) -> (BUS, DELAY, LOCK) {
        self.driver.release()
    }

    //--------------------------------------------------------------------------------------------------
    // cursor movement
    //--------------------------------------------------------------------------------------------------

    /// Move to the start of row 1.
    pub fn line1(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.line1();
        self.update_cursor()
    }

    /// Move to the start of row 2.
    pub fn line2(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.line2();
        self.update_cursor()
    }

    /// Set the cursor to a row (1 or 2) and column (1 to 16). Values out of range are clamped.
    pub fn goto(&mut self, row: u8, column: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.goto(row, column);
        self.update_cursor()
    }

    /// Move the cursor relative to its position. Rows and columns wrap around.
    pub fn move_cursor(
        &mut self,
        rows: i8,
        columns: i8,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.move_by(rows, columns);
        self.update_cursor()
    }

    /// Move one character back, from the start of row 1 to the end of row 2.
    pub fn back(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.back();
        self.update_cursor()
    }

    /// Move one character forward, from the end of row 2 to the start of row 1.
    pub fn forward(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.forward();
        self.update_cursor()
    }

    /// Move to the first column of the current row.
    pub fn home(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.cursor.home();
        self.update_cursor()
    }

    fn update_cursor(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.send_byte(
            Register::Instruction,
            set_ddram_address(self.cursor.address()),
            SHORT_COMMAND_US,
        )?;
        Ok(self)
    }

    //--------------------------------------------------------------------------------------------------
    // display control
    //--------------------------------------------------------------------------------------------------

    /// Clear the display and move the cursor to the start of row 1.
    pub fn clear(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver
            .send_byte(Register::Instruction, LCD_CMD_CLEARDISPLAY, LONG_COMMAND_US)?;
        self.cursor = Cursor::new();
        Ok(self)
    }

    /// Send a raw instruction, followed by the longest execution time of any instruction.
    /// The cursor is not updated.
    pub fn command(&mut self, command: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver
            .send_byte(Register::Instruction, command, LONG_COMMAND_US)?;
        Ok(self)
    }

    /// Set the display visibility. Contents are kept while the display is off.
    pub fn show_display(
        &mut self,
        show_display: bool,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.control.set_display_on(show_display);
        self.send_display_control()
    }

    /// Set the cursor visibility.
    pub fn show_cursor(
        &mut self,
        show_cursor: bool,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.control.set_cursor_on(show_cursor);
        self.send_display_control()
    }

    /// Set the cursor blinking.
    pub fn blink_cursor(
        &mut self,
        blink_cursor: bool,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.control.set_blink_on(blink_cursor);
        self.send_display_control()
    }

    fn send_display_control(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver
            .send_byte(Register::Instruction, self.control.command(), SHORT_COMMAND_US)?;
        Ok(self)
    }

    /// Store a 5x8 bitmap in CGRAM slot `slot` (0 to 7). Writing character code `slot` displays it, and
    /// characters already on screen with that code change immediately.
    pub fn register_custom_char(
        &mut self,
        slot: u8,
        glyph: CustomGlyph,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        check_slot::<BUS::Error>(slot)?;
        self.driver.send_byte(
            Register::Instruction,
            set_cgram_address(slot * 8),
            SHORT_COMMAND_US,
        )?;
        for row in glyph.rows() {
            self.driver.send_byte(Register::Data, row, DATA_WRITE_US)?;
        }
        // back to DDRAM, or the next character would overwrite the bitmap
        self.update_cursor()
    }

    //--------------------------------------------------------------------------------------------------
    // writing
    //--------------------------------------------------------------------------------------------------

    /// Feed one byte of UTF-8 text. Characters appear once their last byte has arrived.
    pub fn write_byte(&mut self, byte: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        for c in self.decoder.push(byte) {
            self.write_char(c)?;
        }
        Ok(self)
    }

    /// Display one character at the cursor, or move the cursor for `'\n'`.
    pub fn write_char(&mut self, c: char) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        if c == '\n' {
            self.cursor.newline();
            return self.update_cursor();
        }
        let code = self.glyphs.lookup(c);
        self.write_code(code)
    }

    /// Prints a string at the current cursor position.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        for byte in text.bytes() {
            self.write_byte(byte)?;
        }
        Ok(self)
    }

    fn write_code(&mut self, code: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        if self.cursor.is_wrapped() {
            #[cfg(feature = "defmt")]
            defmt::debug!("row 2 full, clearing display");
            self.clear()?;
        } else if self.cursor.position() == COLUMNS {
            // the address counter runs on to 0x10, not to row 2
            self.update_cursor()?;
        }
        self.driver.send_byte(Register::Data, code, DATA_WRITE_US)?;
        self.cursor.advance();
        Ok(self)
    }
}

fn check_slot<E>(slot: u8) -> Result<(), CharacterDisplayError<E>> {
    if slot < NUM_CUSTOM_GLYPHS {
        Ok(())
    } else {
        #[cfg(feature = "defmt")]
        defmt::warn!("custom glyph slot {} out of range", slot);
        Err(CharacterDisplayError::GlyphSlotOutOfRange)
    }
}

/// Implement the `core::fmt::Write` trait for the display, allowing it to be used with the `write!` macro.
impl<BUS, DELAY, LOCK> core::fmt::Write for CharacterDisplay<BUS, DELAY, LOCK>
where
    BUS: ParallelBus,
    DELAY: DelayNs,
    LOCK: BusLock,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the display, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<BUS, DELAY, LOCK> ufmt::uWrite for CharacterDisplay<BUS, DELAY, LOCK>
where
    BUS: ParallelBus,
    DELAY: DelayNs,
    LOCK: BusLock,
{
    fn write_str(&mut self, s: &str) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.print(s)?;
        Ok(())
    }

    type Error = CharacterDisplayError<BUS::Error>;
}
