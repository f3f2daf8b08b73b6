use bitfield::bitfield;

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
pub const LCD_CMD_SETCGRAMADDR: u8 = 0x40; //  Used to set the CGRAM (character generator RAM) with characters
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// worst case execution times at 270 kHz, in microseconds
pub const SHORT_COMMAND_US: u32 = 42; //  Most instructions, including DDRAM/CGRAM address set
pub const DATA_WRITE_US: u32 = 46; //  Writing one byte of DDRAM/CGRAM
pub const LONG_COMMAND_US: u32 = 1640; //  Clear display and return home

// Function set: 0 0 1 DL N F * *
bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct FunctionSet(u8);
    impl Debug;
    pub eight_bit_bus, set_eight_bit_bus: 4;
    pub two_lines, set_two_lines: 3;
    pub tall_font, set_tall_font: 2;
}

impl FunctionSet {
    pub fn new(eight_bit_bus: bool, two_lines: bool, tall_font: bool) -> Self {
        let mut bits = FunctionSet(LCD_CMD_FUNCTIONSET);
        bits.set_eight_bit_bus(eight_bit_bus);
        bits.set_two_lines(two_lines);
        bits.set_tall_font(tall_font);
        bits
    }

    pub fn command(&self) -> u8 {
        self.0
    }
}

// Display on/off control: 0 0 0 0 1 D C B
bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct DisplayControl(u8);
    impl Debug;
    pub display_on, set_display_on: 2;
    pub cursor_on, set_cursor_on: 1;
    pub blink_on, set_blink_on: 0;
}

impl DisplayControl {
    pub fn new(display_on: bool, cursor_on: bool, blink_on: bool) -> Self {
        let mut bits = DisplayControl(LCD_CMD_DISPLAYCONTROL);
        bits.set_display_on(display_on);
        bits.set_cursor_on(cursor_on);
        bits.set_blink_on(blink_on);
        bits
    }

    pub fn command(&self) -> u8 {
        self.0
    }
}

// Entry mode set: 0 0 0 0 0 1 I/D S
bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct EntryMode(u8);
    impl Debug;
    pub increment, set_increment: 1;
    pub shift, set_shift: 0;
}

impl EntryMode {
    pub fn new(increment: bool, shift: bool) -> Self {
        let mut bits = EntryMode(LCD_CMD_ENTRYMODESET);
        bits.set_increment(increment);
        bits.set_shift(shift);
        bits
    }

    pub fn command(&self) -> u8 {
        self.0
    }
}

/// "Set DDRAM address" command: 1 A6 A5 A4 A3 A2 A1 A0
pub const fn set_ddram_address(address: u8) -> u8 {
    LCD_CMD_SETDDRAMADDR | (address & 0x7F)
}

/// "Set CGRAM address" command: 0 1 A5 A4 A3 A2 A1 A0. Each character takes 8 bytes of CGRAM.
pub const fn set_cgram_address(address: u8) -> u8 {
    LCD_CMD_SETCGRAMADDR | (address & 0x3F)
}
