pub mod gpio;

/// The logical lines of the HD44780 4-bit parallel interface. DB0..DB3 are not used in 4-bit mode.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusLine {
    /// Register select. Low selects the instruction register, high the data register.
    RegisterSelect,
    /// Read/write. Low for writes, high for reads (busy flag and address counter).
    ReadWrite,
    /// Enable strobe. Data is latched by the controller on the falling edge.
    Enable,
    Db4,
    Db5,
    Db6,
    /// Carries the busy flag during a status read.
    Db7,
}

impl BusLine {
    /// The data lines in bit order, DB4 carrying bit 0 of a nibble.
    pub const DATA: [BusLine; 4] = [BusLine::Db4, BusLine::Db5, BusLine::Db6, BusLine::Db7];
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Output,
    Input,
}

/// The bus primitive the driver is written against: drive or sample one line at a time.
/// Timing is not part of this trait; the driver holds lines with a separate
/// [`embedded_hal::delay::DelayNs`] implementation.
///
/// Implementations must leave every line as an output after construction. The driver only switches
/// the data lines to inputs for the duration of a busy flag read.
pub trait ParallelBus {
    type Error;

    /// Drives `line` high (`true`) or low (`false`).
    fn set_line(&mut self, line: BusLine, high: bool) -> Result<(), Self::Error>;

    /// Samples `line`. Only meaningful for data lines switched to [`Direction::Input`].
    fn read_line(&mut self, line: BusLine) -> Result<bool, Self::Error>;

    /// Switches `line` between driving and listening.
    fn set_direction(&mut self, line: BusLine, direction: Direction) -> Result<(), Self::Error>;

    /// Whether the R/W line is wired, which reading the busy flag requires.
    fn supports_reads(&self) -> bool {
        true
    }
}
