//! A simulated HD44780 on the other end of a [`ParallelBus`], for host tests. Transfers are
//! latched on the falling edge of EN like the real controller, so nibble sync, interface mode and
//! RAM contents come out of the line activity alone.

extern crate std;

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use std::vec::Vec;

use crate::bus::{BusLine, Direction, ParallelBus};
use crate::{CharacterDisplay, DisplayConfig};

/// Interface state of the controller, which is what homing has to cope with.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum InterfaceMode {
    EightBit,
    /// 4-bit mode, next nibble is the upper half of a byte.
    FourBitHigh,
    /// 4-bit mode with the upper half `high` already latched.
    FourBitLow { high: u8 },
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum Target {
    Ddram,
    Cgram,
}

/// A byte the controller acted on. `data` is the RS level.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Executed {
    pub data: bool,
    pub byte: u8,
}

pub struct SimulatedHd44780 {
    // RS, R/W, EN, DB4..DB7 in `line_index` order
    lines: [bool; 7],
    data_input: [bool; 4],
    mode: InterfaceMode,
    target: Target,
    address: u8,
    pub ddram: [u8; 128],
    pub cgram: [u8; 64],
    pub executed: Vec<Executed>,
    pub display_control: u8,
    pub entry_mode: u8,
    pub function_set: u8,
    busy_reads: u16,
    always_busy: bool,
    status_high_nibble: bool,
    pub status_reads: u16,
    read_write_wired: bool,
}

fn line_index(line: BusLine) -> usize {
    match line {
        BusLine::RegisterSelect => 0,
        BusLine::ReadWrite => 1,
        BusLine::Enable => 2,
        BusLine::Db4 => 3,
        BusLine::Db5 => 4,
        BusLine::Db6 => 5,
        BusLine::Db7 => 6,
    }
}

impl SimulatedHd44780 {
    pub fn new(mode: InterfaceMode) -> Self {
        Self {
            lines: [false; 7],
            data_input: [false; 4],
            mode,
            target: Target::Ddram,
            address: 0,
            ddram: [b' '; 128],
            cgram: [0; 64],
            executed: Vec::new(),
            display_control: 0,
            entry_mode: 0,
            function_set: 0,
            busy_reads: 0,
            always_busy: false,
            status_high_nibble: true,
            status_reads: 0,
            read_write_wired: true,
        }
    }

    /// Without R/W the controller can only be written to.
    pub fn write_only(mode: InterfaceMode) -> Self {
        Self {
            read_write_wired: false,
            ..Self::new(mode)
        }
    }

    /// The next `reads` status reads report busy.
    pub fn busy_for(&mut self, reads: u16) {
        self.busy_reads = reads;
    }

    pub fn stuck_busy(&mut self, busy: bool) {
        self.always_busy = busy;
    }

    pub fn mode(&self) -> InterfaceMode {
        self.mode
    }

    /// Current DDRAM/CGRAM address counter.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn targets_ddram(&self) -> bool {
        self.target == Target::Ddram
    }

    /// The 16 characters of a row, 1 or 2.
    pub fn row(&self, row: u8) -> [u8; 16] {
        let start = if row == 2 { 0x40 } else { 0x00 };
        let mut out = [0u8; 16];
        out.copy_from_slice(&self.ddram[start..start + 16]);
        out
    }

    pub fn row_text(&self, row: u8) -> std::string::String {
        self.row(row).iter().map(|b| char::from(*b)).collect()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.executed
            .iter()
            .filter(|e| !e.data)
            .map(|e| e.byte)
            .collect()
    }

    pub fn data_writes(&self) -> Vec<u8> {
        self.executed
            .iter()
            .filter(|e| e.data)
            .map(|e| e.byte)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.executed.clear();
    }

    fn busy(&self) -> bool {
        self.always_busy || self.busy_reads > 0
    }

    fn data_nibble(&self) -> u8 {
        (0..4).fold(0, |acc, bit| acc | (u8::from(self.lines[3 + bit]) << bit))
    }

    fn enable_falling(&mut self) {
        if self.lines[1] {
            // status read: busy flag + AC high bits, then AC low bits
            if self.status_high_nibble {
                self.status_reads += 1;
                if self.busy_reads > 0 {
                    self.busy_reads -= 1;
                }
            }
            self.status_high_nibble = !self.status_high_nibble;
            return;
        }

        let data = self.lines[0];
        let nibble = self.data_nibble();
        match self.mode {
            // DB0..DB3 are not connected and read as low
            InterfaceMode::EightBit => self.execute(data, nibble << 4),
            InterfaceMode::FourBitHigh => self.mode = InterfaceMode::FourBitLow { high: nibble },
            InterfaceMode::FourBitLow { high } => {
                self.mode = InterfaceMode::FourBitHigh;
                self.execute(data, (high << 4) | nibble);
            }
        }
    }

    fn execute(&mut self, data: bool, byte: u8) {
        self.executed.push(Executed { data, byte });
        if data {
            match self.target {
                Target::Ddram => {
                    self.ddram[usize::from(self.address & 0x7F)] = byte;
                    self.address = (self.address + 1) & 0x7F;
                }
                Target::Cgram => {
                    self.cgram[usize::from(self.address & 0x3F)] = byte;
                    self.address = (self.address + 1) & 0x3F;
                }
            }
            return;
        }

        match byte {
            b if b & 0x80 != 0 => {
                self.target = Target::Ddram;
                self.address = b & 0x7F;
            }
            b if b & 0x40 != 0 => {
                self.target = Target::Cgram;
                self.address = b & 0x3F;
            }
            b if b & 0x20 != 0 => {
                self.function_set = b;
                self.mode = if b & 0x10 != 0 {
                    InterfaceMode::EightBit
                } else if self.mode == InterfaceMode::EightBit {
                    InterfaceMode::FourBitHigh
                } else {
                    self.mode
                };
            }
            // cursor/display shift is not modelled
            b if b & 0x10 != 0 => {}
            b if b & 0x08 != 0 => self.display_control = b,
            b if b & 0x04 != 0 => self.entry_mode = b,
            b if b & 0x02 != 0 => {
                self.target = Target::Ddram;
                self.address = 0;
            }
            0x01 => {
                self.ddram = [b' '; 128];
                self.target = Target::Ddram;
                self.address = 0;
            }
            _ => {}
        }
    }
}

impl ParallelBus for SimulatedHd44780 {
    type Error = Infallible;

    fn set_line(&mut self, line: BusLine, high: bool) -> Result<(), Self::Error> {
        let index = line_index(line);
        if line == BusLine::ReadWrite && !self.read_write_wired {
            return Ok(());
        }
        let was_high = self.lines[index];
        self.lines[index] = high;
        if line == BusLine::Enable && was_high && !high {
            self.enable_falling();
        }
        Ok(())
    }

    fn read_line(&mut self, line: BusLine) -> Result<bool, Self::Error> {
        // the controller only drives DB4..DB7 during a read with EN high
        let reading = self.lines[1] && self.lines[2] && self.data_input.iter().all(|input| *input);
        match line {
            BusLine::Db7 if reading && self.status_high_nibble => Ok(self.busy()),
            BusLine::Db4 | BusLine::Db5 | BusLine::Db6 | BusLine::Db7 if reading => {
                let bit = line_index(line) - 3;
                let nibble = if self.status_high_nibble {
                    self.address >> 4
                } else {
                    self.address & 0x0F
                };
                Ok((nibble >> bit) & 1 == 1)
            }
            _ => Ok(self.lines[line_index(line)]),
        }
    }

    fn set_direction(&mut self, line: BusLine, direction: Direction) -> Result<(), Self::Error> {
        let index = line_index(line);
        if index >= 3 {
            self.data_input[index - 3] = direction == Direction::Input;
        }
        Ok(())
    }

    fn supports_reads(&self) -> bool {
        self.read_write_wired
    }
}

/// Adds up the requested delays instead of waiting.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl RecordingDelay {
    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

pub type SimDisplay = CharacterDisplay<SimulatedHd44780, RecordingDelay>;

/// An initialized display on a simulated controller, with the transfer log emptied.
pub fn ready_display(config: DisplayConfig) -> SimDisplay {
    let mut lcd = CharacterDisplay::new(
        SimulatedHd44780::new(InterfaceMode::FourBitHigh),
        RecordingDelay::default(),
        config,
    );
    lcd.init().unwrap();
    lcd.bus().clear_log();
    lcd
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    fn send_nibble(sim: &mut SimulatedHd44780, data: bool, nibble: u8) {
        sim.set_line(BusLine::RegisterSelect, data).unwrap();
        for (bit, line) in BusLine::DATA.into_iter().enumerate() {
            sim.set_line(line, (nibble >> bit) & 1 == 1).unwrap();
        }
        sim.set_line(BusLine::Enable, true).unwrap();
        sim.set_line(BusLine::Enable, false).unwrap();
    }

    #[test]
    fn test_simulator_latches_on_falling_edge() {
        let mut sim = SimulatedHd44780::new(InterfaceMode::FourBitHigh);
        send_nibble(&mut sim, true, 0x4);
        assert_eq!(sim.mode(), InterfaceMode::FourBitLow { high: 0x4 });
        send_nibble(&mut sim, true, 0x1);
        assert_eq!(sim.data_writes(), std::vec![0x41]);
        assert_eq!(sim.ddram[0], b'A');
        assert_eq!(sim.address(), 1);
    }

    #[test]
    fn test_simulator_function_set_switches_mode() {
        let mut sim = SimulatedHd44780::new(InterfaceMode::EightBit);
        send_nibble(&mut sim, false, 0b0010);
        assert_eq!(sim.mode(), InterfaceMode::FourBitHigh);
        send_nibble(&mut sim, false, 0b0011);
        send_nibble(&mut sim, false, 0b0000);
        assert_eq!(sim.mode(), InterfaceMode::EightBit);
        assert_eq!(sim.commands(), std::vec![0x20, 0x30]);
    }
}
