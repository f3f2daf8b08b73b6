//! The HD44780 transmitter: nibble and byte transfers over a [`ParallelBus`], pacing by busy flag
//! or fixed delay, and the bring-up sequence. Knows nothing about cursors or text.

pub mod command;
pub mod homing;

use embedded_hal::delay::DelayNs;

use crate::bus::{BusLine, Direction, ParallelBus};
use crate::config::SyncStrategy;
use crate::lock::BusLock;
use crate::CharacterDisplayError;
use command::{
    DisplayControl, EntryMode, FunctionSet, LCD_CMD_CLEARDISPLAY, LONG_COMMAND_US,
    SHORT_COMMAND_US,
};
use homing::HomingState;

/// VCC rise to first instruction (min. 15 ms)
const POWER_ON_WAIT_MS: u32 = 15;
/// Covers address setup (min. 60 ns), enable pulse width (min. 230 ns) and hold (min. 10 ns)
const BUS_SETTLE_US: u32 = 1;

/// Destination of a transfer, selected by the RS line.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Instruction,
    Data,
}

impl Register {
    fn select_line(self) -> bool {
        self == Register::Data
    }
}

/// Result of a busy flag poll.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusyPoll {
    /// The flag read clear on read number `attempts`.
    Ready { attempts: u16 },
    /// Still busy after the whole budget.
    TimedOut,
}

pub struct Hd44780<BUS, DELAY, LOCK> {
    bus: BUS,
    delay: DELAY,
    lock: LOCK,
    sync: SyncStrategy,
}

impl<BUS, DELAY, LOCK> Hd44780<BUS, DELAY, LOCK>
where
    BUS: ParallelBus,
    DELAY: DelayNs,
    LOCK: BusLock,
{
    pub fn new(bus: BUS, delay: DELAY, lock: LOCK, sync: SyncStrategy) -> Self {
        Self {
            bus,
            delay,
            lock,
            sync,
        }
    }

    pub fn sync(&self) -> SyncStrategy {
        self.sync
    }

    pub fn bus(&mut self) -> &mut BUS {
        &mut self.bus
    }

    pub fn release(self) -> (BUS, DELAY, LOCK) {
        (self.bus, self.delay, self.lock)
    }

    /// Busy polling needs the R/W line.
    pub fn check_sync_support(&self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        match self.sync {
            SyncStrategy::BusyPoll { .. } if !self.bus.supports_reads() => {
                Err(CharacterDisplayError::ReadNotSupported)
            }
            _ => Ok(()),
        }
    }

    /// Drives every line as a low output.
    pub fn init_lines(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        for line in BusLine::DATA {
            self.bus.set_direction(line, Direction::Output)?;
        }
        for line in [BusLine::RegisterSelect, BusLine::ReadWrite, BusLine::Enable]
            .into_iter()
            .chain(BusLine::DATA)
        {
            self.bus.set_line(line, false)?;
        }
        Ok(())
    }

    /// Brings the controller from an unknown state to 4-bit, 2-line mode with the display on,
    /// cursor off and DDRAM cleared. Every step uses fixed delays, whatever the configured
    /// strategy. Returns the display control state it left the controller in.
    pub fn bring_up(&mut self) -> Result<DisplayControl, CharacterDisplayError<BUS::Error>> {
        self.check_sync_support()?;
        self.init_lines()?;
        self.delay.delay_ms(POWER_ON_WAIT_MS);
        self.home_interface()?;

        let display_on = DisplayControl::new(true, false, false);
        let setup = [
            (FunctionSet::new(false, true, false).command(), SHORT_COMMAND_US),
            (DisplayControl::new(false, false, false).command(), SHORT_COMMAND_US),
            (LCD_CMD_CLEARDISPLAY, LONG_COMMAND_US),
            (EntryMode::new(true, false).command(), SHORT_COMMAND_US),
            (display_on.command(), SHORT_COMMAND_US),
        ];
        for (command, delay_us) in setup {
            #[cfg(feature = "defmt")]
            defmt::trace!("bring-up command {=u8:#x}", command);
            self.send_byte_with(
                Register::Instruction,
                command,
                delay_us,
                SyncStrategy::FixedDelay,
            )?;
        }
        Ok(display_on)
    }

    /// Runs the homing sequence until the interface is in 4-bit nibble sync.
    pub fn home_interface(&mut self) -> Result<HomingState, CharacterDisplayError<BUS::Error>> {
        let mut state = HomingState::Unknown;
        while let Some((step, next)) = state.step() {
            self.send_nibble(Register::Instruction, step.nibble)?;
            self.delay.delay_us(step.hold_us);
            #[cfg(feature = "defmt")]
            defmt::debug!("homing {} -> {}", state, next);
            state = next;
        }
        Ok(state)
    }

    /// One half-transfer: RS, DB4..DB7 from the low four bits of `nibble`, then an enable pulse.
    pub fn send_nibble(
        &mut self,
        register: Register,
        nibble: u8,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus
            .set_line(BusLine::RegisterSelect, register.select_line())?;
        for (bit, line) in BusLine::DATA.into_iter().enumerate() {
            self.bus.set_line(line, (nibble >> bit) & 1 == 1)?;
        }
        self.delay.delay_us(BUS_SETTLE_US);
        self.pulse_enable()
    }

    /// Sends a byte, high nibble first, and waits for the controller with the configured
    /// strategy. `delay_us` is the instruction's execution time, used only with fixed delays.
    pub fn send_byte(
        &mut self,
        register: Register,
        byte: u8,
        delay_us: u32,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.send_byte_with(register, byte, delay_us, self.sync)
    }

    /// Like [`Hd44780::send_byte`] with an explicit strategy.
    pub fn send_byte_with(
        &mut self,
        register: Register,
        byte: u8,
        delay_us: u32,
        sync: SyncStrategy,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        let _guard = self.lock.acquire();

        self.send_nibble(register, byte >> 4)?;
        self.send_nibble(register, byte & 0x0F)?;

        match sync {
            SyncStrategy::FixedDelay => self.delay.delay_us(delay_us),
            SyncStrategy::BusyPoll { attempts } => {
                if let BusyPoll::TimedOut = self.poll_busy_flag(attempts)? {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "busy flag still set after {} reads, continuing with {=u8:#x}",
                        attempts,
                        byte
                    );
                }
            }
        }
        Ok(())
    }

    /// Reads the busy flag until it clears or `attempts` reads have been made. Each read takes two
    /// enable pulses, since the status register comes out in two nibbles; the second is ignored.
    /// A budget of zero returns [`BusyPoll::TimedOut`] without touching the bus.
    ///
    /// R/W and the data lines are put back into write mode even when a pin fails mid-read, so a
    /// [`CharacterDisplayError::BusError`] does not leave the bus misframed for later transfers.
    pub fn poll_busy_flag(
        &mut self,
        attempts: u16,
    ) -> Result<BusyPoll, CharacterDisplayError<BUS::Error>> {
        if attempts == 0 {
            return Ok(BusyPoll::TimedOut);
        }

        let polled = self
            .begin_status_read()
            .and_then(|()| self.read_busy_flag(attempts));
        let restored = self.end_status_read();
        let result = polled?;
        restored?;
        Ok(result)
    }

    fn begin_status_read(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus.set_line(BusLine::RegisterSelect, false)?;
        // some controllers drive the data lines as soon as R/W goes high
        for line in BusLine::DATA {
            self.bus.set_direction(line, Direction::Input)?;
        }
        self.bus.set_line(BusLine::ReadWrite, true)?;
        self.delay.delay_us(BUS_SETTLE_US);
        Ok(())
    }

    fn read_busy_flag(
        &mut self,
        attempts: u16,
    ) -> Result<BusyPoll, CharacterDisplayError<BUS::Error>> {
        for attempt in 1..=attempts {
            self.bus.set_line(BusLine::Enable, true)?;
            self.delay.delay_us(BUS_SETTLE_US);
            let busy = self.bus.read_line(BusLine::Db7);
            // EN comes down before a read error is passed on
            self.bus.set_line(BusLine::Enable, false)?;
            self.delay.delay_us(BUS_SETTLE_US);
            let busy = busy?;
            // address counter low nibble
            self.pulse_enable()?;

            if !busy {
                return Ok(BusyPoll::Ready { attempts: attempt });
            }
        }
        Ok(BusyPoll::TimedOut)
    }

    fn end_status_read(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus.set_line(BusLine::ReadWrite, false)?;
        for line in BusLine::DATA {
            self.bus.set_direction(line, Direction::Output)?;
        }
        self.delay.delay_us(BUS_SETTLE_US);
        Ok(())
    }

    fn pulse_enable(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus.set_line(BusLine::Enable, true)?;
        self.delay.delay_us(BUS_SETTLE_US);
        self.bus.set_line(BusLine::Enable, false)?;
        self.delay.delay_us(BUS_SETTLE_US);
        Ok(())
    }
}
