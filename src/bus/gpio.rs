use core::marker::PhantomData;
use embedded_hal::digital::{self, ErrorType, InputPin, OutputPin};

use super::{BusLine, Direction, ParallelBus};

/// Stand-in for an R/W line that is tied to ground. Writes are accepted and ignored.
pub struct NoPin<E> {
    _marker: PhantomData<E>,
}

impl<E> Default for NoPin<E> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> ErrorType for NoPin<E>
where
    E: digital::Error,
{
    type Error = E;
}

impl<E> OutputPin for NoPin<E>
where
    E: digital::Error,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// [`ParallelBus`] over `embedded-hal` GPIO pins. RS, EN and R/W are plain outputs; the four data
/// lines must also be readable. When the driver switches a data line to input the pin is driven
/// high, which releases an open-drain or pulled-up quasi-bidirectional line so the controller can
/// pull it down. All pins share one error type.
pub struct GpioBus<RS, EN, RW, D> {
    rs: RS,
    en: EN,
    rw: Option<RW>,
    data: [D; 4],
}

impl<RS, EN, RW, D> GpioBus<RS, EN, RW, D>
where
    RS: OutputPin,
    EN: OutputPin<Error = RS::Error>,
    RW: OutputPin<Error = RS::Error>,
    D: OutputPin<Error = RS::Error> + InputPin,
{
    /// Creates a bus with the R/W line wired, so the busy flag can be polled.
    /// `data` holds DB4, DB5, DB6 and DB7 in that order.
    pub fn new(rs: RS, en: EN, rw: RW, data: [D; 4]) -> Self {
        Self {
            rs,
            en,
            rw: Some(rw),
            data,
        }
    }

    /// Hands the pins back. The R/W pin is `None` for a write-only bus.
    pub fn release(self) -> (RS, EN, Option<RW>, [D; 4]) {
        (self.rs, self.en, self.rw, self.data)
    }

    fn data_pin(&mut self, line: BusLine) -> Option<&mut D> {
        match line {
            BusLine::Db4 => Some(&mut self.data[0]),
            BusLine::Db5 => Some(&mut self.data[1]),
            BusLine::Db6 => Some(&mut self.data[2]),
            BusLine::Db7 => Some(&mut self.data[3]),
            _ => None,
        }
    }
}

impl<RS, EN, D> GpioBus<RS, EN, NoPin<RS::Error>, D>
where
    RS: OutputPin,
    EN: OutputPin<Error = RS::Error>,
    D: OutputPin<Error = RS::Error> + InputPin,
{
    /// Creates a bus whose R/W line is tied low. Only fixed-delay pacing works with such a bus.
    pub fn new_write_only(rs: RS, en: EN, data: [D; 4]) -> Self {
        Self {
            rs,
            en,
            rw: None,
            data,
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<RS, EN, RW, D> ParallelBus for GpioBus<RS, EN, RW, D>
where
    RS: OutputPin,
    EN: OutputPin<Error = RS::Error>,
    RW: OutputPin<Error = RS::Error>,
    D: OutputPin<Error = RS::Error> + InputPin,
{
    type Error = RS::Error;

    fn set_line(&mut self, line: BusLine, high: bool) -> Result<(), Self::Error> {
        match line {
            BusLine::RegisterSelect => drive(&mut self.rs, high),
            BusLine::Enable => drive(&mut self.en, high),
            BusLine::ReadWrite => match self.rw.as_mut() {
                Some(rw) => drive(rw, high),
                None => Ok(()),
            },
            data_line => match self.data_pin(data_line) {
                Some(pin) => drive(pin, high),
                None => Ok(()),
            },
        }
    }

    fn read_line(&mut self, line: BusLine) -> Result<bool, Self::Error> {
        // control lines are write-only
        match self.data_pin(line) {
            Some(pin) => pin.is_high(),
            None => Ok(false),
        }
    }

    fn set_direction(&mut self, line: BusLine, direction: Direction) -> Result<(), Self::Error> {
        match (self.data_pin(line), direction) {
            (Some(pin), Direction::Input) => pin.set_high(),
            _ => Ok(()),
        }
    }

    fn supports_reads(&self) -> bool {
        self.rw.is_some()
    }
}
