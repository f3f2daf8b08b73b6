// Number, voltage and bar graph output. Everything here goes through `write_char`, so line
// wrapping and the cursor behave as for any other text.

use embedded_hal::delay::DelayNs;

use crate::bus::ParallelBus;
use crate::config::COLUMNS;
use crate::lock::BusLock;
use crate::{CharacterDisplay, CharacterDisplayError};

// shown as the solid block 0xFF
const BAR_SEGMENT: char = '▮';

impl<BUS, DELAY, LOCK> CharacterDisplay<BUS, DELAY, LOCK>
where
    BUS: ParallelBus,
    DELAY: DelayNs,
    LOCK: BusLock,
{
    /// Write the low four bits of `value` as one lowercase hex digit.
    pub fn write_hex_nibble(
        &mut self,
        value: u8,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let digit = value & 0x0F;
        let c = if digit < 10 {
            b'0' + digit
        } else {
            b'a' + digit - 10
        };
        self.write_char(char::from(c))
    }

    /// Two hex digits.
    pub fn write_hex_byte(
        &mut self,
        value: u8,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.write_hex_nibble(value >> 4)?.write_hex_nibble(value)
    }

    /// Four hex digits.
    pub fn write_hex_word(
        &mut self,
        value: u16,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let [high, low] = value.to_be_bytes();
        self.write_hex_byte(high)?.write_hex_byte(low)
    }

    /// Hex digits without leading zeros. Zero is written as `0`.
    pub fn write_hex(&mut self, value: u16) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let digits = (16 - value.leading_zeros()).div_ceil(4).max(1);
        for shift in (0..digits).rev() {
            self.write_hex_nibble((value >> (4 * shift)) as u8)?;
        }
        Ok(self)
    }

    /// `0x` followed by eight hex digits.
    pub fn write_hex32(&mut self, value: u32) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.print("0x")?
            .write_hex_word((value >> 16) as u16)?
            .write_hex_word(value as u16)
    }

    /// Decimal without leading zeros.
    pub fn write_dec(&mut self, value: u32) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let mut digits = [0u8; 10];
        let mut count = 0;
        let mut rest = value;
        loop {
            digits[count] = b'0' + (rest % 10) as u8;
            count += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        for digit in digits[..count].iter().rev() {
            self.write_char(char::from(*digit))?;
        }
        Ok(self)
    }

    /// Write an ADC reading as a voltage with three decimals, e.g. `2.502V`. `value_upper_bound` is the reading
    /// that corresponds to `volt_upper_bound` volts. A zero bound is written as `0.000V`.
    pub fn write_voltage(
        &mut self,
        value: u16,
        value_upper_bound: u16,
        volt_upper_bound: u8,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let millivolts = if value_upper_bound == 0 {
            0
        } else {
            u64::from(value) * 1000 * u64::from(volt_upper_bound) / u64::from(value_upper_bound)
        };
        // whole volts are at most 65535 * 255
        self.write_dec((millivolts / 1000) as u32)?.write_char('.')?;
        let fraction = millivolts % 1000;
        for divisor in [100, 10, 1] {
            self.write_char(char::from(b'0' + (fraction / divisor % 10) as u8))?;
        }
        self.write_char('V')
    }

    /// Draw a horizontal bar across row 1, `percent` (capped at 100) of the width, and blank row 2.
    /// Leaves the cursor at the start of row 2.
    pub fn draw_bar(&mut self, percent: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let segments = u16::from(percent.min(100)) * u16::from(COLUMNS) / 100;
        self.line1()?;
        for _ in 0..segments {
            self.write_char(BAR_SEGMENT)?;
        }
        while self.cursor.position() < COLUMNS {
            self.write_char(' ')?;
        }
        self.erase(2)
    }

    /// Blank row `line` (1 or 2, clamped) and put the cursor back where it was.
    pub fn erase(&mut self, line: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        let saved = self.cursor;
        self.goto(line, 1)?;
        for _ in 0..COLUMNS {
            self.write_char(' ')?;
        }
        self.cursor = saved;
        self.update_cursor()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use crate::sim::ready_display;
    use crate::DisplayConfig;
    use std::vec::Vec;

    fn text(bytes: Vec<u8>) -> std::string::String {
        bytes.into_iter().map(char::from).collect()
    }

    #[test]
    fn test_hex_output() {
        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_hex_nibble(0x1A).unwrap();
        lcd.write_hex_byte(0x3C).unwrap();
        lcd.write_hex_word(0x00F1).unwrap();
        assert_eq!(text(lcd.bus().data_writes()), "a3c00f1");

        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_hex(0).unwrap().write_char(' ').unwrap();
        lcd.write_hex(0x00F1).unwrap().write_char(' ').unwrap();
        lcd.write_hex(0xBEEF).unwrap();
        assert_eq!(text(lcd.bus().data_writes()), "0 f1 beef");

        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_hex32(0x00C0_FFEE).unwrap();
        assert_eq!(text(lcd.bus().data_writes()), "0x00c0ffee");
    }

    #[test]
    fn test_decimal_output() {
        let mut lcd = ready_display(DisplayConfig::new());
        for value in [0, 7, 10, 65_535] {
            lcd.write_dec(value).unwrap().write_char(',').unwrap();
        }
        assert_eq!(text(lcd.bus().data_writes()), "0,7,10,65535,");

        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_dec(u32::MAX).unwrap();
        assert_eq!(text(lcd.bus().data_writes()), "4294967295");
    }

    #[test]
    fn test_voltage_output() {
        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_voltage(512, 1023, 5).unwrap();
        assert_eq!(lcd.bus().row_text(1), "2.502V          ");

        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_voltage(1023, 1023, 5).unwrap().write_char(' ').unwrap();
        lcd.write_voltage(3, 0, 5).unwrap();
        assert_eq!(lcd.bus().row_text(1), "5.000V 0.000V   ");

        // more than 65.535 V does not overflow
        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_voltage(4095, 4095, 200).unwrap();
        assert_eq!(lcd.bus().row_text(1), "200.000V        ");

        // 16-bit ADC at full scale
        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_voltage(65_535, 65_535, 100).unwrap();
        assert_eq!(lcd.bus().row_text(1), "100.000V        ");

        let mut lcd = ready_display(DisplayConfig::new());
        lcd.write_voltage(65_535, 1, 255).unwrap();
        assert_eq!(lcd.bus().row_text(1), "16711425.000V   ");
    }

    #[test]
    fn test_draw_bar() {
        let mut lcd = ready_display(DisplayConfig::new());
        lcd.print("old\ntext").unwrap();
        lcd.draw_bar(50).unwrap();
        let row = lcd.bus().row(1);
        assert_eq!(row[..8], [0xFF; 8]);
        assert_eq!(row[8..], [b' '; 8]);
        assert_eq!(lcd.bus().row_text(2), "                ");
        assert_eq!(lcd.cursor().position(), 16);

        lcd.draw_bar(250).unwrap();
        assert_eq!(lcd.bus().row(1), [0xFF; 16]);

        lcd.draw_bar(0).unwrap();
        assert_eq!(lcd.bus().row_text(1), "                ");
    }

    #[test]
    fn test_erase_restores_cursor() {
        let mut lcd = ready_display(DisplayConfig::new());
        lcd.print("first\nsecond").unwrap();
        lcd.goto(1, 6).unwrap();
        lcd.bus().clear_log();

        lcd.erase(1).unwrap();
        assert_eq!(lcd.bus().row_text(1), "                ");
        assert_eq!(lcd.bus().row_text(2), "second          ");
        assert_eq!(lcd.cursor().position(), 5);
        assert_eq!(lcd.bus().commands().last(), Some(&0x85));

        // out of range rows are clamped to row 2
        lcd.erase(9).unwrap();
        assert_eq!(lcd.bus().row_text(2), "                ");
        assert_eq!(lcd.bus().address(), 0x05);
    }
}
