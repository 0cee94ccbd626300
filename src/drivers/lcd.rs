//! HD44780 character LCD in 4-bit mode (write only, R/W tied to ground)

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::OutputPin;

use super::TextDisplay;
use crate::config::CHARS_PER_LINE;

// Sent while the controller may still be in 8-bit mode, then switch
const INIT_8BIT: u8 = 0x33;
const INIT_4BIT: u8 = 0x32;
const FUNCTION_4BIT_2LINE: u8 = 0x28;
const DISPLAY_ON_CURSOR_OFF: u8 = 0x0C;
const CLEAR_DISPLAY: u8 = 0x01;
const LINE1_ADDRESS: u8 = 0x80;
const LINE2_ADDRESS: u8 = 0xC0;

const ENABLE_PULSE_US: u16 = 40;
const COMMAND_SETTLE_MS: u16 = 5;
const DATA_SETTLE_MS: u16 = 2;
const POWER_UP_MS: u16 = 20;

pub struct Lcd<RS, EN, D4, D5, D6, D7, DELAY> {
    rs: RS,
    en: EN,
    d4: D4,
    d5: D5,
    d6: D6,
    d7: D7,
    delay: DELAY,
}

impl<RS, EN, D4, D5, D6, D7, DELAY, E> Lcd<RS, EN, D4, D5, D6, D7, DELAY>
where
    RS: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D4: OutputPin<Error = E>,
    D5: OutputPin<Error = E>,
    D6: OutputPin<Error = E>,
    D7: OutputPin<Error = E>,
    DELAY: DelayUs<u16> + DelayMs<u16>,
{
    pub fn new(rs: RS, en: EN, d4: D4, d5: D5, d6: D6, d7: D7, delay: DELAY) -> Self {
        Self {
            rs,
            en,
            d4,
            d5,
            d6,
            d7,
            delay,
        }
    }

    /// Fixed power-up sequence: force 8-bit mode twice, switch to 4-bit,
    /// two lines, display on, clear.
    pub fn init(&mut self) -> Result<(), E> {
        self.en.set_low()?;
        self.delay.delay_ms(POWER_UP_MS);

        self.command(INIT_8BIT)?;
        self.command(INIT_8BIT)?;
        self.command(INIT_4BIT)?;

        self.command(FUNCTION_4BIT_2LINE)?;
        self.command(DISPLAY_ON_CURSOR_OFF)?;
        self.command(CLEAR_DISPLAY)?;
        self.delay.delay_ms(POWER_UP_MS);
        Ok(())
    }

    pub fn command(&mut self, byte: u8) -> Result<(), E> {
        self.rs.set_low()?;
        self.write_byte(byte)?;
        self.delay.delay_ms(COMMAND_SETTLE_MS);
        Ok(())
    }

    pub fn data(&mut self, byte: u8) -> Result<(), E> {
        self.rs.set_high()?;
        self.write_byte(byte)?;
        self.delay.delay_ms(DATA_SETTLE_MS);
        Ok(())
    }

    /// Write `text` on line 1 or 2, cut at the display width. With `pad`,
    /// the rest of the line is blanked.
    pub fn print_line(&mut self, text: &str, line: u8, pad: bool) -> Result<(), E> {
        self.command(if line == 2 { LINE2_ADDRESS } else { LINE1_ADDRESS })?;
        self.delay.delay_ms(COMMAND_SETTLE_MS);

        let mut written = 0;
        for byte in text.bytes().take(CHARS_PER_LINE) {
            self.data(byte)?;
            written += 1;
        }
        if pad {
            for _ in written..CHARS_PER_LINE {
                self.data(b' ')?;
            }
        }
        Ok(())
    }

    pub fn release(self) -> (RS, EN, D4, D5, D6, D7, DELAY) {
        (self.rs, self.en, self.d4, self.d5, self.d6, self.d7, self.delay)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), E> {
        self.write_nibble(byte >> 4)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.write_nibble(byte & 0x0F)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), E> {
        set_level(&mut self.d7, nibble & 0x08 != 0)?;
        set_level(&mut self.d6, nibble & 0x04 != 0)?;
        set_level(&mut self.d5, nibble & 0x02 != 0)?;
        set_level(&mut self.d4, nibble & 0x01 != 0)?;
        self.pulse()
    }

    fn pulse(&mut self) -> Result<(), E> {
        self.en.set_high()?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.en.set_low()
    }
}

impl<RS, EN, D4, D5, D6, D7, DELAY, E> TextDisplay for Lcd<RS, EN, D4, D5, D6, D7, DELAY>
where
    RS: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D4: OutputPin<Error = E>,
    D5: OutputPin<Error = E>,
    D6: OutputPin<Error = E>,
    D7: OutputPin<Error = E>,
    DELAY: DelayUs<u16> + DelayMs<u16>,
{
    type Error = E;

    fn display_line(&mut self, text: &str, line: u8, pad: bool) -> Result<(), Self::Error> {
        self.print_line(text, line, pad)
    }
}

#[inline]
fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}
