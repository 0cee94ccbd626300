//! External ADC driver (MCP3008, 8 channels, 10 bits)

use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;

use super::AnalogInput;

const START_BIT: u8 = 0x01;
const SINGLE_ENDED: u8 = 0x80;
const CHANNEL_COUNT: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mcp3008Error<SE, PE> {
    Spi(SE),
    ChipSelect(PE),
    InvalidChannel(u8),
}

pub struct Mcp3008<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS, SE, PE> Mcp3008<SPI, CS>
where
    SPI: Transfer<u8, Error = SE>,
    CS: OutputPin<Error = PE>,
{
    /// The chip is deselected on creation.
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, Mcp3008Error<SE, PE>> {
        cs.set_high().map_err(Mcp3008Error::ChipSelect)?;
        Ok(Self { spi, cs })
    }

    /// Single-ended conversion on `channel` (0..=7).
    pub fn read(&mut self, channel: u8) -> Result<u16, Mcp3008Error<SE, PE>> {
        if channel >= CHANNEL_COUNT {
            return Err(Mcp3008Error::InvalidChannel(channel));
        }

        let mut frame = command_frame(channel);
        self.cs.set_low().map_err(Mcp3008Error::ChipSelect)?;
        let result = self.spi.transfer(&mut frame).map(decode_reply);
        // Deselect even when the transfer failed
        self.cs.set_high().map_err(Mcp3008Error::ChipSelect)?;

        result.map_err(Mcp3008Error::Spi)
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS, SE, PE> AnalogInput for Mcp3008<SPI, CS>
where
    SPI: Transfer<u8, Error = SE>,
    CS: OutputPin<Error = PE>,
{
    type Error = Mcp3008Error<SE, PE>;

    fn read_channel(&mut self, channel: u8) -> Result<u16, Self::Error> {
        self.read(channel)
    }
}

/// Start bit, then single-ended mode and channel select, then a dummy byte
/// to clock out the low half of the result.
fn command_frame(channel: u8) -> [u8; 3] {
    [START_BIT, SINGLE_ENDED | (channel << 4), 0x00]
}

/// The top two result bits arrive in the second byte, the rest in the third.
fn decode_reply(reply: &[u8]) -> u16 {
    match reply {
        [_, high, low, ..] => (u16::from(high & 0x03) << 8) | u16::from(*low),
        _ => 0,
    }
}
