//! Hardware SPI master
//!
//! Only the full-duplex byte primitive is implemented here; the blocking
//! `Transfer` used by the ADC driver comes from embedded-hal's default impl.

use avr_device::atmega128a::SPI;
use core::convert::Infallible;
use embedded_hal::spi::FullDuplex;

use super::gpio::board;

// SPCR bits
const SPE: u8 = 1 << 6;
const MSTR: u8 = 1 << 4;
const CPOL: u8 = 1 << 3;
const CPHA: u8 = 1 << 2;
// SPSR bits
const SPIF: u8 = 1 << 7;

/// SPI clock prescaler options
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum SpiPrescaler {
    Div4 = 0,
    Div16 = 1,
    Div64 = 2,
    Div128 = 3,
}

/// SPI mode configurations
#[derive(Clone, Copy)]
pub enum SpiMode {
    Mode0, // CPOL=0, CPHA=0
    Mode1, // CPOL=0, CPHA=1
    Mode2, // CPOL=1, CPHA=0
    Mode3, // CPOL=1, CPHA=1
}

impl SpiMode {
    fn bits(self) -> u8 {
        match self {
            SpiMode::Mode0 => 0,
            SpiMode::Mode1 => CPHA,
            SpiMode::Mode2 => CPOL,
            SpiMode::Mode3 => CPOL | CPHA,
        }
    }
}

/// SPI peripheral in master mode, MSB first.
pub struct Spi {
    spi: SPI,
    _sck: board::Sck,
    _mosi: board::Mosi,
}

impl Spi {
    /// SCK and MOSI must already be outputs or the peripheral drives nothing.
    pub fn new(
        spi: SPI,
        sck: board::Sck,
        mosi: board::Mosi,
        mode: SpiMode,
        prescaler: SpiPrescaler,
    ) -> Self {
        unsafe {
            spi.spcr
                .write(|w| w.bits(SPE | MSTR | mode.bits() | prescaler as u8));
        }
        Self {
            spi,
            _sck: sck,
            _mosi: mosi,
        }
    }

    pub fn release(self) -> (SPI, board::Sck, board::Mosi) {
        unsafe {
            self.spi.spcr.write(|w| w.bits(0));
        }
        (self.spi, self._sck, self._mosi)
    }
}

impl FullDuplex<u8> for Spi {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.spi.spsr.read().bits() & SPIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.spi.spdr.read().bits())
    }

    fn send(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        unsafe {
            self.spi.spdr.write(|w| w.bits(byte));
        }
        Ok(())
    }
}

impl embedded_hal::blocking::spi::transfer::Default<u8> for Spi {}
impl embedded_hal::blocking::spi::write::Default<u8> for Spi {}

