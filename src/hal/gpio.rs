use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// Pin `P` of `PORT`, typed by direction.
#[derive(Debug)]
pub struct Pin<PORT, const P: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8, MODE> Pin<PORT, P, MODE> {
    const MASK: u8 = 1 << P;

    fn retype<NEW>(self) -> Pin<PORT, P, NEW> {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $port:ident, $ddr:ident, $pin:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            /// Handle to the pin without touching its registers. The caller
            /// guarantees no other handle to the same pin exists and
            /// configures the direction with `into_*` before use.
            pub unsafe fn steal() -> Self {
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                // Set DDRx bit
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | Self::MASK));
                }
                self.retype()
            }

            /// Input with the pull-up disabled, for externally driven signals.
            pub fn into_floating_input(self) -> Pin<$PORT, P, Input> {
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !Self::MASK));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !Self::MASK));
                }
                self.retype()
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Self::Error> {
                Ok(unsafe { (*$PORT::ptr()).$pin.read().bits() } & Self::MASK != 0)
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Self::Error> {
                self.is_high().map(|high| !high)
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Self::Error> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | Self::MASK));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Self::Error> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !Self::MASK));
                }
                Ok(())
            }
        }
    };
}

// Implement for all ATmega128 ports
impl_port!(PORTA, porta, ddra, pina);
impl_port!(PORTB, portb, ddrb, pinb);
impl_port!(PORTC, portc, ddrc, pinc);
impl_port!(PORTD, portd, ddrd, pind);
impl_port!(PORTE, porte, ddre, pine);
impl_port!(PORTF, portf, ddrf, pinf);

// Meter board wiring
pub mod board {
    use super::*;

    // Zero-cross comparators (PORTD)
    pub type RefSignal = Pin<PORTD, 0, Input>;
    pub type TestSignal = Pin<PORTD, 1, Input>;

    // HD44780 in 4-bit mode (PORTC)
    pub type LcdRs = Pin<PORTC, 0, Output>;
    pub type LcdEn = Pin<PORTC, 1, Output>;
    pub type LcdD4 = Pin<PORTC, 4, Output>;
    pub type LcdD5 = Pin<PORTC, 5, Output>;
    pub type LcdD6 = Pin<PORTC, 6, Output>;
    pub type LcdD7 = Pin<PORTC, 7, Output>;

    // SPI bus and MCP3008 chip select (PORTB)
    pub type AdcCs = Pin<PORTB, 0, Output>;
    pub type Sck = Pin<PORTB, 1, Output>;
    pub type Mosi = Pin<PORTB, 2, Output>;
    pub type Miso = Pin<PORTB, 3, Input>;
}
