use avr_device::atmega128a::USART0;
use core::convert::Infallible;
use embedded_hal::serial::Write;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

// Baud rate divisor, normal speed: f / (16 * baud) - 1 (103 for 9600 at 16MHz)
const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

// UCSR0A
const UDRE: u8 = 1 << 5;
// UCSR0B
const TXEN: u8 = 1 << 3;
// UCSR0C: asynchronous, 8 data bits, no parity, 1 stop bit
const FRAME_8N1: u8 = 0x06;

/// Transmit-only USART0, polled.
pub struct Uart {
    usart: USART0,
}

impl Uart {
    pub fn new(usart: USART0) -> Self {
        unsafe {
            // Set baud rate
            usart.ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
            usart.ubrr0l.write(|w| w.bits(UBRR as u8));
            usart.ucsr0c.write(|w| w.bits(FRAME_8N1));
            usart.ucsr0b.write(|w| w.bits(TXEN));
        }
        Self { usart }
    }

    fn data_register_empty(&self) -> bool {
        self.usart.ucsr0a.read().bits() & UDRE != 0
    }

    pub fn release(self) -> USART0 {
        unsafe {
            self.usart.ucsr0b.write(|w| w.bits(0));
        }
        self.usart
    }
}

impl Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if !self.data_register_empty() {
            return Err(nb::Error::WouldBlock);
        }
        unsafe {
            self.usart.udr0.write(|w| w.bits(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.data_register_empty() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}
