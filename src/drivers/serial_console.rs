use embedded_hal::serial::Write;
use ufmt::uWrite;

/// Blocking text console on top of a serial port.
pub struct SerialConsole<S> {
    serial: S,
}

impl<S: Write<u8>> SerialConsole<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), S::Error> {
        nb::block!(self.serial.write(byte))
    }

    pub fn release(self) -> S {
        self.serial
    }
}

impl<S: Write<u8>> uWrite for SerialConsole<S> {
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::serial::{Mock, Transaction};

    #[test]
    fn bytes_go_out_in_order() {
        let serial = Mock::new(&[Transaction::write_many(b"Ready\r\n")]);
        let mut console = SerialConsole::new(serial);
        console.write_str("Ready").unwrap();
        console.write_byte(b'\r').unwrap();
        console.write_byte(b'\n').unwrap();
        console.release().done();
    }

    #[test]
    fn formatted_output() {
        let serial = Mock::new(&[Transaction::write_many(b"ch 3\r\n")]);
        let mut console = SerialConsole::new(serial);
        ufmt::uwrite!(console, "ch {}\r\n", 3u8).unwrap();
        console.release().done();
    }
}
