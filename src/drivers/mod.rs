pub mod lcd;
pub mod mcp3008;
pub mod serial_console;

pub use lcd::Lcd;
pub use mcp3008::{Mcp3008, Mcp3008Error};
pub use serial_console::SerialConsole;

/// Single-shot conversions on a multi-channel ADC.
pub trait AnalogInput {
    type Error;

    /// Raw conversion result of `channel`, blocking until it is ready.
    fn read_channel(&mut self, channel: u8) -> Result<u16, Self::Error>;
}

/// Two-line character display.
pub trait TextDisplay {
    type Error;

    /// Write `text` on `line` (1 or 2). With `pad`, the rest of the line is
    /// blanked so leftovers of a longer previous line disappear.
    fn display_line(&mut self, text: &str, line: u8, pad: bool) -> Result<(), Self::Error>;
}
