pub mod timer;

#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod spi;
#[cfg(target_arch = "avr")]
pub mod uart;

// Re-export commonly used types
pub use timer::{OverflowCounter, OverflowTimer, TimeBase};

#[cfg(target_arch = "avr")]
pub use gpio::{board, Input, Output, Pin};
#[cfg(target_arch = "avr")]
pub use spi::Spi;
#[cfg(target_arch = "avr")]
pub use timer::{Delay, Timer1};
#[cfg(target_arch = "avr")]
pub use uart::Uart;
