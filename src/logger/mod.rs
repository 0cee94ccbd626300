//! Leveled log lines on the serial console
//!
//! Log lines share the UART with the measurement reports, so every line is
//! tagged to keep the two apart on the host side.

use ufmt::{uDisplay, uWrite};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Debug => "[DBG] ",
            Level::Info => "[INF] ",
            Level::Warn => "[WRN] ",
            Level::Error => "[ERR] ",
        }
    }
}

pub struct Logger {
    min_level: Level,
}

impl Logger {
    pub const fn new(min_level: Level) -> Self {
        Self { min_level }
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    pub fn log<W>(&self, w: &mut W, level: Level, msg: &str) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        if !self.enabled(level) {
            return Ok(());
        }
        w.write_str(level.tag())?;
        w.write_str(msg)?;
        w.write_str("\r\n")
    }

    /// Log `msg: value`
    pub fn log_value<W, V>(&self, w: &mut W, level: Level, msg: &str, value: V) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
        V: uDisplay,
    {
        if !self.enabled(level) {
            return Ok(());
        }
        ufmt::uwrite!(w, "{}{}: {}\r\n", level.tag(), msg, value)
    }

    pub fn debug<W: uWrite + ?Sized>(&self, w: &mut W, msg: &str) -> Result<(), W::Error> {
        self.log(w, Level::Debug, msg)
    }

    pub fn info<W: uWrite + ?Sized>(&self, w: &mut W, msg: &str) -> Result<(), W::Error> {
        self.log(w, Level::Info, msg)
    }

    pub fn warn<W: uWrite + ?Sized>(&self, w: &mut W, msg: &str) -> Result<(), W::Error> {
        self.log(w, Level::Warn, msg)
    }

    pub fn error<W: uWrite + ?Sized>(&self, w: &mut W, msg: &str) -> Result<(), W::Error> {
        self.log(w, Level::Error, msg)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(crate::config::LOG_LEVEL)
    }
}
