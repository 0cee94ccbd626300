//! Phase and frequency meter for two periodic signals
//!
//! The measurement core is written against `embedded-hal` traits and runs
//! unchanged on the ATmega128A board and on the host simulation bench.

#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fmt;
pub mod hal;
pub mod logger;
pub mod measure;
pub mod reading;
pub mod report;
pub mod testing;
pub mod thermometer;

pub use application::{PhaseMeter, Thermometer};
pub use config::{MeterConfig, ThermometerConfig};
pub use error::{CycleError, Invalid, MeasureError};
pub use reading::Snapshot;
