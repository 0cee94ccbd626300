#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega128a::{Peripherals, TC0, TC2};

    use phase_meter::config;
    use phase_meter::drivers::{Lcd, Mcp3008, SerialConsole};
    use phase_meter::hal::spi::{SpiMode, SpiPrescaler};
    use phase_meter::hal::{board, Delay, Spi, Uart};
    use phase_meter::logger::Logger;

    type Display = Lcd<
        board::LcdRs,
        board::LcdEn,
        board::LcdD4,
        board::LcdD5,
        board::LcdD6,
        board::LcdD7,
        Delay<TC2>,
    >;
    type Adc = Mcp3008<Spi, board::AdcCs>;
    type Console = SerialConsole<Uart>;

    #[avr_device::entry]
    fn main() -> ! {
        // Only fails if taken twice
        let Some(dp) = Peripherals::take() else {
            loop {}
        };

        let logger = Logger::default();
        let mut console = SerialConsole::new(Uart::new(dp.USART0));

        let mut lcd = unsafe {
            Lcd::new(
                board::LcdRs::steal().into_output(),
                board::LcdEn::steal().into_output(),
                board::LcdD4::steal().into_output(),
                board::LcdD5::steal().into_output(),
                board::LcdD6::steal().into_output(),
                board::LcdD7::steal().into_output(),
                Delay::<TC2>::new(dp.TC2),
            )
        };
        lcd.init().ok();

        let (sck, mosi, cs) = unsafe {
            board::Miso::steal().into_floating_input();
            (
                board::Sck::steal().into_output(),
                board::Mosi::steal().into_output(),
                board::AdcCs::steal().into_output(),
            )
        };
        let spi = Spi::new(dp.SPI, sck, mosi, SpiMode::Mode0, SpiPrescaler::Div16);
        let Ok(adc) = Mcp3008::new(spi, cs) else {
            logger.error(&mut console, "adc init failed").ok();
            loop {}
        };

        logger.info(&mut console, "Phase meter v0.1.0").ok();

        #[cfg(not(feature = "thermometer"))]
        run_phase_meter(dp.TC1, dp.TC0, adc, console, lcd, logger);

        #[cfg(feature = "thermometer")]
        run_thermometer(dp.TC0, adc, console, lcd, logger);
    }

    #[cfg(not(feature = "thermometer"))]
    fn run_phase_meter(
        tc1: avr_device::atmega128a::TC1,
        tc0: TC0,
        adc: Adc,
        mut console: Console,
        mut lcd: Display,
        logger: Logger,
    ) -> ! {
        use phase_meter::hal::Timer1;
        use phase_meter::{MeterConfig, PhaseMeter};

        let (reference, test) = unsafe {
            (
                board::RefSignal::steal().into_floating_input(),
                board::TestSignal::steal().into_floating_input(),
            )
        };
        let mut meter = PhaseMeter::new(
            reference,
            test,
            Timer1::new(tc1),
            adc,
            Delay::<TC0>::new(tc0),
            MeterConfig::default(),
        );

        loop {
            meter.step(&mut console, &mut lcd, &logger);
            meter.pause_ms(config::LOOP_PAUSE_MS);
        }
    }

    #[cfg(feature = "thermometer")]
    fn run_thermometer(
        tc0: TC0,
        adc: Adc,
        mut console: Console,
        mut lcd: Display,
        logger: Logger,
    ) -> ! {
        use embedded_hal::blocking::delay::DelayMs;
        use phase_meter::{Thermometer, ThermometerConfig};

        let mut delay = Delay::<TC0>::new(tc0);
        let mut thermometer = Thermometer::new(adc, ThermometerConfig::default());

        loop {
            thermometer.step(&mut console, &mut lcd, &logger);
            delay.delay_ms(config::LOOP_PAUSE_MS);
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    bench::run();
}

/// Host build: the same control loops on the simulation bench, reports on stdout.
#[cfg(not(target_arch = "avr"))]
mod bench {
    use std::convert::Infallible;
    use std::io::Write;

    use phase_meter::config::{MeterConfig, ThermometerConfig};
    use phase_meter::drivers::TextDisplay;
    use phase_meter::logger::{Level, Logger};
    use phase_meter::testing::{SimAdc, SimClock, SimDelay, SimSignal, SimTimer, Waveform};
    use phase_meter::{PhaseMeter, Thermometer};
    use ufmt::uWrite;

    // 50 Hz at 2 MHz timer ticks
    const PERIOD_TICKS: u64 = 40_000;
    const POLL_STEP_TICKS: u64 = 4;

    struct Stdout(std::io::Stdout);

    impl uWrite for Stdout {
        type Error = std::io::Error;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.0.write_all(s.as_bytes())
        }
    }

    /// Draws the two LCD lines as a framed box.
    struct BoxDisplay;

    impl TextDisplay for BoxDisplay {
        type Error = Infallible;

        fn display_line(&mut self, text: &str, line: u8, pad: bool) -> Result<(), Self::Error> {
            if pad {
                println!("  LCD{} |{:<16}|", line, text);
            } else {
                println!("  LCD{} |{}", line, text);
            }
            Ok(())
        }
    }

    pub fn run() {
        let mut out = Stdout(std::io::stdout());
        let mut lcd = BoxDisplay;
        let logger = Logger::new(Level::Debug);

        logger.info(&mut out, "simulation bench, 50 Hz reference").ok();

        // Test signal lagging by 45 and 90 degrees, then leading by 90
        for lag in [PERIOD_TICKS / 8, PERIOD_TICKS / 4, 3 * PERIOD_TICKS / 4] {
            let clock = SimClock::new(POLL_STEP_TICKS);
            let config = MeterConfig::default();
            let mut meter = PhaseMeter::new(
                SimSignal::new(&clock, Waveform::square(PERIOD_TICKS)),
                SimSignal::new(&clock, Waveform::lagging(PERIOD_TICKS, lag)),
                SimTimer::new(&clock),
                SimAdc::new([512, 250, 0, 0, 0, 0, 0, 0]),
                SimDelay::new(&clock, config.timebase),
                config,
            );
            meter.step(&mut out, &mut lcd, &logger);
        }

        logger.info(&mut out, "thermometer").ok();
        for code in [640, 745, 790] {
            let mut thermometer = Thermometer::new(
                SimAdc::new([code, 0, 0, 0, 0, 0, 0, 0]),
                ThermometerConfig::default(),
            );
            thermometer.step(&mut out, &mut lcd, &logger);
        }
    }
}
