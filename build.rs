use std::env;

fn main() {
    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");
    println!("cargo:rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        // Configure for ATmega128A
        println!("cargo:rustc-link-arg=-mmcu=atmega128a");
        println!("cargo:warning=Building for ATmega128A at 16MHz");
    } else if env::var("PROFILE").map(|p| p == "release").unwrap_or(false) {
        // Host builds only run the simulation bench
        println!("cargo:warning=Not an AVR target, firmware binary runs the simulation bench");
    }
}
