use std::thread;
use std::time::{Duration, Instant};

use hydra_core::audio::{Beeper, Chord};
use hydra_core::platform::System;
use log::info;

/// A battery reading that lands in the top bar of the gauge.
const HOST_BATTERY_MICROVOLTS: u32 = 2_000_000;

pub struct HostSystem {
    boot: Instant,
}

impl HostSystem {
    pub fn new() -> Self {
        Self { boot: Instant::now() }
    }
}

impl Default for HostSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HostSystem {
    fn uptime_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }

    fn battery_microvolts(&mut self) -> u32 {
        HOST_BATTERY_MICROVOLTS
    }

    fn sleep_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn reset(&mut self) -> ! {
        info!("Reset requested, exiting so the next boot can pick up the handoff");
        std::process::exit(0)
    }
}

/// Logs chimes instead of driving a buzzer.
pub struct LogBeeper;

impl Beeper for LogBeeper {
    fn play(&mut self, steps: &[Chord], step_ms: u32, volume: u8) {
        let notes: Vec<String> = steps.iter().map(|chord| chord.join("+")).collect();
        info!("Chime [{}] {} ms/step at volume {}", notes.join(" "), step_ms, volume);
    }
}

/// Blocking delay for the clock sync thread.
pub struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
