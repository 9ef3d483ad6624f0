//! The set of device collaborators the launcher drives.

use crate::{
    audio::Beeper,
    clock::Rtc,
    config::ConfigStore,
    display::Display,
    fs::{Filesystem, RemovableFilesystem},
    handoff::HandoffRegion,
    input::Keyboard,
};

/// Timing, power and reset services of the board.
pub trait System {
    fn uptime_ms(&self) -> u64;
    /// Battery voltage as seen by the ADC, in microvolts.
    fn battery_microvolts(&mut self) -> u32;
    fn sleep_ms(&mut self, ms: u32);
    /// Restarts the device. Memory outside the handoff region is lost.
    fn reset(&mut self) -> !;
}

/// Binds concrete collaborator types for one target.
pub trait Platform {
    type Flash: Filesystem;
    type Card: RemovableFilesystem;
    type Display: Display;
    type Keyboard: Keyboard;
    type Beeper: Beeper;
    type Store: ConfigStore;
    type Handoff: HandoffRegion;
    type Rtc: Rtc;
    type System: System;
}

/// Owns every collaborator for the lifetime of the launcher.
pub struct Devices<P: Platform> {
    pub flash: P::Flash,
    pub card: P::Card,
    pub display: P::Display,
    pub keyboard: P::Keyboard,
    pub beeper: P::Beeper,
    pub store: P::Store,
    pub handoff: P::Handoff,
    pub rtc: P::Rtc,
    pub system: P::System,
}
