//! Cross-reset handoff: leave the target path in memory that survives a
//! reset, bring the peripherals down and restart into the bootstrap.

use heapless::String;
use log::{error, info, warn};

use crate::{
    audio::{self, Beeper},
    config::Settings,
    display::Display,
    fs::RemovableFilesystem,
    platform::{Devices, Platform, System},
};

/// Bytes available in the reset-persistent region.
pub const HANDOFF_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffError {
    PathTooLong,
    Empty,
    /// The persistent region could not be written or cleared.
    Region,
}

/// Path of the program the bootstrap should start next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandoffRecord {
    path: String<HANDOFF_CAPACITY>,
}

impl HandoffRecord {
    pub fn new(path: &str) -> Result<Self, HandoffError> {
        if path.is_empty() {
            return Err(HandoffError::Empty);
        }
        let mut stored = String::new();
        stored
            .push_str(path)
            .map_err(|_| HandoffError::PathTooLong)?;
        Ok(Self { path: stored })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Reset-persistent storage for one [`HandoffRecord`]. An empty region means
/// "start the launcher".
pub trait HandoffRegion {
    fn write(&mut self, record: &HandoffRecord) -> Result<(), HandoffError>;
    fn read(&mut self) -> Option<HandoffRecord>;
    fn clear(&mut self) -> Result<(), HandoffError>;
}

/// Flushes config, blanks the display, then releases the card.
pub fn quiesce<P: Platform>(devices: &mut Devices<P>, settings: &mut Settings) {
    settings.commit(&mut devices.store);
    devices.display.sleep();
    if devices.card.is_mounted()
        && let Err(err) = devices.card.release()
    {
        warn!("Could not release card before reset: {:?}", err);
    }
}

/// Quiesces, records `record` and resets the device. Does not return.
pub fn launch<P: Platform>(devices: &mut Devices<P>, settings: &mut Settings, record: &HandoffRecord) -> ! {
    quiesce(devices, settings);
    let config = settings.config();
    audio::chime(&mut devices.beeper, audio::LAUNCH, config.ui_sound, config.volume);

    match devices.handoff.write(record) {
        Ok(()) => info!("Handing off to {}", record.path()),
        // The bootstrap finds an empty region and starts the launcher again.
        Err(err) => error!("Could not record handoff to {}: {:?}", record.path(), err),
    }
    devices.system.reset()
}
