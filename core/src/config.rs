//! Launcher configuration: typed options, their text encoding and the
//! derived color palette.

extern crate alloc;

use core::fmt::Write;

use alloc::string::String;
use embedded_graphics::pixelcolor::{Rgb565, raw::RawU16};
use embedded_graphics::prelude::{IntoStorage, RgbColor};
use log::{debug, warn};

pub const VOLUME_MAX: u8 = 10;
pub const TIMEZONE_MIN: i8 = -12;
pub const TIMEZONE_MAX: i8 = 14;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub ui_sound: bool,
    pub volume: u8,
    pub ui_color: Rgb565,
    pub bg_color: Rgb565,
    /// Whole hours added to UTC.
    pub timezone: i8,
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub sync_clock: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui_sound: true,
            volume: 2,
            ui_color: Rgb565::from(RawU16::new(0xCFFB)),
            bg_color: Rgb565::from(RawU16::new(0x1145)),
            timezone: 0,
            wifi_ssid: String::new(),
            wifi_pass: String::new(),
            sync_clock: true,
        }
    }
}

impl Config {
    /// Parses `key=value` lines. Each key that is missing or malformed keeps
    /// its default; unknown keys, blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("Ignoring config line without '=': {}", line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            let applied = match key {
                "ui_sound" => parse_bool(value).map(|v| config.ui_sound = v),
                "volume" => value
                    .parse::<u8>()
                    .ok()
                    .filter(|v| *v <= VOLUME_MAX)
                    .map(|v| config.volume = v),
                "ui_color" => parse_color(value).map(|v| config.ui_color = v),
                "bg_color" => parse_color(value).map(|v| config.bg_color = v),
                "timezone" => value
                    .parse::<i8>()
                    .ok()
                    .filter(|v| (TIMEZONE_MIN..=TIMEZONE_MAX).contains(v))
                    .map(|v| config.timezone = v),
                "wifi_ssid" => {
                    config.wifi_ssid = String::from(value);
                    Some(())
                }
                "wifi_pass" => {
                    config.wifi_pass = String::from(value);
                    Some(())
                }
                "sync_clock" => parse_bool(value).map(|v| config.sync_clock = v),
                _ => {
                    debug!("Ignoring unknown config key {}", key);
                    Some(())
                }
            };
            if applied.is_none() {
                warn!("Bad value for {}: {:?}, using default", key, value);
            }
        }
        config
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "ui_sound={}\nvolume={}\nui_color={}\nbg_color={}\ntimezone={}\nwifi_ssid={}\nwifi_pass={}\nsync_clock={}\n",
            self.ui_sound,
            self.volume,
            self.ui_color.into_storage(),
            self.bg_color.into_storage(),
            self.timezone,
            self.wifi_ssid,
            self.wifi_pass,
            self.sync_clock,
        );
        out
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_color(value: &str) -> Option<Rgb565> {
    value.parse::<u16>().ok().map(|raw| Rgb565::from(RawU16::new(raw)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable,
    Write,
}

/// Persistent key-value storage backing [`Config`].
pub trait ConfigStore {
    /// Stored text, or `None` when nothing has been saved yet.
    fn load(&mut self) -> Option<String>;
    fn save(&mut self, text: &str) -> Result<(), StoreError>;
}

/// The live configuration plus a record of whether it changed since load.
#[derive(Clone, Debug)]
pub struct Settings {
    config: Config,
    dirty: bool,
}

impl Settings {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dirty: false,
        }
    }

    pub fn load<S: ConfigStore>(store: &mut S) -> Self {
        let config = match store.load() {
            Some(text) => Config::parse(&text),
            None => {
                debug!("No stored config, using defaults");
                Config::default()
            }
        };
        Self::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn ui_sound(&self) -> bool {
        self.config.ui_sound
    }

    /// Flips the sound flag and returns the new value.
    pub fn toggle_ui_sound(&mut self) -> bool {
        self.update(|config| config.ui_sound = !config.ui_sound);
        self.config.ui_sound
    }

    /// Applies `change` and marks the settings dirty. A change that ends up
    /// restoring the loaded value still counts.
    pub fn update(&mut self, change: impl FnOnce(&mut Config)) {
        change(&mut self.config);
        self.dirty = true;
    }

    pub fn palette(&self) -> Palette {
        Palette::new(self.config.ui_color, self.config.bg_color)
    }

    /// Writes the configuration once if it changed. Returns whether a write
    /// happened.
    pub fn commit<S: ConfigStore>(&mut self, store: &mut S) -> bool {
        if !self.dirty {
            return false;
        }
        match store.save(&self.config.serialize()) {
            Ok(()) => {
                self.dirty = false;
                true
            }
            Err(err) => {
                warn!("Could not save config: {:?}", err);
                false
            }
        }
    }
}

/// UI colors derived from the configured accent and background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb565; 6],
}

impl Palette {
    pub const RED: Rgb565 = Rgb565::new(31, 10, 8);
    pub const GREEN: Rgb565 = Rgb565::new(8, 58, 8);

    /// Index 0 is the shadow tone, 1 the background, 2..=4 blend from the
    /// background toward the accent and 5 is the accent itself.
    pub fn new(ui: Rgb565, bg: Rgb565) -> Self {
        Self {
            colors: [
                blend(bg, Rgb565::BLACK, 2, 4),
                bg,
                blend(bg, ui, 1, 4),
                blend(bg, ui, 2, 4),
                blend(bg, ui, 3, 4),
                ui,
            ],
        }
    }

    /// Panics when `index > 5`.
    pub fn get(&self, index: usize) -> Rgb565 {
        self.colors[index]
    }

    pub fn shadow(&self) -> Rgb565 {
        self.colors[0]
    }

    pub fn bg(&self) -> Rgb565 {
        self.colors[1]
    }

    pub fn ui(&self) -> Rgb565 {
        self.colors[5]
    }
}

/// Linear per-channel mix, `num/den` of the way from `from` to `to`.
fn blend(from: Rgb565, to: Rgb565, num: i32, den: i32) -> Rgb565 {
    let mix = |a: u8, b: u8| -> u8 {
        let (a, b) = (i32::from(a), i32::from(b));
        (a + (b - a) * num / den) as u8
    };
    Rgb565::new(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::platform::mock::EventLog;

    #[derive(Default)]
    pub struct MemStore {
        pub text: Option<String>,
        pub saves: usize,
        pub fail: bool,
        pub log: EventLog,
    }

    impl ConfigStore for MemStore {
        fn load(&mut self) -> Option<String> {
            self.text.clone()
        }

        fn save(&mut self, text: &str) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Write);
            }
            self.saves += 1;
            self.log.push("config.save");
            self.text = Some(String::from(text));
            Ok(())
        }
    }
}
