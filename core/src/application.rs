use log::{info, warn};

use crate::{
    animation::AnimationEngine,
    audio,
    catalog::{self, Catalog},
    clock::{Rtc, WallClock, battery_level},
    clock_sync::{ClockSyncChannel, ClockSyncOutcome},
    config::Settings,
    display::Display,
    framebuffer::{DisplayBuffers, Region},
    handoff::{self, HandoffRecord},
    input::{KeyState, Keyboard},
    platform::{Devices, Platform, System},
    render::{self, IconContent},
    selection::{Direction, Event, Outcome, Phase, SelectionState},
};

/// Pause between ticks; bounds CPU use, not a synchronisation point.
pub const TICK_SLEEP_MS: u32 = 1;

/// Result of one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Continue,
    /// Terminal: hand the device to this program.
    Launch(HandoffRecord),
}

pub struct Launcher<'a, P: Platform> {
    devices: Devices<P>,
    buffers: DisplayBuffers,
    catalog: Catalog,
    selection: SelectionState,
    animation: AnimationEngine,
    keys: KeyState,
    settings: Settings,
    clock: WallClock,
    minute_drawn: Option<u8>,
    force_redraw: bool,
    clock_sync: &'a ClockSyncChannel,
}

impl<'a, P: Platform> Launcher<'a, P> {
    /// Loads settings, scans the catalog, plays the startup chime and seeds
    /// the clock from the RTC when it survived a reset. The first tick draws
    /// every region.
    pub fn new(mut devices: Devices<P>, clock_sync: &'a ClockSyncChannel) -> Self {
        let settings = Settings::load(&mut devices.store);
        let catalog = catalog::scan(&mut devices.flash, &mut devices.card);
        let config = settings.config();
        audio::chime(&mut devices.beeper, audio::STARTUP, config.ui_sound, config.volume);
        info!("Launcher ready with {} entries", catalog.len());

        let mut clock = WallClock::new();
        if let Some(unix_secs) = devices.rtc.now_unix_secs() {
            clock.set(unix_secs, devices.system.uptime_ms());
            info!("Clock restored from RTC: {}", unix_secs);
        }

        Self {
            devices,
            buffers: DisplayBuffers::new(),
            catalog,
            selection: SelectionState::new(),
            animation: AnimationEngine::new(),
            keys: KeyState::default(),
            settings,
            clock,
            minute_drawn: None,
            force_redraw: true,
            clock_sync,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    pub fn buffers(&self) -> &DisplayBuffers {
        &self.buffers
    }

    pub fn devices(&self) -> &Devices<P> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices<P> {
        &mut self.devices
    }

    /// Runs ticks until one asks for a handoff, then performs it.
    pub fn run(mut self) -> ! {
        loop {
            if let Tick::Launch(record) = self.tick() {
                self.launch(&record);
            }
            self.devices.system.sleep_ms(TICK_SLEEP_MS);
        }
    }

    pub fn launch(&mut self, record: &HandoffRecord) -> ! {
        handoff::launch(&mut self.devices, &mut self.settings, record)
    }

    /// One pass of input, state, clock-sync intake, animation and render.
    pub fn tick(&mut self) -> Tick {
        self.keys.update(self.devices.keyboard.held_keys());
        for event in self.keys.events() {
            if let Some(record) = self.apply(event) {
                return Tick::Launch(record);
            }
        }
        self.take_clock_sync();
        self.render();
        Tick::Continue
    }

    /// Applies one event. Returns a record when the event launches a program.
    pub fn apply(&mut self, event: Event) -> Option<HandoffRecord> {
        let (sound, volume) = (self.settings.ui_sound(), self.settings.config().volume);
        match self.selection.handle(event, &self.catalog) {
            Outcome::Ignored => {}
            Outcome::Moved(direction) => {
                self.animation.start(direction);
                let sequence = match direction {
                    Direction::Forward => audio::NEXT,
                    Direction::Backward => audio::PREVIOUS,
                };
                audio::chime(&mut self.devices.beeper, sequence, sound, volume);
            }
            Outcome::Jumped(direction) => {
                if let Some(direction) = direction {
                    self.animation.start(direction);
                }
                audio::chime(&mut self.devices.beeper, audio::JUMP, sound, volume);
            }
            Outcome::ToggleSound => {
                let on = self.settings.toggle_ui_sound();
                info!("UI sound {}", if on { "on" } else { "off" });
                audio::chime(&mut self.devices.beeper, audio::UNMUTE, on, volume);
                self.force_redraw = true;
            }
            Outcome::Reload => {
                self.catalog = catalog::scan(&mut self.devices.flash, &mut self.devices.card);
                self.selection.reset();
                self.force_redraw = true;
                audio::chime(&mut self.devices.beeper, audio::RELOAD, sound, volume);
            }
            Outcome::Launch(path) => match HandoffRecord::new(&path) {
                Ok(record) => return Some(record),
                Err(err) => warn!("Cannot hand off to {:?}: {:?}", path, err),
            },
        }
        None
    }

    fn take_clock_sync(&mut self) {
        match self.clock_sync.try_take() {
            Some(ClockSyncOutcome::Synced(unix_secs)) => {
                self.clock.set(unix_secs, self.devices.system.uptime_ms());
                self.devices.rtc.set_unix_secs(unix_secs);
                self.minute_drawn = None;
                info!("Clock synced to {}", unix_secs);
            }
            Some(outcome) => info!("Clock left unset: {:?}", outcome),
            None => {}
        }
    }

    fn render(&mut self) {
        let force = self.force_redraw;
        let palette = self.settings.palette();
        let index = self.selection.current_index();
        let frame = self.animation.step(force);

        if let Some(text) = frame.text {
            let label = self.catalog.label(index);
            let previous = self.catalog.label(self.selection.previous_index());
            let buffer = self.buffers.get_mut(Region::Label);
            render::draw_label(buffer, text, label, previous, &palette);
            self.devices.display.show(Region::Label, buffer);
        }

        if let (Some(icon), Some(item)) = (frame.icon, self.catalog.item(index)) {
            let content = IconContent::for_item(item, self.settings.ui_sound());
            let buffer = self.buffers.get_mut(Region::Icon);
            render::draw_icon(buffer, icon, content, &palette);
            self.devices.display.show(Region::Icon, buffer);
        }

        let (hour, minute) = self
            .clock
            .local_time(self.devices.system.uptime_ms(), self.settings.config().timezone);
        if force || self.minute_drawn != Some(minute) {
            self.minute_drawn = Some(minute);
            let level = battery_level(self.devices.system.battery_microvolts());
            let buffer = self.buffers.get_mut(Region::StatusBar);
            render::draw_status_bar(buffer, &palette, hour, minute, level);
            self.devices.display.show(Region::StatusBar, buffer);
        }

        if force || self.selection.index_changed() {
            let buffer = self.buffers.get_mut(Region::Scrollbar);
            render::draw_scrollbar(buffer, &palette, index, self.catalog.len());
            self.devices.display.show(Region::Scrollbar, buffer);
        }

        if self.selection.phase() == Phase::Transitioning && self.animation.is_idle() {
            self.selection.settle();
        }
        self.force_redraw = false;
        self.selection.end_frame();
        self.animation.end_frame();
    }
}
