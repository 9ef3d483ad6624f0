use std::path::PathBuf;
use std::thread;

use embassy_sync::signal::Signal;
use hydra_core::{
    application::{Launcher, TICK_SLEEP_MS, Tick},
    clock_sync::{self, ClockSyncChannel},
    framebuffer::{HEIGHT, WIDTH},
    handoff::HandoffRegion,
    platform::{Devices, Platform, System},
};
use log::{info, warn};

use crate::display::{HostWindow, MinifbDisplay, MinifbKeyboard};
use crate::network::SntpLink;
use crate::storage::{FileHandoff, FileRtc, FileStore, HostCard, HostDir};
use crate::system::{HostSystem, LogBeeper, StdDelay};

mod display;
mod network;
mod storage;
mod system;

static CLOCK_SYNC: ClockSyncChannel = Signal::new();

struct DesktopPlatform;

impl Platform for DesktopPlatform {
    type Flash = HostDir;
    type Card = HostCard;
    type Display = MinifbDisplay;
    type Keyboard = MinifbKeyboard;
    type Beeper = LogBeeper;
    type Store = FileStore;
    type Handoff = FileHandoff;
    type Rtc = FileRtc;
    type System = HostSystem;
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let flash_dir = PathBuf::from(args.next().unwrap_or_else(|| "flash".to_string()));
    let card_dir = PathBuf::from(args.next().unwrap_or_else(|| "sd".to_string()));
    if let Err(e) = std::fs::create_dir_all(&flash_dir) {
        panic!("Unable to create {}: {}", flash_dir.display(), e);
    }

    info!(
        "Hydra launcher started (flash {}, card {})",
        flash_dir.display(),
        card_dir.display()
    );

    // The previous session may have left a program for the bootstrap stage.
    let mut handoff = FileHandoff::new(&flash_dir);
    if let Some(record) = handoff.read() {
        info!("Bootstrap would run {} now", record.path());
        if let Err(e) = handoff.clear() {
            warn!("Could not clear handoff: {:?}", e);
        }
    }

    let mut window = minifb::Window::new(
        "Hydra Launcher",
        WIDTH as usize,
        HEIGHT as usize,
        minifb::WindowOptions {
            scale: minifb::Scale::X2,
            ..minifb::WindowOptions::default()
        },
    )
    .unwrap_or_else(|e| {
        panic!("Unable to open window: {}", e);
    });
    window.set_target_fps(60);
    let window = HostWindow::new(window);

    let devices: Devices<DesktopPlatform> = Devices {
        flash: HostDir::new(&flash_dir, hydra_core::fs::FLASH_MOUNT),
        card: HostCard::new(&card_dir),
        display: MinifbDisplay::new(window.clone()),
        keyboard: MinifbKeyboard::new(window.clone()),
        beeper: LogBeeper,
        store: FileStore::new(&flash_dir),
        handoff,
        rtc: FileRtc::new(&flash_dir),
        system: HostSystem::default(),
    };
    let mut launcher = Launcher::new(devices, &CLOCK_SYNC);

    // The sync thread owns its link and only learns whether the RTC was set.
    let config = launcher.settings().config().clone();
    let clock_set = launcher.clock().is_set();
    thread::spawn(move || {
        let mut link = SntpLink::default();
        clock_sync::run(&mut link, &mut StdDelay, &config, clock_set, &CLOCK_SYNC);
    });

    while window.borrow().is_open() {
        if let Tick::Launch(record) = launcher.tick() {
            launcher.launch(&record);
        }
        launcher.devices_mut().system.sleep_ms(TICK_SLEEP_MS);
    }
    info!("Window closed");
}
