use std::cell::RefCell;
use std::rc::Rc;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::RgbColor;
use hydra_core::{
    display::Display,
    framebuffer::{HEIGHT, Region, RegionBuffer, WIDTH},
    input::{Key, KeySet, Keyboard},
};
use log::info;

const WIDTH_PX: usize = WIDTH as usize;
const HEIGHT_PX: usize = HEIGHT as usize;

/// The window and its composed frame, shared by display and keyboard.
pub struct HostWindow {
    window: minifb::Window,
    frame: Vec<u32>,
    dirty: bool,
}

pub type SharedWindow = Rc<RefCell<HostWindow>>;

impl HostWindow {
    pub fn new(window: minifb::Window) -> SharedWindow {
        Rc::new(RefCell::new(Self {
            window,
            frame: vec![0xFF000000; WIDTH_PX * HEIGHT_PX],
            dirty: true,
        }))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    /// Presents the frame if it changed and pumps window events.
    fn present(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.window
                .update_with_buffer(&self.frame, WIDTH_PX, HEIGHT_PX)
                .unwrap_or_else(|e| log::error!("Could not present frame: {}", e));
        } else {
            self.window.update();
        }
    }
}

fn to_argb(color: Rgb565) -> u32 {
    let color = Rgb888::from(color);
    0xFF000000 | (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b())
}

pub struct MinifbDisplay {
    window: SharedWindow,
}

impl MinifbDisplay {
    pub fn new(window: SharedWindow) -> Self {
        Self { window }
    }
}

impl Display for MinifbDisplay {
    fn show(&mut self, region: Region, buffer: &RegionBuffer) {
        let mut host = self.window.borrow_mut();
        let top = region.bounds().top_left.y as usize;
        let start = top * WIDTH_PX;
        let rows = &mut host.frame[start..start + buffer.pixels().len()];
        for (out, pixel) in rows.iter_mut().zip(buffer.pixels()) {
            *out = to_argb(*pixel);
        }
        host.dirty = true;
    }

    fn sleep(&mut self) {
        let mut host = self.window.borrow_mut();
        host.frame.fill(0xFF000000);
        host.dirty = true;
        host.present();
        info!("Display asleep, backlight off");
    }
}

/// Maps a host key to the device's logical keys.
pub fn map_key(key: minifb::Key) -> Option<Key> {
    use minifb::Key as K;
    let letter = |c: char| Some(Key::Char(c));
    match key {
        K::Right | K::Slash => Some(Key::Forward),
        K::Left | K::Comma => Some(Key::Backward),
        K::Enter => Some(Key::Enter),
        K::Space => Some(Key::Go),
        K::A => letter('a'),
        K::B => letter('b'),
        K::C => letter('c'),
        K::D => letter('d'),
        K::E => letter('e'),
        K::F => letter('f'),
        K::G => letter('g'),
        K::H => letter('h'),
        K::I => letter('i'),
        K::J => letter('j'),
        K::K => letter('k'),
        K::L => letter('l'),
        K::M => letter('m'),
        K::N => letter('n'),
        K::O => letter('o'),
        K::P => letter('p'),
        K::Q => letter('q'),
        K::R => letter('r'),
        K::S => letter('s'),
        K::T => letter('t'),
        K::U => letter('u'),
        K::V => letter('v'),
        K::W => letter('w'),
        K::X => letter('x'),
        K::Y => letter('y'),
        K::Z => letter('z'),
        K::Key0 => letter('0'),
        K::Key1 => letter('1'),
        K::Key2 => letter('2'),
        K::Key3 => letter('3'),
        K::Key4 => letter('4'),
        K::Key5 => letter('5'),
        K::Key6 => letter('6'),
        K::Key7 => letter('7'),
        K::Key8 => letter('8'),
        K::Key9 => letter('9'),
        K::Escape => None,
        _ => Some(Key::Other),
    }
}

pub struct MinifbKeyboard {
    window: SharedWindow,
}

impl MinifbKeyboard {
    pub fn new(window: SharedWindow) -> Self {
        Self { window }
    }
}

impl Keyboard for MinifbKeyboard {
    fn held_keys(&mut self) -> KeySet {
        let mut host = self.window.borrow_mut();
        host.present();
        let mut held = KeySet::new();
        for key in host.window.get_keys().into_iter().filter_map(map_key) {
            if !held.contains(&key) && held.push(key).is_err() {
                break;
            }
        }
        held
    }
}
