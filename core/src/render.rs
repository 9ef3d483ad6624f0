//! Drawing for the four screen regions.
//!
//! The icon and label regions are redrawn incrementally while sliding: the
//! buffer is scrolled by the frame delta and only the stale rectangles are
//! cleared. A full clear happens once the slide settles at offset 0.

extern crate alloc;

use alloc::string::String;
use embedded_graphics::{
    Drawable,
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_8X13},
    pixelcolor::Rgb565,
    prelude::{Point, Primitive, Size},
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use profont::PROFONT_24_POINT;

use crate::{
    animation::{TrackFrame, VIEWPORT},
    catalog::{Action, MenuItem, Origin},
    clock::time_24_to_12,
    config::Palette,
    framebuffer::RegionBuffer,
    icons::{ICON_SIZE, Icon},
};

const LABEL_FONT: MonoFont<'static> = PROFONT_24_POINT;
const STATUS_FONT: MonoFont<'static> = FONT_8X13;

/// Labels longer than this are cropped.
pub const LABEL_MAX_CHARS: usize = 15;
const LABEL_CROP_CHARS: usize = 12;

const LABEL_Y: i32 = 7;
const LABEL_CLEAR_HEIGHT: u32 = 32;
const ICON_X: i32 = 104;
const ICON_Y: i32 = 1;

const STATUS_BAND_HEIGHT: u32 = 16;
const STATUS_SHADOW_Y: i32 = 17;
const CLOCK_ORIGIN: Point = Point::new(10, 4);
const BATTERY_ORIGIN: Point = Point::new(208, 3);

const SCROLLBAR_TRACK: u32 = 232;
const SCROLLBAR_X: i32 = 4;
const SCROLLBAR_Y: i32 = 19;
const SCROLLBAR_HEIGHT: u32 = 4;

fn char_advance(font: &MonoFont) -> i32 {
    (font.character_size.width + font.character_spacing) as i32
}

/// Left edge that centers `chars` label-font glyphs in the viewport.
pub fn center_x(chars: usize) -> i32 {
    VIEWPORT / 2 - chars as i32 * char_advance(&LABEL_FONT) / 2
}

pub fn crop_label(label: &str) -> String {
    if label.chars().count() <= LABEL_MAX_CHARS {
        return String::from(label);
    }
    let mut cropped: String = label.chars().take(LABEL_CROP_CHARS).collect();
    cropped.push_str("...");
    cropped
}

fn fill(buffer: &mut RegionBuffer, x: i32, y: i32, width: u32, height: u32, color: Rgb565) {
    buffer.fill_rect(Rectangle::new(Point::new(x, y), Size::new(width, height)), color);
}

fn text(buffer: &mut RegionBuffer, content: &str, origin: Point, font: &MonoFont, color: Rgb565) {
    let style = MonoTextStyle::new(font, color);
    let _ = Text::with_baseline(content, origin, style, Baseline::Top).draw(buffer);
}

/// Clears the columns a scroll just uncovered; they still hold stale pixels.
fn clear_exposed_strip(buffer: &mut RegionBuffer, frame: TrackFrame, y: i32, height: u32, color: Rgb565) {
    let strip = frame.delta.unsigned_abs();
    let strip_x = if frame.position > 0 { VIEWPORT - strip as i32 } else { 0 };
    fill(buffer, strip_x, y, strip, height, color);
}

/// One frame of the label slide. `previous_label` is what the last frame
/// showed and sizes the clear rectangle.
pub fn draw_label(
    buffer: &mut RegionBuffer,
    frame: TrackFrame,
    label: &str,
    previous_label: &str,
    palette: &Palette,
) {
    buffer.scroll(frame.delta);
    if !frame.redraw {
        return;
    }

    let position = frame.position;
    if position == 0 {
        buffer.fill(palette.bg());
    } else {
        let old_chars = previous_label.chars().count().min(LABEL_MAX_CHARS) as i32;
        let old_width = old_chars * char_advance(&LABEL_FONT);
        let x = VIEWPORT / 2 - old_width / 2 + position;
        fill(buffer, x, LABEL_Y, old_width as u32, LABEL_CLEAR_HEIGHT, palette.bg());
        clear_exposed_strip(buffer, frame, LABEL_Y, LABEL_CLEAR_HEIGHT, palette.bg());
    }

    let shown = crop_label(label);
    let origin = Point::new(center_x(shown.chars().count()) + position, LABEL_Y);
    text(buffer, &shown, origin, &LABEL_FONT, palette.ui());
}

/// What the icon region shows for a menu entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconContent {
    Sound(bool),
    Icon(Icon),
}

impl IconContent {
    pub fn for_item(item: MenuItem<'_>, ui_sound: bool) -> Self {
        match item {
            MenuItem::Action(Action::ToggleSound) => IconContent::Sound(ui_sound),
            MenuItem::Action(Action::Reload) => IconContent::Icon(Icon::Reload),
            MenuItem::Action(Action::OpenSettings) => IconContent::Icon(Icon::Gear),
            MenuItem::App(entry) => match entry.origin {
                Origin::Card => IconContent::Icon(Icon::SdCard),
                Origin::Flash => IconContent::Icon(Icon::Flash),
            },
        }
    }
}

/// Horizontal span, at offset 0, that covers both the icon and the
/// widest sound state text.
fn icon_box() -> (i32, u32) {
    let text_chars = "Off".len();
    let text_x = center_x(text_chars);
    let text_right = text_x + text_chars as i32 * char_advance(&LABEL_FONT);
    let left = text_x.min(ICON_X);
    let right = text_right.max(ICON_X + ICON_SIZE as i32);
    (left, (right - left) as u32)
}

fn icon_box_height() -> u32 {
    ICON_SIZE.max(LABEL_FONT.character_size.height)
}

/// One frame of the icon slide.
pub fn draw_icon(buffer: &mut RegionBuffer, frame: TrackFrame, content: IconContent, palette: &Palette) {
    buffer.scroll(frame.delta);
    if !frame.redraw {
        return;
    }

    let position = frame.position;
    if position == 0 {
        buffer.fill(palette.bg());
    } else {
        let (x, width) = icon_box();
        fill(buffer, x + position, ICON_Y, width, icon_box_height(), palette.bg());
        clear_exposed_strip(buffer, frame, ICON_Y, icon_box_height(), palette.bg());
    }

    match content {
        IconContent::Sound(on) => {
            let (word, color) = if on { ("On", palette.ui()) } else { ("Off", palette.get(3)) };
            let origin = Point::new(center_x(word.len()) + position, ICON_Y);
            text(buffer, word, origin, &LABEL_FONT, color);
        }
        IconContent::Icon(icon) => {
            let _ = icon.draw(buffer, Point::new(ICON_X + position, ICON_Y), palette.ui());
        }
    }
}

fn draw_battery(buffer: &mut RegionBuffer, origin: Point, bars: u8, outline: Rgb565, fill_color: Rgb565) {
    let body = Rectangle::new(origin, Size::new(22, 11));
    let _ = body.into_styled(PrimitiveStyle::with_stroke(outline, 1)).draw(buffer);
    fill(buffer, origin.x + 22, origin.y + 3, 2, 5, outline);
    for bar in 0..i32::from(bars) {
        fill(buffer, origin.x + 2 + bar * 6, origin.y + 2, 5, 7, fill_color);
    }
}

/// Clock on the left, battery gauge on the right.
pub fn draw_status_bar(buffer: &mut RegionBuffer, palette: &Palette, hour: u8, minute: u8, battery_level: u8) {
    buffer.fill(palette.bg());
    fill(buffer, 0, 0, VIEWPORT as u32, STATUS_BAND_HEIGHT, palette.get(2));
    fill(buffer, 0, STATUS_SHADOW_Y, VIEWPORT as u32, 1, palette.shadow());

    let (time, suffix) = time_24_to_12(hour, minute);
    let suffix_x = time.len() as i32 * char_advance(&STATUS_FONT);
    let shadow = Point::new(1, 1);
    text(buffer, &time, CLOCK_ORIGIN + shadow, &STATUS_FONT, palette.shadow());
    text(buffer, &time, CLOCK_ORIGIN, &STATUS_FONT, palette.ui());
    let suffix_origin = CLOCK_ORIGIN + Point::new(suffix_x, 0);
    text(buffer, suffix, suffix_origin + shadow, &STATUS_FONT, palette.shadow());
    text(buffer, suffix, suffix_origin, &STATUS_FONT, palette.get(4));

    draw_battery(buffer, BATTERY_ORIGIN + shadow, 3, palette.shadow(), palette.shadow());
    let color = match battery_level {
        0 => Palette::RED,
        3 => Palette::GREEN,
        _ => palette.ui(),
    };
    draw_battery(buffer, BATTERY_ORIGIN, battery_level.min(3), color, color);
}

/// Position indicator: one slot of the track per menu entry.
pub fn draw_scrollbar(buffer: &mut RegionBuffer, palette: &Palette, index: usize, len: usize) {
    buffer.fill(palette.bg());
    let len = len.max(1) as u32;
    let width = SCROLLBAR_TRACK / len;
    let x = SCROLLBAR_X + (SCROLLBAR_TRACK * index as u32 / len) as i32;
    let thumb = Rectangle::new(Point::new(x, SCROLLBAR_Y), Size::new(width, SCROLLBAR_HEIGHT));
    let _ = thumb.into_styled(PrimitiveStyle::with_fill(palette.get(4))).draw(buffer);
    let _ = thumb.into_styled(PrimitiveStyle::with_stroke(palette.get(2), 1)).draw(buffer);
}
