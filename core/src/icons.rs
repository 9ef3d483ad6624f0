use embedded_graphics::{Pixel, pixelcolor::Rgb565, prelude::{DrawTarget, Point}};

mod generated_icons {
    include!(concat!(env!("OUT_DIR"), "/icons.rs"));
}

pub use generated_icons::ICON_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Flash,
    SdCard,
    Reload,
    Gear,
}

impl Icon {
    fn mask(self) -> &'static [u8] {
        match self {
            Icon::Flash => generated_icons::ICON_FLASH_MASK,
            Icon::SdCard => generated_icons::ICON_SDCARD_MASK,
            Icon::Reload => generated_icons::ICON_RELOAD_MASK,
            Icon::Gear => generated_icons::ICON_GEAR_MASK,
        }
    }

    /// Draws the set bits of the icon mask in `color`, top-left at `origin`.
    pub fn draw<D>(self, target: &mut D, origin: Point, color: Rgb565) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let mask = self.mask();
        let size = ICON_SIZE as i32;
        let pixels = (0..size * size).filter_map(move |idx| {
            let bit = mask[idx as usize / 8] & (0x80 >> (idx % 8));
            (bit != 0).then(|| Pixel(origin + Point::new(idx % size, idx / size), color))
        });
        target.draw_iter(pixels)
    }
}
