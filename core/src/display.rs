use crate::framebuffer::{Region, RegionBuffer};

/// Pixel sink for region buffers.
pub trait Display {
    /// Pushes `buffer` to the screen rows covered by `region`.
    fn show(&mut self, region: Region, buffer: &RegionBuffer);
    /// Blanks the panel and turns the backlight off.
    fn sleep(&mut self);
}
