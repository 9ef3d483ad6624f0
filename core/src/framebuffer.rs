extern crate alloc;

use alloc::{vec, vec::Vec};
use embedded_graphics::{
    Pixel,
    pixelcolor::Rgb565,
    prelude::{DrawTarget, OriginDimensions, Point, RgbColor, Size},
    primitives::Rectangle,
};

pub const WIDTH: u32 = 240;
pub const HEIGHT: u32 = 135;

/// Horizontal bands of the screen, each backed by its own buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    StatusBar,
    Icon,
    Label,
    Scrollbar,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::StatusBar, Region::Icon, Region::Label, Region::Scrollbar];

    /// Screen rows covered by this region.
    pub const fn bounds(self) -> Rectangle {
        let (y, height) = match self {
            Region::StatusBar => (0, 35),
            Region::Icon => (35, 38),
            Region::Label => (73, 39),
            Region::Scrollbar => (112, 23),
        };
        Rectangle::new(Point::new(0, y), Size::new(WIDTH, height))
    }

    const fn index(self) -> usize {
        match self {
            Region::StatusBar => 0,
            Region::Icon => 1,
            Region::Label => 2,
            Region::Scrollbar => 3,
        }
    }
}

/// Full-width RGB565 buffer for one region, addressed in region-local
/// coordinates.
pub struct RegionBuffer {
    pixels: Vec<Rgb565>,
    height: u32,
}

impl RegionBuffer {
    pub fn new(height: u32) -> Self {
        Self {
            pixels: vec![Rgb565::BLACK; (WIDTH * height) as usize],
            height,
        }
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color;
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= WIDTH || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * WIDTH as usize + x as usize)
    }

    pub fn fill(&mut self, color: Rgb565) {
        self.pixels.fill(color);
    }

    /// Fills `rect`, clipped to the buffer.
    pub fn fill_rect(&mut self, rect: Rectangle, color: Rgb565) {
        let area = rect.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return;
        };
        for y in area.top_left.y..=bottom_right.y {
            let row = y as usize * WIDTH as usize;
            let start = row + area.top_left.x as usize;
            let end = row + bottom_right.x as usize + 1;
            self.pixels[start..end].fill(color);
        }
    }

    /// Shifts the content `dx` pixels right (left when negative). Columns
    /// uncovered by the shift keep their old pixels.
    pub fn scroll(&mut self, dx: i32) {
        let width = WIDTH as usize;
        let shift = dx.unsigned_abs() as usize;
        if dx == 0 || shift >= width {
            return;
        }
        for row in self.pixels.chunks_exact_mut(width) {
            if dx > 0 {
                row.copy_within(0..width - shift, shift);
            } else {
                row.copy_within(shift..width, 0);
            }
        }
    }

    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size())
    }
}

impl OriginDimensions for RegionBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, self.height)
    }
}

impl DrawTarget for RegionBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

/// The four region buffers.
pub struct DisplayBuffers {
    regions: [RegionBuffer; 4],
}

impl Default for DisplayBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffers {
    pub fn new() -> Self {
        Self {
            regions: Region::ALL.map(|region| RegionBuffer::new(region.bounds().size.height)),
        }
    }

    pub fn get(&self, region: Region) -> &RegionBuffer {
        &self.regions[region.index()]
    }

    pub fn get_mut(&mut self, region: Region) -> &mut RegionBuffer {
        &mut self.regions[region.index()]
    }
}
