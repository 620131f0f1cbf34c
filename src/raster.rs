//! Raster Writer (spec §4.6): places decoded palette indices into an
//! Image Descriptor's sub-rectangle on the composition canvas, in
//! row-major order with optional 4-pass GIF interlacing.

use crate::color::Palette;
use crate::compositor::{Canvas, HistoryMask};

/// Walks one image block's sub-rectangle, converting each incoming
/// palette index into a canvas write plus a history mark. Coordinates
/// are plain pixel `(x, y)` pairs, not the byte-premultiplied offsets of
/// the original C source.
pub struct RasterCursor {
    start_x: usize,
    start_y: usize,
    max_x: usize,
    max_y: usize,
    step: usize,
    parse: i8,
    cur_x: usize,
    cur_y: usize,
    screen_width: usize,
}

impl RasterCursor {
    pub fn new(left: u16, top: u16, width: u16, height: u16, screen_width: u16, interlaced: bool) -> Self {
        let start_x = left as usize;
        let start_y = top as usize;
        let max_x = start_x + width as usize;
        let max_y = start_y + height as usize;
        let (step, parse) = if interlaced { (8, 3) } else { (1, 0) };

        let cur_y = if width == 0 { max_y } else { start_y };

        RasterCursor {
            start_x,
            start_y,
            max_x,
            max_y,
            step,
            parse,
            cur_x: start_x,
            cur_y,
            screen_width: screen_width as usize,
        }
    }

    /// True once every row in the sub-rectangle (all interlace passes)
    /// has been written, or there was never anything to write.
    pub fn finished(&self) -> bool {
        self.cur_y >= self.max_y
    }

    /// Place one decoded palette index at the cursor and advance it.
    /// Writes past `max_y` are dropped silently (over-tall rasters
    /// truncate rather than error, per spec §4.6/§7).
    pub fn emit(&mut self, index: u8, palette: &Palette, canvas: &mut Canvas, history: &mut HistoryMask) {
        if self.cur_y >= self.max_y {
            return;
        }

        let pixel = self.cur_y * self.screen_width + self.cur_x;
        history.mark(pixel);

        let color = palette.get(index);
        if color[3] > 128 {
            canvas.set_pixel(pixel, color);
        }

        self.cur_x += 1;
        if self.cur_x >= self.max_x {
            self.cur_x = self.start_x;
            self.cur_y += self.step;
            while self.cur_y >= self.max_y && self.parse > 0 {
                self.step = 1usize << self.parse;
                self.cur_y = self.start_y + (self.step >> 1);
                self.parse -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;

    fn opaque_palette() -> Palette {
        let bytes: Vec<u8> = (0..4u8).flat_map(|i| [i, i, i]).collect();
        let mut src = crate::gif_reader::SliceSource::new(&bytes);
        Palette::read(&mut src, 4, None).unwrap()
    }

    #[test]
    fn writes_row_major_without_interlace() {
        let palette = opaque_palette();
        let mut canvas = Canvas::new(2, 2);
        let mut history = HistoryMask::new(2, 2);
        let mut cursor = RasterCursor::new(0, 0, 2, 2, 2, false);
        for idx in [0u8, 0, 1, 1] {
            cursor.emit(idx, &palette, &mut canvas, &mut history);
        }
        assert!(cursor.finished());
        assert_eq!(canvas.get_pixel(0), [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(1), [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(2), [1, 1, 1, 255]);
        assert_eq!(canvas.get_pixel(3), [1, 1, 1, 255]);
    }

    #[test]
    fn zero_width_block_never_writes() {
        let palette = opaque_palette();
        let mut canvas = Canvas::new(2, 2);
        let mut history = HistoryMask::new(2, 2);
        let mut cursor = RasterCursor::new(0, 0, 0, 2, 2, false);
        assert!(cursor.finished());
        cursor.emit(2, &palette, &mut canvas, &mut history);
        assert_eq!(canvas.as_slice(), vec![0u8; 16].as_slice());
    }

    #[test]
    fn interlaced_height_one_never_enters_further_passes() {
        let palette = opaque_palette();
        let mut canvas = Canvas::new(1, 1);
        let mut history = HistoryMask::new(1, 1);
        let mut cursor = RasterCursor::new(0, 0, 1, 1, 1, true);
        cursor.emit(3, &palette, &mut canvas, &mut history);
        assert!(cursor.finished());
        assert_eq!(canvas.get_pixel(0), [3, 3, 3, 255]);
    }

    #[test]
    fn transparent_pixel_skips_write_but_marks_history() {
        let mut src = crate::gif_reader::SliceSource::new(&[10u8, 20, 30]);
        let palette = Palette::read(&mut src, 1, Some(0)).unwrap();
        let mut canvas = Canvas::new(1, 1);
        canvas.set_pixel(0, [99, 99, 99, 255]);
        let mut history = HistoryMask::new(1, 1);
        let mut cursor = RasterCursor::new(0, 0, 1, 1, 1, false);
        cursor.emit(0, &palette, &mut canvas, &mut history);
        assert_eq!(canvas.get_pixel(0), [99, 99, 99, 255]);
        assert!(history.is_written(0));
    }
}
