//! Frame Composer (spec §4.7): the `current`/`background` canvases and the
//! per-frame `history` mask, plus the disposal rule that turns the
//! previous frame's Graphic Control into the next frame's starting
//! canvas.

use log::trace;

use crate::extensions::Disposal;

/// A `width * height * 4` RGBA bytemap that persists across frames.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, pixels: vec![0u8; width * height * 4] }
    }

    #[inline]
    pub fn get_pixel(&self, pixel_index: usize) -> [u8; 4] {
        let o = pixel_index * 4;
        [self.pixels[o], self.pixels[o + 1], self.pixels[o + 2], self.pixels[o + 3]]
    }

    #[inline]
    pub fn set_pixel(&mut self, pixel_index: usize, color: [u8; 4]) {
        let o = pixel_index * 4;
        self.pixels[o..o + 4].copy_from_slice(&color);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    pub fn copy_from(&mut self, other: &Canvas) {
        self.pixels.copy_from_slice(&other.pixels);
    }

    /// First-frame background fill (spec §4.4): every pixel the frame's
    /// LZW decode didn't touch gets the background palette color.
    pub fn fill_background_where_unwritten(&mut self, history: &HistoryMask, color: [u8; 4]) {
        for i in 0..(self.width * self.height) {
            if !history.is_written(i) {
                self.set_pixel(i, color);
            }
        }
    }
}

/// Per-frame write mask (spec's `HistoryMask`): byte `i` is nonzero iff
/// pixel `i` was written by the current frame's LZW decode.
#[derive(Debug, Clone)]
pub struct HistoryMask {
    data: Vec<u8>,
}

impl HistoryMask {
    pub fn new(width: usize, height: usize) -> Self {
        HistoryMask { data: vec![0u8; width * height] }
    }

    #[inline]
    pub fn mark(&mut self, pixel_index: usize) {
        self.data[pixel_index] = 1;
    }

    #[inline]
    pub fn is_written(&self, pixel_index: usize) -> bool {
        self.data[pixel_index] != 0
    }

    pub fn reset(&mut self) {
        for b in self.data.iter_mut() {
            *b = 0;
        }
    }

    pub fn written_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.data.iter().enumerate().filter(|(_, &b)| b != 0).map(|(i, _)| i)
    }
}

/// Apply the disposal recorded by the previous frame's Graphic Control to
/// `current`, turning it into the canvas the next Image Descriptor will
/// decode onto (spec §4.7). `two_back`, when present, is the RGBA slice
/// of the output buffer two completed frames before this one.
pub fn apply_disposal(
    disposal: Disposal,
    current: &mut Canvas,
    background: &Canvas,
    history: &HistoryMask,
    two_back: Option<&[u8]>,
) {
    trace!("applying disposal {:?} (two_back available: {})", disposal, two_back.is_some());
    match disposal {
        Disposal::None | Disposal::DoNotDispose => {}
        Disposal::RestoreBackground => {
            for i in history.written_indices() {
                let color = background.get_pixel(i);
                current.set_pixel(i, color);
            }
        }
        Disposal::RestorePrevious => match two_back {
            Some(buf) => {
                for i in history.written_indices() {
                    let o = i * 4;
                    current.set_pixel(i, [buf[o], buf[o + 1], buf[o + 2], buf[o + 3]]);
                }
            }
            None => {
                trace!("disposal 3 requested without a two-back frame, falling back to disposal 2");
                for i in history.written_indices() {
                    let color = background.get_pixel(i);
                    current.set_pixel(i, color);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_background_reverts_written_pixels_only() {
        let mut current = Canvas::new(2, 1);
        let mut background = Canvas::new(2, 1);
        background.set_pixel(0, [9, 9, 9, 255]);
        background.set_pixel(1, [8, 8, 8, 255]);
        current.set_pixel(0, [1, 2, 3, 255]);
        current.set_pixel(1, [4, 5, 6, 255]);

        let mut history = HistoryMask::new(2, 1);
        history.mark(0);

        apply_disposal(Disposal::RestoreBackground, &mut current, &background, &history, None);
        assert_eq!(current.get_pixel(0), [9, 9, 9, 255]);
        assert_eq!(current.get_pixel(1), [4, 5, 6, 255]);
    }

    #[test]
    fn restore_previous_falls_back_to_background_without_two_back() {
        let mut current = Canvas::new(1, 1);
        let mut background = Canvas::new(1, 1);
        background.set_pixel(0, [7, 7, 7, 255]);
        current.set_pixel(0, [1, 1, 1, 255]);

        let mut history = HistoryMask::new(1, 1);
        history.mark(0);

        apply_disposal(Disposal::RestorePrevious, &mut current, &background, &history, None);
        assert_eq!(current.get_pixel(0), [7, 7, 7, 255]);
    }

    #[test]
    fn restore_previous_uses_two_back_when_available() {
        let mut current = Canvas::new(1, 1);
        let background = Canvas::new(1, 1);
        current.set_pixel(0, [1, 1, 1, 255]);
        let two_back = [42u8, 43, 44, 255];

        let mut history = HistoryMask::new(1, 1);
        history.mark(0);

        apply_disposal(Disposal::RestorePrevious, &mut current, &background, &history, Some(&two_back));
        assert_eq!(current.get_pixel(0), [42, 43, 44, 255]);
    }

    #[test]
    fn do_not_dispose_leaves_current_untouched() {
        let mut current = Canvas::new(1, 1);
        let background = Canvas::new(1, 1);
        current.set_pixel(0, [5, 6, 7, 255]);
        let history = HistoryMask::new(1, 1);
        apply_disposal(Disposal::DoNotDispose, &mut current, &background, &history, None);
        assert_eq!(current.get_pixel(0), [5, 6, 7, 255]);
    }
}
