//! Animation Driver (spec §4.7 latter half, §6): the public decode entry
//! points. Repeatedly dispatches blocks until the Trailer, composing
//! frames via the Frame Composer and accumulating the output buffer and
//! delay array.

use std::io::Read;

use log::{debug, trace, warn};

use crate::color::Palette;
use crate::compositor::{apply_disposal, Canvas, HistoryMask};
use crate::convert::{flip_vertical_per_frame, to_channels};
use crate::error::{DecodeError, Result};
use crate::extensions::{drain_sub_block_chain, parse_graphic_control, Disposal, GraphicControl};
use crate::gif_reader::{ByteSource, ReaderSource, SliceSource};
use crate::header::parse_header;
use crate::lzw::LzwDecoder;
use crate::options::DecodeOptions;
use crate::raster::RasterCursor;

const IMAGE_DESCRIPTOR: u8 = 0x2C;
const EXTENSION_INTRODUCER: u8 = 0x21;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const TRAILER: u8 = 0x3B;

/// The decoded result: `layers` equally-sized frames of `channels` bytes
/// per pixel, concatenated row-major, plus one delay (milliseconds) per
/// frame. Dropped normally on scope exit -- there is no explicit free
/// function, unlike the distilled spec's C heritage.
#[derive(Debug, Clone)]
pub struct DecodedAnimation {
    pub width: u32,
    pub height: u32,
    pub layers: usize,
    pub channels: u8,
    pub pixels: Vec<u8>,
    pub delays: Vec<i32>,
}

/// Decode a complete in-memory GIF87a/GIF89a byte stream.
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedAnimation> {
    let mut src = SliceSource::new(bytes);
    run(&mut src, options)
}

/// Decode a GIF stream read incrementally from any `std::io::Read`.
pub fn decode_reader<R: Read>(reader: R, options: &DecodeOptions) -> Result<DecodedAnimation> {
    let mut src = ReaderSource::new(reader);
    run(&mut src, options)
}

fn run(src: &mut dyn ByteSource, options: &DecodeOptions) -> Result<DecodedAnimation> {
    let screen = parse_header(src, options)?;
    let width = screen.width as usize;
    let height = screen.height as usize;
    let stride = width * height * 4;

    let background_color = match &screen.global_palette {
        Some(palette) if screen.background_color_index > 0 => {
            let mut palette = palette.clone();
            palette.force_opaque(screen.background_color_index);
            Some(palette.get(screen.background_color_index))
        }
        _ => None,
    };

    let mut current = Canvas::new(width, height);
    let mut background = Canvas::new(width, height);
    let mut history = HistoryMask::new(width, height);

    let mut pixels: Vec<u8> = Vec::new();
    let mut delays: Vec<i32> = Vec::new();

    // GCE parsed for the upcoming Image Descriptor; consumed (set back to
    // `None`) the moment that descriptor is decoded (spec: "applies to
    // the next Image Descriptor only").
    let mut pending_gce: Option<GraphicControl> = None;
    // Disposal recorded by the frame most recently composed, applied
    // before the *next* frame starts decoding.
    let mut prev_disposal = Disposal::None;
    let mut first_frame = true;

    loop {
        match src.read_u8()? {
            IMAGE_DESCRIPTOR => {
                if !first_frame {
                    let two_back = if delays.len() >= 2 {
                        let offset = (delays.len() - 2) * stride;
                        Some(&pixels[offset..offset + stride])
                    } else {
                        None
                    };
                    apply_disposal(prev_disposal, &mut current, &background, &history, two_back);
                    // `background` is the canvas as it enters this frame, i.e.
                    // before this frame's own LZW paint -- snapshot it here,
                    // not after decoding, or a disposal-2 chain three frames
                    // deep restores to the wrong pixels.
                    background.copy_from(&current);
                }
                history.reset();

                decode_image_descriptor(
                    src,
                    &screen.global_palette,
                    &mut current,
                    &mut history,
                    width,
                    height,
                    pending_gce,
                )?;

                if first_frame {
                    if let Some(color) = background_color {
                        current.fill_background_where_unwritten(&history, color);
                    }
                    first_frame = false;
                }

                pixels.extend_from_slice(current.as_slice());

                let delay_cs = pending_gce.map(|g| g.delay_centiseconds).unwrap_or(0);
                delays.push(delay_cs as i32 * 10);

                prev_disposal = pending_gce.map(|g| g.disposal).unwrap_or(Disposal::None);
                pending_gce = None;

                trace!("composed frame {} ({} bytes)", delays.len(), stride);
            }
            TRAILER => {
                debug!("trailer reached after {} frame(s)", delays.len());
                break;
            }
            EXTENSION_INTRODUCER => {
                let label = src.read_u8()?;
                if label == GRAPHIC_CONTROL_LABEL {
                    trace!("graphic control extension");
                    pending_gce = parse_graphic_control(src)?;
                } else {
                    trace!("draining extension {:#04x} sub-block chain", label);
                    drain_sub_block_chain(src)?;
                }
            }
            other => {
                warn!("unrecognized block introducer {:#04x}", other);
                return Err(DecodeError::UnknownBlock(other));
            }
        }
    }

    let layers = delays.len();
    let (channels, mut pixels) = if options.requested_channels == 0 || options.requested_channels == 4 {
        (4u8, pixels)
    } else {
        let converted = to_channels(&pixels, options.requested_channels, width, layers * height);
        (options.requested_channels, converted)
    };

    if options.flip_vertical {
        flip_vertical_per_frame(&mut pixels, width, height, layers, channels as usize);
    }

    Ok(DecodedAnimation {
        width: screen.width as u32,
        height: screen.height as u32,
        layers,
        channels,
        pixels,
        delays,
    })
}

/// Image Descriptor handler (spec §4.4): reads the sub-rectangle and
/// local palette, then drives the LZW decoder through a `RasterCursor`
/// onto `canvas`/`history`.
fn decode_image_descriptor(
    src: &mut dyn ByteSource,
    global_palette: &Option<Palette>,
    canvas: &mut Canvas,
    history: &mut HistoryMask,
    screen_width: usize,
    screen_height: usize,
    gce: Option<GraphicControl>,
) -> Result<()> {
    let left = src.read_u16_le()?;
    let top = src.read_u16_le()?;
    let block_width = src.read_u16_le()?;
    let block_height = src.read_u16_le()?;

    if left as usize + block_width as usize > screen_width || top as usize + block_height as usize > screen_height {
        return Err(DecodeError::BadImageRect {
            left,
            top,
            width: block_width,
            height: block_height,
            screen_width: screen_width as u16,
            screen_height: screen_height as u16,
        });
    }

    let flags = src.read_u8()?;
    let has_local_palette = flags & 0x80 != 0;
    let interlaced = flags & 0x40 != 0;
    let num_entries: usize = 1 << ((flags & 0x07) + 1);

    let transparent_index = gce.and_then(|g| g.transparent_index);

    let local_palette = if has_local_palette {
        Some(Palette::read(src, num_entries, transparent_index)?)
    } else {
        None
    };

    let palette = match local_palette {
        Some(p) => p,
        None => {
            let base = global_palette.as_ref().ok_or(DecodeError::NoPalette)?;
            let mut p = base.clone();
            if transparent_index.is_some() {
                p.set_transparent(transparent_index);
            }
            p
        }
    };

    let lzw_cs = src.read_u8()?;
    let mut decoder = LzwDecoder::new(lzw_cs);
    let mut cursor = RasterCursor::new(left, top, block_width, block_height, screen_width as u16, interlaced);

    decoder.decode(src, |index| {
        cursor.emit(index, &palette, canvas, history);
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_frame_red_green() {
        let bytes: &[u8] = &[
            b'G', b'I', b'F', b'8', b'9', b'a', //
            0x02, 0x00, 0x02, 0x00, //
            0x80, 0x00, 0x00, //
            0xFF, 0x00, 0x00, // red
            0x00, 0xFF, 0x00, // green
            IMAGE_DESCRIPTOR, //
            0x00, 0x00, 0x00, 0x00, // left, top
            0x02, 0x00, 0x02, 0x00, // width, height
            0x00, // flags
            0x02, // lzw min code size
            0x03, 0x04, 0x12, 0x05, // sub-block: clear,0,0,1,1,end
            0x00, // terminator
            TRAILER,
        ];
        let options = DecodeOptions::default();
        let anim = decode(bytes, &options).unwrap();
        assert_eq!(anim.layers, 1);
        assert_eq!(anim.delays, vec![0]);
        assert_eq!(
            anim.pixels,
            vec![255, 0, 0, 255, 255, 0, 0, 255, 0, 255, 0, 255, 0, 255, 0, 255]
        );
    }
}
