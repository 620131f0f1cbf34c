//! Header & Block Parser, header portion (spec §4.1): signature, Logical
//! Screen Descriptor, and the Global Color Table.

use crate::color::Palette;
use crate::error::{DecodeError, Result};
use crate::gif_reader::ByteSource;
use crate::options::DecodeOptions;

use log::debug;

/// The Logical Screen Descriptor plus whatever Global Color Table
/// followed it. Immutable once parsed (spec §3 LogicalScreen).
#[derive(Debug)]
pub struct LogicalScreen {
    pub width: u16,
    pub height: u16,
    pub color_resolution_bits: u8,
    pub is_table_sorted: bool,
    pub background_color_index: u8,
    pub pixel_aspect_ratio: u8,
    pub global_palette: Option<Palette>,
}

/// Read the 6-byte signature, fail unless it's `GIF87a`/`GIF89a`.
fn read_signature(src: &mut dyn ByteSource) -> Result<()> {
    let mut sig = [0u8; 6];
    src.read_exact(&mut sig)?;
    if &sig[0..3] != b"GIF" {
        return Err(DecodeError::BadMagic);
    }
    let version: [u8; 3] = [sig[3], sig[4], sig[5]];
    if &version != b"87a" && &version != b"89a" {
        return Err(DecodeError::BadVersion(version));
    }
    Ok(())
}

/// Parse the header and Global Color Table (spec §4.1).
pub fn parse_header(src: &mut dyn ByteSource, options: &DecodeOptions) -> Result<LogicalScreen> {
    read_signature(src)?;

    let width = src.read_u16_le()?;
    let height = src.read_u16_le()?;
    if width as u32 > options.max_dimension || height as u32 > options.max_dimension {
        return Err(DecodeError::TooLarge {
            width: width as u32,
            height: height as u32,
            limit: options.max_dimension,
        });
    }

    let flags = src.read_u8()?;
    let has_global_color_table = flags & 0x80 != 0;
    let color_resolution_bits = ((flags & 0x70) >> 4) + 1;
    let is_table_sorted = flags & 0x08 != 0;
    let num_entries: usize = 1 << ((flags & 0x07) + 1);

    let background_color_index = src.read_u8()?;
    let pixel_aspect_ratio = src.read_u8()?;

    let global_palette = if has_global_color_table {
        Some(Palette::read(src, num_entries, None)?)
    } else {
        None
    };

    debug!(
        "parsed logical screen {}x{} (global palette: {})",
        width,
        height,
        global_palette.is_some()
    );

    Ok(LogicalScreen {
        width,
        height,
        color_resolution_bits,
        is_table_sorted,
        background_color_index,
        pixel_aspect_ratio,
        global_palette,
    })
}
