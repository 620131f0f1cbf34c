//! Block/extension handling that sits beside the Image Descriptor path
//! (spec §4.1, §4.2): the Graphic Control Extension and the generic
//! sub-block drain used for every other extension label.

use crate::error::Result;
use crate::gif_reader::ByteSource;

/// GIF disposal method recorded by a Graphic Control Extension, applied
/// to the canvas when the *next* Image Descriptor begins (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    None,
    DoNotDispose,
    RestoreBackground,
    RestorePrevious,
}

impl Disposal {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Disposal::DoNotDispose,
            2 => Disposal::RestoreBackground,
            3 => Disposal::RestorePrevious,
            _ => Disposal::None,
        }
    }
}

/// A parsed `0xF9` Graphic Control Extension. Applies to the Image
/// Descriptor that immediately follows it.
#[derive(Debug, Clone, Copy)]
pub struct GraphicControl {
    pub disposal: Disposal,
    pub transparent_index: Option<u8>,
    pub delay_centiseconds: u16,
}

/// Drain a sub-block chain whose first length byte has already been read
/// as `first_len` (0 = already at the terminator).
fn drain_chain_continuing(src: &mut dyn ByteSource, mut len: usize) -> Result<()> {
    loop {
        if len == 0 {
            return Ok(());
        }
        src.skip(len as isize)?;
        len = src.read_u8()? as usize;
    }
}

/// Read a length byte, then drain the chain it starts (spec §4.1: "read
/// length byte; if 0 stop; else skip that many bytes; repeat").
pub fn drain_sub_block_chain(src: &mut dyn ByteSource) -> Result<()> {
    let len = src.read_u8()? as usize;
    drain_chain_continuing(src, len)
}

/// Parse a Graphic Control Extension body (spec §4.2). The `0x21 0xF9`
/// prefix has already been consumed by the caller. Returns `None` when
/// the block-size byte isn't 4 — a malformed GCE is drained like any
/// other extension rather than failing the whole decode.
pub fn parse_graphic_control(src: &mut dyn ByteSource) -> Result<Option<GraphicControl>> {
    let block_size = src.read_u8()? as usize;
    if block_size != 4 {
        drain_chain_continuing(src, block_size)?;
        return Ok(None);
    }

    let flags = src.read_u8()?;
    let disposal = Disposal::from_bits((flags & 0b0001_1100) >> 2);
    let has_transparency = flags & 0x01 != 0;
    let delay_centiseconds = src.read_u16_le()?;
    let transparent_index = if has_transparency {
        Some(src.read_u8()?)
    } else {
        src.skip(1)?;
        None
    };

    // Trailing zero-length sub-block terminator.
    drain_sub_block_chain(src)?;

    Ok(Some(GraphicControl {
        disposal,
        transparent_index,
        delay_centiseconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gif_reader::SliceSource;

    #[test]
    fn parses_disposal_and_transparency() {
        // block size 4, flags: disposal=2 (bits 2-4), transparency=1
        let flags = (2 << 2) | 0x01;
        let bytes: &[u8] = &[0x04, flags, 0x0A, 0x00, 0x07, 0x00];
        let mut src = SliceSource::new(bytes);
        let gce = parse_graphic_control(&mut src).unwrap().unwrap();
        assert_eq!(gce.disposal, Disposal::RestoreBackground);
        assert_eq!(gce.transparent_index, Some(7));
        assert_eq!(gce.delay_centiseconds, 10);
    }

    #[test]
    fn parses_without_transparency() {
        let flags = (1 << 2) | 0x00;
        let bytes: &[u8] = &[0x04, flags, 0x05, 0x00, 0xFF, 0x00];
        let mut src = SliceSource::new(bytes);
        let gce = parse_graphic_control(&mut src).unwrap().unwrap();
        assert_eq!(gce.disposal, Disposal::DoNotDispose);
        assert_eq!(gce.transparent_index, None);
    }

    #[test]
    fn malformed_block_size_drains_instead_of_erroring() {
        let bytes: &[u8] = &[0x02, 0xAA, 0xBB, 0x00];
        let mut src = SliceSource::new(bytes);
        assert!(parse_graphic_control(&mut src).unwrap().is_none());
        assert!(src.at_eof());
    }

    #[test]
    fn drains_generic_extension_chain() {
        let bytes: &[u8] = &[0x03, 1, 2, 3, 0x02, 9, 9, 0x00, 0xFF];
        let mut src = SliceSource::new(bytes);
        drain_sub_block_chain(&mut src).unwrap();
        assert_eq!(src.read_u8().unwrap(), 0xFF);
    }
}
