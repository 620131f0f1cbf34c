//! The byte-source abstraction the decode pipeline reads through.
//!
//! This is the one collaborator the core spec treats as external: any type
//! that can hand back bytes, skip forward, and report its own cursor
//! position and end-of-stream status can drive the parser. Two concrete
//! sources ship here — one over an in-memory slice, one over any
//! `std::io::Read`.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

use crate::error::{DecodeError, Result};

/// Minimal contract the Header & Block Parser and LZW decoder need from
/// whatever is feeding them GIF bytes.
pub trait ByteSource {
    /// Read the next byte.
    fn read_u8(&mut self) -> Result<u8>;

    /// Read the next two bytes as a little-endian `u16`.
    fn read_u16_le(&mut self) -> Result<u16>;

    /// Skip `n` bytes forward. A negative `n` means "un-read the last `|n|`
    /// bytes"; sources that cannot rewind return `UnsupportedSeek`.
    fn skip(&mut self, n: isize) -> Result<()>;

    /// Fill `buf` completely from the source.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// True once the source has no more bytes to give.
    fn at_eof(&self) -> bool;

    /// Current cursor position, for diagnostics.
    fn position(&self) -> usize;
}

/// A `ByteSource` over an in-memory buffer — the common case for decoding
/// a GIF that's already fully loaded.
pub struct SliceSource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        SliceSource { buf, pos: 0 }
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.buf.get(self.pos).ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        if self.pos + 2 > self.buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let mut cursor = &self.buf[self.pos..self.pos + 2];
        let value = cursor.read_u16::<LittleEndian>()?;
        self.pos += 2;
        Ok(value)
    }

    fn skip(&mut self, n: isize) -> Result<()> {
        let new_pos = self.pos as isize + n;
        if new_pos < 0 || new_pos as usize > self.buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        self.pos = new_pos as usize;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.pos + buf.len() > self.buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        buf.copy_from_slice(&self.buf[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn position(&self) -> usize {
        self.pos
    }
}

/// A `ByteSource` over any `std::io::Read`, for callers streaming from a
/// file or socket. Does not support un-reading bytes (negative `skip`);
/// the core never requests that outside of the C library's cursor
/// repositioning, which this crate's public API doesn't expose.
pub struct ReaderSource<R: Read> {
    reader: R,
    pos: usize,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource { reader, pos: 0, eof: false }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => {
                self.pos += 1;
                Ok(buf[0])
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.eof = true;
                Err(DecodeError::UnexpectedEof)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        match self.reader.read_u16::<LittleEndian>() {
            Ok(value) => {
                self.pos += 2;
                Ok(value)
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.eof = true;
                Err(DecodeError::UnexpectedEof)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn skip(&mut self, n: isize) -> Result<()> {
        if n < 0 {
            return Err(DecodeError::UnsupportedSeek);
        }
        let mut remaining = n as usize;
        let mut scratch = [0u8; 256];
        while remaining > 0 {
            let chunk = remaining.min(scratch.len());
            self.reader.read_exact(&mut scratch[..chunk])?;
            remaining -= chunk;
        }
        self.pos += n as usize;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf)?;
        self.pos += buf.len();
        Ok(())
    }

    fn at_eof(&self) -> bool {
        self.eof
    }

    fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_reads_u8_and_u16() {
        let mut src = SliceSource::new(&[0x01, 0x02, 0x03]);
        assert_eq!(src.read_u8().unwrap(), 0x01);
        assert_eq!(src.read_u16_le().unwrap(), 0x0302);
        assert!(src.at_eof());
    }

    #[test]
    fn slice_source_skip_supports_negative() {
        let mut src = SliceSource::new(&[0, 1, 2, 3, 4]);
        src.skip(3).unwrap();
        assert_eq!(src.position(), 3);
        src.skip(-2).unwrap();
        assert_eq!(src.position(), 1);
        assert_eq!(src.read_u8().unwrap(), 1);
    }

    #[test]
    fn slice_source_eof_on_overrun() {
        let mut src = SliceSource::new(&[0x01]);
        assert!(src.read_u16_le().is_err());
    }

    #[test]
    fn reader_source_rejects_negative_skip() {
        let mut src = ReaderSource::new(&[1u8, 2, 3][..]);
        assert!(matches!(src.skip(-1), Err(DecodeError::UnsupportedSeek)));
    }

    #[test]
    fn reader_source_reads_sequentially() {
        let mut src = ReaderSource::new(&[0xAA, 0x01, 0x02][..]);
        assert_eq!(src.read_u8().unwrap(), 0xAA);
        assert_eq!(src.read_u16_le().unwrap(), 0x0201);
        assert!(src.read_u8().is_err());
        assert!(src.at_eof());
    }
}
