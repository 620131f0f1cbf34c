//! LZW Raster Decoder (spec §4.5): variable-width code decompression over
//! a GIF sub-block chain. Bits are packed LSB-first within each byte and
//! codes are read LSB-first out of the bit buffer.

use crate::error::{DecodeError, Result};
use crate::gif_reader::ByteSource;

/// Practical upper sentinel on code-table growth. The standard caps a
/// code table at 4096 entries; anything past that is corruption, but the
/// table is sized to `MAX_CODES` so `TooManyCodes` fires before any
/// out-of-bounds write rather than on the boundary itself.
const MAX_CODES: usize = 8192;

#[derive(Clone, Copy)]
struct CodeEntry {
    prefix: i16,
    first: u8,
    suffix: u8,
}

const EMPTY_ENTRY: CodeEntry = CodeEntry { prefix: -1, first: 0, suffix: 0 };

/// One LZW decode session, scoped to a single image block's packed data.
/// The code table (spec's `LzwCodeTable`) is reset on every clear code.
pub struct LzwDecoder {
    codes: Vec<CodeEntry>,
    lzw_cs: u8,
    clear_code: u16,
    end_code: u16,
    code_size: u8,
    code_mask: u16,
    avail: u16,
    old_code: i32,
    seen_clear: bool,
    bits: u32,
    valid_bits: u8,
    sub_block_remaining: usize,
}

impl LzwDecoder {
    /// `lzw_cs` is the initial code size byte (1-12) read just before the
    /// packed sub-block chain begins.
    pub fn new(lzw_cs: u8) -> Self {
        let clear_code: u16 = 1 << lzw_cs;
        let end_code = clear_code + 1;
        let mut codes = vec![EMPTY_ENTRY; MAX_CODES];
        for i in 0..clear_code as usize {
            codes[i] = CodeEntry { prefix: -1, first: i as u8, suffix: i as u8 };
        }
        let code_size = lzw_cs + 1;
        LzwDecoder {
            codes,
            lzw_cs,
            clear_code,
            end_code,
            code_size,
            code_mask: (1u16 << code_size) - 1,
            avail: clear_code + 2,
            old_code: -1,
            seen_clear: false,
            bits: 0,
            valid_bits: 0,
            sub_block_remaining: 0,
        }
    }

    fn reset_table(&mut self) {
        self.code_size = self.lzw_cs + 1;
        self.code_mask = (1u16 << self.code_size) - 1;
        self.avail = self.clear_code + 2;
        self.old_code = -1;
    }

    /// Run the decoder to completion, invoking `emit` once per decoded
    /// palette index in output order. Returns once the end code or the
    /// sub-block chain terminator is seen.
    pub fn decode(&mut self, src: &mut dyn ByteSource, mut emit: impl FnMut(u8)) -> Result<()> {
        // Explicit stack standing in for recursive prefix-chain traversal
        // (spec §9: "unroll onto an explicit stack bounded by 4096 entries").
        let mut stack: Vec<u8> = Vec::with_capacity(4096);

        loop {
            while self.valid_bits < self.code_size {
                if self.sub_block_remaining == 0 {
                    let len = src.read_u8()? as usize;
                    if len == 0 {
                        return Ok(());
                    }
                    self.sub_block_remaining = len;
                }
                let byte = src.read_u8()? as u32;
                self.sub_block_remaining -= 1;
                self.bits |= byte << self.valid_bits;
                self.valid_bits += 8;
            }

            let code = (self.bits & self.code_mask as u32) as u16;
            self.bits >>= self.code_size;
            self.valid_bits -= self.code_size;

            if code == self.clear_code {
                self.reset_table();
                self.seen_clear = true;
                continue;
            }
            if code == self.end_code {
                self.drain_to_terminator(src)?;
                return Ok(());
            }
            if code > self.avail {
                return Err(DecodeError::BadCode);
            }
            if !self.seen_clear {
                return Err(DecodeError::NoClearCode);
            }

            let avail_before_increment = self.avail;
            if self.old_code >= 0 {
                if self.avail as usize >= MAX_CODES {
                    return Err(DecodeError::TooManyCodes);
                }
                let old = self.old_code as usize;
                let prefix_first = self.codes[old].first;
                let suffix = if code == avail_before_increment {
                    prefix_first
                } else {
                    self.codes[code as usize].first
                };
                self.codes[self.avail as usize] = CodeEntry { prefix: self.old_code as i16, first: prefix_first, suffix };
                self.avail += 1;
                if (self.avail & self.code_mask) == 0 && self.avail <= 0xFFF {
                    self.code_size += 1;
                    self.code_mask = (1u16 << self.code_size) - 1;
                }
            }

            stack.clear();
            let mut cur = code;
            loop {
                let entry = self.codes[cur as usize];
                stack.push(entry.suffix);
                if entry.prefix < 0 {
                    break;
                }
                cur = entry.prefix as u16;
            }
            while let Some(byte) = stack.pop() {
                emit(byte);
            }

            self.old_code = code as i32;
        }
    }

    fn drain_to_terminator(&mut self, src: &mut dyn ByteSource) -> Result<()> {
        if self.sub_block_remaining > 0 {
            src.skip(self.sub_block_remaining as isize)?;
            self.sub_block_remaining = 0;
        }
        loop {
            let len = src.read_u8()? as usize;
            if len == 0 {
                return Ok(());
            }
            src.skip(len as isize)?;
        }
    }
}
