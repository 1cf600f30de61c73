// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Canonical Huffman tables and symbol decoding.
//!
//! Tables are built from the DHT wire form (16 per-length code counts plus a
//! symbol list) into the canonical assignment of ITU-T T.81 Annex C. Decoding
//! uses an 8-bit lookup table for codes up to 8 bits and falls back to a
//! bit-by-bit walk of the min/max code ranges for longer codes.

use std::io::Read;

use crate::bitio::BitReader;
use crate::error::{Error, Result};

const MAX_CODE_LEN: usize = 16;
const LUT_BITS: i32 = 8;

/// One decoding table, DC or AC. Which class and destination slot it lives
/// in is the caller's business.
pub struct HuffmanTable {
    values: Vec<u8>,
    /// Indexed by the top 8 unread bits. Entry `(symbol << 8) | (len + 1)`,
    /// zero for codes longer than 8 bits.
    lut: [u16; 1 << LUT_BITS],
    /// Smallest canonical code of each length, -1 when the length is unused.
    min_codes: [i32; MAX_CODE_LEN],
    /// Largest canonical code of each length, -1 when the length is unused.
    max_codes: [i32; MAX_CODE_LEN],
    /// Index into `values` of the first symbol of each length.
    value_indices: [i32; MAX_CODE_LEN],
}

impl HuffmanTable {
    /// Builds a table from `counts[l]` codes of length `l + 1` and the
    /// symbols they decode to, in canonical order.
    pub fn new(counts: &[u8; MAX_CODE_LEN], values: &[u8]) -> Result<Self> {
        let total: usize = counts.iter().map(|&c| usize::from(c)).sum();
        if total == 0 {
            return Err(Error::BadHuffmanTable("no codes defined"));
        }
        if total > 256 {
            return Err(Error::BadHuffmanTable("more than 256 codes"));
        }
        if total > values.len() {
            return Err(Error::BadHuffmanTable("fewer symbols than codes"));
        }

        let mut table = Self {
            values: values[..total].to_vec(),
            lut: [0u16; 1 << LUT_BITS],
            min_codes: [-1i32; MAX_CODE_LEN],
            max_codes: [-1i32; MAX_CODE_LEN],
            value_indices: [-1i32; MAX_CODE_LEN],
        };

        let mut code = 0i32;
        let mut k = 0usize;
        for len in 0..MAX_CODE_LEN {
            let count = i32::from(counts[len]);
            if count != 0 {
                // Canonical codes of length len+1 occupy [code, code+count).
                if code + count > 1 << (len + 1) {
                    return Err(Error::BadHuffmanTable("code length overflow"));
                }
                table.value_indices[len] = k as i32;
                table.min_codes[len] = code;
                table.max_codes[len] = code + count - 1;

                if len < LUT_BITS as usize {
                    for _ in 0..count {
                        let base = (code as usize) << (LUT_BITS as usize - 1 - len);
                        let entry = (u16::from(table.values[k]) << 8) | (len as u16 + 2);
                        for slot in 0..1usize << (LUT_BITS as usize - 1 - len) {
                            table.lut[base + slot] = entry;
                        }
                        code += 1;
                        k += 1;
                    }
                } else {
                    code += count;
                    k += count as usize;
                }
            }
            code <<= 1;
        }

        Ok(table)
    }

    /// Decodes one symbol from the bit stream.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u8> {
        if reader.unread_bits() < LUT_BITS {
            match reader.ensure_bits(LUT_BITS) {
                Ok(()) => {}
                Err(Error::UnexpectedEndOfStream) | Err(Error::MissingMarkerEscape) => {
                    // A trailing code shorter than 8 bits can still sit in
                    // the accumulator at the end of a scan. Give back the
                    // overshoot byte and let the slow path try.
                    reader.unread_overshoot();
                    return self.decode_slow(reader);
                }
                Err(e) => return Err(e),
            }
        }
        let entry = self.lut[reader.lut_index()];
        if entry != 0 {
            let len = i32::from(entry & 0xFF) - 1;
            reader.consume_bits(len);
            return Ok((entry >> 8) as u8);
        }
        self.decode_slow(reader)
    }

    /// Bit-by-bit canonical walk for codes the lookup table missed.
    fn decode_slow<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u8> {
        let mut code = 0i32;
        for len in 0..MAX_CODE_LEN {
            if reader.read_bit()? {
                code |= 1;
            }
            let max = self.max_codes[len];
            if max >= 0 && code <= max {
                let idx = self.value_indices[len] + code - self.min_codes[len];
                return Ok(self.values[idx as usize]);
            }
            code <<= 1;
        }
        Err(Error::BadHuffmanCode)
    }
}

/// Table class from the DHT segment: 0 selects DC, 1 selects AC.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TableClass {
    Dc,
    Ac,
}

/// The four DC and four AC table slots a scan's component selectors index
/// into.
#[derive(Default)]
pub struct HuffmanTables {
    dc: [Option<HuffmanTable>; 4],
    ac: [Option<HuffmanTable>; 4],
}

impl HuffmanTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, class: TableClass, dest: usize, table: HuffmanTable) {
        assert!(dest < 4, "table destination out of range");
        match class {
            TableClass::Dc => self.dc[dest] = Some(table),
            TableClass::Ac => self.ac[dest] = Some(table),
        }
    }

    /// Looks up the table a scan component selected. Selecting a slot no DHT
    /// segment filled is a stream inconsistency, not a caller bug.
    pub fn get(&self, class: TableClass, dest: usize) -> Result<&HuffmanTable> {
        let slot = match class {
            TableClass::Dc => self.dc.get(dest),
            TableClass::Ac => self.ac.get(dest),
        };
        slot.and_then(Option::as_ref)
            .ok_or(Error::BadHuffmanTable("undefined table selected"))
    }
}
