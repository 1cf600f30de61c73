// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Shared encoding support for the integration tests.
//!
//! The library only decodes, so the tests build their own entropy-coded
//! segments: an MSB-first byte-stuffing [`BitWriter`], canonical encode
//! tables, and per-pass block emitters covering baseline and progressive
//! (spectral selection plus successive approximation) scans.

#![allow(dead_code)]

use scandec::frame::{FrameInfo, ScanComponent};
use scandec::zigzag::ZIGZAG_TO_NATURAL;

/// Bit-level writer for entropy-coded data. Byte-stuffs 0xFF and pads the
/// final partial byte with 1-bits.
pub struct BitWriter {
    out: Vec<u8>,
    buf: u8,
    bits_used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            buf: 0,
            bits_used: 0,
        }
    }

    /// Write `count` bits (1-16) from the low bits of `value`, MSB first.
    pub fn write_bits(&mut self, value: u16, count: u8) {
        debug_assert!(count >= 1 && count <= 16);
        for i in (0..count).rev() {
            let bit = (value >> i) & 1;
            self.buf = (self.buf << 1) | bit as u8;
            self.bits_used += 1;
            if self.bits_used == 8 {
                self.emit_byte(self.buf);
                self.buf = 0;
                self.bits_used = 0;
            }
        }
    }

    /// Pad to a byte boundary with 1-bits.
    pub fn pad_to_byte(&mut self) {
        if self.bits_used > 0 {
            let remaining = 8 - self.bits_used;
            let byte = (self.buf << remaining) | ((1u8 << remaining) - 1);
            self.emit_byte(byte);
            self.buf = 0;
            self.bits_used = 0;
        }
    }

    /// Pad to a byte boundary, then emit a literal marker (no stuffing).
    pub fn write_marker(&mut self, marker: u8) {
        self.pad_to_byte();
        self.out.push(0xFF);
        self.out.push(marker);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pad_to_byte();
        self.out
    }

    fn emit_byte(&mut self, byte: u8) {
        self.out.push(byte);
        if byte == 0xFF {
            self.out.push(0x00);
        }
    }
}

/// Canonical Huffman encode table: symbol -> (code, length).
pub struct EncodeTable {
    codes: [(u16, u8); 256],
}

impl EncodeTable {
    pub fn build(counts: &[u8; 16], values: &[u8]) -> Self {
        let mut codes = [(0u16, 0u8); 256];
        let mut code: u32 = 0;
        let mut si = 0;
        for length in 1..=16u8 {
            for _ in 0..counts[(length - 1) as usize] {
                if si < values.len() {
                    codes[values[si] as usize] = (code as u16, length);
                    si += 1;
                }
                code += 1;
            }
            code <<= 1;
        }
        Self { codes }
    }

    pub fn write(&self, w: &mut BitWriter, symbol: u8) {
        let (code, len) = self.codes[symbol as usize];
        assert!(len > 0, "no code for symbol {symbol:#04x}");
        w.write_bits(code, len);
    }
}

/// Luminance DC code lengths, ITU-T T.81 Table K.3.
pub fn lum_dc_spec() -> ([u8; 16], Vec<u8>) {
    let counts = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
    let values = (0..=11).collect();
    (counts, values)
}

/// Chrominance DC code lengths, ITU-T T.81 Table K.4.
pub fn chrom_dc_spec() -> ([u8; 16], Vec<u8>) {
    let counts = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
    let values = (0..=11).collect();
    (counts, values)
}

/// An AC table containing every possible (run, size) symbol: 254 codes of
/// length 8 plus 2 of length 9. Any block content is encodable with it.
pub fn ac_full_spec() -> ([u8; 16], Vec<u8>) {
    let mut counts = [0u8; 16];
    counts[7] = 254;
    counts[8] = 2;
    let values = (0..=255u8).collect();
    (counts, values)
}

/// Magnitude category and raw additional bits for a coefficient
/// (T.81 F.1.2.1, one's complement for negatives).
pub fn encode_value(value: i16) -> (u16, u8) {
    if value == 0 {
        return (0, 0);
    }
    let abs = value.unsigned_abs();
    let size = 16 - abs.leading_zeros() as u8;
    let bits = if value > 0 {
        value as u16
    } else {
        (value - 1) as u16
    };
    (bits & ((1u16 << size) - 1), size)
}

/// Encodes one complete baseline block (natural-order coefficients).
pub fn encode_baseline_block(
    w: &mut BitWriter,
    dc: &EncodeTable,
    ac: &EncodeTable,
    block: &[i16],
    dc_pred: &mut i32,
) {
    let diff = i32::from(block[0]) - *dc_pred;
    *dc_pred = i32::from(block[0]);
    let (bits, size) = encode_value(diff as i16);
    dc.write(w, size);
    if size > 0 {
        w.write_bits(bits, size);
    }

    let mut run = 0u8;
    for zig in 1..64 {
        let v = block[ZIGZAG_TO_NATURAL[zig]];
        if v == 0 {
            run += 1;
            continue;
        }
        while run > 15 {
            ac.write(w, 0xF0);
            run -= 16;
        }
        let (bits, size) = encode_value(v);
        ac.write(w, (run << 4) | size);
        w.write_bits(bits, size);
        run = 0;
    }
    if run > 0 {
        ac.write(w, 0x00);
    }
}

/// Encodes the DC portion of a first progressive pass: the point-transformed
/// predictor difference.
pub fn encode_dc_first(
    w: &mut BitWriter,
    dc: &EncodeTable,
    block: &[i16],
    al: u8,
    dc_pred: &mut i32,
) {
    let v = i32::from(block[0]) >> al;
    let diff = v - *dc_pred;
    *dc_pred = v;
    let (bits, size) = encode_value(diff as i16);
    dc.write(w, size);
    if size > 0 {
        w.write_bits(bits, size);
    }
}

/// One DC refinement bit.
pub fn encode_dc_refine(w: &mut BitWriter, block: &[i16], al: u8) {
    w.write_bits(((i32::from(block[0]) >> al) & 1) as u16, 1);
}

/// Emitter for first AC passes of a progressive frame. End-of-band runs are
/// accumulated across blocks and must be flushed at scan end (and before
/// restart markers).
pub struct AcFirstEncoder {
    eob_run: u32,
}

impl AcFirstEncoder {
    pub fn new() -> Self {
        Self { eob_run: 0 }
    }

    pub fn encode_block(
        &mut self,
        w: &mut BitWriter,
        ac: &EncodeTable,
        block: &[i16],
        ss: usize,
        se: usize,
        al: u8,
    ) {
        let mut run = 0u8;
        for zig in ss..=se {
            let raw = i32::from(block[ZIGZAG_TO_NATURAL[zig]]);
            let (mag, extra) = if raw < 0 {
                let m = (-raw) >> al;
                (m, !m)
            } else {
                let m = raw >> al;
                (m, m)
            };
            if mag == 0 {
                run += 1;
                continue;
            }
            self.flush_eob_run(w, ac);
            while run > 15 {
                ac.write(w, 0xF0);
                run -= 16;
            }
            let size = (32 - (mag as u32).leading_zeros()) as u8;
            ac.write(w, (run << 4) | size);
            w.write_bits((extra as u16) & ((1u16 << size) - 1), size);
            run = 0;
        }
        if run > 0 {
            self.eob_run += 1;
        }
    }

    pub fn flush_eob_run(&mut self, w: &mut BitWriter, ac: &EncodeTable) {
        if self.eob_run == 0 {
            return;
        }
        let nbits = (31 - self.eob_run.leading_zeros()) as u8;
        ac.write(w, nbits << 4);
        if nbits > 0 {
            w.write_bits((self.eob_run & ((1 << nbits) - 1)) as u16, nbits);
        }
        self.eob_run = 0;
    }
}

/// Emitter for AC refinement passes (T.81 G.1.2.3). Correction bits for
/// blocks swallowed by an end-of-band run are buffered and emitted with the
/// run symbol.
pub struct AcRefineEncoder {
    eob_run: u32,
    pending_bits: Vec<bool>,
}

impl AcRefineEncoder {
    pub fn new() -> Self {
        Self {
            eob_run: 0,
            pending_bits: Vec::new(),
        }
    }

    pub fn encode_block(
        &mut self,
        w: &mut BitWriter,
        ac: &EncodeTable,
        block: &[i16],
        ss: usize,
        se: usize,
        al: u8,
    ) {
        let mut mags = [0i32; 64];
        let mut eob = 0usize;
        for zig in ss..=se {
            let m = i32::from(block[ZIGZAG_TO_NATURAL[zig]]).abs() >> al;
            mags[zig] = m;
            if m == 1 {
                // Newly visible at this approximation level.
                eob = zig;
            }
        }

        let mut run = 0u32;
        let mut correction: Vec<bool> = Vec::new();
        for zig in ss..=se {
            let m = mags[zig];
            if m == 0 {
                run += 1;
                continue;
            }
            while run > 15 && zig <= eob {
                self.flush_eob_run(w, ac);
                ac.write(w, 0xF0);
                run -= 16;
                Self::drain_bits(w, &mut correction);
            }
            if m > 1 {
                // Already non-zero before this pass; just a correction bit.
                correction.push(m & 1 != 0);
                continue;
            }
            self.flush_eob_run(w, ac);
            ac.write(w, ((run as u8) << 4) | 1);
            let positive = block[ZIGZAG_TO_NATURAL[zig]] > 0;
            w.write_bits(positive as u16, 1);
            Self::drain_bits(w, &mut correction);
            run = 0;
        }
        if run > 0 || !correction.is_empty() {
            self.eob_run += 1;
            self.pending_bits.append(&mut correction);
        }
    }

    pub fn flush_eob_run(&mut self, w: &mut BitWriter, ac: &EncodeTable) {
        if self.eob_run == 0 {
            debug_assert!(self.pending_bits.is_empty());
            return;
        }
        let nbits = (31 - self.eob_run.leading_zeros()) as u8;
        ac.write(w, nbits << 4);
        if nbits > 0 {
            w.write_bits((self.eob_run & ((1 << nbits) - 1)) as u16, nbits);
        }
        self.eob_run = 0;
        let mut pending = std::mem::take(&mut self.pending_bits);
        Self::drain_bits(w, &mut pending);
    }

    fn drain_bits(w: &mut BitWriter, bits: &mut Vec<bool>) {
        for bit in bits.drain(..) {
            w.write_bits(bit as u16, 1);
        }
    }
}

/// Block visit order of a scan, grouped by MCU: each inner vector holds
/// `(component_index, block_col, block_row)` triples. Single-component scans
/// use component raster order and omit blocks outside the pixel area.
pub fn mcu_block_order(
    frame: &FrameInfo,
    components: &[ScanComponent],
) -> Vec<Vec<(usize, usize, usize)>> {
    let interleaved = components.len() > 1;
    let mut mcus = Vec::with_capacity(frame.total_mcus());
    let mut block_count = 0usize;
    for mcu in 0..frame.total_mcus() {
        let mut blocks = Vec::new();
        for sc in components {
            let comp = frame.components[sc.component_index];
            let (hi, vi) = (comp.h_sampling, comp.v_sampling);
            for j in 0..hi * vi {
                if interleaved {
                    let bx = hi * (mcu % frame.mcus_wide()) + j % hi;
                    let by = vi * (mcu / frame.mcus_wide()) + j / hi;
                    blocks.push((sc.component_index, bx, by));
                } else {
                    let q = frame.mcus_wide() * hi;
                    let (bx, by) = (block_count % q, block_count / q);
                    block_count += 1;
                    if bx * 8 < frame.width && by * 8 < frame.height {
                        blocks.push((sc.component_index, bx, by));
                    }
                }
            }
        }
        mcus.push(blocks);
    }
    mcus
}
