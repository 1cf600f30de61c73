// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Entropy-coded scan decoding, baseline and progressive.
//!
//! [`ScanDecoder`] walks one scan's MCUs and fills the frame's
//! [`CoefficientStore`]. A baseline scan decodes complete blocks; progressive
//! scans deposit one spectral band and one approximation level per pass, so
//! the store accumulates across scans until the final pass of each band.
//!
//! The block decoding procedures follow ITU-T T.81: F.2.2 for the initial
//! passes, G.1.2.2 and G.1.2.3 for successive-approximation refinement.

use std::io::Read;

use crate::bitio::BitReader;
use crate::block::CoefficientStore;
use crate::error::{Error, Result};
use crate::frame::{FrameInfo, ScanComponent, ScanHeader, MAX_COMPONENTS};
use crate::huffman::{HuffmanTables, TableClass};
use crate::zigzag::ZIGZAG_TO_NATURAL;

/// What one scan contributes to the coefficient store.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScanKind {
    /// Full spectral band, final values, single pass.
    Baseline,
    /// DC coefficients, most significant bits.
    DcFirst,
    /// DC coefficients, one refinement bit.
    DcRefine,
    /// An AC band, most significant bits.
    AcFirst,
    /// An AC band, one refinement bit.
    AcRefine,
}

/// Decoder for one scan's entropy-coded data segment.
pub struct ScanDecoder<'a> {
    frame: &'a FrameInfo,
    header: &'a ScanHeader,
    tables: &'a HuffmanTables,
    kind: ScanKind,
    zig_start: usize,
    zig_end: usize,
    al: u8,
    restart_interval: usize,
    dc_pred: [i32; MAX_COMPONENTS],
    eob_run: u32,
}

impl<'a> ScanDecoder<'a> {
    /// Validates the scan header against the frame and classifies the scan.
    ///
    /// For sequential frames the spectral and approximation fields are
    /// ignored and the full band is decoded. Progressive headers are checked
    /// per T.81 B.2.3 and G.1: a scan covers either DC or a pure-AC band,
    /// AC bands are single-component, and a refinement pass shifts the
    /// approximation by exactly one bit.
    pub fn new(
        frame: &'a FrameInfo,
        header: &'a ScanHeader,
        tables: &'a HuffmanTables,
        restart_interval: usize,
    ) -> Result<Self> {
        let n = header.components.len();
        if n == 0 || n > MAX_COMPONENTS {
            return Err(Error::InvalidScanHeader("component count out of range"));
        }
        let mut total_hv = 0;
        for (i, sc) in header.components.iter().enumerate() {
            if sc.component_index >= frame.components.len() {
                return Err(Error::InvalidScanHeader("component selector out of range"));
            }
            if sc.dc_table > 3 || sc.ac_table > 3 {
                return Err(Error::InvalidScanHeader("table selector out of range"));
            }
            if header.components[..i]
                .iter()
                .any(|o| o.component_index == sc.component_index)
            {
                return Err(Error::InvalidScanHeader("repeated component selector"));
            }
            let c = frame.components[sc.component_index];
            total_hv += c.h_sampling * c.v_sampling;
        }
        if n > 1 && total_hv > 10 {
            return Err(Error::InvalidScanHeader("total sampling factors above 10"));
        }

        let (zig_start, zig_end, ah, al) = if frame.progressive {
            let ss = header.spectral_start;
            let se = header.spectral_end;
            if (ss == 0 && se != 0) || ss > se || se > 63 {
                return Err(Error::InvalidScanHeader("bad spectral selection bounds"));
            }
            if ss != 0 && n != 1 {
                return Err(Error::InvalidScanHeader(
                    "AC band scan with more than one component",
                ));
            }
            if header.approx_high != 0 && header.approx_high != header.approx_low + 1 {
                return Err(Error::InvalidScanHeader(
                    "bad successive approximation values",
                ));
            }
            (
                usize::from(ss),
                usize::from(se),
                header.approx_high,
                header.approx_low,
            )
        } else {
            (0, 63, 0, 0)
        };

        let kind = if !frame.progressive {
            ScanKind::Baseline
        } else if zig_start == 0 {
            if ah == 0 {
                ScanKind::DcFirst
            } else {
                ScanKind::DcRefine
            }
        } else if ah == 0 {
            ScanKind::AcFirst
        } else {
            ScanKind::AcRefine
        };

        Ok(Self {
            frame,
            header,
            tables,
            kind,
            zig_start,
            zig_end,
            al,
            restart_interval,
            dc_pred: [0; MAX_COMPONENTS],
            eob_run: 0,
        })
    }

    pub fn kind(&self) -> ScanKind {
        self.kind
    }

    /// True when this scan delivers the least significant coefficient bits
    /// of its band, so the touched blocks need no further refinement.
    pub fn is_final_pass(&self) -> bool {
        self.al == 0
    }

    /// Decodes the scan's entire entropy-coded segment into `store`.
    ///
    /// Interleaved scans visit each MCU's blocks in sampling order.
    /// Single-component scans visit the component's blocks in raster order
    /// and skip blocks lying entirely outside the frame's pixel area; no
    /// entropy data exists for those.
    pub fn decode_scan<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        store: &mut CoefficientStore,
    ) -> Result<()> {
        self.dc_pred = [0; MAX_COMPONENTS];
        self.eob_run = 0;

        let mcus_wide = self.frame.mcus_wide();
        let total = self.frame.total_mcus();
        let interleaved = self.header.components.len() > 1;
        let mut block_count = 0usize;
        let mut expected_rst = 0u8;

        for mcu in 0..total {
            for i in 0..self.header.components.len() {
                let sc = self.header.components[i];
                let comp = self.frame.components[sc.component_index];
                let (hi, vi) = (comp.h_sampling, comp.v_sampling);
                for j in 0..hi * vi {
                    let (bx, by) = if interleaved {
                        (
                            hi * (mcu % mcus_wide) + j % hi,
                            vi * (mcu / mcus_wide) + j / hi,
                        )
                    } else {
                        let q = mcus_wide * hi;
                        let pos = (block_count % q, block_count / q);
                        block_count += 1;
                        if pos.0 * 8 >= self.frame.width || pos.1 * 8 >= self.frame.height {
                            continue;
                        }
                        pos
                    };
                    let block = store.grid_mut(sc.component_index).block_mut(by, bx);
                    match self.kind {
                        ScanKind::Baseline | ScanKind::DcFirst | ScanKind::AcFirst => {
                            self.decode_block_initial(reader, block, sc)?;
                        }
                        ScanKind::DcRefine | ScanKind::AcRefine => {
                            self.refine_block(reader, block, sc)?;
                        }
                    }
                }
            }

            if self.restart_interval > 0
                && (mcu + 1) % self.restart_interval == 0
                && mcu + 1 < total
            {
                self.expect_restart(reader, expected_rst)?;
                expected_rst = (expected_rst + 1) & 7;
                // F.2.1.3.1 and G.1.2.2: restart resets predictors and runs.
                self.dc_pred = [0; MAX_COMPONENTS];
                self.eob_run = 0;
            }
        }
        Ok(())
    }

    /// Decodes one block of an initial pass (T.81 F.2.2). Covers baseline
    /// blocks and the first DC and AC passes of a progressive frame, which
    /// differ only in spectral bounds and the approximation shift.
    fn decode_block_initial<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        block: &mut [i16],
        sc: ScanComponent,
    ) -> Result<()> {
        let mut zig = self.zig_start;
        if zig == 0 {
            let table = self.tables.get(TableClass::Dc, sc.dc_table)?;
            let t = table.decode(reader)?;
            if t > 16 {
                return Err(Error::ExcessiveDcComponent);
            }
            let delta = reader.receive_extend(t)?;
            self.dc_pred[sc.component_index] += delta;
            store_coeff(block, 0, self.dc_pred[sc.component_index] << self.al);
            zig = 1;
        }
        if zig > self.zig_end {
            return Ok(());
        }
        if self.eob_run > 0 {
            self.eob_run -= 1;
            return Ok(());
        }

        let table = self.tables.get(TableClass::Ac, sc.ac_table)?;
        while zig <= self.zig_end {
            let sym = table.decode(reader)?;
            let run = sym >> 4;
            let size = sym & 0x0F;
            if size != 0 {
                zig += usize::from(run);
                if zig > self.zig_end {
                    // A run past the band ends the block, as F.2.2.2 decoders
                    // conventionally treat it.
                    break;
                }
                let ac = reader.receive_extend(size)?;
                store_coeff(block, ZIGZAG_TO_NATURAL[zig], ac << self.al);
                zig += 1;
            } else if run != 0x0F {
                // End of band, with run extension bits in progressive scans.
                self.eob_run = 1u32 << run;
                if run != 0 {
                    self.eob_run |= reader.read_bits(i32::from(run))?;
                }
                self.eob_run -= 1;
                break;
            } else {
                // ZRL: sixteen zero coefficients.
                zig += 16;
            }
        }
        Ok(())
    }

    /// Adds one approximation bit to a block (T.81 G.1.2.2 for DC,
    /// G.1.2.3 for AC bands).
    fn refine_block<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        block: &mut [i16],
        sc: ScanComponent,
    ) -> Result<()> {
        let delta = (1i32 << self.al) as i16;
        if self.zig_start == 0 {
            if reader.read_bit()? {
                block[0] |= delta;
            }
            return Ok(());
        }

        let table = self.tables.get(TableClass::Ac, sc.ac_table)?;
        let mut zig = self.zig_start;
        if self.eob_run == 0 {
            while zig <= self.zig_end {
                let mut band_done = false;
                let mut z = 0i16;
                let sym = table.decode(reader)?;
                let run = i32::from(sym >> 4);
                let size = sym & 0x0F;
                match size {
                    0 => {
                        if run != 0x0F {
                            self.eob_run = 1u32 << run;
                            if run != 0 {
                                self.eob_run |= reader.read_bits(run)?;
                            }
                            band_done = true;
                        }
                    }
                    1 => {
                        z = if reader.read_bit()? { delta } else { -delta };
                    }
                    // Refinement passes carry single-bit magnitudes only.
                    _ => return Err(Error::BadHuffmanCode),
                }
                if band_done {
                    break;
                }

                zig = self.refine_non_zeroes(reader, block, zig, run, delta)?;
                if zig > self.zig_end {
                    return Err(Error::TooManyCoefficients);
                }
                if z != 0 {
                    block[ZIGZAG_TO_NATURAL[zig]] = z;
                }
                zig += 1;
            }
        }

        if self.eob_run > 0 {
            self.eob_run -= 1;
            self.refine_non_zeroes(reader, block, zig, -1, delta)?;
        }
        Ok(())
    }

    /// Walks the band from `zig` applying correction bits to already
    /// non-zero coefficients. A non-negative `nz` additionally skips that
    /// many zero coefficients before stopping at the next zero one.
    fn refine_non_zeroes<R: Read>(
        &self,
        reader: &mut BitReader<R>,
        block: &mut [i16],
        mut zig: usize,
        mut nz: i32,
        delta: i16,
    ) -> Result<usize> {
        while zig <= self.zig_end {
            let u = ZIGZAG_TO_NATURAL[zig];
            if block[u] == 0 {
                if nz == 0 {
                    break;
                }
                nz -= 1;
            } else if reader.read_bit()? {
                // Correction bits move magnitudes away from zero.
                if block[u] >= 0 {
                    block[u] += delta;
                } else {
                    block[u] -= delta;
                }
            }
            zig += 1;
        }
        Ok(zig)
    }

    /// Consumes and verifies one restart marker. Markers must appear in
    /// strict RST0-RST7 cyclic order; anything else is corrupt data.
    fn expect_restart<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        expected: u8,
    ) -> Result<()> {
        let mut marker = [0u8; 2];
        reader.read_full(&mut marker)?;
        if marker[0] != 0xFF || marker[1] != 0xD0 + expected {
            return Err(Error::BadRestartMarker);
        }
        reader.reset();
        Ok(())
    }
}

/// Coefficients from valid streams fit 16 bits; out-of-range values from
/// corrupt input saturate instead of wrapping.
fn store_coeff(block: &mut [i16], idx: usize, value: i32) {
    block[idx] = value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
}
