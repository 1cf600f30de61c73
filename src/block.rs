// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Coefficient block storage.
//!
//! One [`BlockGrid`] per component holds every 8x8 block of the frame as a
//! flat `Vec<i16>` in block-raster order, 64 natural-order coefficients per
//! block. The whole [`CoefficientStore`] is allocated once per image and
//! written to by every scan, so progressive passes accumulate in place.

use crate::frame::FrameInfo;

pub const BLOCK_SIZE: usize = 64;

/// All coefficient blocks of one component.
pub struct BlockGrid {
    blocks_wide: usize,
    blocks_tall: usize,
    data: Vec<i16>,
}

impl BlockGrid {
    pub fn new(blocks_wide: usize, blocks_tall: usize) -> Self {
        Self {
            blocks_wide,
            blocks_tall,
            data: vec![0i16; blocks_wide * blocks_tall * BLOCK_SIZE],
        }
    }

    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    pub fn blocks_tall(&self) -> usize {
        self.blocks_tall
    }

    pub fn block_count(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    /// Natural-order coefficients of the block at `(row, col)`.
    pub fn block(&self, row: usize, col: usize) -> &[i16] {
        let start = (row * self.blocks_wide + col) * BLOCK_SIZE;
        &self.data[start..start + BLOCK_SIZE]
    }

    pub fn block_mut(&mut self, row: usize, col: usize) -> &mut [i16] {
        let start = (row * self.blocks_wide + col) * BLOCK_SIZE;
        &mut self.data[start..start + BLOCK_SIZE]
    }

    /// Block by flat raster index, as the scan loop addresses them.
    pub fn block_at(&self, index: usize) -> &[i16] {
        let start = index * BLOCK_SIZE;
        &self.data[start..start + BLOCK_SIZE]
    }

    pub fn block_at_mut(&mut self, index: usize) -> &mut [i16] {
        let start = index * BLOCK_SIZE;
        &mut self.data[start..start + BLOCK_SIZE]
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

/// One grid per frame component, the output every scan writes into.
pub struct CoefficientStore {
    grids: Vec<BlockGrid>,
}

impl CoefficientStore {
    /// Allocates zeroed grids sized for the frame's padded MCU geometry.
    pub fn for_frame(frame: &FrameInfo) -> Self {
        let grids = (0..frame.components.len())
            .map(|i| BlockGrid::new(frame.blocks_wide(i), frame.blocks_tall(i)))
            .collect();
        Self { grids }
    }

    pub fn grid(&self, component: usize) -> &BlockGrid {
        &self.grids[component]
    }

    pub fn grid_mut(&mut self, component: usize) -> &mut BlockGrid {
        &mut self.grids[component]
    }

    pub fn reset(&mut self) {
        for g in &mut self.grids {
            g.clear();
        }
    }
}
