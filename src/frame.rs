// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Pre-parsed frame and scan header state.
//!
//! The marker layer that parses SOF/SOS segments lives outside this crate;
//! these are the typed shapes it hands in.

/// Maximum number of components in a frame (T.81 allows 255 but four covers
/// every colour model this decoder targets).
pub const MAX_COMPONENTS: usize = 4;

/// One frame component's sampling description.
#[derive(Clone, Copy, Debug)]
pub struct Component {
    /// Horizontal sampling factor, 1-4.
    pub h_sampling: usize,
    /// Vertical sampling factor, 1-4.
    pub v_sampling: usize,
}

/// Frame-level state from the SOF segment.
#[derive(Debug)]
pub struct FrameInfo {
    pub width: usize,
    pub height: usize,
    /// Set for SOF2 frames; selects the progressive scan kinds.
    pub progressive: bool,
    pub components: Vec<Component>,
    mcus_wide: usize,
    mcus_tall: usize,
    h_max: usize,
    v_max: usize,
}

impl FrameInfo {
    pub fn new(width: usize, height: usize, progressive: bool, components: Vec<Component>) -> Self {
        assert!(width > 0 && height > 0, "empty frame");
        assert!(
            !components.is_empty() && components.len() <= MAX_COMPONENTS,
            "component count out of range"
        );
        for c in &components {
            assert!(
                (1..=4).contains(&c.h_sampling) && (1..=4).contains(&c.v_sampling),
                "sampling factor out of range"
            );
        }
        let h_max = components.iter().map(|c| c.h_sampling).max().unwrap_or(1);
        let v_max = components.iter().map(|c| c.v_sampling).max().unwrap_or(1);
        // MCU grid rounds partial edge MCUs up.
        let mcus_wide = (width + 8 * h_max - 1) / (8 * h_max);
        let mcus_tall = (height + 8 * v_max - 1) / (8 * v_max);
        Self {
            width,
            height,
            progressive,
            components,
            mcus_wide,
            mcus_tall,
            h_max,
            v_max,
        }
    }

    pub fn mcus_wide(&self) -> usize {
        self.mcus_wide
    }

    pub fn mcus_tall(&self) -> usize {
        self.mcus_tall
    }

    pub fn total_mcus(&self) -> usize {
        self.mcus_wide * self.mcus_tall
    }

    pub fn h_max(&self) -> usize {
        self.h_max
    }

    pub fn v_max(&self) -> usize {
        self.v_max
    }

    /// Width of component `idx`'s block grid, including the blocks padding
    /// out partial MCUs at the right edge.
    pub fn blocks_wide(&self, idx: usize) -> usize {
        self.mcus_wide * self.components[idx].h_sampling
    }

    /// Height of component `idx`'s block grid.
    pub fn blocks_tall(&self, idx: usize) -> usize {
        self.mcus_tall * self.components[idx].v_sampling
    }
}

/// One entry of the SOS component list.
#[derive(Clone, Copy, Debug)]
pub struct ScanComponent {
    /// Index into `FrameInfo::components`.
    pub component_index: usize,
    /// DC table destination selector, 0-3.
    pub dc_table: usize,
    /// AC table destination selector, 0-3.
    pub ac_table: usize,
}

/// Scan-level state from the SOS segment.
#[derive(Debug)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    /// Start of spectral selection (Ss), zigzag index.
    pub spectral_start: u8,
    /// End of spectral selection (Se), zigzag index.
    pub spectral_end: u8,
    /// Successive approximation high bit position (Ah).
    pub approx_high: u8,
    /// Successive approximation low bit position (Al).
    pub approx_low: u8,
}

impl ScanHeader {
    /// Header for a baseline scan over the given components: full spectral
    /// band, no successive approximation.
    pub fn baseline(components: Vec<ScanComponent>) -> Self {
        Self {
            components,
            spectral_start: 0,
            spectral_end: 63,
            approx_high: 0,
            approx_low: 0,
        }
    }
}
