// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Entropy-coded scan decoding for JPEG (ITU-T T.81) images.
//!
//! This crate covers the stage between the marker parser and the inverse
//! DCT: it takes pre-parsed frame and scan headers plus built Huffman
//! tables, reads the entropy-coded data segment, and fills per-component
//! grids of quantized DCT coefficient blocks. Baseline scans decode in one
//! pass; progressive scans (spectral selection and successive approximation)
//! accumulate across passes in the same [`block::CoefficientStore`].
//!
//! Marker parsing, dequantization, the inverse DCT, and colour conversion
//! are out of scope and belong to the surrounding pipeline.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use scandec::{
//!     bitio::BitReader,
//!     block::CoefficientStore,
//!     frame::{Component, FrameInfo, ScanComponent, ScanHeader},
//!     huffman::HuffmanTables,
//!     scan::ScanDecoder,
//! };
//!
//! # fn run(entropy_data: &[u8], tables: &HuffmanTables) -> scandec::Result<()> {
//! let frame = FrameInfo::new(64, 64, false, vec![Component {
//!     h_sampling: 1,
//!     v_sampling: 1,
//! }]);
//! let header = ScanHeader::baseline(vec![ScanComponent {
//!     component_index: 0,
//!     dc_table: 0,
//!     ac_table: 0,
//! }]);
//! let mut store = CoefficientStore::for_frame(&frame);
//! let mut decoder = ScanDecoder::new(&frame, &header, tables, 0)?;
//! decoder.decode_scan(&mut BitReader::new(entropy_data), &mut store)?;
//! # Ok(())
//! # }
//! ```

pub mod bitio;
pub mod block;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod scan;
pub mod zigzag;

pub use bitio::BitReader;
pub use block::{BlockGrid, CoefficientStore};
pub use error::{Error, Result};
pub use frame::{Component, FrameInfo, ScanComponent, ScanHeader};
pub use huffman::{HuffmanTable, HuffmanTables, TableClass};
pub use scan::{ScanDecoder, ScanKind};
