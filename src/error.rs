// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Error types for entropy-coded scan decoding.

use std::fmt;
use std::io;

/// Errors that can occur while decoding entropy-coded scan data.
///
/// Every variant is terminal for the current image: no recovery or resync
/// heuristic is attempted, the error is surfaced to the caller as-is.
/// Contract violations (such as refilling the byte buffer while unread bytes
/// remain) are programming errors, not data errors, and panic instead.
#[derive(Debug)]
pub enum Error {
    /// Input exhausted before the scan was fully decoded.
    UnexpectedEndOfStream,
    /// A 0xFF byte in entropy-coded data was not followed by 0x00. Either a
    /// real marker appeared early or the stream is corrupt; this layer has no
    /// marker-resync logic, so it is surfaced rather than swallowed.
    MissingMarkerEscape,
    /// No canonical Huffman code of length 1-16 matched the bit stream.
    BadHuffmanCode,
    /// Decoded DC magnitude category above 16; corrupt data or a mismatched
    /// table selection.
    ExcessiveDcComponent,
    /// The bytes at a restart boundary were not 0xFF plus the expected RSTn
    /// marker.
    BadRestartMarker,
    /// A DHT code-length histogram describes an unusable table.
    BadHuffmanTable(&'static str),
    /// Scan header fields are inconsistent with the frame or with each other.
    InvalidScanHeader(&'static str),
    /// A refinement pass placed coefficients beyond the spectral band.
    TooManyCoefficients,
    /// The underlying byte source failed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEndOfStream => write!(f, "unexpected end of entropy-coded data"),
            Self::MissingMarkerEscape => write!(f, "0xFF in entropy data not followed by 0x00"),
            Self::BadHuffmanCode => write!(f, "bad Huffman code"),
            Self::ExcessiveDcComponent => write!(f, "excessive DC component"),
            Self::BadRestartMarker => write!(f, "bad restart marker"),
            Self::BadHuffmanTable(msg) => write!(f, "bad Huffman table: {msg}"),
            Self::InvalidScanHeader(msg) => write!(f, "invalid scan header: {msg}"),
            Self::TooManyCoefficients => write!(f, "too many coefficients in spectral band"),
            Self::Io(e) => write!(f, "read error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
