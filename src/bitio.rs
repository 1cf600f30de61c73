// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/scandec

//! Byte-stuffed input buffering and MSB-first bit reading.
//!
//! [`ByteBuffer`] buffers raw bytes from the input source and removes the
//! `0xFF 0x00` stuffing sequences the format inserts into entropy-coded data.
//! [`BitReader`] sits on top and maintains the bit accumulator used by
//! Huffman decoding and the RECEIVE/EXTEND primitive of ITU-T T.81 F.2.2.1.

use std::io::{ErrorKind, Read};

use crate::error::{Error, Result};

const BUFFER_LEN: usize = 4096;

/// Buffered reader over entropy-coded data that undoes byte stuffing.
///
/// Keeps a read cursor `i` and a valid-data end `j` into a fixed reusable
/// buffer, plus a count of already-delivered bytes (0-2) that the cursor may
/// be rewound over. The rewind exists because Huffman lookup can overshoot:
/// probing the 8-bit lookup table may pull in one byte (two raw bytes when it
/// was a stuffed `FF 00` pair) that a following raw read must give back.
pub struct ByteBuffer<R> {
    src: R,
    buf: Box<[u8; BUFFER_LEN]>,
    /// Read cursor: `buf[i..j]` is unread.
    i: usize,
    /// End of valid data.
    j: usize,
    /// How many already-delivered bytes `unread` may rewind over.
    unreadable: usize,
}

impl<R: Read> ByteBuffer<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            buf: Box::new([0u8; BUFFER_LEN]),
            i: 0,
            j: 0,
            unreadable: 0,
        }
    }

    /// Returns the next de-stuffed byte of entropy-coded data.
    ///
    /// A literal `0xFF 0x00` pair yields `0xFF`. A `0xFF` followed by
    /// anything else is a real marker intruding on entropy data and is
    /// reported as [`Error::MissingMarkerEscape`]; on the buffered fast path
    /// the marker byte itself is left unconsumed.
    pub fn read_stuffed_byte(&mut self) -> Result<u8> {
        // Fast path: at least two bytes buffered.
        if self.i + 2 <= self.j {
            let x = self.buf[self.i];
            self.i += 1;
            self.unreadable = 1;
            if x != 0xFF {
                return Ok(x);
            }
            if self.buf[self.i] != 0x00 {
                return Err(Error::MissingMarkerEscape);
            }
            self.i += 1;
            self.unreadable = 2;
            return Ok(0xFF);
        }

        self.unreadable = 0;
        let x = self.read_byte()?;
        self.unreadable = 1;
        if x != 0xFF {
            return Ok(x);
        }
        let next = self.read_byte()?;
        self.unreadable = 2;
        if next != 0x00 {
            return Err(Error::MissingMarkerEscape);
        }
        Ok(0xFF)
    }

    /// Returns the next byte with no stuffing awareness. Used when literal
    /// marker bytes (restart markers) are expected in the stream.
    pub fn read_byte(&mut self) -> Result<u8> {
        while self.i == self.j {
            self.fill()?;
        }
        let x = self.buf[self.i];
        self.i += 1;
        self.unreadable = 0;
        Ok(x)
    }

    /// Rewinds the cursor over the most recently delivered stuffed byte.
    pub(crate) fn unread(&mut self) {
        self.i -= self.unreadable;
        self.unreadable = 0;
    }

    pub(crate) fn unreadable(&self) -> usize {
        self.unreadable
    }

    pub(crate) fn clear_unreadable(&mut self) {
        self.unreadable = 0;
    }

    /// Refills the buffer from the input source.
    ///
    /// Only legal once every buffered byte has been consumed; calling it
    /// earlier is a caller bug. The last two delivered bytes are kept at the
    /// buffer start so `unread` stays valid across the refill. Partial reads
    /// are retried until the buffer is full or the input is exhausted; zero
    /// new bytes means the stream ended mid-scan.
    fn fill(&mut self) -> Result<()> {
        assert!(self.i == self.j, "fill called while unread bytes remain");

        if self.j > 2 {
            self.buf[0] = self.buf[self.j - 2];
            self.buf[1] = self.buf[self.j - 1];
            self.i = 2;
            self.j = 2;
        }

        let start = self.j;
        while self.j < BUFFER_LEN {
            match self.src.read(&mut self.buf[self.j..]) {
                Ok(0) => break,
                Ok(n) => self.j += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        if self.j == start {
            return Err(Error::UnexpectedEndOfStream);
        }
        Ok(())
    }
}

/// MSB-first bit reader over de-stuffed entropy-coded bytes.
///
/// `acc` holds whole drained bytes; `mask` flags the current top unread bit
/// and is zero exactly when `unread_bits` is zero, otherwise
/// `1 << (unread_bits - 1)`.
pub struct BitReader<R> {
    bytes: ByteBuffer<R>,
    acc: u32,
    mask: u32,
    unread_bits: i32,
}

impl<R: Read> BitReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            bytes: ByteBuffer::new(src),
            acc: 0,
            mask: 0,
            unread_bits: 0,
        }
    }

    /// Number of bits currently buffered in the accumulator. Hot loops
    /// pre-check this before calling [`ensure_bits`](Self::ensure_bits) to
    /// keep the common case call-free.
    pub fn unread_bits(&self) -> i32 {
        self.unread_bits
    }

    /// Drains de-stuffed bytes into the accumulator until at least `n` bits
    /// are available.
    pub fn ensure_bits(&mut self, n: i32) -> Result<()> {
        debug_assert!((1..=16).contains(&n));
        loop {
            let c = self.bytes.read_stuffed_byte()?;
            self.acc = (self.acc << 8) | u32::from(c);
            self.unread_bits += 8;
            if self.mask == 0 {
                self.mask = 1 << 7;
            } else {
                self.mask <<= 8;
            }
            if self.unread_bits >= n {
                return Ok(());
            }
        }
    }

    /// Reads `count` bits, returned right-aligned.
    pub fn read_bits(&mut self, count: i32) -> Result<u32> {
        if self.unread_bits < count {
            self.ensure_bits(count)?;
        }
        let ret = (self.acc >> (self.unread_bits - count)) & ((1u32 << count) - 1);
        self.unread_bits -= count;
        self.mask >>= count;
        Ok(ret)
    }

    /// Reads a single bit. Used by successive-approximation refinement.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.unread_bits == 0 {
            self.ensure_bits(1)?;
        }
        let ret = self.acc & self.mask != 0;
        self.unread_bits -= 1;
        self.mask >>= 1;
        Ok(ret)
    }

    /// The composition of RECEIVE and EXTEND from T.81 section F.2.2.1:
    /// reads `t` raw bits and sign-extends them, mapping the lower half of
    /// the unsigned range to negative values.
    pub fn receive_extend(&mut self, t: u8) -> Result<i32> {
        let t = i32::from(t);
        if self.unread_bits < t {
            self.ensure_bits(t)?;
        }
        self.unread_bits -= t;
        self.mask >>= t;
        let s = 1i32 << t;
        let mut x = ((self.acc >> self.unread_bits) as i32) & (s - 1);
        if x < s >> 1 {
            x += (-1 << t) + 1;
        }
        Ok(x)
    }

    /// Reads exactly `out.len()` raw bytes, stuffing-unaware. Gives back any
    /// lookup overshoot first so the bytes come from the true stream
    /// position. Used to consume literal restart-marker bytes.
    pub fn read_full(&mut self, out: &mut [u8]) -> Result<()> {
        if self.bytes.unreadable() != 0 {
            if self.unread_bits >= 8 {
                self.unread_overshoot();
            }
            self.bytes.clear_unreadable();
        }
        for slot in out.iter_mut() {
            *slot = self.bytes.read_byte()?;
        }
        Ok(())
    }

    /// Undoes the most recent stuffed-byte read, giving one byte of data
    /// back from bits to bytes. Huffman lookup needs 8 buffered bits, so
    /// decoding can overshoot by one byte (two raw bytes when the overshoot
    /// consumed a stuffed `FF 00` pair).
    pub(crate) fn unread_overshoot(&mut self) {
        self.bytes.unread();
        if self.unread_bits >= 8 {
            self.acc >>= 8;
            self.unread_bits -= 8;
            self.mask >>= 8;
        }
    }

    /// Clears the accumulator. Restart markers are byte-aligned, so the
    /// padding bits preceding one are discarded here.
    pub fn reset(&mut self) {
        self.acc = 0;
        self.mask = 0;
        self.unread_bits = 0;
    }

    /// Top 8 accumulator bits, for Huffman lookup-table probing.
    /// Requires at least 8 unread bits.
    pub(crate) fn lut_index(&self) -> usize {
        debug_assert!(self.unread_bits >= 8);
        ((self.acc >> (self.unread_bits - 8)) & 0xFF) as usize
    }

    pub(crate) fn consume_bits(&mut self, n: i32) {
        debug_assert!(self.unread_bits >= n);
        self.unread_bits -= n;
        self.mask >>= n;
    }
}
