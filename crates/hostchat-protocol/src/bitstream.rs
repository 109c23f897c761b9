//! MSB-first bit packing.
//!
//! Fields are written with exactly as many bits as their range needs, so
//! the stream is not byte-aligned between fields. The final byte is
//! zero-padded; readers never look at the padding.

use crate::ProtocolError;

/// Number of bits needed to hold any value in `0..=max`.
pub fn bits_for(max: u64) -> u32 {
    u64::BITS - max.leading_zeros()
}

/// Writes values bit by bit into a growable buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, count: u32) {
        debug_assert!(count <= u64::BITS);
        for shift in (0..count).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }

    /// Writes each byte as 8 bits.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_bits(u64::from(byte), 8);
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Consumes the writer and returns the packed bytes.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn push_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }
}

/// Reads values bit by bit from a borrowed buffer.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bits left before the end of the buffer (padding included).
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Reads `count` bits as an unsigned value, most significant first.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Truncated`] if fewer than `count` bits
    /// remain. Nothing is consumed in that case.
    pub fn read_bits(&mut self, count: u32) -> Result<u64, ProtocolError> {
        debug_assert!(count <= u64::BITS);
        let remaining = self.remaining_bits();
        if count as usize > remaining {
            return Err(ProtocolError::Truncated {
                needed: count,
                remaining,
            });
        }
        let mut value = 0u64;
        for _ in 0..count {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u64::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Reads `len` bytes of 8 bits each.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Truncated`] if the stream ends first.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        let needed = len * 8;
        let remaining = self.remaining_bits();
        if needed > remaining {
            return Err(ProtocolError::Truncated {
                needed: needed as u32,
                remaining,
            });
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.read_bits(8)? as u8);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_for_ranges() {
        assert_eq!(bits_for(0), 0);
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(4), 3);
        assert_eq!(bits_for(32), 6);
        assert_eq!(bits_for(128), 8);
    }

    #[test]
    fn test_writer_packs_msb_first() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3);
        w.write_bits(0b1, 1);
        assert_eq!(w.bit_len(), 4);
        assert_eq!(w.finish(), vec![0b1011_0000]);
    }

    #[test]
    fn test_writer_spans_byte_boundary() {
        let mut w = BitWriter::new();
        w.write_bits(0, 3);
        w.write_bytes(&[0xFF]);
        assert_eq!(w.finish(), vec![0b0001_1111, 0b1110_0000]);
    }

    #[test]
    fn test_reader_reads_back_unaligned_fields() {
        let mut w = BitWriter::new();
        w.write_bits(5, 3);
        w.write_bits(u64::MAX, 64);
        w.write_bytes(b"ok");
        let bytes = w.finish();

        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_bits(3).unwrap(), 5);
        assert_eq!(r.read_bits(64).unwrap(), u64::MAX);
        assert_eq!(r.read_bytes(2).unwrap(), b"ok");
    }

    #[test]
    fn test_reader_reports_truncation_without_consuming() {
        let mut r = BitReader::new(&[0xAB]);
        let err = r.read_bits(9).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Truncated { needed: 9, remaining: 8 }
        ));
        assert_eq!(r.remaining_bits(), 8);
        assert_eq!(r.read_bits(8).unwrap(), 0xAB);
    }
}
