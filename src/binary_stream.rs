use std::io::{self, Write};

use crate::{error::Error, Result};

/// Packed bits, MSB-first, together with the number of bits carrying data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitstream {
    bytes: Vec<u8>,
    bit_length: usize,
}

impl Bitstream {
    /// Wraps an already packed buffer.
    ///
    /// The buffer must hold exactly `ceil(bit_length / 8)` bytes and all
    /// padding bits of the final byte must be zero.
    pub fn new(bytes: Vec<u8>, bit_length: usize) -> Result<Self> {
        if bytes.len() != bit_length.div_ceil(8) {
            return Err(Error::MalformedPayload(
                "byte length does not match declared bit length",
            ));
        }
        let bits_in_last_byte = bit_length % 8;
        if bits_in_last_byte != 0 {
            let last_byte = bytes[bytes.len() - 1];
            if last_byte & (0xFF >> bits_in_last_byte) != 0 {
                return Err(Error::MalformedPayload("padding bits are not zero"));
            }
        }
        Ok(Self { bytes, bit_length })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    pub fn is_empty(&self) -> bool {
        self.bit_length == 0
    }

    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(self)
    }
}

/// State for writing individual bits to a Writer
pub struct BitWriter<W: Write> {
    /// the underlying output stream
    writer: W,
    /// buffer of individual bits not yet written
    buffer: u8,
    /// how many bits are waiting to be written
    buffer_space_used: u8,
    /// number of data bits accepted so far
    bit_length: usize,
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> BitWriter<W> {
        BitWriter {
            writer,
            buffer: 0,
            buffer_space_used: 0,
            bit_length: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.buffer |= 0b1000_0000 >> self.buffer_space_used;
        }
        self.buffer_space_used += 1;
        self.bit_length += 1;
        if self.buffer_space_used == 8 {
            self.writer.write_all(&[self.buffer])?;
            self.buffer_space_used = 0;
            self.buffer = 0; // depended upon in finish()
        }
        Ok(())
    }

    pub fn write_bits(&mut self, bits: &[bool]) -> io::Result<()> {
        for &bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// write a non-byte-aligned number of bits
    ///
    /// buf: a byte array containing a contiguous block, MSB-first
    /// count: how many bits of buf to write
    pub fn write_bits_from_bytes(&mut self, buf: &[u8], count: usize) -> io::Result<()> {
        if count > buf.len() * 8 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "bit count exceeds the provided buffer",
            ));
        }
        let mut remaining_bits_offset = 0;
        if self.buffer_space_used == 0 {
            // whole bytes can bypass the bit buffer while aligned
            let quick_byte_count = count / 8;
            self.writer.write_all(&buf[..quick_byte_count])?;
            remaining_bits_offset = quick_byte_count * 8;
            self.bit_length += remaining_bits_offset;
        }
        for bit_index in remaining_bits_offset..count {
            let bit = buf[bit_index / 8] & (0b1000_0000 >> (bit_index % 8)) != 0;
            self.write_bit(bit)?;
        }
        Ok(())
    }

    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Writes any buffered bits with 0 padding to the next byte, flushes the
    /// underlying writer and hands it back with the exact number of data bits.
    pub fn finish(mut self) -> io::Result<(W, usize)> {
        if self.buffer_space_used != 0 {
            self.writer.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.buffer_space_used = 0;
        }
        self.writer.flush()?;
        Ok((self.writer, self.bit_length))
    }
}

impl BitWriter<Vec<u8>> {
    pub fn into_bitstream(self) -> io::Result<Bitstream> {
        let (bytes, bit_length) = self.finish()?;
        Ok(Bitstream { bytes, bit_length })
    }
}

impl Default for BitWriter<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Reads the data bits of a [`Bitstream`] one at a time
pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_length: usize,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bitstream: &'a Bitstream) -> Self {
        Self {
            bytes: &bitstream.bytes,
            bit_length: bitstream.bit_length,
            position: 0,
        }
    }

    /// Fails with [`Error::EndOfStream`] once the declared bit length is
    /// consumed, even if padding bits remain in the last byte.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.bit_length {
            return Err(Error::EndOfStream);
        }
        let byte = self.bytes[self.position / 8];
        let bit = byte & (0b1000_0000 >> (self.position % 8)) != 0;
        self.position += 1;
        Ok(bit)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bit_length - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.bit_length
    }
}
