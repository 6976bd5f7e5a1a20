//! Self-describing serialized form of an [`EncodedResult`].
//!
//! Integers are little-endian, symbols big-endian with `Symbol::WIDTH` bytes:
//!
//! ```text
//! magic          4 bytes  "HUFC"
//! version        u8
//! symbol width   u8
//! entry count    u64
//! entries        entry count x (symbol, frequency: u64)
//! bit length     u64
//! data length    u64      ceil(bit length / 8)
//! data           data length bytes
//! ```
//!
//! The frequency table is stored instead of the tree shape. Tree building is
//! deterministic, so the decoder rebuilds the very tree the encoder used.

use std::io::{self, Cursor, Read, Write};

use super::{
    code_book::CodeBook,
    codec::EncodedResult,
    frequency::FrequencyTable,
    tree::HuffmanTree,
    Symbol,
};
use crate::{binary_stream::Bitstream, error::Error, logger, Result};

pub const MAGIC: &[u8; 4] = b"HUFC";
pub const VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadHeader {
    pub version: u8,
    pub symbol_width: u8,
    pub entry_count: u64,
    pub bit_length: u64,
    pub data_length: u64,
}

fn write_symbol<S: Symbol, W: Write>(writer: &mut W, symbol: S) -> io::Result<()> {
    let bytes = symbol.to_bits().to_be_bytes();
    writer.write_all(&bytes[bytes.len() - S::WIDTH..])
}

pub fn write_payload<S: Symbol, W: Write>(
    result: &EncodedResult<S>,
    writer: &mut W,
) -> io::Result<()> {
    let frequencies = result.symbol_frequencies();
    let bitstream = &result.bitstream;
    let header = PayloadHeader {
        version: VERSION,
        symbol_width: S::WIDTH as u8,
        entry_count: frequencies.len() as u64,
        bit_length: bitstream.bit_length() as u64,
        data_length: bitstream.bytes().len() as u64,
    };
    logger::log_payload_header(&header);

    writer.write_all(MAGIC)?;
    writer.write_all(&[header.version, header.symbol_width])?;
    writer.write_all(&header.entry_count.to_le_bytes())?;
    for sf in &frequencies {
        write_symbol(writer, sf.symbol)?;
        writer.write_all(&sf.frequency.to_le_bytes())?;
    }
    writer.write_all(&header.bit_length.to_le_bytes())?;
    writer.write_all(&header.data_length.to_le_bytes())?;
    writer.write_all(bitstream.bytes())
}

pub fn serialize<S: Symbol>(result: &EncodedResult<S>) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_payload(result, &mut bytes).expect("writing into a Vec does not fail");
    bytes
}

fn read_array<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u8; N]> {
    let mut buffer = [0u8; N];
    cursor
        .read_exact(&mut buffer)
        .map_err(|_| Error::MalformedPayload("payload ends early"))?;
    Ok(buffer)
}

fn read_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array(cursor)?))
}

fn read_symbol<S: Symbol>(cursor: &mut Cursor<&[u8]>) -> Result<S> {
    let mut buffer = [0u8; 4];
    cursor
        .read_exact(&mut buffer[4 - S::WIDTH..])
        .map_err(|_| Error::MalformedPayload("payload ends early"))?;
    S::from_bits(u32::from_be_bytes(buffer)).ok_or(Error::MalformedPayload("invalid symbol value"))
}

fn remaining(cursor: &Cursor<&[u8]>) -> u64 {
    cursor.get_ref().len() as u64 - cursor.position()
}

fn read_header_start<S: Symbol>(cursor: &mut Cursor<&[u8]>) -> Result<(u8, u8, u64)> {
    let magic: [u8; 4] = read_array(cursor)?;
    if &magic != MAGIC {
        return Err(Error::MalformedPayload("unknown magic number"));
    }
    let [version, symbol_width] = read_array::<2>(cursor)?;
    if version != VERSION {
        return Err(Error::MalformedPayload("unsupported version"));
    }
    if symbol_width as usize != S::WIDTH {
        return Err(Error::MalformedPayload("symbol width does not match"));
    }
    let entry_count = read_u64(cursor)?;
    if entry_count > remaining(cursor) / (S::WIDTH as u64 + 8) {
        return Err(Error::MalformedPayload("payload ends early"));
    }
    Ok((version, symbol_width, entry_count))
}

/// Reads a payload and rebuilds tree and code book from its frequency table.
pub fn deserialize<S: Symbol>(bytes: &[u8]) -> Result<EncodedResult<S>> {
    let mut cursor = Cursor::new(bytes);
    let (version, symbol_width, entry_count) = read_header_start::<S>(&mut cursor)?;

    let mut pairs = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        let symbol = read_symbol::<S>(&mut cursor)?;
        let frequency = read_u64(&mut cursor)?;
        pairs.push((symbol, frequency));
    }

    let bit_length = read_u64(&mut cursor)?;
    let data_length = read_u64(&mut cursor)?;
    logger::log_payload_header(&PayloadHeader {
        version,
        symbol_width,
        entry_count,
        bit_length,
        data_length,
    });
    if data_length != bit_length.div_ceil(8) {
        return Err(Error::MalformedPayload(
            "data length does not match declared bit length",
        ));
    }
    if data_length != remaining(&cursor) {
        return Err(Error::MalformedPayload(
            "data length does not match the remaining payload",
        ));
    }
    let bit_length = usize::try_from(bit_length)
        .map_err(|_| Error::MalformedPayload("bit length exceeds addressable memory"))?;
    let position = cursor.position() as usize;
    let bitstream = Bitstream::new(bytes[position..].to_vec(), bit_length)?;

    let table = FrequencyTable::from_counts(pairs)?;
    if table.is_empty() {
        if !bitstream.is_empty() {
            return Err(Error::MalformedPayload("data present without symbols"));
        }
        return Ok(EncodedResult::empty());
    }
    let tree = HuffmanTree::build(&table)?;
    let code_book = CodeBook::generate(&tree);
    if code_book.encoded_bit_length(&table) != bit_length as u64 {
        return Err(Error::MalformedPayload(
            "bit length does not match the frequency table",
        ));
    }
    Ok(EncodedResult {
        tree: Some(tree),
        code_book,
        bitstream,
    })
}

/// Deserializes and decodes, checking the number of decoded symbols against
/// the frequency table.
pub fn decompress<S: Symbol>(bytes: &[u8]) -> Result<Vec<S>> {
    let result = deserialize::<S>(bytes)?;
    let symbols = result.decode()?;
    let expected = result.input_length();
    let actual = symbols.len() as u64;
    if actual != expected {
        return Err(Error::DecodedLengthMismatch { expected, actual });
    }
    Ok(symbols)
}

#[cfg(test)]
mod test {
    use super::{decompress, deserialize, serialize, MAGIC};
    use crate::{error::Error, huffman::codec::encode};

    const TEST_INPUT: &[u8] = b"abcc";

    fn assert_malformed<T: std::fmt::Debug>(result: crate::Result<T>) {
        assert!(
            matches!(result, Err(Error::MalformedPayload(_))),
            "expected malformed payload, got {:?}",
            result
        );
    }

    #[test]
    fn test_payload_layout() {
        let bytes = serialize(&encode(TEST_INPUT).unwrap());
        let mut expected = Vec::new();
        expected.extend_from_slice(MAGIC);
        expected.extend_from_slice(&[1, 1]);
        expected.extend_from_slice(&3u64.to_le_bytes());
        for (symbol, frequency) in [(b'a', 1u64), (b'b', 1), (b'c', 2)] {
            expected.push(symbol);
            expected.extend_from_slice(&frequency.to_le_bytes());
        }
        expected.extend_from_slice(&6u64.to_le_bytes());
        expected.extend_from_slice(&1u64.to_le_bytes());
        // a = 10, b = 11, c = 0
        expected.push(0b1011_0000);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_payload_round_trip() {
        let result = encode(TEST_INPUT).unwrap();
        let restored = deserialize::<u8>(&serialize(&result)).unwrap();
        assert_eq!(restored, result);
        assert_eq!(decompress::<u8>(&serialize(&result)).unwrap(), TEST_INPUT);
    }

    #[test]
    fn test_empty_payload_round_trip() {
        let bytes = serialize(&encode::<u8>(&[]).unwrap());
        assert_eq!(bytes.len(), 4 + 2 + 8 + 8 + 8);
        let restored = deserialize::<u8>(&bytes).unwrap();
        assert!(restored.tree.is_none());
        assert_eq!(decompress::<u8>(&bytes).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_char_payload_round_trip() {
        let input: Vec<char> = "grüße, 世界".chars().collect();
        let bytes = serialize(&encode(&input).unwrap());
        assert_eq!(decompress::<char>(&bytes).unwrap(), input);
    }

    #[test]
    fn test_rejects_wrong_header() {
        let bytes = serialize(&encode(TEST_INPUT).unwrap());
        let mut wrong_magic = bytes.clone();
        wrong_magic[0] = b'X';
        assert_malformed(deserialize::<u8>(&wrong_magic));
        let mut wrong_version = bytes.clone();
        wrong_version[4] = 2;
        assert_malformed(deserialize::<u8>(&wrong_version));
        assert_malformed(deserialize::<u16>(&bytes));
    }

    #[test]
    fn test_rejects_truncated_and_trailing_bytes() {
        let bytes = serialize(&encode(TEST_INPUT).unwrap());
        for length in 0..bytes.len() {
            assert_malformed(deserialize::<u8>(&bytes[..length]));
        }
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert_malformed(deserialize::<u8>(&trailing));
    }

    #[test]
    fn test_rejects_zero_frequency() {
        let mut bytes = serialize(&encode(TEST_INPUT).unwrap());
        // frequency of the first entry
        bytes[15..23].copy_from_slice(&0u64.to_le_bytes());
        assert_malformed(deserialize::<u8>(&bytes));
    }

    #[test]
    fn test_rejects_non_zero_padding() {
        let mut bytes = serialize(&encode(TEST_INPUT).unwrap());
        let last = bytes.len() - 1;
        bytes[last] |= 0b0000_0001;
        assert_malformed(deserialize::<u8>(&bytes));
    }

    #[test]
    fn test_rejects_invalid_char() {
        let mut bytes = serialize(&encode(&['a']).unwrap());
        bytes[14..18].copy_from_slice(&0xD800u32.to_be_bytes());
        assert_malformed(deserialize::<char>(&bytes));
    }

    #[test]
    fn test_rejects_bit_length_disagreeing_with_code_lengths() {
        let mut bytes = serialize(&encode(TEST_INPUT).unwrap());
        // 7 bits still fit the single data byte, the codes only need 6
        bytes[41..49].copy_from_slice(&7u64.to_le_bytes());
        assert_malformed(deserialize::<u8>(&bytes));
    }

    #[test]
    fn test_rejects_data_without_symbols() {
        let mut bytes = serialize(&encode::<u8>(&[]).unwrap());
        bytes[14..22].copy_from_slice(&1u64.to_le_bytes());
        bytes[22..30].copy_from_slice(&1u64.to_le_bytes());
        bytes.push(0b1000_0000);
        assert_malformed(deserialize::<u8>(&bytes));
    }

    #[test]
    fn test_rejects_duplicate_symbol() {
        let mut bytes = serialize(&encode(TEST_INPUT).unwrap());
        // second entry claims `a` as well
        bytes[23] = b'a';
        assert_malformed(deserialize::<u8>(&bytes));
    }

    #[test]
    fn test_decompress_detects_decoded_length_mismatch() {
        let mut bytes = serialize(&encode(TEST_INPUT).unwrap());
        let last = bytes.len() - 1;
        // 10 11 0 0 becomes 00 11 0 0, five symbols instead of four
        bytes[last] ^= 0b1000_0000;
        let error = decompress::<u8>(&bytes).unwrap_err();
        assert!(matches!(
            error,
            Error::DecodedLengthMismatch {
                expected: 4,
                actual: 5
            }
        ));
    }
}
