use threadpool::ThreadPool;

use super::{
    code_book::CodeBook,
    frequency::FrequencyTable,
    tree::{HuffmanTree, NodeKind},
    Symbol, SymbolFrequency,
};
use crate::{
    binary_stream::{BitWriter, Bitstream},
    error::Error,
    Result,
};

/// Everything produced by encoding one input sequence.
///
/// `tree` is `None` exactly when the input was empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedResult<S: Symbol> {
    pub tree: Option<HuffmanTree<S>>,
    pub code_book: CodeBook<S>,
    pub bitstream: Bitstream,
}

impl<S: Symbol> EncodedResult<S> {
    pub fn empty() -> Self {
        Self {
            tree: None,
            code_book: CodeBook::empty(),
            bitstream: Bitstream::empty(),
        }
    }

    pub fn decode(&self) -> Result<Vec<S>> {
        decode(&self.bitstream, self.tree.as_ref())
    }

    /// number of symbols that were encoded
    pub fn input_length(&self) -> u64 {
        self.tree.as_ref().map_or(0, HuffmanTree::weight)
    }

    /// Leaf weights of the tree in ascending symbol order, equal to the
    /// frequency table the tree was built from.
    pub fn symbol_frequencies(&self) -> Vec<SymbolFrequency<S>> {
        let mut frequencies: Vec<SymbolFrequency<S>> = self
            .tree
            .iter()
            .flat_map(|tree| tree.nodes().iter())
            .filter_map(|node| match node.kind {
                NodeKind::Leaf { symbol } => Some(SymbolFrequency::new(symbol, node.weight)),
                NodeKind::Inner { .. } => None,
            })
            .collect();
        frequencies.sort_by_key(|f| f.symbol);
        frequencies
    }
}

pub fn encode<S: Symbol>(symbols: &[S]) -> Result<EncodedResult<S>> {
    encode_counted(symbols, FrequencyTable::build(symbols))
}

/// Like [`encode`], but counts frequencies in chunks on `threadpool`.
pub fn encode_in_parallel<S: Symbol>(
    symbols: &[S],
    threadpool: &ThreadPool,
    chunk_size: usize,
) -> Result<EncodedResult<S>> {
    encode_counted(
        symbols,
        FrequencyTable::count_in_parallel(symbols, threadpool, chunk_size),
    )
}

fn encode_counted<S: Symbol>(symbols: &[S], table: FrequencyTable<S>) -> Result<EncodedResult<S>> {
    if table.is_empty() {
        log::debug!("Empty input, nothing to encode");
        return Ok(EncodedResult::empty());
    }
    let tree = HuffmanTree::build(&table)?;
    let code_book = CodeBook::generate(&tree);
    let bitstream = encode_with_code_book(symbols, &code_book)?;
    log::info!(
        "Encoded {} symbols ({} distinct) into {} bits",
        symbols.len(),
        table.len(),
        bitstream.bit_length()
    );
    Ok(EncodedResult {
        tree: Some(tree),
        code_book,
        bitstream,
    })
}

pub fn encode_with_code_book<S: Symbol>(
    symbols: &[S],
    code_book: &CodeBook<S>,
) -> Result<Bitstream> {
    let mut writer = BitWriter::default();
    for symbol in symbols {
        let code = code_book
            .get(symbol)
            .ok_or_else(|| Error::UnknownSymbol(format!("{:?}", symbol)))?;
        writer.write_bits_from_bytes(code.pattern(), code.len())?;
    }
    Ok(writer.into_bitstream()?)
}

/// Walks the tree from the root for every bit, 0 to the left and 1 to the
/// right, and emits a symbol on reaching a leaf.
pub fn decode<S: Symbol>(bitstream: &Bitstream, tree: Option<&HuffmanTree<S>>) -> Result<Vec<S>> {
    if bitstream.is_empty() {
        return Ok(Vec::new());
    }
    let tree = tree.ok_or(Error::EmptyTree)?;
    let root_index = tree.root();
    let mut reader = bitstream.reader();
    let mut symbols = Vec::new();
    let mut current_index = root_index;

    loop {
        let take_right = match reader.read_bit() {
            Ok(bit) => bit,
            Err(Error::EndOfStream) if current_index == root_index => break,
            Err(Error::EndOfStream) => {
                return Err(Error::TruncatedCode {
                    bit_position: reader.position(),
                })
            }
            Err(error) => return Err(error),
        };
        let node = tree
            .node(current_index)
            .ok_or(Error::MalformedTree("node index out of range"))?;
        match node.kind {
            NodeKind::Inner { left, right } => {
                current_index = if take_right { right } else { left };
                let child = tree
                    .node(current_index)
                    .ok_or(Error::MalformedTree("child index out of range"))?;
                if let NodeKind::Leaf { symbol } = child.kind {
                    symbols.push(symbol);
                    current_index = root_index;
                }
            }
            // a leaf at the root owns the single code `0`
            NodeKind::Leaf { symbol } if !take_right => symbols.push(symbol),
            NodeKind::Leaf { .. } => {
                return Err(Error::UnassignedCode {
                    bit_position: reader.position(),
                })
            }
        }
    }

    log::debug!(
        "Decoded {} symbols from {} bits",
        symbols.len(),
        bitstream.bit_length()
    );
    Ok(symbols)
}

#[cfg(test)]
mod test {
    use threadpool::ThreadPool;

    use super::{decode, encode, encode_in_parallel, encode_with_code_book};
    use crate::{
        binary_stream::Bitstream,
        error::Error,
        huffman::{frequency::FrequencyTable, tree::HuffmanTree, SymbolFrequency},
    };

    #[test]
    fn test_encode_two_symbol_example() {
        let result = encode(b"aab").unwrap();
        assert_eq!(result.bitstream.bytes(), &[0b1100_0000]);
        assert_eq!(result.bitstream.bit_length(), 3);
        assert_eq!(decode(&result.bitstream, result.tree.as_ref()).unwrap(), b"aab");
        assert_eq!(result.input_length(), 3);
        assert_eq!(
            result.symbol_frequencies(),
            vec![SymbolFrequency::new(b'a', 2), SymbolFrequency::new(b'b', 1)]
        );
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let result = encode::<u8>(&[]).unwrap();
        assert!(result.tree.is_none());
        assert_eq!(result.input_length(), 0);
        assert!(result.symbol_frequencies().is_empty());
        assert!(result.code_book.is_empty());
        assert!(result.bitstream.is_empty());
        assert_eq!(result.decode().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_single_repeated_symbol_uses_one_bit_each() {
        let result = encode(b"qqqqq").unwrap();
        assert_eq!(result.bitstream.bit_length(), 5);
        assert_eq!(result.bitstream.bytes(), &[0]);
        assert_eq!(result.decode().unwrap(), b"qqqqq");
    }

    #[test]
    fn test_encode_rejects_unknown_symbol() {
        let result = encode(b"abc").unwrap();
        let error = encode_with_code_book(b"abd", &result.code_book).unwrap_err();
        assert!(matches!(error, Error::UnknownSymbol(symbol) if symbol == "100"));
    }

    #[test]
    fn test_decode_detects_truncated_code() {
        // c = 0, a = 10, b = 11
        let tree = HuffmanTree::build(&FrequencyTable::build(b"abcc")).unwrap();
        let bitstream = Bitstream::new(vec![0b0100_0000], 2).unwrap();
        let error = decode(&bitstream, Some(&tree)).unwrap_err();
        assert!(matches!(error, Error::TruncatedCode { bit_position: 2 }));
    }

    #[test]
    fn test_decode_detects_unassigned_code_of_single_leaf_tree() {
        let tree = HuffmanTree::build(&FrequencyTable::build(b"q")).unwrap();
        let bitstream = Bitstream::new(vec![0b0100_0000], 2).unwrap();
        let error = decode(&bitstream, Some(&tree)).unwrap_err();
        assert!(matches!(error, Error::UnassignedCode { bit_position: 2 }));
    }

    #[test]
    fn test_decode_without_tree() {
        let bitstream = Bitstream::new(vec![0b1000_0000], 1).unwrap();
        let error = decode::<u8>(&bitstream, None).unwrap_err();
        assert!(matches!(error, Error::EmptyTree));
        assert_eq!(decode::<u8>(&Bitstream::empty(), None).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_ignores_padding() {
        let tree = HuffmanTree::build(&FrequencyTable::build(b"abcc")).unwrap();
        // 0 10 11 followed by padding that would decode as c
        let bitstream = Bitstream::new(vec![0b0101_1000], 5).unwrap();
        assert_eq!(decode(&bitstream, Some(&tree)).unwrap(), b"cab");
    }

    #[test]
    fn test_parallel_encode_equals_sequential_encode() {
        let input: Vec<u8> = b"the quick brown fox jumps over the lazy dog"
            .iter()
            .copied()
            .cycle()
            .take(5_000)
            .collect();
        let threadpool = ThreadPool::new(3);
        let parallel = encode_in_parallel(&input, &threadpool, 128).unwrap();
        let sequential = encode(&input).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.decode().unwrap(), input);
    }
}
