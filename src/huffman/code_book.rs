use std::collections::BTreeMap;
use std::fmt;

use super::{
    frequency::FrequencyTable,
    tree::{HuffmanTree, NodeKind},
    Symbol,
};
use crate::logger;

/// A code word, packed MSB-first like the bitstream it is written to
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Code {
    pattern: Vec<u8>,
    length: usize,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: bool) {
        if self.length % 8 == 0 {
            self.pattern.push(0);
        }
        if bit {
            self.pattern[self.length / 8] |= 0b1000_0000 >> (self.length % 8);
        }
        self.length += 1;
    }

    /// copy of this code extended by one bit
    pub fn with(&self, bit: bool) -> Self {
        let mut code = self.clone();
        code.push(bit);
        code
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.length {
            return None;
        }
        Some(self.pattern[index / 8] & (0b1000_0000 >> (index % 8)) != 0)
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).filter_map(|index| self.bit(index))
    }

    /// packed bits, to be written with `BitWriter::write_bits_from_bytes`
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.length <= other.length && self.bits().zip(other.bits()).all(|(a, b)| a == b)
    }
}

impl From<&[bool]> for Code {
    fn from(bits: &[bool]) -> Self {
        let mut code = Code::new();
        for &bit in bits {
            code.push(bit);
        }
        code
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Code word of every symbol, iterated in ascending symbol order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBook<S: Symbol> {
    codes: BTreeMap<S, Code>,
}

impl<S: Symbol> CodeBook<S> {
    pub fn empty() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Walks every root-to-leaf path, 0 for a left and 1 for a right edge.
    /// A tree consisting of a single leaf assigns it the code `0`.
    pub fn generate(tree: &HuffmanTree<S>) -> Self {
        let mut codes = BTreeMap::new();
        let mut node_index_stack = vec![(tree.root(), Code::new())];
        while let Some((index, code)) = node_index_stack.pop() {
            match tree.nodes()[index].kind {
                NodeKind::Leaf { symbol } => {
                    let code = if code.is_empty() { code.with(false) } else { code };
                    codes.insert(symbol, code);
                }
                NodeKind::Inner { left, right } => {
                    node_index_stack.push((right, code.with(true)));
                    node_index_stack.push((left, code.with(false)));
                }
            }
        }
        let code_book = Self { codes };
        log::debug!(
            "Generated {} code words, longest has {} bits",
            code_book.len(),
            code_book.max_code_length()
        );
        logger::log_code_book(&code_book);
        code_book
    }

    pub fn get(&self, symbol: &S) -> Option<&Code> {
        self.codes.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Code)> {
        self.codes.iter()
    }

    pub fn max_code_length(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// Number of bits needed to encode the input `table` was counted from.
    pub fn encoded_bit_length(&self, table: &FrequencyTable<S>) -> u64 {
        table
            .to_symbol_frequencies()
            .iter()
            .filter_map(|sf| {
                self.get(&sf.symbol)
                    .map(|code| sf.frequency.saturating_mul(code.len() as u64))
            })
            .fold(0, u64::saturating_add)
    }

    pub fn is_prefix_free(&self) -> bool {
        // a prefix sorts directly before some code it prefixes
        let mut codes: Vec<Vec<bool>> = self.codes.values().map(|c| c.bits().collect()).collect();
        codes.sort();
        codes.windows(2).all(|pair| !pair[1].starts_with(&pair[0]))
    }
}

impl<S: Symbol> FromIterator<(S, Code)> for CodeBook<S> {
    fn from_iter<T: IntoIterator<Item = (S, Code)>>(codes: T) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }
}
