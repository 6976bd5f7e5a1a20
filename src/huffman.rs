use std::fmt::Debug;
use std::hash::Hash;

pub mod code_book;
pub mod codec;
pub mod frequency;
pub mod payload;
pub mod report;
pub mod tree;

/// A unit of the input alphabet.
///
/// The total order defines the canonical seeding order of the tree build,
/// `WIDTH` the number of bytes a symbol occupies in a payload.
pub trait Symbol: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    const WIDTH: usize;

    fn to_bits(self) -> u32;

    fn from_bits(bits: u32) -> Option<Self>;

    fn bits_per_symbol() -> usize {
        Self::WIDTH * 8
    }
}

impl Symbol for u8 {
    const WIDTH: usize = 1;

    fn to_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        u8::try_from(bits).ok()
    }
}

impl Symbol for u16 {
    const WIDTH: usize = 2;

    fn to_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        u16::try_from(bits).ok()
    }
}

impl Symbol for char {
    const WIDTH: usize = 4;

    fn to_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        char::from_u32(bits)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolFrequency<S> {
    pub symbol: S,
    pub frequency: u64,
}

impl<S> SymbolFrequency<S> {
    pub fn new(symbol: S, frequency: u64) -> Self {
        Self { symbol, frequency }
    }
}

impl<S> From<(S, u64)> for SymbolFrequency<S> {
    fn from(value: (S, u64)) -> Self {
        Self::new(value.0, value.1)
    }
}
