use super::{code_book::Code, codec::EncodedResult, Symbol};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow<S> {
    pub symbol: S,
    pub frequency: u64,
    pub code: Code,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionStatistics {
    /// input length times the bits of an uncoded symbol
    pub original_bits: u64,
    /// logical bit length of the bitstream
    pub compressed_bits: u64,
}

impl CompressionStatistics {
    /// `compressed_bits / original_bits`, `None` for an empty input
    pub fn ratio(&self) -> Option<f64> {
        if self.original_bits == 0 {
            return None;
        }
        Some(self.compressed_bits as f64 / self.original_bits as f64)
    }
}

/// Read-only view of an encoding, rows ordered by descending frequency and
/// then ascending symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Report<S> {
    pub rows: Vec<ReportRow<S>>,
    pub statistics: CompressionStatistics,
}

impl<S: Symbol> Report<S> {
    pub fn new(result: &EncodedResult<S>) -> Self {
        let mut rows: Vec<ReportRow<S>> = result
            .symbol_frequencies()
            .into_iter()
            .filter_map(|sf| {
                result.code_book.get(&sf.symbol).map(|code| ReportRow {
                    symbol: sf.symbol,
                    frequency: sf.frequency,
                    code: code.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.symbol.cmp(&b.symbol)));
        let statistics = CompressionStatistics {
            original_bits: result.input_length() * S::bits_per_symbol() as u64,
            compressed_bits: result.bitstream.bit_length() as u64,
        };
        Self { rows, statistics }
    }
}
