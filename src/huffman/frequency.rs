use std::collections::HashMap;
use std::sync::{mpsc, Arc};

use threadpool::ThreadPool;

use super::{Symbol, SymbolFrequency};
use crate::{error::Error, Result};

/// Occurrence count of every distinct symbol of an input sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable<S: Symbol> {
    counts: HashMap<S, u64>,
    total: u64,
}

impl<S: Symbol> FrequencyTable<S> {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }

    pub fn build(symbols: &[S]) -> Self {
        symbols.iter().copied().collect()
    }

    /// Counts `symbols` in chunks of `chunk_size` on `threadpool` and merges
    /// the partial tables.
    pub fn count_in_parallel(symbols: &[S], threadpool: &ThreadPool, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        if symbols.len() <= chunk_size {
            return Self::build(symbols);
        }
        let (sender, receiver) = mpsc::channel();
        let mut job_count = 0;
        for chunk in symbols.chunks(chunk_size) {
            let chunk: Arc<[S]> = Arc::from(chunk);
            let sender = sender.clone();
            threadpool.execute(move || {
                // the receiver outlives every job
                let _ = sender.send(Self::build(&chunk));
            });
            job_count += 1;
        }
        drop(sender);
        log::debug!(
            "Counting {} symbols in {} jobs of {} symbols",
            symbols.len(),
            job_count,
            chunk_size
        );
        receiver
            .iter()
            .take(job_count)
            .fold(Self::new(), |mut table, partial| {
                table.merge(&partial);
                table
            })
    }

    /// Rebuilds a table from (symbol, count) pairs, e.g. read from a payload.
    pub fn from_counts(pairs: impl IntoIterator<Item = (S, u64)>) -> Result<Self> {
        let mut table = Self::new();
        for (symbol, count) in pairs {
            if count == 0 {
                return Err(Error::MalformedPayload("symbol with zero frequency"));
            }
            if table.counts.insert(symbol, count).is_some() {
                return Err(Error::MalformedPayload("symbol listed twice"));
            }
            table.total = table
                .total
                .checked_add(count)
                .ok_or(Error::MalformedPayload("total frequency overflows"))?;
        }
        Ok(table)
    }

    pub fn increment_symbol(&mut self, symbol: S) {
        *self.counts.entry(symbol).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        for (&symbol, &count) in &other.counts {
            *self.counts.entry(symbol).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn get(&self, symbol: &S) -> Option<u64> {
        self.counts.get(symbol).copied()
    }

    /// number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// sum of all counts, equal to the length of the counted input
    pub fn total(&self) -> u64 {
        self.total
    }

    /// All entries in canonical order, ascending by symbol.
    pub fn to_symbol_frequencies(&self) -> Vec<SymbolFrequency<S>> {
        let mut frequencies: Vec<SymbolFrequency<S>> = self
            .counts
            .iter()
            .map(|(&symbol, &frequency)| SymbolFrequency::from((symbol, frequency)))
            .collect();
        frequencies.sort_by_key(|f| f.symbol);
        frequencies
    }
}

impl<S: Symbol> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol> FromIterator<S> for FrequencyTable<S> {
    fn from_iter<T: IntoIterator<Item = S>>(symbols: T) -> Self {
        let mut table = Self::new();
        for symbol in symbols {
            table.increment_symbol(symbol);
        }
        table
    }
}
