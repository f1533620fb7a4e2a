//! Search space enumeration
//!
//! A [`Keyspace`] is the cartesian power of a charset at a fixed length.
//! Candidates come out in odometer order: the rightmost position advances
//! fastest, and each position walks the charset in the order it was given.
//! The order is fully deterministic, so the attempt count needed to reach a
//! given candidate is known in advance (see [`Keyspace::position`]).

/// All strings of one length over one charset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyspace {
    symbols: Vec<char>,
    length: usize,
}

impl Keyspace {
    /// Create a keyspace over the characters of `charset`
    pub fn new(charset: &str, length: usize) -> Self {
        Self {
            symbols: charset.chars().collect(),
            length,
        }
    }

    /// Number of candidates, `|charset| ^ length`, or `None` if it overflows
    pub fn size(&self) -> Option<u64> {
        let length = u32::try_from(self.length).ok()?;
        (self.symbols.len() as u64).checked_pow(length)
    }

    /// 1-based attempt number at which `candidate` is produced
    ///
    /// Returns `None` when the candidate is not part of this keyspace (wrong
    /// length or a symbol outside the charset).
    pub fn position(&self, candidate: &str) -> Option<u64> {
        let base = self.symbols.len() as u64;
        let mut count = 0usize;
        let mut index: u64 = 0;
        for c in candidate.chars() {
            let digit = self.symbols.iter().position(|s| *s == c)? as u64;
            index = index.checked_mul(base)?.checked_add(digit)?;
            count += 1;
        }
        if count != self.length {
            return None;
        }
        index.checked_add(1)
    }

    /// Fresh iterator over every candidate, starting from the first
    pub fn candidates(&self) -> Candidates<'_> {
        let exhausted = self.symbols.is_empty() && self.length > 0;
        Candidates {
            symbols: &self.symbols,
            indices: vec![0; self.length],
            exhausted,
        }
    }
}

/// Lazy odometer over a [`Keyspace`]
///
/// Holds one index per position; memory use is independent of the space size.
#[derive(Debug)]
pub struct Candidates<'a> {
    symbols: &'a [char],
    indices: Vec<usize>,
    exhausted: bool,
}

impl Candidates<'_> {
    fn advance(&mut self) {
        for slot in self.indices.iter_mut().rev() {
            *slot += 1;
            if *slot < self.symbols.len() {
                return;
            }
            *slot = 0;
        }
        // Every position wrapped
        self.exhausted = true;
    }
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        let candidate: String = self.indices.iter().map(|&i| self.symbols[i]).collect();
        self.advance();
        Some(candidate)
    }
}
