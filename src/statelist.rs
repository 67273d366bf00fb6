//! Candidate state lists handed to the brute-force engine.
//!
//! The statistical state-space reducer (outside this crate's scope — see
//! SPEC_FULL.md §2 Non-goals) narrows the ~2^48 possible Crypto-1 states
//! down to two much shorter lists of *candidate* odd and even 24-bit
//! half-states, one of which is the true key's half. Brute force is the
//! exhaustive cross product of those two lists.

use crate::constants::MAX_BITSLICES;

/// Which half of the 48-bit state a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

/// Which of a MIFARE sector's two keys the attack is targeting. Carried
/// through the public API purely for logging and reporting — it has no
/// effect on the bit-sliced search itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
    A,
    B,
}

/// A candidate list for one parity half: 24-bit values, each a guess at
/// that half of the true key's LFSR state.
#[derive(Clone, Debug, Default)]
pub struct StateList {
    pub states: Vec<u32>,
}

impl StateList {
    pub fn new(states: Vec<u32>) -> Self {
        StateList { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Split into `MAX_BITSLICES`-sized chunks, padding the final chunk by
    /// repeating its last element so every chunk is exactly
    /// `MAX_BITSLICES` wide — the evaluator always processes a full 128
    /// lanes, and a padded lane just re-tests a state already covered
    /// elsewhere in the list.
    pub fn padded_chunks(&self) -> Vec<[u32; MAX_BITSLICES]> {
        if self.states.is_empty() {
            return Vec::new();
        }
        self.states
            .chunks(MAX_BITSLICES)
            .map(|chunk| {
                let mut block = [0u32; MAX_BITSLICES];
                let last = *chunk.last().unwrap();
                for (i, slot) in block.iter_mut().enumerate() {
                    *slot = chunk.get(i).copied().unwrap_or(last);
                }
                block
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_chunks_is_empty_for_empty_list() {
        let list = StateList::new(vec![]);
        assert!(list.padded_chunks().is_empty());
    }

    #[test]
    fn padded_chunks_pads_final_block_by_repeating_last() {
        let states: Vec<u32> = (0..(MAX_BITSLICES + 3) as u32).collect();
        let list = StateList::new(states.clone());
        let chunks = list.padded_chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), MAX_BITSLICES);
        assert_eq!(chunks[0][0], 0);
        // second chunk has 3 real entries then padding with the last real one
        assert_eq!(chunks[1][0], states[MAX_BITSLICES]);
        assert_eq!(chunks[1][2], states[MAX_BITSLICES + 2]);
        assert_eq!(chunks[1][3], states[MAX_BITSLICES + 2]);
        assert_eq!(chunks[1][MAX_BITSLICES - 1], states[MAX_BITSLICES + 2]);
    }

    #[test]
    fn padded_chunks_exact_multiple_has_no_repeats_needed() {
        let states: Vec<u32> = (0..(MAX_BITSLICES * 2) as u32).collect();
        let list = StateList::new(states.clone());
        let chunks = list.padded_chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1][MAX_BITSLICES - 1], states[2 * MAX_BITSLICES - 1]);
    }
}
