//! Shared constants for the hardnested bit-sliced brute-force kernel.

/// Number of parallel lanes evaluated per bit-sliced step.
pub const MAX_BITSLICES: usize = 128;

/// Size of a Crypto-1 LFSR state, in bits.
pub const STATE_SIZE: usize = 48;

/// Number of keystream bits consumed per test nonce (bytes 1..3 of the nonce).
pub const KEYSTREAM_SIZE: usize = 24;

/// Size of the evaluator's working window: the state plus the keystream tail
/// it is shifted into one bit at a time.
pub const WINDOW_SIZE: usize = KEYSTREAM_SIZE + STATE_SIZE;

/// Mask selecting the odd-state bits that feed the feedback polynomial
/// (`evenparity32(odd & ODD_FEEDBACK_MASK)`).
pub const ODD_FEEDBACK_MASK: u32 = 0x29ce5c;

/// Number of 32-bit words in one of the large bit-array buffers of §4.1.
pub const BITARRAY_WORDS: usize = 1 << 19;

/// Number of 16-bit lanes in the low-20 variant of the bit-array primitives.
pub const BITARRAY_LOW20_LANES: usize = 1 << 20;

/// Number of odd/even states used to synthesize the benchmark workload.
pub const TEST_BENCH_SIZE: usize = 6000;

/// Fallback key-test rate (keys/sec) used when no benchmark data is available.
pub const DEFAULT_BRUTE_FORCE_RATE: f32 = 120_000_000.0;
