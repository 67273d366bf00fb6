//! Ciphertext-only cryptanalysis of MIFARE Classic's Crypto-1 cipher —
//! the "hardnested" attack of Meijer & Verdult (CCS 2015).
//!
//! Given a reduced list of candidate odd/even half-states from a separate
//! statistical state-space reducer (out of scope here, see SPEC_FULL.md),
//! [`dispatch::brute_force_bs`] bit-slices 128 candidates at a time through
//! [`evaluator::Evaluator`] and confirms survivors with
//! [`bucket_cracker::verify_key`].

pub mod bench;
pub mod bitarray;
pub mod bitslice;
pub mod bucket_cracker;
pub mod constants;
pub mod crypto1;
pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod nonce_prep;
pub mod statelist;
pub mod tracing_init;

pub use bench::{brute_force_benchmark, read_bench_data};
pub use bitslice::BitSlice128;
pub use bucket_cracker::{crack_bucket, verify_key};
pub use crypto1::Crypto1State;
pub use dispatch::{brute_force_bs, default_num_threads, AttackContext};
pub use error::HardnestedError;
pub use nonce_prep::{bucket_nonces, prepare_bf_test_nonces, EncryptedNonce, NonceList, TestNonce};
pub use statelist::{KeyType, Parity, StateList};
