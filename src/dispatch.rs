//! Top-level thread dispatcher: fans a brute-force run out across the
//! machine's cores, one nonce bucket at a time.
//!
//! Grounded on `hardnested_bruteforce.c`'s `brute_force_bs`/`crack_states_thread`:
//! each worker owns a fixed-stride slice of the 256 nonce buckets
//! (`thread_id, thread_id + num_threads, ...`), so buckets are handed out
//! without any shared work queue. Workers stop pulling new buckets as soon
//! as any of them reports a key — cooperative, not forced, cancellation —
//! and the key-rate estimate is reported back through `out_rate` the same
//! way the original returns `bf_rate`.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::bucket_cracker::crack_bucket;
use crate::constants::DEFAULT_BRUTE_FORCE_RATE;
use crate::nonce_prep::{prepare_bf_test_nonces, NonceList};
use crate::statelist::{KeyType, StateList};

/// Everything [`brute_force_bs`] needs to know about the sector it is
/// attacking, carried only for logging — it has no bearing on the search.
#[derive(Clone, Copy, Debug)]
pub struct AttackContext {
    pub cuid: u32,
    pub trg_block: u8,
    pub trg_key: KeyType,
}

/// Search every nonce bucket for the true key, splitting the 256 buckets
/// across `num_threads` workers.
///
/// `best_first_bytes` gives the iteration order over bucket indices
/// (typically buckets richest in captured nonces first, so a thread is
/// more likely to find the key quickly); worker `t` visits
/// `best_first_bytes[t], best_first_bytes[t + num_threads], ...`.
///
/// On success, writes the achieved keys/sec rate to `out_rate` (when
/// provided) and returns the recovered 48-bit LFSR state. Returns `None`
/// if every bucket was exhausted without a match.
#[instrument(skip(even_list, odd_list, nonces, best_first_bytes, out_rate), fields(cuid = context.cuid, trg_block = context.trg_block))]
pub fn brute_force_bs(
    context: AttackContext,
    even_list: &StateList,
    odd_list: &StateList,
    nonces: &NonceList,
    best_first_bytes: &[u8; 256],
    num_threads: usize,
    mut out_rate: Option<&mut f32>,
) -> Option<u64> {
    let num_threads = num_threads.max(1);
    info!(num_threads, even_candidates = even_list.len(), odd_candidates = odd_list.len(), "starting brute force");

    let keys_found = AtomicU32::new(0);
    let num_keys_tested = AtomicU64::new(0);
    let found_key: Mutex<Option<u64>> = Mutex::new(None);
    let start = Instant::now();

    std::thread::scope(|scope| {
        for thread_id in 0..num_threads {
            let keys_found = &keys_found;
            let num_keys_tested = &num_keys_tested;
            let found_key = &found_key;
            scope.spawn(move || {
                let mut bucket_idx = thread_id;
                while bucket_idx < best_first_bytes.len() {
                    if keys_found.load(Ordering::Relaxed) > 0 {
                        break;
                    }

                    let first_byte = best_first_bytes[bucket_idx];
                    let bucket = &nonces[first_byte as usize];
                    if !bucket.is_empty() {
                        let test_nonces = prepare_bf_test_nonces(bucket);
                        if let Some(key) = crack_bucket(even_list, odd_list, &test_nonces, nonces, num_keys_tested) {
                            let mut slot = found_key.lock().expect("found_key mutex poisoned");
                            if slot.is_none() {
                                *slot = Some(key);
                            }
                            keys_found.fetch_add(1, Ordering::Relaxed);
                            debug!(thread_id, first_byte, "candidate key confirmed");
                            break;
                        }
                    }
                    bucket_idx += num_threads;
                }
            });
        }
    });

    let elapsed = start.elapsed().as_secs_f32();
    let tested = num_keys_tested.load(Ordering::Relaxed);
    let rate = if elapsed > 0.0 { tested as f32 / elapsed } else { DEFAULT_BRUTE_FORCE_RATE };
    if let Some(out) = out_rate.as_deref_mut() {
        *out = rate;
    }

    let result = found_key.into_inner().expect("found_key mutex poisoned");
    info!(keys_tested = tested, rate, found = result.is_some(), "brute force finished");
    result
}

/// The number of worker threads [`brute_force_bs`] should use when the
/// caller has no stronger opinion: one per available core.
pub fn default_num_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
