//! Standalone throughput check: run the keys-tested-per-second benchmark
//! and print it, in the same plain-`main` style as the original crate's
//! decoder benchmark (no criterion harness).

use crypto1_hardnested::brute_force_benchmark;

fn main() {
    crypto1_hardnested::tracing_init::init_tracing();

    println!("running hardnested brute-force benchmark...");
    let rate = brute_force_benchmark();
    println!("achieved rate: {:.0} keys/sec", rate);
}
