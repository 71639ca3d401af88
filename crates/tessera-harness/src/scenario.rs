//! Seeded operation sequences.
//!
//! Turns a seed into a reproducible list of generated operations, so a
//! failing sequence can be replayed from the seed alone.

use arbitrary::{Arbitrary, Unstructured};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bytes of entropy drawn per requested operation.
const BYTES_PER_OP: usize = 8;

/// Generate up to `count` operations from `seed`.
///
/// Fewer operations come back only if generation runs out of entropy,
/// which the byte budget makes unlikely for the small operation enums used
/// here.
pub fn seeded_ops<T>(seed: u64, count: usize) -> Vec<T>
where
    T: for<'a> Arbitrary<'a>,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bytes = vec![0u8; count.saturating_mul(BYTES_PER_OP)];
    rng.fill_bytes(&mut bytes);

    let mut unstructured = Unstructured::new(&bytes);
    let mut ops = Vec::with_capacity(count);
    while ops.len() < count {
        match T::arbitrary(&mut unstructured) {
            Ok(op) => ops.push(op),
            Err(error) => {
                tracing::debug!(seed, generated = ops.len(), %error, "scenario entropy exhausted");
                break;
            },
        }
    }
    ops
}
