//! Sources of random bits for `GetRandom` operations

use crate::error::{EpidError, EpidResult};
use rand::RngCore;

/// Fills `buf` with `num_bits` random bits.
///
/// Words are little-endian (word 0 holds the least significant bits).
/// Bits of the last word above `num_bits` are ignored by callers.
pub trait BitSupplier {
    fn supply(&mut self, buf: &mut [u32], num_bits: usize) -> EpidResult<()>;
}

impl<F> BitSupplier for F
where
    F: FnMut(&mut [u32], usize) -> EpidResult<()>,
{
    fn supply(&mut self, buf: &mut [u32], num_bits: usize) -> EpidResult<()> {
        self(buf, num_bits)
    }
}

/// Adapter from any `rand` generator
pub struct RngBitSupplier<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RngBitSupplier<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngBitSupplier<rand::rngs::ThreadRng> {
    /// Supplier backed by the thread-local generator
    pub fn thread() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: RngCore> BitSupplier for RngBitSupplier<R> {
    fn supply(&mut self, buf: &mut [u32], num_bits: usize) -> EpidResult<()> {
        if buf.len() * 32 < num_bits {
            return Err(EpidError::BadArg);
        }
        for word in buf.iter_mut() {
            *word = self.rng.next_u32();
        }
        Ok(())
    }
}

/// Draws `num_bits` bits and returns them as little-endian 64-bit limbs
pub(crate) fn draw_limbs(supplier: &mut dyn BitSupplier, num_bits: usize) -> EpidResult<Vec<u64>> {
    let mut words = vec![0u32; num_bits.div_ceil(32)];
    supplier.supply(&mut words, num_bits)?;
    let extra = words.len() * 32 - num_bits;
    if extra > 0 {
        if let Some(top) = words.last_mut() {
            *top &= u32::MAX >> extra;
        }
    }
    Ok(words
        .chunks(2)
        .map(|pair| pair[0] as u64 | (pair.get(1).copied().unwrap_or(0) as u64) << 32)
        .collect())
}
