//! Prime field F_p arithmetic
//!
//! Elements are stored as Montgomery residues: `n` little-endian limbs
//! holding `a * R mod p`. Conversion happens only at the serialization
//! boundary.

use crate::bignum::{limbs_bit_length, limbs_cmp, limbs_from_be_bytes, limbs_to_be_bytes, BigNum};
use crate::error::{EpidError, EpidResult};
use crate::montgomery::MontgomeryCtx;
use std::cmp::Ordering;

pub(crate) struct PrimeField {
    ctx: MontgomeryCtx,
    prime: BigNum,
    /// Minimal byte length of p
    modulus_size: usize,
}

impl PrimeField {
    /// Builds F_p from a big-endian prime. Fails with `BadArg` for an even,
    /// zero or one modulus.
    pub(crate) fn new(prime_be: &[u8]) -> EpidResult<Self> {
        let prime = BigNum::from_bytes(prime_be)?;
        let bits = prime.bit_length();
        if bits < 2 {
            return Err(EpidError::BadArg);
        }
        let modulus_size = bits.div_ceil(8);
        let ctx = MontgomeryCtx::new(prime.limbs()).ok_or(EpidError::BadArg)?;
        let prime = prime.with_capacity(modulus_size)?;
        Ok(Self {
            ctx,
            prime,
            modulus_size,
        })
    }

    /// Limbs per element
    pub(crate) fn limbs(&self) -> usize {
        self.ctx.len()
    }

    pub(crate) fn modulus_size(&self) -> usize {
        self.modulus_size
    }

    pub(crate) fn prime(&self) -> &BigNum {
        &self.prime
    }

    pub(crate) fn bit_size(&self) -> usize {
        limbs_bit_length(self.ctx.modulus())
    }

    pub(crate) fn zero(&self) -> Vec<u64> {
        vec![0u64; self.limbs()]
    }

    pub(crate) fn one(&self) -> Vec<u64> {
        self.ctx.one_mont()
    }

    pub(crate) fn add(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        self.ctx.add(a, b)
    }

    pub(crate) fn sub(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        self.ctx.sub(a, b)
    }

    pub(crate) fn neg(&self, a: &[u64]) -> Vec<u64> {
        self.ctx.neg(a)
    }

    pub(crate) fn mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        self.ctx.mont_mul(a, b)
    }

    /// a^(p-2), the inverse of a non-zero residue
    pub(crate) fn inv(&self, a: &[u64]) -> Vec<u64> {
        let mut exp = vec![0u64; self.limbs()];
        let two = [2u64];
        crate::bignum::limbs_sub(&mut exp, self.ctx.modulus(), &two);
        self.ctx.mont_pow(a, &exp)
    }

    /// Residue of an arbitrary-length integer
    pub(crate) fn from_int(&self, x: &[u64]) -> Vec<u64> {
        self.ctx.to_mont(x)
    }

    /// Plain integer value of a residue
    pub(crate) fn to_int(&self, a: &[u64]) -> Vec<u64> {
        self.ctx.from_mont(a)
    }

    /// Parses one big-endian chunk; the value must be below p
    pub(crate) fn read_chunk(&self, chunk: &[u8]) -> EpidResult<Vec<u64>> {
        let limbs = self.limbs();
        let significant = chunk.iter().skip_while(|&&b| b == 0).count();
        if significant > limbs * 8 {
            return Err(EpidError::BadArg);
        }
        let value = limbs_from_be_bytes(chunk, limbs);
        if limbs_cmp(&value, self.ctx.modulus()) != Ordering::Less {
            return Err(EpidError::BadArg);
        }
        Ok(self.ctx.to_mont(&value))
    }

    /// Writes a residue as a big-endian chunk of `modulus_size` bytes
    pub(crate) fn write_chunk(&self, a: &[u64]) -> Vec<u8> {
        limbs_to_be_bytes(&self.to_int(a), self.modulus_size)
    }

    /// Integer comparison of two residues
    pub(crate) fn cmp(&self, a: &[u64], b: &[u64]) -> Ordering {
        limbs_cmp(&self.to_int(a), &self.to_int(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f97() -> PrimeField {
        PrimeField::new(&[97]).unwrap()
    }

    #[test]
    fn test_rejects_bad_primes() {
        assert!(PrimeField::new(&[0]).is_err());
        assert!(PrimeField::new(&[1]).is_err());
        assert!(PrimeField::new(&[0, 96]).is_err());
    }

    #[test]
    fn test_modulus_size_strips_leading_zeros() {
        let f = PrimeField::new(&[0, 0, 0, 97]).unwrap();
        assert_eq!(f.modulus_size(), 1);
        assert_eq!(f.bit_size(), 7);
    }

    #[test]
    fn test_arithmetic() {
        let f = f97();
        let a = f.read_chunk(&[10]).unwrap();
        let b = f.read_chunk(&[90]).unwrap();
        assert_eq!(f.write_chunk(&f.add(&a, &b)), vec![3]);
        assert_eq!(f.write_chunk(&f.sub(&a, &b)), vec![17]);
        assert_eq!(f.write_chunk(&f.mul(&a, &b)), vec![(900 % 97) as u8]);
        let inv = f.inv(&a);
        assert_eq!(f.write_chunk(&f.mul(&a, &inv)), vec![1]);
    }

    #[test]
    fn test_read_rejects_out_of_range() {
        let f = f97();
        assert_eq!(f.read_chunk(&[97]).unwrap_err(), EpidError::BadArg);
        assert!(f.read_chunk(&[96]).is_ok());
    }
}
