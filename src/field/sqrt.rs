//! Tonelli-Shanks square roots
//!
//! With q the field order and q - 1 = 2^s * t (t odd), a non-residue g is
//! found by trial, an exponent e is refined over s - 1 rounds so that
//! h = a * g^-e has odd order, and the root is g^(e/2) * h^((t+1)/2).
//! The result is always squared and compared with the input.

use super::{FfElement, FiniteField};
use crate::bignum::BigNum;
use crate::error::{EpidError, EpidResult};
use log::trace;

/// Candidates tried while looking for a quadratic non-residue
const NON_RESIDUE_SEARCH_LIMIT: usize = 1 << 16;

impl FiniteField {
    /// Square root of `a`
    ///
    /// # Returns
    /// A root `r` with `r * r == a`, or `MathQuadraticNonResidue` when `a`
    /// is not a square
    pub fn sqrt(&self, a: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        let q = self.order()?;
        let cap = q.capacity();
        let one_bn = BigNum::from_u64(cap, 1)?;
        let two_bn = BigNum::from_u64(cap, 2)?;
        let one = self.one();

        let qm1 = q.sub(&one_bn)?;
        let (qm1d2, _) = qm1.div_rem(&two_bn)?;
        let g = self.find_non_residue(&qm1d2)?;

        let mut t = qm1.clone();
        let mut s = 0usize;
        while t.is_even() {
            t = t.div_rem(&two_bn)?.0;
            s += 1;
        }

        let mut e = BigNum::new(cap)?;
        for i in 2..=s {
            let j = BigNum::pow2n(cap, i)?;
            let h = self.mul(a, &self.inv(&self.exp(&g, &e)?)?)?;
            let (qm1dj, _) = qm1.div_rem(&j)?;
            if self.exp(&h, &qm1dj)? != one {
                let (jd2, _) = j.div_rem(&two_bn)?;
                e = e.add(&jd2)?;
            }
        }

        let h = self.mul(a, &self.inv(&self.exp(&g, &e)?)?)?;
        let (ed2, _) = e.div_rem(&two_bn)?;
        let (tp1d2, _) = t.add(&one_bn)?.div_rem(&two_bn)?;
        let r = self.mul(&self.exp(&g, &ed2)?, &self.exp(&h, &tp1d2)?)?;

        if self.square(&r)? != *a {
            return Err(EpidError::MathQuadraticNonResidue);
        }
        Ok(r)
    }

    /// First g with g^((q-1)/2) == -1, trying 2, 3, 4, ...
    ///
    /// Every prime-field element is a square in an even-degree extension,
    /// so there the candidates are X + 1, X + 2, ... instead.
    fn find_non_residue(&self, qm1d2: &BigNum) -> EpidResult<FfElement> {
        let one = self.one();
        let minus_one = self.neg(&one)?;
        let mut g = if self.info().basic_degree % 2 == 0 {
            self.basic_generator()
        } else {
            one.clone()
        };
        for _ in 0..NON_RESIDUE_SEARCH_LIMIT {
            g = self.add(&g, &one)?;
            if self.exp(&g, qm1d2)? == minus_one {
                return Ok(g);
            }
            trace!("square root: candidate is a residue, trying the next one");
        }
        Err(EpidError::Math)
    }

    /// The element whose second prime coefficient is one and all others zero
    fn basic_generator(&self) -> FfElement {
        let one = self.base().one();
        let mut data = self.raw_zero();
        data[one.len()..2 * one.len()].copy_from_slice(&one);
        self.wrap(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bignum::hex_to_bytes;

    fn check_table(p: u8) {
        let f = FiniteField::new_prime(&[p]).unwrap();
        let squares: Vec<u8> = (0..p as u32).map(|x| ((x * x) % p as u32) as u8).collect();
        for v in 0..p {
            let a = f.read(&[v]).unwrap();
            match f.sqrt(&a) {
                Ok(r) => {
                    assert!(squares.contains(&v), "{} has no root mod {}", v, p);
                    assert_eq!(f.square(&r).unwrap(), a);
                }
                Err(e) => {
                    assert!(!squares.contains(&v), "missed root of {} mod {}", v, p);
                    assert_eq!(e, EpidError::MathQuadraticNonResidue);
                }
            }
        }
    }

    #[test]
    fn test_small_prime_tables() {
        // 17 - 1 = 2^4, 73 - 1 = 2^3 * 9, 97 - 1 = 2^5 * 3, 103 - 1 = 2 * 51
        for p in [17, 73, 97, 103] {
            check_table(p);
        }
    }

    #[test]
    fn test_sqrt_epid_prime() {
        let q = "FFFFFFFFFFFCF0CD46E5F25EEE71A49F0CDC65FB12980A82D3292DDBAED33013";
        let f = FiniteField::new_prime(&hex_to_bytes(q).unwrap()).unwrap();
        let x = f
            .read(&hex_to_bytes("12A65BD6918D50A766EB7D52E34017607FDF6CA12C1A37E092C0F7B976ABB18A").unwrap())
            .unwrap();
        let a = f.square(&x).unwrap();
        let r = f.sqrt(&a).unwrap();
        assert!(r == x || r == f.neg(&x).unwrap());
        // -1 is a non-residue since q = 3 mod 4
        let minus_one = f.neg(&f.one()).unwrap();
        assert_eq!(f.sqrt(&minus_one).unwrap_err(), EpidError::MathQuadraticNonResidue);
    }

    #[test]
    fn test_sqrt_quadratic_extension() {
        let f = FiniteField::new_prime(&[103]).unwrap();
        let minus_one = f.neg(&f.one()).unwrap();
        let f2 = FiniteField::new_binomial_extension(&f, &minus_one, 2).unwrap();
        for (c0, c1) in [(3u8, 5u8), (0, 7), (11, 0), (100, 42)] {
            let x = f2
                .from_coefficients(&[f.read(&[c0]).unwrap(), f.read(&[c1]).unwrap()])
                .unwrap();
            let a = f2.square(&x).unwrap();
            let r = f2.sqrt(&a).unwrap();
            assert_eq!(f2.square(&r).unwrap(), a);
        }
    }
}
