use crate::bignum::{limbs_add, limbs_bit_length, limbs_cmp, limbs_div_rem, limbs_get_bit, limbs_sub};
use std::cell::RefCell;
use std::cmp::Ordering;

/// Montgomery context for an odd modulus of any limb count.
/// All residues handled here are `len()` limbs long and already reduced.
pub struct MontgomeryCtx {
    modulus: Vec<u64>,
    n0: u64,                    // n0 = -m^{-1} mod 2^64
    r2: Vec<u64>,               // R^2 mod m, where R = 2^(64n)
    one: Vec<u64>,              // R mod m
    scratch: RefCell<Vec<u64>>, // reusable buffer of length n+2
}

impl MontgomeryCtx {
    /// Create a Montgomery context. Returns None if modulus is zero, one or even.
    pub fn new(modulus: &[u64]) -> Option<Self> {
        let n = modulus.iter().rposition(|&l| l != 0)? + 1;
        let modulus = modulus[..n].to_vec();
        if modulus[0] & 1 == 0 || (n == 1 && modulus[0] == 1) {
            return None;
        }

        let n0 = mont_n0(modulus[0]);
        let r2 = compute_r2(&modulus);
        let scratch = RefCell::new(vec![0u64; n + 2]);
        let mut ctx = Self {
            modulus,
            n0,
            r2,
            one: Vec::new(),
            scratch,
        };
        let mut unit = vec![0u64; n];
        unit[0] = 1;
        ctx.one = ctx.mont_mul(&unit, &ctx.r2);
        Some(ctx)
    }

    /// Number of limbs of every residue
    #[inline]
    pub fn len(&self) -> usize {
        self.modulus.len()
    }

    pub fn modulus(&self) -> &[u64] {
        &self.modulus
    }

    /// Reduce an arbitrary-length value and move it into the Montgomery domain
    pub fn to_mont(&self, x: &[u64]) -> Vec<u64> {
        let reduced = self.reduce(x);
        self.mont_mul(&reduced, &self.r2)
    }

    /// Move a Montgomery residue back to the normal domain
    pub fn from_mont(&self, x: &[u64]) -> Vec<u64> {
        let mut unit = vec![0u64; self.len()];
        unit[0] = 1;
        self.mont_mul(x, &unit)
    }

    /// Montgomery representation of 1, i.e. R mod m
    #[inline]
    pub fn one_mont(&self) -> Vec<u64> {
        self.one.clone()
    }

    /// x mod m for a value of any length, result has `len()` limbs
    pub fn reduce(&self, x: &[u64]) -> Vec<u64> {
        if x.len() <= self.len() && limbs_cmp(x, &self.modulus) == Ordering::Less {
            let mut out = x.to_vec();
            out.resize(self.len(), 0);
            return out;
        }
        limbs_div_rem(x, &self.modulus).1
    }

    /// Core Montgomery multiplication (CIOS):
    /// returns (a*b*R^{-1}) mod m for a,b in [0, m).
    pub fn mont_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let n = self.len();
        let m = &self.modulus;
        let mut t = self.scratch.borrow_mut();
        t.fill(0);

        for i in 0..n {
            // t += a * b[i]
            let bi = b[i];
            let mut carry: u128 = 0;
            for j in 0..n {
                let uv = t[j] as u128 + (a[j] as u128) * (bi as u128) + carry;
                t[j] = uv as u64;
                carry = uv >> 64;
            }
            let uv = t[n] as u128 + carry;
            t[n] = uv as u64;
            t[n + 1] = (uv >> 64) as u64;

            // t = (t + mi * m) / 2^64
            let mi = t[0].wrapping_mul(self.n0);
            let uv = t[0] as u128 + (mi as u128) * (m[0] as u128);
            let mut carry = uv >> 64;
            for j in 1..n {
                let uv = t[j] as u128 + (mi as u128) * (m[j] as u128) + carry;
                t[j - 1] = uv as u64;
                carry = uv >> 64;
            }
            let uv = t[n] as u128 + carry;
            t[n - 1] = uv as u64;
            t[n] = t[n + 1] + (uv >> 64) as u64;
        }

        let mut out = t[..n].to_vec();
        if t[n] != 0 || limbs_cmp(&out, m) != Ordering::Less {
            let cur = out.clone();
            limbs_sub(&mut out, &cur, m);
        }
        out
    }

    /// (a + b) mod m
    pub fn add(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let mut out = vec![0u64; self.len()];
        let carry = limbs_add(&mut out, a, b);
        if carry || limbs_cmp(&out, &self.modulus) != Ordering::Less {
            let cur = out.clone();
            limbs_sub(&mut out, &cur, &self.modulus);
        }
        out
    }

    /// (a - b) mod m
    pub fn sub(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let mut out = vec![0u64; self.len()];
        if limbs_sub(&mut out, a, b) {
            let cur = out.clone();
            limbs_add(&mut out, &cur, &self.modulus);
        }
        out
    }

    /// -a mod m
    pub fn neg(&self, a: &[u64]) -> Vec<u64> {
        let zero = vec![0u64; self.len()];
        self.sub(&zero, a)
    }

    /// Exponentiation of a Montgomery residue (square-and-multiply, MSB-first).
    /// Variable time; used only with public exponents.
    pub fn mont_pow(&self, base: &[u64], exp: &[u64]) -> Vec<u64> {
        let mut result = self.one_mont();
        for i in (0..limbs_bit_length(exp)).rev() {
            result = self.mont_mul(&result, &result);
            if limbs_get_bit(exp, i) {
                result = self.mont_mul(&result, base);
            }
        }
        result
    }

    /// Normal modular multiplication using Montgomery under the hood.
    pub fn mod_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let am = self.to_mont(a);
        let bm = self.to_mont(b);
        self.from_mont(&self.mont_mul(&am, &bm))
    }
}

/// Compute n0 = -m^{-1} mod 2^64 (requires m odd).
fn mont_n0(m0: u64) -> u64 {
    debug_assert!(m0 & 1 == 1);
    inv_mod_2_64_odd(m0).wrapping_neg()
}

/// Inverse of odd a modulo 2^64 using Newton iteration.
fn inv_mod_2_64_odd(a: u64) -> u64 {
    // x <- x(2 - ax) mod 2^64
    let mut x = 1u64;
    for _ in 0..6 {
        x = x.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(x)));
    }
    x
}

/// Compute R^2 mod m by repeated doubling from 1:
/// after 2*64n doublings, 2^(128n) mod m == R^2 mod m.
fn compute_r2(m: &[u64]) -> Vec<u64> {
    let n = m.len();
    let mut r = vec![0u64; n];
    r[0] = 1;
    for _ in 0..(2 * 64 * n) {
        let cur = r.clone();
        let carry = limbs_add(&mut r, &cur, &cur);
        if carry || limbs_cmp(&r, m) != Ordering::Less {
            let cur = r.clone();
            limbs_sub(&mut r, &cur, m);
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bignum::{hex_to_bytes, limbs_from_be_bytes};

    fn limbs(hex: &str, n: usize) -> Vec<u64> {
        limbs_from_be_bytes(&hex_to_bytes(hex).unwrap(), n)
    }

    #[test]
    fn test_rejects_even_and_trivial_moduli() {
        assert!(MontgomeryCtx::new(&[10]).is_none());
        assert!(MontgomeryCtx::new(&[1, 0]).is_none());
        assert!(MontgomeryCtx::new(&[0, 0]).is_none());
    }

    #[test]
    fn test_small_modulus() {
        let ctx = MontgomeryCtx::new(&[97]).unwrap();
        assert_eq!(ctx.mod_mul(&[10], &[20]), vec![200 % 97]);
        let a = ctx.to_mont(&[5]);
        let b = ctx.to_mont(&[95]);
        assert_eq!(ctx.from_mont(&ctx.add(&a, &b)), vec![3]);
        assert_eq!(ctx.from_mont(&ctx.sub(&a, &b)), vec![7]);
        assert_eq!(ctx.from_mont(&ctx.neg(&a)), vec![92]);
        // 5^96 = 1 mod 97
        assert_eq!(ctx.from_mont(&ctx.mont_pow(&a, &[96])), vec![1]);
    }

    #[test]
    fn test_matches_schoolbook_reduction() {
        let m = limbs("FFFFFFFFFFFCF0CD46E5F25EEE71A49F0CDC65FB12980A82D3292DDBAED33013", 4);
        let ctx = MontgomeryCtx::new(&m).unwrap();
        let a = limbs("12A65BD6918D50A766EB7D52E34017607FDF6CA12C1A37E092C0F7B976ABB18A", 4);
        let b = limbs("786528CBAF075250557A5F300AC0B46BEA6FE2F66D96F7CDC8D3127F1F3A8B42", 4);
        let expected = limbs_div_rem(&crate::bignum::limbs_mul(&a, &b), &m).1;
        assert_eq!(ctx.mod_mul(&a, &b), expected);
    }

    #[test]
    fn test_reduce_wide_input() {
        let ctx = MontgomeryCtx::new(&[0xFFFF_FFFF_FFFF_FFC5]).unwrap();
        let wide = [5u64, 1u64];
        // 2^64 + 5 = 59 + 5 mod (2^64 - 59)
        assert_eq!(ctx.reduce(&wide), vec![64]);
    }
}
