//! Extension field F_q^k = ground[X] / (X^k + g_{k-1} X^{k-1} + ... + g_0)
//!
//! Elements are polynomials of degree < k over the ground field, stored as
//! the concatenation of their ground-field coefficients, coefficient of X^0
//! first. The ground field may itself be an extension, which gives towers
//! such as Fq -> Fq2 -> Fq6 -> Fq12.

use super::FiniteField;
use crate::error::{EpidError, EpidResult};

pub(crate) struct ExtensionField {
    ground: FiniteField,
    degree: usize,
    /// Low coefficients g_0..g_{k-1} of the monic modulus, in ground representation
    modulus: Vec<Vec<u64>>,
    /// Only g_0 is non-zero
    binomial: bool,
}

impl ExtensionField {
    pub(crate) fn new(ground: FiniteField, modulus: Vec<Vec<u64>>) -> EpidResult<Self> {
        let degree = modulus.len();
        if degree < 2 {
            return Err(EpidError::BadArg);
        }
        if modulus.iter().any(|c| c.len() != ground.element_len()) {
            return Err(EpidError::BadArg);
        }
        // X^k + ... with g_0 == 0 is divisible by X
        if is_zero(&modulus[0]) {
            return Err(EpidError::BadArg);
        }
        let binomial = modulus[1..].iter().all(|c| is_zero(c));
        Ok(Self {
            ground,
            degree,
            modulus,
            binomial,
        })
    }

    pub(crate) fn ground(&self) -> &FiniteField {
        &self.ground
    }

    pub(crate) fn degree(&self) -> usize {
        self.degree
    }

    pub(crate) fn is_binomial(&self) -> bool {
        self.binomial
    }

    /// Low coefficients of the modulus polynomial
    pub(crate) fn modulus(&self) -> &[Vec<u64>] {
        &self.modulus
    }

    /// Splits a raw element into its ground coefficients
    pub(crate) fn coeffs<'a>(&self, a: &'a [u64]) -> Vec<&'a [u64]> {
        a.chunks(self.ground.element_len()).collect()
    }

    pub(crate) fn zero(&self) -> Vec<u64> {
        vec![0u64; self.ground.element_len() * self.degree]
    }

    pub(crate) fn one(&self) -> Vec<u64> {
        let mut out = self.ground.raw_one();
        out.resize(self.ground.element_len() * self.degree, 0);
        out
    }

    pub(crate) fn add(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        self.zip(a, b, |x, y| self.ground.raw_add(x, y))
    }

    pub(crate) fn sub(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        self.zip(a, b, |x, y| self.ground.raw_sub(x, y))
    }

    pub(crate) fn neg(&self, a: &[u64]) -> Vec<u64> {
        self.coeffs(a)
            .into_iter()
            .flat_map(|x| self.ground.raw_neg(x))
            .collect()
    }

    /// Multiplies every coefficient by a ground element
    pub(crate) fn mul_by_ground(&self, a: &[u64], s: &[u64]) -> Vec<u64> {
        self.coeffs(a)
            .into_iter()
            .flat_map(|x| self.ground.raw_mul(x, s))
            .collect()
    }

    /// Schoolbook multiplication followed by reduction with
    /// X^k = -(g_{k-1} X^{k-1} + ... + g_0)
    pub(crate) fn mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let g = &self.ground;
        let k = self.degree;
        let ac = self.coeffs(a);
        let bc = self.coeffs(b);

        let mut temp = vec![g.raw_zero(); 2 * k - 1];
        for (i, x) in ac.iter().enumerate() {
            if is_zero(x) {
                continue;
            }
            for (j, y) in bc.iter().enumerate() {
                if is_zero(y) {
                    continue;
                }
                let prod = g.raw_mul(x, y);
                temp[i + j] = g.raw_add(&temp[i + j], &prod);
            }
        }
        self.reduce(&mut temp);
        temp.truncate(k);
        temp.concat()
    }

    pub(crate) fn square(&self, a: &[u64]) -> Vec<u64> {
        self.mul(a, a)
    }

    /// Inverse by the extended Euclidean algorithm over ground[X]
    ///
    /// Fails with `DivByZero` for zero and `Math` when the modulus turns out
    /// to be reducible.
    pub(crate) fn inv(&self, a: &[u64]) -> EpidResult<Vec<u64>> {
        let g = &self.ground;
        let mut r1: Vec<Vec<u64>> = self.coeffs(a).into_iter().map(|c| c.to_vec()).collect();
        trim(&mut r1);
        if r1.is_empty() {
            return Err(EpidError::DivByZero);
        }
        let mut r0: Vec<Vec<u64>> = self.modulus.clone();
        r0.push(g.raw_one());
        let mut s0: Vec<Vec<u64>> = Vec::new();
        let mut s1: Vec<Vec<u64>> = vec![g.raw_one()];

        while r1.len() > 1 {
            let (q, r) = self.poly_divmod(&r0, &r1)?;
            r0 = std::mem::replace(&mut r1, r);
            let qs = self.poly_mul(&q, &s1);
            let next = self.poly_sub(&s0, &qs);
            s0 = std::mem::replace(&mut s1, next);
            if r1.is_empty() {
                return Err(EpidError::Math);
            }
        }

        let c_inv = g.raw_inv(&r1[0])?;
        let mut out: Vec<Vec<u64>> = s1.iter().map(|c| g.raw_mul(c, &c_inv)).collect();
        out.resize(self.degree, g.raw_zero());
        Ok(out.concat())
    }

    fn zip(&self, a: &[u64], b: &[u64], f: impl Fn(&[u64], &[u64]) -> Vec<u64>) -> Vec<u64> {
        self.coeffs(a)
            .into_iter()
            .zip(self.coeffs(b))
            .flat_map(|(x, y)| f(x, y))
            .collect()
    }

    /// Folds coefficients of X^k and above back below X^k
    fn reduce(&self, temp: &mut [Vec<u64>]) {
        let g = &self.ground;
        let k = self.degree;
        for i in (k..temp.len()).rev() {
            if is_zero(&temp[i]) {
                continue;
            }
            let lead = std::mem::replace(&mut temp[i], g.raw_zero());
            for (j, gj) in self.modulus.iter().enumerate() {
                if is_zero(gj) {
                    continue;
                }
                let t = g.raw_mul(&lead, gj);
                temp[i - k + j] = g.raw_sub(&temp[i - k + j], &t);
            }
        }
    }

    fn poly_mul(&self, a: &[Vec<u64>], b: &[Vec<u64>]) -> Vec<Vec<u64>> {
        let g = &self.ground;
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut out = vec![g.raw_zero(); a.len() + b.len() - 1];
        for (i, x) in a.iter().enumerate() {
            for (j, y) in b.iter().enumerate() {
                let prod = g.raw_mul(x, y);
                out[i + j] = g.raw_add(&out[i + j], &prod);
            }
        }
        trim(&mut out);
        out
    }

    fn poly_sub(&self, a: &[Vec<u64>], b: &[Vec<u64>]) -> Vec<Vec<u64>> {
        let g = &self.ground;
        let n = a.len().max(b.len());
        let zero = g.raw_zero();
        let mut out: Vec<Vec<u64>> = (0..n)
            .map(|i| {
                let x = a.get(i).unwrap_or(&zero);
                let y = b.get(i).unwrap_or(&zero);
                g.raw_sub(x, y)
            })
            .collect();
        trim(&mut out);
        out
    }

    /// Polynomial long division; `b` must be trimmed and non-empty
    fn poly_divmod(
        &self,
        a: &[Vec<u64>],
        b: &[Vec<u64>],
    ) -> EpidResult<(Vec<Vec<u64>>, Vec<Vec<u64>>)> {
        let g = &self.ground;
        let lead_inv = match b.last() {
            Some(lead) => g.raw_inv(lead)?,
            None => return Err(EpidError::DivByZero),
        };
        let mut rem: Vec<Vec<u64>> = a.to_vec();
        trim(&mut rem);
        if rem.len() < b.len() {
            return Ok((Vec::new(), rem));
        }
        let mut quot = vec![g.raw_zero(); rem.len() - b.len() + 1];
        while rem.len() >= b.len() {
            let shift = rem.len() - b.len();
            let coef = match rem.last() {
                Some(top) => g.raw_mul(top, &lead_inv),
                None => break,
            };
            for (j, bj) in b.iter().enumerate() {
                let t = g.raw_mul(&coef, bj);
                rem[shift + j] = g.raw_sub(&rem[shift + j], &t);
            }
            quot[shift] = coef;
            // the leading term cancels exactly
            rem.pop();
            trim(&mut rem);
        }
        trim(&mut quot);
        Ok((quot, rem))
    }
}

fn is_zero(x: &[u64]) -> bool {
    x.iter().all(|&l| l == 0)
}

/// Drops zero high coefficients
fn trim(p: &mut Vec<Vec<u64>>) {
    while p.last().is_some_and(|c| is_zero(c)) {
        p.pop();
    }
}
