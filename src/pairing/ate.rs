//! Optimal ate pairing over a BN curve with a sextic twist (EPID 2.0)
//!
//! The tower is Fq -> Fq2 = Fq[u]/(u^2 - beta) -> Fq6 = Fq2[v]/(v^3 - xi)
//! -> GT = Fq6[w]/(w^2 - v). G1 lives over Fq and G2 over Fq2.
//!
//! A GT element `c0 + c1 w` with `c0 = a0 + a2 v + a4 v^2` and
//! `c1 = a1 + a3 v + a5 v^2` is handled as the six Fq2 values `a0..a5`
//! when applying Frobenius maps and cyclotomic squarings.

use super::Pairing;
use crate::bignum::{limbs_bit_length, limbs_get_bit, BigNum};
use crate::ecgroup::{EcGroup, EcPoint};
use crate::error::{EpidError, EpidResult};
use crate::field::{FfElement, FiniteField};
use log::debug;
use std::rc::Rc;

/// Line function value: only `a0`, `a1` and `a3` are non-zero
struct SparseLine {
    b0: FfElement,
    b1: FfElement,
    b3: FfElement,
}

/// Running point of the Miller loop in Jacobian coordinates, with Z^2 cached
struct Jacobian {
    x: FfElement,
    y: FfElement,
    z: FfElement,
    zz: FfElement,
}

/// Precomputed state of the ate pairing for one parameter set
pub struct PairingState {
    ga: Rc<EcGroup>,
    gb: Rc<EcGroup>,
    gt: FiniteField,
    fq6: FiniteField,
    fq2: FiniteField,
    xi: FfElement,
    t: BigNum,
    neg: bool,
    /// Frobenius constants: g[0][i] = xi^((i+1)(q-1)/6),
    /// g[1][i] = g[0][i] * conj(g[0][i]), g[2][i] = g[0][i] * g[1][i]
    g: Vec<Vec<FfElement>>,
}

impl PairingState {
    /// Prepares the pairing `G1 x G2 -> GT`
    ///
    /// # Arguments
    /// * `ga` - G1, a curve over Fq
    /// * `gb` - G2, the twist over Fq2
    /// * `gt` - The degree-12 target field built as above
    /// * `t` - Curve parameter, the loop length is `6t + 2` (`6t - 2` with `neg`)
    /// * `neg` - Sign flag of the loop length
    ///
    /// # Returns
    /// The state, or `BadArg` when the groups and field do not form the
    /// expected tower
    pub fn new(ga: Rc<EcGroup>, gb: Rc<EcGroup>, gt: &FiniteField, t: &BigNum, neg: bool) -> EpidResult<Self> {
        let fq6 = gt.ground_field().ok_or(EpidError::BadArg)?.clone();
        let fq2 = fq6.ground_field().ok_or(EpidError::BadArg)?.clone();
        let fq = fq2.ground_field().ok_or(EpidError::BadArg)?.clone();
        if gt.degree() != 2 || fq6.degree() != 3 || fq2.degree() != 2 || fq.ground_field().is_some() {
            return Err(EpidError::BadArg);
        }
        if ga.info() != fq.info() || gb.info() != fq2.info() {
            return Err(EpidError::BadArg);
        }
        let xi = fq6.binomial_constant().ok_or(EpidError::BadArg)?;
        if t.is_zero() {
            return Err(EpidError::BadArg);
        }

        // e = (q - 1) / 6
        let q = fq.prime();
        let one = BigNum::from_u64(q.capacity(), 1)?;
        let six = BigNum::from_u64(q.capacity(), 6)?;
        let (e, _) = q.sub(&one)?.div_rem(&six)?;

        let g00 = fq2.exp(&xi, &e)?;
        let mut g0 = Vec::with_capacity(5);
        let mut g1 = Vec::with_capacity(5);
        let mut g2 = Vec::with_capacity(5);
        for i in 0..5 {
            let cur = if i == 0 {
                g00.clone()
            } else {
                fq2.mul(&g0[i - 1], &g00)?
            };
            let norm = fq2.mul(&cur, &conj2(&fq2, &cur)?)?;
            g2.push(fq2.mul(&cur, &norm)?);
            g1.push(norm);
            g0.push(cur);
        }
        debug!("ate pairing state ready, loop parameter of {} bits", t.bit_length());

        Ok(Self {
            ga,
            gb,
            gt: gt.clone(),
            fq6,
            fq2,
            xi,
            t: t.clone(),
            neg,
            g: vec![g0, g1, g2],
        })
    }

    pub fn g1(&self) -> &EcGroup {
        &self.ga
    }

    pub fn g2(&self) -> &EcGroup {
        &self.gb
    }

    fn miller(&self, ax: &FfElement, ay: &FfElement, bx: &FfElement, by: &FfElement) -> EpidResult<FfElement> {
        let f2 = &self.fq2;
        let gt = &self.gt;

        let cap = self.t.capacity() + 1;
        let six = BigNum::from_u64(cap, 6)?;
        let two = BigNum::from_u64(cap, 2)?;
        let six_t = six.mul(&self.t)?;
        let s = if self.neg { six_t.sub(&two)? } else { six_t.add(&two)? };
        let (digits, n) = ternary(s.limbs());

        let neg_by = f2.neg(by)?;
        let mut r = Jacobian {
            x: bx.clone(),
            y: by.clone(),
            z: f2.one(),
            zz: f2.one(),
        };
        let mut d = gt.one();
        for i in (0..n).rev() {
            let f = self.tangent(ax, ay, &mut r)?;
            d = gt.square(&d)?;
            d = self.mul_special(&d, &f)?;
            match digits[i] {
                -1 => {
                    let f = self.line(ax, ay, &mut r, bx, &neg_by)?;
                    d = self.mul_special(&d, &f)?;
                }
                1 => {
                    let f = self.line(ax, ay, &mut r, bx, by)?;
                    d = self.mul_special(&d, &f)?;
                }
                _ => {}
            }
        }
        if self.neg {
            r.y = f2.neg(&r.y)?;
            d = self.conj12(&d)?;
        }

        let (qx, qy) = self.pi_op(bx, by, 1)?;
        let f = self.line(ax, ay, &mut r, &qx, &qy)?;
        d = self.mul_special(&d, &f)?;

        let (qx, qy) = self.pi_op(bx, by, 2)?;
        let qy = f2.neg(&qy)?;
        let f = self.line(ax, ay, &mut r, &qx, &qy)?;
        d = self.mul_special(&d, &f)?;

        self.final_exp(&d)
    }

    /// Doubling step: r = 2r, returns the tangent line at r evaluated at (px, py)
    fn tangent(&self, px: &FfElement, py: &FfElement, r: &mut Jacobian) -> EpidResult<SparseLine> {
        let f2 = &self.fq2;
        let t0 = f2.square(&r.x)?;
        let t1 = f2.square(&r.y)?;
        let t2 = f2.square(&t1)?;
        let mut t3 = f2.square(&f2.add(&t1, &r.x)?)?;
        t3 = f2.sub(&f2.sub(&t3, &t0)?, &t2)?;
        t3 = f2.add(&t3, &t3)?;
        let t4 = f2.add(&f2.add(&t0, &t0)?, &t0)?;
        let mut t6 = f2.add(&r.x, &t4)?;
        let t5 = f2.square(&t4)?;

        let x = f2.sub(&f2.sub(&t5, &t3)?, &t3)?;
        let mut z = f2.square(&f2.add(&r.y, &r.z)?)?;
        z = f2.sub(&f2.sub(&z, &t1)?, &r.zz)?;
        let mut y = f2.mul(&f2.sub(&t3, &x)?, &t4)?;
        for _ in 0..8 {
            y = f2.sub(&y, &t2)?;
        }

        let mut b1 = f2.mul(&t4, &r.zz)?;
        b1 = f2.neg(&f2.add(&b1, &b1)?)?;
        b1 = f2.mul_by_ground(&b1, px)?;

        t6 = f2.square(&t6)?;
        t6 = f2.sub(&f2.sub(&t6, &t0)?, &t5)?;
        for _ in 0..4 {
            t6 = f2.sub(&t6, &t1)?;
        }

        let mut b0 = f2.mul(&z, &r.zz)?;
        b0 = f2.add(&b0, &b0)?;
        b0 = f2.mul_by_ground(&b0, py)?;

        r.zz = f2.square(&z)?;
        r.x = x;
        r.y = y;
        r.z = z;
        Ok(SparseLine { b0, b1, b3: t6 })
    }

    /// Addition step: r = r + (qx, qy), returns the line through both
    /// evaluated at (px, py)
    fn line(
        &self,
        px: &FfElement,
        py: &FfElement,
        r: &mut Jacobian,
        qx: &FfElement,
        qy: &FfElement,
    ) -> EpidResult<SparseLine> {
        let f2 = &self.fq2;
        let t0 = f2.mul(qx, &r.zz)?;
        let qy2 = f2.square(qy)?;
        let mut t1 = f2.square(&f2.add(qy, &r.z)?)?;
        t1 = f2.sub(&f2.sub(&t1, &qy2)?, &r.zz)?;
        t1 = f2.mul(&t1, &r.zz)?;
        let t2 = f2.sub(&t0, &r.x)?;
        let t3 = f2.square(&t2)?;
        let mut t4 = f2.add(&t3, &t3)?;
        t4 = f2.add(&t4, &t4)?;
        let t5 = f2.mul(&t4, &t2)?;
        let t6 = f2.sub(&f2.sub(&t1, &r.y)?, &r.y)?;
        let t9 = f2.mul(&t6, qx)?;
        let t7 = f2.mul(&r.x, &t4)?;

        let mut x = f2.sub(&f2.square(&t6)?, &t5)?;
        x = f2.sub(&f2.sub(&x, &t7)?, &t7)?;
        let mut z = f2.square(&f2.add(&r.z, &t2)?)?;
        z = f2.sub(&f2.sub(&z, &r.zz)?, &t3)?;
        let t10 = f2.add(qy, &z)?;
        let t8 = f2.mul(&f2.sub(&t7, &x)?, &t6)?;
        let mut t0 = f2.mul(&r.y, &t5)?;
        t0 = f2.add(&t0, &t0)?;
        let y = f2.sub(&t8, &t0)?;
        let zz = f2.square(&z)?;

        let mut t10 = f2.square(&t10)?;
        t10 = f2.sub(&f2.sub(&t10, &qy2)?, &zz)?;
        let b3 = f2.sub(&f2.add(&t9, &t9)?, &t10)?;
        let mut b0 = f2.mul_by_ground(&z, py)?;
        b0 = f2.add(&b0, &b0)?;
        let mut b1 = f2.mul_by_ground(&f2.neg(&t6)?, px)?;
        b1 = f2.add(&b1, &b1)?;

        r.x = x;
        r.y = y;
        r.z = z;
        r.zz = zz;
        Ok(SparseLine { b0, b1, b3 })
    }

    fn mul_xi(&self, a: &FfElement) -> EpidResult<FfElement> {
        self.fq2.mul(a, &self.xi)
    }

    /// a * v in Fq6
    fn mul_v(&self, a: &FfElement) -> EpidResult<FfElement> {
        let c = self.fq6.coefficients(a)?;
        self.fq6
            .from_coefficients(&[self.mul_xi(&c[2])?, c[0].clone(), c[1].clone()])
    }

    /// a * (b0 + b1 v) in Fq6
    fn fq6_mul_sparse(&self, a: &FfElement, b0: &FfElement, b1: &FfElement) -> EpidResult<FfElement> {
        let f2 = &self.fq2;
        let a = self.fq6.coefficients(a)?;
        let t0 = f2.mul(&a[0], b0)?;
        let t1 = f2.mul(&a[1], b1)?;
        let t3 = f2.sub(&f2.mul(&f2.add(&a[1], &a[2])?, b1)?, &t1)?;
        let e0 = f2.add(&self.mul_xi(&t3)?, &t0)?;
        let t3 = f2.mul(&f2.add(&a[0], &a[1])?, &f2.add(b0, b1)?)?;
        let e1 = f2.sub(&f2.sub(&t3, &t0)?, &t1)?;
        let e2 = f2.add(&f2.mul(&a[2], b0)?, &t1)?;
        self.fq6.from_coefficients(&[e0, e1, e2])
    }

    /// d * f for a sparse line value f
    fn mul_special(&self, d: &FfElement, f: &SparseLine) -> EpidResult<FfElement> {
        let f6 = &self.fq6;
        let c = self.gt.coefficients(d)?;
        let t0 = f6.mul_by_ground(&c[0], &f.b0)?;
        let t1 = self.fq6_mul_sparse(&c[1], &f.b1, &f.b3)?;
        let e0 = f6.add(&t0, &self.mul_v(&t1)?)?;
        let t2 = f6.add(&c[0], &c[1])?;
        let mut e1 = self.fq6_mul_sparse(&t2, &self.fq2.add(&f.b0, &f.b1)?, &f.b3)?;
        e1 = f6.sub(&f6.sub(&e1, &t0)?, &t1)?;
        self.gt.from_coefficients(&[e0, e1])
    }

    fn split12(&self, a: &FfElement) -> EpidResult<Vec<FfElement>> {
        let c = self.gt.coefficients(a)?;
        let lo = self.fq6.coefficients(&c[0])?;
        let hi = self.fq6.coefficients(&c[1])?;
        Ok(vec![
            lo[0].clone(),
            hi[0].clone(),
            lo[1].clone(),
            hi[1].clone(),
            lo[2].clone(),
            hi[2].clone(),
        ])
    }

    fn join12(&self, d: &[FfElement]) -> EpidResult<FfElement> {
        let lo = self
            .fq6
            .from_coefficients(&[d[0].clone(), d[2].clone(), d[4].clone()])?;
        let hi = self
            .fq6
            .from_coefficients(&[d[1].clone(), d[3].clone(), d[5].clone()])?;
        self.gt.from_coefficients(&[lo, hi])
    }

    fn conj12(&self, a: &FfElement) -> EpidResult<FfElement> {
        let c = self.gt.coefficients(a)?;
        let hi = self.fq6.neg(&c[1])?;
        self.gt.from_coefficients(&[c[0].clone(), hi])
    }

    /// a^(q^e) for e in 1..=3
    fn frobenius(&self, a: &FfElement, e: usize) -> EpidResult<FfElement> {
        let mut d = self.split12(a)?;
        if e == 1 || e == 3 {
            for x in d.iter_mut() {
                *x = conj2(&self.fq2, x)?;
            }
        }
        for i in 1..6 {
            d[i] = self.fq2.mul(&d[i], &self.g[e - 1][i - 1])?;
        }
        self.join12(&d)
    }

    /// Frobenius endomorphism of the twist applied to (x, y)
    fn pi_op(&self, x: &FfElement, y: &FfElement, e: usize) -> EpidResult<(FfElement, FfElement)> {
        let f2 = &self.fq2;
        let (x, y) = if e == 1 {
            (conj2(f2, x)?, conj2(f2, y)?)
        } else {
            (x.clone(), y.clone())
        };
        Ok((f2.mul(&x, &self.g[e - 1][1])?, f2.mul(&y, &self.g[e - 1][2])?))
    }

    /// Squaring in Fq4 = Fq2[s]/(s^2 - xi)
    fn square_fq4(&self, a0: &FfElement, a1: &FfElement) -> EpidResult<(FfElement, FfElement)> {
        let f2 = &self.fq2;
        let t0 = f2.square(a0)?;
        let t1 = f2.square(a1)?;
        let e0 = f2.add(&self.mul_xi(&t1)?, &t0)?;
        let mut e1 = f2.square(&f2.add(a0, a1)?)?;
        e1 = f2.sub(&f2.sub(&e1, &t0)?, &t1)?;
        Ok((e0, e1))
    }

    /// Squaring of an element of the cyclotomic subgroup
    fn square_cyclotomic(&self, a: &FfElement) -> EpidResult<FfElement> {
        let f2 = &self.fq2;
        let a = self.split12(a)?;
        let (t00, t11) = self.square_fq4(&a[0], &a[3])?;
        let (t01, t12) = self.square_fq4(&a[1], &a[4])?;
        let (t02, t10) = self.square_fq4(&a[2], &a[5])?;
        let t10 = self.mul_xi(&t10)?;

        // 3t - 2x and 3t + 2x
        let minus = |t: &FfElement, x: &FfElement| -> EpidResult<FfElement> {
            let t3 = f2.add(&f2.add(t, t)?, t)?;
            f2.sub(&f2.sub(&t3, x)?, x)
        };
        let plus = |t: &FfElement, x: &FfElement| -> EpidResult<FfElement> {
            let t3 = f2.add(&f2.add(t, t)?, t)?;
            f2.add(&f2.add(&t3, x)?, x)
        };
        let e = [
            minus(&t00, &a[0])?,
            plus(&t10, &a[1])?,
            minus(&t01, &a[2])?,
            plus(&t11, &a[3])?,
            minus(&t02, &a[4])?,
            plus(&t12, &a[5])?,
        ];
        self.join12(&e)
    }

    /// a^b in the cyclotomic subgroup, b public
    fn exp_cyclotomic(&self, a: &FfElement, b: &BigNum) -> EpidResult<FfElement> {
        let bits = b.bit_length();
        if bits == 0 {
            return Ok(self.gt.one());
        }
        let mut e = a.clone();
        for i in (0..bits - 1).rev() {
            e = self.square_cyclotomic(&e)?;
            if b.get_bit(i) {
                e = self.gt.mul(&e, a)?;
            }
        }
        Ok(e)
    }

    /// exp_cyclotomic followed by conjugation when the parameter is negative
    fn exp_t(&self, a: &FfElement) -> EpidResult<FfElement> {
        let r = self.exp_cyclotomic(a, &self.t)?;
        if self.neg {
            self.conj12(&r)
        } else {
            Ok(r)
        }
    }

    /// Raises the Miller loop output to (q^12 - 1) / p
    fn final_exp(&self, h: &FfElement) -> EpidResult<FfElement> {
        let gt = &self.gt;

        // easy part: f = h^((q^6 - 1)(q^2 + 1))
        let mut f = gt.mul(&self.conj12(h)?, &gt.inv(h)?)?;
        f = gt.mul(&self.frobenius(&f, 2)?, &f)?;

        // hard part
        let ft1 = self.exp_t(&f)?;
        let ft2 = self.exp_t(&ft1)?;
        let ft3 = self.exp_t(&ft2)?;
        let fp1 = self.frobenius(&f, 1)?;
        let fp2 = self.frobenius(&f, 2)?;
        let fp3 = self.frobenius(&f, 3)?;

        let y0 = gt.mul(&gt.mul(&fp1, &fp2)?, &fp3)?;
        let y1 = self.conj12(&f)?;
        let y2 = self.frobenius(&ft2, 2)?;
        let y3 = self.conj12(&self.frobenius(&ft1, 1)?)?;
        let y4 = self.conj12(&gt.mul(&self.frobenius(&ft2, 1)?, &ft1)?)?;
        let y5 = self.conj12(&ft2)?;
        let y6 = self.conj12(&gt.mul(&self.frobenius(&ft3, 1)?, &ft3)?)?;

        let mut t0 = self.square_cyclotomic(&y6)?;
        t0 = gt.mul(&gt.mul(&t0, &y4)?, &y5)?;
        let mut t1 = gt.mul(&gt.mul(&y3, &y5)?, &t0)?;
        t0 = gt.mul(&t0, &y2)?;
        t1 = self.square_cyclotomic(&t1)?;
        t1 = gt.mul(&t1, &t0)?;
        t1 = self.square_cyclotomic(&t1)?;
        t0 = gt.mul(&t1, &y1)?;
        t1 = gt.mul(&t1, &y0)?;
        t0 = self.square_cyclotomic(&t0)?;
        gt.mul(&t1, &t0)
    }
}

impl Pairing for PairingState {
    fn pairing(&self, a: &EcPoint, b: &EcPoint) -> EpidResult<FfElement> {
        if a.info() != self.ga.info() || b.info() != self.gb.info() {
            return Err(EpidError::BadArg);
        }
        let ((ax, ay), (bx, by)) = match (a.coords(), b.coords()) {
            (Some(pa), Some(pb)) => (pa, pb),
            _ => return Ok(self.gt.one()),
        };
        self.miller(ax, ay, bx, by).map_err(|_| EpidError::Math)
    }

    fn gt(&self) -> &FiniteField {
        &self.gt
    }
}

/// Conjugate in a quadratic extension: c0 + c1 u -> c0 - c1 u
fn conj2(f2: &FiniteField, a: &FfElement) -> EpidResult<FfElement> {
    let c = f2.coefficients(a)?;
    let ground = f2.ground_field().ok_or(EpidError::BadArg)?;
    f2.from_coefficients(&[c[0].clone(), ground.neg(&c[1])?])
}

/// Signed-digit recoding of the loop length
///
/// Runs of ones are replaced by a -1 and a carry, except that a pair at the
/// top two bits is kept. Returns the digits (least significant first) and
/// the index of the top digit.
fn ternary(x: &[u64]) -> (Vec<i8>, usize) {
    let num_bits = limbs_bit_length(x);
    let mut s = vec![0i8; num_bits + 1];
    let mut n = num_bits.saturating_sub(1);
    let mut flag = false;
    for i in 0..num_bits {
        if limbs_get_bit(x, i) {
            if flag {
                s[i] = 0;
            } else if i + 2 < num_bits && limbs_get_bit(x, i + 1) {
                s[i] = -1;
                flag = true;
            } else {
                s[i] = 1;
            }
        } else if flag {
            s[i] = 1;
            flag = false;
        } else {
            s[i] = 0;
        }
    }
    if flag {
        n += 1;
        s[n] = 1;
    }
    (s, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(digits: &[i8]) -> i128 {
        digits
            .iter()
            .enumerate()
            .map(|(i, &d)| d as i128 * (1i128 << i))
            .sum()
    }

    #[test]
    fn test_ternary_preserves_value() {
        for x in [1u64, 2, 3, 6, 7, 0b1011_0111, 0x6882_F5C0_30B0_A801, u64::MAX >> 1] {
            let (digits, n) = ternary(&[x]);
            assert_eq!(value(&digits), x as i128, "x = {:#x}", x);
            assert!(digits[n] != 0);
            assert!(digits[n + 1..].iter().all(|&d| d == 0));
        }
    }

    #[test]
    fn test_ternary_digits_are_signed_bits() {
        for x in [0b1110_1110_1111u64, 0b0111_1000_1111, u64::MAX] {
            let (digits, n) = ternary(&[x]);
            assert!(digits.iter().all(|d| (-1..=1).contains(d)));
            let wide: i128 = digits[..=n]
                .iter()
                .enumerate()
                .map(|(i, &d)| d as i128 * (1i128 << i))
                .sum();
            assert_eq!(wide, x as i128);
        }
    }

    #[test]
    fn test_ternary_of_epid2_loop_length() {
        // 6t - 2 for t = 0x6882F5C030B0A801
        let (digits, n) = ternary(&[0x7311_C281_2423_F004, 0x2]);
        let expected: [i8; 66] = [
            0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, -1, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0,
            0, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, -1, 0, 0, 1, 0, 0, 1, 0, 0, 0,
            -1, 0, 1, 0, -1, 0, 0, 1, 0, 1,
        ];
        assert_eq!(n, 65);
        assert_eq!(&digits[..=n], &expected[..]);
    }

    #[test]
    fn test_ternary_keeps_top_pair() {
        // 0b11: the top two bits are never recoded
        let (digits, n) = ternary(&[3]);
        assert_eq!(n, 1);
        assert_eq!(&digits[..2], &[1, 1]);
    }
}
