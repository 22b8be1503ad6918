//! Tate pairing for EPID 1.1
//!
//! G1 is a curve over Fq, G2 a curve over Fq3 = Fq[X]/(f(X)) and
//! GT = Fq3[Y]/(Y^2 - qnr) for a quadratic non-residue qnr of Fq. G2
//! points are mapped into GT by the twist (x, y) -> (x / qnr, y Y / qnr^2)
//! before the Miller loop over the order of G1.

use super::Pairing;
use crate::bignum::BigNum;
use crate::ecgroup::{EcGroup, EcPoint};
use crate::error::{EpidError, EpidResult};
use crate::field::{FfElement, FiniteField};
use log::debug;
use std::rc::Rc;

/// Precomputed state of the EPID 1.1 Tate pairing
pub struct Epid11PairingState {
    ga: Rc<EcGroup>,
    gb: Rc<EcGroup>,
    gt: FiniteField,
    fq3: FiniteField,
    fq: FiniteField,
    /// qnr^-1 embedded in Fq3
    qnr_inv: FfElement,
    /// qnr^-2 embedded in Fq3
    qnr_inv2: FfElement,
    /// (q^2 - q + 1) / p, p the order of G1
    final_exp: BigNum,
    /// X^(iq) in Fq3 for i = 0, 1, 2
    alpha_q: [FfElement; 3],
}

impl Epid11PairingState {
    /// Prepares the pairing `G1 x G2 -> GT`
    ///
    /// # Arguments
    /// * `ga` - G1 over the prime field Fq
    /// * `gb` - G2 over the cubic extension Fq3
    /// * `gt` - Quadratic binomial extension of Fq3
    ///
    /// # Returns
    /// The state, or `BadArg` if the degrees do not match or the order of
    /// G1 does not divide q^2 - q + 1
    pub fn new(ga: Rc<EcGroup>, gb: Rc<EcGroup>, gt: &FiniteField) -> EpidResult<Self> {
        if ga.info().basic_degree != 1 || gb.info().basic_degree != 3 || gt.info().basic_degree != 6 {
            return Err(EpidError::BadArg);
        }
        let fq3 = gt.ground_field().ok_or(EpidError::BadArg)?.clone();
        let fq = fq3.ground_field().ok_or(EpidError::BadArg)?.clone();
        if fq3.info() != gb.info() || fq.info() != ga.info() {
            return Err(EpidError::BadArg);
        }

        let qnr = gt.binomial_constant().ok_or(EpidError::BadArg)?;
        let qnr = fq3
            .coefficients(&qnr)?
            .into_iter()
            .next()
            .ok_or(EpidError::BadArg)?;
        let inv = fq.inv(&qnr)?;
        let qnr_inv = fq3.from_ground(&inv)?;
        let qnr_inv2 = fq3.from_ground(&fq.square(&inv)?)?;

        let q = fq.prime();
        let q2 = q.mul(q)?;
        let one = BigNum::from_u64(q2.capacity(), 1)?;
        let (final_exp, rem) = q2.sub(q)?.add(&one)?.div_rem(ga.order())?;
        if !rem.is_zero() {
            return Err(EpidError::BadArg);
        }

        let x = fq3.from_coefficients(&[fq.zero(), fq.one(), fq.zero()])?;
        let alpha1 = fq3.exp(&x, q)?;
        let alpha2 = fq3.square(&alpha1)?;
        debug!("tate pairing state ready, final exponent of {} bits", final_exp.bit_length());

        Ok(Self {
            ga,
            gb,
            gt: gt.clone(),
            fq3: fq3.clone(),
            fq,
            qnr_inv,
            qnr_inv2,
            final_exp,
            alpha_q: [fq3.one(), alpha1, alpha2],
        })
    }

    pub fn g1(&self) -> &EcGroup {
        &self.ga
    }

    pub fn g2(&self) -> &EcGroup {
        &self.gb
    }

    fn miller(&self, px: &FfElement, py: &FfElement, b0: &FfElement, b1: &FfElement) -> EpidResult<FfElement> {
        let f = &self.fq;
        let gt = &self.gt;
        let a = self.ga.a();
        let order = self.ga.order();

        let qx = gt.from_coefficients(&[self.fq3.mul(&self.qnr_inv, b0)?, self.fq3.zero()])?;
        let qy = gt.from_coefficients(&[self.fq3.zero(), self.fq3.mul(&self.qnr_inv2, b1)?])?;

        let (mut x, mut y, mut z) = (px.clone(), py.clone(), f.one());
        let mut rx = gt.one();
        let mut ry = f.one();
        let bits = order.bit_length();
        for i in (0..bits.saturating_sub(1)).rev() {
            // doubling, Jacobian coordinates
            let mut ty = f.square(&z)?;
            let t1 = f.mul(&f.square(&ty)?, a)?;
            let xx = f.square(&x)?;
            let w = f.add(&f.add(&f.add(&xx, &xx)?, &xx)?, &t1)?;
            let t1 = f.square(&y)?;
            let t3 = f.add(&t1, &t1)?;
            let v = f.mul(&t3, &x)?;
            let v = f.add(&v, &v)?;
            let x2 = f.sub(&f.sub(&f.square(&w)?, &v)?, &v)?;
            let t3 = f.square(&t3)?;
            let t3 = f.add(&t3, &t3)?;
            let y2 = f.sub(&f.mul(&f.sub(&v, &x2)?, &w)?, &t3)?;
            let z2 = f.mul(&y, &z)?;
            let z2 = f.add(&z2, &z2)?;

            let tt1 = self.scale(&qx, &f.mul(&ty, &w)?)?;
            let t2 = f.sub(&f.sub(&f.mul(&w, &x)?, &t1)?, &t1)?;
            ty = f.mul(&ty, &z2)?;
            let mut tx = self.scale(&qy, &ty)?;
            tx = gt.sub(&tx, &tt1)?;
            tx = gt.add(&tx, &self.embed(&t2)?)?;
            x = x2;
            y = y2;
            z = z2;
            rx = gt.mul(&tx, &gt.square(&rx)?)?;
            ry = f.mul(&ty, &f.square(&ry)?)?;

            if i > 0 && order.get_bit(i) {
                // mixed addition of the affine input point
                let zz = f.square(&z)?;
                let w = f.sub(&f.mul(px, &zz)?, &x)?;
                let zzz = f.mul(&zz, &z)?;
                let v = f.sub(&f.mul(py, &zzz)?, &y)?;
                let ww = f.square(&w)?;
                let t2 = f.mul(&w, &ww)?;
                let t3 = f.mul(&x, &ww)?;
                let x2 = f.sub(&f.sub(&f.sub(&f.square(&v)?, &t2)?, &t3)?, &t3)?;
                let y2 = f.sub(&f.mul(&f.sub(&t3, &x2)?, &v)?, &f.mul(&t2, &y)?)?;
                let z2 = f.mul(&w, &z)?;

                let mut tx = gt.sub(&qy, &self.embed(py)?)?;
                tx = self.scale(&tx, &z2)?;
                let tt1 = self.scale(&gt.sub(&qx, &self.embed(px)?)?, &v)?;
                tx = gt.sub(&tx, &tt1)?;
                rx = gt.mul(&rx, &tx)?;
                ry = f.mul(&ry, &z2)?;
                x = x2;
                y = y2;
                z = z2;
            }
        }

        let rr = self.scale(&rx, &f.inv(&ry)?)?;
        self.final_exponentiation(&rr)
    }

    /// Raises to (q^3 - 1)(q + 1)(q^2 - q + 1) / p
    ///
    /// The first factors are applied through the q-power Frobenius of Fq3,
    /// which is linear with the precomputed `alpha_q`.
    fn final_exponentiation(&self, a: &FfElement) -> EpidResult<FfElement> {
        let gt = &self.gt;
        let f3 = &self.fq3;
        let c = gt.coefficients(a)?;
        let x = self.frobenius3(&c[0])?;
        let y = self.frobenius3(&c[1])?;

        let t1 = gt.from_coefficients(&[x.clone(), y.clone()])?;
        let t2 = gt.from_coefficients(&[c[0].clone(), f3.neg(&c[1])?])?;
        let t3 = gt.from_coefficients(&[x, f3.neg(&y)?])?;
        let d1 = gt.mul(&t1, &t2)?;
        let d2 = gt.mul(&t3, a)?;
        let d = gt.mul(&d1, &gt.inv(&d2)?)?;
        gt.exp(&d, &self.final_exp)
    }

    /// a^q in Fq3
    fn frobenius3(&self, a: &FfElement) -> EpidResult<FfElement> {
        let mut out = self.fq3.zero();
        for (alpha, c) in self.alpha_q.iter().zip(self.fq3.coefficients(a)?) {
            out = self.fq3.add(&out, &self.fq3.mul_by_ground(alpha, &c)?)?;
        }
        Ok(out)
    }

    /// Fq element embedded in GT
    fn embed(&self, s: &FfElement) -> EpidResult<FfElement> {
        self.gt.from_ground(&self.fq3.from_ground(s)?)
    }

    /// GT element times an Fq scalar
    fn scale(&self, a: &FfElement, s: &FfElement) -> EpidResult<FfElement> {
        let c = self.gt.coefficients(a)?;
        let lo = self.fq3.mul_by_ground(&c[0], s)?;
        let hi = self.fq3.mul_by_ground(&c[1], s)?;
        self.gt.from_coefficients(&[lo, hi])
    }
}

impl Pairing for Epid11PairingState {
    fn pairing(&self, a: &EcPoint, b: &EcPoint) -> EpidResult<FfElement> {
        if a.info() != self.ga.info() || b.info() != self.gb.info() {
            return Err(EpidError::BadArg);
        }
        let ((px, py), (bx, by)) = match (a.coords(), b.coords()) {
            (Some(pa), Some(pb)) => (pa, pb),
            _ => return Ok(self.gt.one()),
        };
        self.miller(px, py, bx, by).map_err(|_| EpidError::Math)
    }

    fn gt(&self) -> &FiniteField {
        &self.gt
    }
}
