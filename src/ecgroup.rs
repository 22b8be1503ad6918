//! Elliptic curve groups over finite fields
//!
//! Curves are in short Weierstrass form y^2 = x^3 + ax + b over any
//! [`FiniteField`], so the same code serves G1 over Fq, the EPID 2.0 G2
//! twist over Fq2 and the EPID 1.1 G2 over Fq3.
//!
//! The group law is written multiplicatively, following the EPID naming:
//! [`EcGroup::mul`] adds two points and [`EcGroup::exp`] is scalar
//! multiplication.

use crate::bignum::{limbs_from_be_bytes, limbs_get_bit, BigNum};
use crate::error::{EpidError, EpidResult};
use crate::field::{FfElement, FieldInfo, FiniteField};
use crate::hash::HashAlg;
use crate::random::{draw_limbs, BitSupplier};
use log::{debug, trace, warn};

/// Attempts made by hash-to-curve and random point generation
pub const EPID_ECHASH_WATCHDOG: usize = 50;

/// Bits of the EPID 1.1 hash used for the x coordinate
const EPID11_HASH_BITS: usize = 336;

#[derive(Clone, PartialEq, Eq, Debug)]
enum Coords {
    Infinity,
    Affine { x: FfElement, y: FfElement },
}

/// A point of an [`EcGroup`]
///
/// Carries the shape of its coordinate field so that points of a different
/// group are rejected.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EcPoint {
    info: FieldInfo,
    coords: Coords,
}

impl EcPoint {
    pub fn info(&self) -> FieldInfo {
        self.info
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.coords, Coords::Infinity)
    }

    /// Affine coordinates, `None` for the point at infinity
    pub fn coords(&self) -> Option<(&FfElement, &FfElement)> {
        match &self.coords {
            Coords::Infinity => None,
            Coords::Affine { x, y } => Some((x, y)),
        }
    }
}

/// Elliptic curve group with a fixed base point, order and cofactor
#[derive(Debug)]
pub struct EcGroup {
    field: FiniteField,
    a: FfElement,
    b: FfElement,
    generator: EcPoint,
    order: BigNum,
    cofactor: BigNum,
}

impl EcGroup {
    /// Creates the group of points of y^2 = x^3 + ax + b
    ///
    /// # Arguments
    /// * `field` - Coordinate field
    /// * `a`, `b` - Curve coefficients
    /// * `x`, `y` - Base point, which must lie on the curve
    /// * `order` - Order of the base point
    /// * `cofactor` - Curve order divided by `order`
    ///
    /// # Returns
    /// The group, or `BadArg` for mismatched shapes, a singular curve or a
    /// base point off the curve
    pub fn new(
        field: &FiniteField,
        a: &FfElement,
        b: &FfElement,
        x: &FfElement,
        y: &FfElement,
        order: &BigNum,
        cofactor: &BigNum,
    ) -> EpidResult<Self> {
        let info = field.info();
        if [a, b, x, y].iter().any(|e| e.info() != info) {
            return Err(EpidError::BadArg);
        }
        if order.is_zero() || cofactor.is_zero() {
            return Err(EpidError::BadArg);
        }

        // 4a^3 + 27b^2 != 0
        let four = small_constant(field, 4)?;
        let twenty_seven = small_constant(field, 27)?;
        let a3 = field.mul(&field.square(a)?, a)?;
        let disc = field.add(
            &field.mul(&four, &a3)?,
            &field.mul(&twenty_seven, &field.square(b)?)?,
        )?;
        if field.is_zero(&disc)? {
            return Err(EpidError::BadArg);
        }

        let mut group = Self {
            field: field.clone(),
            a: a.clone(),
            b: b.clone(),
            generator: EcPoint {
                info,
                coords: Coords::Infinity,
            },
            order: order.clone(),
            cofactor: cofactor.clone(),
        };
        group.generator = group.point(x, y)?;
        debug!(
            "elliptic curve group over degree {} field, order of {} bits",
            info.basic_degree,
            order.bit_length()
        );
        Ok(group)
    }

    pub fn field(&self) -> &FiniteField {
        &self.field
    }

    pub fn a(&self) -> &FfElement {
        &self.a
    }

    pub fn b(&self) -> &FfElement {
        &self.b
    }

    pub fn generator(&self) -> &EcPoint {
        &self.generator
    }

    pub fn order(&self) -> &BigNum {
        &self.order
    }

    pub fn cofactor(&self) -> &BigNum {
        &self.cofactor
    }

    /// Shape of the coordinate field
    pub fn info(&self) -> FieldInfo {
        self.field.info()
    }

    /// Byte length of a serialized point
    pub fn point_size(&self) -> usize {
        2 * self.field.element_size()
    }

    /// The point at infinity
    pub fn identity(&self) -> EcPoint {
        EcPoint {
            info: self.info(),
            coords: Coords::Infinity,
        }
    }

    /// A fresh point, initialized to the identity
    pub fn new_point(&self) -> EcPoint {
        self.identity()
    }

    /// Builds a point from affine coordinates, `BadArg` if it is not on the curve
    pub fn point(&self, x: &FfElement, y: &FfElement) -> EpidResult<EcPoint> {
        if !self.is_on_curve(x, y)? {
            return Err(EpidError::BadArg);
        }
        Ok(self.affine(x.clone(), y.clone()))
    }

    /// Deserializes `x || y`; the all-zero string is the identity
    pub fn read_point(&self, bytes: &[u8]) -> EpidResult<EcPoint> {
        if bytes.is_empty() {
            return Err(EpidError::BadArg);
        }
        let (point, on_curve) = self.contains(bytes)?;
        if !on_curve {
            return Err(EpidError::BadArg);
        }
        Ok(point)
    }

    /// Serializes a point as `x || y`, the identity as all zeros
    pub fn write_point(&self, p: &EcPoint) -> EpidResult<Vec<u8>> {
        self.check(p)?;
        match &p.coords {
            Coords::Infinity => Ok(vec![0u8; self.point_size()]),
            Coords::Affine { x, y } => {
                let mut out = self.field.write(x)?;
                out.extend(self.field.write(y)?);
                Ok(out)
            }
        }
    }

    /// Checks whether a serialized point lies on the curve
    ///
    /// The encoding length must match this group; coordinates at or above
    /// the prime are `BadArg`. The all-zero encoding is the identity and is
    /// always in the group.
    pub fn in_group(&self, bytes: &[u8]) -> EpidResult<bool> {
        if bytes.len() != self.point_size() {
            return Err(EpidError::BadArg);
        }
        Ok(self.contains(bytes)?.1)
    }

    /// Group operation `a * b`, i.e. point addition
    pub fn mul(&self, a: &EcPoint, b: &EcPoint) -> EpidResult<EcPoint> {
        self.check(a)?;
        self.check(b)?;
        self.add_points(a, b)
    }

    /// `a^b`, scalar multiplication
    ///
    /// Every bit of `b`'s capacity is processed with one doubling and one
    /// addition, the sum being kept or dropped by the bit, so the sequence of
    /// group operations depends on the capacity of `b` and not on its value.
    /// The affine formulas still branch when two operands share an x
    /// coordinate, which random scalars reach with negligible probability.
    /// The limb arithmetic underneath is not constant-time.
    pub fn exp(&self, a: &EcPoint, b: &BigNum) -> EpidResult<EcPoint> {
        self.check(a)?;
        self.multi_exp_limbs(&[a], &[b.limbs()], b.capacity() * 8)
    }

    /// Side-channel mitigated scalar multiplication
    ///
    /// Same computation as [`EcGroup::exp`], whose operation sequence is
    /// already fixed by the scalar's capacity.
    pub fn sscm_exp(&self, a: &EcPoint, b: &BigNum) -> EpidResult<EcPoint> {
        self.exp(a, b)
    }

    /// Product of `a[i]^b[i]` with big-endian scalar strings
    pub fn multi_exp(&self, a: &[&EcPoint], b: &[&[u8]]) -> EpidResult<EcPoint> {
        if a.is_empty() || a.len() != b.len() {
            return Err(EpidError::BadArg);
        }
        let width = b.iter().map(|s| s.len()).max().unwrap_or(0);
        if width == 0 {
            return Err(EpidError::BadArg);
        }
        let scalars: Vec<Vec<u64>> = b
            .iter()
            .map(|s| limbs_from_be_bytes(s, s.len().div_ceil(8)))
            .collect();
        let refs: Vec<&[u64]> = scalars.iter().map(|s| s.as_slice()).collect();
        for p in a {
            self.check(p)?;
        }
        self.multi_exp_limbs(a, &refs, width * 8)
    }

    /// Product of `a[i]^b[i]` with big number scalars
    pub fn multi_exp_bn(&self, a: &[&EcPoint], b: &[&BigNum]) -> EpidResult<EcPoint> {
        if a.is_empty() || a.len() != b.len() {
            return Err(EpidError::BadArg);
        }
        for p in a {
            self.check(p)?;
        }
        let width = b.iter().map(|s| s.capacity()).max().unwrap_or(0);
        let refs: Vec<&[u64]> = b.iter().map(|s| s.limbs()).collect();
        self.multi_exp_limbs(a, &refs, width * 8)
    }

    /// Side-channel mitigated multi-exponentiation, same as [`EcGroup::multi_exp`]
    pub fn sscm_multi_exp(&self, a: &[&EcPoint], b: &[&[u8]]) -> EpidResult<EcPoint> {
        self.multi_exp(a, b)
    }

    /// Random point of the group
    ///
    /// Draws x uniformly, lifts it when x^3 + ax + b is a square (choosing
    /// the sign of y with one more random bit) and multiplies by the
    /// cofactor.
    pub fn get_random(&self, rnd: &mut dyn BitSupplier) -> EpidResult<EcPoint> {
        for attempt in 0..EPID_ECHASH_WATCHDOG {
            let x = self.field.get_random(&[0], rnd)?;
            let rhs = self.rhs(&x)?;
            match self.field.sqrt(&rhs) {
                Ok(mut y) => {
                    if draw_limbs(rnd, 1)?[0] & 1 == 1 {
                        y = self.field.neg(&y)?;
                    }
                    let p = self.affine(x, y);
                    return self.exp(&p, &self.cofactor);
                }
                Err(EpidError::MathQuadraticNonResidue) => {
                    trace!("random point: attempt {} has no y, retrying", attempt + 1);
                }
                Err(e) => return Err(e),
            }
        }
        warn!("random point generation gave up after {} attempts", EPID_ECHASH_WATCHDOG);
        Err(EpidError::Math)
    }

    /// Hashes a message to a point of a curve over a prime field
    ///
    /// For i = 0, 1, ... x = H(be32(i) || msg) mod q is tried until
    /// x^3 + ax + b is a square. y is the root whose Montgomery residue is
    /// even, and the point is multiplied by the cofactor.
    pub fn hash(&self, msg: &[u8], alg: HashAlg) -> EpidResult<EcPoint> {
        if msg.len() > i32::MAX as usize {
            return Err(EpidError::BadArg);
        }
        if !matches!(alg, HashAlg::Sha256 | HashAlg::Sha384 | HashAlg::Sha512) {
            return Err(EpidError::HashAlgorithmNotSupported);
        }
        for i in 0..=EPID_ECHASH_WATCHDOG as u32 {
            let mut buf = Vec::with_capacity(4 + msg.len());
            buf.extend_from_slice(&i.to_be_bytes());
            buf.extend_from_slice(msg);
            let x = self.field.hash(&buf, alg)?;
            let rhs = self.rhs(&x)?;
            match self.field.sqrt(&rhs) {
                Ok(mut y) => {
                    if y.data()[0] & 1 == 1 {
                        y = self.field.neg(&y)?;
                    }
                    let p = self.affine(x, y);
                    return self.exp(&p, &self.cofactor);
                }
                Err(EpidError::MathQuadraticNonResidue) => {
                    trace!("hash to curve: counter {} has no y, retrying", i);
                }
                Err(e) => return Err(e),
            }
        }
        warn!("hash to curve gave up after {} attempts", EPID_ECHASH_WATCHDOG);
        Err(EpidError::Math)
    }

    /// EPID 1.1 hash-to-curve
    ///
    /// `H = SHA256(be32(i) || msg) || SHA256(be32(i + 1) || msg)`; the first
    /// bit of H picks the sign of y and the next 336 bits, reduced mod q,
    /// give x. The counter advances by two while x^3 + ax + b is not a
    /// square. The point is multiplied by the cofactor.
    pub fn epid11_hash(&self, msg: &[u8]) -> EpidResult<EcPoint> {
        if msg.len() > i32::MAX as usize - 4 {
            return Err(EpidError::BadArg);
        }
        let mut i = 0u32;
        for _ in 0..EPID_ECHASH_WATCHDOG {
            let mut digest = HashAlg::Sha256.digest(&[&i.to_be_bytes()[..], msg])?;
            digest.extend(HashAlg::Sha256.digest(&[&(i + 1).to_be_bytes()[..], msg])?);
            let (high_bit, t) = split_hash_bits(&digest)?;
            let x = self.field.element_from_bignum(&t)?;
            let rhs = self.rhs(&x)?;
            match self.field.sqrt(&rhs) {
                Ok(mut y) => {
                    if !high_bit {
                        y = self.field.neg(&y)?;
                    }
                    let p = self.affine(x, y);
                    return self.exp(&p, &self.cofactor);
                }
                Err(EpidError::MathQuadraticNonResidue) => {
                    trace!("epid 1.1 hash: counter {} has no y, retrying", i);
                    i += 2;
                }
                Err(e) => return Err(e),
            }
        }
        warn!("epid 1.1 hash to curve gave up after {} attempts", EPID_ECHASH_WATCHDOG);
        Err(EpidError::Math)
    }

    /// Lifts `x` to a point, `BadArg` if x^3 + ax + b is not a square
    pub fn make_point(&self, x: &FfElement) -> EpidResult<EcPoint> {
        let rhs = self.rhs(x)?;
        let y = self.field.sqrt(&rhs).map_err(|e| match e {
            EpidError::MathQuadraticNonResidue => EpidError::BadArg,
            other => other,
        })?;
        Ok(self.affine(x.clone(), y))
    }

    /// Point negation
    pub fn inverse(&self, p: &EcPoint) -> EpidResult<EcPoint> {
        self.check(p)?;
        match &p.coords {
            Coords::Infinity => Ok(self.identity()),
            Coords::Affine { x, y } => Ok(self.affine(x.clone(), self.field.neg(y)?)),
        }
    }

    pub fn is_equal(&self, a: &EcPoint, b: &EcPoint) -> EpidResult<bool> {
        self.check(a)?;
        self.check(b)?;
        Ok(a.coords == b.coords)
    }

    pub fn is_identity(&self, p: &EcPoint) -> EpidResult<bool> {
        self.check(p)?;
        Ok(p.is_infinity())
    }

    fn check(&self, p: &EcPoint) -> EpidResult<()> {
        if p.info != self.info() {
            return Err(EpidError::BadArg);
        }
        Ok(())
    }

    fn affine(&self, x: FfElement, y: FfElement) -> EcPoint {
        EcPoint {
            info: self.info(),
            coords: Coords::Affine { x, y },
        }
    }

    /// x^3 + ax + b
    fn rhs(&self, x: &FfElement) -> EpidResult<FfElement> {
        let f = &self.field;
        let x3 = f.mul(&f.square(x)?, x)?;
        let ax = f.mul(&self.a, x)?;
        f.add(&f.add(&x3, &ax)?, &self.b)
    }

    fn is_on_curve(&self, x: &FfElement, y: &FfElement) -> EpidResult<bool> {
        let lhs = self.field.square(y)?;
        Ok(lhs == self.rhs(x)?)
    }

    /// Parses an encoding and reports whether it is on the curve
    fn contains(&self, bytes: &[u8]) -> EpidResult<(EcPoint, bool)> {
        if bytes.len() % 2 != 0 || bytes.len() > i32::MAX as usize {
            return Err(EpidError::BadArg);
        }
        if bytes.iter().all(|&b| b == 0) {
            return Ok((self.identity(), true));
        }
        let (xs, ys) = bytes.split_at(bytes.len() / 2);
        let x = self.field.read(xs)?;
        let y = self.field.read(ys)?;
        let on_curve = self.is_on_curve(&x, &y)?;
        Ok((self.affine(x, y), on_curve))
    }

    fn add_points(&self, p: &EcPoint, q: &EcPoint) -> EpidResult<EcPoint> {
        let f = &self.field;
        let ((x1, y1), (x2, y2)) = match (&p.coords, &q.coords) {
            (Coords::Infinity, _) => return Ok(q.clone()),
            (_, Coords::Infinity) => return Ok(p.clone()),
            (Coords::Affine { x: x1, y: y1 }, Coords::Affine { x: x2, y: y2 }) => {
                ((x1, y1), (x2, y2))
            }
        };
        if x1 == x2 {
            if y1 == y2 {
                return self.double(p);
            }
            return Ok(self.identity());
        }
        // lambda = (y2 - y1) / (x2 - x1)
        let lambda = f.mul(&f.sub(y2, y1)?, &f.inv(&f.sub(x2, x1)?)?)?;
        let x3 = f.sub(&f.sub(&f.square(&lambda)?, x1)?, x2)?;
        let y3 = f.sub(&f.mul(&lambda, &f.sub(x1, &x3)?)?, y1)?;
        Ok(self.affine(x3, y3))
    }

    fn double(&self, p: &EcPoint) -> EpidResult<EcPoint> {
        let f = &self.field;
        let (x, y) = match &p.coords {
            Coords::Infinity => return Ok(p.clone()),
            Coords::Affine { x, y } => (x, y),
        };
        if f.is_zero(y)? {
            return Ok(self.identity());
        }
        // lambda = (3x^2 + a) / 2y
        let x2 = f.square(x)?;
        let num = f.add(&f.add(&f.add(&x2, &x2)?, &x2)?, &self.a)?;
        let den = f.add(y, y)?;
        let lambda = f.mul(&num, &f.inv(&den)?)?;
        let x3 = f.sub(&f.square(&lambda)?, &f.add(x, x)?)?;
        let y3 = f.sub(&f.mul(&lambda, &f.sub(x, &x3)?)?, y)?;
        Ok(self.affine(x3, y3))
    }

    /// Interleaved double-and-add over `bits` scalar bits
    ///
    /// The accumulator starts at the base point instead of the identity and
    /// the offset, doubled alongside it, is removed at the end. Leading zero
    /// bits then go through the same affine formulas as any other bit.
    fn multi_exp_limbs(&self, points: &[&EcPoint], scalars: &[&[u64]], bits: usize) -> EpidResult<EcPoint> {
        let mut offset = self.generator.clone();
        let mut acc = offset.clone();
        for i in (0..bits).rev() {
            acc = self.double(&acc)?;
            offset = self.double(&offset)?;
            for (p, s) in points.iter().zip(scalars) {
                let sum = self.add_points(&acc, p)?;
                acc = if limbs_get_bit(s, i) { sum } else { acc };
            }
        }
        let offset = self.inverse(&offset)?;
        self.add_points(&acc, &offset)
    }
}

fn small_constant(field: &FiniteField, v: u64) -> EpidResult<FfElement> {
    let one = field.one();
    let mut acc = field.zero();
    for _ in 0..v {
        acc = field.add(&acc, &one)?;
    }
    Ok(acc)
}

/// First bit of `digest` and the 336 bits after it
fn split_hash_bits(digest: &[u8]) -> EpidResult<(bool, BigNum)> {
    let len = EPID11_HASH_BITS / 8;
    if digest.len() < len + 1 {
        return Err(EpidError::BadArg);
    }
    let shifted: Vec<u8> = (0..len)
        .map(|i| (digest[i] << 1) | (digest[i + 1] >> 7))
        .collect();
    Ok((digest[0] & 0x80 != 0, BigNum::from_bytes(&shifted)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    // y^2 = x^3 + 2x + 3 over F_97 has 100 points
    fn toy() -> EcGroup {
        let f = FiniteField::new_prime(&[97]).unwrap();
        let e = |v: u8| f.read(&[v]).unwrap();
        let order = BigNum::from_u64(1, 100).unwrap();
        let h = BigNum::from_u64(1, 1).unwrap();
        EcGroup::new(&f, &e(2), &e(3), &e(3), &e(6), &order, &h).unwrap()
    }

    #[test]
    fn test_rejects_point_off_curve() {
        let f = FiniteField::new_prime(&[97]).unwrap();
        let e = |v: u8| f.read(&[v]).unwrap();
        let n = BigNum::from_u64(1, 100).unwrap();
        let err = EcGroup::new(&f, &e(2), &e(3), &e(3), &e(7), &n, &n).unwrap_err();
        assert_eq!(err, EpidError::BadArg);
    }

    #[test]
    fn test_rejects_singular_curve() {
        let f = FiniteField::new_prime(&[97]).unwrap();
        let zero = f.zero();
        let n = BigNum::from_u64(1, 100).unwrap();
        let err = EcGroup::new(&f, &zero, &zero, &zero, &zero, &n, &n).unwrap_err();
        assert_eq!(err, EpidError::BadArg);
    }

    #[test]
    fn test_inverse_gives_identity() {
        let g = toy();
        let p = g.generator().clone();
        let sum = g.mul(&p, &g.inverse(&p).unwrap()).unwrap();
        assert!(g.is_identity(&sum).unwrap());
        assert_eq!(g.mul(&p, &g.identity()).unwrap(), p);
    }

    #[test]
    fn test_exp_matches_repeated_addition() {
        let g = toy();
        let p = g.generator().clone();
        let mut acc = g.identity();
        for k in 0..12u64 {
            let s = BigNum::from_u64(2, k).unwrap();
            assert_eq!(g.exp(&p, &s).unwrap(), acc, "k = {}", k);
            acc = g.mul(&acc, &p).unwrap();
        }
        let n = BigNum::from_u64(1, 100).unwrap();
        assert!(g.exp(&p, &n).unwrap().is_infinity());
    }

    #[test]
    fn test_exp_ignores_scalar_padding() {
        let g = toy();
        let p = g.exp(g.generator(), &BigNum::from_u64(1, 3).unwrap()).unwrap();
        for k in [0u64, 1, 2, 5, 99, 100, 101] {
            let narrow = BigNum::from_u64(1, k).unwrap();
            let wide = BigNum::from_u64(32, k).unwrap();
            assert_eq!(g.exp(&p, &narrow).unwrap(), g.exp(&p, &wide).unwrap(), "k = {}", k);
            let padded = [&[0u8; 31][..], &[k as u8][..]].concat();
            assert_eq!(g.multi_exp(&[&p], &[&padded[..]]).unwrap(), g.exp(&p, &narrow).unwrap());
        }
        assert!(g.exp(&g.identity(), &BigNum::from_u64(8, 7).unwrap()).unwrap().is_infinity());
    }

    #[test]
    fn test_multi_exp_matches_products() {
        let g = toy();
        let p = g.generator().clone();
        let q = g.exp(&p, &BigNum::from_u64(1, 7).unwrap()).unwrap();
        let r = g.multi_exp(&[&p, &q], &[&[5u8][..], &[0u8, 9][..]]).unwrap();
        let expected = g.exp(&p, &BigNum::from_u64(1, 68).unwrap()).unwrap();
        assert_eq!(r, expected);
        let bn5 = BigNum::from_u64(4, 5).unwrap();
        let bn9 = BigNum::from_u64(1, 9).unwrap();
        assert_eq!(g.multi_exp_bn(&[&p, &q], &[&bn5, &bn9]).unwrap(), expected);
        assert_eq!(g.multi_exp(&[&p], &[]).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_read_write_and_identity_encoding() {
        let g = toy();
        let p = g.generator().clone();
        let bytes = g.write_point(&p).unwrap();
        assert_eq!(bytes, vec![3, 6]);
        assert_eq!(g.read_point(&bytes).unwrap(), p);
        assert!(g.read_point(&[0, 0]).unwrap().is_infinity());
        assert_eq!(g.write_point(&g.identity()).unwrap(), vec![0, 0]);
        assert_eq!(g.read_point(&[3, 7]).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_in_group() {
        let g = toy();
        assert!(g.in_group(&[3, 6]).unwrap());
        assert!(!g.in_group(&[3, 7]).unwrap());
        assert!(g.in_group(&[0, 0]).unwrap());
        assert_eq!(g.in_group(&[3, 6, 0]).unwrap_err(), EpidError::BadArg);
        assert_eq!(g.in_group(&[97, 6]).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_make_point() {
        let g = toy();
        let f = g.field();
        let p = g.make_point(&f.read(&[3]).unwrap()).unwrap();
        assert!(g.in_group(&g.write_point(&p).unwrap()).unwrap());
        // 8 + 4 + 3 = 15 is not a square mod 97
        assert_eq!(g.make_point(&f.read(&[2]).unwrap()).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_split_hash_bits() {
        let mut digest = vec![0u8; 64];
        digest[0] = 0b1100_0000;
        digest[42] = 0b1000_0000;
        let (high, t) = split_hash_bits(&digest).unwrap();
        assert!(high);
        assert_eq!(t.capacity(), 42);
        let bytes = t.write(42).unwrap();
        assert_eq!(bytes[0], 0b1000_0000);
        assert_eq!(bytes[41], 1);
    }
}
