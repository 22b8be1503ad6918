//! Finite fields and their elements
//!
//! A [`FiniteField`] is either a prime field F_p or an extension built over
//! another `FiniteField` (binomial `X^k - c` or a general monic polynomial).
//! Towers of any depth are supported; every element is stored flat as
//! `basic_degree` Montgomery residues modulo the underlying prime.
//!
//! Operations never compare field identity. Operands are checked against
//! the field's [`FieldInfo`] shape instead, and a mismatch is `BadArg`.

mod extension;
mod prime;
mod sqrt;

use crate::bignum::{limbs_add, limbs_bit_length, limbs_cmp, limbs_from_be_bytes, limbs_get_bit, limbs_mul, BigNum};
use crate::error::{EpidError, EpidResult};
use crate::hash::HashAlg;
use crate::random::{draw_limbs, BitSupplier};
use extension::ExtensionField;
use log::{debug, trace, warn};
use prime::PrimeField;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Attempts made by [`FiniteField::get_random`] before giving up
pub const RNG_WATCHDOG: usize = 10;

/// Extra random bits drawn per coefficient so the reduction mod p is close
/// to uniform
const RANDOM_EXTRA_BITS: usize = 128;

/// Shape of a field, cached in every element for operand checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Length of an element in 64-bit limbs
    pub element_len: usize,
    /// Degree over the prime field
    pub basic_degree: usize,
    /// Degree over the immediate ground field
    pub ground_degree: usize,
}

/// Element of a [`FiniteField`]
#[derive(Clone, PartialEq, Eq)]
pub struct FfElement {
    info: FieldInfo,
    data: Vec<u64>,
}

impl FfElement {
    pub fn info(&self) -> FieldInfo {
        self.info
    }

    /// Raw Montgomery limbs, coefficient 0 first
    pub(crate) fn data(&self) -> &[u64] {
        &self.data
    }
}

impl fmt::Debug for FfElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FfElement[deg {}]({} limbs)",
            self.info.basic_degree, self.info.element_len
        )
    }
}

enum FieldKind {
    Prime(PrimeField),
    Extension(ExtensionField),
}

struct FieldInner {
    info: FieldInfo,
    kind: FieldKind,
}

/// Shared handle to a finite field
///
/// Cloning is cheap. An extension keeps its ground field alive.
#[derive(Clone)]
pub struct FiniteField {
    inner: Rc<FieldInner>,
}

impl fmt::Debug for FiniteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiniteField")
            .field("prime", &self.prime())
            .field("info", &self.inner.info)
            .finish()
    }
}

impl FiniteField {
    /// Builds F_p from a big-endian prime
    ///
    /// # Arguments
    /// * `prime` - Big-endian encoding of p, leading zeros allowed
    ///
    /// # Returns
    /// The prime field, or `BadArg` if p is even or smaller than 3
    pub fn new_prime(prime: &[u8]) -> EpidResult<Self> {
        let pf = PrimeField::new(prime)?;
        let info = FieldInfo {
            element_len: pf.limbs(),
            basic_degree: 1,
            ground_degree: 1,
        };
        debug!("prime field of {} bits", pf.bit_size());
        Ok(Self {
            inner: Rc::new(FieldInner {
                info,
                kind: FieldKind::Prime(pf),
            }),
        })
    }

    /// Builds `ground[X] / (X^degree - non_residue)`
    ///
    /// `non_residue` must be an element of `ground` such that the binomial is
    /// irreducible.
    pub fn new_binomial_extension(
        ground: &FiniteField,
        non_residue: &FfElement,
        degree: usize,
    ) -> EpidResult<Self> {
        ground.check(non_residue)?;
        if degree < 2 {
            return Err(EpidError::BadArg);
        }
        let mut modulus = vec![ground.raw_zero(); degree];
        modulus[0] = ground.raw_neg(&non_residue.data);
        Self::new_extension(ground, modulus)
    }

    /// Builds `ground[X] / (X^k + g_{k-1} X^{k-1} + ... + g_0)`
    ///
    /// # Arguments
    /// * `ground` - The field the coefficients live in
    /// * `coefficients` - The low coefficients `g_0..g_{k-1}` of the monic
    ///   irreducible polynomial; `k` is their count
    pub fn new_polynomial_extension(
        ground: &FiniteField,
        coefficients: &[FfElement],
    ) -> EpidResult<Self> {
        let modulus = coefficients
            .iter()
            .map(|c| ground.check(c).map(|_| c.data.clone()))
            .collect::<EpidResult<Vec<_>>>()?;
        Self::new_extension(ground, modulus)
    }

    fn new_extension(ground: &FiniteField, modulus: Vec<Vec<u64>>) -> EpidResult<Self> {
        let degree = modulus.len();
        let ext = ExtensionField::new(ground.clone(), modulus)?;
        let ginfo = ground.info();
        let info = FieldInfo {
            element_len: ginfo.element_len * degree,
            basic_degree: ginfo.basic_degree * degree,
            ground_degree: degree,
        };
        debug!(
            "extension field of degree {} over degree {} (binomial: {})",
            degree,
            ginfo.basic_degree,
            ext.is_binomial()
        );
        Ok(Self {
            inner: Rc::new(FieldInner {
                info,
                kind: FieldKind::Extension(ext),
            }),
        })
    }

    pub fn info(&self) -> FieldInfo {
        self.inner.info
    }

    /// Degree over the immediate ground field
    pub fn degree(&self) -> usize {
        self.inner.info.ground_degree
    }

    /// The ground field of an extension, `None` for a prime field
    pub fn ground_field(&self) -> Option<&FiniteField> {
        match &self.inner.kind {
            FieldKind::Prime(_) => None,
            FieldKind::Extension(ext) => Some(ext.ground()),
        }
    }

    /// `c` of a binomial extension `X^k - c`, `None` for any other field
    pub fn binomial_constant(&self) -> Option<FfElement> {
        match &self.inner.kind {
            FieldKind::Extension(ext) if ext.is_binomial() => {
                let ground = ext.ground();
                Some(ground.wrap(ground.raw_neg(&ext.modulus()[0])))
            }
            _ => None,
        }
    }

    /// The underlying prime p
    pub fn prime(&self) -> &BigNum {
        self.base().prime()
    }

    /// Byte length of one serialized prime-field coefficient
    pub fn modulus_size(&self) -> usize {
        self.base().modulus_size()
    }

    /// Byte length of a serialized element
    pub fn element_size(&self) -> usize {
        self.modulus_size() * self.inner.info.basic_degree
    }

    /// The field order p^basic_degree
    pub fn order(&self) -> EpidResult<BigNum> {
        let p = self.prime();
        let mut order = p.clone();
        for _ in 1..self.inner.info.basic_degree {
            order = order.mul(p)?;
        }
        Ok(order)
    }

    pub fn zero(&self) -> FfElement {
        self.wrap(self.raw_zero())
    }

    pub fn one(&self) -> FfElement {
        self.wrap(self.raw_one())
    }

    /// A fresh element, initialized to zero
    pub fn new_element(&self) -> FfElement {
        self.zero()
    }

    /// Embeds an element of the ground field as the constant coefficient
    pub fn from_ground(&self, a: &FfElement) -> EpidResult<FfElement> {
        let ground = self.ground_field().ok_or(EpidError::BadArg)?;
        ground.check(a)?;
        let mut data = a.data.clone();
        data.resize(self.inner.info.element_len, 0);
        Ok(self.wrap(data))
    }

    /// Builds an element from its ground-field coefficients, coefficient 0 first
    pub fn from_coefficients(&self, coeffs: &[FfElement]) -> EpidResult<FfElement> {
        let ground = self.ground_field().ok_or(EpidError::BadArg)?;
        if coeffs.len() != self.degree() {
            return Err(EpidError::BadArg);
        }
        let mut data = Vec::with_capacity(self.inner.info.element_len);
        for c in coeffs {
            ground.check(c)?;
            data.extend_from_slice(&c.data);
        }
        Ok(self.wrap(data))
    }

    /// Splits an element into its ground-field coefficients
    pub fn coefficients(&self, a: &FfElement) -> EpidResult<Vec<FfElement>> {
        self.check(a)?;
        let ground = self.ground_field().ok_or(EpidError::BadArg)?;
        Ok(a
            .data
            .chunks(ground.info().element_len)
            .map(|c| ground.wrap(c.to_vec()))
            .collect())
    }

    /// Reads an element from `degree x modulus_size` big-endian chunks
    ///
    /// For a prime field leading zero bytes beyond the chunk size are
    /// skipped, so a wider big number encoding is accepted. Every chunk
    /// must be below p.
    pub fn read(&self, bytes: &[u8]) -> EpidResult<FfElement> {
        let required = self.element_size();
        let mut bytes = bytes;
        if self.inner.info.basic_degree == 1 {
            while bytes.len() > required && bytes[0] == 0 {
                bytes = &bytes[1..];
            }
        }
        if bytes.is_empty() || bytes.len() > required {
            return Err(EpidError::BadArg);
        }
        let base = self.base();
        if self.inner.info.basic_degree == 1 {
            return Ok(self.wrap(base.read_chunk(bytes)?));
        }
        if bytes.len() != required {
            return Err(EpidError::BadArg);
        }
        let mut data = Vec::with_capacity(self.inner.info.element_len);
        for chunk in bytes.chunks(base.modulus_size()) {
            data.extend(base.read_chunk(chunk)?);
        }
        Ok(self.wrap(data))
    }

    /// Serializes an element into exactly `element_size()` bytes
    pub fn write(&self, a: &FfElement) -> EpidResult<Vec<u8>> {
        self.write_with_len(a, self.element_size())
    }

    /// Serializes an element into `len` bytes
    ///
    /// A prime field element is left-padded with zeros when `len` exceeds
    /// the chunk size; any other length mismatch is `BadArg`.
    pub fn write_with_len(&self, a: &FfElement, len: usize) -> EpidResult<Vec<u8>> {
        self.check(a)?;
        let required = self.element_size();
        let pad = if self.inner.info.basic_degree == 1 && len > required {
            len - required
        } else {
            0
        };
        if len - pad != required {
            return Err(EpidError::BadArg);
        }
        let base = self.base();
        let mut out = vec![0u8; pad];
        for chunk in a.data.chunks(base.limbs()) {
            out.extend(base.write_chunk(chunk));
        }
        Ok(out)
    }

    /// Reduces a big number modulo p into a prime field element
    pub fn element_from_bignum(&self, bn: &BigNum) -> EpidResult<FfElement> {
        let base = match &self.inner.kind {
            FieldKind::Prime(pf) => pf,
            FieldKind::Extension(_) => return Err(EpidError::BadArg),
        };
        Ok(self.wrap(base.from_int(bn.limbs())))
    }

    pub fn neg(&self, a: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        Ok(self.wrap(self.raw_neg(&a.data)))
    }

    /// Multiplicative inverse, `DivByZero` for zero
    pub fn inv(&self, a: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        Ok(self.wrap(self.raw_inv(&a.data)?))
    }

    pub fn add(&self, a: &FfElement, b: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.wrap(self.raw_add(&a.data, &b.data)))
    }

    pub fn sub(&self, a: &FfElement, b: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.wrap(self.raw_sub(&a.data, &b.data)))
    }

    /// Product of two field elements
    ///
    /// When `b` has the shape of the ground field instead, the product is
    /// the ground-scalar multiplication [`FiniteField::mul_by_ground`].
    pub fn mul(&self, a: &FfElement, b: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        if b.info == self.inner.info {
            return Ok(self.wrap(self.raw_mul(&a.data, &b.data)));
        }
        match self.ground_field() {
            Some(ground) if b.info == ground.info() => self.mul_by_ground(a, b),
            _ => Err(EpidError::BadArg),
        }
    }

    /// Multiplies every coefficient of `a` by the ground element `s`
    pub fn mul_by_ground(&self, a: &FfElement, s: &FfElement) -> EpidResult<FfElement> {
        self.check(a)?;
        match &self.inner.kind {
            FieldKind::Extension(ext) => {
                ext.ground().check(s)?;
                Ok(self.wrap(ext.mul_by_ground(&a.data, &s.data)))
            }
            FieldKind::Prime(_) => Err(EpidError::BadArg),
        }
    }

    pub fn square(&self, a: &FfElement) -> EpidResult<FfElement> {
        self.mul(a, a)
    }

    pub fn is_zero(&self, a: &FfElement) -> EpidResult<bool> {
        self.check(a)?;
        Ok(a.data.iter().all(|&l| l == 0))
    }

    pub fn is_equal(&self, a: &FfElement, b: &FfElement) -> EpidResult<bool> {
        self.check(a)?;
        self.check(b)?;
        Ok(a.data == b.data)
    }

    /// a^b
    ///
    /// Runs over every bit of `b`'s capacity, squaring and multiplying on
    /// each step, so the timing depends on the capacity only.
    pub fn exp(&self, a: &FfElement, b: &BigNum) -> EpidResult<FfElement> {
        self.check(a)?;
        let bases = [a.data.as_slice()];
        let exps = [b.limbs()];
        Ok(self.wrap(self.multi_pow(&bases, &exps, b.capacity() * 8)))
    }

    /// Product of `p[i]^b[i]` with big-endian exponent strings
    ///
    /// All strings are walked at the width of the longest one.
    pub fn multi_exp(&self, p: &[&FfElement], b: &[&[u8]]) -> EpidResult<FfElement> {
        if p.is_empty() || p.len() != b.len() {
            return Err(EpidError::BadArg);
        }
        let width = b.iter().map(|e| e.len()).max().unwrap_or(0);
        if width == 0 {
            return Err(EpidError::BadArg);
        }
        let exps: Vec<Vec<u64>> = b
            .iter()
            .map(|e| limbs_from_be_bytes(e, e.len().div_ceil(8)))
            .collect();
        let exp_refs: Vec<&[u64]> = exps.iter().map(|e| e.as_slice()).collect();
        self.multi_exp_limbs(p, &exp_refs, width * 8)
    }

    /// Product of `p[i]^b[i]` with big number exponents
    pub fn multi_exp_bn(&self, p: &[&FfElement], b: &[&BigNum]) -> EpidResult<FfElement> {
        if p.is_empty() || p.len() != b.len() {
            return Err(EpidError::BadArg);
        }
        let width = b.iter().map(|e| e.capacity()).max().unwrap_or(0);
        let exp_refs: Vec<&[u64]> = b.iter().map(|e| e.limbs()).collect();
        self.multi_exp_limbs(p, &exp_refs, width * 8)
    }

    /// Side-channel mitigated multi-exponentiation
    ///
    /// [`FiniteField::multi_exp`] already runs in time independent of the
    /// exponent values, so this is the same computation.
    pub fn sscm_multi_exp(&self, p: &[&FfElement], b: &[&[u8]]) -> EpidResult<FfElement> {
        self.multi_exp(p, b)
    }

    fn multi_exp_limbs(&self, p: &[&FfElement], b: &[&[u64]], bits: usize) -> EpidResult<FfElement> {
        for elem in p {
            self.check(elem)?;
        }
        let bases: Vec<&[u64]> = p.iter().map(|e| e.data.as_slice()).collect();
        Ok(self.wrap(self.multi_pow(&bases, b, bits)))
    }

    /// Hashes a message to a prime field element: `H(msg) mod p`
    ///
    /// Only SHA-256, SHA-384 and SHA-512 are accepted. The message must not
    /// be empty.
    pub fn hash(&self, msg: &[u8], alg: HashAlg) -> EpidResult<FfElement> {
        if msg.is_empty() || msg.len() > i32::MAX as usize {
            return Err(EpidError::BadArg);
        }
        if !matches!(alg, HashAlg::Sha256 | HashAlg::Sha384 | HashAlg::Sha512) {
            return Err(EpidError::HashAlgorithmNotSupported);
        }
        let base = match &self.inner.kind {
            FieldKind::Prime(pf) => pf,
            FieldKind::Extension(_) => return Err(EpidError::BadArg),
        };
        let digest = alg.digest(&[msg])?;
        let value = limbs_from_be_bytes(&digest, digest.len().div_ceil(8));
        Ok(self.wrap(base.from_int(&value)))
    }

    /// Draws a random element not below `low_bound`
    ///
    /// Every prime coefficient takes `bits(p) + 128` fresh bits reduced mod
    /// p. An extension element is compared to the bound as the integer
    /// `sum c_i p^i`. After [`RNG_WATCHDOG`] rejected draws the call fails
    /// with `RandMaxIter`.
    ///
    /// # Arguments
    /// * `low_bound` - Big-endian lower bound (inclusive)
    /// * `rnd` - Source of random bits
    pub fn get_random(&self, low_bound: &[u8], rnd: &mut dyn BitSupplier) -> EpidResult<FfElement> {
        let bound = limbs_from_be_bytes(low_bound, low_bound.len().div_ceil(8).max(1));
        let base = self.base();
        let bits = base.bit_size() + RANDOM_EXTRA_BITS;
        for attempt in 0..RNG_WATCHDOG {
            let mut data = Vec::with_capacity(self.inner.info.element_len);
            for _ in 0..self.inner.info.basic_degree {
                let draw = draw_limbs(rnd, bits)?;
                data.extend(base.from_int(&draw));
            }
            if limbs_cmp(&self.integer_value(&data), &bound) != Ordering::Less {
                return Ok(self.wrap(data));
            }
            trace!("random draw {} below lower bound, retrying", attempt + 1);
        }
        warn!("random element generation gave up after {} attempts", RNG_WATCHDOG);
        Err(EpidError::RandMaxIter)
    }

    // ===== Internal raw-limb API, shared with the extension layer =====

    pub(crate) fn element_len(&self) -> usize {
        self.inner.info.element_len
    }

    /// The prime field at the bottom of the tower
    fn base(&self) -> &PrimeField {
        match &self.inner.kind {
            FieldKind::Prime(pf) => pf,
            FieldKind::Extension(ext) => ext.ground().base(),
        }
    }

    pub(crate) fn check(&self, a: &FfElement) -> EpidResult<()> {
        if a.info != self.inner.info || a.data.len() != self.inner.info.element_len {
            return Err(EpidError::BadArg);
        }
        Ok(())
    }

    pub(crate) fn wrap(&self, data: Vec<u64>) -> FfElement {
        FfElement {
            info: self.inner.info,
            data,
        }
    }

    pub(crate) fn raw_zero(&self) -> Vec<u64> {
        vec![0u64; self.inner.info.element_len]
    }

    pub(crate) fn raw_one(&self) -> Vec<u64> {
        match &self.inner.kind {
            FieldKind::Prime(pf) => pf.one(),
            FieldKind::Extension(ext) => ext.one(),
        }
    }

    pub(crate) fn raw_add(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        match &self.inner.kind {
            FieldKind::Prime(pf) => pf.add(a, b),
            FieldKind::Extension(ext) => ext.add(a, b),
        }
    }

    pub(crate) fn raw_sub(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        match &self.inner.kind {
            FieldKind::Prime(pf) => pf.sub(a, b),
            FieldKind::Extension(ext) => ext.sub(a, b),
        }
    }

    pub(crate) fn raw_neg(&self, a: &[u64]) -> Vec<u64> {
        match &self.inner.kind {
            FieldKind::Prime(pf) => pf.neg(a),
            FieldKind::Extension(ext) => ext.neg(a),
        }
    }

    pub(crate) fn raw_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        match &self.inner.kind {
            FieldKind::Prime(pf) => pf.mul(a, b),
            FieldKind::Extension(ext) => ext.mul(a, b),
        }
    }

    pub(crate) fn raw_inv(&self, a: &[u64]) -> EpidResult<Vec<u64>> {
        match &self.inner.kind {
            FieldKind::Prime(pf) => {
                if a.iter().all(|&l| l == 0) {
                    return Err(EpidError::DivByZero);
                }
                Ok(pf.inv(a))
            }
            FieldKind::Extension(ext) => ext.inv(a),
        }
    }

    /// Interleaved square-and-multiply over `bits` exponent bits
    ///
    /// Every step computes both the plain and the multiplied accumulator and
    /// keeps one by mask, so the work done does not depend on the bits.
    fn multi_pow(&self, bases: &[&[u64]], exps: &[&[u64]], bits: usize) -> Vec<u64> {
        let mut acc = self.raw_one();
        for i in (0..bits).rev() {
            acc = self.raw_mul(&acc, &acc);
            for (base, exp) in bases.iter().zip(exps) {
                let prod = self.raw_mul(&acc, base);
                select(&mut acc, &prod, limbs_get_bit(exp, i));
            }
        }
        acc
    }

    /// Integer `sum c_i p^i` of the plain coefficient values
    fn integer_value(&self, data: &[u64]) -> Vec<u64> {
        let base = self.base();
        let p = base.prime().limbs();
        let mut value: Vec<u64> = Vec::new();
        for chunk in data.chunks(base.limbs()).rev() {
            let shifted = limbs_mul(&value, p);
            let c = base.to_int(chunk);
            let mut next = vec![0u64; shifted.len().max(c.len()) + 1];
            limbs_add(&mut next, &shifted, &c);
            value = next;
        }
        let used = limbs_bit_length(&value).div_ceil(64).max(1);
        value.truncate(used);
        value
    }
}

/// `acc = if bit { prod } else { acc }` without branching on `bit`
fn select(acc: &mut [u64], prod: &[u64], bit: bool) {
    let mask = 0u64.wrapping_sub(bit as u64);
    for (a, p) in acc.iter_mut().zip(prod) {
        *a = (*a & !mask) | (p & mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bignum::hex_to_bytes;

    const Q: &str = "FFFFFFFFFFFCF0CD46E5F25EEE71A49F0CDC65FB12980A82D3292DDBAED33013";

    fn fq() -> FiniteField {
        FiniteField::new_prime(&hex_to_bytes(Q).unwrap()).unwrap()
    }

    fn small(p: u8) -> FiniteField {
        FiniteField::new_prime(&[p]).unwrap()
    }

    /// Fq2 = Fq[u] / (u^2 + 1)
    fn fq2() -> FiniteField {
        let fq = fq();
        let minus_one = fq.neg(&fq.one()).unwrap();
        FiniteField::new_binomial_extension(&fq, &minus_one, 2).unwrap()
    }

    #[test]
    fn test_info_shapes() {
        let fq = fq();
        assert_eq!(
            fq.info(),
            FieldInfo {
                element_len: 4,
                basic_degree: 1,
                ground_degree: 1
            }
        );
        let fq2 = fq2();
        assert_eq!(fq2.info().element_len, 8);
        assert_eq!(fq2.info().basic_degree, 2);
        assert_eq!(fq2.element_size(), 64);
        assert!(fq.ground_field().is_none());
        assert_eq!(fq2.ground_field().unwrap().info(), fq.info());
    }

    #[test]
    fn test_read_write_prime_padding() {
        let f = small(97);
        let a = f.read(&[0, 0, 0, 42]).unwrap();
        assert_eq!(f.write(&a).unwrap(), vec![42]);
        assert_eq!(f.write_with_len(&a, 4).unwrap(), vec![0, 0, 0, 42]);
        assert_eq!(f.read(&[1, 42]).unwrap_err(), EpidError::BadArg);
        assert_eq!(f.read(&[97]).unwrap_err(), EpidError::BadArg);
        assert_eq!(f.read(&[]).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_extension_read_requires_exact_length() {
        let fq2 = fq2();
        assert_eq!(fq2.read(&[1u8; 63]).unwrap_err(), EpidError::BadArg);
        let bytes = [[0u8; 31].as_slice(), &[5], &[0u8; 31], &[7]].concat();
        let a = fq2.read(&bytes).unwrap();
        assert_eq!(fq2.write(&a).unwrap(), bytes);
        assert_eq!(fq2.write_with_len(&a, 65).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_arithmetic_small_prime() {
        let f = small(97);
        let a = f.read(&[50]).unwrap();
        let b = f.read(&[60]).unwrap();
        assert_eq!(f.write(&f.add(&a, &b).unwrap()).unwrap(), vec![13]);
        assert_eq!(f.write(&f.sub(&a, &b).unwrap()).unwrap(), vec![87]);
        assert_eq!(f.write(&f.mul(&a, &b).unwrap()).unwrap(), vec![(3000 % 97) as u8]);
        assert_eq!(f.write(&f.neg(&a).unwrap()).unwrap(), vec![47]);
        let inv = f.inv(&a).unwrap();
        assert!(f.is_equal(&f.mul(&a, &inv).unwrap(), &f.one()).unwrap());
    }

    #[test]
    fn test_inverse_of_zero() {
        assert_eq!(fq().inv(&fq().zero()).unwrap_err(), EpidError::DivByZero);
        assert_eq!(fq2().inv(&fq2().zero()).unwrap_err(), EpidError::DivByZero);
    }

    #[test]
    fn test_extension_mul_and_inverse() {
        let fq2 = fq2();
        let fq = fq();
        let a = fq2
            .from_coefficients(&[fq.read(&[3]).unwrap(), fq.read(&[4]).unwrap()])
            .unwrap();
        // (3 + 4u)^2 = 9 - 16 + 24u
        let sq = fq2.square(&a).unwrap();
        let c = fq2.coefficients(&sq).unwrap();
        let minus_seven = fq.neg(&fq.read(&[7]).unwrap()).unwrap();
        assert_eq!(c[0], minus_seven);
        assert_eq!(c[1], fq.read(&[24]).unwrap());
        let inv = fq2.inv(&a).unwrap();
        assert_eq!(fq2.mul(&a, &inv).unwrap(), fq2.one());
    }

    #[test]
    fn test_mul_detects_ground_operand() {
        let fq2 = fq2();
        let fq = fq();
        let a = fq2
            .from_coefficients(&[fq.read(&[3]).unwrap(), fq.read(&[4]).unwrap()])
            .unwrap();
        let two = fq.read(&[2]).unwrap();
        let by_shape = fq2.mul(&a, &two).unwrap();
        let explicit = fq2.mul_by_ground(&a, &two).unwrap();
        assert_eq!(by_shape, explicit);
        let embedded = fq2.from_ground(&two).unwrap();
        assert_eq!(fq2.mul(&a, &embedded).unwrap(), explicit);
    }

    #[test]
    fn test_shape_mismatch_is_bad_arg() {
        let f97 = small(97);
        let fq = fq();
        assert_eq!(fq.add(&fq.one(), &fq2().one()).unwrap_err(), EpidError::BadArg);
        assert_eq!(f97.mul_by_ground(&f97.one(), &f97.one()).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_exp_matches_repeated_mul() {
        let fq2 = fq2();
        let fq = fq();
        let a = fq2
            .from_coefficients(&[fq.read(&[9]).unwrap(), fq.read(&[11]).unwrap()])
            .unwrap();
        let three = BigNum::from_u64(32, 3).unwrap();
        let cube = fq2.mul(&fq2.mul(&a, &a).unwrap(), &a).unwrap();
        assert_eq!(fq2.exp(&a, &three).unwrap(), cube);
        let zero = BigNum::new(4).unwrap();
        assert_eq!(fq2.exp(&a, &zero).unwrap(), fq2.one());
    }

    #[test]
    fn test_multi_exp() {
        let f = small(97);
        let a = f.read(&[5]).unwrap();
        let b = f.read(&[7]).unwrap();
        // 5^3 * 7^2 = 6125 = 14 mod 97
        let r = f.multi_exp(&[&a, &b], &[&[3u8][..], &[0u8, 2][..]]).unwrap();
        assert_eq!(f.write(&r).unwrap(), vec![(6125 % 97) as u8]);
        let e3 = BigNum::from_u64(1, 3).unwrap();
        let e2 = BigNum::from_u64(8, 2).unwrap();
        assert_eq!(f.multi_exp_bn(&[&a, &b], &[&e3, &e2]).unwrap(), r);
        assert_eq!(f.sscm_multi_exp(&[&a, &b], &[&[3u8][..], &[2u8][..]]).unwrap(), r);
        assert_eq!(f.multi_exp(&[], &[]).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_hash() {
        let fq = fq();
        let h = fq.hash(b"abc", HashAlg::Sha256).unwrap();
        let digest = BigNum::from_bytes(&HashAlg::Sha256.digest(&[b"abc".as_slice()]).unwrap()).unwrap();
        let expected = digest.modulo(fq.prime()).unwrap();
        assert_eq!(fq.write(&h).unwrap(), expected.write(32).unwrap());
        assert_eq!(fq.hash(b"", HashAlg::Sha256).unwrap_err(), EpidError::BadArg);
        assert_eq!(
            fq.hash(b"abc", HashAlg::Sha3_256).unwrap_err(),
            EpidError::HashAlgorithmNotSupported
        );
        assert_eq!(fq2().hash(b"abc", HashAlg::Sha256).unwrap_err(), EpidError::BadArg);
    }

    #[test]
    fn test_get_random_respects_bound() {
        let f = small(97);
        let mut counter = 0u32;
        let mut rnd = |buf: &mut [u32], _bits: usize| -> EpidResult<()> {
            counter += 1;
            buf.iter_mut().for_each(|w| *w = 0);
            buf[0] = 10 + counter;
            Ok(())
        };
        let r = f.get_random(&[13], &mut rnd).unwrap();
        assert_eq!(f.write(&r).unwrap(), vec![13]);
    }

    #[test]
    fn test_get_random_watchdog() {
        let f = small(97);
        let mut calls = 0usize;
        let mut zeros = |buf: &mut [u32], _bits: usize| -> EpidResult<()> {
            calls += 1;
            buf.iter_mut().for_each(|w| *w = 0);
            Ok(())
        };
        assert_eq!(f.get_random(&[96], &mut zeros).unwrap_err(), EpidError::RandMaxIter);
        assert_eq!(calls, RNG_WATCHDOG);
    }

    #[test]
    fn test_element_from_bignum_reduces() {
        let f = small(97);
        let bn = BigNum::from_u64(8, 1000).unwrap();
        let e = f.element_from_bignum(&bn).unwrap();
        assert_eq!(f.write(&e).unwrap(), vec![(1000 % 97) as u8]);
        assert_eq!(fq2().element_from_bignum(&bn).unwrap_err(), EpidError::BadArg);
    }
}
