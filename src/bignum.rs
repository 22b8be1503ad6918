//! Arbitrary precision unsigned integers with a fixed capacity
//!
//! A `BigNum` is created with a capacity in bytes and never grows past it:
//! any operation whose result would not fit reports `EpidError::BadArg`
//! instead of wrapping. Limbs are stored little-endian (limbs[0] is least
//! significant); the octet string encoding is big-endian.
//!
//! The free functions at the bottom of this file operate on raw limb slices
//! and are shared with the Montgomery and finite field layers.

use crate::error::{EpidError, EpidResult};
use std::cmp::Ordering;
use std::fmt;

/// Unsigned big integer with a capacity fixed at construction
#[derive(Clone)]
pub struct BigNum {
    /// Limbs in little-endian order, always `capacity.div_ceil(8)` long
    limbs: Vec<u64>,
    /// Capacity in bytes
    capacity: usize,
}

impl BigNum {
    /// Creates a zero-valued BigNum able to hold `capacity` bytes
    ///
    /// # Arguments
    /// * `capacity` - Maximum size of the value in bytes
    ///
    /// # Returns
    /// The new BigNum, or `BadArg` for a zero capacity
    pub fn new(capacity: usize) -> EpidResult<Self> {
        if capacity == 0 {
            return Err(EpidError::BadArg);
        }
        Ok(Self {
            limbs: vec![0u64; capacity.div_ceil(8)],
            capacity,
        })
    }

    /// Creates a BigNum from a big-endian octet string, capacity = string length
    pub fn from_bytes(bytes: &[u8]) -> EpidResult<Self> {
        let mut bn = Self::new(bytes.len())?;
        bn.read(bytes)?;
        Ok(bn)
    }

    /// Creates a BigNum holding a small value
    pub fn from_u64(capacity: usize, value: u64) -> EpidResult<Self> {
        let mut bn = Self::new(capacity)?;
        bn.limbs[0] = value;
        bn.check_fits()?;
        Ok(bn)
    }

    /// Parses a big-endian hex string (no "0x" prefix)
    ///
    /// The capacity is the number of bytes the digits describe.
    pub fn from_hex(hex: &str) -> EpidResult<Self> {
        let bytes = hex_to_bytes(hex)?;
        Self::from_bytes(&bytes)
    }

    /// Capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a copy of this value with a different capacity
    ///
    /// Fails with `BadArg` if the value does not fit in the new capacity.
    pub fn with_capacity(&self, capacity: usize) -> EpidResult<Self> {
        let mut out = Self::new(capacity)?;
        out.set_limbs(&self.limbs)?;
        Ok(out)
    }

    /// Parses a big-endian octet string into this BigNum
    ///
    /// Leading zero bytes are ignored, so an all-zero string of any length
    /// reads as zero. The significant bytes must fit the capacity.
    pub fn read(&mut self, bytes: &[u8]) -> EpidResult<()> {
        if bytes.is_empty() {
            return Err(EpidError::BadArg);
        }
        let first = bytes.iter().position(|&b| b != 0);
        let significant = match first {
            Some(idx) => &bytes[idx..],
            None => {
                self.limbs.iter_mut().for_each(|l| *l = 0);
                return Ok(());
            }
        };
        if significant.len() > self.capacity {
            return Err(EpidError::BadArg);
        }
        self.limbs = limbs_from_be_bytes(significant, self.limbs.len());
        Ok(())
    }

    /// Serializes into a big-endian octet string of exactly `len` bytes
    ///
    /// Fails with `BadArg` if the value needs more than `len` bytes.
    pub fn write(&self, len: usize) -> EpidResult<Vec<u8>> {
        if len == 0 || self.bit_length().div_ceil(8) > len {
            return Err(EpidError::BadArg);
        }
        Ok(limbs_to_be_bytes(&self.limbs, len))
    }

    /// Serializes at the full capacity width
    pub fn to_bytes(&self) -> Vec<u8> {
        limbs_to_be_bytes(&self.limbs, self.capacity)
    }

    /// Sum of two numbers; the result capacity is the larger operand capacity
    pub fn add(&self, other: &Self) -> EpidResult<Self> {
        let mut out = Self::new(self.capacity.max(other.capacity))?;
        let carry = limbs_add(&mut out.limbs, &self.limbs, &other.limbs);
        if carry {
            return Err(EpidError::BadArg);
        }
        out.check_fits()?;
        Ok(out)
    }

    /// Difference of two numbers
    ///
    /// Defined only for non-negative results; fails with `Underflow` when
    /// `other > self`.
    pub fn sub(&self, other: &Self) -> EpidResult<Self> {
        if limbs_cmp(&self.limbs, &other.limbs) == Ordering::Less {
            return Err(EpidError::Underflow);
        }
        let mut out = Self::new(self.capacity.max(other.capacity))?;
        limbs_sub(&mut out.limbs, &self.limbs, &other.limbs);
        Ok(out)
    }

    /// Product of two numbers; the result capacity is the sum of capacities
    pub fn mul(&self, other: &Self) -> EpidResult<Self> {
        let mut out = Self::new(self.capacity + other.capacity)?;
        let prod = limbs_mul(&self.limbs, &other.limbs);
        out.set_limbs(&prod)?;
        Ok(out)
    }

    /// Quotient and remainder of `self / divisor`
    ///
    /// # Returns
    /// `(quotient, remainder)` with the capacities of `self` and `divisor`,
    /// or `DivByZero` for a zero divisor
    pub fn div_rem(&self, divisor: &Self) -> EpidResult<(Self, Self)> {
        if divisor.is_zero() {
            return Err(EpidError::DivByZero);
        }
        let (q, r) = limbs_div_rem(&self.limbs, &divisor.limbs);
        let mut quotient = Self::new(self.capacity)?;
        quotient.set_limbs(&q)?;
        let mut remainder = Self::new(divisor.capacity)?;
        remainder.set_limbs(&r)?;
        Ok((quotient, remainder))
    }

    /// `self mod modulus`
    pub fn modulo(&self, modulus: &Self) -> EpidResult<Self> {
        Ok(self.div_rem(modulus)?.1)
    }

    pub fn is_even(&self) -> bool {
        self.limbs[0] & 1 == 0
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Computes 2^n by repeated doubling into a BigNum of `capacity` bytes
    pub fn pow2n(capacity: usize, n: usize) -> EpidResult<Self> {
        let mut out = Self::from_u64(capacity, 1)?;
        for _ in 0..n {
            out = out.add(&out)?;
        }
        Ok(out)
    }

    /// Bit length (position of highest set bit + 1), zero for zero
    pub fn bit_length(&self) -> usize {
        limbs_bit_length(&self.limbs)
    }

    /// Returns bit `idx` (little-endian numbering)
    pub fn get_bit(&self, idx: usize) -> bool {
        limbs_get_bit(&self.limbs, idx)
    }

    /// Limbs in little-endian order
    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    /// Uppercase hex without leading zeros ("00" for zero)
    pub fn to_hex(&self) -> String {
        let len = self.bit_length().div_ceil(8).max(1);
        let bytes = limbs_to_be_bytes(&self.limbs, len);
        bytes_to_hex(&bytes)
    }

    /// Builds a BigNum of the given capacity from raw limbs
    pub(crate) fn from_limbs(capacity: usize, limbs: &[u64]) -> EpidResult<Self> {
        let mut out = Self::new(capacity)?;
        out.set_limbs(limbs)?;
        Ok(out)
    }

    fn set_limbs(&mut self, src: &[u64]) -> EpidResult<()> {
        if limbs_bit_length(src) > self.capacity * 8 {
            return Err(EpidError::BadArg);
        }
        for (i, limb) in self.limbs.iter_mut().enumerate() {
            *limb = src.get(i).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn check_fits(&self) -> EpidResult<()> {
        if self.bit_length() > self.capacity * 8 {
            return Err(EpidError::BadArg);
        }
        Ok(())
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        limbs_cmp(&self.limbs, &other.limbs) == Ordering::Equal
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> Ordering {
        limbs_cmp(&self.limbs, &other.limbs)
    }
}

impl fmt::Debug for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigNum[{}](0x{})", self.capacity, self.to_hex())
    }
}

impl fmt::Display for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

// ===== Limb slice arithmetic =====

/// Compares two little-endian limb slices of possibly different lengths
pub(crate) fn limbs_cmp(a: &[u64], b: &[u64]) -> Ordering {
    let n = a.len().max(b.len());
    for i in (0..n).rev() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// out = a + b, returns the carry out of `out`'s top limb
pub(crate) fn limbs_add(out: &mut [u64], a: &[u64], b: &[u64]) -> bool {
    let mut carry = 0u64;
    for (i, o) in out.iter_mut().enumerate() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        let (s1, c1) = x.overflowing_add(y);
        let (s2, c2) = s1.overflowing_add(carry);
        *o = s2;
        carry = (c1 || c2) as u64;
    }
    let spill = a.iter().skip(out.len()).chain(b.iter().skip(out.len())).any(|&l| l != 0);
    carry != 0 || spill
}

/// out = a - b, returns the borrow
pub(crate) fn limbs_sub(out: &mut [u64], a: &[u64], b: &[u64]) -> bool {
    let mut borrow = 0u64;
    for (i, o) in out.iter_mut().enumerate() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        let (d1, b1) = x.overflowing_sub(y);
        let (d2, b2) = d1.overflowing_sub(borrow);
        *o = d2;
        borrow = (b1 || b2) as u64;
    }
    borrow != 0
}

/// Schoolbook product, result has `a.len() + b.len()` limbs
pub(crate) fn limbs_mul(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut out = vec![0u64; a.len() + b.len()];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        let mut carry: u128 = 0;
        for (j, &bj) in b.iter().enumerate() {
            let uv = out[i + j] as u128 + (ai as u128) * (bj as u128) + carry;
            out[i + j] = uv as u64;
            carry = uv >> 64;
        }
        let mut k = i + b.len();
        while carry != 0 && k < out.len() {
            let uv = out[k] as u128 + carry;
            out[k] = uv as u64;
            carry = uv >> 64;
            k += 1;
        }
    }
    out
}

/// Bitwise long division; `divisor` must be non-zero
///
/// Returns `(quotient, remainder)` with `a.len()` and `divisor.len()` limbs.
pub(crate) fn limbs_div_rem(a: &[u64], divisor: &[u64]) -> (Vec<u64>, Vec<u64>) {
    let mut quotient = vec![0u64; a.len()];
    // one extra limb so the shifted remainder never loses its top bit
    let mut remainder = vec![0u64; divisor.len() + 1];
    let bits = limbs_bit_length(a);
    for i in (0..bits).rev() {
        limbs_shl1(&mut remainder);
        if limbs_get_bit(a, i) {
            remainder[0] |= 1;
        }
        if limbs_cmp(&remainder, divisor) != Ordering::Less {
            let r = remainder.clone();
            limbs_sub(&mut remainder, &r, divisor);
            quotient[i / 64] |= 1u64 << (i % 64);
        }
    }
    remainder.truncate(divisor.len());
    (quotient, remainder)
}

/// In-place left shift by one bit, dropping the top bit
pub(crate) fn limbs_shl1(x: &mut [u64]) {
    let mut carry = 0u64;
    for limb in x.iter_mut() {
        let next = *limb >> 63;
        *limb = (*limb << 1) | carry;
        carry = next;
    }
}

/// In-place right shift by one bit
pub(crate) fn limbs_shr1(x: &mut [u64]) {
    let mut carry = 0u64;
    for limb in x.iter_mut().rev() {
        let next = *limb & 1;
        *limb = (*limb >> 1) | (carry << 63);
        carry = next;
    }
}

pub(crate) fn limbs_bit_length(x: &[u64]) -> usize {
    for i in (0..x.len()).rev() {
        if x[i] != 0 {
            return (i + 1) * 64 - x[i].leading_zeros() as usize;
        }
    }
    0
}

pub(crate) fn limbs_get_bit(x: &[u64], idx: usize) -> bool {
    let limb = idx / 64;
    limb < x.len() && (x[limb] >> (idx % 64)) & 1 == 1
}

pub(crate) fn limbs_is_zero(x: &[u64]) -> bool {
    x.iter().all(|&l| l == 0)
}

/// Big-endian bytes to `n` little-endian limbs; excess high bytes are dropped
pub(crate) fn limbs_from_be_bytes(bytes: &[u8], n: usize) -> Vec<u64> {
    let mut limbs = vec![0u64; n];
    for (i, &byte) in bytes.iter().rev().enumerate() {
        let limb_idx = i / 8;
        if limb_idx < n {
            limbs[limb_idx] |= (byte as u64) << ((i % 8) * 8);
        }
    }
    limbs
}

/// Little-endian limbs to exactly `len` big-endian bytes (truncating high bytes)
pub(crate) fn limbs_to_be_bytes(limbs: &[u64], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    for (i, byte) in out.iter_mut().rev().enumerate() {
        let limb_idx = i / 8;
        if limb_idx < limbs.len() {
            *byte = (limbs[limb_idx] >> ((i % 8) * 8)) as u8;
        }
    }
    out
}

/// Decodes a hex string, padding odd lengths with a leading zero
pub fn hex_to_bytes(hex: &str) -> EpidResult<Vec<u8>> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.is_empty() {
        return Err(EpidError::BadArg);
    }
    let decoded = if hex.len() % 2 == 1 {
        hex::decode(format!("0{}", hex))
    } else {
        hex::decode(hex)
    };
    decoded.map_err(|_| EpidError::BadArg)
}

/// Uppercase hex encoding
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}
