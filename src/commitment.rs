//! EPID 1.1 commitment hash
//!
//! The challenge of an EPID 1.1 signature is
//! `c = SHA256(SHA256(values) || nonce || be32(msg_len) || msg)` where
//! `values` is the packed encoding of the public key, the group parameters
//! and the values recomputed by the verifier.

use crate::ecgroup::{EcGroup, EcPoint};
use crate::error::{EpidError, EpidResult};
use crate::field::{FfElement, FiniteField};
use crate::hash::HashAlg;
use crate::params::Epid11Groups;

/// Width of the group order p
pub const EPID11_ORDER_SIZE: usize = 32;
/// Width of a G1 or G3 point
pub const EPID11_G1_POINT_SIZE: usize = 64;
/// Width of a G2 point
pub const EPID11_G2_POINT_SIZE: usize = 192;
/// Width of a GT element
pub const EPID11_GT_SIZE: usize = 192;
/// Length of the verifier nonce (80 bits)
pub const EPID11_NONCE_SIZE: usize = 10;

/// Length of [`Epid11CommitValues::to_bytes`]
pub const EPID11_COMMIT_VALUES_SIZE: usize = EPID11_ORDER_SIZE
    + 11 * EPID11_G1_POINT_SIZE
    + 2 * EPID11_G2_POINT_SIZE
    + EPID11_GT_SIZE;

/// Values hashed into the commitment, each at its fixed encoding width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epid11CommitValues {
    pub p: [u8; EPID11_ORDER_SIZE],
    pub g1: [u8; EPID11_G1_POINT_SIZE],
    pub g2: [u8; EPID11_G2_POINT_SIZE],
    pub g3: [u8; EPID11_G1_POINT_SIZE],
    pub h1: [u8; EPID11_G1_POINT_SIZE],
    pub h2: [u8; EPID11_G1_POINT_SIZE],
    pub w: [u8; EPID11_G2_POINT_SIZE],
    pub b: [u8; EPID11_G1_POINT_SIZE],
    pub k: [u8; EPID11_G1_POINT_SIZE],
    pub t1: [u8; EPID11_G1_POINT_SIZE],
    pub t2: [u8; EPID11_G1_POINT_SIZE],
    pub r1: [u8; EPID11_G1_POINT_SIZE],
    pub r2: [u8; EPID11_G1_POINT_SIZE],
    pub r3: [u8; EPID11_G1_POINT_SIZE],
    pub r4: [u8; EPID11_GT_SIZE],
}

impl Default for Epid11CommitValues {
    fn default() -> Self {
        Self {
            p: [0; EPID11_ORDER_SIZE],
            g1: [0; EPID11_G1_POINT_SIZE],
            g2: [0; EPID11_G2_POINT_SIZE],
            g3: [0; EPID11_G1_POINT_SIZE],
            h1: [0; EPID11_G1_POINT_SIZE],
            h2: [0; EPID11_G1_POINT_SIZE],
            w: [0; EPID11_G2_POINT_SIZE],
            b: [0; EPID11_G1_POINT_SIZE],
            k: [0; EPID11_G1_POINT_SIZE],
            t1: [0; EPID11_G1_POINT_SIZE],
            t2: [0; EPID11_G1_POINT_SIZE],
            r1: [0; EPID11_G1_POINT_SIZE],
            r2: [0; EPID11_G1_POINT_SIZE],
            r3: [0; EPID11_G1_POINT_SIZE],
            r4: [0; EPID11_GT_SIZE],
        }
    }
}

impl Epid11CommitValues {
    /// Fills in the group parameters and the public key
    ///
    /// # Arguments
    /// * `groups` - Provides p and the generators g1, g2, g3
    /// * `h1`, `h2` - Public key points of G1
    /// * `w` - Public key point of G2
    pub fn set_key_specific(
        &mut self,
        groups: &Epid11Groups,
        h1: &EcPoint,
        h2: &EcPoint,
        w: &EcPoint,
    ) -> EpidResult<()> {
        self.p = fixed(groups.p.write(EPID11_ORDER_SIZE)?)?;
        self.g1 = point(&groups.g1, groups.g1.generator())?;
        self.g2 = point(&groups.g2, groups.g2.generator())?;
        self.g3 = point(&groups.g3, groups.g3.generator())?;
        self.h1 = point(&groups.g1, h1)?;
        self.h2 = point(&groups.g1, h2)?;
        self.w = point(&groups.g2, w)?;
        Ok(())
    }

    /// Fills in the values recomputed while verifying a signature
    ///
    /// `b`, `k` and `r3` are points of G3, `t1`, `t2`, `r1` and `r2` points
    /// of G1 and `r4` an element of GT.
    #[allow(clippy::too_many_arguments)]
    pub fn set_calculated(
        &mut self,
        groups: &Epid11Groups,
        b: &EcPoint,
        k: &EcPoint,
        t1: &EcPoint,
        t2: &EcPoint,
        r1: &EcPoint,
        r2: &EcPoint,
        r3: &EcPoint,
        r4: &FfElement,
    ) -> EpidResult<()> {
        self.b = point(&groups.g3, b)?;
        self.k = point(&groups.g3, k)?;
        self.t1 = point(&groups.g1, t1)?;
        self.t2 = point(&groups.g1, t2)?;
        self.r1 = point(&groups.g1, r1)?;
        self.r2 = point(&groups.g1, r2)?;
        self.r3 = point(&groups.g3, r3)?;
        self.r4 = gt_element(&groups.gt, r4)?;
        Ok(())
    }

    /// Packed encoding, fields in declaration order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EPID11_COMMIT_VALUES_SIZE);
        let parts = [
            &self.p[..],
            &self.g1[..],
            &self.g2[..],
            &self.g3[..],
            &self.h1[..],
            &self.h2[..],
            &self.w[..],
            &self.b[..],
            &self.k[..],
            &self.t1[..],
            &self.t2[..],
            &self.r1[..],
            &self.r2[..],
            &self.r3[..],
            &self.r4[..],
        ];
        for part in parts {
            out.extend_from_slice(part);
        }
        out
    }

    /// Parses the packed encoding produced by [`Epid11CommitValues::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> EpidResult<Self> {
        if bytes.len() != EPID11_COMMIT_VALUES_SIZE {
            return Err(EpidError::BadArg);
        }
        let mut rest = bytes;
        let mut take = |n: usize| -> EpidResult<Vec<u8>> {
            if rest.len() < n {
                return Err(EpidError::BadArg);
            }
            let (head, tail) = rest.split_at(n);
            rest = tail;
            Ok(head.to_vec())
        };
        Ok(Self {
            p: fixed(take(EPID11_ORDER_SIZE)?)?,
            g1: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            g2: fixed(take(EPID11_G2_POINT_SIZE)?)?,
            g3: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            h1: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            h2: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            w: fixed(take(EPID11_G2_POINT_SIZE)?)?,
            b: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            k: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            t1: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            t2: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            r1: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            r2: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            r3: fixed(take(EPID11_G1_POINT_SIZE)?)?,
            r4: fixed(take(EPID11_GT_SIZE)?)?,
        })
    }
}

/// Computes the EPID 1.1 challenge
///
/// # Arguments
/// * `values` - Commitment values
/// * `msg` - Signed message
/// * `nonce` - 80-bit verifier nonce
///
/// # Returns
/// The SHA-256 digest, or `BadArg` if the message length does not fit the
/// 32-bit length field
pub fn calculate_epid11_commitment_hash(
    values: &Epid11CommitValues,
    msg: &[u8],
    nonce: &[u8; EPID11_NONCE_SIZE],
) -> EpidResult<[u8; 32]> {
    let msg_len = u32::try_from(msg.len()).map_err(|_| EpidError::BadArg)?;
    let inner = HashAlg::Sha256.digest(&[values.to_bytes().as_slice()])?;
    let outer = HashAlg::Sha256.digest(&[&inner[..], &nonce[..], &msg_len.to_be_bytes()[..], msg])?;
    fixed(outer)
}

fn point<const N: usize>(group: &EcGroup, p: &EcPoint) -> EpidResult<[u8; N]> {
    fixed(group.write_point(p)?)
}

fn gt_element(gt: &FiniteField, a: &FfElement) -> EpidResult<[u8; EPID11_GT_SIZE]> {
    fixed(gt.write(a)?)
}

/// Checks an encoding has exactly the slot width
fn fixed<const N: usize>(bytes: Vec<u8>) -> EpidResult<[u8; N]> {
    bytes.try_into().map_err(|_| EpidError::BadArg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned() -> Vec<u8> {
        (0..EPID11_COMMIT_VALUES_SIZE)
            .map(|i| ((i * 7 + 3) & 0xff) as u8)
            .collect()
    }

    #[test]
    fn test_layout_size() {
        assert_eq!(EPID11_COMMIT_VALUES_SIZE, 1312);
        assert_eq!(Epid11CommitValues::default().to_bytes().len(), 1312);
    }

    #[test]
    fn test_from_bytes_keeps_field_order() {
        let bytes = patterned();
        let values = Epid11CommitValues::from_bytes(&bytes).unwrap();
        assert_eq!(values.p[..], bytes[..32]);
        assert_eq!(values.g1[..], bytes[32..96]);
        assert_eq!(values.r4[..], bytes[1312 - 192..]);
        assert_eq!(values.to_bytes(), bytes);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert_eq!(
            Epid11CommitValues::from_bytes(&[0u8; 1311]).unwrap_err(),
            EpidError::BadArg
        );
        // ten G1 slots instead of eleven
        assert_eq!(
            Epid11CommitValues::from_bytes(&[0u8; 1248]).unwrap_err(),
            EpidError::BadArg
        );
    }

    #[test]
    fn test_size_matches_encoding() {
        let values = Epid11CommitValues::from_bytes(&patterned()).unwrap();
        let bytes = values.to_bytes();
        assert_eq!(bytes.len(), EPID11_COMMIT_VALUES_SIZE);
        assert_eq!(Epid11CommitValues::from_bytes(&bytes).unwrap(), values);
    }

    #[test]
    fn test_commitment_hash_known_answer() {
        let values = Epid11CommitValues::from_bytes(&patterned()).unwrap();
        let nonce = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let c = calculate_epid11_commitment_hash(&values, b"", &nonce).unwrap();
        assert_eq!(
            crate::bignum::bytes_to_hex(&c),
            "45500CCE1F8FE8E2CF95B81C97709E64BA79BE4C6252380E31BAF72A8701F4C1"
        );
    }

    #[test]
    fn test_commitment_hash_depends_on_nonce() {
        let values = Epid11CommitValues::default();
        let a = calculate_epid11_commitment_hash(&values, b"msg", &[0u8; 10]).unwrap();
        let b = calculate_epid11_commitment_hash(&values, b"msg", &[1u8; 10]).unwrap();
        assert_ne!(a, b);
    }
}
