//! Message digests used by hash-to-field and hash-to-curve

use crate::error::{EpidError, EpidResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Hash algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlg {
    Sha256,
    Sha384,
    Sha512,
    Sha512_256,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl HashAlg {
    /// Digest of the concatenation of `parts`
    ///
    /// Only the SHA-2 family members 256/384/512 are available; every other
    /// selector fails with `HashAlgorithmNotSupported`.
    pub fn digest(self, parts: &[&[u8]]) -> EpidResult<Vec<u8>> {
        match self {
            HashAlg::Sha256 => Ok(run::<Sha256>(parts)),
            HashAlg::Sha384 => Ok(run::<Sha384>(parts)),
            HashAlg::Sha512 => Ok(run::<Sha512>(parts)),
            _ => Err(EpidError::HashAlgorithmNotSupported),
        }
    }

    /// Digest size in bytes, `None` for unsupported selectors
    pub fn output_len(self) -> Option<usize> {
        match self {
            HashAlg::Sha256 => Some(32),
            HashAlg::Sha384 => Some(48),
            HashAlg::Sha512 => Some(64),
            _ => None,
        }
    }

    pub fn is_supported(self) -> bool {
        self.output_len().is_some()
    }
}

fn run<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}
