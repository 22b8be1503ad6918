//! Intel EPID math core
//!
//! Big numbers, towers of finite fields, elliptic curve groups and the two
//! pairings used by EPID: the optimal ate pairing of EPID 2.0 and the Tate
//! pairing of EPID 1.1, plus the EPID 1.1 commitment hash.
//!
//! Every operation returns an [`EpidResult`]; nothing panics on bad input.
//! Logging goes through the `log` facade and no logger is installed here.

/// Fixed capacity big integers
pub mod bignum;
/// EPID 1.1 commitment values and challenge hash
pub mod commitment;
/// Elliptic curve groups and hash-to-curve
pub mod ecgroup;
/// Status codes
pub mod error;
/// Prime fields and their extensions
pub mod field;
/// Digest selection
pub mod hash;
/// Montgomery modular arithmetic context
pub mod montgomery;
/// Ate and Tate pairings
pub mod pairing;
/// Curve parameter sets
pub mod params;
/// Random bit suppliers
pub mod random;

pub use bignum::BigNum;
pub use commitment::{calculate_epid11_commitment_hash, Epid11CommitValues};
pub use ecgroup::{EcGroup, EcPoint};
pub use error::{EpidError, EpidResult};
pub use field::{FfElement, FieldInfo, FiniteField};
pub use hash::HashAlg;
pub use pairing::{Epid11PairingState, Pairing, PairingState};
pub use params::{Epid11Groups, Epid11Params, Epid2Groups, Epid2Params};
pub use random::{BitSupplier, RngBitSupplier};
