//! Bilinear pairings `G1 x G2 -> GT`
//!
//! [`PairingState`] implements the optimal ate pairing used by EPID 2.0 and
//! [`Epid11PairingState`] the Tate pairing used by EPID 1.1. Both hold on to
//! the groups they were built for and reject points of any other shape.

mod ate;
mod tate;

pub use ate::PairingState;
pub use tate::Epid11PairingState;

use crate::ecgroup::EcPoint;
use crate::error::EpidResult;
use crate::field::{FfElement, FiniteField};

/// A non-degenerate bilinear map
pub trait Pairing {
    /// Computes e(a, b)
    ///
    /// # Arguments
    /// * `a` - Point of G1
    /// * `b` - Point of G2
    ///
    /// # Returns
    /// The pairing value in GT. `BadArg` when a point does not belong to
    /// the groups of this state, `Math` if the computation itself fails.
    fn pairing(&self, a: &EcPoint, b: &EcPoint) -> EpidResult<FfElement>;

    /// The target field
    fn gt(&self) -> &FiniteField;
}
