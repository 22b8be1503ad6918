//! Curve parameter sets
//!
//! A parameter set is a plain description made of big-endian hex strings,
//! loadable from JSON. `build` turns the description into the fields,
//! groups and pairing state it defines. The Intel EPID 2.0 set is embedded
//! in the crate and parsed once on first use.

use crate::bignum::{hex_to_bytes, BigNum};
use crate::ecgroup::EcGroup;
use crate::error::{EpidError, EpidResult};
use crate::field::{FfElement, FiniteField};
use crate::pairing::{Epid11PairingState, PairingState};
use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

const INTEL_EPID2_JSON: &str = include_str!("../params/epid2.json");

static INTEL_EPID2: OnceCell<Epid2Params> = OnceCell::new();

/// Affine point over a prime field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointParams {
    pub x: String,
    pub y: String,
}

/// Affine point over an extension field, coefficient 0 first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtPointParams {
    pub x: Vec<String>,
    pub y: Vec<String>,
}

/// EPID 2.0 parameters: a BN curve with the optimal ate pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epid2Params {
    pub name: String,
    /// Order of G1 and G2
    pub p: String,
    /// Characteristic of the coordinate field
    pub q: String,
    /// G1 is y^2 = x^3 + b
    pub b: String,
    /// Fq2 = Fq[u] / (u^2 - beta)
    pub beta: String,
    /// Fq6 = Fq2[v] / (v^3 - xi)
    pub xi: Vec<String>,
    /// BN parameter
    pub t: String,
    /// Sign of t
    pub neg: bool,
    pub g1: PointParams,
    pub g2: ExtPointParams,
    /// Cofactor of G1
    pub h1: String,
}

/// Objects built from an [`Epid2Params`]
pub struct Epid2Groups {
    pub p: BigNum,
    pub q: BigNum,
    /// Scalar field F_p
    pub fp: FiniteField,
    pub fq: FiniteField,
    pub fq2: FiniteField,
    pub fq6: FiniteField,
    /// Fq12 = Fq6[w] / (w^2 - v)
    pub gt: FiniteField,
    pub g1: Rc<EcGroup>,
    /// Twist over Fq2 with b' = b / xi
    pub g2: Rc<EcGroup>,
    pub pairing: PairingState,
}

impl Epid2Params {
    /// The Intel EPID 2.0 parameter set
    pub fn intel() -> EpidResult<&'static Epid2Params> {
        INTEL_EPID2.get_or_try_init(|| Self::from_json(INTEL_EPID2_JSON))
    }

    pub fn from_json(json: &str) -> EpidResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> EpidResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the tower Fq -> Fq2 -> Fq6 -> GT, both groups and the pairing
    ///
    /// # Returns
    /// The built objects; `Config` for malformed hex or coordinate counts,
    /// `BadArg` when the values do not describe valid fields or curves
    pub fn build(&self) -> EpidResult<Epid2Groups> {
        let p = bignum("p", &self.p)?;
        let q = bignum("q", &self.q)?;
        let t = bignum("t", &self.t)?;
        let h1 = bignum("h1", &self.h1)?;

        let fp = FiniteField::new_prime(&hex("p", &self.p)?)?;
        let fq = FiniteField::new_prime(&hex("q", &self.q)?)?;
        let beta = prime_element(&fq, "beta", &self.beta)?;
        let fq2 = FiniteField::new_binomial_extension(&fq, &beta, 2)?;
        let xi = ext_element(&fq2, "xi", &self.xi)?;
        let fq6 = FiniteField::new_binomial_extension(&fq2, &xi, 3)?;
        let v = fq6.from_coefficients(&[fq2.zero(), fq2.one(), fq2.zero()])?;
        let gt = FiniteField::new_binomial_extension(&fq6, &v, 2)?;

        let b = prime_element(&fq, "b", &self.b)?;
        let g1 = EcGroup::new(
            &fq,
            &fq.zero(),
            &b,
            &prime_element(&fq, "g1.x", &self.g1.x)?,
            &prime_element(&fq, "g1.y", &self.g1.y)?,
            &p,
            &h1,
        )?;

        // h = 2q - p, n = p * h
        let wide = 2 * q.capacity();
        let q_wide = q.with_capacity(wide)?;
        let cofactor = q_wide.add(&q_wide)?.sub(&p)?;
        let order = p.mul(&cofactor)?;
        let b2 = fq2.mul(&fq2.inv(&xi)?, &b)?;
        let g2 = EcGroup::new(
            &fq2,
            &fq2.zero(),
            &b2,
            &ext_element(&fq2, "g2.x", &self.g2.x)?,
            &ext_element(&fq2, "g2.y", &self.g2.y)?,
            &order,
            &cofactor,
        )?;

        let g1 = Rc::new(g1);
        let g2 = Rc::new(g2);
        let pairing = PairingState::new(g1.clone(), g2.clone(), &gt, &t, self.neg)?;
        info!("built parameter set {}", self.name);
        Ok(Epid2Groups {
            p,
            q,
            fp,
            fq,
            fq2,
            fq6,
            gt,
            g1,
            g2,
            pairing,
        })
    }
}

/// EPID 1.1 parameters: Tate pairing over a cubic extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epid11Params {
    pub name: String,
    /// Order of G1, G2 and G3
    pub p: String,
    pub q: String,
    /// G1 is y^2 = x^3 + ax + b over Fq
    pub a: String,
    pub b: String,
    pub h1: String,
    /// Low coefficients of the Fq3 modulus X^3 + c2 X^2 + c1 X + c0
    pub coeffs: Vec<String>,
    /// GT = Fq3[Y] / (Y^2 - qnr)
    pub qnr: String,
    pub h2: String,
    /// G3 lives over its own prime field
    pub q_tick: String,
    pub a_tick: String,
    pub b_tick: String,
    pub h_tick: String,
    pub g1: PointParams,
    pub g2: ExtPointParams,
    pub g3: PointParams,
}

/// Objects built from an [`Epid11Params`]
pub struct Epid11Groups {
    pub p: BigNum,
    pub fq: FiniteField,
    pub fq3: FiniteField,
    pub gt: FiniteField,
    pub fq_tick: FiniteField,
    pub g1: Rc<EcGroup>,
    /// y^2 = x^3 + a qnr^2 x + b qnr^3 over Fq3
    pub g2: Rc<EcGroup>,
    pub g3: Rc<EcGroup>,
    pub pairing: Epid11PairingState,
}

impl Epid11Params {
    pub fn from_json(json: &str) -> EpidResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> EpidResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds Fq, Fq3, GT, the three groups and the Tate pairing
    pub fn build(&self) -> EpidResult<Epid11Groups> {
        let p = bignum("p", &self.p)?;
        let fq = FiniteField::new_prime(&hex("q", &self.q)?)?;
        let coeffs = self
            .coeffs
            .iter()
            .map(|c| prime_element(&fq, "coeffs", c))
            .collect::<EpidResult<Vec<_>>>()?;
        if coeffs.len() != 3 {
            return Err(EpidError::Config(format!(
                "coeffs: expected 3 coefficients, got {}",
                coeffs.len()
            )));
        }
        let fq3 = FiniteField::new_polynomial_extension(&fq, &coeffs)?;
        let qnr = prime_element(&fq, "qnr", &self.qnr)?;
        let gt = FiniteField::new_binomial_extension(&fq3, &fq3.from_ground(&qnr)?, 2)?;

        let a = prime_element(&fq, "a", &self.a)?;
        let b = prime_element(&fq, "b", &self.b)?;
        let g1 = EcGroup::new(
            &fq,
            &a,
            &b,
            &prime_element(&fq, "g1.x", &self.g1.x)?,
            &prime_element(&fq, "g1.y", &self.g1.y)?,
            &p,
            &bignum("h1", &self.h1)?,
        )?;

        let qnr2 = fq.square(&qnr)?;
        let a2 = fq3.from_ground(&fq.mul(&a, &qnr2)?)?;
        let b2 = fq3.from_ground(&fq.mul(&b, &fq.mul(&qnr2, &qnr)?)?)?;
        let g2 = EcGroup::new(
            &fq3,
            &a2,
            &b2,
            &ext_element(&fq3, "g2.x", &self.g2.x)?,
            &ext_element(&fq3, "g2.y", &self.g2.y)?,
            &p,
            &bignum("h2", &self.h2)?,
        )?;

        let fq_tick = FiniteField::new_prime(&hex("q_tick", &self.q_tick)?)?;
        let g3 = EcGroup::new(
            &fq_tick,
            &prime_element(&fq_tick, "a_tick", &self.a_tick)?,
            &prime_element(&fq_tick, "b_tick", &self.b_tick)?,
            &prime_element(&fq_tick, "g3.x", &self.g3.x)?,
            &prime_element(&fq_tick, "g3.y", &self.g3.y)?,
            &p,
            &bignum("h_tick", &self.h_tick)?,
        )?;

        let g1 = Rc::new(g1);
        let g2 = Rc::new(g2);
        let pairing = Epid11PairingState::new(g1.clone(), g2.clone(), &gt)?;
        info!("built parameter set {}", self.name);
        Ok(Epid11Groups {
            p,
            fq,
            fq3,
            gt,
            fq_tick,
            g1,
            g2,
            g3: Rc::new(g3),
            pairing,
        })
    }
}

fn hex(name: &str, value: &str) -> EpidResult<Vec<u8>> {
    hex_to_bytes(value).map_err(|_| EpidError::Config(format!("{}: not a hex string", name)))
}

fn bignum(name: &str, value: &str) -> EpidResult<BigNum> {
    BigNum::from_bytes(&hex(name, value)?)
}

fn prime_element(field: &FiniteField, name: &str, value: &str) -> EpidResult<FfElement> {
    field.read(&hex(name, value)?)
}

/// Reads an extension element from its prime-field coefficients
fn ext_element(field: &FiniteField, name: &str, values: &[String]) -> EpidResult<FfElement> {
    let ground = field.ground_field().ok_or(EpidError::BadArg)?;
    if values.len() != field.degree() {
        return Err(EpidError::Config(format!(
            "{}: expected {} coefficients, got {}",
            name,
            field.degree(),
            values.len()
        )));
    }
    let coeffs = values
        .iter()
        .map(|v| prime_element(ground, name, v))
        .collect::<EpidResult<Vec<_>>>()?;
    field.from_coefficients(&coeffs)
}
