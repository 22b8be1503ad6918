use epid_math::bignum::bytes_to_hex;
use epid_math::{
    BigNum, EcGroup, Epid11Groups, Epid11PairingState, Epid11Params, Epid2Groups, Epid2Params,
    EpidError, Pairing, PairingState,
};
use std::rc::Rc;

// e(g1, g2) for both engines, computed for this crate with an independent
// big-integer model and checked for bilinearity. Not published vectors.
const ATE_G1_G2: &str = "A88E9AF9251298E2C3612EE8D6A6771649047569D1832D3F2A79B69BC91D03902AD8119F2636E7E93A054C154993DAE9D05AE48D8AFA04F1208456EC3C27195CF1AFBFF60E58842D9411F4B5F41451B090461A81EDCF916658A6363A52185AC1084C99D3DCCE7FCE78E0388732F1803C7B67AA6FDDE0FCCBD0B03A59522A84E4F84AFF50A065C4EEF49CAA3446F9D26CA1617149322584549044BEA40BF7FE26816373F72FF2FA2452A4D94CC1A7A5C30336139B164516CB4B9938F36DC87EABB353DFB68260121136690E05318ECFD73F32E795841DC8B5BE49179DCFA95A2AC41186E86C0256B0252FA006B362B211AFBEA4E8616485FBEB1CF1BC2CAE105116A6C0B3868E6D79B6BDDE1E2606466582845A97D3B793786B9D14339443340445D147D42F17CFF1DDEA1152AE01883A10EE5C16CDB548E9162C70B41E1938E018E9AEC5DA74412D700760372766F700BB7951F37C8A2BB5696E101FE00A5EBEB44E0E0259B5CB4A6A868BCCA213A0E9F25CB023B215F9BB43C154F4C8AB16A6";

const TATE_G1_G2: &str = "A0F5D1489A7300368270E110C2536F4305B532083910D219F3165EAEE9381EEDD48EE518B9B65DC4E5DD75D8EB295507A2F54F5FA57C2B396F8DE98FBD05B9000D71980E13B19131C5872506FD2C583A1379333E93F8F8F4C30626CC628BDF359A7601105D607B744420C38B24028B7C76E7C0CADCF36853E64C2E5A34C58541E204603E426F95E9B62A710A55469F7FCAB922C747A7CEC71472D947AA45ED8266BC79A55F4E629A225709736BF79AC85AC603A8AADA6F3414851878E3CF9015";

fn epid2() -> Epid2Groups {
    Epid2Params::intel().unwrap().build().unwrap()
}

fn epid11() -> Epid11Groups {
    Epid11Params::from_json(include_str!("data/epid11_toy.json"))
        .unwrap()
        .build()
        .unwrap()
}

fn small(v: u64) -> BigNum {
    BigNum::from_u64(32, v).unwrap()
}

#[test]
fn test_ate_known_answer() {
    let g = epid2();
    let r = g.pairing.pairing(g.g1.generator(), g.g2.generator()).unwrap();
    assert_eq!(bytes_to_hex(&g.gt.write(&r).unwrap()), ATE_G1_G2);
}

#[test]
fn test_ate_bilinear() {
    let g = epid2();
    let e = g.pairing.pairing(g.g1.generator(), g.g2.generator()).unwrap();

    let p5 = g.g1.exp(g.g1.generator(), &small(5)).unwrap();
    let left = g.pairing.pairing(&p5, g.g2.generator()).unwrap();
    assert!(g.gt.is_equal(&left, &g.gt.exp(&e, &small(5)).unwrap()).unwrap());

    let q7 = g.g2.exp(g.g2.generator(), &small(7)).unwrap();
    let right = g.pairing.pairing(g.g1.generator(), &q7).unwrap();
    assert!(g.gt.is_equal(&right, &g.gt.exp(&e, &small(7)).unwrap()).unwrap());
}

#[test]
fn test_ate_is_not_degenerate() {
    let g = epid2();
    let e = g.pairing.pairing(g.g1.generator(), g.g2.generator()).unwrap();
    assert!(!g.gt.is_equal(&e, &g.gt.one()).unwrap());
}

#[test]
fn test_ate_identity_gives_one() {
    let g = epid2();
    let r = g.pairing.pairing(&g.g1.identity(), g.g2.generator()).unwrap();
    assert!(g.gt.is_equal(&r, &g.gt.one()).unwrap());
    let r = g.pairing.pairing(g.g1.generator(), &g.g2.identity()).unwrap();
    assert!(g.gt.is_equal(&r, &g.gt.one()).unwrap());
}

#[test]
fn test_ate_rejects_swapped_points() {
    let g = epid2();
    assert_eq!(
        g.pairing.pairing(g.g2.generator(), g.g1.generator()).unwrap_err(),
        EpidError::BadArg
    );
}

#[test]
fn test_ate_state_rejects_swapped_groups() {
    let g = epid2();
    let t = BigNum::from_hex("6882F5C030B0A801").unwrap();
    let r = PairingState::new(g.g2.clone(), g.g1.clone(), &g.gt, &t, true);
    assert_eq!(r.err(), Some(EpidError::BadArg));
    let r = PairingState::new(g.g1.clone(), g.g2.clone(), &g.fq6, &t, true);
    assert_eq!(r.err(), Some(EpidError::BadArg));
}

#[test]
fn test_tate_known_answer() {
    let g = epid11();
    let r = g.pairing.pairing(g.g1.generator(), g.g2.generator()).unwrap();
    assert_eq!(bytes_to_hex(&g.gt.write(&r).unwrap()), TATE_G1_G2);
}

#[test]
fn test_tate_bilinear() {
    let g = epid11();
    let e = g.pairing.pairing(g.g1.generator(), g.g2.generator()).unwrap();

    let p5 = g.g1.exp(g.g1.generator(), &small(5)).unwrap();
    let left = g.pairing.pairing(&p5, g.g2.generator()).unwrap();
    assert!(g.gt.is_equal(&left, &g.gt.exp(&e, &small(5)).unwrap()).unwrap());

    let q7 = g.g2.exp(g.g2.generator(), &small(7)).unwrap();
    let right = g.pairing.pairing(g.g1.generator(), &q7).unwrap();
    assert!(g.gt.is_equal(&right, &g.gt.exp(&e, &small(7)).unwrap()).unwrap());
}

#[test]
fn test_tate_value_has_group_order() {
    let g = epid11();
    let e = g.pairing.pairing(g.g1.generator(), g.g2.generator()).unwrap();
    assert!(!g.gt.is_equal(&e, &g.gt.one()).unwrap());
    assert!(g.gt.is_equal(&g.gt.exp(&e, &g.p).unwrap(), &g.gt.one()).unwrap());
}

#[test]
fn test_tate_identity_gives_one() {
    let g = epid11();
    let r = g.pairing.pairing(&g.g1.identity(), g.g2.generator()).unwrap();
    assert!(g.gt.is_equal(&r, &g.gt.one()).unwrap());
}

#[test]
fn test_tate_rejects_wrong_groups() {
    let g = epid11();
    assert_eq!(
        g.pairing.pairing(g.g2.generator(), g.g1.generator()).unwrap_err(),
        EpidError::BadArg
    );
    let r = Epid11PairingState::new(g.g2.clone(), g.g1.clone(), &g.gt);
    assert_eq!(r.err(), Some(EpidError::BadArg));
}

#[test]
fn test_tate_rejects_order_not_dividing_embedding() {
    let g = epid11();
    let (x, y) = g.g1.generator().coords().unwrap();
    let bad = EcGroup::new(&g.fq, g.g1.a(), g.g1.b(), x, y, &small(7), &small(1)).unwrap();
    let r = Epid11PairingState::new(Rc::new(bad), g.g2.clone(), &g.gt);
    assert_eq!(r.err(), Some(EpidError::BadArg));
}
