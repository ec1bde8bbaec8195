//! Property-based tests for the CRC codec.
//!
//! Round-trip verification, single-bit error detection and agreement between
//! the full-frame and data-prefix verification forms, across every named
//! generator and arbitrary payloads.

use proptest::prelude::*;
use tahoe_transport::crc::{Crc, GeneratorPolynomial, NamedPolynomial};

// ─── Strategies ─────────────────────────────────────────────────────────────

fn named_polynomial() -> impl Strategy<Value = NamedPolynomial> {
    prop_oneof![
        Just(NamedPolynomial::Crc3),
        Just(NamedPolynomial::Crc3Alt),
        Just(NamedPolynomial::Crc4),
    ]
}

/// Any valid generator: leading 1, then 1..=8 arbitrary bits.
fn generator() -> impl Strategy<Value = GeneratorPolynomial> {
    prop::collection::vec(any::<bool>(), 1..=8).prop_map(|tail| {
        let s: String = std::iter::once('1')
            .chain(tail.into_iter().map(|b| if b { '1' } else { '0' }))
            .collect();
        s.parse().unwrap()
    })
}

fn payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

// ─── Round Trip ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn encoded_frame_verifies(poly in named_polynomial(), data in payload()) {
        let crc = Crc::new(poly);
        let frame = crc.encode(data.clone());
        prop_assert!(crc.verify(&frame));
        prop_assert_eq!(frame.payload().as_ref(), &data[..]);
        let stripped = crc.strip(&frame);
        prop_assert_eq!(stripped.as_ref(), &data[..]);
    }

    #[test]
    fn any_generator_round_trips(poly in generator(), data in payload()) {
        let crc = Crc::new(poly.clone());
        let frame = crc.encode(data);
        prop_assert_eq!(frame.checksum().len(), poly.degree());
        prop_assert!(crc.verify(&frame));
    }

    #[test]
    fn calculate_is_pure(poly in named_polynomial(), data in payload()) {
        let crc = Crc::new(poly);
        prop_assert_eq!(crc.calculate(&data), crc.calculate(&data));
    }
}

// ─── Error Detection ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn single_bit_flip_detected(
        poly in named_polynomial(),
        data in prop::collection::vec(any::<u8>(), 1..64),
        pick in any::<prop::sample::Index>(),
    ) {
        let crc = Crc::new(poly);
        let frame = crc.encode(data);
        let bit = pick.index(frame.bit_len());
        let damaged = frame.with_flipped_bits(&[bit]);
        prop_assert_ne!(&damaged, &frame);
        prop_assert!(!crc.verify(&damaged), "flip at bit {} undetected", bit);
    }

    #[test]
    fn verification_forms_agree(
        poly in named_polynomial(),
        data in payload(),
        flips in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let crc = Crc::new(poly);
        let frame = crc.encode(data);
        let positions: Vec<usize> = flips.iter().map(|i| i.index(frame.bit_len())).collect();
        let received = frame.with_flipped_bits(&positions);
        prop_assert_eq!(
            crc.verify(&received),
            crc.verify_with(received.payload(), received.checksum())
        );
    }

    #[test]
    fn wrong_polynomial_width_rejected(data in payload()) {
        let crc3 = Crc::new(NamedPolynomial::Crc3);
        let crc4 = Crc::new(NamedPolynomial::Crc4);
        prop_assert!(!crc4.verify(&crc3.encode(data)));
    }
}
