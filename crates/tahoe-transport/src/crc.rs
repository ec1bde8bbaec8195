//! # CRC — Cyclic Redundancy Check
//!
//! Bit-serial polynomial long division over GF(2).
//!
//! The sender appends `degree` zero bits to the message, divides by the
//! generator polynomial and transmits the remainder after the data. The
//! receiver divides the whole received frame by the same polynomial: the
//! frame is accepted iff the remainder is all zeros.
//!
//! ```text
//!   data bits ‖ 000 ──÷ 1011──▶ remainder r (3 bits)
//!   frame = data ‖ r
//!   frame ──÷ 1011──▶ 000  ⇔  no detectable error
//! ```
//!
//! Data is processed MSB-first within each byte.

use bytes::Bytes;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

// ─── Generator Polynomial ───────────────────────────────────────────────────

/// Immutable generator bit pattern, leading bit first (e.g. `"1011"` is
/// x³ + x + 1). The degree, `len - 1`, is the checksum width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneratorPolynomial {
    bits: Vec<bool>,
}

impl GeneratorPolynomial {
    /// Checksum width in bits.
    pub fn degree(&self) -> usize {
        self.bits.len() - 1
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl FromStr for GeneratorPolynomial {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPolynomial(s.to_string());

        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<bool>, _>>()?;

        // Leading bit must be set and degree must be at least 1.
        if bits.len() < 2 || !bits[0] {
            return Err(invalid());
        }
        Ok(GeneratorPolynomial { bits })
    }
}

impl TryFrom<String> for GeneratorPolynomial {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GeneratorPolynomial> for String {
    fn from(poly: GeneratorPolynomial) -> Self {
        poly.to_string()
    }
}

impl fmt::Display for GeneratorPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, &self.bits)
    }
}

/// Generator polynomials offered by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedPolynomial {
    /// x³ + x + 1
    Crc3,
    /// x³ + x² + 1
    Crc3Alt,
    /// x⁴ + x + 1
    Crc4,
}

impl NamedPolynomial {
    pub const ALL: [NamedPolynomial; 3] = [
        NamedPolynomial::Crc3,
        NamedPolynomial::Crc3Alt,
        NamedPolynomial::Crc4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NamedPolynomial::Crc3 => "1011",
            NamedPolynomial::Crc3Alt => "1101",
            NamedPolynomial::Crc4 => "10011",
        }
    }

    pub fn polynomial(self) -> GeneratorPolynomial {
        let bits = self.as_str().chars().map(|c| c == '1').collect();
        GeneratorPolynomial { bits }
    }
}

impl From<NamedPolynomial> for GeneratorPolynomial {
    fn from(named: NamedPolynomial) -> Self {
        named.polynomial()
    }
}

// ─── CRC Value ──────────────────────────────────────────────────────────────

/// Division remainder. Always exactly `degree` bits wide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrcValue(Vec<bool>);

impl CrcValue {
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| !b)
    }
}

impl fmt::Display for CrcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bits(f, &self.0)
    }
}

impl Serialize for CrcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ─── Frame ──────────────────────────────────────────────────────────────────

/// Data with its CRC remainder appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    payload: Bytes,
    checksum: CrcValue,
}

impl Frame {
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn checksum(&self) -> &CrcValue {
        &self.checksum
    }

    /// Number of bits on the wire: 8 per payload byte plus the remainder.
    pub fn bit_len(&self) -> usize {
        self.payload.len() * 8 + self.checksum.len()
    }

    /// Length of the textual frame (payload bytes plus one symbol per
    /// remainder bit), as displayed by `Display`.
    pub fn display_len(&self) -> usize {
        self.payload.len() + self.checksum.len()
    }

    /// All frame bits in transmission order.
    pub fn bits(&self) -> Vec<bool> {
        let mut bits = bytes_to_bits(&self.payload);
        bits.extend_from_slice(self.checksum.bits());
        bits
    }

    /// Copy of this frame with the bits at `positions` inverted. Positions
    /// index into [`Frame::bits`]; out-of-range positions are ignored and a
    /// position listed twice flips back.
    pub fn with_flipped_bits(&self, positions: &[usize]) -> Frame {
        let payload_bits = self.payload.len() * 8;
        let mut payload = self.payload.to_vec();
        let mut checksum = self.checksum.0.clone();

        for &pos in positions {
            if pos < payload_bits {
                payload[pos / 8] ^= 0x80 >> (pos % 8);
            } else if let Some(bit) = checksum.get_mut(pos - payload_bits) {
                *bit = !*bit;
            }
        }

        Frame {
            payload: Bytes::from(payload),
            checksum: CrcValue(checksum),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", String::from_utf8_lossy(&self.payload), self.checksum)
    }
}

// ─── Codec ──────────────────────────────────────────────────────────────────

/// CRC codec bound to one generator polynomial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crc {
    poly: GeneratorPolynomial,
}

impl Crc {
    pub fn new(poly: impl Into<GeneratorPolynomial>) -> Self {
        Crc { poly: poly.into() }
    }

    /// Build a codec from a bit string such as `"1011"`.
    pub fn parse(poly: &str) -> Result<Self, ConfigError> {
        Ok(Crc { poly: poly.parse()? })
    }

    pub fn polynomial(&self) -> &GeneratorPolynomial {
        &self.poly
    }

    /// Remainder of `data ‖ 0^degree` divided by the generator.
    pub fn calculate(&self, data: &[u8]) -> CrcValue {
        let mut dividend = bytes_to_bits(data);
        dividend.resize(dividend.len() + self.poly.degree(), false);
        CrcValue(self.divide(dividend))
    }

    /// `data ‖ calculate(data)`.
    pub fn encode(&self, data: impl Into<Bytes>) -> Frame {
        let payload = data.into();
        let checksum = self.calculate(&payload);
        Frame { payload, checksum }
    }

    /// Divide the whole received frame; accept iff the remainder is zero.
    pub fn verify(&self, frame: &Frame) -> bool {
        if frame.checksum.len() != self.poly.degree() {
            return false;
        }
        self.divide(frame.bits()).iter().all(|&b| !b)
    }

    /// Data-prefix formulation: recompute over `data` and compare with the
    /// trailing remainder. Agrees with [`Crc::verify`] for every frame.
    pub fn verify_with(&self, data: &[u8], expected: &CrcValue) -> bool {
        self.calculate(data) == *expected
    }

    /// Drop the remainder and return the data.
    pub fn strip(&self, frame: &Frame) -> Bytes {
        frame.payload.clone()
    }

    /// Binary long division. XORs the generator in wherever the leading bit
    /// of the running remainder is set, then returns the last `degree` bits.
    fn divide(&self, mut bits: Vec<bool>) -> Vec<bool> {
        let divisor = self.poly.bits();
        let degree = self.poly.degree();

        for i in 0..bits.len().saturating_sub(degree) {
            if bits[i] {
                for (j, &d) in divisor.iter().enumerate() {
                    bits[i + j] ^= d;
                }
            }
        }

        bits.split_off(bits.len().saturating_sub(degree))
    }
}

impl Default for Crc {
    fn default() -> Self {
        Crc::new(NamedPolynomial::Crc3)
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    data.iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

fn write_bits(f: &mut fmt::Formatter<'_>, bits: &[bool]) -> fmt::Result {
    for &bit in bits {
        f.write_str(if bit { "1" } else { "0" })?;
    }
    Ok(())
}
