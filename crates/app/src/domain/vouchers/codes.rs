//! Voucher Codes
//!
//! A voucher code is 13 decimal digits: the issuing store id zero-padded to
//! four digits, eight random digits, and a trailing checksum digit computed
//! over the first twelve.

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use rand::{Rng, RngCore};
use thiserror::Error;

/// Number of digits in a voucher code, checksum included.
pub const CODE_LENGTH: usize = 13;

/// Number of leading digits holding the issuing store id.
pub const STORE_PREFIX_LENGTH: usize = 4;

/// Number of digits covered by the checksum.
pub const PAYLOAD_LENGTH: usize = CODE_LENGTH - 1;

const STORE_ID_MODULUS: u16 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoucherCodeError {
    #[error("voucher code must be {CODE_LENGTH} digits long, got {0} characters")]
    Length(usize),

    #[error("voucher code must only contain decimal digits")]
    NonDigit,

    #[error("voucher code checksum mismatch: expected {expected}, found {found}")]
    Checksum { expected: u8, found: u8 },
}

/// Computes the checksum digit for a payload of twelve digit values.
///
/// Digits at even positions weigh 1 and digits at odd positions weigh 3; the
/// checksum is whatever brings the weighted sum up to a multiple of ten.
/// Values above 9 count modulo 10.
pub fn checksum(payload: &[u8; PAYLOAD_LENGTH]) -> u8 {
    let remainder = payload
        .iter()
        .enumerate()
        .fold(0_u32, |acc, (position, digit)| {
            let weight = if position % 2 == 0 { 1 } else { 3 };

            (acc + u32::from(*digit) * weight) % 10
        });

    // Always below 10.
    (10 - remainder) as u8 % 10
}

/// A checksum-validated voucher code.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Parse and validate a code.
    ///
    /// # Errors
    ///
    /// Returns an error when the code is not 13 digits or its checksum digit
    /// does not match.
    pub fn parse(code: &str) -> Result<Self, VoucherCodeError> {
        let bytes = code.as_bytes();

        if bytes.len() != CODE_LENGTH {
            return Err(VoucherCodeError::Length(code.chars().count()));
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(VoucherCodeError::NonDigit);
        }

        let mut payload = [0_u8; PAYLOAD_LENGTH];

        for (slot, byte) in payload.iter_mut().zip(bytes) {
            *slot = byte - b'0';
        }

        let found = bytes.last().map_or(0, |byte| byte - b'0');
        let expected = checksum(&payload);

        if found != expected {
            return Err(VoucherCodeError::Checksum { expected, found });
        }

        Ok(Self(code.to_owned()))
    }

    fn from_payload(payload: &[u8; PAYLOAD_LENGTH]) -> Self {
        let code = payload
            .iter()
            .chain([checksum(payload)].iter())
            .map(|digit| char::from(b'0' + digit))
            .collect();

        Self(code)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// The zero-padded store id prefix.
    #[must_use]
    pub fn store_prefix(&self) -> &str {
        self.0.get(..STORE_PREFIX_LENGTH).unwrap_or_default()
    }
}

impl Debug for VoucherCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl Display for VoucherCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<VoucherCode> for String {
    fn from(value: VoucherCode) -> Self {
        value.into_string()
    }
}

/// Generates candidate voucher codes from an injected random source.
///
/// The generator does not know which codes are taken; callers check the
/// candidate against storage and ask again on collision.
pub struct CodeGenerator<R> {
    rng: R,
}

impl<R> Debug for CodeGenerator<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CodeGenerator").finish_non_exhaustive()
    }
}

impl<R: RngCore> CodeGenerator<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a code for the given store.
    ///
    /// Store ids above 9999 do not fit the prefix and are truncated to their
    /// low four digits.
    pub fn generate(&mut self, issuing_store_id: u16) -> VoucherCode {
        let mut payload = [0_u8; PAYLOAD_LENGTH];

        let prefix = format!(
            "{:0width$}",
            issuing_store_id % STORE_ID_MODULUS,
            width = STORE_PREFIX_LENGTH
        );

        for (slot, byte) in payload.iter_mut().zip(prefix.bytes()) {
            *slot = byte - b'0';
        }

        for slot in payload.iter_mut().skip(STORE_PREFIX_LENGTH) {
            *slot = self.rng.gen_range(0..10_u8);
        }

        VoucherCode::from_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use rand::{
        SeedableRng,
        rngs::{StdRng, mock::StepRng},
    };

    use super::*;

    #[test]
    fn checksum_matches_known_code() {
        let payload = [4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3];

        assert_eq!(checksum(&payload), 1);
    }

    #[test]
    fn checksum_of_zero_payload_is_zero() {
        assert_eq!(checksum(&[0; PAYLOAD_LENGTH]), 0);
    }

    #[test]
    fn checksum_counts_oversized_values_modulo_ten() {
        let mut wide = [0_u8; PAYLOAD_LENGTH];
        let mut narrow = [0_u8; PAYLOAD_LENGTH];
        wide[0] = 13;
        wide[1] = 255;
        narrow[0] = 3;
        narrow[1] = 5;

        assert_eq!(checksum(&wide), checksum(&narrow));
        assert!(checksum(&[u8::MAX; PAYLOAD_LENGTH]) <= 9);
    }

    #[test]
    fn checksum_is_always_a_single_digit() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let mut payload = [0_u8; PAYLOAD_LENGTH];
            payload
                .iter_mut()
                .for_each(|digit| *digit = rng.gen_range(0..10));

            assert!(checksum(&payload) <= 9, "checksum out of range");
        }
    }

    #[test]
    fn generated_codes_hold_the_code_invariants() {
        let mut generator = CodeGenerator::new(StdRng::seed_from_u64(42));

        for store in [0_u16, 7, 1234, 9999] {
            for _ in 0..200 {
                let code = generator.generate(store);
                let expected_prefix = format!("{store:04}");

                assert_eq!(code.as_str().len(), CODE_LENGTH);
                assert!(code.as_str().bytes().all(|byte| byte.is_ascii_digit()));
                assert_eq!(code.store_prefix(), expected_prefix);
                assert!(
                    VoucherCode::parse(code.as_str()).is_ok(),
                    "generated code {code} fails validation"
                );
            }
        }
    }

    #[test]
    fn oversized_store_id_is_truncated_to_four_digits() {
        let mut generator = CodeGenerator::new(StdRng::seed_from_u64(1));

        let code = generator.generate(12_345);

        assert_eq!(code.as_str().len(), CODE_LENGTH);
        assert_eq!(code.store_prefix(), "2345");
    }

    #[test]
    fn same_seed_produces_same_codes() {
        let mut first = CodeGenerator::new(StdRng::seed_from_u64(99));
        let mut second = CodeGenerator::new(StdRng::seed_from_u64(99));

        for _ in 0..50 {
            assert_eq!(first.generate(5678), second.generate(5678));
        }
    }

    #[test]
    fn constant_source_repeats_the_same_code() {
        let mut generator = CodeGenerator::new(StepRng::new(0, 0));

        let first = generator.generate(1234);
        let second = generator.generate(1234);

        assert_eq!(first, second);
        assert_eq!(first.store_prefix(), "1234");
    }

    #[test]
    fn parse_accepts_valid_code() {
        let code = VoucherCode::parse("4006381333931");

        assert!(code.is_ok(), "expected valid code, got {code:?}");
    }

    #[test]
    fn parse_rejects_wrong_checksum() {
        assert_eq!(
            VoucherCode::parse("4006381333932"),
            Err(VoucherCodeError::Checksum {
                expected: 1,
                found: 2
            })
        );

        assert_eq!(
            VoucherCode::parse("1111111111111"),
            Err(VoucherCodeError::Checksum {
                expected: 6,
                found: 1
            })
        );
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_digits() {
        assert_eq!(
            VoucherCode::parse("123"),
            Err(VoucherCodeError::Length(3))
        );
        assert_eq!(
            VoucherCode::parse("12345678901a3"),
            Err(VoucherCodeError::NonDigit)
        );
    }
}
