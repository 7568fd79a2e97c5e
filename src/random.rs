use num_bigint::BigUint;
use rand::{rngs::OsRng, CryptoRng, RngCore};
use thiserror::Error;
use zeroize::Zeroize;

/// Lower bound for the oversampling in [`random_in_range`], in bits
const MIN_RANGE_BITS: u64 = 64;

#[derive(Debug, Error)]
pub enum EntropyError {
    #[error("entropy source could not supply {requested} bytes")]
    Unavailable {
        requested: usize,
        #[source]
        source: rand::Error,
    },
}

/// Reads a random integer of approximately `bits` bits (rounded up to whole
/// bytes) from the operating system
pub fn random_bits(bits: u64) -> Result<BigUint, EntropyError> {
    random_bits_from(&mut OsRng, bits)
}

pub fn random_bits_from<R>(rng: &mut R, bits: u64) -> Result<BigUint, EntropyError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let nbytes = bits_to_bytes(bits);
    let mut raw = vec![0u8; nbytes];
    rng.try_fill_bytes(&mut raw)
        .map_err(|source| EntropyError::Unavailable {
            requested: nbytes,
            source,
        })?;
    let num = BigUint::from_bytes_be(&raw);
    raw.zeroize();
    Ok(num)
}

/// Returns a random integer x with min <= x <= max
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random_in_range(min: &BigUint, max: &BigUint) -> Result<BigUint, EntropyError> {
    random_in_range_from(&mut OsRng, min, max)
}

/// Same as [`random_in_range`], drawing from `rng`
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random_in_range_from<R>(
    rng: &mut R,
    min: &BigUint,
    max: &BigUint,
) -> Result<BigUint, EntropyError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    assert!(min <= max, "empty range");
    let span = max - min + 1u32;

    // draw at least twice the width of the span so the modulo bias is negligible
    let nbits = (2 * span.bits()).max(MIN_RANGE_BITS);
    let drawn = random_bits_from(rng, nbits)?;
    Ok(drawn % span + min)
}

fn bits_to_bytes(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Rng that never has any entropy to give
    pub(crate) struct DryRng;

    impl RngCore for DryRng {
        fn next_u32(&mut self) -> u32 {
            unreachable!()
        }

        fn next_u64(&mut self) -> u64 {
            unreachable!()
        }

        fn fill_bytes(&mut self, _: &mut [u8]) {
            unreachable!()
        }

        fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("source is dry"))
        }
    }

    impl CryptoRng for DryRng {}

    #[test]
    fn bits_are_bounded() {
        for bits in [1u64, 7, 8, 9, 64, 100] {
            let num = random_bits(bits).unwrap();
            assert!(num.bits() <= bits_to_bytes(bits) as u64 * 8);
        }
        assert_eq!(random_bits(0).unwrap(), BigUint::from(0u32));
    }

    #[test]
    fn range_is_inclusive() {
        let min = BigUint::from(10u32);
        let max = BigUint::from(12u32);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let x = random_in_range(&min, &max).unwrap();
            assert!(x >= min && x <= max);
            seen[(x - &min).iter_u32_digits().next().unwrap_or(0) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn single_value_range() {
        let v = BigUint::from(77u32);
        assert_eq!(random_in_range(&v, &v).unwrap(), v);
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn inverted_range() {
        let _ = random_in_range(&BigUint::from(5u32), &BigUint::from(4u32));
    }

    #[test]
    fn dry_source_is_an_error() {
        let err = random_bits_from(&mut DryRng, 128).unwrap_err();
        let EntropyError::Unavailable { requested, .. } = err;
        assert_eq!(requested, 16);

        let one = BigUint::from(1u32);
        random_in_range_from(&mut DryRng, &one, &BigUint::from(100u32)).unwrap_err();
    }
}
