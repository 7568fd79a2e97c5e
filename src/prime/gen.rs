use num_bigint::BigUint;
use rand::{rngs::OsRng, CryptoRng, RngCore};

use super::{ver, PrimeError};
use crate::{
    config::{Deadline, DEFAULT_CONFIDENCE},
    random::random_bits_from,
};

/// Generates a random prime of exactly `bits` bits
pub fn generate_prime(bits: u64) -> Result<BigUint, PrimeError> {
    generate_prime_with(&mut OsRng, bits, DEFAULT_CONFIDENCE, &Deadline::never())
}

/// Draws odd candidates of `bits` bits until one passes the primality test
/// at `confidence`, or the deadline fires
pub fn generate_prime_with<R>(
    rng: &mut R,
    bits: u64,
    confidence: u32,
    deadline: &Deadline,
) -> Result<BigUint, PrimeError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if bits < 2 {
        return Err(PrimeError::TooSmall { bits });
    }

    let mut tries = 0u64;
    loop {
        deadline.check()?;
        tries += 1;

        let candidate = candidate(rng, bits)?;
        if ver::is_probable_prime_from(rng, &candidate, confidence)? {
            log::trace!("found {}-bit prime after {} candidates", bits, tries);
            return Ok(candidate);
        }
    }
}

/// Random odd number with the top bit set
fn candidate<R>(rng: &mut R, bits: u64) -> Result<BigUint, PrimeError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let raw = random_bits_from(rng, bits)?;
    let excess = (bits.div_ceil(8) * 8) - bits;
    let mut candidate = raw >> excess;
    candidate.set_bit(bits - 1, true);
    candidate.set_bit(0, true);
    Ok(candidate)
}
