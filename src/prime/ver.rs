//! Solovay-Strassen primality test.
//!
//! A random base `x` witnesses that `n` is composite when the Jacobi symbol
//! `(x/n)` disagrees with `x^((n-1)/2) mod n`. For a composite `n` at least
//! half of the bases are witnesses, so every passed trial halves the chance
//! of a false positive.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::{rngs::OsRng, CryptoRng, RngCore};

use crate::{
    algo::{jacobi, jacobi_mod, modexp},
    config::DEFAULT_CONFIDENCE,
    random::{random_in_range_from, EntropyError},
};

/// Primes below 256, used for trial division
const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Every composite below this bound has a factor in `SMALL_PRIMES`
const TRIAL_DIVISION_BOUND: u32 = 257 * 257;

/// Returns true if `x` proves that odd `n` is composite
pub fn jacobi_witness(x: &BigUint, n: &BigUint) -> bool {
    let j = jacobi_mod(jacobi(x, n), n);
    let f = modexp(x, &((n - 1u32) >> 1), n);
    j != f
}

/// Returns false if `n` is composite (which is always correct) and true if
/// it's probably prime, wrong with probability at most `2^-k`
pub fn is_probable_prime(n: &BigUint, k: u32) -> Result<bool, EntropyError> {
    is_probable_prime_from(&mut OsRng, n, k)
}

pub fn is_probable_prime_from<R>(rng: &mut R, n: &BigUint, k: u32) -> Result<bool, EntropyError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if let Some(answer) = trial_division(n) {
        return Ok(answer);
    }

    // each trial fails with probability <= 1/2, so k bits need k trials
    let trials = k;
    let one = BigUint::one();
    let upper = n - 1u32;
    for _ in 0..=trials {
        let x = random_in_range_from(rng, &one, &upper)?;
        if jacobi_witness(&x, n) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Primality test at the default confidence
pub fn is_prime(n: &BigUint) -> Result<bool, EntropyError> {
    is_probable_prime(n, DEFAULT_CONFIDENCE)
}

/// Settles small and obviously composite numbers
fn trial_division(n: &BigUint) -> Option<bool> {
    if n < &BigUint::from(2u32) {
        return Some(false);
    }
    for &p in SMALL_PRIMES.iter() {
        if n == &BigUint::from(p) {
            return Some(true);
        }
        if (n % p).is_zero() {
            return Some(false);
        }
    }
    match n.to_u32() {
        Some(small) if small < TRIAL_DIVISION_BOUND => Some(true),
        _ => {
            debug_assert!(n.is_odd());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::tests::DryRng;

    fn mersenne(p: u32) -> BigUint {
        (BigUint::one() << p) - 1u32
    }

    #[test]
    fn small_numbers() {
        let primes: Vec<u32> = (0..300u32)
            .filter(|&n| is_prime(&BigUint::from(n)).unwrap())
            .collect();
        assert_eq!(primes.len(), 62);
        assert_eq!(&primes[..6], &[2, 3, 5, 7, 11, 13]);
        assert_eq!(*primes.last().unwrap(), 293);

        assert!(!is_prime(&BigUint::from(42u32)).unwrap());
        assert!(is_prime(&BigUint::from(41u32)).unwrap());
        assert!(!is_prime(&BigUint::from(257u32 * 251)).unwrap());
        assert!(is_prime(&BigUint::from(65521u32)).unwrap());
    }

    #[test]
    fn large_primes() {
        for p in [31, 61, 89, 127] {
            assert!(is_probable_prime(&mersenne(p), 20).unwrap(), "2^{} - 1", p);
        }
    }

    #[test]
    fn large_composites() {
        let semiprime = mersenne(31) * mersenne(61);
        assert!(!is_probable_prime(&semiprime, 20).unwrap());
        // 2^67 - 1 = 193707721 * 761838257287
        assert!(!is_probable_prime(&mersenne(67), 20).unwrap());
        // 2^29 - 1 = 233 * 1103 * 2089
        assert!(!is_prime(&mersenne(29)).unwrap());
    }

    #[test]
    fn witness() {
        let n = BigUint::from(65537u32);
        for x in 1..20u32 {
            assert!(!jacobi_witness(&BigUint::from(x), &n));
        }
        // 91 = 7 * 13, and 2 is not a liar for it
        assert!(jacobi_witness(&BigUint::from(2u32), &BigUint::from(91u32)));
        // x sharing a factor with n always witnesses
        assert!(jacobi_witness(&BigUint::from(7u32), &BigUint::from(91u32)));
    }

    #[test]
    fn dry_source() {
        is_probable_prime_from(&mut DryRng, &mersenne(61), 5).unwrap_err();
        // trial division doesn't need randomness
        assert!(is_probable_prime_from(&mut DryRng, &BigUint::from(97u32), 5).unwrap());
    }
}
