use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Computes `base^exponent mod modulus` with left-to-right square-and-multiply.
///
/// Every exponent bit costs one squaring and one multiplication; the product
/// is only kept when the bit is set.
///
/// # Panics
///
/// Panics if `modulus` is zero.
pub fn modexp(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    assert!(!modulus.is_zero(), "modulus must be non-zero");
    if modulus.is_one() {
        return BigUint::zero();
    }

    let base = base % modulus;
    let mut acc = BigUint::one();
    for i in (0..exponent.bits()).rev() {
        acc = &acc * &acc % modulus;
        let multiplied = &acc * &base % modulus;
        if exponent.bit(i) {
            acc = multiplied;
        }
    }
    acc
}

pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Returns true if `gcd(a, b) == 1`
pub fn are_relatively_prime(a: &BigUint, b: &BigUint) -> bool {
    gcd(a, b).is_one()
}

/// Extended Euclidian algorithm, iterative form.
///
/// Returns `(g, s, t)` with `g = gcd(a, b) = a*s + b*t`.
#[allow(clippy::many_single_char_names)]
pub fn egcd(a: &BigUint, b: &BigUint) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (BigInt::from(a.clone()), BigInt::from(b.clone()));
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }
    (old_r, old_s, old_t)
}

/// Modulo inverse of `a` in `[0, n)`. Returns `None` if the inverse doesn't exist
pub fn invmod(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    if n.is_zero() {
        return None;
    }
    let (gcd, inverse, _) = egcd(a, n);
    if !gcd.is_one() {
        return None;
    }
    // floor modulo keeps the result non-negative whatever sign egcd produced
    let n = BigInt::from(n.clone());
    inverse.mod_floor(&n).to_biguint()
}

/// Jacobi symbol `(a/n)`.
///
/// # Panics
///
/// Panics if `n` is even or zero.
pub fn jacobi(a: &BigUint, n: &BigUint) -> i8 {
    assert!(n.is_odd(), "jacobi symbol needs an odd positive denominator");

    let mut a = a % n;
    let mut n = n.clone();
    let mut result = 1i8;

    while !a.is_zero() {
        let twos = a.trailing_zeros().unwrap_or(0);
        if twos > 0 {
            a >>= twos;
            // (2/n) = -1 iff n = 3, 5 (mod 8)
            let n_mod_8 = low_bits(&n, 0b111);
            if twos % 2 == 1 && (n_mod_8 == 3 || n_mod_8 == 5) {
                result = -result;
            }
        }

        std::mem::swap(&mut a, &mut n);
        if low_bits(&a, 0b11) == 3 && low_bits(&n, 0b11) == 3 {
            result = -result;
        }
        a %= &n;
    }

    if n.is_one() {
        result
    } else {
        0
    }
}

/// Maps a Jacobi symbol into `[0, n)`, `-1` becoming `n - 1`
pub fn jacobi_mod(symbol: i8, n: &BigUint) -> BigUint {
    let n = BigInt::from(n.clone());
    BigInt::from(symbol)
        .mod_floor(&n)
        .to_biguint()
        .unwrap_or_default()
}

/// Big-endian bytes to integer
pub fn bytes_to_int(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Minimal big-endian encoding. Zero encodes as an empty string.
pub fn int_to_bytes(num: &BigUint) -> Vec<u8> {
    if num.is_zero() {
        Vec::new()
    } else {
        num.to_bytes_be()
    }
}

fn low_bits(num: &BigUint, mask: u32) -> u32 {
    num.iter_u32_digits().next().map_or(0, |digit| digit & mask)
}
