use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use thiserror::Error;

use crate::{
    algo::{are_relatively_prime, invmod, modexp},
    chop::{chop_and_transform, glue_from_transform},
    config::{Deadline, KeyGenConfig},
    prime::{gen::generate_prime_with, PrimeError},
    serial::{deserialize, serialize},
};

/// Bounds on the width of each of the two primes, in bits
pub const MIN_PRIME_BITS: u64 = 8;
pub const MAX_PRIME_BITS: u64 = 8192;

/// Smallest width of the public exponent, in bits
const MIN_EXPONENT_BITS: u64 = 8;

/// Delimiter of the fields in a key string
const KEY_DELIMITER: char = '!';

#[derive(Debug, Error)]
pub enum RsaError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("block is not smaller than the modulus")]
    Overflow,

    #[error("malformed payload: {0}")]
    MalformedPayload(&'static str),
}

#[derive(Debug, Error)]
pub enum RsaGenError {
    #[error("key size is too small")]
    KeyTooSmall,

    #[error("key size is too big")]
    KeyTooBig,

    #[error(transparent)]
    Prime(#[from] PrimeError),

    #[error("public exponent has no inverse modulo phi")]
    ArithmeticInvariantViolation,
}

/// Rsa public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    e: BigUint,
    n: BigUint,
}

/// Rsa private key. The modulus is kept as its two factors.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    d: BigUint,
    p: BigUint,
    q: BigUint,
}

/// Both halves of a freshly generated key
#[derive(Debug, Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl PublicKey {
    pub fn new(e: BigUint, n: BigUint) -> Result<Self, RsaError> {
        if e <= BigUint::one() || e >= n {
            return Err(RsaError::InvalidInput("public exponent must be in (1, n)"));
        }
        if !are_relatively_prime(&e, &n) {
            return Err(RsaError::InvalidInput("public exponent shares a factor with n"));
        }
        Ok(Self { e, n })
    }

    /// Encrypts `message` so that only the private key can read it
    pub fn encrypt(&self, message: &[u8]) -> Result<String, RsaError> {
        let blocks = chop_and_transform(message, &self.e, &self.n, modexp)?;
        Ok(serialize(&blocks))
    }

    /// Recovers the message from a signature made by the private key
    pub fn verify(&self, signed: &str) -> Result<Vec<u8>, RsaError> {
        let blocks = deserialize(signed)?;
        glue_from_transform(&blocks, &self.e, &self.n, modexp)
    }

    pub fn encrypt_raw(&self, num: &BigUint) -> Result<BigUint, RsaError> {
        transform_raw(num, &self.e, &self.n)
    }

    pub fn verify_raw(&self, num: &BigUint) -> Result<BigUint, RsaError> {
        transform_raw(num, &self.e, &self.n)
    }

    /// Get a reference to the rsa public's e.
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Get a reference to the rsa public's n.
    pub fn n(&self) -> &BigUint {
        &self.n
    }
}

impl PrivateKey {
    pub fn new(d: BigUint, p: BigUint, q: BigUint) -> Result<Self, RsaError> {
        if d.is_zero() {
            return Err(RsaError::InvalidInput("private exponent must be positive"));
        }
        if p <= BigUint::one() || q <= BigUint::one() {
            return Err(RsaError::InvalidInput("factors must be greater than one"));
        }
        if p == q {
            return Err(RsaError::InvalidInput("factors must be distinct"));
        }
        Ok(Self { d, p, q })
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<Vec<u8>, RsaError> {
        let blocks = deserialize(encrypted)?;
        glue_from_transform(&blocks, &self.d, &self.modulus(), modexp)
    }

    pub fn sign(&self, message: &[u8]) -> Result<String, RsaError> {
        let blocks = chop_and_transform(message, &self.d, &self.modulus(), modexp)?;
        Ok(serialize(&blocks))
    }

    pub fn decrypt_raw(&self, num: &BigUint) -> Result<BigUint, RsaError> {
        transform_raw(num, &self.d, &self.modulus())
    }

    pub fn sign_raw(&self, num: &BigUint) -> Result<BigUint, RsaError> {
        transform_raw(num, &self.d, &self.modulus())
    }

    /// n = p * q
    pub fn modulus(&self) -> BigUint {
        &self.p * &self.q
    }

    /// Get a reference to the rsa private's d.
    pub fn d(&self) -> &BigUint {
        &self.d
    }

    /// Get a reference to the rsa private's p.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Get a reference to the rsa private's q.
    pub fn q(&self) -> &BigUint {
        &self.q
    }
}

// Secrets stay out of debug output
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.modulus().bits())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public, self.private)
    }
}

fn transform_raw(num: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint, RsaError> {
    if num >= modulus {
        return Err(RsaError::Overflow);
    }
    Ok(modexp(num, exponent, modulus))
}

impl fmt::Display for PublicKey {
    /// `e!n`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.e, KEY_DELIMITER, self.n)
    }
}

impl fmt::Display for PrivateKey {
    /// `d!p!q`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{delim}{}{delim}{}",
            self.d,
            self.p,
            self.q,
            delim = KEY_DELIMITER
        )
    }
}

impl FromStr for PublicKey {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [e, n] = parse_fields::<2>(s)?;
        Self::new(e, n)
    }
}

impl FromStr for PrivateKey {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [d, p, q] = parse_fields::<3>(s)?;
        Self::new(d, p, q)
    }
}

/// Splits a key string into exactly `N` unsigned decimal fields
fn parse_fields<const N: usize>(s: &str) -> Result<[BigUint; N], RsaError> {
    let fields = s
        .split(KEY_DELIMITER)
        .map(|field| {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RsaError::InvalidInput("key fields must be decimal digits"));
            }
            BigUint::parse_bytes(field.as_bytes(), 10)
                .ok_or(RsaError::InvalidInput("key fields must be decimal digits"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    fields
        .try_into()
        .map_err(|_| RsaError::InvalidInput("wrong number of key fields"))
}

/// Generates RSA key pair where each prime has `bits` bits
pub fn generate_keypair(bits: u64) -> Result<KeyPair, RsaGenError> {
    generate_keypair_with(bits, &KeyGenConfig::default())
}

pub fn generate_keypair_with(bits: u64, config: &KeyGenConfig) -> Result<KeyPair, RsaGenError> {
    generate_keypair_from(&mut OsRng, bits, config)
}

/// Generates RSA key pair drawing every random number from `rng`
pub fn generate_keypair_from<R>(
    rng: &mut R,
    bits: u64,
    config: &KeyGenConfig,
) -> Result<KeyPair, RsaGenError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if bits < MIN_PRIME_BITS {
        return Err(RsaGenError::KeyTooSmall);
    }
    if bits > MAX_PRIME_BITS {
        return Err(RsaGenError::KeyTooBig);
    }

    let deadline = config.deadline();
    let (p, q) = find_distinct_primes(rng, bits, config.confidence(), &deadline)?;
    let (e, d) = derive_exponents(rng, &p, &q, bits, config.confidence(), &deadline)?;
    log::debug!("generated keypair with {}-bit modulus", (&p * &q).bits());

    let public = PublicKey { e, n: &p * &q };
    let private = PrivateKey { d, p, q };
    Ok(KeyPair { public, private })
}

/// Two different primes of `bits` bits
pub fn find_distinct_primes<R>(
    rng: &mut R,
    bits: u64,
    confidence: u32,
    deadline: &Deadline,
) -> Result<(BigUint, BigUint), PrimeError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let p = generate_prime_with(rng, bits, confidence, deadline)?;
    loop {
        let q = generate_prime_with(rng, bits, confidence, deadline)?;
        if p != q {
            log::debug!("found two distinct {}-bit primes", bits);
            break Ok((p, q));
        }
        log::trace!("q collided with p, drawing again");
    }
}

/// Picks a prime public exponent coprime to both `n` and `phi`, and its
/// inverse modulo `phi`
#[allow(clippy::many_single_char_names)]
pub fn derive_exponents<R>(
    rng: &mut R,
    p: &BigUint,
    q: &BigUint,
    bits: u64,
    confidence: u32,
    deadline: &Deadline,
) -> Result<(BigUint, BigUint), RsaGenError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let n = p * q;
    let phi = (p - 1u32) * (q - 1u32);
    // e needs enough bits to wrap around n
    let exponent_bits = (bits / 2).max(MIN_EXPONENT_BITS);

    let mut tries = 0u32;
    let e = loop {
        tries += 1;
        let e = generate_prime_with(rng, exponent_bits, confidence, deadline)?;
        if are_relatively_prime(&e, &n) && are_relatively_prime(&e, &phi) {
            break e;
        }
        log::trace!("public exponent candidate rejected");
    };
    log::debug!("found public exponent after {} candidates", tries);

    let d = checked_inverse(&e, &phi)?;
    Ok((e, d))
}

/// Inverse of `e` modulo `phi`, verified by `(e * d) mod phi == 1`
fn checked_inverse(e: &BigUint, phi: &BigUint) -> Result<BigUint, RsaGenError> {
    match invmod(e, phi) {
        Some(d) if !d.is_zero() && (e * &d % phi).is_one() => Ok(d),
        _ => Err(RsaGenError::ArithmeticInvariantViolation),
    }
}

pub fn encrypt(message: &[u8], key: &PublicKey) -> Result<String, RsaError> {
    key.encrypt(message)
}

pub fn decrypt(encrypted: &str, key: &PrivateKey) -> Result<Vec<u8>, RsaError> {
    key.decrypt(encrypted)
}

pub fn sign(message: &[u8], key: &PrivateKey) -> Result<String, RsaError> {
    key.sign(message)
}

pub fn verify(signed: &str, key: &PublicKey) -> Result<Vec<u8>, RsaError> {
    key.verify(signed)
}
