//! Textbook RSA for messages of any length.
//!
//! Messages are chopped into blocks smaller than the modulus, every block is
//! raised to the key's exponent, and the resulting block sequence is packed
//! into a single-line base64 token.
//!
//! # Usage
//! ```
//! use rsa_chops::{decrypt, encrypt, generate_keypair, sign, verify};
//!
//! // two 64 bit primes
//! let (public, private) = generate_keypair(64).unwrap().into_parts();
//!
//! let msg = "It was me who ate the cake";
//!
//! let encrypted = encrypt(msg.as_bytes(), &public).unwrap();
//! assert_eq!(decrypt(&encrypted, &private).unwrap(), msg.as_bytes());
//!
//! let signed = sign(msg.as_bytes(), &private).unwrap();
//! assert_eq!(verify(&signed, &public).unwrap(), msg.as_bytes());
//!
//! // keys travel as `e!n` and `d!p!q`
//! let public_again: rsa_chops::PublicKey = public.to_string().parse().unwrap();
//! assert_eq!(public, public_again);
//! ```

/// Module dedicated to the number theory helpers: modular exponentiation,
/// inverses and the Jacobi symbol
pub mod algo;

/// Module dedicated to splitting messages into blocks and gluing them back
pub mod chop;

/// Module dedicated to the key generation settings
pub mod config;

/// Module dedicated to the prime number generation and verification
pub mod prime;

/// Module dedicated to drawing random integers from a secure source
pub mod random;

/// Module dedicated to the rsa keys and operations
pub mod rsa;

/// Module dedicated to the textual encoding of block sequences
pub mod serial;

pub use crate::rsa::{
    decrypt, encrypt, generate_keypair, generate_keypair_from, generate_keypair_with, sign, verify, KeyPair, PrivateKey,
    PublicKey, RsaError, RsaGenError,
};
