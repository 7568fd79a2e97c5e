//! Chopping
//!
//! RSA can only transform integers below the modulus, so a longer message is
//! cut into blocks of `w` bytes, where `w` is the largest width with
//! `256^w <= n`. Each block is read as a big-endian integer and transformed
//! on its own.
//!
//! The sequence remembers how long the message was. Gluing writes every
//! block back at exactly `w` bytes (the last one at whatever is left), so
//! blocks that start with zero bytes come back intact.

use num_bigint::BigUint;
use zeroize::Zeroize;

use crate::{
    algo::{bytes_to_int, int_to_bytes},
    rsa::RsaError,
};

/// Ordered blocks of one message, plus the message length in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSequence {
    message_len: u64,
    blocks: Vec<BigUint>,
}

impl BlockSequence {
    pub fn new(message_len: u64, blocks: Vec<BigUint>) -> Self {
        Self {
            message_len,
            blocks,
        }
    }

    /// Get a reference to the blocks.
    pub fn blocks(&self) -> &[BigUint] {
        &self.blocks
    }

    /// Length in bytes of the message the blocks were chopped from
    pub fn message_len(&self) -> u64 {
        self.message_len
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_blocks(self) -> Vec<BigUint> {
        self.blocks
    }
}

/// Number of message bytes that fit in one block under `modulus`
pub fn block_width(modulus: &BigUint) -> Result<usize, RsaError> {
    // floor(log2(n)) / 8, so that 256^w <= 2^floor(log2(n)) <= n
    let width = modulus.bits().saturating_sub(1) / 8;
    if width == 0 {
        return Err(RsaError::InvalidInput("modulus is too small to hold a byte"));
    }
    usize::try_from(width).map_err(|_| RsaError::InvalidInput("modulus is too large"))
}

/// Splits `message` into blocks and runs `transform(block, exponent, modulus)`
/// on each of them
pub fn chop_and_transform<F>(
    message: &[u8],
    exponent: &BigUint,
    modulus: &BigUint,
    transform: F,
) -> Result<BlockSequence, RsaError>
where
    F: Fn(&BigUint, &BigUint, &BigUint) -> BigUint,
{
    let width = block_width(modulus)?;

    let blocks = message
        .chunks(width)
        .map(|chunk| {
            let value = bytes_to_int(chunk);
            if &value >= modulus {
                return Err(RsaError::Overflow);
            }
            Ok(transform(&value, exponent, modulus))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BlockSequence::new(message.len() as u64, blocks))
}

/// Runs `transform(block, exponent, modulus)` on every block and glues the
/// results back into the message
pub fn glue_from_transform<F>(
    sequence: &BlockSequence,
    exponent: &BigUint,
    modulus: &BigUint,
    transform: F,
) -> Result<Vec<u8>, RsaError>
where
    F: Fn(&BigUint, &BigUint, &BigUint) -> BigUint,
{
    let width = block_width(modulus)?;
    let message_len = usize::try_from(sequence.message_len)
        .map_err(|_| RsaError::MalformedPayload("message length does not fit in memory"))?;

    if sequence.blocks.len() != message_len.div_ceil(width) {
        return Err(RsaError::MalformedPayload(
            "block count does not match the message length",
        ));
    }

    let mut message = Vec::with_capacity(message_len);
    for block in &sequence.blocks {
        if block >= modulus {
            return Err(RsaError::Overflow);
        }
        let expected = width.min(message_len - message.len());

        let mut bytes = int_to_bytes(&transform(block, exponent, modulus));
        if bytes.len() > expected {
            bytes.zeroize();
            return Err(RsaError::Overflow);
        }
        message.resize(message.len() + expected - bytes.len(), 0);
        message.extend_from_slice(&bytes);
        bytes.zeroize();
    }
    Ok(message)
}
