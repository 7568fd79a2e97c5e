//! Wire format of a block sequence.
//!
//! ```text
//! u8      version (1)
//! u64 BE  message length in bytes
//! u32 BE  number of blocks
//! per block:
//!   u32 BE  length of the magnitude
//!   [u8]    big-endian magnitude, no leading zeros (zero is empty)
//! ```
//!
//! The buffer is zlib-compressed and encoded with standard base64 on a
//! single line. The token can contain `/` and `+`, so callers that put it in
//! a URL path segment have to escape those themselves.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use num_bigint::BigUint;

use crate::{
    algo::{bytes_to_int, int_to_bytes},
    chop::BlockSequence,
    rsa::RsaError,
};

const VERSION: u8 = 1;

/// Largest packed buffer `deserialize` will inflate
pub const MAX_PACKED_LEN: usize = 16 * 1024 * 1024;

/// Packs, compresses and base64-encodes the sequence
pub fn serialize(sequence: &BlockSequence) -> String {
    let mut packed = Vec::new();
    packed.push(VERSION);
    packed.extend_from_slice(&sequence.message_len().to_be_bytes());
    packed.extend_from_slice(&(sequence.len() as u32).to_be_bytes());
    for block in sequence.blocks() {
        let bytes = int_to_bytes(block);
        packed.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        packed.extend_from_slice(&bytes);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&packed)
        .expect("writing into a vector cannot fail");
    let compressed = encoder.finish().expect("writing into a vector cannot fail");

    base64::encode(compressed)
}

/// Inverse of [`serialize`]. ASCII whitespace in the token is ignored.
///
/// Tokens that inflate past [`MAX_PACKED_LEN`] bytes are rejected without
/// being inflated further.
pub fn deserialize(token: &str) -> Result<BlockSequence, RsaError> {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let compressed =
        base64::decode(compact).map_err(|_| RsaError::MalformedPayload("invalid base64"))?;

    let mut packed = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(MAX_PACKED_LEN as u64 + 1)
        .read_to_end(&mut packed)
        .map_err(|_| RsaError::MalformedPayload("invalid zlib stream"))?;
    if packed.len() > MAX_PACKED_LEN {
        return Err(RsaError::MalformedPayload("payload too large"));
    }

    let mut reader = Reader { buf: &packed };
    if reader.u8()? != VERSION {
        return Err(RsaError::MalformedPayload("unknown format version"));
    }
    let message_len = reader.u64()?;
    let count = reader.u32()? as usize;

    // every block takes at least four bytes
    let mut blocks = Vec::with_capacity(count.min(reader.buf.len() / 4));
    for _ in 0..count {
        let len = reader.u32()? as usize;
        let bytes = reader.take(len)?;
        if bytes.first() == Some(&0) {
            return Err(RsaError::MalformedPayload("block has leading zeros"));
        }
        blocks.push(bytes_to_int(bytes));
    }

    if !reader.buf.is_empty() {
        return Err(RsaError::MalformedPayload("trailing bytes"));
    }
    Ok(BlockSequence::new(message_len, blocks))
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], RsaError> {
        if self.buf.len() < len {
            return Err(RsaError::MalformedPayload("truncated"));
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], RsaError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, RsaError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, RsaError> {
        self.array().map(u32::from_be_bytes)
    }

    fn u64(&mut self) -> Result<u64, RsaError> {
        self.array().map(u64::from_be_bytes)
    }
}
