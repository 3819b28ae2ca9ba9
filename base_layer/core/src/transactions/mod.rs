//  Copyright 2024. The Tari Project
//
//  Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
//  following conditions are met:
//
//  1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
//  disclaimer.
//
//  2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
//  following disclaimer in the documentation and/or other materials provided with the distribution.
//
//  3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
//  products derived from this software without specific prior written permission.
//
//  THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
//  INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
//  DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
//  SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
//  SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
//  WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
//  USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Transaction identity.
//!
//! The engine never evaluates scripts or proofs; the only thing it needs from a raw transaction
//! is its canonical identifier. [txid] checks that the bytes form a structurally complete
//! transaction in the standard wire format and returns the double SHA-256 of the whole
//! serialisation.

use gasp_common_types::Txid;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction bytes ended prematurely (wanted {wanted} more bytes, {remaining} remaining)")]
    Truncated { wanted: usize, remaining: usize },
    #[error("Transaction has {0} trailing bytes after the lock time")]
    TrailingBytes(usize),
    #[error("Transaction declares an impossible item count ({0})")]
    CountOutOfRange(u64),
}

/// Compute the canonical transaction id of a serialised transaction.
pub fn txid(raw_tx: &[u8]) -> Result<Txid, TransactionError> {
    check_structure(raw_tx)?;
    let digest = Sha256::digest(Sha256::digest(raw_tx));
    Ok(Txid::from_bytes(digest.into()))
}

// Walks the standard wire format: version, inputs, outputs, lock time. Contents are not
// interpreted; only the framing is checked so that a malformed node is rejected before its id is
// taken as truth.
fn check_structure(raw_tx: &[u8]) -> Result<(), TransactionError> {
    let mut reader = ByteReader::new(raw_tx);
    reader.skip(4)?; // version
    let num_inputs = reader.read_compact_size()?;
    reader.check_count(num_inputs, 41)?; // outpoint + script length + sequence
    for _ in 0..num_inputs {
        reader.skip(36)?; // previous outpoint
        let script_len = reader.read_compact_size()?;
        reader.skip_counted(script_len)?;
        reader.skip(4)?; // sequence
    }
    let num_outputs = reader.read_compact_size()?;
    reader.check_count(num_outputs, 9)?; // value + script length
    for _ in 0..num_outputs {
        reader.skip(8)?; // value
        let script_len = reader.read_compact_size()?;
        reader.skip_counted(script_len)?;
    }
    reader.skip(4)?; // lock time
    if reader.remaining() > 0 {
        return Err(TransactionError::TrailingBytes(reader.remaining()));
    }
    Ok(())
}

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn skip(&mut self, len: usize) -> Result<(), TransactionError> {
        if self.remaining() < len {
            return Err(TransactionError::Truncated {
                wanted: len,
                remaining: self.remaining(),
            });
        }
        self.pos += len;
        Ok(())
    }

    fn skip_counted(&mut self, len: u64) -> Result<(), TransactionError> {
        let len = usize::try_from(len).map_err(|_| TransactionError::CountOutOfRange(len))?;
        self.skip(len)
    }

    fn read_byte(&mut self) -> Result<u8, TransactionError> {
        let byte = *self.buf.get(self.pos).ok_or(TransactionError::Truncated {
            wanted: 1,
            remaining: 0,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_le(&mut self, len: usize) -> Result<u64, TransactionError> {
        if self.remaining() < len {
            return Err(TransactionError::Truncated {
                wanted: len,
                remaining: self.remaining(),
            });
        }
        let mut value = 0u64;
        for (i, byte) in self.buf[self.pos..self.pos + len].iter().enumerate() {
            value |= u64::from(*byte) << (8 * i);
        }
        self.pos += len;
        Ok(value)
    }

    fn read_compact_size(&mut self) -> Result<u64, TransactionError> {
        match self.read_byte()? {
            0xfd => self.read_le(2),
            0xfe => self.read_le(4),
            0xff => self.read_le(8),
            byte => Ok(u64::from(byte)),
        }
    }

    // Rejects counts that could not possibly fit in the remaining bytes, before any looping.
    fn check_count(&self, count: u64, min_item_size: u64) -> Result<(), TransactionError> {
        if count.saturating_mul(min_item_size) > self.remaining() as u64 {
            return Err(TransactionError::CountOutOfRange(count));
        }
        Ok(())
    }
}
