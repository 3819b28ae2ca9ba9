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

use std::{
    fmt,
    fmt::Formatter,
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const TRANSACTION_HASH_LENGTH: usize = 32;

/// A transaction identifier: the double SHA-256 digest of a serialised transaction.
///
/// The digest is stored in wire order. The human-readable form follows the overlay network
/// convention of rendering the bytes reversed, so `Display` and `FromStr` are inverses of each
/// other but not of the in-memory byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Txid([u8; TRANSACTION_HASH_LENGTH]);

impl Txid {
    pub const fn from_bytes(bytes: [u8; TRANSACTION_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSACTION_HASH_LENGTH] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; TRANSACTION_HASH_LENGTH] {
        self.0
    }

    /// Parse the reversed-hex rendering of a transaction id.
    pub fn from_hex(hex_str: &str) -> Result<Self, HashParseError> {
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != TRANSACTION_HASH_LENGTH {
            return Err(HashParseError::InvalidLength {
                expected: TRANSACTION_HASH_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut hash = [0u8; TRANSACTION_HASH_LENGTH];
        for (dst, src) in hash.iter_mut().zip(bytes.iter().rev()) {
            *dst = *src;
        }
        Ok(Self(hash))
    }

    /// The reversed-hex rendering of this transaction id.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({})", self.to_hex())
    }
}

impl FromStr for Txid {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; TRANSACTION_HASH_LENGTH]> for Txid {
    fn from(bytes: [u8; TRANSACTION_HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Txid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Txid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let hex_str = <String as Deserialize>::deserialize(deserializer)?;
            Txid::from_hex(&hex_str).map_err(de::Error::custom)
        } else {
            let bytes = <Vec<u8> as Deserialize>::deserialize(deserializer)?;
            let hash = <[u8; TRANSACTION_HASH_LENGTH]>::try_from(bytes.as_slice())
                .map_err(|_| de::Error::custom("Txid was not 32 bytes"))?;
            Ok(Txid(hash))
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HashParseError {
    #[error("Expected {expected} bytes of hash data, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
