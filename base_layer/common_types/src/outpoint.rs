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
    num::ParseIntError,
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{HashParseError, Txid};

/// The (transaction id, output index) pair identifying a transaction output.
///
/// Rendered on the wire as `txid.outputIndex` with a reversed-hex txid and a decimal index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Outpoint {
    pub txid: Txid,
    pub output_index: u32,
}

impl Outpoint {
    pub fn new(txid: Txid, output_index: u32) -> Self {
        Self { txid, output_index }
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.txid, self.output_index)
    }
}

impl FromStr for Outpoint {
    type Err = OutpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, index) = s
            .split_once('.')
            .ok_or_else(|| OutpointParseError::MissingSeparator(s.to_string()))?;
        Ok(Self {
            txid: txid.parse()?,
            output_index: index.parse()?,
        })
    }
}

impl Serialize for Outpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            (self.txid, self.output_index).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Outpoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = <String as Deserialize>::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            let (txid, output_index) = <(Txid, u32) as Deserialize>::deserialize(deserializer)?;
            Ok(Self { txid, output_index })
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OutpointParseError {
    #[error("Outpoint `{0}` is missing the `.` separator")]
    MissingSeparator(String),
    #[error("Outpoint txid is invalid: {0}")]
    InvalidTxid(#[from] HashParseError),
    #[error("Outpoint index is invalid: {0}")]
    InvalidIndex(#[from] ParseIntError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    fn sample() -> Outpoint {
        Outpoint::new(SAMPLE_TXID.parse().unwrap(), 7)
    }

    #[test]
    fn it_renders_as_txid_dot_index() {
        assert_eq!(sample().to_string(), format!("{}.7", SAMPLE_TXID));
    }

    #[test]
    fn it_parses_its_own_rendering() {
        let outpoint = sample();
        assert_eq!(outpoint.to_string().parse::<Outpoint>().unwrap(), outpoint);
    }

    #[test]
    fn it_rejects_malformed_strings() {
        assert!(matches!(
            SAMPLE_TXID.parse::<Outpoint>(),
            Err(OutpointParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "nothex.0".parse::<Outpoint>(),
            Err(OutpointParseError::InvalidTxid(_))
        ));
        assert!(matches!(
            format!("{}.x", SAMPLE_TXID).parse::<Outpoint>(),
            Err(OutpointParseError::InvalidIndex(_))
        ));
    }

    #[test]
    fn it_serializes_as_the_string_form() {
        let outpoint = sample();
        let json = serde_json::to_string(&outpoint).unwrap();
        assert_eq!(json, format!("\"{}.7\"", SAMPLE_TXID));
        let back: Outpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outpoint);
    }
}
