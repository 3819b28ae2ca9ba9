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

//! The message shapes exchanged between peers. All payloads are JSON-compatible; outpoints are
//! rendered as `txid.outputIndex` strings.

use std::collections::HashMap;

use gasp_common_types::Outpoint;
use serde::{Deserialize, Serialize};

/// Stable code carried by the version-mismatch error on the wire.
pub const VERSION_MISMATCH_CODE: &str = "ERR_GASP_VERSION_MISMATCH";

/// Opens a sync pass: the initiator's protocol version and the marker of the last successful
/// interaction with this peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialRequest {
    pub version: u32,
    pub since: u32,
}

/// Answer to an [InitialRequest]: every UTXO the responder knows at or after the requested
/// `since`, and the responder's own marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialResponse {
    #[serde(rename = "UTXOList")]
    pub utxo_list: Vec<Outpoint>,
    pub since: u32,
}

/// The subset of an [InitialResponse]'s UTXO list the replying peer does not already have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialReply {
    #[serde(rename = "UTXOList")]
    pub utxo_list: Vec<Outpoint>,
}

/// Returned by `SubmitNode`: the inputs the receiving peer still needs, keyed by outpoint
/// string. An absent response means the submitted branch is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    #[serde(default)]
    pub requested_inputs: HashMap<String, RequestedInput>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedInput {
    /// Whether the peer wants transaction and output metadata hydrated along with the node.
    pub metadata: bool,
}

/// Wire form of the only protocol-surface error the engine defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMismatchMessage {
    pub code: String,
    pub message: String,
    pub current_version: u32,
    pub foreign_version: u32,
}

impl VersionMismatchMessage {
    pub fn new(current_version: u32, foreign_version: u32) -> Self {
        Self {
            code: VERSION_MISMATCH_CODE.to_string(),
            message: format!(
                "GASP version mismatch (current: {}, foreign: {})",
                current_version, foreign_version
            ),
            current_version,
            foreign_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPOINT: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b.0";

    #[test]
    fn initial_messages_use_the_documented_field_names() {
        let response = InitialResponse {
            utxo_list: vec![SAMPLE_OUTPOINT.parse().unwrap()],
            since: 42,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["UTXOList"][0], SAMPLE_OUTPOINT);
        assert_eq!(json["since"], 42);
        let back: InitialResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn node_response_defaults_to_no_requested_inputs() {
        let response: NodeResponse = serde_json::from_str("{}").unwrap();
        assert!(response.requested_inputs.is_empty());

        let response: NodeResponse =
            serde_json::from_str(&format!(r#"{{"requestedInputs":{{"{}":{{"metadata":true}}}}}}"#, SAMPLE_OUTPOINT))
                .unwrap();
        assert!(response.requested_inputs[SAMPLE_OUTPOINT].metadata);
    }

    #[test]
    fn version_mismatch_carries_the_stable_code() {
        let message = VersionMismatchMessage::new(2, 1);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["code"], VERSION_MISMATCH_CODE);
        assert_eq!(json["currentVersion"], 2);
        assert_eq!(json["foreignVersion"], 1);
    }
}
