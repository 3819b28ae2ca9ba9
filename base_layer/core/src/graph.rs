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

use std::collections::HashMap;

use gasp_common_types::{serializers, Outpoint, Txid};
use serde::{Deserialize, Serialize};

use crate::transactions::{self, TransactionError};

/// One node of a transaction dependency graph.
///
/// A node carries the full serialised transaction that produced one output, plus whatever
/// ancillary material the peer attached: a Merkle proof for anchored transactions, metadata, and
/// references to the inputs the transaction spends. Nodes are produced by the remote peer during
/// incoming walks and hydrated from local storage during outgoing walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaspNode {
    /// The outpoint naming the dependency graph this node belongs to.
    pub graph_id: Outpoint,
    #[serde(with = "serializers::hex")]
    pub raw_tx: Vec<u8>,
    pub output_index: u32,
    /// Merkle proof tying the transaction to a mined block, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serializers::hex::opt")]
    pub proof: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_metadata: Option<String>,
    /// References to the transactions whose outputs this one spends, keyed by outpoint string.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub inputs: HashMap<String, GaspInput>,
    /// Extra proof bytes that ride along with the node but are opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serializers::hex::opt")]
    pub ancillary_beef: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaspInput {
    pub hash: Txid,
}

impl GaspNode {
    pub fn new(graph_id: Outpoint, raw_tx: Vec<u8>, output_index: u32) -> Self {
        Self {
            graph_id,
            raw_tx,
            output_index,
            proof: None,
            tx_metadata: None,
            output_metadata: None,
            inputs: HashMap::new(),
            ancillary_beef: None,
        }
    }

    /// The outpoint this node proves: the computed txid of `raw_tx` combined with
    /// `output_index`. Its string form is the node's identity within a sync walk.
    pub fn node_outpoint(&self) -> Result<Outpoint, TransactionError> {
        Ok(Outpoint::new(transactions::txid(&self.raw_tx)?, self.output_index))
    }
}
