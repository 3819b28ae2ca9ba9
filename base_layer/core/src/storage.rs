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

use async_trait::async_trait;
use gasp_common_types::{Outpoint, Txid};

use crate::{graph::GaspNode, messages::RequestedInput};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Value not found: {entity} with {field} = `{value}`")]
    ValueNotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Graph `{0}` is not anchored")]
    GraphNotAnchored(Outpoint),
    #[error("Data inconsistency detected: {0}")]
    DataInconsistency(String),
    #[error("Storage backend failure: {0}")]
    BackendError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Durability port of the sync engine.
///
/// A graph moves through four states at the storage layer: *staging* after the first
/// [append_to_graph](GaspStorage::append_to_graph), *anchored* once
/// [validate_graph_anchor](GaspStorage::validate_graph_anchor) succeeds, *final* after
/// [finalize_graph](GaspStorage::finalize_graph) and *discarded* after
/// [discard_graph](GaspStorage::discard_graph). Final and discarded are terminal. The engine
/// drives the transitions; the implementation owns durability and the anchor rule itself
/// (typically the existence of a Merkle proof tying the root transaction to a mined block).
#[async_trait]
pub trait GaspStorage: Send + Sync {
    /// Every UTXO known at or after `since`. `since = 0` returns the full set.
    async fn find_known_utxos(&self, since: u32) -> Result<Vec<Outpoint>, StorageError>;

    /// Load the node for `outpoint` within `graph_id`, with metadata when `metadata` is set.
    /// Must fail with [StorageError::ValueNotFound] when the outpoint is unknown locally.
    async fn hydrate_gasp_node(
        &self,
        graph_id: &Outpoint,
        outpoint: &Outpoint,
        metadata: bool,
    ) -> Result<GaspNode, StorageError>;

    /// The inputs of `node` that still need to be fetched, keyed by outpoint string. Must not
    /// include inputs already satisfied within the same graph. `None` means the storage has no
    /// map for this node at all; an empty map means the node is a leaf.
    async fn find_needed_inputs(
        &self,
        node: &GaspNode,
    ) -> Result<Option<HashMap<String, RequestedInput>>, StorageError>;

    /// Stage `node` into its graph. `spent_by` is the txid of the transaction that consumes this
    /// node's output, or `None` for the graph root.
    async fn append_to_graph(&self, node: &GaspNode, spent_by: Option<&Txid>) -> Result<(), StorageError>;

    /// Check the anchor rule for a fully staged graph.
    async fn validate_graph_anchor(&self, graph_id: &Outpoint) -> Result<(), StorageError>;

    /// Drop a staging or anchored graph.
    async fn discard_graph(&self, graph_id: &Outpoint) -> Result<(), StorageError>;

    /// Commit an anchored graph, making its root UTXO known.
    async fn finalize_graph(&self, graph_id: &Outpoint) -> Result<(), StorageError>;
}
