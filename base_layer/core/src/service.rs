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

use std::{collections::HashSet, sync::Arc};

use gasp_common_types::Outpoint;
use log::*;

use crate::{
    config::GaspConfig,
    graph::GaspNode,
    messages::{InitialReply, InitialRequest, InitialResponse, NodeResponse},
    remote::RemoteError,
    storage::GaspStorage,
    sync::{complete_graph, GaspSyncError},
};

const LOG_TARGET: &str = "gasp::service";

/// The peer-facing half of the protocol: answers the four operations a foreign GASP consumes.
///
/// A process that both initiates syncs and serves them runs a [GaspSynchronizer] and a
/// [GaspService] over the same storage.
///
/// [GaspSynchronizer]: crate::sync::GaspSynchronizer
pub struct GaspService<S> {
    config: GaspConfig,
    storage: Arc<S>,
}

impl<S> GaspService<S>
where S: GaspStorage
{
    pub fn new(config: GaspConfig, storage: Arc<S>) -> Self {
        Self { config, storage }
    }

    #[inline]
    fn storage(&self) -> &S {
        &self.storage
    }

    /// Answer a foreign peer's opening request: the local UTXO set since the requested marker.
    /// The version gate runs before any storage access.
    pub async fn get_initial_response(&self, request: InitialRequest) -> Result<InitialResponse, GaspSyncError> {
        if request.version != self.config.version {
            warn!(
                target: LOG_TARGET,
                "{}Rejecting sync request with version {} (ours is {})",
                self.config.log_prefix,
                request.version,
                self.config.version
            );
            return Err(RemoteError::VersionMismatch {
                current_version: self.config.version,
                foreign_version: request.version,
            }
            .into());
        }
        let utxo_list = self.storage().find_known_utxos(request.since).await?;
        debug!(
            target: LOG_TARGET,
            "{}Reporting {} UTXO(s) since {}", self.config.log_prefix, utxo_list.len(), request.since
        );
        Ok(InitialResponse {
            utxo_list,
            since: self.config.last_interaction,
        })
    }

    /// The subset of the presented UTXO list this peer does not already have, i.e. the outpoints
    /// it wants pulled.
    pub async fn get_initial_reply(&self, response: InitialResponse) -> Result<InitialReply, GaspSyncError> {
        let known = self
            .storage()
            .find_known_utxos(response.since)
            .await?
            .into_iter()
            .collect::<HashSet<_>>();
        let utxo_list = response
            .utxo_list
            .into_iter()
            .filter(|outpoint| !known.contains(outpoint))
            .collect::<Vec<_>>();
        debug!(
            target: LOG_TARGET,
            "{}Requesting {} graph(s) from the foreign peer", self.config.log_prefix, utxo_list.len()
        );
        Ok(InitialReply { utxo_list })
    }

    /// Serve one node of a locally known graph.
    pub async fn request_node(
        &self,
        graph_id: &Outpoint,
        outpoint: &Outpoint,
        metadata: bool,
    ) -> Result<GaspNode, GaspSyncError> {
        trace!(
            target: LOG_TARGET,
            "{}Serving node {} of graph {}", self.config.log_prefix, outpoint, graph_id
        );
        Ok(self.storage().hydrate_gasp_node(graph_id, outpoint, metadata).await?)
    }

    /// Accept one node pushed by a foreign peer. When the storage produces an input map (even an
    /// empty one) the graph is driven to completion so the submitter knows it may stop walking;
    /// no map at all means the branch is terminal and nothing further happens.
    pub async fn submit_node(&self, node: GaspNode) -> Result<Option<NodeResponse>, GaspSyncError> {
        self.storage().append_to_graph(&node, None).await?;
        match self.storage().find_needed_inputs(&node).await? {
            Some(requested_inputs) => {
                complete_graph(self.storage(), &node.graph_id).await?;
                Ok(Some(NodeResponse { requested_inputs }))
            },
            None => Ok(None),
        }
    }
}
