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

use async_trait::async_trait;
use gasp_common_types::Outpoint;

use crate::{
    graph::GaspNode,
    messages::{InitialReply, InitialRequest, InitialResponse, NodeResponse, VersionMismatchMessage},
};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("GASP version mismatch (current: {current_version}, foreign: {foreign_version})")]
    VersionMismatch {
        current_version: u32,
        foreign_version: u32,
    },
    #[error("Connection to remote peer failed: {0}")]
    Connection(String),
    #[error("Remote peer sent an invalid response: {0}")]
    InvalidResponse(String),
    #[error("Remote peer reported a storage failure: {0}")]
    RemoteStorage(String),
}

impl RemoteError {
    /// The wire form of this error, for the variants that have one.
    pub fn to_wire_message(&self) -> Option<VersionMismatchMessage> {
        match self {
            RemoteError::VersionMismatch {
                current_version,
                foreign_version,
            } => Some(VersionMismatchMessage::new(*current_version, *foreign_version)),
            _ => None,
        }
    }
}

/// Transport port of the sync engine. One implementation per reachable peer; every method is a
/// round trip to that peer.
#[async_trait]
pub trait GaspRemote: Send + Sync {
    /// Open a sync pass with the peer. A version mismatch reported here is fatal for the pass.
    async fn get_initial_response(&self, request: InitialRequest) -> Result<InitialResponse, RemoteError>;

    /// Ask the peer which of the outpoints in `response` it still wants pushed.
    async fn get_initial_reply(&self, response: InitialResponse) -> Result<InitialReply, RemoteError>;

    /// Fetch one node of the graph named by `graph_id`.
    async fn request_node(
        &self,
        graph_id: &Outpoint,
        outpoint: &Outpoint,
        metadata: bool,
    ) -> Result<GaspNode, RemoteError>;

    /// Push one node to the peer. `None` signals the peer needs nothing further below this node
    /// and must be treated as a successful terminal.
    async fn submit_node(&self, node: &GaspNode) -> Result<Option<NodeResponse>, RemoteError>;
}
