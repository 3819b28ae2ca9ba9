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

//! The Graph Aware Sync Protocol (GASP) engine.
//!
//! GASP reconciles the unspent transaction output sets of two peers on a Bitcoin-style overlay
//! network. A sync pass discovers UTXOs the local peer lacks, pulls the full transaction
//! dependency graph behind each one, validates the graph against the storage layer's anchor rule
//! and commits or discards it atomically. When running bidirectionally the same pass pushes
//! graphs the foreign peer asked for.
//!
//! The engine is transport and storage agnostic: peers are reached through the
//! [GaspRemote](remote::GaspRemote) port and durability is delegated to the
//! [GaspStorage](storage::GaspStorage) port. The peer-facing half of the protocol is implemented
//! by [GaspService](service::GaspService), which answers the same four operations the engine
//! consumes, so one process can act as both initiator and responder.

pub mod config;
pub use config::{GaspConfig, GASP_PROTOCOL_VERSION};

pub mod graph;
pub use graph::{GaspInput, GaspNode};

pub mod messages;
pub use messages::{InitialReply, InitialRequest, InitialResponse, NodeResponse, RequestedInput};

pub mod remote;
pub use remote::{GaspRemote, RemoteError};

pub mod service;
pub use service::GaspService;

pub mod storage;
pub use storage::{GaspStorage, StorageError};

pub mod sync;
pub use sync::{GaspSynchronizer, GaspSyncError, SyncSummary};

pub mod transactions;
