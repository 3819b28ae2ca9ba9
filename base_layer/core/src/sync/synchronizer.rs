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

use std::{cmp, collections::HashSet, sync::Arc};

use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use gasp_common_types::{Outpoint, Txid};
use gasp_shutdown::ShutdownSignal;
use log::*;
use tokio::sync::{Semaphore, SemaphorePermit};

use super::{error::GaspSyncError, hooks::Hooks, seen_set::SeenSet};
use crate::{
    config::GaspConfig,
    graph::GaspNode,
    messages::{InitialRequest, InitialResponse},
    remote::GaspRemote,
    storage::{GaspStorage, StorageError},
};

const LOG_TARGET: &str = "gasp::sync";

/// Outcome counts of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Graphs pulled from the foreign peer and finalised locally.
    pub pulled: usize,
    /// Graphs shared with the foreign peer.
    pub pushed: usize,
    /// Top-level walks that ended in a discard or an error.
    pub failed: usize,
}

/// Terminal state reached by [complete_graph].
#[derive(Debug)]
pub enum GraphCompletion {
    Finalized,
    Discarded { reason: StorageError },
}

/// Validate and commit a fully walked graph, or discard it.
///
/// Any failure of validation or finalisation drives the graph to discard; the discard's own
/// outcome is what the call reports.
pub async fn complete_graph<S>(storage: &S, graph_id: &Outpoint) -> Result<GraphCompletion, StorageError>
where S: GaspStorage + ?Sized {
    let reason = match storage.validate_graph_anchor(graph_id).await {
        Ok(()) => match storage.finalize_graph(graph_id).await {
            Ok(()) => return Ok(GraphCompletion::Finalized),
            Err(err) => err,
        },
        Err(err) => err,
    };
    storage.discard_graph(graph_id).await?;
    Ok(GraphCompletion::Discarded { reason })
}

/// Drives one end-to-end reconciliation pass against a single foreign peer.
///
/// The incoming half discovers UTXOs the local peer lacks and pulls the dependency graph behind
/// each one; the outgoing half (skipped in unidirectional mode) shares graphs the peer asked
/// for. All top-level walks are independent: they may interleave freely and a failure in one
/// never aborts the others. A single counted semaphore bounds the engine's in-flight I/O.
pub struct GaspSynchronizer<S, R> {
    config: GaspConfig,
    storage: Arc<S>,
    remote: Arc<R>,
    permits: Arc<Semaphore>,
    hooks: Hooks,
    shutdown: ShutdownSignal,
}

impl<S, R> GaspSynchronizer<S, R>
where
    S: GaspStorage,
    R: GaspRemote,
{
    pub fn new(config: GaspConfig, storage: Arc<S>, remote: Arc<R>, shutdown: ShutdownSignal) -> Self {
        let permits = Arc::new(Semaphore::new(cmp::max(config.concurrency, 1)));
        Self {
            config,
            storage,
            remote,
            permits,
            hooks: Default::default(),
            shutdown,
        }
    }

    pub fn on_graph_complete<H>(&mut self, hook: H)
    where H: Fn(&Outpoint) + Send + Sync + 'static {
        self.hooks.add_on_graph_complete_hook(hook);
    }

    pub fn on_graph_discard<H>(&mut self, hook: H)
    where H: Fn(&Outpoint) + Send + Sync + 'static {
        self.hooks.add_on_graph_discard_hook(hook);
    }

    /// Run one sync pass. Handshake failures and version mismatches abort the pass; errors on
    /// individual graph walks are logged and reflected in the summary instead.
    pub async fn synchronize(&self) -> Result<SyncSummary, GaspSyncError> {
        if self.shutdown.is_triggered() {
            return Err(GaspSyncError::Interrupted);
        }
        let request = InitialRequest {
            version: self.config.version,
            since: self.config.last_interaction,
        };
        debug!(
            target: LOG_TARGET,
            "{}Opening sync pass (version {}, since {})", self.config.log_prefix, request.version, request.since
        );
        let response = self.remote.get_initial_response(request).await?;

        let mut summary = SyncSummary::default();
        if response.utxo_list.is_empty() {
            debug!(
                target: LOG_TARGET,
                "{}Foreign peer reported no UTXOs since {}", self.config.log_prefix, request.since
            );
        } else {
            let (pulled, failed) = self.pull_missing_graphs(&response).await?;
            summary.pulled = pulled;
            summary.failed += failed;
        }

        if self.config.unidirectional {
            debug!(
                target: LOG_TARGET,
                "{}Unidirectional mode, skipping outgoing sync", self.config.log_prefix
            );
        } else {
            let (pushed, failed) = self.push_requested_graphs(response).await?;
            summary.pushed = pushed;
            summary.failed += failed;
        }

        info!(
            target: LOG_TARGET,
            "{}Sync pass complete ({} pulled, {} pushed, {} failed)",
            self.config.log_prefix,
            summary.pulled,
            summary.pushed,
            summary.failed
        );
        Ok(summary)
    }

    /// Fan out one incoming walk per foreign UTXO that is not already known locally.
    async fn pull_missing_graphs(&self, response: &InitialResponse) -> Result<(usize, usize), GaspSyncError> {
        let known = self
            .storage
            .find_known_utxos(0)
            .await?
            .into_iter()
            .collect::<HashSet<_>>();
        let mut branches = response
            .utxo_list
            .iter()
            .filter(|outpoint| !known.contains(*outpoint))
            .map(|outpoint| {
                let outpoint = *outpoint;
                async move {
                    let result = self.pull_graph(outpoint).await;
                    if let Err(ref err) = result {
                        warn!(
                            target: LOG_TARGET,
                            "{}Failed to sync graph for {}: {}", self.config.log_prefix, outpoint, err
                        );
                    }
                    result
                }
            })
            .collect::<FuturesUnordered<_>>();

        let (mut pulled, mut failed) = (0, 0);
        while let Some(result) = branches.next().await {
            match result {
                Ok(GraphCompletion::Finalized) => pulled += 1,
                Ok(GraphCompletion::Discarded { .. }) | Err(_) => failed += 1,
            }
        }
        Ok((pulled, failed))
    }

    /// Pull the dependency graph rooted at `outpoint` and drive it to a terminal state.
    async fn pull_graph(&self, outpoint: Outpoint) -> Result<GraphCompletion, GaspSyncError> {
        if self.shutdown.is_triggered() {
            return Err(GaspSyncError::Interrupted);
        }
        debug!(
            target: LOG_TARGET,
            "{}Requesting graph for {}", self.config.log_prefix, outpoint
        );
        let seen = SeenSet::new();
        let root = {
            let _permit = self.acquire_permit().await?;
            self.remote.request_node(&outpoint, &outpoint, true).await?
        };
        if let Err(err) = self.process_incoming_node(root, None, &seen).await {
            // Whatever was staged before the walk failed must not be left behind.
            if let Err(discard_err) = self.storage.discard_graph(&outpoint).await {
                warn!(
                    target: LOG_TARGET,
                    "{}Failed to discard partial graph {}: {}", self.config.log_prefix, outpoint, discard_err
                );
            }
            self.hooks.call_on_graph_discard_hooks(&outpoint);
            return Err(err);
        }
        let completion = complete_graph(&*self.storage, &outpoint).await?;
        match &completion {
            GraphCompletion::Finalized => {
                debug!(
                    target: LOG_TARGET,
                    "{}Graph {} finalised ({} node(s))", self.config.log_prefix, outpoint, seen.len()
                );
                self.hooks.call_on_graph_complete_hooks(&outpoint);
            },
            GraphCompletion::Discarded { reason } => {
                warn!(
                    target: LOG_TARGET,
                    "{}Graph {} discarded: {}", self.config.log_prefix, outpoint, reason
                );
                self.hooks.call_on_graph_discard_hooks(&outpoint);
            },
        }
        Ok(completion)
    }

    /// Recursive incoming walk. Stages the node, then fetches and recurses into every input the
    /// storage still needs. The seen-set is updated before any child work is launched, so
    /// concurrent arrivals at the same node race to insert and only the winner appends. Siblings
    /// are allowed to settle before the first error is reported.
    fn process_incoming_node<'a>(
        &'a self,
        node: GaspNode,
        spent_by: Option<Txid>,
        seen: &'a SeenSet,
    ) -> BoxFuture<'a, Result<(), GaspSyncError>> {
        async move {
            let node_outpoint = node.node_outpoint()?;
            let node_id = node_outpoint.to_string();
            if !seen.insert(&node_id) {
                trace!(
                    target: LOG_TARGET,
                    "{}Node {} already processed in this walk", self.config.log_prefix, node_id
                );
                return Ok(());
            }

            let needed = {
                let _permit = self.acquire_permit().await?;
                self.storage.append_to_graph(&node, spent_by.as_ref()).await?;
                self.storage.find_needed_inputs(&node).await?
            };
            let needed = match needed {
                Some(needed) if !needed.is_empty() => needed,
                _ => return Ok(()),
            };
            if self.shutdown.is_triggered() {
                return Err(GaspSyncError::Interrupted);
            }

            let graph_id = node.graph_id;
            let spending_txid = node_outpoint.txid;
            let mut branches = needed
                .into_iter()
                .map(|(outpoint_str, input)| async move {
                    let outpoint = outpoint_str.parse::<Outpoint>()?;
                    let child = {
                        let _permit = self.acquire_permit().await?;
                        self.remote.request_node(&graph_id, &outpoint, input.metadata).await?
                    };
                    self.process_incoming_node(child, Some(spending_txid), seen).await
                })
                .collect::<FuturesUnordered<_>>();

            let mut first_err = None;
            while let Some(result) = branches.next().await {
                if let Err(err) = result {
                    first_err.get_or_insert(err);
                }
            }
            match first_err {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
        .boxed()
    }

    /// Ask the peer which graphs it wants and fan out one outgoing walk per requested outpoint.
    async fn push_requested_graphs(&self, response: InitialResponse) -> Result<(usize, usize), GaspSyncError> {
        if self.shutdown.is_triggered() {
            return Err(GaspSyncError::Interrupted);
        }
        let reply = self.remote.get_initial_reply(response).await?;
        if reply.utxo_list.is_empty() {
            debug!(
                target: LOG_TARGET,
                "{}Foreign peer wants nothing from us", self.config.log_prefix
            );
            return Ok((0, 0));
        }
        let mut branches = reply
            .utxo_list
            .into_iter()
            .map(|outpoint| async move {
                let result = self.push_graph(outpoint).await;
                if let Err(ref err) = result {
                    warn!(
                        target: LOG_TARGET,
                        "{}Failed to share graph for {}: {}", self.config.log_prefix, outpoint, err
                    );
                }
                result.is_ok()
            })
            .collect::<FuturesUnordered<_>>();

        let (mut pushed, mut failed) = (0, 0);
        while let Some(ok) = branches.next().await {
            if ok {
                pushed += 1;
            } else {
                failed += 1;
            }
        }
        Ok((pushed, failed))
    }

    async fn push_graph(&self, outpoint: Outpoint) -> Result<(), GaspSyncError> {
        if self.shutdown.is_triggered() {
            return Err(GaspSyncError::Interrupted);
        }
        debug!(
            target: LOG_TARGET,
            "{}Sharing graph for {}", self.config.log_prefix, outpoint
        );
        let seen = SeenSet::new();
        let root = {
            let _permit = self.acquire_permit().await?;
            self.storage.hydrate_gasp_node(&outpoint, &outpoint, true).await?
        };
        self.process_outgoing_node(root, &seen).await
    }

    /// Recursive outgoing walk. Submits the node and recurses into every input the peer asked
    /// for. Outgoing work is best-effort: a child branch that cannot be hydrated or submitted is
    /// logged and dropped without failing its siblings.
    fn process_outgoing_node<'a>(&'a self, node: GaspNode, seen: &'a SeenSet) -> BoxFuture<'a, Result<(), GaspSyncError>> {
        async move {
            let node_outpoint = node.node_outpoint()?;
            let node_id = node_outpoint.to_string();
            if !seen.insert(&node_id) {
                return Ok(());
            }

            let response = {
                let _permit = self.acquire_permit().await?;
                self.remote.submit_node(&node).await?
            };
            let requested = match response {
                Some(response) if !response.requested_inputs.is_empty() => response.requested_inputs,
                _ => return Ok(()),
            };
            if self.shutdown.is_triggered() {
                return Err(GaspSyncError::Interrupted);
            }

            let graph_id = node.graph_id;
            let mut branches = requested
                .into_iter()
                .map(|(outpoint_str, input)| async move {
                    let result: Result<(), GaspSyncError> = async {
                        let outpoint = outpoint_str.parse::<Outpoint>()?;
                        let child = {
                            let _permit = self.acquire_permit().await?;
                            self.storage.hydrate_gasp_node(&graph_id, &outpoint, input.metadata).await?
                        };
                        self.process_outgoing_node(child, seen).await
                    }
                    .await;
                    if let Err(err) = result {
                        warn!(
                            target: LOG_TARGET,
                            "{}Could not share node for input {}: {}", self.config.log_prefix, outpoint_str, err
                        );
                    }
                })
                .collect::<FuturesUnordered<_>>();
            while branches.next().await.is_some() {}
            Ok(())
        }
        .boxed()
    }

    async fn acquire_permit(&self) -> Result<SemaphorePermit<'_>, GaspSyncError> {
        // The semaphore lives as long as the synchronizer and is never closed.
        self.permits.acquire().await.map_err(|_| GaspSyncError::Interrupted)
    }
}
