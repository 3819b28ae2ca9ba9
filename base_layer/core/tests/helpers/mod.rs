// Copyright 2024 The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! Utilities for exercising a full sync pass in-process: an in-memory storage with call
//! recording, and a remote port wired straight into a foreign node's service.

#![allow(dead_code)]

use std::{
    any::Any,
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
        Mutex as StdMutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use gasp_common_types::{Outpoint, Txid};
use gasp_core::{
    graph::GaspNode,
    messages::{InitialReply, InitialRequest, InitialResponse, NodeResponse, RequestedInput},
    remote::{GaspRemote, RemoteError},
    service::GaspService,
    storage::{GaspStorage, StorageError},
    sync::{GaspSynchronizer, GaspSyncError},
    transactions,
    GaspConfig,
};
use gasp_shutdown::Shutdown;
use tokio::sync::{Mutex, RwLock};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---------------------------------- sample data ----------------------------------

/// A minimal structurally valid transaction, unique per seed.
pub fn sample_raw_tx(seed: u64) -> Vec<u8> {
    let mut tx = Vec::new();
    tx.extend_from_slice(&1u32.to_le_bytes()); // version
    tx.push(1); // input count
    tx.extend_from_slice(&[0u8; 32]); // previous txid
    tx.extend_from_slice(&u32::MAX.to_le_bytes()); // previous index
    tx.push(8); // unlocking script length
    tx.extend_from_slice(&seed.to_le_bytes());
    tx.extend_from_slice(&u32::MAX.to_le_bytes()); // sequence
    tx.push(1); // output count
    tx.extend_from_slice(&50_000u64.to_le_bytes()); // value
    tx.push(0); // locking script length
    tx.extend_from_slice(&0u32.to_le_bytes()); // lock time
    tx
}

pub fn sample_outpoint(seed: u64) -> Outpoint {
    Outpoint::new(transactions::txid(&sample_raw_tx(seed)).unwrap(), 0)
}

pub fn sample_node(seed: u64) -> GaspNode {
    let raw_tx = sample_raw_tx(seed);
    let outpoint = Outpoint::new(transactions::txid(&raw_tx).unwrap(), 0);
    GaspNode::new(outpoint, raw_tx, 0)
}

/// Register a UTXO (with its node) as known by the given storage. Returns its outpoint.
pub async fn seed_utxo(storage: &MemoryStorage, seed: u64, timestamp: u32) -> Outpoint {
    let node = sample_node(seed);
    let outpoint = node.graph_id;
    storage.insert_utxo(outpoint, timestamp).await;
    storage.insert_node(node).await;
    outpoint
}

/// Register only the node, making it hydratable without being a known UTXO.
pub async fn seed_node(storage: &MemoryStorage, seed: u64) -> Outpoint {
    let node = sample_node(seed);
    let outpoint = node.graph_id;
    storage.insert_node(node).await;
    outpoint
}

/// Build a `find_needed_inputs` map from (outpoint, metadata) pairs.
pub fn inputs(entries: &[(Outpoint, bool)]) -> Option<HashMap<String, RequestedInput>> {
    Some(
        entries
            .iter()
            .map(|(outpoint, metadata)| (outpoint.to_string(), RequestedInput { metadata: *metadata }))
            .collect(),
    )
}

pub fn empty_inputs() -> Option<HashMap<String, RequestedInput>> {
    Some(HashMap::new())
}

// ---------------------------------- storage mock ----------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphStatus {
    Staging,
    Final,
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct GraphRecord {
    pub status: Option<GraphStatus>,
    pub appended: Vec<(String, Option<Txid>)>,
}

/// In-memory [GaspStorage] with call recording, so tests can assert exactly which operations a
/// sync pass performed.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    utxos: Arc<Mutex<HashMap<Outpoint, u32>>>,
    nodes: Arc<Mutex<HashMap<String, GaspNode>>>,
    needed_inputs: Arc<Mutex<HashMap<String, Option<HashMap<String, RequestedInput>>>>>,
    graphs: Arc<Mutex<HashMap<Outpoint, GraphRecord>>>,
    failing_anchors: Arc<Mutex<HashSet<Outpoint>>>,
    failing_finalize: Arc<Mutex<HashSet<Outpoint>>>,
    calls: Arc<RwLock<HashMap<String, VecDeque<Box<dyn Any + Send + Sync>>>>>,
}

impl MemoryStorage {
    pub async fn insert_utxo(&self, outpoint: Outpoint, timestamp: u32) {
        self.utxos.lock().await.insert(outpoint, timestamp);
    }

    pub async fn insert_node(&self, node: GaspNode) {
        let node_id = node.node_outpoint().unwrap().to_string();
        self.nodes.lock().await.insert(node_id, node);
    }

    pub async fn set_needed_inputs(&self, node_id: &str, response: Option<HashMap<String, RequestedInput>>) {
        self.needed_inputs.lock().await.insert(node_id.to_string(), response);
    }

    pub async fn fail_anchor(&self, outpoint: Outpoint) {
        self.failing_anchors.lock().await.insert(outpoint);
    }

    pub async fn fail_finalize(&self, outpoint: Outpoint) {
        self.failing_finalize.lock().await.insert(outpoint);
    }

    pub async fn graph_status(&self, outpoint: &Outpoint) -> Option<GraphStatus> {
        self.graphs.lock().await.get(outpoint).and_then(|record| record.status)
    }

    pub async fn appended_nodes(&self, outpoint: &Outpoint) -> Vec<(String, Option<Txid>)> {
        self.graphs
            .lock()
            .await
            .get(outpoint)
            .map(|record| record.appended.clone())
            .unwrap_or_default()
    }

    pub async fn known_utxos(&self) -> HashSet<Outpoint> {
        self.utxos.lock().await.keys().copied().collect()
    }

    async fn add_call<T: Any + Send + Sync>(&self, name: &str, params: T) {
        let mut lock = self.calls.write().await;
        lock.entry(name.to_string()).or_default().push_back(Box::new(params));
    }

    pub async fn get_call_count(&self, name: &str) -> usize {
        self.calls.read().await.get(name).map(|calls| calls.len()).unwrap_or(0)
    }

    pub async fn pop_front_call<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.calls
            .write()
            .await
            .get_mut(name)
            .and_then(|calls| calls.pop_front())
            .map(|params| params.downcast_ref::<T>().unwrap().clone())
    }

    pub async fn total_calls(&self) -> usize {
        self.calls.read().await.values().map(|calls| calls.len()).sum()
    }
}

#[async_trait]
impl GaspStorage for MemoryStorage {
    async fn find_known_utxos(&self, since: u32) -> Result<Vec<Outpoint>, StorageError> {
        self.add_call("find_known_utxos", since).await;
        Ok(self
            .utxos
            .lock()
            .await
            .iter()
            .filter(|(_, timestamp)| **timestamp >= since)
            .map(|(outpoint, _)| *outpoint)
            .collect())
    }

    async fn hydrate_gasp_node(
        &self,
        graph_id: &Outpoint,
        outpoint: &Outpoint,
        metadata: bool,
    ) -> Result<GaspNode, StorageError> {
        self.add_call("hydrate_gasp_node", (*graph_id, *outpoint, metadata)).await;
        let mut node = self
            .nodes
            .lock()
            .await
            .get(&outpoint.to_string())
            .cloned()
            .ok_or_else(|| StorageError::ValueNotFound {
                entity: "GASP node",
                field: "outpoint",
                value: outpoint.to_string(),
            })?;
        node.graph_id = *graph_id;
        Ok(node)
    }

    async fn find_needed_inputs(
        &self,
        node: &GaspNode,
    ) -> Result<Option<HashMap<String, RequestedInput>>, StorageError> {
        let node_id = node.node_outpoint().unwrap().to_string();
        self.add_call("find_needed_inputs", node_id.clone()).await;
        Ok(self.needed_inputs.lock().await.get(&node_id).cloned().flatten())
    }

    async fn append_to_graph(&self, node: &GaspNode, spent_by: Option<&Txid>) -> Result<(), StorageError> {
        let node_id = node.node_outpoint().unwrap().to_string();
        self.add_call("append_to_graph", (node.graph_id, node_id.clone(), spent_by.copied()))
            .await;
        let mut graphs = self.graphs.lock().await;
        let record = graphs.entry(node.graph_id).or_default();
        record.status.get_or_insert(GraphStatus::Staging);
        record.appended.push((node_id, spent_by.copied()));
        Ok(())
    }

    async fn validate_graph_anchor(&self, graph_id: &Outpoint) -> Result<(), StorageError> {
        self.add_call("validate_graph_anchor", *graph_id).await;
        if self.failing_anchors.lock().await.contains(graph_id) {
            return Err(StorageError::GraphNotAnchored(*graph_id));
        }
        Ok(())
    }

    async fn discard_graph(&self, graph_id: &Outpoint) -> Result<(), StorageError> {
        self.add_call("discard_graph", *graph_id).await;
        self.graphs.lock().await.entry(*graph_id).or_default().status = Some(GraphStatus::Discarded);
        Ok(())
    }

    async fn finalize_graph(&self, graph_id: &Outpoint) -> Result<(), StorageError> {
        self.add_call("finalize_graph", *graph_id).await;
        if self.failing_finalize.lock().await.contains(graph_id) {
            return Err(StorageError::BackendError("finalize failed".to_string()));
        }
        self.graphs.lock().await.entry(*graph_id).or_default().status = Some(GraphStatus::Final);
        self.utxos.lock().await.insert(*graph_id, 1);
        Ok(())
    }
}

// ---------------------------------- remote glue ----------------------------------

/// A [GaspRemote] that calls straight into a foreign node's [GaspService], with instrumentation
/// for latency injection, failure injection and in-flight accounting.
pub struct DirectRemote {
    service: GaspService<MemoryStorage>,
    latency: StdMutex<Option<Duration>>,
    reply_override: StdMutex<Option<InitialReply>>,
    fail_handshake: AtomicBool,
    fail_submit: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    initial_response_calls: AtomicUsize,
    initial_reply_calls: AtomicUsize,
    request_node_calls: AtomicUsize,
    submit_node_calls: AtomicUsize,
}

impl DirectRemote {
    pub fn new(service: GaspService<MemoryStorage>) -> Self {
        Self {
            service,
            latency: StdMutex::new(None),
            reply_override: StdMutex::new(None),
            fail_handshake: AtomicBool::new(false),
            fail_submit: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            initial_response_calls: AtomicUsize::new(0),
            initial_reply_calls: AtomicUsize::new(0),
            request_node_calls: AtomicUsize::new(0),
            submit_node_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn set_reply(&self, reply: InitialReply) {
        *self.reply_override.lock().unwrap() = Some(reply);
    }

    pub fn fail_handshake(&self) {
        self.fail_handshake.store(true, Ordering::SeqCst);
    }

    pub fn fail_submit(&self) {
        self.fail_submit.store(true, Ordering::SeqCst);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn initial_response_calls(&self) -> usize {
        self.initial_response_calls.load(Ordering::SeqCst)
    }

    pub fn initial_reply_calls(&self) -> usize {
        self.initial_reply_calls.load(Ordering::SeqCst)
    }

    pub fn request_node_calls(&self) -> usize {
        self.request_node_calls.load(Ordering::SeqCst)
    }

    pub fn submit_node_calls(&self) -> usize {
        self.submit_node_calls.load(Ordering::SeqCst)
    }

    async fn tracked<F, T>(&self, fut: F) -> T
    where F: std::future::Future<Output = T> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let result = fut.await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// The wire carries errors from the responder's perspective; the transport re-expresses a version
// mismatch from the local peer's point of view and flattens everything else.
fn as_remote_error(err: GaspSyncError) -> RemoteError {
    match err {
        GaspSyncError::RemoteError(RemoteError::VersionMismatch {
            current_version,
            foreign_version,
        }) => RemoteError::VersionMismatch {
            current_version: foreign_version,
            foreign_version: current_version,
        },
        GaspSyncError::RemoteError(err) => err,
        GaspSyncError::StorageError(err) => RemoteError::RemoteStorage(err.to_string()),
        other => RemoteError::InvalidResponse(other.to_string()),
    }
}

#[async_trait]
impl GaspRemote for DirectRemote {
    async fn get_initial_response(&self, request: InitialRequest) -> Result<InitialResponse, RemoteError> {
        self.initial_response_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_handshake.load(Ordering::SeqCst) {
            return Err(RemoteError::Connection("connection refused".to_string()));
        }
        self.service.get_initial_response(request).await.map_err(as_remote_error)
    }

    async fn get_initial_reply(&self, response: InitialResponse) -> Result<InitialReply, RemoteError> {
        self.initial_reply_calls.fetch_add(1, Ordering::SeqCst);
        let reply_override = self.reply_override.lock().unwrap().clone();
        if let Some(reply) = reply_override {
            return Ok(reply);
        }
        self.service.get_initial_reply(response).await.map_err(as_remote_error)
    }

    async fn request_node(
        &self,
        graph_id: &Outpoint,
        outpoint: &Outpoint,
        metadata: bool,
    ) -> Result<GaspNode, RemoteError> {
        self.request_node_calls.fetch_add(1, Ordering::SeqCst);
        self.tracked(self.service.request_node(graph_id, outpoint, metadata))
            .await
            .map_err(as_remote_error)
    }

    async fn submit_node(&self, node: &GaspNode) -> Result<Option<NodeResponse>, RemoteError> {
        self.submit_node_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(RemoteError::Connection("connection reset".to_string()));
        }
        self.tracked(self.service.submit_node(node.clone()))
            .await
            .map_err(as_remote_error)
    }
}

// ---------------------------------- node pair ----------------------------------

pub struct TestPeers {
    pub synchronizer: GaspSynchronizer<MemoryStorage, DirectRemote>,
    pub local_storage: Arc<MemoryStorage>,
    pub remote_storage: Arc<MemoryStorage>,
    pub remote: Arc<DirectRemote>,
    pub shutdown: Shutdown,
}

/// A local synchronizer wired straight into a foreign node's service, as two peers would be over
/// a transport.
pub fn setup_peers(local_config: GaspConfig, remote_config: GaspConfig) -> TestPeers {
    init_logging();
    let local_storage = Arc::new(MemoryStorage::default());
    let remote_storage = Arc::new(MemoryStorage::default());
    let remote = Arc::new(DirectRemote::new(GaspService::new(remote_config, remote_storage.clone())));
    let shutdown = Shutdown::new();
    let synchronizer = GaspSynchronizer::new(
        local_config,
        local_storage.clone(),
        remote.clone(),
        shutdown.to_signal(),
    );
    TestPeers {
        synchronizer,
        local_storage,
        remote_storage,
        remote,
        shutdown,
    }
}

pub fn setup_default_peers() -> TestPeers {
    setup_peers(GaspConfig::default(), GaspConfig::default())
}
