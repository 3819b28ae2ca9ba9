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

use serde::{Deserialize, Serialize};

/// The protocol version spoken by this build. Peers must agree on the version before any graph
/// work starts.
pub const GASP_PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaspConfig {
    /// Protocol version advertised in the initial request and enforced when answering one.
    pub version: u32,
    /// Timestamp of the last successful sync with this peer. Sent as `since` so the peer only
    /// reports UTXOs that are new enough.
    pub last_interaction: u32,
    /// When true, skip the outgoing half of the pass entirely: no initial reply is requested and
    /// no nodes are submitted.
    pub unidirectional: bool,
    /// Maximum number of in-flight remote and storage operations. Values of 1 or less serialise
    /// all I/O.
    pub concurrency: usize,
    /// Prefix prepended to every log line emitted by the engine.
    pub log_prefix: String,
}

impl Default for GaspConfig {
    fn default() -> Self {
        Self {
            version: GASP_PROTOCOL_VERSION,
            last_interaction: 0,
            unidirectional: false,
            concurrency: 1,
            log_prefix: "[GASP] ".to_string(),
        }
    }
}
