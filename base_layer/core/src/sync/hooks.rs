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

use gasp_common_types::Outpoint;

#[derive(Default)]
pub(super) struct Hooks {
    on_graph_complete: Vec<Box<dyn Fn(&Outpoint) + Send + Sync>>,
    on_graph_discard: Vec<Box<dyn Fn(&Outpoint) + Send + Sync>>,
}

impl Hooks {
    pub fn add_on_graph_complete_hook<H>(&mut self, hook: H)
    where H: Fn(&Outpoint) + Send + Sync + 'static {
        self.on_graph_complete.push(Box::new(hook));
    }

    pub fn call_on_graph_complete_hooks(&self, graph_id: &Outpoint) {
        self.on_graph_complete.iter().for_each(|f| (*f)(graph_id));
    }

    pub fn add_on_graph_discard_hook<H>(&mut self, hook: H)
    where H: Fn(&Outpoint) + Send + Sync + 'static {
        self.on_graph_discard.push(Box::new(hook));
    }

    pub fn call_on_graph_discard_hooks(&self, graph_id: &Outpoint) {
        self.on_graph_discard.iter().for_each(|f| (*f)(graph_id));
    }
}
