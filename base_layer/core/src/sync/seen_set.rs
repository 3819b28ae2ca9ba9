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

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// The set of node identities already processed within one graph walk.
///
/// Concurrent branches race to insert the same identity; exactly one wins and performs the work,
/// the rest observe the key and return. Terminates walks on cycles and shared ancestors. One
/// instance per top-level walk; operations never suspend.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Atomically check-and-insert. Returns true if the identity was not seen before.
    pub fn insert(&self, node_id: &str) -> bool {
        self.inner
            .lock()
            .expect("seen set lock poisoned")
            .insert(node_id.to_string())
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.inner.lock().expect("seen set lock poisoned").contains(node_id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("seen set lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_inserts_each_identity_once() {
        let seen = SeenSet::new();
        assert!(seen.insert("a.0"));
        assert!(!seen.insert("a.0"));
        assert!(seen.insert("a.1"));
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("a.0"));
        assert!(!seen.contains("b.0"));
    }

    #[test]
    fn clones_share_the_same_set() {
        let seen = SeenSet::new();
        let clone = seen.clone();
        assert!(seen.insert("a.0"));
        assert!(!clone.insert("a.0"));
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn concurrent_inserts_admit_exactly_one_winner() {
        let seen = SeenSet::new();
        let winners = (0..8)
            .map(|_| {
                let seen = seen.clone();
                std::thread::spawn(move || seen.insert("contested.0"))
            })
            .filter_map(|handle| handle.join().ok())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(seen.len(), 1);
    }
}
