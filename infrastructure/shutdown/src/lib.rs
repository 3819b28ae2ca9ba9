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

//! A convenient shutdown signal.
//!
//! A [Shutdown] is the owning handle. Any number of [ShutdownSignal]s may be cloned from it and
//! handed to tasks; each signal is a `Future` that resolves once the handle is triggered or
//! dropped.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    task::{Context, Poll},
};

use futures::{
    channel::oneshot,
    future::{FutureExt, Shared},
};

/// The owning half of a shutdown signal. Dropping this triggers all associated signals.
#[derive(Debug)]
pub struct Shutdown {
    trigger: Option<oneshot::Sender<()>>,
    triggered: Arc<AtomicBool>,
    signal: ShutdownSignal,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        let triggered = Arc::new(AtomicBool::new(false));
        Self {
            trigger: Some(tx),
            triggered: triggered.clone(),
            signal: ShutdownSignal {
                triggered,
                inner: rx.shared(),
            },
        }
    }

    /// Trigger the shutdown. Safe to call more than once.
    pub fn trigger(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            self.triggered.store(true, Ordering::SeqCst);
            let _result = trigger.send(());
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn to_signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Shutdown {
    fn drop(&mut self) {
        self.trigger();
    }
}

/// A future that resolves once the matching [Shutdown] handle is triggered or dropped.
#[derive(Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    inner: Shared<oneshot::Receiver<()>>,
}

impl fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("is_triggered", &self.is_triggered())
            .finish()
    }
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // The sender is either used to trigger or dropped with the handle. Both resolve the
        // receiver, so the Canceled case counts as a shutdown.
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}
