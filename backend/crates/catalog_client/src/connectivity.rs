//! Connectivity Monitor
//!
//! A reachability flag fed by the platform's online/offline signals. While
//! it reads offline, fetches fail fast with [`FetchError::Offline`] instead
//! of waiting on network timeouts. Coming back online only re-enables
//! fetching; nothing is retried automatically.
//!
//! [`FetchError::Offline`]: crate::error::FetchError::Offline

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Record a connectivity signal. Returns `true` on a transition.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            if online {
                tracing::info!("Connection restored");
            } else {
                tracing::warn!("Connection lost, fetches will fail fast");
            }
        }
        changed
    }

    /// Watch transitions, e.g. to show or hide an offline banner
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Resolves once the flag reads online
    pub async fn wait_online(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|online| *online).await;
    }

    /// Resolves once the flag reads offline
    pub async fn wait_offline(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|online| !*online).await;
    }
}
