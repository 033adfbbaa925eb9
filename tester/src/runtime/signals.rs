//! Cooperative interrupt handling for loop mode
//!
//! A signal only raises a flag. The loop checks it between iterations, so an
//! in-flight directory operation is never cut short.

use shared::{Component, component_error, component_warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the flag is raised
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}

/// Raise `flag` on Ctrl+C or, on unix, SIGTERM
pub fn spawn_listener(flag: InterruptFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        component_warn!(
            Component::Runner,
            "🛑 Received interrupt signal, stopping after current iteration..."
        );
        flag.raise();
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        component_error!(Component::Runner, "Ctrl+C handler failed: {e}");
                        std::future::pending::<()>().await;
                    }
                }
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            component_error!(Component::Runner, "SIGTERM handler failed: {e}");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        component_error!(Component::Runner, "Ctrl+C handler failed: {e}");
        std::future::pending::<()>().await;
    }
}
