//! Background refresh worker
//!
//! One dedicated thread per active refresher, woken either by the
//! interval elapsing (run a reload) or by the stop signal (exit
//! immediately, without waiting out the interval). The worker holds only
//! a weak reference to the client internals, so a dropped client ends
//! the worker on its next wakeup even if `stop` was never called.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Weak;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::client::ClientInner;
use crate::{Error, Result};

pub(crate) struct Refresher {
    stop_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Refresher {
    /// Spawn the worker thread ticking every `interval`.
    pub(crate) fn start(inner: Weak<ClientInner>, interval: Duration) -> Result<Refresher> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = std::thread::Builder::new()
            .name("cfgrd-refresh".to_string())
            .spawn(move || run(inner, interval, stop_rx))
            .map_err(|e| Error::Refresh {
                message: e.to_string(),
            })?;

        tracing::debug!(interval_secs = interval.as_secs_f64(), "refresh worker started");
        Ok(Refresher {
            stop_tx,
            handle: Some(handle),
        })
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        // Wake the worker; if it already exited the send just fails.
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::debug!("refresh worker stopped");
    }
}

fn run(inner: Weak<ClientInner>, interval: Duration, stop_rx: mpsc::Receiver<()>) {
    loop {
        match stop_rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("refresh worker received stop signal, exiting");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                let Some(inner) = inner.upgrade() else {
                    tracing::debug!("client dropped, refresh worker exiting");
                    break;
                };
                // Tick failures are logged and swallowed; the previously
                // published snapshot stays in place.
                if let Err(e) = inner.reload() {
                    tracing::error!(error = %e, "refresh failed, retaining previous snapshot");
                }
            }
        }
    }
}
