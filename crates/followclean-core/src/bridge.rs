//! Backend task owning the page: accepts scan and execute requests from any
//! front end and streams [`CoreEvent`]s back.
//!
//! At most one job (a scan or an unfollow run) touches the page at a time.
//! Requests arriving while a job is active are dropped, not queued.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::executor::UnfollowExecutor;
use crate::page::HostPage;
use crate::scanner::AccountScanner;
use crate::{Account, Config, CoreEvent};

/// Immediate reply to a scan request, independent of when the scan ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanAck {
    pub started: bool,
}

enum Request {
    StartScan(oneshot::Sender<ScanAck>),
    Execute(Vec<Account>),
    Cancel,
}

/// Cloneable sender side of the bridge.
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl BridgeHandle {
    /// Ask for a scan. The receiver resolves as soon as the backend has
    /// decided whether to start one.
    pub fn start_scan(&self) -> oneshot::Receiver<ScanAck> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Request::StartScan(ack_tx)).is_err() {
            warn!("bridge closed, scan request dropped");
        }
        ack_rx
    }

    /// Start an unfollow run over `accounts`, in order.
    pub fn execute(&self, accounts: Vec<Account>) {
        if self.tx.send(Request::Execute(accounts)).is_err() {
            warn!("bridge closed, execute request dropped");
        }
    }

    /// Cancel the active run. Takes effect before the next account.
    pub fn cancel(&self) {
        let _ = self.tx.send(Request::Cancel);
    }
}

/// Start the backend task. Must be called from within a tokio runtime.
///
/// The task runs until every [`BridgeHandle`] clone is dropped.
pub fn spawn<P>(page: Arc<P>, config: Config) -> (BridgeHandle, mpsc::UnboundedReceiver<CoreEvent>)
where
    P: HostPage + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(backend(page, config, rx, event_tx));
    (BridgeHandle { tx }, event_rx)
}

async fn backend<P>(
    page: Arc<P>,
    config: Config,
    mut requests: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedSender<CoreEvent>,
) where
    P: HostPage + 'static,
{
    let scanner = Arc::new(AccountScanner::new(page.clone(), config.scan));
    let executor = Arc::new(UnfollowExecutor::new(page, config.execute));
    let mut active: Option<JoinHandle<()>> = None;
    let mut cancel = CancellationToken::new();

    while let Some(request) = requests.recv().await {
        let busy = active.as_ref().is_some_and(|job| !job.is_finished());
        match request {
            Request::StartScan(ack) => {
                let _ = ack.send(ScanAck { started: !busy });
                if busy {
                    debug!("scan requested while busy, ignoring");
                    continue;
                }
                let scanner = scanner.clone();
                let events = events.clone();
                active = Some(tokio::spawn(async move {
                    let progress_events = events.clone();
                    let result = scanner
                        .scan(move |count| {
                            let _ = progress_events.send(CoreEvent::ScanProgress { count });
                        })
                        .await;
                    if let Some(accounts) = result {
                        let _ = events.send(CoreEvent::ScanComplete { accounts });
                    }
                }));
            }
            Request::Execute(accounts) => {
                if busy {
                    warn!(count = accounts.len(), "execute requested while busy, ignoring");
                    continue;
                }
                info!(count = accounts.len(), "starting unfollow run");
                cancel = CancellationToken::new();
                let token = cancel.clone();
                let executor = executor.clone();
                let events = events.clone();
                active = Some(tokio::spawn(async move {
                    executor
                        .run(&accounts, &token, move |event| {
                            let _ = events.send(event);
                        })
                        .await;
                }));
            }
            Request::Cancel => {
                debug!("cancel requested");
                cancel.cancel();
            }
        }
    }
    debug!("bridge closed");
}
