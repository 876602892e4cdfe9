//! Spawning a worker and talking to it.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{RefreshPolicy, WorkerConfig};
use crate::engine::QueryEngine;
use crate::index::Searchable;
use crate::loader::{Loader, Refresh, Refreshed, Settled};
use crate::protocol::{Handler, Reply, Request, WorkerMessage};
use crate::remote::DatasetSource;
use crate::store::KeyValueStore;

use super::corpus::Corpus;

/// Errors seen by the host side of a worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The worker stopped and its channels are closed
    #[error("worker has stopped")]
    Closed,

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode worker message: {0}")]
    Decode(#[source] serde_json::Error),

    /// The first message was not `ready`
    #[error("expected ready message, got {0}")]
    NotReady(String),

    #[error("worker task failed: {0}")]
    Join(#[from] JoinError),
}

/// Host-side end of a running worker.
///
/// Requests and replies cross the boundary as JSON text. Dropping the
/// handle stops the worker after its current request.
#[derive(Debug)]
pub struct WorkerHandle<T> {
    requests: mpsc::Sender<String>,
    messages: mpsc::Receiver<String>,
    task: JoinHandle<()>,
    _record: PhantomData<fn() -> T>,
}

/// Start a worker for corpus `C`.
///
/// The worker loads its data, builds its index, sends `ready`, then
/// answers requests one at a time in arrival order.
pub fn spawn<C, S, F>(loader: Loader<S, F>, config: &WorkerConfig) -> WorkerHandle<C::Record>
where
    C: Corpus,
    S: KeyValueStore,
    F: DatasetSource,
{
    let capacity = config.channel_capacity.max(1);
    let (request_tx, request_rx) = mpsc::channel(capacity);
    let (message_tx, message_rx) = mpsc::channel(capacity);

    let span = info_span!("worker", kind = C::KIND);
    let task = tokio::spawn(
        run::<C, S, F>(loader, config.clone(), request_rx, message_tx).instrument(span),
    );

    WorkerHandle {
        requests: request_tx,
        messages: message_rx,
        task,
        _record: PhantomData,
    }
}

async fn run<C, S, F>(
    loader: Loader<S, F>,
    config: WorkerConfig,
    mut requests: mpsc::Receiver<String>,
    messages: mpsc::Sender<String>,
) where
    C: Corpus,
    S: KeyValueStore,
    F: DatasetSource,
{
    let Settled {
        value,
        provenance,
        refresh,
    } = C::load(&loader).await;

    let engine = QueryEngine::new(
        value,
        provenance,
        Default::default(),
        config.matching.clone(),
    );
    let mut handler = Handler::new(engine, config.max_page_size);
    info!(records = handler.engine().len(), ?provenance, "worker ready");

    let mut pending = refresh;
    if send::<C::Record>(&messages, WorkerMessage::Ready).await.is_ok() {
        while let Some(raw) = requests.recv().await {
            if config.refresh_policy == RefreshPolicy::Adopt {
                adopt_finished(&mut pending, &mut handler).await;
            }

            let reply = handler.handle(&raw);
            if send(&messages, reply).await.is_err() {
                break;
            }
        }
    }

    // The refresh writes the new generation to the cache; let it land.
    if let Some(refresh) = pending {
        debug!("waiting for background refresh");
        if timeout(config.shutdown_grace, refresh.wait()).await.is_err() {
            warn!(
                grace_secs = config.shutdown_grace.as_secs_f64(),
                "background refresh still running at shutdown, abandoning it"
            );
        }
    }
    debug!("worker stopped");
}

/// Swap in a finished refresh. Called only between requests.
async fn adopt_finished<T>(pending: &mut Option<Refresh<Vec<T>>>, handler: &mut Handler<T>)
where
    T: Searchable + Clone + Serialize,
{
    if !pending.as_ref().is_some_and(Refresh::is_finished) {
        return;
    }
    let Some(refresh) = pending.take() else {
        return;
    };

    match refresh.wait().await {
        Some(Refreshed { value, provenance }) => {
            info!(records = value.len(), ?provenance, "adopting refreshed generation");
            handler.adopt(value, provenance);
        }
        None => debug!("background refresh produced nothing, keeping cached generation"),
    }
}

/// Encode `message` and send it to the host.
async fn send<T>(messages: &mpsc::Sender<String>, message: Reply<T>) -> Result<(), WorkerError>
where
    T: Searchable + Serialize,
{
    let text = encode(&message)?;
    messages.send(text).await.map_err(|_| WorkerError::Closed)
}

fn encode<T>(message: &Reply<T>) -> Result<String, WorkerError>
where
    T: Searchable + Serialize,
{
    serde_json::to_string(message).map_err(|e| {
        error!(error = %e, "failed to encode reply");
        WorkerError::Encode(e)
    })
}

impl<T> WorkerHandle<T> {
    /// Send a raw JSON request.
    pub async fn send_raw(&self, raw: impl Into<String>) -> Result<(), WorkerError> {
        self.requests
            .send(raw.into())
            .await
            .map_err(|_| WorkerError::Closed)
    }

    /// Next raw message, or `None` once the worker has stopped.
    pub async fn recv_raw(&mut self) -> Option<String> {
        self.messages.recv().await
    }

    /// Stop the worker and wait for it.
    ///
    /// A background refresh still in flight gets up to the configured
    /// shutdown grace period to finish writing to the cache; after that it
    /// is abandoned.
    pub async fn shutdown(self) -> Result<(), WorkerError> {
        let WorkerHandle {
            requests,
            messages,
            task,
            ..
        } = self;
        drop(requests);
        drop(messages);
        task.await?;
        Ok(())
    }
}

impl<T> WorkerHandle<T>
where
    T: Searchable + Serialize + DeserializeOwned + fmt::Debug,
    T::Summary: DeserializeOwned,
{
    /// Encode and send a request.
    pub async fn send(&self, request: &Request<T::Selection>) -> Result<(), WorkerError> {
        let raw = serde_json::to_string(request).map_err(WorkerError::Encode)?;
        self.send_raw(raw).await
    }

    /// Next decoded message.
    pub async fn recv(&mut self) -> Result<Reply<T>, WorkerError> {
        let raw = self.recv_raw().await.ok_or(WorkerError::Closed)?;
        serde_json::from_str(&raw).map_err(WorkerError::Decode)
    }

    /// Wait for the worker's `ready` message.
    pub async fn ready(&mut self) -> Result<(), WorkerError> {
        match self.recv().await? {
            WorkerMessage::Ready => Ok(()),
            other => Err(WorkerError::NotReady(format!("{other:?}"))),
        }
    }

    /// Send a request and wait for its reply.
    pub async fn request(
        &mut self,
        request: &Request<T::Selection>,
    ) -> Result<Reply<T>, WorkerError> {
        self.send(request).await?;
        self.recv().await
    }
}
