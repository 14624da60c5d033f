// Write buffer - Owned channel plus a background batching task
use crate::application::data_api::DataApi;
use crate::domain::connection::WriteOptions;
use crate::domain::error::{RemoteError, ServiceError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

enum WriteCommand {
    Line(String),
    Close(oneshot::Sender<Result<(), RemoteError>>),
}

/// Collects encoded lines and transmits them in batches to one org/bucket.
pub struct WriteBuffer {
    tx: mpsc::UnboundedSender<WriteCommand>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WriteBuffer {
    /// Spawn the flush task. Must be called from within a tokio runtime.
    pub fn spawn(
        api: Arc<dyn DataApi>,
        org: String,
        bucket: String,
        options: WriteOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(flush_loop(api, org, bucket, options, rx));
        Self {
            tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Queue one line for transmission
    pub fn enqueue(&self, line: String) -> Result<(), ServiceError> {
        self.tx
            .send(WriteCommand::Line(line))
            .map_err(|_| ServiceError::WriteChannelClosed)
    }

    /// Flush everything still buffered, stop the task and wait for it.
    /// Returns the result of the final flush.
    pub async fn close(&self) -> Result<(), ServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Close(reply_tx))
            .map_err(|_| ServiceError::WriteChannelClosed)?;

        let flushed = reply_rx.await.map_err(|_| ServiceError::WriteChannelClosed)?;

        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Write buffer task ended abnormally: {}", e);
            }
        }

        flushed.map_err(ServiceError::from)
    }
}

impl Drop for WriteBuffer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            if !handle.is_finished() {
                tracing::warn!("Write buffer dropped without close, buffered points are discarded");
                handle.abort();
            }
        }
    }
}

async fn flush_loop(
    api: Arc<dyn DataApi>,
    org: String,
    bucket: String,
    options: WriteOptions,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    let batch_size = options.batch_size.max(1);
    let mut pending: Vec<String> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(options.flush_interval.max(MIN_FLUSH_INTERVAL));
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(WriteCommand::Line(line)) => {
                    pending.push(line);
                    if pending.len() >= batch_size {
                        log_failure(flush(api.as_ref(), &org, &bucket, &mut pending).await);
                    }
                }
                Some(WriteCommand::Close(reply)) => {
                    drain_after_close(&mut rx, &mut pending);
                    let result = flush(api.as_ref(), &org, &bucket, &mut pending).await;
                    let _ = reply.send(result);
                    break;
                }
                None => {
                    log_failure(flush(api.as_ref(), &org, &bucket, &mut pending).await);
                    break;
                }
            },
            _ = ticker.tick() => {
                log_failure(flush(api.as_ref(), &org, &bucket, &mut pending).await);
            }
        }
    }

    tracing::debug!("Write buffer for {}/{} closed", org, bucket);
}

/// Stop accepting commands and move lines already queued behind the close
/// into the final batch. Extra close requests are dropped, so their callers
/// see a closed channel.
fn drain_after_close(rx: &mut mpsc::UnboundedReceiver<WriteCommand>, pending: &mut Vec<String>) {
    rx.close();
    let mut late_lines = 0;
    while let Ok(command) = rx.try_recv() {
        if let WriteCommand::Line(line) = command {
            pending.push(line);
            late_lines += 1;
        }
    }
    if late_lines > 0 {
        tracing::debug!("Included {} points queued behind close in the final flush", late_lines);
    }
}

/// Send the pending batch; a failed batch is dropped, not retried
async fn flush(
    api: &dyn DataApi,
    org: &str,
    bucket: &str,
    pending: &mut Vec<String>,
) -> Result<(), RemoteError> {
    if pending.is_empty() {
        return Ok(());
    }

    let body = pending.join("\n");
    let count = pending.len();
    pending.clear();

    tracing::debug!("Flushing {} points to {}/{}", count, org, bucket);
    api.write_lines(org, bucket, &body).await
}

fn log_failure(result: Result<(), RemoteError>) {
    if let Err(e) = result {
        tracing::error!("Error writing points: {}", e);
    }
}
