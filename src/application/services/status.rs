use crate::application::ports::queue_store::QueueStore;
use crate::domain::entities::QueueCounts;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::watch;

/// Publishes queue counts to the rendering shell ("N pending sync").
/// Capture and sync both refresh it after mutating the queue.
pub struct QueueStatusChannel {
    queue: Arc<dyn QueueStore>,
    tx: watch::Sender<QueueCounts>,
}

impl QueueStatusChannel {
    pub fn new(queue: Arc<dyn QueueStore>) -> Self {
        let (tx, _rx) = watch::channel(QueueCounts::default());
        Self { queue, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueCounts> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> QueueCounts {
        *self.tx.borrow()
    }

    pub async fn refresh(&self) -> Result<QueueCounts, AppError> {
        let counts = self.queue.counts().await?;
        self.tx.send_replace(counts);
        Ok(counts)
    }
}
