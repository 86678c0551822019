use chrono::{Duration, Utc};
use redis::AsyncCommands;
use redis::Client;
use tokio::sync::mpsc;

use crate::db::RecommendationStore;
use crate::error::AppError;
use crate::error::AppResult;
use crate::models::{CacheEntry, RecommendationQuery, RecommendationSnapshot};

/// Creates a Redis client for caching
///
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl_secs: i64,
}

/// Recommendation snapshots stored as one Redis list per query key
///
/// New entries are pushed at the head, so the newest write is always at index 0.
#[derive(Clone)]
pub struct RedisRecommendationStore {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
    ttl: Duration,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Sends a shutdown signal; the writer flushes pending entries before exiting.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl RedisRecommendationStore {
    /// Creates the store and spawns its background writer task
    pub fn new(redis_client: Client, ttl: Duration) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let store = Self {
            redis_client,
            write_tx,
            ttl,
        };

        (store, CacheWriterHandle { shutdown_tx })
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    let key = msg.key.clone();
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, key = %key, "Failed to write recommendation snapshot");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache writer shutting down, flushing remaining writes");

                    // Senders live on in cloned stores, so drain only what is queued now
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Pushes one entry and refreshes the list expiry
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .lpush(&msg.key, msg.value)
            .ignore()
            .expire(&msg.key, msg.ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecommendationStore for RedisRecommendationStore {
    async fn get(&self, query: &RecommendationQuery) -> AppResult<Option<RecommendationSnapshot>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let newest: Option<String> = conn.lindex(query.to_string(), 0).await?;

        let Some(json) = newest else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&json)
            .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))?;

        if entry.query != *query || !entry.is_fresh(Utc::now(), self.ttl) {
            tracing::debug!(key = %query, "Newest cached snapshot is stale");
            return Ok(None);
        }

        Ok(Some(entry.snapshot))
    }

    /// Queues the write and returns immediately
    async fn put(
        &self,
        query: &RecommendationQuery,
        snapshot: &RecommendationSnapshot,
    ) -> AppResult<()> {
        let entry = CacheEntry::new(*query, snapshot.clone(), Utc::now());
        let value = serde_json::to_string(&entry)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let msg = CacheWriteMessage {
            key: query.to_string(),
            value,
            ttl_secs: self.ttl.num_seconds(),
        };

        self.write_tx
            .send(msg)
            .map_err(|e| AppError::Internal(format!("Cache writer unavailable: {}", e)))
    }
}
