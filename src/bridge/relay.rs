//! Relay engine: fan-out delivery with reply threading and chunking.
//!
//! Given a normalized payload and the destination set of one bridge, the
//! engine delivers to every destination concurrently. Destinations are
//! fully independent: one failing send never cancels or delays its
//! siblings, and outcomes are reported only after all deliveries finish.
//!
//! Within a single destination, chunk sends are strictly sequential. Only
//! the first chunk carries the reply reference; every successfully sent
//! chunk is recorded in the correlation store before the next send starts,
//! so an aborted delivery leaves a consistent prefix behind.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::bridge::chunk::split_text;
use crate::bridge::store::CorrelationStore;
use crate::common::error::{AdapterError, RelayError};
use crate::common::types::Platform;

/// Outbound seam to one chat platform.
///
/// Implementations own the platform client and any handle caching; the
/// engine only asks for the message length limit and a send primitive.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The platform this adapter sends to.
    fn platform(&self) -> Platform;

    /// Maximum length of a single message on this platform.
    fn message_limit(&self) -> usize;

    /// Send `text` to a location, optionally as a reply to `reply_to`.
    ///
    /// Returns the id the platform assigned to the sent message.
    async fn send_text(
        &self,
        location_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<i64, AdapterError>;
}

/// Which way a message crosses the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    DiscordToTelegram,
    TelegramToDiscord,
}

/// Source-side identifiers of the message being relayed.
#[derive(Debug, Clone, Copy)]
pub struct SourceMessage {
    /// Channel id (Discord) or chat id (Telegram) the message arrived in.
    pub location_id: i64,
    /// The message's own id on the source platform.
    pub message_id: i64,
    /// Id of the message this one replies to, if any.
    pub parent_id: Option<i64>,
}

/// Outcome of delivering to one destination.
#[derive(Debug)]
pub struct Delivery {
    pub destination: i64,
    /// Ids of the destination messages sent, or the error that stopped
    /// delivery. Already-sent chunks stay recorded either way.
    pub outcome: Result<Vec<i64>, RelayError>,
}

/// The relay engine. Cheap to clone; shares the correlation store.
#[derive(Clone)]
pub struct RelayEngine {
    store: CorrelationStore,
}

impl RelayEngine {
    pub fn new(store: CorrelationStore) -> Self {
        Self { store }
    }

    /// Deliver `text` to every destination of one bridge.
    ///
    /// Destinations run concurrently and independently; the returned
    /// outcomes are in destination order. Failures have already been
    /// logged by the time this returns.
    pub async fn fan_out<A>(
        &self,
        adapter: &A,
        direction: Direction,
        bridge: &str,
        source: &SourceMessage,
        text: &str,
        destinations: &[i64],
    ) -> Vec<Delivery>
    where
        A: PlatformAdapter + ?Sized,
    {
        let chunks = split_text(text, adapter.message_limit());
        if chunks.is_empty() {
            debug!(bridge, "Empty payload, skipping fan-out");
            return Vec::new();
        }

        let deliveries = join_all(destinations.iter().map(|&destination| {
            let chunks = &chunks;
            async move {
                let outcome = self
                    .deliver_one(adapter, direction, bridge, source, chunks, destination)
                    .await;
                Delivery {
                    destination,
                    outcome,
                }
            }
        }))
        .await;

        for delivery in &deliveries {
            match &delivery.outcome {
                Ok(sent) => info!(
                    bridge,
                    destination = delivery.destination,
                    platform = %adapter.platform(),
                    chunks = sent.len(),
                    "Relayed message"
                ),
                Err(e) => warn!(
                    bridge,
                    destination = delivery.destination,
                    platform = %adapter.platform(),
                    "Relay failed: {}",
                    e
                ),
            }
        }

        deliveries
    }

    /// Deliver all chunks to a single destination, in order.
    async fn deliver_one<A>(
        &self,
        adapter: &A,
        direction: Direction,
        bridge: &str,
        source: &SourceMessage,
        chunks: &[String],
        destination: i64,
    ) -> Result<Vec<i64>, RelayError>
    where
        A: PlatformAdapter + ?Sized,
    {
        let reply_to = match source.parent_id {
            Some(parent_id) => {
                self.resolve_reply_target(direction, source.location_id, parent_id, destination)
                    .await?
            }
            None => None,
        };

        let mut sent = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let reply_to = if index == 0 { reply_to } else { None };
            let sent_id = adapter.send_text(destination, chunk, reply_to).await?;

            match direction {
                Direction::DiscordToTelegram => {
                    self.store
                        .record(
                            bridge,
                            source.location_id,
                            source.message_id,
                            destination,
                            sent_id,
                        )
                        .await?
                }
                Direction::TelegramToDiscord => {
                    self.store
                        .record(
                            bridge,
                            destination,
                            sent_id,
                            source.location_id,
                            source.message_id,
                        )
                        .await?
                }
            }

            sent.push(sent_id);
        }

        Ok(sent)
    }

    /// Resolve the destination-side message a reply should thread onto.
    ///
    /// A miss is not an error: the message is sent without threading.
    async fn resolve_reply_target(
        &self,
        direction: Direction,
        source_location_id: i64,
        parent_id: i64,
        destination: i64,
    ) -> Result<Option<i64>, RelayError> {
        let target = match direction {
            Direction::DiscordToTelegram => {
                self.store
                    .telegram_reply_target(source_location_id, parent_id, destination)
                    .await?
            }
            Direction::TelegramToDiscord => {
                self.store
                    .discord_reply_target(source_location_id, parent_id, destination)
                    .await?
            }
        };
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicI64, Ordering};

    use tokio::sync::Mutex;

    /// A recorded outbound send: (destination, text, reply_to).
    type SentRecord = (i64, String, Option<i64>);

    struct MockAdapter {
        limit: usize,
        fail_on: HashSet<i64>,
        next_id: AtomicI64,
        sent: Mutex<Vec<SentRecord>>,
    }

    impl MockAdapter {
        fn new(limit: usize) -> Self {
            Self {
                limit,
                fail_on: HashSet::new(),
                next_id: AtomicI64::new(1),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, destination: i64) -> Self {
            self.fail_on.insert(destination);
            self
        }

        async fn sent(&self) -> Vec<SentRecord> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl PlatformAdapter for MockAdapter {
        fn platform(&self) -> Platform {
            Platform::Telegram
        }

        fn message_limit(&self) -> usize {
            self.limit
        }

        async fn send_text(
            &self,
            location_id: i64,
            text: &str,
            reply_to: Option<i64>,
        ) -> Result<i64, AdapterError> {
            if self.fail_on.contains(&location_id) {
                return Err(AdapterError::NotSendable { location_id });
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.sent
                .lock()
                .await
                .push((location_id, text.to_string(), reply_to));
            Ok(id)
        }
    }

    fn engine() -> RelayEngine {
        RelayEngine::new(CorrelationStore::open_in_memory().unwrap())
    }

    fn source(message_id: i64) -> SourceMessage {
        SourceMessage {
            location_id: 10,
            message_id,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_fan_out_delivers_and_records() {
        let engine = engine();
        let adapter = MockAdapter::new(4096);

        let deliveries = engine
            .fan_out(
                &adapter,
                Direction::DiscordToTelegram,
                "default",
                &source(20),
                "hello",
                &[100, 200],
            )
            .await;

        assert_eq!(deliveries.len(), 2);
        assert!(deliveries.iter().all(|d| d.outcome.is_ok()));

        // Each destination got one message and one correlation record.
        for destination in [100, 200] {
            let target = engine
                .store
                .telegram_reply_target(10, 20, destination)
                .await
                .unwrap();
            assert!(target.is_some());
        }
    }

    #[tokio::test]
    async fn test_failed_destination_does_not_block_siblings() {
        let engine = engine();
        let adapter = MockAdapter::new(4096).failing_on(200);

        let deliveries = engine
            .fan_out(
                &adapter,
                Direction::DiscordToTelegram,
                "default",
                &source(20),
                "hello",
                &[100, 200, 300],
            )
            .await;

        assert!(deliveries[0].outcome.is_ok());
        assert!(deliveries[1].outcome.is_err());
        assert!(deliveries[2].outcome.is_ok());

        // The two healthy destinations were sent and recorded.
        let sent = adapter.sent().await;
        let reached: HashSet<i64> = sent.iter().map(|(d, _, _)| *d).collect();
        assert_eq!(reached, HashSet::from([100, 300]));

        assert!(engine
            .store
            .telegram_reply_target(10, 20, 100)
            .await
            .unwrap()
            .is_some());
        assert!(engine
            .store
            .telegram_reply_target(10, 20, 300)
            .await
            .unwrap()
            .is_some());
        assert!(engine
            .store
            .telegram_reply_target(10, 20, 200)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_chunked_delivery_records_every_chunk() {
        let engine = engine();
        let adapter = MockAdapter::new(2000);
        let text = "A".repeat(3000);

        let deliveries = engine
            .fan_out(
                &adapter,
                Direction::DiscordToTelegram,
                "default",
                &source(20),
                &text,
                &[100],
            )
            .await;

        let sent_ids = deliveries[0].outcome.as_ref().unwrap();
        assert_eq!(sent_ids.len(), 2);

        // The reply anchor is the first chunk: MIN resolves to it.
        assert_eq!(
            engine
                .store
                .telegram_reply_target(10, 20, 100)
                .await
                .unwrap(),
            Some(sent_ids[0])
        );

        let sent = adapter.sent().await;
        assert_eq!(sent[0].1.len(), 2000);
        assert_eq!(sent[1].1.len(), 1000);
    }

    #[tokio::test]
    async fn test_only_first_chunk_threads_reply() {
        let engine = engine();
        // Parent message 20 was previously relayed to chat 100 as message 7.
        engine
            .store
            .record("default", 10, 20, 100, 7)
            .await
            .unwrap();

        let adapter = MockAdapter::new(2000);
        let reply_source = SourceMessage {
            location_id: 10,
            message_id: 21,
            parent_id: Some(20),
        };
        let text = "B".repeat(3000);

        engine
            .fan_out(
                &adapter,
                Direction::DiscordToTelegram,
                "default",
                &reply_source,
                &text,
                &[100],
            )
            .await;

        let sent = adapter.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].2, Some(7));
        assert_eq!(sent[1].2, None);
    }

    #[tokio::test]
    async fn test_unresolved_reply_sends_unthreaded() {
        let engine = engine();
        let adapter = MockAdapter::new(4096);
        let reply_source = SourceMessage {
            location_id: 10,
            message_id: 21,
            parent_id: Some(999),
        };

        let deliveries = engine
            .fan_out(
                &adapter,
                Direction::DiscordToTelegram,
                "default",
                &reply_source,
                "hi",
                &[100],
            )
            .await;

        assert!(deliveries[0].outcome.is_ok());
        assert_eq!(adapter.sent().await[0].2, None);
    }

    #[tokio::test]
    async fn test_empty_payload_skips_fan_out() {
        let engine = engine();
        let adapter = MockAdapter::new(4096);

        let deliveries = engine
            .fan_out(
                &adapter,
                Direction::DiscordToTelegram,
                "default",
                &source(20),
                "   \n  ",
                &[100],
            )
            .await;

        assert!(deliveries.is_empty());
        assert!(adapter.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_reverse_direction_record_orientation() {
        let engine = engine();
        let adapter = MockAdapter::new(2000);

        // Telegram chat 100, message 20, relayed to Discord channel 55.
        let telegram_source = SourceMessage {
            location_id: 100,
            message_id: 20,
            parent_id: None,
        };

        let deliveries = engine
            .fan_out(
                &adapter,
                Direction::TelegramToDiscord,
                "default",
                &telegram_source,
                "hello",
                &[55],
            )
            .await;

        let sent_id = deliveries[0].outcome.as_ref().unwrap()[0];

        // A later Telegram reply to message 20 resolves to the Discord copy.
        assert_eq!(
            engine
                .store
                .discord_reply_target(100, 20, 55)
                .await
                .unwrap(),
            Some(sent_id)
        );
    }
}
