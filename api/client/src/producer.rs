// Copyright 2024 tison <wander4096@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use kafka_api::records::encode_record_batch;
use kafka_api::records::increment_sequence;
use kafka_api::records::CompressionType;
use kafka_api::records::Header;
use kafka_api::records::Record;
use kafka_api::records::RecordBatchEncodeOpts;
use kafka_api::records::TimestampType;
use kafka_api::schemata::apikey::ApiMessageType;
use kafka_api::schemata::init_producer_id_request::InitProducerIdRequest;
use kafka_api::schemata::produce_request::PartitionProduceData;
use kafka_api::schemata::produce_request::ProduceRequest;
use kafka_api::schemata::produce_request::TopicProduceData;
use kafka_api::schemata::Request;
use kafka_api::schemata::Response;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::metrics::MetricsSink;
use crate::metrics::NoopMetricsSink;
use crate::metrics::METRIC_KAFKA_PRODUCED_MESSAGES;
use crate::metrics::METRIC_KAFKA_PRODUCERS;
use crate::pool::ConnectionPool;
use crate::serializer::SerializerPipeline;
use crate::serializer::Slot;

/// The Produce API version this client speaks: latest (9), always flexible (§4.8 Open Question).
const PRODUCE_API_VERSION: i16 = 9;
/// The InitProducerId version this client speaks: latest non-transactional shape (4).
const INIT_PRODUCER_ID_API_VERSION: i16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acks {
    /// Fire-and-forget: the broker does not wait for any replica to persist the batch.
    None,
    /// Wait for the partition leader only.
    Leader,
    /// Wait for every in-sync replica.
    All,
}

impl Acks {
    fn wire_value(self) -> i16 {
        match self {
            Acks::None => 0,
            Acks::Leader => 1,
            Acks::All => -1,
        }
    }
}

/// One message to produce (§4.8). `partition` overrides partitioner selection when set.
#[derive(Debug, Clone, Default)]
pub struct ProducerRecord {
    pub topic: String,
    pub partition: Option<i32>,
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
    pub headers: Vec<(Vec<u8>, Vec<u8>)>,
}

#[derive(Debug, Clone, Copy)]
pub struct PartitionOffset {
    pub partition: i32,
    pub base_offset: i64,
}

pub struct ProducerConfig {
    pub acks: Acks,
    pub compression: CompressionType,
    pub idempotent: bool,
    /// Retry exactly once, after a metadata refresh, when a partition comes back
    /// `UNKNOWN_TOPIC_OR_PARTITION` / `NOT_LEADER_OR_FOLLOWER` (§4.8, §7).
    pub repeat_on_stale_metadata: bool,
    pub request_timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        ProducerConfig {
            acks: Acks::Leader,
            compression: CompressionType::None,
            idempotent: false,
            repeat_on_stale_metadata: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Assigns a partition for a record that doesn't pin one explicitly. The default implementation
/// hashes the key when present, and round-robins otherwise — the same two-mode behavior as the
/// reference Kafka producer's default partitioner.
pub trait Partitioner: Send + Sync {
    fn partition(&self, topic: &str, key: Option<&[u8]>, num_partitions: usize) -> usize;
}

#[derive(Default)]
pub struct DefaultPartitioner {
    round_robin: AtomicU32,
}

impl Partitioner for DefaultPartitioner {
    fn partition(&self, _topic: &str, key: Option<&[u8]>, num_partitions: usize) -> usize {
        if num_partitions == 0 {
            return 0;
        }
        match key {
            Some(key) => {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                (hasher.finish() as usize) % num_partitions
            }
            None => {
                let n = self.round_robin.fetch_add(1, Ordering::Relaxed);
                (n as usize) % num_partitions
            }
        }
    }
}

/// Per-`(topic, partition)` idempotence state: the next sequence number to stamp (§4.8 invariant
/// 4, wraparound handled by [`increment_sequence`]).
#[derive(Default)]
struct SequenceTable(Mutex<HashMap<(String, i32), i32>>);

impl SequenceTable {
    async fn next(&self, topic: &str, partition: i32) -> i32 {
        let mut table = self.0.lock().await;
        let entry = table.entry((topic.to_string(), partition)).or_insert(0);
        let assigned = *entry;
        *entry = increment_sequence(*entry, 1);
        assigned
    }
}

pub struct Producer {
    pool: Arc<ConnectionPool>,
    metadata: Arc<crate::metadata::MetadataCache>,
    config: ProducerConfig,
    partitioner: Box<dyn Partitioner>,
    serializers: Arc<SerializerPipeline>,
    metrics: Arc<dyn MetricsSink>,
    sequences: SequenceTable,
    producer_id: AtomicI64,
    producer_epoch: std::sync::atomic::AtomicI32,
}

impl Producer {
    pub fn new(
        pool: Arc<ConnectionPool>,
        metadata: Arc<crate::metadata::MetadataCache>,
        config: ProducerConfig,
    ) -> Producer {
        let producer = Producer {
            pool,
            metadata,
            config,
            partitioner: Box::new(DefaultPartitioner::default()),
            serializers: Arc::new(SerializerPipeline::default()),
            metrics: Arc::new(NoopMetricsSink),
            sequences: SequenceTable::default(),
            producer_id: AtomicI64::new(-1),
            producer_epoch: std::sync::atomic::AtomicI32::new(0),
        };
        producer.metrics.gauge(METRIC_KAFKA_PRODUCERS).inc();
        producer
    }

    pub fn with_partitioner(mut self, partitioner: Box<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn with_serializers(mut self, serializers: Arc<SerializerPipeline>) -> Self {
        self.serializers = serializers;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Initializes the idempotence producer ID, required once before the first batch when
    /// `idempotent` is set (§4.8). A no-op for non-idempotent producers.
    pub async fn init_idempotence(&self) -> Result<(), Error> {
        if !self.config.idempotent {
            return Ok(());
        }
        let conn = self.pool.get_first_available(&[]).await?;
        let request = Request::InitProducerIdRequest(InitProducerIdRequest {
            transactional_id: None,
            transaction_timeout_ms: self.config.request_timeout.as_millis() as i32,
            producer_id: -1,
            producer_epoch: -1,
            unknown_tagged_fields: vec![],
        });
        let response = conn
            .send(
                ApiMessageType::INIT_PRODUCER_ID,
                INIT_PRODUCER_ID_API_VERSION,
                request,
                self.config.request_timeout,
            )
            .await?;
        match response {
            Response::InitProducerIdResponse(resp) if resp.error_code == 0 => {
                self.producer_id.store(resp.producer_id, Ordering::SeqCst);
                self.producer_epoch
                    .store(resp.producer_epoch as i32, Ordering::SeqCst);
                Ok(())
            }
            Response::InitProducerIdResponse(resp) => Err(Error::protocol(resp.error_code)),
            _ => Err(Error::network("unexpected response to InitProducerId")),
        }
    }

    /// Serializes, partitions, groups by leader, and sends every record, retrying once on stale
    /// metadata when configured. Returns per-record results in input order so a caller can tell
    /// which of a batch of sends failed (§4.8, §7 "partial successes").
    pub async fn send_all(
        &self,
        records: Vec<ProducerRecord>,
    ) -> Vec<Result<PartitionOffset, Error>> {
        let mut results = vec![None; records.len()];
        self.send_all_inner(records, &mut results, self.config.repeat_on_stale_metadata)
            .await;
        results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Err(Error::UserError("record not scheduled".to_string()))))
            .collect()
    }

    async fn send_all_inner(
        &self,
        records: Vec<ProducerRecord>,
        results: &mut [Option<Result<PartitionOffset, Error>>],
        allow_retry: bool,
    ) {
        let snapshot = self.metadata.current();

        // leader node -> (topic, partition, record index, record)
        let mut by_leader: HashMap<i32, Vec<(String, i32, usize)>> = HashMap::new();
        let mut prepared: Vec<Record> = Vec::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            let num_partitions = snapshot
                .topics
                .get(&record.topic)
                .map(|t| t.partitions.len())
                .unwrap_or(0);
            if num_partitions == 0 {
                results[idx] = Some(Err(Error::protocol(
                    kafka_api::schemata::error::ErrorCode::UNKNOWN_TOPIC_OR_PARTITION.code(),
                )));
                prepared.push(Record::default());
                continue;
            }

            let partition = record.partition.unwrap_or_else(|| {
                self.partitioner
                    .partition(&record.topic, record.key.as_deref(), num_partitions)
                    as i32
            });

            let Some(leader) = snapshot.leader_of(&record.topic, partition) else {
                results[idx] = Some(Err(Error::protocol(
                    kafka_api::schemata::error::ErrorCode::LEADER_NOT_AVAILABLE.code(),
                )));
                prepared.push(Record::default());
                continue;
            };

            let key = match &record.key {
                Some(k) => match self.serializers.serialize(Slot::Key, &record.topic, k) {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        results[idx] = Some(Err(err));
                        prepared.push(Record::default());
                        continue;
                    }
                },
                None => None,
            };
            let value = match &record.value {
                Some(v) => match self.serializers.serialize(Slot::Value, &record.topic, v) {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        results[idx] = Some(Err(err));
                        prepared.push(Record::default());
                        continue;
                    }
                },
                None => None,
            };

            let headers = record
                .headers
                .iter()
                .map(|(k, v)| Header {
                    key_len: 0,
                    key: Some(k.clone()),
                    value_len: 0,
                    value: Some(v.clone()),
                })
                .collect();

            prepared.push(Record {
                len: 0,
                attributes: 0,
                timestamp_delta: 0,
                offset_delta: 0,
                key_len: 0,
                key,
                value_len: 0,
                value,
                headers,
            });

            by_leader
                .entry(leader.node_id)
                .or_default()
                .push((record.topic.clone(), partition, idx));
        }

        let mut stale = false;

        for (leader_id, entries) in by_leader {
            let conn = match self.pool.get(leader_id).await {
                Ok(conn) => conn,
                Err(err) => {
                    for (_, _, idx) in &entries {
                        results[*idx] = Some(Err(err.clone()));
                    }
                    continue;
                }
            };

            // Group entries for this leader by (topic, partition) into one batch each, then into
            // one Produce request per leader.
            let mut by_partition: HashMap<(String, i32), Vec<usize>> = HashMap::new();
            for (topic, partition, idx) in &entries {
                by_partition
                    .entry((topic.clone(), *partition))
                    .or_default()
                    .push(*idx);
            }

            let mut topic_data: HashMap<String, Vec<PartitionProduceData>> = HashMap::new();
            for ((topic, partition), indices) in &by_partition {
                let base_sequence = if self.config.idempotent {
                    self.sequences.next(topic, *partition).await
                } else {
                    0
                };

                let batch_records: Vec<Record> =
                    indices.iter().map(|&idx| prepared[idx].clone()).collect();
                let opts = RecordBatchEncodeOpts {
                    base_offset: 0,
                    partition_leader_epoch: -1,
                    base_timestamp: 0,
                    max_timestamp: 0,
                    producer_id: self.producer_id.load(Ordering::SeqCst),
                    producer_epoch: self.producer_epoch.load(Ordering::SeqCst) as i16,
                    base_sequence,
                    is_transactional: false,
                    is_control_batch: false,
                    timestamp_type: TimestampType::CreateTime,
                    compression_type: self.config.compression,
                };
                let encoded = match encode_record_batch(&opts, &batch_records) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        for &idx in indices {
                            results[idx] = Some(Err(Error::network(err.to_string())));
                        }
                        continue;
                    }
                };

                topic_data
                    .entry(topic.clone())
                    .or_default()
                    .push(PartitionProduceData {
                        index: *partition,
                        records: Some(encoded),
                        unknown_tagged_fields: vec![],
                    });
            }

            let request = Request::ProduceRequest(ProduceRequest {
                transactional_id: None,
                acks: self.config.acks.wire_value(),
                timeout_ms: self.config.request_timeout.as_millis() as i32,
                topic_data: topic_data
                    .into_iter()
                    .map(|(name, partition_data)| TopicProduceData {
                        name,
                        partition_data,
                        unknown_tagged_fields: vec![],
                    })
                    .collect(),
                unknown_tagged_fields: vec![],
            });

            if self.config.acks == Acks::None {
                // Fire-and-forget: the broker never answers an acks=0 produce, so there is no
                // correlation ticket to await (§4.8 step 7). Base offsets are unknowable without a
                // response; report success with an unknown offset for every record written.
                match conn.send_fire_and_forget(ApiMessageType::PRODUCE, PRODUCE_API_VERSION, request).await {
                    Ok(()) => {
                        self.metrics
                            .counter(METRIC_KAFKA_PRODUCED_MESSAGES)
                            .inc_by(entries.len() as u64);
                        for (_, partition, idx) in &entries {
                            results[*idx] = Some(Ok(PartitionOffset {
                                partition: *partition,
                                base_offset: -1,
                            }));
                        }
                    }
                    Err(err) => {
                        for (_, _, idx) in &entries {
                            results[*idx] = Some(Err(err.clone()));
                        }
                    }
                }
                continue;
            }

            let response = conn
                .send(
                    ApiMessageType::PRODUCE,
                    PRODUCE_API_VERSION,
                    request,
                    self.config.request_timeout,
                )
                .await;

            let response = match response {
                Ok(Response::ProduceResponse(resp)) => resp,
                Ok(_) => {
                    for (_, _, idx) in &entries {
                        results[*idx] = Some(Err(Error::network("unexpected produce response")));
                    }
                    continue;
                }
                Err(err) => {
                    let retry_all = err.marks_node_dead();
                    for (_, _, idx) in &entries {
                        results[*idx] = Some(Err(err.clone()));
                    }
                    if retry_all {
                        stale = true;
                    }
                    continue;
                }
            };

            for topic_response in &response.responses {
                for partition_response in &topic_response.partition_responses {
                    let key = (topic_response.name.clone(), partition_response.index);
                    let Some(indices) = by_partition.get(&key) else {
                        continue;
                    };
                    if partition_response.error_code == 0 {
                        self.metrics
                            .counter(METRIC_KAFKA_PRODUCED_MESSAGES)
                            .inc_by(indices.len() as u64);
                        for (offset, &idx) in indices.iter().enumerate() {
                            results[idx] = Some(Ok(PartitionOffset {
                                partition: partition_response.index,
                                base_offset: partition_response.base_offset + offset as i64,
                            }));
                        }
                    } else {
                        let error = Error::protocol(partition_response.error_code);
                        if error.is_stale_metadata() {
                            stale = true;
                        }
                        for &idx in indices {
                            results[idx] = Some(Err(error.clone()));
                        }
                    }
                }
            }
        }

        if stale && allow_retry {
            let retry_records: Vec<(usize, ProducerRecord)> = records
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| {
                    matches!(&results[*idx], Some(Err(e)) if e.is_stale_metadata())
                })
                .collect();
            if !retry_records.is_empty() {
                let (indices, retry_records): (Vec<usize>, Vec<ProducerRecord>) =
                    retry_records.into_iter().unzip();
                self.refresh_metadata().await.ok();
                let mut retry_results = vec![None; retry_records.len()];
                Box::pin(self.send_all_inner(retry_records, &mut retry_results, false)).await;
                for (slot, original_idx) in retry_results.into_iter().zip(indices) {
                    results[original_idx] = slot;
                }
            }
        }
    }

    async fn refresh_metadata(&self) -> Result<(), Error> {
        crate::metadata_refresh::refresh(&self.pool, &self.metadata, &[]).await
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.metrics.gauge(METRIC_KAFKA_PRODUCERS).dec();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use client_test_toolkit::start_mock_broker;
    use kafka_api::schemata::api_versions_response::ApiVersionsResponse;
    use kafka_api::schemata::produce_response::PartitionProduceResponse;
    use kafka_api::schemata::produce_response::ProduceResponse;
    use kafka_api::schemata::produce_response::TopicProduceResponse;

    use super::*;
    use crate::metadata::ClusterSnapshot;
    use crate::metadata::MetadataCache;
    use crate::metadata::Node;
    use crate::metadata::PartitionMetadata;
    use crate::metadata::TopicMetadata;
    use crate::pool::ConnectionPool;

    fn snapshot_with_single_leader(node_id: i32, addr: std::net::SocketAddr) -> ClusterSnapshot {
        let mut snapshot = ClusterSnapshot::default();
        snapshot.nodes.insert(
            node_id,
            Node {
                node_id,
                host: addr.ip().to_string(),
                port: addr.port() as i32,
                rack: None,
            },
        );
        snapshot.topics.insert(
            "orders".to_string(),
            TopicMetadata {
                name: "orders".to_string(),
                topic_id: uuid::Uuid::nil(),
                internal: false,
                partitions: vec![PartitionMetadata {
                    index: 0,
                    leader: node_id,
                    leader_epoch: 0,
                    replicas: vec![node_id],
                    isr: vec![node_id],
                    offline_replicas: vec![],
                }],
            },
        );
        snapshot
    }

    #[tokio::test]
    async fn test_send_all_with_acks_none_does_not_await_a_response() {
        let saw_produce = Arc::new(AtomicBool::new(false));
        let saw_produce_in_handler = saw_produce.clone();
        let handler: client_test_toolkit::Handler =
            Arc::new(move |_api_type, _api_version, request| match request {
                Request::ApiVersionsRequest(_) => Response::ApiVersionsResponse(ApiVersionsResponse {
                    error_code: 0,
                    api_keys: vec![],
                    throttle_time_ms: 0,
                    supported_features: vec![],
                    finalized_features_epoch: -1,
                    finalized_features: vec![],
                    zk_migration_ready: false,
                    unknown_tagged_fields: vec![],
                }),
                Request::ProduceRequest(_) => {
                    // A real broker never answers an acks=0 produce; the mock still has to return
                    // something, but the client must not be waiting on it (it already moved on).
                    saw_produce_in_handler.store(true, Ordering::SeqCst);
                    Response::ProduceResponse(ProduceResponse {
                        responses: vec![TopicProduceResponse {
                            name: "orders".to_string(),
                            partition_responses: vec![PartitionProduceResponse {
                                index: 0,
                                error_code: 0,
                                base_offset: 99,
                                log_append_time_ms: -1,
                                log_start_offset: 0,
                                record_errors: vec![],
                                error_message: None,
                                unknown_tagged_fields: vec![],
                            }],
                            unknown_tagged_fields: vec![],
                        }],
                        throttle_time_ms: 0,
                        unknown_tagged_fields: vec![],
                    })
                }
                _ => panic!("unexpected request in producer test"),
            });

        let broker = start_mock_broker(handler).await;
        let metadata = Arc::new(MetadataCache::new());
        metadata.publish(snapshot_with_single_leader(1, broker.local_addr()));

        let pool = Arc::new(ConnectionPool::new(
            "test-client".to_string(),
            Duration::from_secs(5),
            8,
            metadata.clone(),
        ));

        let producer = Producer::new(pool, metadata, ProducerConfig {
            acks: Acks::None,
            ..ProducerConfig::default()
        });

        let results = producer
            .send_all(vec![ProducerRecord {
                topic: "orders".to_string(),
                partition: Some(0),
                key: None,
                value: Some(b"fire and forget".to_vec()),
                headers: vec![],
            }])
            .await;

        assert_eq!(results.len(), 1);
        let offset = results[0].as_ref().expect("acks=0 send should report success");
        assert_eq!(offset.partition, 0);
        assert_eq!(offset.base_offset, -1);

        broker.shutdown();
    }
}

