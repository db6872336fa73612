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

use std::collections::HashMap;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use client_runtime::scheduled_task::schedule_with_fixed_delay;
use client_runtime::scheduled_task::ScheduledTask;
use client_runtime::scheduled_task::TaskFn;
use kafka_api::schemata::apikey::ApiMessageType;
use kafka_api::schemata::fetch_request::FetchPartition;
use kafka_api::schemata::fetch_request::FetchRequest;
use kafka_api::schemata::fetch_request::FetchTopic;
use kafka_api::schemata::fetch_request::ReplicaState;
use kafka_api::schemata::offset_commit_request::OffsetCommitRequest;
use kafka_api::schemata::offset_commit_request::OffsetCommitRequestPartition;
use kafka_api::schemata::offset_commit_request::OffsetCommitRequestTopic;
use kafka_api::schemata::offset_fetch_request::OffsetFetchRequest;
use kafka_api::schemata::offset_fetch_request::OffsetFetchRequestTopic;
use kafka_api::schemata::sync_group_request::SyncGroupRequestAssignment;
use kafka_api::schemata::Request;
use kafka_api::schemata::Response;
use kafka_api::records::RecordBatches;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

use crate::error::Error;
use crate::group;
use crate::group::GroupState;
use crate::metadata::MetadataCache;
use crate::metadata_refresh;
use crate::metrics::MetricsSink;
use crate::metrics::NoopMetricsSink;
use crate::metrics::METRIC_KAFKA_CONSUMED_MESSAGES;
use crate::metrics::METRIC_KAFKA_CONSUMERS;
use crate::pool::ConnectionPool;
use crate::serializer::Slot;
use crate::serializer::SerializerPipeline;

const FETCH_API_VERSION: i16 = 12;
const OFFSET_FETCH_API_VERSION: i16 = 7;
const OFFSET_COMMIT_API_VERSION: i16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    Earliest,
    Latest,
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub group_id: String,
    pub client_id: String,
    pub session_timeout_ms: i32,
    pub heartbeat_interval_ms: u64,
    pub auto_commit: bool,
    pub reset_policy: ResetPolicy,
    pub max_wait_time: Duration,
    pub min_bytes: i32,
    pub partition_max_bytes: i32,
    pub request_timeout: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfig {
            group_id: String::new(),
            client_id: "kafka-client".to_string(),
            session_timeout_ms: 10_000,
            heartbeat_interval_ms: 3_000,
            auto_commit: true,
            reset_policy: ResetPolicy::Latest,
            max_wait_time: Duration::from_millis(500),
            min_bytes: 1,
            partition_max_bytes: 1 << 20,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
    pub headers: Vec<(Vec<u8>, Vec<u8>)>,
}

/// A consumer group member (§4.9): owns the join/sync/heartbeat state machine for one group and
/// fetches from whatever partitions it's assigned. One `Consumer` is one group member; running
/// several concurrently against the same `group_id` forms one consumer group.
pub struct Consumer {
    pool: Arc<ConnectionPool>,
    metadata: Arc<MetadataCache>,
    config: ConsumerConfig,
    serializers: Arc<SerializerPipeline>,
    metrics: Arc<dyn MetricsSink>,

    subscribed: RwLock<Vec<String>>,
    state: Mutex<GroupState>,
    member_id: Mutex<String>,
    generation_id: AtomicI32,
    coordinator: Mutex<Option<i32>>,
    assigned: RwLock<Vec<(String, i32)>>,
    positions: Mutex<HashMap<(String, i32), i64>>,
    heartbeat_task: Mutex<Option<ScheduledTask<()>>>,
}

impl Consumer {
    pub fn new(
        pool: Arc<ConnectionPool>,
        metadata: Arc<MetadataCache>,
        config: ConsumerConfig,
    ) -> Consumer {
        let consumer = Consumer {
            pool,
            metadata,
            config,
            serializers: Arc::new(SerializerPipeline::default()),
            metrics: Arc::new(NoopMetricsSink),
            subscribed: RwLock::new(vec![]),
            state: Mutex::new(GroupState::Disconnected),
            member_id: Mutex::new(String::new()),
            generation_id: AtomicI32::new(-1),
            coordinator: Mutex::new(None),
            assigned: RwLock::new(vec![]),
            positions: Mutex::new(HashMap::new()),
            heartbeat_task: Mutex::new(None),
        };
        consumer.metrics.gauge(METRIC_KAFKA_CONSUMERS).inc();
        consumer
    }

    pub fn with_serializers(mut self, serializers: Arc<SerializerPipeline>) -> Self {
        self.serializers = serializers;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn subscribe(&self, topics: Vec<String>) {
        *self.subscribed.write().await = topics;
    }

    pub async fn assignment(&self) -> Vec<(String, i32)> {
        self.assigned.read().await.clone()
    }

    /// Refreshes the shared cluster snapshot, scoped to the currently subscribed topics.
    pub async fn refresh_metadata(&self) -> Result<(), Error> {
        let subscribed = self.subscribed.read().await.clone();
        metadata_refresh::refresh(&self.pool, &self.metadata, &subscribed).await
    }

    /// Runs the full join → (assign, if leader) → sync sequence and starts the heartbeat timer
    /// (§4.9). Safe to call again after a rebalance signal (e.g. a `REBALANCE_IN_PROGRESS` or
    /// `UNKNOWN_MEMBER_ID` error surfaced from `poll`/`commit`).
    pub async fn join(self: &Arc<Self>) -> Result<(), Error> {
        *self.state.lock().await = GroupState::FindingCoordinator;
        let coordinator =
            group::find_coordinator(&self.pool, &self.config.group_id, self.config.request_timeout)
                .await?;
        *self.coordinator.lock().await = Some(coordinator);

        *self.state.lock().await = GroupState::Joining;
        let subscribed = self.subscribed.read().await.clone();
        let prior_member_id = self.member_id.lock().await.clone();
        let joined = group::join_group(
            &self.pool,
            coordinator,
            &self.config.group_id,
            &prior_member_id,
            self.config.session_timeout_ms,
            &subscribed,
            self.config.request_timeout,
        )
        .await?;

        *self.member_id.lock().await = joined.member_id.clone();
        self.generation_id
            .store(joined.generation_id, Ordering::SeqCst);

        *self.state.lock().await = GroupState::Syncing;
        let is_leader = joined.leader_id == joined.member_id;
        let assignments = if is_leader {
            let snapshot = self.metadata.current();
            let counts: Vec<(String, usize)> = subscribed
                .iter()
                .map(|t| {
                    (
                        t.clone(),
                        snapshot.topics.get(t).map(|m| m.partitions.len()).unwrap_or(0),
                    )
                })
                .collect();
            let member_ids: Vec<String> = joined
                .members
                .iter()
                .map(|m| m.member_id.clone())
                .collect();
            let by_member = group::assign_partitions_range(&member_ids, &counts);
            joined
                .members
                .iter()
                .map(|m| SyncGroupRequestAssignment {
                    member_id: m.member_id.clone(),
                    assignment: group::encode_assignment(
                        by_member.get(&m.member_id).map(|v| v.as_slice()).unwrap_or(&[]),
                    ),
                    unknown_tagged_fields: vec![],
                })
                .collect()
        } else {
            vec![]
        };

        let assignment_bytes = group::sync_group(
            &self.pool,
            coordinator,
            &self.config.group_id,
            joined.generation_id,
            &joined.member_id,
            assignments,
            self.config.request_timeout,
        )
        .await?;

        let assigned = group::decode_assignment(&assignment_bytes);
        *self.assigned.write().await = assigned.clone();
        self.restore_positions(assigned).await?;

        *self.state.lock().await = GroupState::Stable;
        self.start_heartbeat().await;
        Ok(())
    }

    async fn restore_positions(&self, assigned: Vec<(String, i32)>) -> Result<(), Error> {
        if assigned.is_empty() {
            return Ok(());
        }
        let coordinator = self
            .coordinator
            .lock()
            .await
            .ok_or_else(|| Error::UserError("not joined to a group".to_string()))?;

        let mut by_topic: HashMap<String, Vec<i32>> = HashMap::new();
        for (topic, partition) in &assigned {
            by_topic.entry(topic.clone()).or_default().push(*partition);
        }
        let request = Request::OffsetFetchRequest(OffsetFetchRequest {
            group_id: self.config.group_id.clone(),
            topics: by_topic
                .into_iter()
                .map(|(name, partition_indexes)| OffsetFetchRequestTopic {
                    name,
                    partition_indexes,
                    unknown_tagged_fields: vec![],
                })
                .collect(),
            groups: vec![],
            require_stable: false,
            unknown_tagged_fields: vec![],
        });
        let conn = self.pool.get(coordinator).await?;
        let response = conn
            .send(
                ApiMessageType::OFFSET_FETCH,
                OFFSET_FETCH_API_VERSION,
                request,
                self.config.request_timeout,
            )
            .await?;
        let Response::OffsetFetchResponse(resp) = response else {
            return Err(Error::network("unexpected response to OffsetFetch"));
        };

        let mut positions = self.positions.lock().await;
        for topic in &resp.topics {
            for partition in &topic.partitions {
                let offset = if partition.committed_offset < 0 {
                    match self.config.reset_policy {
                        ResetPolicy::Earliest => 0,
                        ResetPolicy::Latest => i64::MAX,
                    }
                } else {
                    partition.committed_offset
                };
                positions.insert((topic.name.clone(), partition.partition_index), offset);
            }
        }
        Ok(())
    }

    /// Starts (or restarts) the periodic heartbeat. Replacing `heartbeat_task` drops and cancels
    /// whatever task was previously running, per `ScheduledTask`'s cancel-on-drop contract.
    async fn start_heartbeat(self: &Arc<Self>) {
        let task = schedule_with_fixed_delay(
            format!("consumer-heartbeat-{}", self.config.group_id),
            client_runtime::io_runtime(),
            Some(Duration::from_millis(self.config.heartbeat_interval_ms)),
            Duration::from_millis(self.config.heartbeat_interval_ms),
            HeartbeatTask {
                consumer: self.clone(),
            },
        );
        if let Some(previous) = self.heartbeat_task.lock().await.replace(task) {
            previous.cancel();
        }
    }

    /// Fetches from every assigned partition, grouped by leader into one `Fetch` request per
    /// node (§4.9 fetch loop). Advances `positions` for each record returned.
    pub async fn poll(&self) -> Result<Vec<ConsumerRecord>, Error> {
        let assigned = self.assigned.read().await.clone();
        if assigned.is_empty() {
            return Ok(vec![]);
        }

        let snapshot = self.metadata.current();
        let mut by_leader: HashMap<i32, Vec<(String, i32)>> = HashMap::new();
        for (topic, partition) in &assigned {
            if let Some(leader) = snapshot.leader_of(topic, *partition) {
                by_leader
                    .entry(leader.node_id)
                    .or_default()
                    .push((topic.clone(), *partition));
            }
        }

        let mut records = Vec::new();
        for (leader_id, partitions) in by_leader {
            let conn = self.pool.get(leader_id).await?;
            let positions = self.positions.lock().await.clone();

            let mut by_topic: HashMap<String, Vec<FetchPartition>> = HashMap::new();
            for (topic, partition) in &partitions {
                let offset = *positions.get(&(topic.clone(), *partition)).unwrap_or(&0);
                by_topic.entry(topic.clone()).or_default().push(FetchPartition {
                    partition: *partition,
                    current_leader_epoch: -1,
                    fetch_offset: offset,
                    last_fetched_epoch: -1,
                    log_start_offset: -1,
                    partition_max_bytes: self.config.partition_max_bytes,
                    unknown_tagged_fields: vec![],
                });
            }

            let request = Request::FetchRequest(FetchRequest {
                cluster_id: None,
                replica_id: -1,
                replica_state: ReplicaState {
                    replica_id: -1,
                    replica_epoch: -1,
                    unknown_tagged_fields: vec![],
                },
                max_wait_ms: self.config.max_wait_time.as_millis() as i32,
                min_bytes: self.config.min_bytes,
                max_bytes: i32::MAX,
                isolation_level: 0,
                session_id: 0,
                session_epoch: -1,
                topics: by_topic
                    .into_iter()
                    .map(|(topic, partitions)| FetchTopic {
                        topic,
                        topic_id: uuid::Uuid::nil(),
                        partitions,
                        unknown_tagged_fields: vec![],
                    })
                    .collect(),
                forgotten_topics_data: vec![],
                rack_id: String::new(),
                unknown_tagged_fields: vec![],
            });

            let response = conn
                .send(ApiMessageType::FETCH, FETCH_API_VERSION, request, self.config.max_wait_time + self.config.request_timeout)
                .await?;
            let Response::FetchResponse(resp) = response else {
                return Err(Error::network("unexpected response to Fetch"));
            };

            for topic_response in resp.responses {
                for partition_data in topic_response.partitions {
                    if partition_data.error_code != 0 {
                        if partition_data.error_code
                            == kafka_api::schemata::error::ErrorCode::OFFSET_OUT_OF_RANGE.code()
                        {
                            let reset = match self.config.reset_policy {
                                ResetPolicy::Earliest => 0,
                                ResetPolicy::Latest => i64::MAX,
                            };
                            self.positions.lock().await.insert(
                                (topic_response.topic.clone(), partition_data.partition_index),
                                reset,
                            );
                        }
                        continue;
                    }
                    if partition_data.records.is_empty() {
                        continue;
                    }
                    let batches = RecordBatches::new(partition_data.records);
                    let views = batches.batches().map_err(|err| {
                        Error::MalformedInput(format!("failed to decode record batches: {err}"))
                    })?;
                    let mut last_offset = None;
                    for batch in &views {
                        let view = batch.view();
                        if !view.verify_checksum() {
                            return Err(Error::MalformedInput("crc mismatch".to_string()));
                        }
                        let base_offset = view.base_offset();
                        let decoded = view.records().map_err(|err| {
                            Error::MalformedInput(format!("failed to decode records: {err}"))
                        })?;
                        for (delta, record) in decoded.into_iter().enumerate() {
                            let offset = base_offset + delta as i64;
                            let key = match &record.key {
                                Some(k) => self
                                    .serializers
                                    .deserialize(Slot::Key, &topic_response.topic, k)
                                    .ok(),
                                None => None,
                            };
                            let value = match &record.value {
                                Some(v) => self
                                    .serializers
                                    .deserialize(Slot::Value, &topic_response.topic, v)
                                    .ok(),
                                None => None,
                            };
                            let headers = record
                                .headers
                                .iter()
                                .filter_map(|h| {
                                    Some((h.key.clone()?, h.value.clone().unwrap_or_default()))
                                })
                                .collect();
                            records.push(ConsumerRecord {
                                topic: topic_response.topic.clone(),
                                partition: partition_data.partition_index,
                                offset,
                                key,
                                value,
                                headers,
                            });
                            last_offset = Some(offset);
                        }
                    }
                    if let Some(offset) = last_offset {
                        self.positions.lock().await.insert(
                            (topic_response.topic.clone(), partition_data.partition_index),
                            offset + 1,
                        );
                        if self.config.auto_commit {
                            // best-effort: auto-commit failures are logged, not surfaced, matching
                            // the fire-and-forget nature of periodic auto-commit.
                            if let Err(err) = self.commit().await {
                                log::debug!("auto-commit failed: {err}");
                            }
                        }
                    }
                    self.metrics
                        .counter(METRIC_KAFKA_CONSUMED_MESSAGES)
                        .inc_by(records.len() as u64);
                }
            }
        }

        Ok(records)
    }

    /// Commits every assigned partition's current position (§4.9).
    pub async fn commit(&self) -> Result<(), Error> {
        let coordinator = self
            .coordinator
            .lock()
            .await
            .ok_or_else(|| Error::UserError("not joined to a group".to_string()))?;
        let positions = self.positions.lock().await.clone();
        if positions.is_empty() {
            return Ok(());
        }

        let mut by_topic: HashMap<String, Vec<OffsetCommitRequestPartition>> = HashMap::new();
        for ((topic, partition), offset) in positions {
            by_topic
                .entry(topic)
                .or_default()
                .push(OffsetCommitRequestPartition {
                    partition_index: partition,
                    committed_offset: offset,
                    committed_leader_epoch: -1,
                    committed_metadata: None,
                    unknown_tagged_fields: vec![],
                });
        }

        let request = Request::OffsetCommitRequest(OffsetCommitRequest {
            group_id: self.config.group_id.clone(),
            generation_id_or_member_epoch: self.generation_id.load(Ordering::SeqCst),
            member_id: self.member_id.lock().await.clone(),
            group_instance_id: None,
            topics: by_topic
                .into_iter()
                .map(|(name, partitions)| OffsetCommitRequestTopic {
                    name,
                    partitions,
                    unknown_tagged_fields: vec![],
                })
                .collect(),
            unknown_tagged_fields: vec![],
        });

        let conn = self.pool.get(coordinator).await?;
        let response = conn
            .send(
                ApiMessageType::OFFSET_COMMIT,
                OFFSET_COMMIT_API_VERSION,
                request,
                self.config.request_timeout,
            )
            .await?;
        let Response::OffsetCommitResponse(resp) = response else {
            return Err(Error::network("unexpected response to OffsetCommit"));
        };

        let errors: Vec<Error> = resp
            .topics
            .iter()
            .flat_map(|t| &t.partitions)
            .filter(|p| p.error_code != 0)
            .map(|p| Error::protocol(p.error_code))
            .collect();
        crate::error::aggregate(errors, resp.topics.len()).map_or(Ok(()), Err)
    }

    /// No `LeaveGroup` request is implemented (it is absent from the underlying wire-protocol
    /// codec); this simply stops the heartbeat so the coordinator evicts the member once
    /// `session_timeout_ms` elapses.
    pub async fn leave(&self) {
        *self.state.lock().await = GroupState::Leaving;
        if let Some(task) = self.heartbeat_task.lock().await.take() {
            task.cancel();
        }
        *self.state.lock().await = GroupState::Disconnected;
    }

}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.metrics.gauge(METRIC_KAFKA_CONSUMERS).dec();
    }
}

struct HeartbeatTask {
    consumer: Arc<Consumer>,
}

impl TaskFn<()> for HeartbeatTask {
    type Error = Error;

    async fn call(&mut self) -> Result<(), Error> {
        let coordinator = {
            let guard = self.consumer.coordinator.lock().await;
            guard.ok_or_else(|| Error::UserError("not joined to a group".to_string()))?
        };
        let member_id = self.consumer.member_id.lock().await.clone();
        let generation_id = self.consumer.generation_id.load(Ordering::SeqCst);
        group::heartbeat(
            &self.consumer.pool,
            coordinator,
            &self.consumer.config.group_id,
            generation_id,
            &member_id,
            self.consumer.config.request_timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use client_test_toolkit::start_mock_broker;
    use kafka_api::records::encode_record_batch;
    use kafka_api::records::Record;
    use kafka_api::records::RecordBatchEncodeOpts;
    use kafka_api::schemata::fetch_response::FetchResponse;
    use kafka_api::schemata::fetch_response::FetchableTopicResponse;
    use kafka_api::schemata::fetch_response::PartitionData;
    use kafka_api::schemata::offset_fetch_response::OffsetFetchResponse;
    use kafka_api::schemata::offset_fetch_response::OffsetFetchResponsePartition;
    use kafka_api::schemata::offset_fetch_response::OffsetFetchResponseTopic;

    use super::*;
    use crate::metadata::ClusterSnapshot;
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
    async fn test_poll_decodes_fetched_records_and_advances_position() {
        let batch_bytes = encode_record_batch(
            &RecordBatchEncodeOpts::default(),
            &[Record {
                offset_delta: 0,
                key: Some(b"k".to_vec()),
                value: Some(b"v".to_vec()),
                ..Default::default()
            }],
        )
        .unwrap();

        let handler_batch = batch_bytes.clone();
        let handler: client_test_toolkit::Handler = Arc::new(move |_api_type, _api_version, request| {
            match request {
                Request::ApiVersionsRequest(_) => {
                    Response::ApiVersionsResponse(
                        kafka_api::schemata::api_versions_response::ApiVersionsResponse {
                            error_code: 0,
                            api_keys: vec![],
                            throttle_time_ms: 0,
                            supported_features: vec![],
                            finalized_features_epoch: -1,
                            finalized_features: vec![],
                            zk_migration_ready: false,
                            unknown_tagged_fields: vec![],
                        },
                    )
                }
                Request::FetchRequest(_) => Response::FetchResponse(FetchResponse {
                    throttle_time_ms: 0,
                    error_code: 0,
                    session_id: 0,
                    responses: vec![FetchableTopicResponse {
                        topic: "orders".to_string(),
                        topic_id: uuid::Uuid::nil(),
                        partitions: vec![PartitionData {
                            partition_index: 0,
                            error_code: 0,
                            high_watermark: 1,
                            last_stable_offset: 1,
                            log_start_offset: 0,
                            diverging_epoch: None,
                            current_leader: None,
                            snapshot_id: None,
                            aborted_transactions: None,
                            preferred_read_replica: -1,
                            records: handler_batch.clone(),
                            unknown_tagged_fields: vec![],
                        }],
                        unknown_tagged_fields: vec![],
                    }],
                    unknown_tagged_fields: vec![],
                }),
                _ => panic!("unexpected request in poll test"),
            }
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

        let consumer = Consumer::new(pool, metadata, ConsumerConfig {
            group_id: "g".to_string(),
            auto_commit: false,
            ..ConsumerConfig::default()
        });
        *consumer.assigned.write().await = vec![("orders".to_string(), 0)];

        let records = consumer.poll().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].topic, "orders");
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[0].key, Some(b"k".to_vec()));
        assert_eq!(records[0].value, Some(b"v".to_vec()));

        let positions = consumer.positions.lock().await;
        assert_eq!(positions.get(&("orders".to_string(), 0)), Some(&1));
        drop(positions);

        broker.shutdown();
    }

    #[tokio::test]
    async fn test_poll_surfaces_malformed_input_on_crc_mismatch() {
        let mut batch_bytes = encode_record_batch(
            &RecordBatchEncodeOpts::default(),
            &[Record {
                offset_delta: 0,
                key: None,
                value: Some(b"v".to_vec()),
                ..Default::default()
            }],
        )
        .unwrap();
        let last = batch_bytes.len() - 1;
        batch_bytes[last] ^= 0xFF;

        let handler_batch = batch_bytes.clone();
        let handler: client_test_toolkit::Handler = Arc::new(move |_api_type, _api_version, request| {
            match request {
                Request::ApiVersionsRequest(_) => {
                    Response::ApiVersionsResponse(
                        kafka_api::schemata::api_versions_response::ApiVersionsResponse {
                            error_code: 0,
                            api_keys: vec![],
                            throttle_time_ms: 0,
                            supported_features: vec![],
                            finalized_features_epoch: -1,
                            finalized_features: vec![],
                            zk_migration_ready: false,
                            unknown_tagged_fields: vec![],
                        },
                    )
                }
                Request::FetchRequest(_) => Response::FetchResponse(FetchResponse {
                    throttle_time_ms: 0,
                    error_code: 0,
                    session_id: 0,
                    responses: vec![FetchableTopicResponse {
                        topic: "orders".to_string(),
                        topic_id: uuid::Uuid::nil(),
                        partitions: vec![PartitionData {
                            partition_index: 0,
                            error_code: 0,
                            high_watermark: 1,
                            last_stable_offset: 1,
                            log_start_offset: 0,
                            diverging_epoch: None,
                            current_leader: None,
                            snapshot_id: None,
                            aborted_transactions: None,
                            preferred_read_replica: -1,
                            records: handler_batch.clone(),
                            unknown_tagged_fields: vec![],
                        }],
                        unknown_tagged_fields: vec![],
                    }],
                    unknown_tagged_fields: vec![],
                }),
                _ => panic!("unexpected request in poll test"),
            }
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

        let consumer = Consumer::new(pool, metadata, ConsumerConfig {
            group_id: "g".to_string(),
            auto_commit: false,
            ..ConsumerConfig::default()
        });
        *consumer.assigned.write().await = vec![("orders".to_string(), 0)];

        let err = consumer.poll().await.unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        broker.shutdown();
    }

    #[tokio::test]
    async fn test_restore_positions_resets_unknown_offset_per_policy() {
        let handler: client_test_toolkit::Handler = Arc::new(|_api_type, _api_version, request| {
            match request {
                Request::ApiVersionsRequest(_) => {
                    Response::ApiVersionsResponse(
                        kafka_api::schemata::api_versions_response::ApiVersionsResponse {
                            error_code: 0,
                            api_keys: vec![],
                            throttle_time_ms: 0,
                            supported_features: vec![],
                            finalized_features_epoch: -1,
                            finalized_features: vec![],
                            zk_migration_ready: false,
                            unknown_tagged_fields: vec![],
                        },
                    )
                }
                Request::OffsetFetchRequest(_) => Response::OffsetFetchResponse(OffsetFetchResponse {
                    throttle_time_ms: 0,
                    topics: vec![OffsetFetchResponseTopic {
                        name: "orders".to_string(),
                        partitions: vec![OffsetFetchResponsePartition {
                            partition_index: 0,
                            committed_offset: -1,
                            committed_leader_epoch: -1,
                            metadata: None,
                            error_code: 0,
                            unknown_tagged_fields: vec![],
                        }],
                        unknown_tagged_fields: vec![],
                    }],
                    error_code: 0,
                    groups: vec![],
                    unknown_tagged_fields: vec![],
                }),
                _ => panic!("unexpected request in restore_positions test"),
            }
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

        let consumer = Consumer::new(pool, metadata, ConsumerConfig {
            group_id: "g".to_string(),
            reset_policy: ResetPolicy::Earliest,
            ..ConsumerConfig::default()
        });
        *consumer.coordinator.lock().await = Some(1);

        consumer
            .restore_positions(vec![("orders".to_string(), 0)])
            .await
            .unwrap();

        let positions = consumer.positions.lock().await;
        assert_eq!(positions.get(&("orders".to_string(), 0)), Some(&0));
        drop(positions);

        broker.shutdown();
    }
}
