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
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;

use kafka_api::schemata::metadata_response::MetadataResponse;

/// A single broker in the cluster. Identity is `node_id`; immutable once returned, replaced
/// wholesale on the next metadata refresh (§3 Node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
    pub rack: Option<String>,
}

impl Node {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMetadata {
    pub index: i32,
    pub leader: i32,
    pub leader_epoch: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
    pub offline_replicas: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMetadata {
    pub name: String,
    pub topic_id: uuid::Uuid,
    pub internal: bool,
    pub partitions: Vec<PartitionMetadata>,
}

impl TopicMetadata {
    pub fn partition(&self, index: i32) -> Option<&PartitionMetadata> {
        self.partitions.iter().find(|p| p.index == index)
    }
}

/// An atomically-swapped view of the cluster: nodes, topics, and the controller, as of the last
/// successful `Metadata` refresh (§3 Cluster snapshot). Callers observe one snapshot or another,
/// never a hybrid of two refreshes.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    pub cluster_id: Option<String>,
    pub controller_id: i32,
    pub nodes: HashMap<i32, Node>,
    pub topics: HashMap<String, TopicMetadata>,
}

impl ClusterSnapshot {
    pub fn from_response(resp: &MetadataResponse) -> ClusterSnapshot {
        let nodes = resp
            .brokers
            .iter()
            .map(|b| {
                (
                    b.node_id,
                    Node {
                        node_id: b.node_id,
                        host: b.host.clone(),
                        port: b.port,
                        rack: b.rack.clone(),
                    },
                )
            })
            .collect();

        let topics = resp
            .topics
            .iter()
            .filter_map(|t| {
                let name = t.name.clone()?;
                let partitions = t
                    .partitions
                    .iter()
                    .map(|p| PartitionMetadata {
                        index: p.partition_index,
                        leader: p.leader_id,
                        leader_epoch: p.leader_epoch,
                        replicas: p.replica_nodes.clone(),
                        isr: p.isr_nodes.clone(),
                        offline_replicas: p.offline_replicas.clone(),
                    })
                    .collect();
                Some((
                    name.clone(),
                    TopicMetadata {
                        name,
                        topic_id: t.topic_id,
                        internal: t.is_internal,
                        partitions,
                    },
                ))
            })
            .collect();

        ClusterSnapshot {
            cluster_id: resp.cluster_id.clone(),
            controller_id: resp.controller_id,
            nodes,
            topics,
        }
    }

    pub fn leader_of(&self, topic: &str, partition: i32) -> Option<&Node> {
        let leader_id = self.topics.get(topic)?.partition(partition)?.leader;
        if leader_id < 0 {
            None
        } else {
            self.nodes.get(&leader_id)
        }
    }
}

/// Single-writer (refresh task), multi-reader cache (§4.7). Readers never block the writer and
/// never see a torn snapshot: publication is a single atomic pointer swap.
#[derive(Debug, Default)]
pub struct MetadataCache {
    snapshot: RwLock<Arc<ClusterSnapshot>>,
    generation: AtomicUsize,
}

impl MetadataCache {
    pub fn new() -> MetadataCache {
        MetadataCache {
            snapshot: RwLock::new(Arc::new(ClusterSnapshot::default())),
            generation: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> Arc<ClusterSnapshot> {
        self.snapshot.read().expect("metadata cache lock poisoned").clone()
    }

    /// Publishes a freshly-fetched snapshot. The bump in generation lets a refresh task that
    /// raced another refresh notice it lost and skip a redundant log line; it never blocks a
    /// reader.
    pub fn publish(&self, snapshot: ClusterSnapshot) -> usize {
        let mut guard = self.snapshot.write().expect("metadata cache lock poisoned");
        *guard = Arc::new(snapshot);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_then_read_observes_latest_snapshot() {
        let cache = MetadataCache::new();
        assert!(cache.current().nodes.is_empty());

        let mut snapshot = ClusterSnapshot::default();
        snapshot.nodes.insert(
            1,
            Node {
                node_id: 1,
                host: "localhost".to_string(),
                port: 9092,
                rack: None,
            },
        );
        cache.publish(snapshot);

        let current = cache.current();
        assert_eq!(current.nodes.len(), 1);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn test_leader_of_resolves_via_replica_node() {
        let mut snapshot = ClusterSnapshot::default();
        snapshot.nodes.insert(
            7,
            Node {
                node_id: 7,
                host: "broker-7".to_string(),
                port: 9092,
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
                    leader: 7,
                    leader_epoch: 0,
                    replicas: vec![7],
                    isr: vec![7],
                    offline_replicas: vec![],
                }],
            },
        );

        let leader = snapshot.leader_of("orders", 0).unwrap();
        assert_eq!(leader.node_id, 7);
        assert!(snapshot.leader_of("orders", 1).is_none());
    }
}
