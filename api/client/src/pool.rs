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
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::sync::RwLock;

use crate::connection::Connection;
use crate::error::Error;
use crate::metadata::MetadataCache;

/// How long a node that failed to connect is skipped on subsequent `get` calls (§4.6 dead-node
/// handling, grounded on the backoff pattern common to Kafka client connection pools).
const DEAD_NODE_COOLDOWN: Duration = Duration::from_secs(30);

enum Slot {
    Open(Arc<Connection>),
    Dead(Instant),
}

/// Connections keyed by broker `node_id`, opened lazily and shared across producer/consumer
/// callers of the same client (§4.6 `ConnectionPool`).
pub struct ConnectionPool {
    client_id: String,
    connect_timeout: Duration,
    max_inflight: usize,
    slots: RwLock<HashMap<i32, Slot>>,
    opening: Mutex<()>,
    metadata: Arc<MetadataCache>,
}

impl ConnectionPool {
    pub fn new(
        client_id: String,
        connect_timeout: Duration,
        max_inflight: usize,
        metadata: Arc<MetadataCache>,
    ) -> ConnectionPool {
        ConnectionPool {
            client_id,
            connect_timeout,
            max_inflight,
            slots: RwLock::new(HashMap::new()),
            opening: Mutex::new(()),
            metadata,
        }
    }

    /// Returns a live connection to `node_id`, opening one against the node's address in the
    /// current metadata snapshot if none exists yet. Concurrent callers asking for the same
    /// unopened node serialize on `opening` rather than racing two TCP connects.
    pub async fn get(&self, node_id: i32) -> Result<Arc<Connection>, Error> {
        if let Some(conn) = self.healthy_slot(node_id).await {
            return Ok(conn);
        }

        let _guard = self.opening.lock().await;
        // Re-check: another caller may have opened (or just failed to open) this node while we
        // waited for the lock.
        if let Some(conn) = self.healthy_slot(node_id).await {
            return Ok(conn);
        }

        let addr = self
            .metadata
            .current()
            .nodes
            .get(&node_id)
            .map(|n| n.addr())
            .ok_or_else(|| Error::UserError(format!("no known address for node {node_id}")))?;

        match Connection::open(
            &addr,
            self.client_id.clone(),
            self.max_inflight,
            self.connect_timeout,
        )
        .await
        {
            Ok(conn) => {
                self.slots
                    .write()
                    .await
                    .insert(node_id, Slot::Open(conn.clone()));
                Ok(conn)
            }
            Err(err) => {
                self.slots
                    .write()
                    .await
                    .insert(node_id, Slot::Dead(Instant::now()));
                Err(err)
            }
        }
    }

    async fn healthy_slot(&self, node_id: i32) -> Option<Arc<Connection>> {
        match self.slots.read().await.get(&node_id) {
            Some(Slot::Open(conn)) if !conn.is_closed() => Some(conn.clone()),
            Some(Slot::Dead(at)) if at.elapsed() < DEAD_NODE_COOLDOWN => None,
            _ => None,
        }
    }

    /// Tries `preferred` in order, falling back to every other known node, and returns the first
    /// one that opens successfully. Used for metadata refresh, coordinator discovery, and initial
    /// bootstrap (§4.6 `getFirstAvailable`).
    pub async fn get_first_available(&self, preferred: &[i32]) -> Result<Arc<Connection>, Error> {
        let mut candidates: Vec<i32> = preferred.to_vec();
        for node_id in self.metadata.current().nodes.keys() {
            if !candidates.contains(node_id) {
                candidates.push(*node_id);
            }
        }

        let mut last_err = None;
        for node_id in candidates {
            match self.get(node_id).await {
                Ok(conn) => return Ok(conn),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::UserError("no nodes available".to_string())))
    }

    pub async fn close_all(&self) {
        let mut slots = self.slots.write().await;
        for slot in slots.values() {
            if let Slot::Open(conn) = slot {
                conn.close().await;
            }
        }
        slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_test_toolkit::start_mock_broker;
    use kafka_api::schemata::api_versions_response::ApiVersionsResponse;
    use kafka_api::schemata::Request;
    use kafka_api::schemata::Response;

    use super::*;
    use crate::metadata::ClusterSnapshot;
    use crate::metadata::Node;

    fn noop_api_versions_handler() -> client_test_toolkit::Handler {
        Arc::new(|_api_type, _api_version, _request: Request| {
            Response::ApiVersionsResponse(ApiVersionsResponse {
                error_code: 0,
                api_keys: vec![],
                throttle_time_ms: 0,
                supported_features: vec![],
                finalized_features_epoch: -1,
                finalized_features: vec![],
                zk_migration_ready: false,
                unknown_tagged_fields: vec![],
            })
        })
    }

    #[tokio::test]
    async fn test_get_opens_and_reuses_connection() {
        let broker = start_mock_broker(noop_api_versions_handler()).await;
        let metadata = Arc::new(MetadataCache::new());
        let mut snapshot = ClusterSnapshot::default();
        snapshot.nodes.insert(
            1,
            Node {
                node_id: 1,
                host: broker.local_addr().ip().to_string(),
                port: broker.local_addr().port() as i32,
                rack: None,
            },
        );
        metadata.publish(snapshot);

        let pool = ConnectionPool::new(
            "test-client".to_string(),
            Duration::from_secs(5),
            8,
            metadata,
        );

        let first = pool.get(1).await.unwrap();
        let second = pool.get(1).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        broker.shutdown();
    }

    #[tokio::test]
    async fn test_get_unknown_node_returns_user_error() {
        let metadata = Arc::new(MetadataCache::new());
        let pool = ConnectionPool::new(
            "test-client".to_string(),
            Duration::from_secs(5),
            8,
            metadata,
        );
        let err = pool.get(42).await.unwrap_err();
        assert!(matches!(err, Error::UserError(_)));
    }
}
