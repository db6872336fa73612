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

//! An async client for a Kafka-protocol-speaking broker: a connection pool keyed by broker node,
//! a cluster metadata cache, and a producer/consumer built on top of both.

pub mod auth;
pub mod config;
pub mod connection;
pub mod consumer;
pub mod error;
pub mod group;
pub mod metadata;
pub mod metadata_refresh;
pub mod metrics;
pub mod pool;
pub mod producer;
pub mod serializer;

use std::sync::Arc;

use client_protos::config::ClientConfig;

use crate::config::ConsumerOptions;
use crate::config::ProducerOptions;
use crate::consumer::Consumer;
use crate::error::Error;
use crate::metadata::MetadataCache;
use crate::pool::ConnectionPool;
use crate::producer::Producer;

/// Ties a [`ConnectionPool`] and [`MetadataCache`] to one [`ClientConfig`], and builds
/// producers/consumers that share both (§2 Overview: one client, many producers/consumers, one
/// pool underneath).
pub struct Client {
    config: ClientConfig,
    pool: Arc<ConnectionPool>,
    metadata: Arc<MetadataCache>,
}

impl Client {
    /// Validates `config`, opens the connection pool (lazily — no socket is opened here), and
    /// fetches an initial cluster snapshot from the configured bootstrap servers.
    pub async fn connect(config: ClientConfig) -> Result<Client, Error> {
        config::validate(&config)?;

        let metadata = Arc::new(MetadataCache::new());
        let bootstrap_nodes: Vec<(i32, String)> = config
            .bootstrap_servers
            .iter()
            .enumerate()
            .map(|(idx, addr)| (-(idx as i32) - 1, addr.clone()))
            .collect();
        {
            let mut snapshot = crate::metadata::ClusterSnapshot::default();
            for (node_id, addr) in &bootstrap_nodes {
                let (host, port) = addr
                    .rsplit_once(':')
                    .ok_or_else(|| Error::UserError(format!("invalid bootstrap address: {addr}")))?;
                snapshot.nodes.insert(
                    *node_id,
                    crate::metadata::Node {
                        node_id: *node_id,
                        host: host.to_string(),
                        port: port
                            .parse()
                            .map_err(|_| Error::UserError(format!("invalid port in {addr}")))?,
                        rack: None,
                    },
                );
            }
            metadata.publish(snapshot);
        }

        let pool = Arc::new(ConnectionPool::new(
            config.client_id.clone(),
            config::connect_timeout(&config),
            config.max_inflight_requests_per_connection,
            metadata.clone(),
        ));

        metadata_refresh::refresh(&pool, &metadata, &[]).await?;

        Ok(Client {
            config,
            pool,
            metadata,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metadata(&self) -> Arc<MetadataCache> {
        self.metadata.clone()
    }

    /// Forces an unscoped metadata refresh, fetching every topic the cluster knows about.
    pub async fn refresh_metadata(&self) -> Result<(), Error> {
        metadata_refresh::refresh(&self.pool, &self.metadata, &[]).await
    }

    pub fn producer(&self, options: ProducerOptions) -> Producer {
        Producer::new(
            self.pool.clone(),
            self.metadata.clone(),
            options.into_producer_config(&self.config),
        )
    }

    pub fn consumer(&self, options: ConsumerOptions) -> Arc<Consumer> {
        Arc::new(Consumer::new(
            self.pool.clone(),
            self.metadata.clone(),
            options.into_consumer_config(&self.config),
        ))
    }

    pub async fn close(&self) {
        self.pool.close_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_empty_bootstrap_servers() {
        let config = ClientConfig::default();
        let result = client_runtime::test_runtime().block_on(Client::connect(config));
        assert!(result.is_err());
    }
}
