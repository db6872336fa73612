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

use std::time::Duration;

use client_protos::config::ClientConfig;
use kafka_api::records::CompressionType;

use crate::consumer::ConsumerConfig;
use crate::consumer::ResetPolicy;
use crate::error::Error;
use crate::producer::Acks;
use crate::producer::ProducerConfig;

/// Turns the plain-data [`ClientConfig`] into the connection parameters `Client::connect` needs,
/// rejecting anything unusable before a single socket opens (§6 "strict" mode: fail fast on
/// invalid configuration rather than at first use).
pub fn validate(config: &ClientConfig) -> Result<(), Error> {
    if config.bootstrap_servers.is_empty() {
        return Err(Error::UserError(
            "bootstrap_servers must name at least one broker".to_string(),
        ));
    }
    if config.max_inflight_requests_per_connection == 0 {
        return Err(Error::UserError(
            "max_inflight_requests_per_connection must be at least 1".to_string(),
        ));
    }
    if config.tls.is_some() {
        return Err(Error::UserError(
            "tls is a marker only; wrap the transport yourself before connecting".to_string(),
        ));
    }
    Ok(())
}

pub fn connect_timeout(config: &ClientConfig) -> Duration {
    Duration::from_millis(config.connect_timeout_ms)
}

pub fn request_timeout(config: &ClientConfig) -> Duration {
    Duration::from_millis(config.request_timeout_ms)
}

/// Producer-specific knobs layered on top of the shared [`ClientConfig`] (§6 producer options).
#[derive(Debug, Clone)]
pub struct ProducerOptions {
    pub acks: Acks,
    pub compression: CompressionType,
    pub idempotent: bool,
    pub repeat_on_stale_metadata: bool,
}

impl Default for ProducerOptions {
    fn default() -> Self {
        ProducerOptions {
            acks: Acks::All,
            compression: CompressionType::None,
            idempotent: false,
            repeat_on_stale_metadata: true,
        }
    }
}

impl ProducerOptions {
    pub fn into_producer_config(self, client: &ClientConfig) -> ProducerConfig {
        ProducerConfig {
            acks: self.acks,
            compression: self.compression,
            idempotent: self.idempotent,
            repeat_on_stale_metadata: self.repeat_on_stale_metadata,
            request_timeout: request_timeout(client),
        }
    }
}

/// Consumer-specific knobs layered on top of the shared [`ClientConfig`] (§6 consumer options).
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    pub group_id: String,
    pub session_timeout_ms: i32,
    pub heartbeat_interval_ms: u64,
    pub auto_commit: bool,
    pub reset_policy: ResetPolicy,
    pub max_wait_time: Duration,
    pub min_bytes: i32,
    pub partition_max_bytes: i32,
}

impl ConsumerOptions {
    pub fn new(group_id: impl Into<String>) -> Self {
        ConsumerOptions {
            group_id: group_id.into(),
            session_timeout_ms: 10_000,
            heartbeat_interval_ms: 3_000,
            auto_commit: true,
            reset_policy: ResetPolicy::Latest,
            max_wait_time: Duration::from_millis(500),
            min_bytes: 1,
            partition_max_bytes: 1 << 20,
        }
    }

    pub fn into_consumer_config(self, client: &ClientConfig) -> ConsumerConfig {
        ConsumerConfig {
            group_id: self.group_id,
            client_id: client.client_id.clone(),
            session_timeout_ms: self.session_timeout_ms,
            heartbeat_interval_ms: self.heartbeat_interval_ms,
            auto_commit: self.auto_commit,
            reset_policy: self.reset_policy,
            max_wait_time: self.max_wait_time,
            min_bytes: self.min_bytes,
            partition_max_bytes: self.partition_max_bytes,
            request_timeout: request_timeout(client),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_bootstrap_servers() {
        let config = ClientConfig::default();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_accepts_minimal_config() {
        let config = ClientConfig {
            bootstrap_servers: vec!["localhost:9092".to_string()],
            ..ClientConfig::default()
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_tls_marker() {
        let config = ClientConfig {
            bootstrap_servers: vec!["localhost:9092".to_string()],
            tls: Some(client_protos::config::TlsConfig::default()),
            ..ClientConfig::default()
        };
        assert!(validate(&config).is_err());
    }
}
