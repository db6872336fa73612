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

use kafka_api::schemata::error::ErrorCode;

pub type Result<T> = std::result::Result<T, Error>;

/// The client-visible error taxonomy. Every fallible operation returns one of these kinds; there
/// is no separate exception hierarchy per subsystem.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Decoded bytes violate the wire schema: truncation, over-long varint, CRC mismatch.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Tagged fields present, an unknown compression bitmask, or an API version outside the
    /// registry.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    /// Socket failure, connection closed while a ticket was pending, or the client itself closed.
    #[error("network error: {reason}")]
    NetworkError { reason: String },
    /// A request deadline elapsed before the matching response arrived.
    #[error("request to {api} timed out after {elapsed_ms}ms")]
    TimeoutError { api: String, elapsed_ms: u64 },
    /// A non-zero broker error code, carrying the symbolic name and message the broker attached.
    #[error("protocol error {code}: {message}")]
    ProtocolError {
        code: i16,
        message: String,
        retryable: bool,
    },
    /// Option validation, undeclared config field, serializer failure, or misuse of the
    /// idempotent producer.
    #[error("user error: {0}")]
    UserError(String),
    /// Aggregation across parallel sub-requests or partition-level results.
    #[error("{0} of {1} operations failed")]
    MultipleErrors(usize, usize, Vec<Error>),
}

impl Error {
    pub fn network(reason: impl Into<String>) -> Error {
        Error::NetworkError {
            reason: reason.into(),
        }
    }

    pub fn closed() -> Error {
        Error::network("closed")
    }

    pub fn protocol(code: i16) -> Error {
        let (message, retryable) = describe(code);
        Error::ProtocolError {
            code,
            message,
            retryable,
        }
    }

    /// Whether this error represents a protocol code that signals stale cluster topology
    /// (§4.7/§7: `UNKNOWN_TOPIC_OR_PARTITION`, `NOT_LEADER_OR_FOLLOWER`, `NOT_COORDINATOR`,
    /// `LEADER_NOT_AVAILABLE`). These errors should trigger a metadata refresh and a single retry.
    pub fn is_stale_metadata(&self) -> bool {
        matches!(
            self,
            Error::ProtocolError { code, .. }
                if *code == ErrorCode::UNKNOWN_TOPIC_OR_PARTITION.code()
                || *code == ErrorCode::NOT_LEADER_OR_FOLLOWER.code()
                || *code == ErrorCode::NOT_COORDINATOR.code()
                || *code == ErrorCode::LEADER_NOT_AVAILABLE.code()
        )
    }

    /// Whether this protocol error should mark the answering node dead (§4.6: `NOT_CONTROLLER`,
    /// `NETWORK_EXCEPTION`) in addition to any metadata invalidation.
    pub fn marks_node_dead(&self) -> bool {
        matches!(
            self,
            Error::ProtocolError { code, .. }
                if *code == ErrorCode::NOT_CONTROLLER.code()
                || *code == ErrorCode::NETWORK_EXCEPTION.code()
        ) || matches!(self, Error::NetworkError { .. })
    }

    pub fn retryable(&self) -> bool {
        matches!(self, Error::ProtocolError { retryable, .. } if *retryable)
    }
}

fn describe(code: i16) -> (String, bool) {
    macro_rules! known {
        ($($konst:ident),* $(,)?) => {
            match code {
                $(c if c == ErrorCode::$konst.code() => {
                    return (ErrorCode::$konst.message().to_string(), ErrorCode::$konst.retryable());
                })*
                _ => {}
            }
        };
    }
    known!(
        NONE,
        UNKNOWN_SERVER_ERROR,
        OFFSET_OUT_OF_RANGE,
        CORRUPT_MESSAGE,
        UNKNOWN_TOPIC_OR_PARTITION,
        LEADER_NOT_AVAILABLE,
        NOT_LEADER_OR_FOLLOWER,
        NETWORK_EXCEPTION,
        NOT_COORDINATOR,
        NOT_CONTROLLER,
        UNKNOWN_MEMBER_ID,
        REBALANCE_IN_PROGRESS,
        OUT_OF_ORDER_SEQUENCE_NUMBER,
        DUPLICATE_SEQUENCE_NUMBER,
        FENCED_INSTANCE_ID,
    );
    ("unknown broker error".to_string(), false)
}

/// Aggregates partition- or sub-request-level errors while preserving any successes that
/// occurred alongside them (§4.11, §7 "partial successes").
pub fn aggregate(errors: Vec<Error>, total: usize) -> Option<Error> {
    if errors.is_empty() {
        None
    } else {
        let failed = errors.len();
        Some(Error::MultipleErrors(failed, total, errors))
    }
}
