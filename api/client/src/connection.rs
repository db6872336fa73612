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
use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use kafka_api::schemata::api_versions_request::ApiVersionsRequest;
use kafka_api::schemata::apikey::ApiMessageType;
use kafka_api::schemata::request_header::RequestHeader;
use kafka_api::schemata::Request;
use kafka_api::schemata::Response;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::sync::Semaphore;

use crate::error::Error;

type PendingTicket = (ApiMessageType, i16, oneshot::Sender<Response>);

/// A single framed, multiplexed connection to one broker (§4.6). Correlation IDs are assigned
/// monotonically; a reader task owns the socket's read half and dispatches frames back to
/// whichever caller is waiting on that correlation ID. Closing the connection fails every
/// outstanding ticket with [`Error::closed`].
pub struct Connection {
    write_half: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: Mutex<HashMap<i32, PendingTicket>>,
    next_correlation_id: AtomicI32,
    inflight: Arc<Semaphore>,
    client_id: String,
    closed: AtomicBool,
}

impl Connection {
    /// Opens a TCP connection to `addr` and runs the `ApiVersions` bootstrap exchange (§4.6).
    /// The negotiated version list is discarded after logging: this client pins one version per
    /// API rather than negotiating per-broker, so only a hard compatibility check is useful here.
    pub async fn open(
        addr: &str,
        client_id: String,
        max_inflight: usize,
        connect_timeout: Duration,
    ) -> Result<Arc<Connection>, Error> {
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::network(format!("connect to {addr} timed out")))?
            .map_err(|err| Error::network(format!("connect to {addr} failed: {err}")))?;
        stream
            .set_nodelay(true)
            .map_err(|err| Error::network(err.to_string()))?;

        let (read_half, write_half) = stream.into_split();
        let conn = Arc::new(Connection {
            write_half: tokio::sync::Mutex::new(write_half),
            pending: Mutex::new(HashMap::new()),
            next_correlation_id: AtomicI32::new(0),
            inflight: Arc::new(Semaphore::new(max_inflight)),
            client_id,
            closed: AtomicBool::new(false),
        });

        client_runtime::io_runtime().spawn({
            let conn = conn.clone();
            async move {
                conn.reader_loop(read_half).await;
            }
        });

        conn.handshake(connect_timeout).await?;
        Ok(conn)
    }

    async fn handshake(&self, timeout: Duration) -> Result<(), Error> {
        let request = Request::ApiVersionsRequest(ApiVersionsRequest {
            client_software_name: "kafka-client".to_string(),
            client_software_version: client_version::CLIENT_SOFTWARE_VERSION.to_string(),
            unknown_tagged_fields: vec![],
        });
        let response = self
            .send(ApiMessageType::API_VERSIONS, 3, request, timeout)
            .await?;
        match response {
            Response::ApiVersionsResponse(resp) if resp.error_code == 0 => {
                log::debug!(
                    "broker reports {} supported APIs",
                    resp.api_keys.len()
                );
                Ok(())
            }
            Response::ApiVersionsResponse(resp) => Err(Error::protocol(resp.error_code)),
            _ => Err(Error::network("unexpected response to ApiVersions")),
        }
    }

    /// Sends one request and awaits its response, subject to `deadline`. Blocks (asynchronously)
    /// until the in-flight window has room; see [`Connection::try_send`] for a non-blocking
    /// variant that reports backpressure instead of waiting for it.
    pub async fn send(
        &self,
        api_type: ApiMessageType,
        api_version: i16,
        request: Request,
        deadline: Duration,
    ) -> Result<Response, Error> {
        let permit = self
            .inflight
            .acquire()
            .await
            .map_err(|_| Error::closed())?;

        let (header, rx) = self.register(api_type, api_version)?;
        self.write_frame(&request, &header).await?;

        let result = tokio::time::timeout(deadline, rx).await;
        drop(permit);

        match result {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(Error::closed()),
            Err(_) => {
                self.pending
                    .lock()
                    .expect("connection pending lock poisoned")
                    .remove(&header.correlation_id);
                Err(Error::TimeoutError {
                    api: api_type.to_string(),
                    elapsed_ms: deadline.as_millis() as u64,
                })
            }
        }
    }

    /// Non-blocking variant of [`send`](Connection::send): returns `Ok(None)` immediately,
    /// without enqueuing anything, when the in-flight window is already full (spec §4.6
    /// `accepted: bool`).
    pub async fn try_send(
        &self,
        api_type: ApiMessageType,
        api_version: i16,
        request: Request,
        deadline: Duration,
    ) -> Result<Option<Response>, Error> {
        let permit = match self.inflight.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => return Ok(None),
        };

        let (header, rx) = self.register(api_type, api_version)?;
        self.write_frame(&request, &header).await?;

        let result = tokio::time::timeout(deadline, rx).await;
        drop(permit);

        match result {
            Ok(Ok(response)) => Ok(Some(response)),
            Ok(Err(_)) => Err(Error::closed()),
            Err(_) => {
                self.pending
                    .lock()
                    .expect("connection pending lock poisoned")
                    .remove(&header.correlation_id);
                Err(Error::TimeoutError {
                    api: api_type.to_string(),
                    elapsed_ms: deadline.as_millis() as u64,
                })
            }
        }
    }

    /// Writes `request` to the socket and returns as soon as the bytes are on the wire, without
    /// registering a correlation ticket or waiting for any reply. Used for `acks=0` produces
    /// (§4.8 step 7), where the broker never sends a response to wait for.
    pub async fn send_fire_and_forget(
        &self,
        api_type: ApiMessageType,
        api_version: i16,
        request: Request,
    ) -> Result<(), Error> {
        let header = self.next_header(api_type, api_version)?;
        self.write_frame(&request, &header).await
    }

    fn next_header(&self, api_type: ApiMessageType, api_version: i16) -> Result<RequestHeader, Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::closed());
        }
        let correlation_id = self.next_correlation_id.fetch_add(1, Ordering::Relaxed);
        Ok(RequestHeader {
            request_api_key: api_type.api_key(),
            request_api_version: api_version,
            correlation_id,
            client_id: self.client_id.clone(),
            unknown_tagged_fields: vec![],
        })
    }

    fn register(
        &self,
        api_type: ApiMessageType,
        api_version: i16,
    ) -> Result<(RequestHeader, oneshot::Receiver<Response>), Error> {
        let header = self.next_header(api_type, api_version)?;
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("connection pending lock poisoned")
            .insert(header.correlation_id, (api_type, api_version, tx));
        Ok((header, rx))
    }

    async fn write_frame(&self, request: &Request, header: &RequestHeader) -> Result<(), Error> {
        let mut out = Vec::new();
        request
            .encode(header, &mut out)
            .map_err(|err| Error::network(err.to_string()))?;
        let mut write_half = self.write_half.lock().await;
        write_half
            .write_all(&out)
            .await
            .map_err(|err| Error::network(err.to_string()))?;
        Ok(())
    }

    async fn reader_loop(&self, mut read_half: tokio::net::tcp::OwnedReadHalf) {
        loop {
            match self.read_one(&mut read_half).await {
                Ok(true) => continue,
                Ok(false) => {
                    log::debug!("connection closed by peer");
                    break;
                }
                Err(err) => {
                    log::warn!("connection reader failed: {err}");
                    break;
                }
            }
        }
        self.fail_all_pending();
    }

    async fn read_one(
        &self,
        read_half: &mut tokio::net::tcp::OwnedReadHalf,
    ) -> std::io::Result<bool> {
        let mut len_buf = [0u8; 4];
        if let Err(err) = read_half.read_exact(&mut len_buf).await {
            return match err.kind() {
                std::io::ErrorKind::UnexpectedEof => Ok(false),
                _ => Err(err),
            };
        }
        let size = i32::from_be_bytes(len_buf) as usize;
        let mut body = vec![0u8; size];
        read_half.read_exact(&mut body).await?;

        // Peek the correlation ID (first four bytes of every response header, flexible or not)
        // before we know which API this answers.
        if body.len() < 4 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "response shorter than a correlation id",
            ));
        }
        let correlation_id = i32::from_be_bytes([body[0], body[1], body[2], body[3]]);

        let ticket = self
            .pending
            .lock()
            .expect("connection pending lock poisoned")
            .remove(&correlation_id);
        let Some((api_type, api_version, tx)) = ticket else {
            log::debug!("dropping response for unknown correlation id {correlation_id}");
            return Ok(true);
        };

        let mut cursor = Cursor::new(body);
        match Response::decode(&mut cursor, api_type, api_version) {
            Ok((_header, response)) => {
                let _ = tx.send(response);
            }
            Err(err) => {
                log::warn!("failed to decode response for {api_type:?}: {err}");
            }
        }
        Ok(true)
    }

    fn fail_all_pending(&self) {
        self.closed.store(true, Ordering::Release);
        let mut pending = self.pending.lock().expect("connection pending lock poisoned");
        for (_, (_, _, tx)) in pending.drain() {
            let _ = tx;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mut write_half = self.write_half.lock().await;
        let _ = write_half.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_test_toolkit::start_mock_broker;
    use kafka_api::schemata::api_versions_response::ApiVersionsResponse;

    use super::*;

    #[tokio::test]
    async fn test_open_runs_api_versions_handshake() {
        let handler = Arc::new(|_api_type, _api_version, _request: Request| {
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
        });
        let broker = start_mock_broker(handler).await;

        let conn = Connection::open(
            &broker.bootstrap_server(),
            "test-client".to_string(),
            8,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert!(!conn.is_closed());
        broker.shutdown();
    }
}
