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

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

use kafka_api::schemata::apikey::ApiMessageType;
use kafka_api::schemata::Request;
use kafka_api::schemata::Response;
use mea::latch::Latch;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;

/// Answers one decoded client request with the response the test wants to script.
pub type Handler = Arc<dyn Fn(ApiMessageType, i16, Request) -> Response + Send + Sync>;

/// A loopback TCP broker that speaks just enough of the wire protocol to drive
/// connection, pool, and protocol-level tests without a real cluster.
///
/// The broker is scripted rather than stateful: every accepted connection is served
/// by the same [`Handler`], which maps a decoded request straight to the response to
/// send back.
pub struct MockBroker {
    local_addr: SocketAddr,
    shutdown: Arc<Latch>,
}

impl MockBroker {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn bootstrap_server(&self) -> String {
        self.local_addr.to_string()
    }

    pub fn shutdown(&self) {
        self.shutdown.count_down();
    }
}

/// Binds a loopback listener and spawns the accept loop on the shared test runtime.
/// Returns once the listener is bound; the accept loop itself runs until `shutdown`.
pub async fn start_mock_broker(handler: Handler) -> MockBroker {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock broker listener");
    let local_addr = listener.local_addr().expect("listener has no local addr");
    let shutdown = Arc::new(Latch::new(1));

    let shutdown_ref = shutdown.clone();
    client_runtime::test_runtime().spawn(async move {
        accept_loop(listener, handler, shutdown_ref).await;
    });

    MockBroker {
        local_addr,
        shutdown,
    }
}

async fn accept_loop(listener: TcpListener, handler: Handler, shutdown: Arc<Latch>) {
    loop {
        let socket = tokio::select! {
            _ = shutdown.wait() => {
                log::info!("mock broker shutting down");
                return;
            }
            accepted = listener.accept() => accepted,
        };

        let (socket, remote_addr) = match socket {
            Ok(accepted) => accepted,
            Err(err) => {
                log::error!("mock broker failed to accept connection: {err}");
                continue;
            }
        };

        let handler = handler.clone();
        let shutdown = shutdown.clone();
        client_runtime::test_runtime().spawn(async move {
            if let Err(err) = serve_connection(socket, handler, shutdown).await {
                log::debug!("mock broker connection from {remote_addr} closed: {err}");
            }
        });
    }
}

async fn serve_connection(
    mut socket: TcpStream,
    handler: Handler,
    shutdown: Arc<Latch>,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            _ = shutdown.wait() => return Ok(()),
            closed = serve_one(&mut socket, &handler) => {
                if closed? {
                    return Ok(());
                }
            }
        }
    }
}

/// Read, decode, dispatch, and answer one request. Returns `true` if the peer closed
/// the connection.
async fn serve_one(socket: &mut TcpStream, handler: &Handler) -> std::io::Result<bool> {
    let size = {
        let mut buf = [0u8; size_of::<i32>()];
        if let Err(err) = socket.read_exact(&mut buf).await {
            return match err.kind() {
                std::io::ErrorKind::UnexpectedEof => Ok(true),
                _ => Err(err),
            };
        }
        i32::from_be_bytes(buf) as usize
    };

    let mut bytes = vec![0u8; size];
    socket.read_exact(&mut bytes).await?;
    let mut cursor = Cursor::new(bytes);

    let (header, request) = Request::decode(&mut cursor)?;
    let api_type = ApiMessageType::try_from(header.request_api_key)?;
    let api_version = header.request_api_version;

    let response = handler(api_type, api_version, request);

    let mut out = Vec::new();
    response.encode(header, &mut out)?;
    socket.write_all(&out).await?;
    Ok(false)
}
