//! TCP wire contract: request is 1 byte, reply is an 8-byte
//! little-endian counter. Grounded on `src/sequencer/client.cc` (the
//! client's `write("a") -> read_exactly(8)` loop) and `src/sequencer/seqd.cc`
//! (the server's `read_exactly(1) -> write(&counter, 8)` loop).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use async_trait::async_trait;

use crate::error::{Result, SequencerError};
use crate::Sequencer;

/// A `Sequencer` backed by a single persistent TCP connection to a sequencer
/// daemon. The connection is serialized behind a mutex since the wire
/// protocol is strictly request/reply with no pipelining.
pub struct TcpSequencerClient {
    conn: Mutex<TcpStream>,
}

impl TcpSequencerClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let conn = TcpStream::connect(addr).await?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Sequencer for TcpSequencerClient {
    async fn next(&self) -> Result<u64> {
        let mut conn = self.conn.lock().await;
        conn.write_all(b"a").await?;
        conn.flush().await?;

        let mut reply = [0u8; 8];
        conn.read_exact(&mut reply).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                SequencerError::ConnectionClosed
            } else {
                SequencerError::Connection(e)
            }
        })?;
        Ok(u64::from_le_bytes(reply))
    }
}

/// A minimal TCP listener handing out positions from any `Sequencer`,
/// grounded on `seqd.cc`'s accept loop (its `counter_state` sharded across
/// cores; here a single `Sequencer` implementation is shared across
/// connections instead, since nothing in this workspace runs multi-reactor).
pub struct TcpSequencerServer<S> {
    listener: TcpListener,
    sequencer: std::sync::Arc<S>,
}

impl<S: Sequencer + 'static> TcpSequencerServer<S> {
    pub async fn bind(addr: impl ToSocketAddrs, sequencer: std::sync::Arc<S>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, sequencer })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve connections forever. Each connection runs its own
    /// request/reply loop until the peer closes it or sends a read error.
    pub async fn serve(&self) -> Result<()> {
        loop {
            let (socket, peer) = self.listener.accept().await?;
            debug!(%peer, "sequencer: accepted connection");
            let sequencer = self.sequencer.clone();
            tokio::spawn(async move {
                if let Err(err) = Self::serve_one(socket, sequencer).await {
                    warn!(%peer, %err, "sequencer: connection ended");
                }
            });
        }
    }

    async fn serve_one(mut socket: TcpStream, sequencer: std::sync::Arc<S>) -> Result<()> {
        let mut req = [0u8; 1];
        loop {
            match socket.read_exact(&mut req).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(e) => return Err(e.into()),
            }
            let position = sequencer.next().await?;
            trace!(position, "sequencer: handed out position");
            socket.write_all(&position.to_le_bytes()).await?;
            socket.flush().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FakeSequencer;

    #[tokio::test]
    async fn client_server_roundtrip_hands_out_distinct_positions() {
        let sequencer = std::sync::Arc::new(FakeSequencer::new());
        let server = TcpSequencerServer::bind("127.0.0.1:0", sequencer).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.serve().await;
        });

        let client = TcpSequencerClient::connect(addr).await.unwrap();
        let mut positions = Vec::new();
        for _ in 0..20 {
            positions.push(client.next().await.unwrap());
        }
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), positions.len(), "positions must be distinct");
    }

    #[tokio::test]
    async fn multiple_clients_never_collide() {
        let sequencer = std::sync::Arc::new(FakeSequencer::new());
        let server = TcpSequencerServer::bind("127.0.0.1:0", sequencer).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.serve().await;
        });

        let mut tasks = Vec::new();
        for _ in 0..4 {
            tasks.push(tokio::spawn(async move {
                let client = TcpSequencerClient::connect(addr).await.unwrap();
                let mut mine = Vec::new();
                for _ in 0..25 {
                    mine.push(client.next().await.unwrap());
                }
                mine
            }));
        }
        let mut all = Vec::new();
        for t in tasks {
            all.extend(t.await.unwrap());
        }
        let unique: std::collections::HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), all.len());
    }
}
