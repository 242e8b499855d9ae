use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use turtlemesh_wire::{Frame, MessageType};

use crate::error::ChannelError;
use crate::retry::RetryPolicy;

/// Largest datagram we will ever send or accept: header + max slice +
/// checksum.
const MAX_DATAGRAM: usize = 2048;

/// One endpoint's reliable channel. Wraps a bound UDP socket; owns no
/// background tasks — every wait happens inline in `send_reliable` or
/// `recv_frame`, a single cooperative receive loop.
pub struct ReliableChannel {
    socket: UdpSocket,
    retry: RetryPolicy,
}

impl ReliableChannel {
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ChannelError> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Drop any datagrams already sitting in the socket buffer before a
    /// fresh `send_reliable` call.
    pub async fn drain_stale(&self) {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match timeout(Duration::from_millis(0), self.socket.recv_from(&mut buf)).await {
                Ok(Ok((n, from))) => trace!(bytes = n, %from, "drained stale datagram"),
                _ => break,
            }
        }
    }

    /// Send `frame` to `peer` and wait for a reply of type `expected`,
    /// retrying up to the configured budget.
    pub async fn send_reliable(
        &self,
        peer: SocketAddr,
        frame: &Frame,
        expected: MessageType,
    ) -> Result<Frame, ChannelError> {
        self.drain_stale().await;
        let encoded = frame.encode();
        let mut buf = [0u8; MAX_DATAGRAM];

        for attempt in 0..=self.retry.retries {
            self.socket.send_to(&encoded, peer).await?;
            trace!(%peer, attempt, "sent frame, awaiting reply");

            match timeout(self.retry.timeout, self.socket.recv_from(&mut buf)).await {
                Ok(Ok((n, _from))) => match Frame::decode(&buf[..n]) {
                    Ok(reply) if reply.message_type() == expected => return Ok(reply),
                    Ok(reply) => {
                        debug!(?reply, "unexpected reply type, retrying");
                    }
                    Err(e) => {
                        debug!(error = %e, "malformed reply, retrying");
                    }
                },
                Ok(Err(e)) => return Err(ChannelError::Io(e)),
                Err(_elapsed) => {
                    trace!(%peer, attempt, "timed out waiting for reply");
                }
            }
        }

        warn!(%peer, retries = self.retry.retries, "peer unreachable after retry budget");
        Err(ChannelError::Unreachable)
    }

    /// Block (cooperatively) until a valid frame arrives. Used by the
    /// server side of the protocol (coordinator registration barrier,
    /// worker's steady-state dispatch loop).
    pub async fn recv_frame(&self) -> Result<(Frame, SocketAddr), ChannelError> {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            let (n, from) = self.socket.recv_from(&mut buf).await?;
            match Frame::decode(&buf[..n]) {
                Ok(frame) => return Ok((frame, from)),
                Err(e) => {
                    debug!(error = %e, %from, "dropped malformed frame");
                    continue;
                }
            }
        }
    }

    /// Same as [`recv_frame`](Self::recv_frame) but gives up after
    /// `wait` with `Ok(None)` instead of blocking forever.
    pub async fn recv_frame_timeout(
        &self,
        wait: Duration,
    ) -> Result<Option<(Frame, SocketAddr)>, ChannelError> {
        match timeout(wait, self.recv_frame()).await {
            Ok(result) => result.map(Some),
            Err(_elapsed) => Ok(None),
        }
    }

    /// Send a one-shot reply (ACK, HANDOVER, RESPONSE) with no
    /// expectation of a further reply.
    pub async fn reply(&self, peer: SocketAddr, frame: &Frame) -> Result<(), ChannelError> {
        self.socket.send_to(&frame.encode(), peer).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn bind_loopback() -> ReliableChannel {
        ReliableChannel::bind("127.0.0.1:0").await.unwrap()
    }

    // ── Happy path ──────────────────────────────────────────────────

    #[tokio::test]
    async fn send_reliable_round_trips_with_responder() {
        let client = bind_loopback().await;
        let server = bind_loopback().await;
        let server_addr = server.local_addr().unwrap();

        let responder = tokio::spawn(async move {
            let (frame, from) = server.recv_frame().await.unwrap();
            assert_eq!(frame.message_type(), MessageType::Register);
            server.reply(from, &Frame::Ack { node_id: 0 }).await.unwrap();
        });

        let reply = client
            .send_reliable(server_addr, &Frame::Register { node_id: 1 }, MessageType::Ack)
            .await
            .unwrap();
        assert_eq!(reply, Frame::Ack { node_id: 0 });
        responder.await.unwrap();
    }

    // ── Retries ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn send_reliable_retries_until_reply_arrives() {
        let client = bind_loopback().await.with_retry(RetryPolicy::new(Duration::from_millis(30), 5));
        let server = bind_loopback().await;
        let server_addr = server.local_addr().unwrap();

        let responder = tokio::spawn(async move {
            // Swallow the first two attempts, then answer.
            for _ in 0..2 {
                server.recv_frame().await.unwrap();
            }
            let (_frame, from) = server.recv_frame().await.unwrap();
            server.reply(from, &Frame::Ack { node_id: 0 }).await.unwrap();
        });

        let reply = client
            .send_reliable(server_addr, &Frame::Register { node_id: 1 }, MessageType::Ack)
            .await
            .unwrap();
        assert_eq!(reply, Frame::Ack { node_id: 0 });
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn send_reliable_gives_up_after_retry_budget() {
        let client = bind_loopback()
            .await
            .with_retry(RetryPolicy::new(Duration::from_millis(10), 2));
        // Nothing is listening on this address, so every attempt times out.
        let dead_addr: SocketAddr = "127.0.0.1:1".parse().unwrap();

        let result = client
            .send_reliable(dead_addr, &Frame::Register { node_id: 1 }, MessageType::Ack)
            .await;
        assert!(matches!(result, Err(ChannelError::Unreachable)));
    }

    // ── Unexpected reply type is treated like loss ─────────────────

    #[tokio::test]
    async fn unexpected_reply_type_is_retried() {
        let client = bind_loopback().await.with_retry(RetryPolicy::new(Duration::from_millis(30), 3));
        let server = bind_loopback().await;
        let server_addr = server.local_addr().unwrap();

        let responder = tokio::spawn(async move {
            let (_frame, from) = server.recv_frame().await.unwrap();
            // Wrong type: client expects ACK, we answer with REGISTER.
            server.reply(from, &Frame::Register { node_id: 9 }).await.unwrap();
            let (_frame, from) = server.recv_frame().await.unwrap();
            server.reply(from, &Frame::Ack { node_id: 0 }).await.unwrap();
        });

        let reply = client
            .send_reliable(server_addr, &Frame::Register { node_id: 1 }, MessageType::Ack)
            .await
            .unwrap();
        assert_eq!(reply, Frame::Ack { node_id: 0 });
        responder.await.unwrap();
    }
}
