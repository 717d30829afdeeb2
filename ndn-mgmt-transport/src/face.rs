//! NDN face over a Unix or TCP stream.
//!
//! Packets are written as bare TLV elements. A reader task splits the
//! incoming byte stream into elements and hands each Data or Nack to the
//! Interests waiting for it.

use async_trait::async_trait;
use bytes::BytesMut;
use log::{debug, trace, warn};
use ndn_mgmt_common::{
    metrics::FaceMetrics,
    ndn::{Data, Interest, InterestResult, Packet, MAX_NDN_PACKET_SIZE},
    tlv::element_size,
    Error, Result,
};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpStream, UnixStream},
    sync::{oneshot, Mutex},
    task::JoinHandle,
    time::timeout,
};

use crate::{config::FaceUri, Transport};

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// An Interest waiting for Data
#[derive(Debug)]
struct PendingInterest {
    id: u64,
    interest: Interest,
    sender: oneshot::Sender<InterestResult>,
}

type PendingTable = Arc<Mutex<Vec<PendingInterest>>>;

/// A face connected to the local forwarder
pub struct StreamFace {
    /// Human-readable remote address
    remote: String,

    writer: Mutex<Writer>,

    /// Whether the face is closed
    closed: Arc<AtomicBool>,

    /// Pending Interests waiting for Data
    pending_interests: PendingTable,

    next_id: AtomicU64,

    reader: JoinHandle<()>,

    /// Metrics for this face
    metrics: Arc<FaceMetrics>,
}

impl std::fmt::Debug for StreamFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamFace")
            .field("remote", &self.remote)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl StreamFace {
    /// Connect to the forwarder at `uri`
    pub async fn connect(uri: &FaceUri) -> Result<Self> {
        debug!("Connecting to {}", uri);

        let face = match uri {
            FaceUri::Unix(path) => {
                let stream = UnixStream::connect(path).await.map_err(|e| {
                    Error::Transport(format!("Failed to connect to {}: {}", uri, e))
                })?;
                let (read, write) = stream.into_split();
                Self::from_halves(uri.to_string(), read, write)
            }
            FaceUri::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str()).await.map_err(|e| {
                    Error::Transport(format!("Failed to connect to {}: {}", uri, e))
                })?;
                stream.set_nodelay(true)?;
                let (read, write) = stream.into_split();
                Self::from_halves(uri.to_string(), read, write)
            }
        };

        debug!("Connected to {}", uri);
        Ok(face)
    }

    /// Build a face over an already-established stream
    pub fn from_halves<R, W>(remote: String, read: R, write: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let closed = Arc::new(AtomicBool::new(false));
        let pending_interests: PendingTable = Arc::new(Mutex::new(Vec::new()));
        let metrics = Arc::new(FaceMetrics::new());

        let reader = tokio::spawn(read_loop(
            remote.clone(),
            read,
            Arc::clone(&closed),
            Arc::clone(&pending_interests),
            Arc::clone(&metrics),
        ));

        Self {
            remote,
            writer: Mutex::new(Box::new(write)),
            closed,
            pending_interests,
            next_id: AtomicU64::new(0),
            reader,
            metrics,
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Get the metrics for this face
    pub fn metrics(&self) -> Arc<FaceMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Check if the face is closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the face, failing every pending Interest
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("[Face {}] Closing", self.remote);

        self.reader.abort();
        if let Err(e) = self.writer.lock().await.shutdown().await {
            trace!("[Face {}] Shutdown failed: {}", self.remote, e);
        }
        fail_pending(&self.pending_interests, &self.metrics, "Face closed").await;
    }

    async fn send_packet(&self, wire: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Transport(format!("Face {} is closed", self.remote)));
        }
        if wire.len() > MAX_NDN_PACKET_SIZE {
            return Err(Error::NdnPacket(format!(
                "Packet of {} bytes exceeds the {} byte limit",
                wire.len(),
                MAX_NDN_PACKET_SIZE
            )));
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(wire).await?;
        writer.flush().await?;
        self.metrics.bytes_sent.add(wire.len() as u64);
        Ok(())
    }

    async fn remove_pending(&self, id: u64) {
        let mut pending = self.pending_interests.lock().await;
        pending.retain(|entry| entry.id != id);
        self.metrics.pending_interests.set(pending.len() as u64);
    }
}

#[async_trait]
impl Transport for StreamFace {
    async fn express_interest(&self, interest: &Interest) -> Result<Data> {
        let name = interest.name.to_string();
        let wire = interest.wire_encode();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        debug!("[Face {}] Express Interest: {}", self.remote, name);

        let (sender, receiver) = oneshot::channel();
        {
            let mut pending = self.pending_interests.lock().await;
            pending.push(PendingInterest {
                id,
                interest: interest.clone(),
                sender,
            });
            self.metrics.pending_interests.set(pending.len() as u64);
        }

        let start = Instant::now();
        if let Err(e) = self.send_packet(&wire).await {
            self.remove_pending(id).await;
            return Err(e);
        }
        self.metrics.interests_sent.increment();

        match timeout(interest.lifetime(), receiver).await {
            Ok(Ok(InterestResult::Data(data))) => {
                let rtt = start.elapsed();
                trace!("[Face {}] Received Data for {}, RTT: {:?}", self.remote, name, rtt);
                self.metrics.observe_round_trip(rtt);
                Ok(data)
            }
            Ok(Ok(InterestResult::Nack(reason))) => {
                debug!("[Face {}] Interest {} nacked, reason {}", self.remote, name, reason);
                Err(Error::Nack { name, reason })
            }
            Ok(Ok(InterestResult::NetworkError(err))) => {
                debug!("[Face {}] Network error for Interest {}: {}", self.remote, name, err);
                Err(Error::Transport(err))
            }
            Ok(Err(_)) => Err(Error::Transport(format!(
                "Face {} dropped Interest {}",
                self.remote, name
            ))),
            Err(_) => {
                debug!("[Face {}] Interest timed out: {}", self.remote, name);
                self.remove_pending(id).await;
                self.metrics.timeouts.increment();
                Err(Error::Timeout(name))
            }
        }
    }
}

impl Drop for StreamFace {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Split the stream into TLV elements and dispatch them until EOF
async fn read_loop<R>(
    remote: String,
    mut read: R,
    closed: Arc<AtomicBool>,
    pending_interests: PendingTable,
    metrics: Arc<FaceMetrics>,
) where
    R: AsyncRead + Send + Unpin,
{
    let mut buffer = BytesMut::with_capacity(MAX_NDN_PACKET_SIZE);

    let reason = loop {
        match read.read_buf(&mut buffer).await {
            Ok(0) => break "Connection closed".to_string(),
            Ok(n) => metrics.bytes_received.add(n as u64),
            Err(e) => break format!("Read failed: {}", e),
        }

        while let Some(size) = element_size(&buffer) {
            let element = buffer.split_to(size).freeze();
            match Packet::wire_decode(&element) {
                Ok(packet) => dispatch_packet(&remote, packet, &pending_interests, &metrics).await,
                Err(e) => warn!("[Face {}] Dropping undecodable packet: {}", remote, e),
            }
        }

        if buffer.len() > MAX_NDN_PACKET_SIZE {
            break format!("Oversized element ({} bytes buffered)", buffer.len());
        }
    };

    debug!("[Face {}] Reader stopped: {}", remote, reason);
    closed.store(true, Ordering::Release);
    fail_pending(&pending_interests, &metrics, &reason).await;
}

async fn dispatch_packet(
    remote: &str,
    packet: Packet,
    pending_interests: &PendingTable,
    metrics: &FaceMetrics,
) {
    let mut pending = pending_interests.lock().await;
    match packet {
        Packet::Data(data) => {
            metrics.data_received.increment();
            let (matched, rest): (Vec<_>, Vec<_>) = pending
                .drain(..)
                .partition(|entry| entry.interest.matches_data(&data));
            *pending = rest;

            if matched.is_empty() {
                trace!("[Face {}] Unsolicited Data {}", remote, data.name);
            }
            for entry in matched {
                let _ = entry.sender.send(InterestResult::Data(data.clone()));
            }
        }
        Packet::Nack { interest, reason } => {
            metrics.nacks_received.increment();
            if let Some(idx) = pending.iter().position(|entry| {
                entry.interest.nonce == interest.nonce && entry.interest.name == interest.name
            }) {
                let entry = pending.remove(idx);
                let _ = entry.sender.send(InterestResult::Nack(reason));
            }
        }
        Packet::Interest(interest) => {
            trace!("[Face {}] Ignoring incoming Interest {}", remote, interest.name);
        }
    }
    metrics.pending_interests.set(pending.len() as u64);
}

async fn fail_pending(pending_interests: &PendingTable, metrics: &FaceMetrics, reason: &str) {
    let mut pending = pending_interests.lock().await;
    for entry in pending.drain(..) {
        let _ = entry
            .sender
            .send(InterestResult::NetworkError(reason.to_string()));
    }
    metrics.pending_interests.set(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_mgmt_common::{
        ndn::Name,
        tlv::{self, TlvEncoder},
    };
    use tokio::io::{duplex, DuplexStream};

    /// Face plus the forwarder's end of the stream
    fn face_pair() -> (StreamFace, DuplexStream) {
        let _ = env_logger::builder().is_test(true).try_init();
        let (client, forwarder) = duplex(64 * 1024);
        let (read, write) = tokio::io::split(client);
        (StreamFace::from_halves("test".into(), read, write), forwarder)
    }

    async fn read_interest(forwarder: &mut DuplexStream) -> Interest {
        let mut buf = BytesMut::new();
        loop {
            if let Some(size) = element_size(&buf) {
                return Interest::wire_decode(&buf[..size]).unwrap();
            }
            forwarder.read_buf(&mut buf).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_express_interest_receives_data() {
        let (face, mut forwarder) = face_pair();

        let server = tokio::spawn(async move {
            let interest = read_interest(&mut forwarder).await;
            let data = Data::new(interest.name.clone(), &b"reply"[..]);
            // Deliver in two writes to exercise reassembly
            let wire = data.wire_encode();
            forwarder.write_all(&wire[..3]).await.unwrap();
            forwarder.write_all(&wire[3..]).await.unwrap();
            forwarder
        });

        let interest = Interest::new(Name::from_string("/localhost/nfd/status/general").unwrap());
        let data = face.express_interest(&interest).await.unwrap();
        assert_eq!(&data.content[..], b"reply");
        assert_eq!(face.metrics().interests_sent.value(), 1);
        assert_eq!(face.metrics().data_received.value(), 1);
        assert_eq!(face.metrics().pending_interests.value(), 0);
        drop(server.await.unwrap());
    }

    #[tokio::test]
    async fn test_express_interest_times_out() {
        let (face, _forwarder) = face_pair();
        let interest = Interest::new(Name::from_string("/silent").unwrap()).with_lifetime(50);

        let result = face.express_interest(&interest).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
        assert_eq!(face.metrics().timeouts.value(), 1);
        assert_eq!(face.metrics().pending_interests.value(), 0);
    }

    #[tokio::test]
    async fn test_nack_is_reported() {
        let (face, mut forwarder) = face_pair();

        tokio::spawn(async move {
            let interest = read_interest(&mut forwarder).await;
            let fragment = interest.wire_encode();
            let mut encoder = TlvEncoder::new();
            encoder.write_nested(tlv::TLV_LP_PACKET, |enc| {
                enc.write_blob_tlv(tlv::TLV_LP_FRAGMENT, &fragment);
                enc.write_nested(tlv::TLV_LP_NACK, |enc| {
                    enc.write_non_negative_integer_tlv(tlv::TLV_LP_NACK_REASON, 150);
                });
            });
            forwarder.write_all(&encoder.finish()).await.unwrap();
            // Keep the stream open until the face has read the Nack
            let mut sink = [0u8; 1];
            let _ = forwarder.read(&mut sink).await;
        });

        let interest = Interest::new(Name::from_string("/no/route").unwrap());
        match face.express_interest(&interest).await {
            Err(Error::Nack { reason, .. }) => assert_eq!(reason, 150),
            other => panic!("expected Nack, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_connection_fails_pending() {
        let (face, mut forwarder) = face_pair();

        tokio::spawn(async move {
            let _ = read_interest(&mut forwarder).await;
            drop(forwarder);
        });

        let interest = Interest::new(Name::from_string("/a").unwrap());
        let result = face.express_interest(&interest).await;
        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(face.is_closed());

        let result = face.express_interest(&interest).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (face, _forwarder) = face_pair();
        face.close().await;
        face.close().await;
        assert!(face.is_closed());
    }
}
