//! # Gossip Transport
//!
//! Owns the connection table, the handler registry and the seen-set.
//! Cloning is cheap; every clone drives the same transport.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::connection::{read_loop, write_loop, OutboundFrame};
use crate::domain::{
    decode_frame, encode_frame, payload_or_null, ConnectionId, GossipError, GossipResult,
    HandlerRegistry, MessageHandler, SeenSet, FRAME_DELIMITER,
};
use crate::metrics;

/// Where a frame goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// One connection, typically the origin of a request.
    Connection(ConnectionId),
    /// Every open connection.
    Broadcast,
}

/// A snapshot of one open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer: Option<SocketAddr>,
}

/// Transport counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GossipStats {
    pub connections: usize,
    pub frames_received: u64,
    pub flood_duplicates: u64,
    pub unknown_messages: u64,
    pub seen_frames: usize,
}

struct ConnectionHandle {
    peer: Option<SocketAddr>,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    close: watch::Sender<bool>,
}

pub(crate) struct Shared {
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    handlers: RwLock<HandlerRegistry>,
    seen: Mutex<SeenSet>,
    next_id: AtomicU64,
    shutdown: watch::Sender<bool>,
    frames_received: AtomicU64,
    flood_duplicates: AtomicU64,
    unknown_messages: AtomicU64,
}

impl Shared {
    /// Route one inbound line to its handler, relaying it first if it floods.
    pub(crate) fn dispatch(&self, origin: ConnectionId, raw: &[u8]) {
        let frame = match decode_frame(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(%origin, error = %e, "dropping undecodable frame");
                return;
            }
        };

        let Some(registration) = self.handlers.read().get(frame.name) else {
            self.unknown_messages.fetch_add(1, Ordering::Relaxed);
            warn!(%origin, name = frame.name, "no handler for message, dropping");
            return;
        };
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        metrics::frame_received(frame.name);

        if registration.floods {
            if !self.seen.lock().insert(raw) {
                self.flood_duplicates.fetch_add(1, Ordering::Relaxed);
                metrics::flood_duplicate();
                trace!(%origin, name = frame.name, "already seen, dropping");
                return;
            }
            let relayed = self.broadcast(Arc::from(raw), Some(origin));
            trace!(%origin, name = frame.name, relayed, "relayed flood");
        }

        registration
            .handler
            .handle(origin, payload_or_null(frame.payload));
    }

    /// Enqueue on every connection except `except`; returns how many took it.
    fn broadcast(&self, frame: OutboundFrame, except: Option<ConnectionId>) -> usize {
        self.connections
            .read()
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter(|(_, handle)| handle.outbound.send(frame.clone()).is_ok())
            .count()
    }

    fn deliver(&self, id: ConnectionId, frame: OutboundFrame) -> GossipResult<()> {
        let connections = self.connections.read();
        let handle = connections
            .get(&id)
            .ok_or(GossipError::UnknownConnection(id))?;
        handle
            .outbound
            .send(frame)
            .map_err(|_| GossipError::ConnectionClosed(id))
    }

    /// Drop a connection's entry. Dropping the queue sender lets the writer
    /// flush and exit; the close signal stops the reader.
    pub(crate) fn forget(&self, id: ConnectionId) -> bool {
        let removed = self.connections.write().remove(&id);
        match removed {
            Some(handle) => {
                handle.close.send_replace(true);
                metrics::connection_closed();
                debug!(%id, peer = ?handle.peer, "connection removed");
                true
            }
            None => false,
        }
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Newline-framed TCP gossip endpoint.
#[derive(Clone)]
pub struct GossipTransport {
    shared: Arc<Shared>,
}

impl Default for GossipTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl GossipTransport {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                connections: RwLock::new(HashMap::new()),
                handlers: RwLock::new(HandlerRegistry::new()),
                seen: Mutex::new(SeenSet::new()),
                next_id: AtomicU64::new(1),
                shutdown,
                frames_received: AtomicU64::new(0),
                flood_duplicates: AtomicU64::new(0),
                unknown_messages: AtomicU64::new(0),
            }),
        }
    }

    /// Register the handler for `name`. With `floods`, inbound copies are
    /// deduplicated and relayed before the handler runs.
    pub fn register_handler<H>(&self, name: &str, handler: H, floods: bool)
    where
        H: MessageHandler + 'static,
    {
        self.shared
            .handlers
            .write()
            .register(name, Arc::new(handler), floods);
    }

    /// Serialize `payload` and send it as a `name` frame.
    pub fn send<T: Serialize + ?Sized>(
        &self,
        name: &str,
        payload: &T,
        target: Target,
        flood: bool,
    ) -> GossipResult<()> {
        let frame = encode_frame(name, payload)?;
        self.send_raw(frame, target, flood)
    }

    /// Send pre-encoded frame bytes. With `flood`, the frame is marked seen
    /// so copies that come back are not handled locally.
    pub fn send_raw(&self, mut frame: Vec<u8>, target: Target, flood: bool) -> GossipResult<()> {
        if self.shared.is_shut_down() {
            return Err(GossipError::ShutDown);
        }
        if frame.last() != Some(&FRAME_DELIMITER) {
            frame.push(FRAME_DELIMITER);
        }
        if flood {
            self.shared.seen.lock().insert(&frame);
        }

        let frame: OutboundFrame = frame.into();
        match target {
            Target::Connection(id) => self.shared.deliver(id, frame),
            Target::Broadcast => {
                let reached = self.shared.broadcast(frame, None);
                trace!(reached, "broadcast");
                Ok(())
            }
        }
    }

    /// Adopt an established stream and start its reader and writer.
    pub fn add_connection(&self, stream: TcpStream) -> GossipResult<ConnectionId> {
        if self.shared.is_shut_down() {
            return Err(GossipError::ShutDown);
        }
        let _ = stream.set_nodelay(true);
        let peer = stream.peer_addr().ok();
        let (read_half, write_half) = stream.into_split();

        let id = ConnectionId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbound, queue) = mpsc::unbounded_channel();
        let (close, close_rx) = watch::channel(false);

        self.shared.connections.write().insert(
            id,
            ConnectionHandle {
                peer,
                outbound,
                close,
            },
        );
        metrics::connection_opened();

        tokio::spawn(write_loop(id, write_half, queue));
        tokio::spawn(read_loop(
            self.shared.clone(),
            id,
            read_half,
            close_rx,
            self.shared.shutdown.subscribe(),
        ));

        debug!(%id, ?peer, "connection added");
        Ok(id)
    }

    /// Connect to `addr` and adopt the stream.
    pub async fn dial<A: ToSocketAddrs>(&self, addr: A) -> GossipResult<ConnectionId> {
        if self.shared.is_shut_down() {
            return Err(GossipError::ShutDown);
        }
        let stream = TcpStream::connect(addr).await?;
        self.add_connection(stream)
    }

    /// Accept inbound connections until [`GossipTransport::shutdown`].
    pub fn spawn_listener(&self, listener: TcpListener) -> JoinHandle<()> {
        let transport = self.clone();
        let mut shutdown = self.shared.shutdown.subscribe();
        tokio::spawn(async move {
            let local = listener.local_addr().ok();
            info!(?local, "accepting gossip connections");
            loop {
                tokio::select! {
                    _ = shutdown.wait_for(|stopped| *stopped) => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, remote)) => {
                            if let Err(e) = transport.add_connection(stream) {
                                warn!(%remote, error = %e, "could not adopt inbound connection");
                            }
                        }
                        Err(e) => warn!(error = %e, "accept failed"),
                    },
                }
            }
            debug!(?local, "accept loop stopped");
        })
    }

    /// Close one connection. Frames already queued are still written.
    pub fn remove_connection(&self, id: ConnectionId) -> bool {
        self.shared.forget(id)
    }

    /// Close every connection.
    pub fn remove_all_connections(&self) -> usize {
        let ids: Vec<ConnectionId> = self.shared.connections.read().keys().copied().collect();
        ids.into_iter()
            .filter(|id| self.shared.forget(*id))
            .count()
    }

    /// Stop accepting, close every connection and refuse further sends.
    pub fn shutdown(&self) {
        self.shared.shutdown.send_replace(true);
        let closed = self.remove_all_connections();
        info!(closed, "gossip transport shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.is_shut_down()
    }

    pub fn connections(&self) -> Vec<ConnectionInfo> {
        let mut list: Vec<ConnectionInfo> = self
            .shared
            .connections
            .read()
            .iter()
            .map(|(id, handle)| ConnectionInfo {
                id: *id,
                peer: handle.peer,
            })
            .collect();
        list.sort_by_key(|info| info.id);
        list
    }

    pub fn connection_count(&self) -> usize {
        self.shared.connections.read().len()
    }

    /// Whether a flooded frame has already been seen here.
    pub fn has_seen(&self, frame: &[u8]) -> bool {
        self.shared.seen.lock().contains(frame)
    }

    pub fn stats(&self) -> GossipStats {
        GossipStats {
            connections: self.connection_count(),
            frames_received: self.shared.frames_received.load(Ordering::Relaxed),
            flood_duplicates: self.shared.flood_duplicates.load(Ordering::Relaxed),
            unknown_messages: self.shared.unknown_messages.load(Ordering::Relaxed),
            seen_frames: self.shared.seen.lock().len(),
        }
    }
}

impl std::fmt::Debug for GossipTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GossipTransport")
            .field("connections", &self.connection_count())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
