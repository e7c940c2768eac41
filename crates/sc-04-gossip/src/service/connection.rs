//! Per-connection reader and writer tasks.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use super::transport::Shared;
use crate::domain::{ConnectionId, FRAME_DELIMITER};

/// Longest accepted line, delimiter included.
pub const MAX_FRAME_LEN: u64 = 4 * 1024 * 1024;

/// Outbound frames, shared between every connection a broadcast reaches.
pub(crate) type OutboundFrame = Arc<[u8]>;

/// Drain the outbound queue into the socket until the queue closes.
pub(crate) async fn write_loop(
    id: ConnectionId,
    mut socket: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<OutboundFrame>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = socket.write_all(&frame).await {
            debug!(%id, error = %e, "write failed, stopping writer");
            return;
        }
    }
    let _ = socket.shutdown().await;
    trace!(%id, "writer finished");
}

/// Read newline-terminated frames and dispatch them until EOF, an error, or
/// a close signal.
pub(crate) async fn read_loop(
    shared: Arc<Shared>,
    id: ConnectionId,
    socket: OwnedReadHalf,
    mut close: watch::Receiver<bool>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut reader = BufReader::new(socket);
    let mut line = Vec::with_capacity(1024);

    loop {
        line.clear();
        let mut limited = (&mut reader).take(MAX_FRAME_LEN);
        let read = tokio::select! {
            _ = close.wait_for(|closed| *closed) => break,
            _ = shutdown.wait_for(|stopped| *stopped) => break,
            read = limited.read_until(FRAME_DELIMITER, &mut line) => read,
        };

        match read {
            Ok(0) => {
                debug!(%id, "peer closed connection");
                break;
            }
            Ok(_) if line.last() != Some(&FRAME_DELIMITER) => {
                if line.len() as u64 >= MAX_FRAME_LEN {
                    warn!(%id, "frame exceeds {} bytes, dropping connection", MAX_FRAME_LEN);
                } else {
                    debug!(%id, "connection closed mid-frame");
                }
                break;
            }
            Ok(_) => shared.dispatch(id, &line),
            Err(e) => {
                debug!(%id, error = %e, "read failed");
                break;
            }
        }
    }

    shared.forget(id);
}
