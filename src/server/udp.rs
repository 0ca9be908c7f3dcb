//! UDP transport: one JSON datagram in, one JSON datagram out.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::Semaphore;

use crate::config::MAX_DATAGRAM_SIZE;
use crate::protocol::{RequestHandler, RequestSource};

/// Serves datagrams until `shutdown` completes.
///
/// Each datagram runs on its own task; at most `max_in_flight` run at once.
/// When all permits are taken the receive loop waits, leaving further
/// datagrams queued in the socket buffer.
pub async fn serve_udp<F>(
    socket: UdpSocket,
    handler: RequestHandler,
    max_in_flight: usize,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let socket = Arc::new(socket);
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
    tokio::pin!(shutdown);

    loop {
        let (len, peer) = tokio::select! {
            _ = &mut shutdown => break,
            received = socket.recv_from(&mut buffer) => match received {
                Ok(received) => received,
                Err(e) => {
                    // ICMP port-unreachable from a previous reply surfaces here on some platforms.
                    log::warn!("UDP receive failed: {e}");
                    continue;
                }
            },
        };

        let permit = Arc::clone(&permits).acquire_owned().await?;
        let payload = buffer[..len].to_vec();
        let socket = Arc::clone(&socket);
        let handler = handler.clone();

        tokio::spawn(async move {
            let _permit = permit;
            respond(&socket, &handler, &payload, peer).await;
        });
    }

    Ok(())
}

async fn respond(socket: &UdpSocket, handler: &RequestHandler, payload: &[u8], peer: SocketAddr) {
    let source = RequestSource::direct(peer.ip().to_canonical().to_string());
    let response = handler.handle_payload(payload, &source).await;

    let encoded = match response.to_json() {
        Ok(encoded) => encoded,
        Err(e) => {
            log::error!("Failed to encode response for {peer}: {e}");
            return;
        }
    };
    if let Err(e) = socket.send_to(&encoded, peer).await {
        log::warn!("Failed to send {} byte response to {peer}: {e}", encoded.len());
    }
}
