// DSU dispatch loop.
// Invariants: datagrams failing magic or length checks are dropped without
// a response or a log line; inbound CRCs are not validated.

use std::net::SocketAddr;

use tracing::{info, warn};

use dsu_core::codec::{decode_request_header, MessageType, HEADER_LEN};
use dsu_core::report::build_port_info;
use dsu_core::MAX_SLOTS;

use crate::app::AppState;
use crate::constants::RECV_BUFFER_LEN;
use crate::utils::now_epoch_ms;

pub async fn dsu_loop(state: AppState) -> std::io::Result<()> {
    info!(local_addr = %state.socket.local_addr()?, "dsu dispatch started");
    let mut buf = [0u8; RECV_BUFFER_LEN];
    loop {
        let (len, source) = state.socket.recv_from(&mut buf).await?;
        handle_datagram(&state, &buf[..len], source).await;
    }
}

async fn handle_datagram(state: &AppState, datagram: &[u8], source: SocketAddr) {
    let Some(header) = decode_request_header(datagram) else {
        return;
    };
    let payload = &datagram[HEADER_LEN + 4..];

    match MessageType::from_u32(header.message_type) {
        // Single supported version; the request is accepted without a reply.
        Some(MessageType::Version) => {}
        Some(MessageType::ListPorts) => {
            let Some(requested) = parse_list_ports(payload) else {
                return;
            };
            let now_ms = now_epoch_ms();
            for slot in requested {
                if slot >= MAX_SLOTS {
                    continue;
                }
                let connected = state.hub.read().await.slots.is_connected(slot, now_ms);
                let packet = build_port_info(state.server_id, slot, connected);
                if let Err(err) = state.socket.send_to(&packet, source).await {
                    warn!(?err, %source, slot, "port info send failed");
                }
            }
        }
        Some(MessageType::PadData) => {
            let Some((flags, slot, mac)) = parse_pad_data_request(payload) else {
                return;
            };
            let mut hub = state.hub.write().await;
            hub.subscribers
                .register_request(source, flags, slot, mac, now_epoch_ms());
        }
        None => {}
    }
}

fn parse_list_ports(payload: &[u8]) -> Option<Vec<u8>> {
    let count = read_i32(payload, 0)?;
    if count < 0 {
        return None;
    }
    let ids = payload.get(4..4 + count as usize)?;
    Some(ids.to_vec())
}

fn parse_pad_data_request(payload: &[u8]) -> Option<(u8, u8, [u8; 6])> {
    let flags = *payload.first()?;
    let slot = *payload.get(1)?;
    let mac = payload.get(2..8)?.try_into().ok()?;
    Some((flags, slot, mac))
}

fn read_i32(payload: &[u8], offset: usize) -> Option<i32> {
    let bytes = payload.get(offset..offset + 4)?;
    Some(i32::from_le_bytes(bytes.try_into().ok()?))
}
