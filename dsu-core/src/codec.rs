// DSU envelope codec.
// Invariants: the CRC32 is always computed over the whole message with the
// CRC field zeroed; requests failing magic or length checks are dropped
// without a response.

use crate::PROTOCOL_VERSION;

pub const HEADER_LEN: usize = 16;
pub const REQUEST_MAGIC: [u8; 4] = *b"DSUC";
pub const RESPONSE_MAGIC: [u8; 4] = *b"DSUS";

/// Message type codes are shared between request and response directions;
/// the sender determines which side of the exchange a code means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    Version,
    ListPorts,
    PadData,
}

impl MessageType {
    pub const VERSION: u32 = 0x100000;
    pub const LIST_PORTS: u32 = 0x100001;
    pub const PAD_DATA: u32 = 0x100002;

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            Self::VERSION => Some(Self::Version),
            Self::LIST_PORTS => Some(Self::ListPorts),
            Self::PAD_DATA => Some(Self::PadData),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RequestHeader {
    pub protocol_version: u16,
    pub payload_len: u16,
    /// Carried but not validated; peers are expected to compute it over the
    /// message with this field zeroed.
    pub crc: u32,
    pub client_id: u32,
    pub message_type: u32,
}

/// Writes the 16-byte response envelope with a zero CRC placeholder.
pub fn encode_header(buf: &mut [u8], payload_len: u16, server_id: u32) -> usize {
    buf[0..4].copy_from_slice(&RESPONSE_MAGIC);
    buf[4..6].copy_from_slice(&PROTOCOL_VERSION.to_le_bytes());
    buf[6..8].copy_from_slice(&payload_len.to_le_bytes());
    buf[8..12].copy_from_slice(&0u32.to_le_bytes());
    buf[12..16].copy_from_slice(&server_id.to_le_bytes());
    HEADER_LEN
}

pub fn finalize_crc(buf: &mut [u8]) {
    buf[8..12].fill(0);
    let crc = crc32fast::hash(buf);
    buf[8..12].copy_from_slice(&crc.to_le_bytes());
}

pub fn decode_request_header(datagram: &[u8]) -> Option<RequestHeader> {
    if datagram.len() < HEADER_LEN + 4 {
        return None;
    }
    if datagram[0..4] != REQUEST_MAGIC {
        return None;
    }

    Some(RequestHeader {
        protocol_version: read_u16(datagram, 4)?,
        payload_len: read_u16(datagram, 6)?,
        crc: read_u32(datagram, 8)?,
        client_id: read_u32(datagram, 12)?,
        message_type: read_u32(datagram, 16)?,
    })
}

fn read_u16(payload: &[u8], offset: usize) -> Option<u16> {
    let bytes = payload.get(offset..offset + 2)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u32(payload: &[u8], offset: usize) -> Option<u32> {
    let bytes = payload.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}
