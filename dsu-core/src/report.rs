// Outbound DSU report builders.
// Invariants: the payload length field covers the message type plus body;
// the CRC is written last, over the finished message.

use crate::codec::{encode_header, finalize_crc, MessageType, HEADER_LEN};
use crate::model::MotionSample;

/// Message type plus the 12-byte pad metadata block.
pub const PORT_INFO_PAYLOAD_LEN: usize = 16;
/// Message type, pad metadata, counter, zeroed input blocks, timestamp,
/// and the six motion floats.
pub const PAD_DATA_PAYLOAD_LEN: usize = 85;

/// Virtual pads report a fixed sentinel MAC.
const PAD_MAC: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x00, 0xFF];

pub fn build_port_info(server_id: u32, slot: u8, connected: bool) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_LEN + PORT_INFO_PAYLOAD_LEN];
    let index = encode_header(&mut buf, PORT_INFO_PAYLOAD_LEN as u16, server_id);
    buf[index..index + 4].copy_from_slice(&MessageType::LIST_PORTS.to_le_bytes());
    write_pad_meta(
        &mut buf[index + 4..],
        slot,
        if connected { 0x02 } else { 0x00 },
        0x03,
        u8::from(connected),
    );
    finalize_crc(&mut buf);
    buf
}

pub fn build_pad_data(
    server_id: u32,
    slot: u8,
    packet_counter: u32,
    sample: &MotionSample,
) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_LEN + PAD_DATA_PAYLOAD_LEN];
    let mut index = encode_header(&mut buf, PAD_DATA_PAYLOAD_LEN as u16, server_id);
    buf[index..index + 4].copy_from_slice(&MessageType::PAD_DATA.to_le_bytes());
    index += 4;
    write_pad_meta(&mut buf[index..], slot, 0x02, 0x02, 0x01);
    index += 12;
    buf[index..index + 4].copy_from_slice(&packet_counter.to_le_bytes());
    index += 4;

    // Digital buttons (12), analog sticks (8), one pad byte, and the two
    // finger-touch records (12) stay zeroed: the virtual pad is motion-only.
    index += 12 + 8 + 1 + 12;

    let low = (sample.timestamp_us & 0xFFFF_FFFF) as u32;
    let high = (sample.timestamp_us >> 32) as u32;
    buf[index..index + 4].copy_from_slice(&low.to_le_bytes());
    buf[index + 4..index + 8].copy_from_slice(&high.to_le_bytes());
    index += 8;

    for value in [
        sample.accel.x,
        sample.accel.y,
        sample.accel.z,
        sample.gyro.x,
        sample.gyro.y,
        sample.gyro.z,
    ] {
        buf[index..index + 4].copy_from_slice(&value.to_le_bytes());
        index += 4;
    }

    finalize_crc(&mut buf);
    buf
}

fn write_pad_meta(buf: &mut [u8], slot: u8, state: u8, model: u8, active: u8) {
    buf[0] = slot;
    buf[1] = state;
    buf[2] = model;
    buf[3] = 0x01; // connection type: usb
    buf[4..10].copy_from_slice(&PAD_MAC);
    buf[10] = 0xEF; // battery: charged
    buf[11] = active;
}
