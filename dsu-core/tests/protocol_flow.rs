// End-to-end flow over the registries and report builders: a consumer
// registers, a producer occupies a slot, and each sample yields exactly one
// well-formed pad-data packet per subscribed consumer.

use std::net::SocketAddr;

use dsu_core::codec::{decode_request_header, MessageType, HEADER_LEN, RESPONSE_MAGIC};
use dsu_core::model::{MotionSample, Vec3};
use dsu_core::report::{build_pad_data, PAD_DATA_PAYLOAD_LEN};
use dsu_core::slots::SlotRegistry;
use dsu_core::subscribers::{SubscriberRegistry, BROADCAST_MAC, FLAG_MAC_FILTER, FLAG_SLOT_FILTER};
use dsu_core::PROTOCOL_VERSION;

const SERVER_ID: u32 = 0x5EED_1D;

fn endpoint(port: u16) -> SocketAddr {
    format!("192.0.2.1:{}", port).parse().unwrap()
}

fn sample(timestamp_us: u64) -> MotionSample {
    MotionSample {
        timestamp_us,
        accel: Vec3::default(),
        gyro: Vec3 {
            x: 0.5,
            y: -0.5,
            z: 1.0,
        },
    }
}

#[test]
fn broadcast_selectivity_and_counter_sequence() {
    let mut slots = SlotRegistry::new();
    let mut subscribers = SubscriberRegistry::new();

    let narrow = endpoint(50_000);
    let broad = endpoint(50_001);
    subscribers.register_request(narrow, FLAG_SLOT_FILTER, 1, [0; 6], 0);
    subscribers.register_request(broad, FLAG_MAC_FILTER, 0, BROADCAST_MAC, 0);

    slots.assign(0).unwrap();
    slots.assign(0).unwrap();

    // A report for slot 0 must not reach the slot-1-only subscriber.
    let counter = slots.update(0, sample(1_000), 10).unwrap();
    assert_eq!(counter, 0);
    let targets = subscribers.targets_for(0, 10);
    assert_eq!(targets, vec![broad]);

    // Both subscribers receive slot 1, and its counter starts at 0
    // independently of slot 0.
    let counter = slots.update(1, sample(2_000), 20).unwrap();
    assert_eq!(counter, 0);
    let mut targets = subscribers.targets_for(1, 20);
    targets.sort();
    let mut expected = vec![narrow, broad];
    expected.sort();
    assert_eq!(targets, expected);

    let counter = slots.update(1, sample(3_000), 30).unwrap();
    assert_eq!(counter, 1);
}

#[test]
fn report_packet_is_wire_complete() {
    let mut slots = SlotRegistry::new();
    let slot = slots.assign(0).unwrap();
    let sample = sample(123_456_789);
    let counter = slots.update(slot, sample, 5).unwrap();

    let packet = build_pad_data(SERVER_ID, slot, counter, &sample);
    assert_eq!(packet.len(), HEADER_LEN + PAD_DATA_PAYLOAD_LEN);
    assert_eq!(packet[0..4], RESPONSE_MAGIC);
    assert_eq!(
        u16::from_le_bytes(packet[4..6].try_into().unwrap()),
        PROTOCOL_VERSION
    );
    assert_eq!(
        u32::from_le_bytes(packet[12..16].try_into().unwrap()),
        SERVER_ID
    );

    // The CRC must reproduce when recomputed with its field re-zeroed.
    let stored = u32::from_le_bytes(packet[8..12].try_into().unwrap());
    let mut rezeroed = packet.clone();
    rezeroed[8..12].fill(0);
    assert_eq!(stored, crc32fast::hash(&rezeroed));
}

#[test]
fn request_and_response_directions_share_type_codes() {
    // A pad-data request header decodes to the same type code the pad-data
    // response carries; only the magic differs.
    let mut request = vec![0u8; HEADER_LEN + 4 + 8];
    request[0..4].copy_from_slice(b"DSUC");
    request[4..6].copy_from_slice(&PROTOCOL_VERSION.to_le_bytes());
    request[6..8].copy_from_slice(&12u16.to_le_bytes());
    request[16..20].copy_from_slice(&MessageType::PAD_DATA.to_le_bytes());

    let header = decode_request_header(&request).unwrap();
    let response = build_pad_data(SERVER_ID, 0, 0, &sample(0));
    assert_eq!(
        header.message_type,
        u32::from_le_bytes(response[16..20].try_into().unwrap())
    );
}

#[test]
fn swept_subscriber_stops_receiving() {
    let mut subscribers = SubscriberRegistry::new();
    let consumer = endpoint(50_002);
    subscribers.register_request(consumer, 0, 0, [0; 6], 0);

    assert!(!subscribers.targets_for(0, 100).is_empty());
    assert_eq!(subscribers.sweep(10_001), 1);
    assert!(subscribers.targets_for(0, 100).is_empty());
    assert!(subscribers.is_empty());
}
