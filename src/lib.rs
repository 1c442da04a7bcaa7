#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod apdu;
pub mod bvlc;
pub mod error;
pub mod npdu;
pub mod object;
pub mod service;
pub mod tag;
pub mod util;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

pub use apdu::{Apdu, PduType};
pub use bvlc::{Bvlc, BvlcFunction};
pub use error::{BacnetError, Result};
pub use npdu::Npdu;
pub use object::{ObjectType, PropertyIdentifier};
pub use service::{ConfirmedServiceChoice, Envelope, Message, UnconfirmedServiceChoice};
pub use tag::{Tag, TagClass, TagNumber, Value};

#[cfg(feature = "std")]
extern crate std;

/// Protocol version carried in every NPDU (ASHRAE 135 clause 6.2).
pub const BACNET_PROTOCOL_VERSION: u8 = 1;
/// Default max-APDU-length-accepted this crate advertises in IAm/requests.
pub const BACNET_MAX_APDU: usize = 1476;
/// BVLC-framed MPDU ceiling for BACnet/IP over Ethernet (1497 = 1476 + 21 of
/// header overhead in the worst routed case).
pub const BACNET_MAX_MPDU: usize = 1497;

/// Parse a raw BACnet/IP datagram into a classified [`Message`].
///
/// ```
/// let bytes = bacnet_pdu::new_whois().unwrap();
/// let message = bacnet_pdu::parse(&bytes).unwrap();
/// assert!(matches!(message, bacnet_pdu::Message::WhoIs(_)));
/// ```
pub fn parse(buf: &[u8]) -> Result<Message> {
    service::parse(buf)
}

/// Build an unrestricted, broadcast Who-Is.
pub fn new_whois() -> Result<Vec<u8>> {
    service::whois::new().marshal()
}

/// Build a Who-Is restricted to a device instance range.
pub fn new_whois_range(low: u32, high: u32) -> Result<Vec<u8>> {
    service::whois::new_ranged(low, high)?.marshal()
}

/// Build a broadcast I-Am announcement.
pub fn new_iam(device_instance: u32, vendor_id: u32) -> Result<Vec<u8>> {
    service::iam::new_broadcast(device_instance, vendor_id)?.marshal()
}

/// Build a unicast I-Am announcement addressed to a destination network.
pub fn new_iam_unicast(device_instance: u32, vendor_id: u32, destination_network: u16) -> Result<Vec<u8>> {
    service::iam::new_unicast(device_instance, vendor_id, destination_network)?.marshal()
}

/// Build a ReadProperty confirmed request.
pub fn new_read_property(object_type: u16, instance: u32, property_id: u16, invoke_id: u8) -> Result<Vec<u8>> {
    service::read_property::new_request(object_type, instance, property_id, invoke_id)?.marshal()
}

/// Build a ReadPropertyMultiple confirmed request.
pub fn new_read_property_multiple(object_type: u16, instance: u32, property_ids: &[u16], invoke_id: u8) -> Result<Vec<u8>> {
    service::read_property_multiple::new_request(object_type, instance, property_ids, invoke_id)?.marshal()
}

/// Build a ReadRange confirmed request.
pub fn new_read_range(
    object_type: u16,
    instance: u32,
    property_id: u16,
    range: Option<service::read_range::Range>,
    invoke_id: u8,
) -> Result<Vec<u8>> {
    service::read_range::new_request(object_type, instance, property_id, range, invoke_id)?.marshal()
}

/// Build a SubscribeCOV confirmed request. Pass `None`/`None` for
/// `confirmed_notifications`/`lifetime` to request cancellation.
pub fn new_subscribe_cov(
    subscriber_process_id: u32,
    object_type: u16,
    instance: u32,
    confirmed_notifications: Option<bool>,
    lifetime: Option<u32>,
    invoke_id: u8,
) -> Result<Vec<u8>> {
    service::subscribe_cov::new_request(subscriber_process_id, object_type, instance, confirmed_notifications, lifetime, invoke_id)?
        .marshal()
}

/// Build a WriteProperty confirmed request.
pub fn new_write_property(
    object_type: u16,
    instance: u32,
    property_id: u16,
    value: service::write_property::WriteValue,
    priority: Option<u8>,
    invoke_id: u8,
) -> Result<Vec<u8>> {
    service::write_property::new_request(object_type, instance, property_id, value, priority, invoke_id)?.marshal()
}

/// Build a SimpleACK reply.
pub fn new_simple_ack(service_choice: u8, invoke_id: u8) -> Result<Vec<u8>> {
    service::acks::new_simple_ack(service_choice, invoke_id).marshal()
}

/// Build a generic ComplexACK reply carrying a flat list of application-tagged values.
pub fn new_complex_ack(service_choice: u8, invoke_id: u8, values: Vec<Tag>) -> Result<Vec<u8>> {
    service::acks::new_complex_ack(service_choice, invoke_id, values).marshal()
}

/// Build an Error-PDU reply.
pub fn new_error(service_choice: u8, invoke_id: u8, error_class: u32, error_code: u32) -> Result<Vec<u8>> {
    service::acks::new_error(service_choice, invoke_id, error_class, error_code)?.marshal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whois_and_iam_round_trip_through_parse() {
        let whois_bytes = new_whois().unwrap();
        assert!(matches!(parse(&whois_bytes).unwrap(), Message::WhoIs(_)));

        let iam_bytes = new_iam(321, 31).unwrap();
        assert!(matches!(parse(&iam_bytes).unwrap(), Message::IAm(_)));
    }

    #[test]
    fn read_property_request_dispatches_correctly() {
        let bytes = new_read_property(8, 1, 85, 1).unwrap();
        assert!(matches!(parse(&bytes).unwrap(), Message::ReadPropertyRequest(_)));
    }

    #[test]
    fn complex_ack_round_trips_through_parse() {
        let bytes = new_complex_ack(12, 3, vec![tag::encode_real(23.5).unwrap()]).unwrap();
        match parse(&bytes).unwrap() {
            Message::ReadPropertyAck(envelope) => {
                let decoded = service::read_property::decode_ack(&envelope);
                // service-choice 12 matches ReadProperty, but this ACK wasn't built
                // with ReadProperty's context-tagged object/property wrapper, so the
                // typed decode correctly rejects it.
                assert!(decoded.is_err());
            }
            other => panic!("expected ReadPropertyAck, got {:?}", other),
        }
    }

    #[test]
    fn protocol_constants_match_ashrae_135() {
        assert_eq!(BACNET_PROTOCOL_VERSION, 1);
        assert_eq!(BACNET_MAX_APDU, 1476);
    }
}
